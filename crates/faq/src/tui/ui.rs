//! UI rendering

use super::app::{App, DetailState, Focus, View};
use super::input::TextInput;
use crate::output::truncate_text;
use faq_api::Faq;
use faq_search::{Presentation, CREATE_CALL_TO_ACTION, ERROR_TEXT, NO_RESULTS_TEXT, PROMPT_TEXT};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::border,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};
use std::time::Duration;

const SELECTION_BG: Color = Color::Rgb(38, 38, 38);

pub fn render(frame: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),    // Body
            Constraint::Length(1), // Status bar
            Constraint::Length(1), // Toast line
            Constraint::Length(1), // Search input
        ])
        .split(frame.area());

    if let View::Detail(state) = &app.view {
        render_detail_body(frame, chunks[0], state);
        render_detail_status(frame, state, chunks[1]);
    } else {
        let focus = app.focus;
        let (presentation, list_state) = app.presentation_and_selection();
        render_search_body(frame, chunks[0], &presentation, list_state, focus);
        render_search_status(frame, app, chunks[1]);
    }

    render_toast_line(frame, app, chunks[2]);
    let input_focused = matches!(app.view, View::Search) && app.focus == Focus::Input;
    render_search_input(frame, &app.input, input_focused, chunks[3]);
}

fn body_block(title: String, focused: bool) -> Block<'static> {
    let border_style = if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    Block::default()
        .borders(Borders::ALL)
        .border_set(border::ROUNDED)
        .border_style(border_style)
        .title(title)
}

/// Thick bar, then the text with a block cursor
fn render_search_input(frame: &mut Frame, input: &TextInput, focused: bool, area: Rect) {
    let text_style = if focused {
        Style::default().fg(Color::White)
    } else {
        Style::default().fg(Color::Gray)
    };
    let cursor_style = Style::default().fg(Color::White).bg(Color::DarkGray);

    let (before, after) = input.text.split_at(input.cursor);
    let mut chars = after.chars();
    let at_cursor = chars.next();
    let after_cursor = chars.as_str();

    let mut spans = vec![Span::styled("▌ ", Style::default().fg(Color::Yellow))];
    if !before.is_empty() {
        spans.push(Span::styled(before, text_style));
    }
    match (focused, at_cursor) {
        (true, Some(c)) => spans.push(Span::styled(c.to_string(), cursor_style)),
        (true, None) => spans.push(Span::styled("█", Style::default().fg(Color::White))),
        (false, Some(c)) => spans.push(Span::styled(c.to_string(), text_style)),
        (false, None) => {}
    }
    if !after_cursor.is_empty() {
        spans.push(Span::styled(after_cursor, text_style));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Prompt, loading skeleton, result list, empty state or error
pub fn render_search_body(
    frame: &mut Frame,
    area: Rect,
    presentation: &Presentation,
    list_state: &mut ListState,
    focus: Focus,
) {
    let block = body_block(" FAQ ".to_string(), focus == Focus::Results);
    let dim = Style::default().fg(Color::DarkGray);

    let lines = match presentation {
        Presentation::Results(results) => {
            let answer_width = (area.width as usize).saturating_sub(6);
            let items: Vec<ListItem> = results
                .iter()
                .map(|hit| {
                    ListItem::new(vec![
                        Line::from(Span::styled(
                            hit.question.clone(),
                            Style::default()
                                .fg(Color::White)
                                .add_modifier(Modifier::BOLD),
                        )),
                        Line::from(Span::styled(
                            format!("  {}", truncate_text(&hit.answer, answer_width)),
                            dim,
                        )),
                    ])
                })
                .collect();

            let mut list = List::new(items).block(block);
            if focus == Focus::Results {
                list = list
                    .highlight_style(Style::default().bg(SELECTION_BG))
                    .highlight_symbol("▌ ");
            }
            frame.render_stateful_widget(list, area, list_state);
            return;
        }
        Presentation::Prompt => vec![Line::from(Span::styled(PROMPT_TEXT, dim))],
        Presentation::Loading => {
            let width = (area.width as usize).saturating_sub(4);
            [0.6f32, 0.9, 0.5, 0.8]
                .iter()
                .map(|share| {
                    let len = (width as f32 * *share) as usize;
                    Line::from(Span::styled("░".repeat(len), dim))
                })
                .collect()
        }
        Presentation::NoResults { query } => vec![
            Line::from(Span::styled(NO_RESULTS_TEXT, Style::default().fg(Color::White))),
            Line::from(Span::styled(format!("Searched for \"{}\"", query), dim)),
            Line::default(),
            Line::from(Span::styled(
                CREATE_CALL_TO_ACTION,
                Style::default().fg(Color::Yellow),
            )),
        ],
        Presentation::Error { detail } => {
            let mut lines = vec![Line::from(Span::styled(
                ERROR_TEXT,
                Style::default().fg(Color::Red),
            ))];
            if let Some(detail) = detail {
                lines.push(Line::default());
                lines.push(Line::from(Span::styled(detail.clone(), dim)));
            }
            lines
        }
    };

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

/// Left side of the status bar for the search view
fn search_status(
    presentation: &Presentation,
    attempt: Option<u32>,
    max_attempts: u32,
    last_duration: Option<Duration>,
) -> String {
    let took = last_duration
        .map(|d| format!(" in {}ms", d.as_millis()))
        .unwrap_or_default();

    match presentation {
        Presentation::Prompt => String::new(),
        Presentation::Loading => match attempt {
            Some(attempt) if attempt > 1 => {
                format!("Retrying (attempt {}/{})", attempt, max_attempts)
            }
            _ => "Searching...".to_string(),
        },
        Presentation::Results(results) if results.len() == 1 => format!("1 result{took}"),
        Presentation::Results(results) => format!("{} results{took}", results.len()),
        Presentation::NoResults { .. } => format!("0 results{took}"),
        Presentation::Error { .. } => "Search failed".to_string(),
    }
}

fn hint_spans(hints: &[&'static str]) -> Vec<Span<'static>> {
    let bracket = Style::default().fg(Color::DarkGray);
    let dim = Style::default().fg(Color::DarkGray);
    hints
        .iter()
        .flat_map(|hint| {
            [
                Span::styled(" [", bracket),
                Span::styled(*hint, dim),
                Span::styled("]", bracket),
            ]
        })
        .collect()
}

fn render_search_status(frame: &mut Frame, app: &App, area: Rect) {
    let status = match app.session() {
        Some(session) => {
            let coordinator = session.coordinator();
            search_status(
                &app.presentation(),
                coordinator.attempt(),
                coordinator.config().max_attempts,
                session.last_duration(),
            )
        }
        None => String::new(),
    };

    let status_style = if status.starts_with("Retrying") {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::DIM)
    } else {
        Style::default().fg(Color::Cyan)
    };

    let mut spans = vec![Span::raw("  "), Span::styled(status, status_style)];
    spans.extend(hint_spans(&["Tab results", "Enter open", "Esc quit"]));
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn neighbour_line(label: &'static str, faq: &Faq, width: usize) -> Line<'static> {
    Line::from(vec![
        Span::styled(label, Style::default().fg(Color::Cyan)),
        Span::styled(
            format!(" #{} {}", faq.id, truncate_text(&faq.question, width)),
            Style::default().fg(Color::Gray),
        ),
    ])
}

pub fn render_detail_body(frame: &mut Frame, area: Rect, state: &DetailState) {
    let block = body_block(format!(" #{} ", state.id()), true);
    let dim = Style::default().fg(Color::DarkGray);

    let lines = match state {
        DetailState::Loading { .. } => vec![Line::from(Span::styled("Loading...", dim))],
        DetailState::Failed { message, .. } => vec![Line::from(Span::styled(
            message.clone(),
            Style::default().fg(Color::Red),
        ))],
        DetailState::Loaded(detail) => {
            let faq = &detail.faq;
            let mut lines = vec![
                Line::from(Span::styled(
                    faq.question.clone(),
                    Style::default()
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD),
                )),
                Line::default(),
            ];
            lines.extend(faq.answer.lines().map(|l| Line::from(l.to_string())));

            if let Some(created) = &faq.created_at {
                lines.push(Line::default());
                lines.push(Line::from(Span::styled(format!("Created {}", created), dim)));
            }

            let width = (area.width as usize).saturating_sub(16);
            if detail.prev.is_some() || detail.next.is_some() {
                lines.push(Line::default());
            }
            if let Some(prev) = &detail.prev {
                lines.push(neighbour_line("← prev", prev, width));
            }
            if let Some(next) = &detail.next {
                lines.push(neighbour_line("next →", next, width));
            }
            lines
        }
    };

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn render_detail_status(frame: &mut Frame, state: &DetailState, area: Rect) {
    let mut hints = Vec::new();
    if let DetailState::Loaded(detail) = state {
        if detail.prev.is_some() {
            hints.push("← prev");
        }
        if detail.next.is_some() {
            hints.push("→ next");
        }
    }
    hints.push("Esc back");

    let mut spans = vec![Span::raw(" ")];
    spans.extend(hint_spans(&hints));
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_toast_line(frame: &mut Frame, app: &App, area: Rect) {
    if let Some(toast) = &app.toast {
        let bracket = Style::default().fg(Color::DarkGray);
        let spans = vec![
            Span::styled("  [", bracket),
            Span::styled(
                toast.message.as_str(),
                Style::default().fg(Color::Blue).add_modifier(Modifier::DIM),
            ),
            Span::styled("]", bracket),
        ];
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }
}
