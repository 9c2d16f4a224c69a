//! Application state and event loop

use super::detail::{spawn_detail_worker, DetailRequest, DetailResponse, FaqDetail, FaqSource};
use super::input::TextInput;
use super::ui;
use crate::config::Config;
use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use faq_api::FaqClient;
use faq_search::{Presentation, QueryStore, SearchEndpoint, SearchSession, Settled};
use ratatui::{backend::CrosstermBackend, widgets::ListState, Terminal};
use std::io::{self, Stdout};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(16);
const TOAST_DURATION: Duration = Duration::from_secs(3);

pub type SharedEndpoint = Arc<dyn SearchEndpoint + Send + Sync>;
pub type SharedSource = Arc<dyn FaqSource + Send + Sync>;

pub struct Toast {
    pub message: String,
    pub expires_at: Instant,
}

impl Toast {
    pub fn new(message: impl Into<String>, now: Instant) -> Self {
        Self {
            message: message.into(),
            expires_at: now + TOAST_DURATION,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Input,
    Results,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailState {
    Loading { id: i64 },
    Loaded(FaqDetail),
    Failed { id: i64, message: String },
}

impl DetailState {
    pub fn id(&self) -> i64 {
        match self {
            DetailState::Loading { id } | DetailState::Failed { id, .. } => *id,
            DetailState::Loaded(detail) => detail.faq.id,
        }
    }
}

pub enum View {
    Search,
    Detail(DetailState),
}

pub struct App {
    pub input: TextInput,
    pub focus: Focus,
    pub view: View,
    /// Selection in the results list
    pub list_state: ListState,
    pub toast: Option<Toast>,
    pub should_quit: bool,
    pub show_diagnostics: bool,
    /// Only present while the search view is shown
    session: Option<SearchSession>,
    store: QueryStore,
    endpoint: SharedEndpoint,
    config: Config,
    detail_tx: Sender<DetailRequest>,
    detail_rx: Receiver<DetailResponse>,
}

impl App {
    pub fn new(
        endpoint: SharedEndpoint,
        source: SharedSource,
        store: QueryStore,
        config: Config,
    ) -> Self {
        let (detail_tx, detail_req_rx) = mpsc::channel();
        let (detail_resp_tx, detail_rx) = mpsc::channel();
        spawn_detail_worker(source, detail_req_rx, detail_resp_tx);

        let session = SearchSession::start(endpoint.clone(), config.search.clone(), store.clone());

        Self {
            input: TextInput::with_text(&store.text()),
            focus: Focus::Input,
            view: View::Search,
            list_state: ListState::default(),
            toast: None,
            should_quit: false,
            show_diagnostics: config.show_diagnostics,
            session: Some(session),
            store,
            endpoint,
            config,
            detail_tx,
            detail_rx,
        }
    }

    pub fn session(&self) -> Option<&SearchSession> {
        self.session.as_ref()
    }

    pub fn presentation(&self) -> Presentation<'_> {
        self.session
            .as_ref()
            .map_or(Presentation::Prompt, |s| {
                s.coordinator().presentation(self.show_diagnostics)
            })
    }

    /// Split borrow for drawing the results list
    pub fn presentation_and_selection(&mut self) -> (Presentation<'_>, &mut ListState) {
        let presentation = self
            .session
            .as_ref()
            .map_or(Presentation::Prompt, |s| {
                s.coordinator().presentation(self.show_diagnostics)
            });
        (presentation, &mut self.list_state)
    }

    fn result_count(&self) -> usize {
        match self.presentation() {
            Presentation::Results(results) => results.len(),
            _ => 0,
        }
    }

    fn selected_id(&self) -> Option<i64> {
        match self.presentation() {
            Presentation::Results(results) => results
                .get(self.list_state.selected().unwrap_or(0))
                .map(|hit| hit.id),
            _ => None,
        }
    }

    /// Advance timers and pick up worker responses
    pub fn tick(&mut self, now: Instant) {
        if self.toast.as_ref().is_some_and(|t| now >= t.expires_at) {
            self.toast = None;
        }

        let settled = self.session.as_mut().and_then(|s| s.tick(now));
        if let Some(settled) = settled {
            self.on_settled(settled);
        }

        self.poll_detail_responses();
    }

    fn on_settled(&mut self, settled: Settled) {
        let reclaim = self
            .session
            .as_ref()
            .is_some_and(|s| s.coordinator().should_reclaim_focus(self.focus == Focus::Input));
        if reclaim {
            self.focus = Focus::Input;
        }

        self.list_state = ListState::default();
        if settled == Settled::Success && self.result_count() > 0 {
            self.list_state.select(Some(0));
        }
    }

    fn poll_detail_responses(&mut self) {
        while let Ok(response) = self.detail_rx.try_recv() {
            let View::Detail(state) = &mut self.view else {
                continue;
            };
            // Ignore answers for an FAQ we already navigated away from
            if !matches!(state, DetailState::Loading { id } if *id == response.id) {
                continue;
            }

            *state = match response.result {
                Ok(Some(detail)) => DetailState::Loaded(detail),
                Ok(None) => DetailState::Failed {
                    id: response.id,
                    message: format!("FAQ {} no longer exists", response.id),
                },
                Err(message) => DetailState::Failed {
                    id: response.id,
                    message,
                },
            };
        }
    }

    /// Leave the search view. The session goes with it.
    fn open_detail(&mut self, id: i64) {
        self.session = None;
        self.view = View::Detail(DetailState::Loading { id });
        if self.detail_tx.send(DetailRequest { id }).is_err() {
            self.view = View::Detail(DetailState::Failed {
                id,
                message: "Detail loader stopped".to_string(),
            });
        }
    }

    /// Rebuild the session from the stored query
    fn back_to_search(&mut self) {
        self.view = View::Search;
        self.focus = Focus::Input;
        self.list_state = ListState::default();
        self.session = Some(SearchSession::start(
            self.endpoint.clone(),
            self.config.search.clone(),
            self.store.clone(),
        ));
    }

    pub fn handle_event(&mut self, event: Event) {
        if let Event::Key(key) = event {
            if key.kind == KeyEventKind::Press {
                self.handle_key(key, Instant::now());
            }
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent, now: Instant) {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        if let View::Detail(state) = &self.view {
            let state = state.clone();
            self.handle_detail_key(key, &state, now);
        } else {
            self.handle_search_key(key, now);
        }
    }

    fn handle_search_key(&mut self, key: KeyEvent, now: Instant) {
        match (self.focus, key.code) {
            (_, KeyCode::Esc) => self.should_quit = true,
            (Focus::Input, KeyCode::Tab | KeyCode::Down) => {
                if self.result_count() > 0 {
                    self.focus = Focus::Results;
                    if self.list_state.selected().is_none() {
                        self.list_state.select(Some(0));
                    }
                }
            }
            (Focus::Results, KeyCode::Tab) => self.focus = Focus::Input,
            (Focus::Results, KeyCode::Up) => match self.list_state.selected() {
                Some(0) | None => self.focus = Focus::Input,
                Some(i) => self.list_state.select(Some(i - 1)),
            },
            (Focus::Results, KeyCode::Down) => {
                let last = self.result_count().saturating_sub(1);
                let next = self.list_state.selected().map_or(0, |i| (i + 1).min(last));
                self.list_state.select(Some(next));
            }
            (_, KeyCode::Enter) => {
                if let Some(id) = self.selected_id() {
                    self.open_detail(id);
                }
            }
            (Focus::Results, KeyCode::Char(_) | KeyCode::Backspace) => {
                self.focus = Focus::Input;
                self.edit(key, now);
            }
            (Focus::Input, _) => self.edit(key, now),
            _ => {}
        }
    }

    fn edit(&mut self, key: KeyEvent, now: Instant) {
        if !self.input.handle_key(key.code, key.modifiers) {
            return;
        }
        if let Some(session) = self.session.as_mut() {
            session.on_input(&self.input.text, now);
        }
    }

    fn handle_detail_key(&mut self, key: KeyEvent, state: &DetailState, now: Instant) {
        match key.code {
            KeyCode::Esc | KeyCode::Backspace | KeyCode::Char('q') => self.back_to_search(),
            KeyCode::Left | KeyCode::Char('h') => self.step(state, |d| d.prev.as_ref(), now),
            KeyCode::Right | KeyCode::Char('l') => self.step(state, |d| d.next.as_ref(), now),
            _ => {}
        }
    }

    fn step(
        &mut self,
        state: &DetailState,
        pick: impl Fn(&FaqDetail) -> Option<&faq_api::Faq>,
        now: Instant,
    ) {
        let DetailState::Loaded(detail) = state else {
            return;
        };
        match pick(detail) {
            Some(faq) => self.open_detail(faq.id),
            None => self.toast = Some(Toast::new("Nothing further in that direction", now)),
        }
    }
}

/// Run the TUI until the user quits
pub fn run(client: Arc<FaqClient>, store: QueryStore, config: &Config) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(client.clone(), client, store, config.clone());

    let result = run_loop(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_loop(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|f| ui::render(f, app))?;

        if event::poll(POLL_INTERVAL)? {
            // Drain everything queued so a burst of keys costs one frame
            loop {
                app.handle_event(event::read()?);
                if app.should_quit || !event::poll(Duration::ZERO)? {
                    break;
                }
            }
        }
        if app.should_quit {
            return Ok(());
        }

        app.tick(Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use faq_api::{Faq, FaqSummary, FetchError};
    use faq_search::SearchConfig;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Backend {
        faqs: Vec<Faq>,
        searches: Mutex<Vec<String>>,
    }

    impl Backend {
        fn with(ids: &[i64]) -> Arc<Self> {
            Arc::new(Self {
                faqs: ids
                    .iter()
                    .map(|&id| Faq {
                        id,
                        question: format!("Question {id}"),
                        answer: format!("Answer {id}"),
                        created_at: None,
                        updated_at: None,
                        slug: None,
                    })
                    .collect(),
                searches: Mutex::default(),
            })
        }

        fn searches(&self) -> Vec<String> {
            self.searches.lock().unwrap().clone()
        }
    }

    impl SearchEndpoint for Backend {
        fn search(&self, query: &str) -> Result<Vec<FaqSummary>, FetchError> {
            self.searches.lock().unwrap().push(query.to_string());
            Ok(self
                .faqs
                .iter()
                .filter(|f| f.question.contains(query))
                .cloned()
                .map(FaqSummary::from)
                .collect())
        }
    }

    impl FaqSource for Backend {
        fn get(&self, id: i64) -> Result<Option<Faq>> {
            Ok(self.faqs.iter().find(|f| f.id == id).cloned())
        }

        fn list(&self) -> Result<Vec<Faq>> {
            Ok(self.faqs.clone())
        }
    }

    fn config() -> Config {
        Config {
            api_url: "http://localhost:8000".into(),
            search: SearchConfig {
                debounce: Duration::from_millis(5),
                max_attempts: 5,
                retry_delay: Duration::from_millis(10),
            },
            show_diagnostics: false,
        }
    }

    fn new_app(backend: &Arc<Backend>, query: &str) -> App {
        App::new(
            backend.clone(),
            backend.clone(),
            QueryStore::with_text(query),
            config(),
        )
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    /// Tick until `done` holds or a few seconds pass
    fn tick_until(app: &mut App, done: impl Fn(&App) -> bool) {
        let give_up = Instant::now() + Duration::from_secs(5);
        while !done(app) {
            assert!(Instant::now() < give_up, "timed out");
            std::thread::sleep(Duration::from_millis(2));
            app.tick(Instant::now());
        }
    }

    fn has_results(app: &App) -> bool {
        matches!(app.presentation(), Presentation::Results(_))
    }

    #[test]
    fn test_initial_query_is_searched() {
        let backend = Backend::with(&[1, 2]);
        let mut app = new_app(&backend, "Question");

        tick_until(&mut app, has_results);
        assert_eq!(app.input.text, "Question");
        assert_eq!(app.list_state.selected(), Some(0));
        assert_eq!(backend.searches(), vec!["Question"]);
    }

    #[test]
    fn test_typing_searches_after_quiet_period() {
        let backend = Backend::with(&[1, 12]);
        let mut app = new_app(&backend, "");

        let now = Instant::now();
        for c in "Question 1".chars() {
            app.handle_key(key(KeyCode::Char(c)), now);
        }
        tick_until(&mut app, has_results);
        assert_eq!(backend.searches(), vec!["Question 1"]);
        assert_eq!(app.result_count(), 2);
    }

    #[test]
    fn test_results_navigation_and_focus() {
        let backend = Backend::with(&[1, 2, 3]);
        let mut app = new_app(&backend, "Question");
        tick_until(&mut app, has_results);
        let now = Instant::now();

        app.handle_key(key(KeyCode::Down), now);
        assert_eq!(app.focus, Focus::Results);
        app.handle_key(key(KeyCode::Down), now);
        app.handle_key(key(KeyCode::Down), now);
        app.handle_key(key(KeyCode::Down), now);
        assert_eq!(app.list_state.selected(), Some(2));

        app.handle_key(key(KeyCode::Up), now);
        app.handle_key(key(KeyCode::Up), now);
        app.handle_key(key(KeyCode::Up), now);
        assert_eq!(app.focus, Focus::Input);

        app.handle_key(key(KeyCode::Tab), now);
        app.handle_key(key(KeyCode::Char('x')), now);
        assert_eq!(app.focus, Focus::Input);
        assert_eq!(app.input.text, "Questionx");
    }

    #[test]
    fn test_settled_search_reclaims_focus() {
        let backend = Backend::with(&[1, 2]);
        let mut app = new_app(&backend, "Question");
        app.focus = Focus::Results;

        tick_until(&mut app, has_results);
        assert_eq!(app.focus, Focus::Input);
        assert_eq!(app.list_state.selected(), Some(0));

        // An empty result set hands focus back as well
        let mut app = new_app(&backend, "nothing here");
        app.focus = Focus::Results;
        tick_until(&mut app, |app| {
            matches!(app.presentation(), Presentation::NoResults { .. })
        });
        assert_eq!(app.focus, Focus::Input);
        assert_eq!(app.list_state.selected(), None);
    }

    #[test]
    fn test_blank_query_leaves_focus_alone() {
        let backend = Backend::with(&[1]);
        let mut app = new_app(&backend, "   ");
        app.focus = Focus::Results;

        app.on_settled(Settled::Success);
        assert_eq!(app.focus, Focus::Results);
        assert!(backend.searches().is_empty());
    }

    #[test]
    fn test_detail_round_trip_rebuilds_session() {
        let backend = Backend::with(&[1, 2, 3]);
        let mut app = new_app(&backend, "Question");
        tick_until(&mut app, has_results);
        let now = Instant::now();

        app.handle_key(key(KeyCode::Down), now);
        app.handle_key(key(KeyCode::Down), now);
        app.handle_key(key(KeyCode::Enter), now);
        assert!(app.session().is_none());
        assert!(matches!(app.view, View::Detail(DetailState::Loading { id: 2 })));

        tick_until(&mut app, |app| {
            matches!(app.view, View::Detail(DetailState::Loaded(_)))
        });
        let View::Detail(DetailState::Loaded(detail)) = &app.view else {
            unreachable!()
        };
        assert_eq!(detail.prev.as_ref().map(|f| f.id), Some(1));
        assert_eq!(detail.next.as_ref().map(|f| f.id), Some(3));

        app.handle_key(key(KeyCode::Right), now);
        assert!(matches!(app.view, View::Detail(DetailState::Loading { id: 3 })));
        tick_until(&mut app, |app| {
            matches!(app.view, View::Detail(DetailState::Loaded(_)))
        });

        app.handle_key(key(KeyCode::Right), now);
        assert!(app.toast.is_some());

        app.handle_key(key(KeyCode::Esc), now);
        assert!(matches!(app.view, View::Search));
        assert!(app.session().is_some());
        tick_until(&mut app, has_results);
        assert_eq!(backend.searches(), vec!["Question", "Question"]);
    }

    #[test]
    fn test_missing_detail() {
        let backend = Backend::with(&[1]);
        let mut app = new_app(&backend, "");
        app.open_detail(42);

        tick_until(&mut app, |app| {
            matches!(app.view, View::Detail(DetailState::Failed { .. }))
        });
        let View::Detail(state) = &app.view else {
            unreachable!()
        };
        assert_eq!(state.id(), 42);
    }

    #[test]
    fn test_quit_keys() {
        let backend = Backend::with(&[]);
        let mut app = new_app(&backend, "");
        app.handle_key(
            KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
            Instant::now(),
        );
        assert!(app.should_quit);

        let mut app = new_app(&backend, "");
        app.handle_key(key(KeyCode::Esc), Instant::now());
        assert!(app.should_quit);
    }
}
