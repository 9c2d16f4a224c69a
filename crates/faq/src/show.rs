use anyhow::{bail, Result};
use clap::Args;
use colored::Colorize;
use faq_api::{neighbors, Faq, FaqClient};
use serde::Serialize;

use crate::config::Config;
use crate::output::{create_spinner, truncate_text, OutputFormat};

const NEIGHBOUR_WIDTH: usize = 50;

#[derive(Args, Debug, Clone)]
#[command(about = "Show one FAQ and the ones around it")]
pub struct ShowArgs {
    /// FAQ id
    #[arg(value_name = "ID")]
    pub id: i64,

    /// Output format
    #[arg(short, long, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

#[derive(Serialize)]
struct ShowOutput<'a> {
    faq: &'a Faq,
    prev: Option<&'a Faq>,
    next: Option<&'a Faq>,
}

pub fn execute(args: ShowArgs, config: &Config) -> Result<()> {
    let client = FaqClient::new(&config.api_url)?;

    let spinner = create_spinner(&format!("Fetching FAQ {}...", args.id));
    let fetched = client.get(args.id).and_then(|faq| Ok((faq, client.list()?)));
    spinner.finish_and_clear();

    let (faq, all) = fetched?;
    let Some(faq) = faq else {
        bail!("FAQ {} not found", args.id);
    };
    let (prev, next) = neighbors(&all, faq.id);

    match args.format {
        OutputFormat::Json => {
            let output = ShowOutput {
                faq: &faq,
                prev,
                next,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Table => {
            println!("{}", faq.question.bold());
            println!();
            println!("{}", faq.answer);
            println!();
            for line in meta_lines(&faq) {
                println!("{}", line.dimmed());
            }
            for line in neighbour_lines(prev, next) {
                println!("{}", line.cyan());
            }
        }
    }

    Ok(())
}

fn meta_lines(faq: &Faq) -> Vec<String> {
    let mut lines = vec![format!("#{}", faq.id)];
    if let Some(created) = &faq.created_at {
        lines.push(format!("Created {}", created));
    }
    if let Some(updated) = faq.updated_at.as_ref().filter(|u| faq.created_at.as_ref() != Some(*u)) {
        lines.push(format!("Updated {}", updated));
    }
    lines
}

fn neighbour_lines(prev: Option<&Faq>, next: Option<&Faq>) -> Vec<String> {
    let mut lines = Vec::new();
    if prev.is_some() || next.is_some() {
        lines.push(String::new());
    }
    if let Some(prev) = prev {
        lines.push(format!(
            "← prev  #{} {}",
            prev.id,
            truncate_text(&prev.question, NEIGHBOUR_WIDTH)
        ));
    }
    if let Some(next) = next {
        lines.push(format!(
            "next →  #{} {}",
            next.id,
            truncate_text(&next.question, NEIGHBOUR_WIDTH)
        ));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn faq(id: i64, question: &str) -> Faq {
        Faq {
            id,
            question: question.into(),
            answer: "...".into(),
            created_at: None,
            updated_at: None,
            slug: None,
        }
    }

    #[test]
    fn test_meta_lines() {
        let mut record = faq(7, "Refunds?");
        assert_eq!(meta_lines(&record), vec!["#7"]);

        record.created_at = Some("2024-03-01T10:00:00Z".into());
        record.updated_at = Some("2024-03-01T10:00:00Z".into());
        assert_eq!(
            meta_lines(&record),
            vec!["#7", "Created 2024-03-01T10:00:00Z"]
        );

        record.updated_at = Some("2024-04-02T08:30:00Z".into());
        assert_eq!(meta_lines(&record).len(), 3);
    }

    #[test]
    fn test_neighbour_lines() {
        let prev = faq(3, "Where is my order?");
        let next = faq(9, "Can I change my plan?");

        assert!(neighbour_lines(None, None).is_empty());
        assert_eq!(
            neighbour_lines(Some(&prev), Some(&next)),
            vec![
                String::new(),
                "← prev  #3 Where is my order?".to_string(),
                "next →  #9 Can I change my plan?".to_string(),
            ]
        );
        assert_eq!(
            neighbour_lines(None, Some(&next)),
            vec![String::new(), "next →  #9 Can I change my plan?".to_string()]
        );
    }
}
