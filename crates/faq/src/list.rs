use anyhow::{Context, Result};
use clap::Args;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{ContentArrangement, Table};
use faq_api::{Faq, FaqClient};
use std::io::{self, Write};

use crate::config::Config;
use crate::output::{create_spinner, truncate_text, OutputFormat};

const ANSWER_WIDTH: usize = 60;

#[derive(Args, Debug, Clone)]
#[command(about = "List every FAQ on the server")]
pub struct ListArgs {
    /// Output format
    #[arg(short, long, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

pub fn execute(args: ListArgs, config: &Config) -> Result<()> {
    let client = FaqClient::new(&config.api_url)?;

    let spinner = create_spinner("Fetching FAQs...");
    let faqs = client.list();
    spinner.finish_and_clear();
    let mut faqs = faqs?;
    faqs.sort_by_key(|faq| faq.id);

    match args.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&faqs)?);
        }
        OutputFormat::Table => {
            if faqs.is_empty() {
                println!("No FAQs yet. Add one with `faq create`.");
                return Ok(());
            }
            write_faq_table(&faqs, io::stdout().lock()).context("Failed to write table")?;
        }
    }

    Ok(())
}

fn write_faq_table<W: Write>(faqs: &[Faq], mut writer: W) -> io::Result<()> {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::DynamicFullWidth);
    table.set_header(vec!["ID", "Question", "Answer"]);

    for faq in faqs {
        table.add_row(vec![
            faq.id.to_string(),
            faq.question.clone(),
            truncate_text(&faq.answer, ANSWER_WIDTH),
        ]);
    }

    writeln!(writer, "{table}")?;
    Ok(())
}
