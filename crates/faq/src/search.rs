use anyhow::{anyhow, bail, Result};
use clap::Args;
use colored::Colorize;
use faq_api::FaqClient;
use faq_search::{
    Presentation, QueryStore, RequestState, SearchConfig, SearchSession, CREATE_CALL_TO_ACTION,
    ERROR_TEXT, NO_RESULTS_TEXT, PROMPT_TEXT,
};
use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::output::{create_spinner, truncate_text, OutputFormat};
use crate::tui;

const ANSWER_WIDTH: usize = 80;

/// Upper bound on a single request, matching the client's timeout
const REQUEST_BUDGET: Duration = Duration::from_secs(10);

#[derive(Args, Debug, Clone, Default)]
#[command(about = "Search FAQs as you type")]
pub struct SearchArgs {
    /// Start with this query
    #[arg(value_name = "QUERY")]
    pub query: Option<String>,

    /// Run QUERY once, print the outcome and exit
    #[arg(long, requires = "query")]
    pub once: bool,

    /// Output format for --once
    #[arg(short, long, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

pub fn execute(args: SearchArgs, config: &Config) -> Result<()> {
    let client = Arc::new(FaqClient::new(&config.api_url)?);
    let store = QueryStore::with_text(args.query.as_deref().unwrap_or_default());

    if args.once {
        return search_once(client, store, config, args.format);
    }

    tui::run(client, store, config)
}

fn search_once(
    client: Arc<FaqClient>,
    store: QueryStore,
    config: &Config,
    format: OutputFormat,
) -> Result<()> {
    let mut session = SearchSession::start(client, config.search.clone(), store);

    let spinner = create_spinner("Searching...");
    let settled = session.run_until_settled(settle_timeout(&config.search));
    spinner.finish_and_clear();

    let coordinator = session.coordinator();
    let state = coordinator.state();
    log::debug!(
        "Search for {:?} settled as {:?} in {:?}",
        coordinator.debounced_query(),
        settled,
        session.last_duration()
    );

    if let RequestState::Pending { query } = state {
        bail!("Search for {:?} did not finish", query);
    }

    let presentation = coordinator.presentation(config.show_diagnostics);
    if let Some(error) = failure(&presentation) {
        return Err(error);
    }

    match format {
        OutputFormat::Json => {
            let results = match state {
                RequestState::Success { results, .. } => results.as_slice(),
                _ => &[],
            };
            println!("{}", serde_json::to_string_pretty(results)?);
        }
        OutputFormat::Table => print_presentation(&presentation),
    }

    Ok(())
}

/// The error for a failed search. Carries the failure detail only when the
/// presentation exposes it.
fn failure(presentation: &Presentation) -> Option<anyhow::Error> {
    let Presentation::Error { detail } = presentation else {
        return None;
    };
    Some(match detail {
        Some(detail) => anyhow!(detail.clone()).context(ERROR_TEXT),
        None => anyhow!(ERROR_TEXT),
    })
}

/// Long enough for every attempt to time out and back off
fn settle_timeout(config: &SearchConfig) -> Duration {
    config.debounce + (REQUEST_BUDGET + config.retry_delay) * config.max_attempts
}

fn print_presentation(presentation: &Presentation) {
    if let Presentation::Results(results) = presentation {
        for hit in results.iter() {
            println!("{} {}", format!("#{}", hit.id).dimmed(), hit.question.bold());
            println!("   {}", truncate_text(&hit.answer, ANSWER_WIDTH).dimmed());
        }
        return;
    }
    for line in describe(presentation) {
        println!("{line}");
    }
}

/// Plain-text rendering of a presentation
fn describe(presentation: &Presentation) -> Vec<String> {
    match presentation {
        Presentation::Prompt => vec![PROMPT_TEXT.to_string()],
        Presentation::Loading => vec!["Searching...".to_string()],
        Presentation::Results(results) => results
            .iter()
            .map(|hit| format!("#{} {}", hit.id, hit.question))
            .collect(),
        Presentation::NoResults { query } => vec![
            format!("{} ({:?})", NO_RESULTS_TEXT, query),
            CREATE_CALL_TO_ACTION.to_string(),
        ],
        Presentation::Error { detail } => {
            let mut lines = vec![ERROR_TEXT.to_string()];
            lines.extend(detail.clone());
            lines
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use faq_api::{FaqSummary, FetchError};
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread;

    /// Serve one canned HTTP response per connection
    fn serve(response: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        thread::spawn(move || {
            for mut stream in listener.incoming().flatten() {
                let mut buf = [0u8; 4096];
                let _ = stream.read(&mut buf);
                let _ = stream.write_all(response.as_bytes());
            }
        });
        url
    }

    fn chain(error: &anyhow::Error) -> Vec<String> {
        error.chain().map(|cause| cause.to_string()).collect()
    }

    fn failed() -> RequestState {
        RequestState::Failed {
            query: "refund".into(),
            error: FetchError::Status {
                status: 500,
                body: "secret-internal-trace".into(),
            },
            retry_count: 4,
        }
    }

    #[test]
    fn test_settle_timeout() {
        let config = SearchConfig {
            debounce: Duration::from_millis(300),
            max_attempts: 2,
            retry_delay: Duration::from_secs(1),
        };
        assert_eq!(settle_timeout(&config), Duration::from_millis(22_300));
    }

    #[test]
    fn test_describe() {
        assert_eq!(describe(&Presentation::Prompt), vec![PROMPT_TEXT]);

        let hits = [FaqSummary {
            id: 3,
            question: "How do I cancel?".into(),
            answer: "From the billing page.".into(),
        }];
        assert_eq!(
            describe(&Presentation::Results(&hits)),
            vec!["#3 How do I cancel?"]
        );

        assert_eq!(
            describe(&Presentation::NoResults { query: "zzz" }),
            vec![
                format!("{} (\"zzz\")", NO_RESULTS_TEXT),
                CREATE_CALL_TO_ACTION.to_string()
            ]
        );

        assert_eq!(
            describe(&Presentation::Error { detail: None }),
            vec![ERROR_TEXT]
        );
        assert_eq!(
            describe(&Presentation::Error {
                detail: Some("Request failed: reset (after 4 retries)".into())
            }),
            vec![ERROR_TEXT, "Request failed: reset (after 4 retries)"]
        );
    }

    #[test]
    fn test_failure_hides_detail_without_diagnostics() {
        let state = failed();
        let error = failure(&state.presentation(false)).unwrap();
        assert_eq!(chain(&error), vec![ERROR_TEXT]);
    }

    #[test]
    fn test_failure_with_diagnostics() {
        let state = failed();
        let error = failure(&state.presentation(true)).unwrap();
        assert_eq!(
            chain(&error),
            vec![
                ERROR_TEXT,
                "Server returned 500: secret-internal-trace (after 4 retries)"
            ]
        );
    }

    #[test]
    fn test_failure_only_for_errors() {
        assert!(failure(&Presentation::Prompt).is_none());
        assert!(failure(&Presentation::NoResults { query: "x" }).is_none());
    }

    #[test]
    fn test_search_once_keeps_server_body_out_of_error() {
        let url = serve(
            "HTTP/1.1 500 Internal Server Error\r\n\
             Content-Length: 21\r\n\
             Connection: close\r\n\r\n\
             secret-internal-trace",
        );
        let config = Config {
            api_url: url.clone(),
            search: SearchConfig {
                debounce: Duration::from_millis(5),
                max_attempts: 1,
                retry_delay: Duration::from_millis(10),
            },
            show_diagnostics: false,
        };
        let client = Arc::new(FaqClient::new(&url).unwrap());

        let error = search_once(
            client,
            QueryStore::with_text("refund"),
            &config,
            OutputFormat::Table,
        )
        .unwrap_err();

        let causes = chain(&error);
        assert_eq!(causes, vec![ERROR_TEXT]);
        assert!(causes.iter().all(|c| !c.contains("secret-internal-trace")));
    }
}
