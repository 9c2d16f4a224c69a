use faq_api::{FaqSummary, FetchError};

pub const PROMPT_TEXT: &str = "Type a question to search the FAQ";
pub const NO_RESULTS_TEXT: &str = "No questions match your search.";
pub const CREATE_CALL_TO_ACTION: &str = "Can't find it? Ask a new question with `faq create`.";
pub const ERROR_TEXT: &str = "Sorry, something went wrong while searching. Please try again.";

/// Outcome of the most recent debounced query
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RequestState {
    #[default]
    Idle,
    Pending {
        query: String,
    },
    Success {
        query: String,
        results: Vec<FaqSummary>,
    },
    Failed {
        query: String,
        error: FetchError,
        retry_count: u32,
    },
}

impl RequestState {
    /// The debounced query this state belongs to
    pub fn query(&self) -> Option<&str> {
        match self {
            RequestState::Idle => None,
            RequestState::Pending { query }
            | RequestState::Success { query, .. }
            | RequestState::Failed { query, .. } => Some(query),
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, RequestState::Pending { .. })
    }

    /// What the view should show. `show_diagnostics` exposes the underlying
    /// error; it is meant for development builds only.
    pub fn presentation(&self, show_diagnostics: bool) -> Presentation<'_> {
        match self {
            RequestState::Idle => Presentation::Prompt,
            RequestState::Pending { .. } => Presentation::Loading,
            RequestState::Success { query, results } if results.is_empty() => {
                Presentation::NoResults { query }
            }
            RequestState::Success { results, .. } => Presentation::Results(results),
            RequestState::Failed {
                error, retry_count, ..
            } => Presentation::Error {
                detail: show_diagnostics
                    .then(|| format!("{} (after {} retries)", error, retry_count)),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Presentation<'a> {
    Prompt,
    Loading,
    Results(&'a [FaqSummary]),
    NoResults { query: &'a str },
    Error { detail: Option<String> },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(id: i64) -> FaqSummary {
        FaqSummary {
            id,
            question: format!("q{id}"),
            answer: format!("a{id}"),
        }
    }

    #[test]
    fn test_presentation_follows_state() {
        assert_eq!(RequestState::Idle.presentation(false), Presentation::Prompt);

        let pending = RequestState::Pending {
            query: "billing".into(),
        };
        assert_eq!(pending.presentation(false), Presentation::Loading);
        assert_eq!(pending.query(), Some("billing"));

        let results = vec![hit(2), hit(1)];
        let success = RequestState::Success {
            query: "billing".into(),
            results: results.clone(),
        };
        assert_eq!(
            success.presentation(false),
            Presentation::Results(&results[..])
        );

        let empty = RequestState::Success {
            query: "zzz-nonexistent".into(),
            results: vec![],
        };
        assert_eq!(
            empty.presentation(false),
            Presentation::NoResults {
                query: "zzz-nonexistent"
            }
        );
    }

    #[test]
    fn test_error_detail_only_with_diagnostics() {
        let failed = RequestState::Failed {
            query: "x".into(),
            error: FetchError::Status {
                status: 500,
                body: "boom".into(),
            },
            retry_count: 4,
        };

        assert_eq!(
            failed.presentation(false),
            Presentation::Error { detail: None }
        );
        assert_eq!(
            failed.presentation(true),
            Presentation::Error {
                detail: Some("Server returned 500: boom (after 4 retries)".into())
            }
        );
    }
}
