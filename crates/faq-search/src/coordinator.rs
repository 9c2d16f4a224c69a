//! Turns keystrokes into at most one live search request.
//!
//! The coordinator never does IO and never reads the clock; callers pass
//! `now` in and carry out the [`FetchRequest`]s it hands back.

use crate::deadline::Deadline;
use crate::query::QueryStore;
use crate::state::{Presentation, RequestState};
use faq_api::{FaqSummary, FetchError};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchConfig {
    /// Quiet period before typed text becomes the debounced query
    pub debounce: Duration,
    /// Attempts per query, the first one included
    pub max_attempts: u32,
    /// Pause between a failed attempt and the next one
    pub retry_delay: Duration,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(300),
            max_attempts: 5,
            retry_delay: Duration::from_millis(3000),
        }
    }
}

/// Identifies the debounced query a request was issued for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestToken(u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub token: RequestToken,
    pub query: String,
    /// 1-based
    pub attempt: u32,
}

/// A pending query came to rest
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settled {
    Success,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Ready to be handed out by `poll`
    Dispatch,
    /// Handed out, waiting for the response
    Awaiting,
    /// Failed, next attempt armed
    Backoff(Deadline),
}

/// The work derived from one debounced query. Replacing it drops its timer.
#[derive(Debug)]
struct InFlight {
    token: RequestToken,
    query: String,
    attempt: u32,
    phase: Phase,
}

pub struct Coordinator {
    config: SearchConfig,
    query: QueryStore,
    debounce: Option<Deadline>,
    debounced: String,
    last_token: u64,
    in_flight: Option<InFlight>,
    state: RequestState,
}

impl Coordinator {
    /// A non-blank query already in the store is searched right away,
    /// without waiting for a quiet period.
    pub fn new(config: SearchConfig, query: QueryStore) -> Self {
        let initial = query.text();
        let mut coordinator = Self {
            config,
            query,
            debounce: None,
            debounced: String::new(),
            last_token: 0,
            in_flight: None,
            state: RequestState::Idle,
        };
        coordinator.adopt(&initial);
        coordinator
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn query(&self) -> &QueryStore {
        &self.query
    }

    pub fn state(&self) -> &RequestState {
        &self.state
    }

    pub fn debounced_query(&self) -> &str {
        &self.debounced
    }

    pub fn presentation(&self, show_diagnostics: bool) -> Presentation<'_> {
        self.state.presentation(show_diagnostics)
    }

    /// Attempt number of the current query, while one is in flight
    pub fn attempt(&self) -> Option<u32> {
        self.in_flight.as_ref().map(|f| f.attempt)
    }

    /// Something is still going to happen without further input
    pub fn is_busy(&self) -> bool {
        self.debounce.is_some() || self.in_flight.is_some()
    }

    /// Earliest armed timer, for sizing the caller's wait
    pub fn next_deadline(&self) -> Option<Deadline> {
        let backoff = match &self.in_flight {
            Some(InFlight {
                phase: Phase::Backoff(deadline),
                ..
            }) => Some(*deadline),
            _ => None,
        };

        match (self.debounce, backoff) {
            (Some(a), Some(b)) => Some(if a.at() <= b.at() { a } else { b }),
            (a, b) => a.or(b),
        }
    }

    /// Record a keystroke and restart the quiet period
    pub fn on_input(&mut self, text: &str, now: Instant) {
        self.query.replace(text);
        self.debounce = Some(Deadline::after(now, self.config.debounce));
    }

    /// Fire due timers. Returns the request the caller should issue now.
    pub fn poll(&mut self, now: Instant) -> Option<FetchRequest> {
        if self.debounce.is_some_and(|d| d.is_due(now)) {
            self.debounce = None;
            let text = self.query.text();
            self.adopt(&text);
        }

        let in_flight = self.in_flight.as_mut()?;
        match in_flight.phase {
            Phase::Dispatch => {}
            Phase::Backoff(deadline) if deadline.is_due(now) => {
                in_flight.attempt += 1;
                log::debug!(
                    "Retrying search for {:?} (attempt {})",
                    in_flight.query,
                    in_flight.attempt
                );
            }
            _ => return None,
        }
        in_flight.phase = Phase::Awaiting;

        Some(FetchRequest {
            token: in_flight.token,
            query: in_flight.query.clone(),
            attempt: in_flight.attempt,
        })
    }

    /// Apply the outcome of a request. Outcomes of anything but the request
    /// currently awaited are dropped.
    pub fn on_response(
        &mut self,
        token: RequestToken,
        result: Result<Vec<FaqSummary>, FetchError>,
        now: Instant,
    ) -> Option<Settled> {
        let Some(mut in_flight) = self
            .in_flight
            .take_if(|f| f.token == token && f.phase == Phase::Awaiting)
        else {
            log::debug!("Discarding stale search response {:?}", token);
            return None;
        };

        match result {
            Ok(results) => {
                self.state = RequestState::Success {
                    query: in_flight.query,
                    results,
                };
                Some(Settled::Success)
            }
            Err(error) if error.is_retryable() && in_flight.attempt < self.config.max_attempts => {
                log::debug!(
                    "Search for {:?} failed on attempt {}: {}",
                    in_flight.query,
                    in_flight.attempt,
                    error
                );
                in_flight.phase = Phase::Backoff(Deadline::after(now, self.config.retry_delay));
                self.in_flight = Some(in_flight);
                None
            }
            Err(error) => {
                self.state = RequestState::Failed {
                    query: in_flight.query,
                    error,
                    retry_count: in_flight.attempt - 1,
                };
                Some(Settled::Failed)
            }
        }
    }

    /// Whether focus should go back to the query input after a settle
    pub fn should_reclaim_focus(&self, input_focused: bool) -> bool {
        !input_focused && !self.query.is_blank()
    }

    fn adopt(&mut self, raw: &str) {
        let query = raw.trim();

        // Same query again: keep what is running or already answered, but
        // give a failed one a fresh start.
        if query == self.debounced && !matches!(self.state, RequestState::Failed { .. }) {
            return;
        }
        self.debounced = query.to_string();

        if let Some(old) = self.in_flight.take() {
            log::debug!("Search for {:?} superseded by {:?}", old.query, query);
        }

        if query.is_empty() {
            self.state = RequestState::Idle;
            return;
        }

        self.last_token += 1;
        self.in_flight = Some(InFlight {
            token: RequestToken(self.last_token),
            query: query.to_string(),
            attempt: 1,
            phase: Phase::Dispatch,
        });
        self.state = RequestState::Pending {
            query: query.to_string(),
        };
    }
}
