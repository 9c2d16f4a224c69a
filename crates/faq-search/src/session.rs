//! A coordinator wired to a worker thread

use crate::coordinator::{Coordinator, FetchRequest, SearchConfig, Settled};
use crate::query::QueryStore;
use crate::worker::{FetchResponse, SearchEndpoint, spawn_worker};
use faq_api::FetchError;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

/// Lives as long as the search view. Dropping it releases the coordinator's
/// timers and lets the worker thread wind down.
pub struct SearchSession {
    coordinator: Coordinator,
    request_tx: Sender<FetchRequest>,
    response_rx: Receiver<FetchResponse>,
    last_duration: Option<Duration>,
    _worker: JoinHandle<()>,
}

impl SearchSession {
    pub fn start<E>(endpoint: E, config: SearchConfig, query: QueryStore) -> Self
    where
        E: SearchEndpoint + Send + 'static,
    {
        let (request_tx, request_rx) = mpsc::channel();
        let (response_tx, response_rx) = mpsc::channel();
        let worker = spawn_worker(endpoint, request_rx, response_tx);

        Self {
            coordinator: Coordinator::new(config, query),
            request_tx,
            response_rx,
            last_duration: None,
            _worker: worker,
        }
    }

    pub fn coordinator(&self) -> &Coordinator {
        &self.coordinator
    }

    /// Round-trip time of the last request that settled the state
    pub fn last_duration(&self) -> Option<Duration> {
        self.last_duration
    }

    pub fn on_input(&mut self, text: &str, now: Instant) {
        self.coordinator.on_input(text, now);
    }

    /// Apply responses that arrived and send whatever is due. Returns the
    /// settle, if one happened.
    pub fn tick(&mut self, now: Instant) -> Option<Settled> {
        let mut settled = None;

        while let Ok(response) = self.response_rx.try_recv() {
            settled = self.apply(response, now).or(settled);
        }
        self.dispatch(now);

        settled
    }

    /// Block until the current query settles, nothing is left to wait for,
    /// or `timeout` passes.
    pub fn run_until_settled(&mut self, timeout: Duration) -> Option<Settled> {
        let give_up = Instant::now() + timeout;

        loop {
            let now = Instant::now();
            if let Some(settled) = self.tick(now) {
                return Some(settled);
            }
            if !self.coordinator.is_busy() || now >= give_up {
                return None;
            }

            let budget = give_up.saturating_duration_since(now);
            let wait = self
                .coordinator
                .next_deadline()
                .map_or(budget, |deadline| deadline.remaining(now).min(budget));

            match self.response_rx.recv_timeout(wait) {
                Ok(response) => {
                    if let Some(settled) = self.apply(response, Instant::now()) {
                        return Some(settled);
                    }
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => return None,
            }
        }
    }

    fn apply(&mut self, response: FetchResponse, now: Instant) -> Option<Settled> {
        log::debug!(
            "Search for {:?} answered on attempt {} in {:?} (status {:?})",
            response.query,
            response.attempt,
            response.duration,
            response.result.as_ref().err().and_then(FetchError::status)
        );
        let settled = self
            .coordinator
            .on_response(response.token, response.result, now);
        if settled.is_some() {
            self.last_duration = Some(response.duration);
        }
        settled
    }

    fn dispatch(&mut self, now: Instant) {
        let Some(request) = self.coordinator.poll(now) else {
            return;
        };
        let token = request.token;

        if self.request_tx.send(request).is_err() {
            log::warn!("Search worker is gone");
            self.coordinator.on_response(
                token,
                Err(FetchError::Transport("search worker stopped".to_string())),
                now,
            );
        }
    }
}
