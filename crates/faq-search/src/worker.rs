//! Background search worker thread

use crate::coordinator::{FetchRequest, RequestToken};
use faq_api::{FaqClient, FaqSummary, FetchError};
use std::sync::Arc;
use std::sync::mpsc::{Receiver, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Something that answers search queries
pub trait SearchEndpoint {
    fn search(&self, query: &str) -> Result<Vec<FaqSummary>, FetchError>;
}

impl SearchEndpoint for FaqClient {
    fn search(&self, query: &str) -> Result<Vec<FaqSummary>, FetchError> {
        FaqClient::search(self, query)
    }
}

impl<E: SearchEndpoint + ?Sized> SearchEndpoint for Arc<E> {
    fn search(&self, query: &str) -> Result<Vec<FaqSummary>, FetchError> {
        (**self).search(query)
    }
}

/// Result of one request, sent back from the worker thread
#[derive(Debug, Clone)]
pub struct FetchResponse {
    pub token: RequestToken,
    pub query: String,
    pub attempt: u32,
    pub result: Result<Vec<FaqSummary>, FetchError>,
    pub duration: Duration,
}

/// Spawn the search worker thread. It exits once the request sender is
/// dropped or nobody listens for responses anymore.
pub fn spawn_worker<E>(
    endpoint: E,
    request_rx: Receiver<FetchRequest>,
    response_tx: Sender<FetchResponse>,
) -> JoinHandle<()>
where
    E: SearchEndpoint + Send + 'static,
{
    thread::spawn(move || {
        while let Ok(mut request) = request_rx.recv() {
            // Anything queued behind this request supersedes it
            while let Ok(newer) = request_rx.try_recv() {
                log::debug!("Skipping superseded search for {:?}", request.query);
                request = newer;
            }

            let start = Instant::now();
            let result = endpoint.search(&request.query);
            let duration = start.elapsed();

            if let Err(e) = &result {
                log::warn!(
                    "Search for {:?} failed (attempt {}): {}",
                    request.query,
                    request.attempt,
                    e
                );
            }

            let response = FetchResponse {
                token: request.token,
                query: request.query,
                attempt: request.attempt,
                result,
                duration,
            };
            if response_tx.send(response).is_err() {
                break;
            }
        }
    })
}
