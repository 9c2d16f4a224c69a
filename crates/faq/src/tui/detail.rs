//! Background loading for the detail view

use anyhow::Result;
use faq_api::{neighbors, Faq, FaqClient};
use std::sync::mpsc::{Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Where the detail view gets single FAQs and the full list from
pub trait FaqSource {
    fn get(&self, id: i64) -> Result<Option<Faq>>;
    fn list(&self) -> Result<Vec<Faq>>;
}

impl FaqSource for FaqClient {
    fn get(&self, id: i64) -> Result<Option<Faq>> {
        FaqClient::get(self, id)
    }

    fn list(&self) -> Result<Vec<Faq>> {
        FaqClient::list(self)
    }
}

impl<S: FaqSource + ?Sized> FaqSource for Arc<S> {
    fn get(&self, id: i64) -> Result<Option<Faq>> {
        (**self).get(id)
    }

    fn list(&self) -> Result<Vec<Faq>> {
        (**self).list()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaqDetail {
    pub faq: Faq,
    pub prev: Option<Faq>,
    pub next: Option<Faq>,
}

#[derive(Debug, Clone, Copy)]
pub struct DetailRequest {
    pub id: i64,
}

#[derive(Debug)]
pub struct DetailResponse {
    pub id: i64,
    /// `Ok(None)`: no such FAQ
    pub result: Result<Option<FaqDetail>, String>,
}

/// Fetch one FAQ and find its neighbours. The list is cached in `known` and
/// refetched when it does not contain `id`.
pub fn load_detail<S: FaqSource + ?Sized>(
    source: &S,
    known: &mut Option<Vec<Faq>>,
    id: i64,
) -> Result<Option<FaqDetail>> {
    let Some(faq) = source.get(id)? else {
        return Ok(None);
    };

    let stale = known
        .as_ref()
        .is_none_or(|faqs| !faqs.iter().any(|f| f.id == id));
    if stale {
        *known = Some(source.list()?);
    }

    let faqs = known.as_deref().unwrap_or_default();
    let (prev, next) = neighbors(faqs, id);

    Ok(Some(FaqDetail {
        prev: prev.cloned(),
        next: next.cloned(),
        faq,
    }))
}

/// Spawn the detail worker. Only the newest queued request is served.
pub fn spawn_detail_worker<S>(
    source: S,
    request_rx: Receiver<DetailRequest>,
    response_tx: Sender<DetailResponse>,
) -> JoinHandle<()>
where
    S: FaqSource + Send + 'static,
{
    thread::spawn(move || {
        let mut known = None;

        while let Ok(mut request) = request_rx.recv() {
            while let Ok(newer) = request_rx.try_recv() {
                request = newer;
            }

            let result = load_detail(&source, &mut known, request.id).map_err(|e| {
                log::warn!("Loading FAQ {} failed: {:#}", request.id, e);
                format!("{:#}", e)
            });

            let response = DetailResponse {
                id: request.id,
                result,
            };
            if response_tx.send(response).is_err() {
                break;
            }
        }
    })
}
