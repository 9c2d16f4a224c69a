use anyhow::{Context, Result};
use reqwest::blocking::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::error::FetchError;
use crate::types::{Faq, FaqSummary, NewFaq};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Longest server error body kept for diagnostics
const MAX_ERROR_BODY: usize = 200;

#[derive(Deserialize)]
struct ErrorResponse {
    detail: serde_json::Value,
}

pub struct FaqClient {
    api_base_url: String,
    client: Client,
}

impl FaqClient {
    pub fn new(api_base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.api_base_url
    }

    /// `GET /api/search?query=`. Results keep the server's relevance order.
    pub fn search(&self, query: &str) -> Result<Vec<FaqSummary>, FetchError> {
        let url = format!(
            "{}/api/search?query={}",
            self.api_base_url,
            urlencoding::encode(query)
        );
        log::debug!("GET {}", url);

        let response = self.client.get(&url).send()?;
        let status = response.status().as_u16();
        let body = response.bytes()?;

        decode_search(status, &body)
    }

    pub fn list(&self) -> Result<Vec<Faq>> {
        let url = format!("{}/api/faqs", self.api_base_url);

        let response = self
            .client
            .get(&url)
            .send()
            .context("Failed to fetch FAQs")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().unwrap_or_default();
            anyhow::bail!("Listing FAQs failed ({}): {}", status, error_text);
        }

        response.json().context("Failed to parse FAQ list")
    }

    /// `Ok(None)` when the server has no FAQ with this id
    pub fn get(&self, id: i64) -> Result<Option<Faq>> {
        let url = format!("{}/api/faqs/{}", self.api_base_url, id);

        let response = self
            .client
            .get(&url)
            .send()
            .with_context(|| format!("Failed to fetch FAQ {}", id))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().unwrap_or_default();
            anyhow::bail!("Fetching FAQ {} failed ({}): {}", id, status, error_text);
        }

        let faq = response
            .json()
            .with_context(|| format!("Failed to parse FAQ {}", id))?;
        Ok(Some(faq))
    }

    pub fn create(&self, new: &NewFaq) -> Result<Faq> {
        let url = format!("{}/api/faq", self.api_base_url);
        log::debug!("POST {} {:?}", url, new);

        let response = self
            .client
            .post(&url)
            .json(new)
            .send()
            .context("Failed to send FAQ")?;

        if !response.status().is_success() {
            let body = response.bytes().unwrap_or_default();
            anyhow::bail!("{}", error_detail(&body));
        }

        response.json().context("Failed to parse created FAQ")
    }
}

/// Classify a search response by status and body
pub fn decode_search(status: u16, body: &[u8]) -> Result<Vec<FaqSummary>, FetchError> {
    match status {
        204 => Ok(Vec::new()),
        200..=299 => {
            serde_json::from_slice(body).map_err(|e| FetchError::Malformed(e.to_string()))
        }
        _ => {
            let text = String::from_utf8_lossy(body);
            Err(FetchError::Status {
                status,
                body: text.trim().chars().take(MAX_ERROR_BODY).collect(),
            })
        }
    }
}

/// The `detail` message of a rejected request, or a generic one
fn error_detail(body: &[u8]) -> String {
    match serde_json::from_slice::<ErrorResponse>(body) {
        Ok(ErrorResponse {
            detail: serde_json::Value::String(s),
        }) => s,
        Ok(ErrorResponse { detail }) if !detail.is_null() => detail.to_string(),
        _ => "Failed to create FAQ".to_string(),
    }
}
