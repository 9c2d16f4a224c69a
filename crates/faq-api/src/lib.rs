//! Client for the FAQ service HTTP API.
//!
//! Endpoints:
//! - `GET  /api/faqs`            all FAQs
//! - `GET  /api/faqs/{id}`       a single FAQ
//! - `GET  /api/search?query=`   ordered search hits
//! - `POST /api/faq`             create a FAQ

mod client;
mod error;
mod types;

pub use client::{decode_search, FaqClient};
pub use error::FetchError;
pub use types::{neighbors, Faq, FaqSummary, NewFaq, ValidationError, MAX_QUESTION_LENGTH};
