//! Incremental search for the FAQ service.
//!
//! Architecture:
//! - [`Coordinator`]: sans-IO state machine. Keystrokes restart a debounce
//!   deadline; once it passes, the text becomes the debounced query and a
//!   [`FetchRequest`] is handed out. Every request carries a
//!   [`RequestToken`]; responses for anything but the live token are dropped.
//!   Retryable failures re-arm a retry deadline until the attempt budget runs
//!   out.
//! - Worker thread: executes requests against a [`SearchEndpoint`]
//! - [`SearchSession`]: wires the two together over mpsc channels
//!
//! ```text
//!  Idle ──query──▶ Pending ──ok──▶ Success
//!                   │  ▲
//!          retryable│  │retry deadline
//!                   ▼  │
//!                 (backoff) ──budget spent──▶ Failed
//! ```

mod coordinator;
mod deadline;
mod query;
mod session;
mod state;
mod worker;

pub use coordinator::{Coordinator, FetchRequest, RequestToken, SearchConfig, Settled};
pub use deadline::Deadline;
pub use query::QueryStore;
pub use session::SearchSession;
pub use state::{
    CREATE_CALL_TO_ACTION, ERROR_TEXT, NO_RESULTS_TEXT, PROMPT_TEXT, Presentation, RequestState,
};
pub use worker::{FetchResponse, SearchEndpoint, spawn_worker};
