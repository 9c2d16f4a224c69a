//! Interactive search TUI
//!
//! ```text
//! ┌────────────────────────────────────────┐
//! │ results / prompt / error               │  search body
//! │                                        │
//! ├────────────────────────────────────────┤
//! │ 3 results in 42ms [Tab] [Enter] [Esc]  │  status bar
//! │ [toast]                                │  toast line
//! │ ▌ billing█                             │  query input
//! └────────────────────────────────────────┘
//! ```
//!
//! Enter on a result swaps the body for the detail view. The search session
//! only lives while the search view is shown.

mod app;
mod detail;
mod input;
mod ui;

pub use app::run;
