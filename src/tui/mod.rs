//! Terminal user interface
//!
//! Interactive front end for the walkthrough:
//! - Step list with per-step run toggles
//! - Static explanation and code sample for the selected step
//! - Live results (or the failure) inline once a toggle is on
//! - Log pane of recent toggle and pass activity

pub mod app;
pub mod ui;

pub use app::{run_tui, App};
