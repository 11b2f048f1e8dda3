//! Session application services.
//!
//! The controller owns the topic list for the lifetime of the process; the
//! transcript module holds the append-only reconciliation used by `saveChat`.

mod controller;
mod transcript;

pub use controller::{ControllerSnapshot, PANEL_TITLE, SessionController, TRANSCRIPT_DIVERGED};
pub use transcript::{Reconciliation, reconcile};
