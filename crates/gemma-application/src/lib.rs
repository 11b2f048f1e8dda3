//! Application layer: the session controller, the edit-selection use case
//! and command dispatch.

pub mod assistant;
pub mod edit_selection;
pub mod session;

pub use assistant::Assistant;
pub use edit_selection::{EditOutcome, edit_selection};
pub use session::{ControllerSnapshot, Reconciliation, SessionController, TRANSCRIPT_DIVERGED};
