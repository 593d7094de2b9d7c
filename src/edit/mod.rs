//! Edit session state machine and parameter-panel helpers.

mod panel;
mod session;

pub use panel::clamp_to_panel;
pub use session::{EditSession, PickOutcome, SessionState};
