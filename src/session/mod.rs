/// Session controller - Gateway

mod controller;
mod state;

pub use controller::{acknowledgement, failure_message, is_failure_message, QuestionOutcome};
pub use state::{PendingQuestion, SessionPhase, SessionState};
