pub mod processor;
pub mod queue;

pub use processor::{render_message, CycleOutcome, SubmissionProcessor};
pub use queue::{Trigger, TriggerQueue, TriggerSource};
