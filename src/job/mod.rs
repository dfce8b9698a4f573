/*!
 * Job Module
 * Simulated units of work, their runner threads, and control signals
 */

mod entry;
pub mod runner;
pub mod signal;
pub mod types;

pub use entry::Job;
pub use runner::{JobRunner, RunOutcome};
pub use signal::{Checkpoint, RunSignal};
pub use types::{progress_percent, JobInfo, JobStatus, TimelineRecord};
