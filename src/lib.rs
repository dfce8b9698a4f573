/*!
 * Process Scheduler Simulator
 *
 * Jobs with a priority and a fixed duration compete for a bounded number of
 * execution slots. Each admitted job runs on its own thread and reports
 * progress over a channel; the scheduler applies those reports and decides,
 * under a non-preemptive or preemptive priority policy, which jobs run.
 */

pub mod console;
pub mod core;
pub mod events;
pub mod job;
pub mod monitoring;
pub mod scheduler;

// Re-exports
pub use crate::core::{
    JobId, Priority, SchedulerConfig, SchedulerError, SchedulerResult, SchedulingPolicy, Seconds,
};
pub use console::{Command, Response};
pub use events::{Notification, RunnerEvent, RunnerEventKind};
pub use job::{progress_percent, Job, JobInfo, JobStatus, TimelineRecord};
pub use monitoring::init_tracing;
pub use scheduler::{Scheduler, SchedulerStats, SortKey};
