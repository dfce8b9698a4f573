/*!
 * Job Entry
 * Registry record for one job plus the control handle to its runner
 */

use super::runner::{JobRunner, RunOutcome};
use super::signal::RunSignal;
use super::types::{progress_percent, JobInfo, JobStatus};
use crate::core::errors::{SchedulerError, SchedulerResult};
use crate::core::types::{JobId, Priority, Seconds};
use crate::events::EventSender;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use time::OffsetDateTime;
use tracing::{debug, warn};

/// A simulated unit of work
///
/// Owned by the scheduler's registry. Status and counters change only through
/// the crate-private setters the scheduler calls; the runner thread reports
/// through events instead.
#[derive(Debug)]
pub struct Job {
    id: JobId,
    name: String,
    total: Seconds,
    priority: Priority,
    remaining: Seconds,
    status: JobStatus,
    started_at: Option<OffsetDateTime>,
    ended_at: Option<OffsetDateTime>,
    signal: Arc<RunSignal>,
    started: bool,
    runner: Option<JoinHandle<RunOutcome>>,
}

impl Job {
    pub(crate) fn new(id: JobId, name: String, total: Seconds, priority: Priority) -> Self {
        Self {
            id,
            name,
            total,
            priority,
            remaining: total,
            status: JobStatus::Waiting,
            started_at: None,
            ended_at: None,
            signal: Arc::new(RunSignal::new()),
            started: false,
            runner: None,
        }
    }

    #[inline]
    pub fn id(&self) -> JobId {
        self.id
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn total(&self) -> Seconds {
        self.total
    }

    #[inline]
    pub fn priority(&self) -> Priority {
        self.priority
    }

    #[inline]
    pub fn remaining(&self) -> Seconds {
        self.remaining
    }

    #[inline]
    pub fn status(&self) -> JobStatus {
        self.status
    }

    /// Always derived from `remaining` and `total`
    #[inline]
    pub fn progress(&self) -> u8 {
        progress_percent(self.total, self.remaining)
    }

    #[inline]
    pub fn started_at(&self) -> Option<OffsetDateTime> {
        self.started_at
    }

    #[inline]
    pub fn ended_at(&self) -> Option<OffsetDateTime> {
        self.ended_at
    }

    /// Whether a runner thread has ever been spawned
    #[inline]
    pub fn has_started(&self) -> bool {
        self.started
    }

    /// Whether a runner thread is still attached and not yet joined
    #[inline]
    pub(crate) fn has_runner(&self) -> bool {
        self.runner.is_some()
    }

    pub fn info(&self) -> JobInfo {
        JobInfo {
            id: self.id,
            name: self.name.clone(),
            priority: self.priority,
            status: self.status,
            progress: self.progress(),
            total: self.total,
            remaining: self.remaining,
            started_at: self.started_at,
            ended_at: self.ended_at,
        }
    }

    // =========================================================================
    // Runner control
    // =========================================================================

    /// Spawn the runner. Runs at most once per job; returns `Ok(false)` when a
    /// runner already exists or the job is complete.
    pub fn start(&mut self, events: &EventSender, unit: Duration) -> SchedulerResult<bool> {
        if self.started || self.status.is_terminal() {
            return Ok(false);
        }

        let runner = JobRunner::new(self.id, self.total, unit, self.signal.clone(), events.clone());
        let handle = thread::Builder::new()
            .name(format!("job-{}", self.id))
            .spawn(move || runner.run())
            .map_err(|e| SchedulerError::RunnerSpawn(e.to_string()))?;

        self.started = true;
        self.runner = Some(handle);
        Ok(true)
    }

    /// Ask the runner to park before its next work unit
    pub fn pause(&self) {
        if !self.status.is_terminal() {
            self.signal.pause();
        }
    }

    /// Let a parked runner continue
    pub fn resume(&self) {
        if !self.status.is_terminal() {
            self.signal.resume();
        }
    }

    /// Halt the runner for good without completing the job
    pub fn stop(&self) {
        self.signal.stop();
    }

    #[inline]
    pub fn is_signalled_paused(&self) -> bool {
        self.signal.is_paused()
    }

    /// Wait for the runner thread to exit. Call after `stop` or once the
    /// runner has sent its last event.
    pub(crate) fn join(&mut self) {
        let Some(handle) = self.runner.take() else {
            return;
        };
        match handle.join() {
            Ok(outcome) => debug!(job_id = self.id, ?outcome, "runner joined"),
            Err(_) => warn!(job_id = self.id, "runner thread panicked"),
        }
    }

    // =========================================================================
    // Scheduler-only mutation
    // =========================================================================

    /// Apply a status change if the lifecycle allows it
    pub(crate) fn transition(&mut self, next: JobStatus) -> bool {
        if self.status == next {
            return false;
        }
        if !self.status.can_transition_to(next) {
            warn!(
                job_id = self.id,
                from = %self.status,
                to = %next,
                "rejected invalid status transition"
            );
            return false;
        }
        self.status = next;
        true
    }

    pub(crate) fn set_priority(&mut self, priority: Priority) -> Priority {
        std::mem::replace(&mut self.priority, priority)
    }

    /// Record runner progress. Remaining only moves toward zero.
    pub(crate) fn apply_progress(&mut self, remaining: Seconds) {
        if self.status.is_terminal() {
            return;
        }
        self.remaining = remaining.min(self.remaining);
    }

    pub(crate) fn mark_started(&mut self, at: OffsetDateTime) {
        self.started_at.get_or_insert(at);
    }

    pub(crate) fn mark_ended(&mut self, at: OffsetDateTime) {
        self.ended_at.get_or_insert(at);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::channel;

    #[test]
    fn test_new_job_is_waiting() {
        let job = Job::new(1, "build".into(), 10, 5);
        assert_eq!(job.status(), JobStatus::Waiting);
        assert_eq!(job.remaining(), 10);
        assert_eq!(job.progress(), 0);
        assert!(!job.has_started());
    }

    #[test]
    fn test_start_is_idempotent() {
        let (tx, _rx) = channel();
        let mut job = Job::new(1, "build".into(), 1, 5);

        assert!(job.start(&tx, Duration::from_millis(1)).unwrap());
        assert!(!job.start(&tx, Duration::from_millis(1)).unwrap());

        job.stop();
        job.join();
        assert!(!job.has_runner());

        // Joined runners are never respawned
        assert!(job.has_started());
        assert!(!job.start(&tx, Duration::from_millis(1)).unwrap());
        assert!(!job.has_runner());
    }

    #[test]
    fn test_progress_follows_remaining() {
        let mut job = Job::new(1, "build".into(), 4, 5);
        job.apply_progress(3);
        assert_eq!(job.progress(), 25);

        // Stale report never moves remaining back up
        job.apply_progress(4);
        assert_eq!(job.remaining(), 3);
    }

    #[test]
    fn test_completed_job_ignores_controls() {
        let mut job = Job::new(1, "build".into(), 1, 5);
        assert!(job.transition(JobStatus::Running));
        job.apply_progress(0);
        assert!(job.transition(JobStatus::Completed));

        job.pause();
        assert!(!job.is_signalled_paused());
        assert!(!job.transition(JobStatus::Running));
        assert_eq!(job.status(), JobStatus::Completed);
    }

    #[test]
    fn test_timestamps_set_once() {
        let mut job = Job::new(1, "build".into(), 1, 5);
        let first = OffsetDateTime::UNIX_EPOCH;
        let later = first + time::Duration::seconds(10);

        job.mark_started(first);
        job.mark_started(later);
        assert_eq!(job.started_at(), Some(first));

        job.mark_ended(later);
        job.mark_ended(first);
        assert_eq!(job.ended_at(), Some(later));
    }
}
