/*!
 * Scheduler Operations
 * Commands that mutate the registry, and application of runner events
 */

use super::Scheduler;
use crate::core::errors::{SchedulerError, SchedulerResult};
use crate::core::types::{JobId, Priority, SchedulingPolicy, Seconds};
use crate::events::{Notification, RunnerEvent, RunnerEventKind};
use crate::job::{Job, JobStatus, TimelineRecord};
use tracing::{debug, info, trace, warn};

impl Scheduler {
    /// Register a new `Waiting` job and run an arbitration pass
    pub fn add_job(
        &mut self,
        name: impl Into<String>,
        total: Seconds,
        priority: Priority,
    ) -> SchedulerResult<JobId> {
        let name = name.into();
        let name = name.trim();
        if name.is_empty() {
            return Err(SchedulerError::InvalidInput(
                "job name cannot be empty".into(),
            ));
        }
        if total == 0 {
            return Err(SchedulerError::InvalidInput(
                "job duration must be positive".into(),
            ));
        }

        let id = self.next_id;
        self.next_id += 1;

        let job = Job::new(id, name.to_string(), total, priority);
        let info = job.info();
        self.registry.insert(id, job);

        info!(job_id = id, name, total, priority, "Job added");
        self.bus.publish(Notification::JobAdded { job: info });

        self.request_arbitration();
        Ok(id)
    }

    /// Change a job's priority and run an arbitration pass.
    ///
    /// Allowed on completed jobs, where it has no scheduling effect.
    pub fn set_priority(&mut self, job_id: JobId, priority: Priority) -> SchedulerResult<()> {
        let job = self
            .registry
            .get_mut(&job_id)
            .ok_or(SchedulerError::NotFound(job_id))?;

        let old_priority = job.set_priority(priority);
        let name = job.name().to_string();

        info!(job_id, old_priority, new_priority = priority, "Job priority changed");
        self.bus.publish(Notification::PriorityChanged {
            job_id,
            name,
            old_priority,
            new_priority: priority,
        });

        self.request_arbitration();
        Ok(())
    }

    /// Switch arbitration policy and run a pass
    pub fn set_policy(&mut self, policy: SchedulingPolicy) {
        if policy != self.policy {
            info!(from = %self.policy, to = %policy, "Changing scheduling policy");
            self.policy = policy;
            self.bus.publish(Notification::PolicyChanged { policy });
        }
        self.request_arbitration();
    }

    /// Console toggle for `set_policy`
    pub fn set_preemptive(&mut self, enabled: bool) {
        self.set_policy(SchedulingPolicy::from_preemptive(enabled));
    }

    /// Apply at most one batch of queued runner events.
    ///
    /// Non-blocking; returns how many events were applied. Leftovers stay
    /// queued for the next call. Any completion triggers an arbitration pass.
    pub fn drain_events(&mut self) -> usize {
        let batch = self.events_rx.drain(self.config.event_batch);
        if batch.is_empty() {
            return 0;
        }

        let mut completed = false;
        for event in &batch {
            completed |= self.apply_event(event);
        }
        trace!(applied = batch.len(), backlog = self.events_rx.len(), "events drained");

        if completed {
            self.request_arbitration();
        }
        batch.len()
    }

    /// Run several commands with a single arbitration pass at the end.
    ///
    /// Passes requested inside `f` are coalesced, so jobs added together are
    /// admitted by priority rather than by arrival.
    pub fn batch<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        let outer = std::mem::replace(&mut self.arbitration_held, true);
        let result = f(self);
        self.arbitration_held = outer;
        if !outer {
            self.arbitrate();
        }
        result
    }

    /// Arbitrate now, or after the enclosing `batch`
    fn request_arbitration(&mut self) {
        if !self.arbitration_held {
            self.arbitrate();
        }
    }

    /// Events still waiting to be drained
    pub fn pending_events(&self) -> usize {
        self.events_rx.len()
    }

    /// Returns true when the event completed a job
    fn apply_event(&mut self, event: &RunnerEvent) -> bool {
        let job_id = event.job_id;
        let Some(job) = self.registry.get_mut(&job_id) else {
            warn!(job_id, "event for unknown job dropped");
            return false;
        };

        match event.kind {
            RunnerEventKind::Progress { remaining, .. } => {
                job.apply_progress(remaining);
                let notification = Notification::JobProgressed {
                    job_id,
                    percent: job.progress(),
                    remaining: job.remaining(),
                };
                self.bus.publish(notification);
                false
            }
            RunnerEventKind::Completed => {
                if job.status().is_terminal() {
                    debug!(job_id, "duplicate completion ignored");
                    return false;
                }
                job.apply_progress(0);
                if !job.transition(JobStatus::Completed) {
                    return false;
                }

                let notification = Notification::JobCompleted {
                    job_id,
                    name: job.name().to_string(),
                    total: job.total(),
                };
                info!(job_id, name = job.name(), "Job completed");
                self.counters.completions += 1;
                self.bus.publish(notification);
                true
            }
            RunnerEventKind::TimelineBegin { at } => {
                job.mark_started(at);
                self.timeline
                    .entry(job_id)
                    .or_insert(TimelineRecord { start: at, end: None });
                false
            }
            RunnerEventKind::TimelineEnd { at } => {
                job.mark_ended(at);
                if let Some(record) = self.timeline.get_mut(&job_id) {
                    record.end.get_or_insert(at);
                }
                // Last event a runner sends; its thread is about to exit
                job.join();
                false
            }
        }
    }
}
