/*!
 * Arbitration Policies
 *
 * Each pass is a total function of current job states and the policy: it
 * reads the registry, decides the admitted set, and applies the difference.
 * Running it twice with no intervening change is a no-op the second time.
 */

use super::Scheduler;
use crate::core::types::{JobId, Priority, SchedulingPolicy};
use crate::events::Notification;
use crate::job::JobStatus;
use tracing::{error, info};

impl Scheduler {
    /// Decide which jobs hold execution slots under the current policy
    pub fn arbitrate(&mut self) {
        if self.shut_down {
            return;
        }
        match self.policy {
            SchedulingPolicy::NonPreemptive => self.arbitrate_non_preemptive(),
            SchedulingPolicy::Preemptive => self.arbitrate_preemptive(),
        }
        debug_assert!(self.running_count() <= self.config.max_running);
    }

    /// Fill free slots with waiting jobs, then paused jobs, each by
    /// priority then id. Running jobs are never displaced.
    fn arbitrate_non_preemptive(&mut self) {
        let mut free = self.config.max_running.saturating_sub(self.running_count());
        if free == 0 {
            return;
        }

        for status in [JobStatus::Waiting, JobStatus::Paused] {
            for job_id in self.admission_order(|s| s == status) {
                if free == 0 {
                    return;
                }
                if self.admit(job_id) {
                    free -= 1;
                }
            }
        }
    }

    /// Recompute admission from scratch: the first `max_running` active jobs
    /// by priority then id run, everything else is parked as `Paused`.
    ///
    /// Jobs that stay admitted are not paused and resumed in between, so a
    /// pass causes no status flicker. The admitted set is the same as pausing
    /// everything first.
    fn arbitrate_preemptive(&mut self) {
        let order = self.admission_order(|s| !s.is_terminal());
        let split = order.len().min(self.config.max_running);
        let (admitted, parked) = order.split_at(split);

        // Free slots before filling them so the running bound holds throughout
        for &job_id in parked {
            self.park(job_id);
        }
        for &job_id in admitted {
            self.admit(job_id);
        }
    }

    /// Ids of jobs whose status matches, by priority ascending then id ascending
    fn admission_order<F>(&self, matches: F) -> Vec<JobId>
    where
        F: Fn(JobStatus) -> bool,
    {
        let mut candidates: Vec<(Priority, JobId)> = self
            .registry
            .values()
            .filter(|job| matches(job.status()))
            .map(|job| (job.priority(), job.id()))
            .collect();
        candidates.sort_unstable();
        candidates.into_iter().map(|(_, id)| id).collect()
    }

    /// Give a job a slot: start it if it never ran, open its gate, mark it
    /// `Running`. Returns false if the job could not be admitted.
    fn admit(&mut self, job_id: JobId) -> bool {
        let Some(job) = self.registry.get_mut(&job_id) else {
            return false;
        };

        let was = job.status();
        match was {
            JobStatus::Running => {
                job.resume();
                return true;
            }
            JobStatus::Completed => return false,
            JobStatus::Waiting | JobStatus::Paused => {}
        }

        let spawned = match job.start(&self.events_tx, self.config.work_unit) {
            Ok(spawned) => spawned,
            Err(e) => {
                error!(job_id, error = %e, "Failed to start job, leaving it {}", was);
                return false;
            }
        };
        job.resume();
        job.transition(JobStatus::Running);

        let name = job.name().to_string();
        let priority = job.priority();
        self.counters.admissions += 1;

        let notification = if spawned {
            info!(job_id, name = %name, priority, "Job started");
            Notification::JobStarted {
                job_id,
                name,
                priority,
            }
        } else {
            info!(job_id, name = %name, priority, "Job resumed");
            Notification::JobResumed { job_id, name }
        };
        self.bus.publish(notification);
        true
    }

    /// Take a job out of contention: pause it if running, otherwise just
    /// mark it `Paused`
    fn park(&mut self, job_id: JobId) {
        let Some(job) = self.registry.get_mut(&job_id) else {
            return;
        };

        match job.status() {
            JobStatus::Running => {
                job.pause();
                job.transition(JobStatus::Paused);
                self.counters.preemptions += 1;

                let name = job.name().to_string();
                info!(job_id, name = %name, "Job preempted");
                self.bus.publish(Notification::JobPaused { job_id, name });
            }
            JobStatus::Waiting => {
                job.transition(JobStatus::Paused);
            }
            JobStatus::Paused | JobStatus::Completed => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{RunnerEvent, RunnerEventKind};

    fn complete(scheduler: &mut Scheduler, job_id: JobId) {
        scheduler
            .events_tx
            .send(RunnerEvent::new(job_id, RunnerEventKind::Completed));
        scheduler.drain_events();
    }

    fn statuses(scheduler: &Scheduler) -> Vec<(JobId, JobStatus)> {
        scheduler
            .jobs()
            .map(|job| (job.id(), job.status()))
            .collect()
    }

    #[test]
    fn test_non_preemptive_fills_free_slots_only() {
        let mut scheduler = Scheduler::new(2);
        let a = scheduler.add_job("a", 60, 5).unwrap();
        let b = scheduler.add_job("b", 60, 5).unwrap();
        let c = scheduler.add_job("c", 60, 0).unwrap();

        assert_eq!(
            statuses(&scheduler),
            vec![
                (a, JobStatus::Running),
                (b, JobStatus::Running),
                (c, JobStatus::Waiting)
            ]
        );
        scheduler.shutdown();
    }

    #[test]
    fn test_preemptive_parks_overflow_waiting_jobs() {
        let mut scheduler = Scheduler::new(1);
        scheduler.set_preemptive(true);
        let a = scheduler.add_job("a", 60, 1).unwrap();
        let b = scheduler.add_job("b", 60, 2).unwrap();

        assert_eq!(
            statuses(&scheduler),
            vec![(a, JobStatus::Running), (b, JobStatus::Paused)]
        );
        // Parked before it ever ran
        assert!(!scheduler.job(b).unwrap().has_started());
        scheduler.shutdown();
    }

    #[test]
    fn test_never_started_paused_job_can_be_resumed() {
        let mut scheduler = Scheduler::new(1);
        scheduler.set_preemptive(true);
        let a = scheduler.add_job("a", 60, 1).unwrap();
        let b = scheduler.add_job("b", 60, 2).unwrap();

        scheduler.set_priority(b, 0).unwrap();

        assert_eq!(
            statuses(&scheduler),
            vec![(a, JobStatus::Paused), (b, JobStatus::Running)]
        );
        assert!(scheduler.job(b).unwrap().has_started());
        assert!(scheduler.job(a).unwrap().is_signalled_paused());
        scheduler.shutdown();
    }

    #[test]
    fn test_switch_to_non_preemptive_resumes_paused() {
        let mut scheduler = Scheduler::new(1);
        scheduler.set_preemptive(true);
        let a = scheduler.add_job("a", 60, 5).unwrap();
        let b = scheduler.add_job("b", 60, 1).unwrap();
        assert_eq!(scheduler.job(a).unwrap().status(), JobStatus::Paused);

        scheduler.set_preemptive(false);
        // b keeps its slot, a stays parked until one frees up
        assert_eq!(
            statuses(&scheduler),
            vec![(a, JobStatus::Paused), (b, JobStatus::Running)]
        );

        // Waiting jobs take a freed slot before paused ones, whatever the priority
        let c = scheduler.add_job("c", 60, 9).unwrap();
        complete(&mut scheduler, b);
        assert_eq!(
            statuses(&scheduler),
            vec![
                (a, JobStatus::Paused),
                (b, JobStatus::Completed),
                (c, JobStatus::Running)
            ]
        );

        complete(&mut scheduler, c);
        assert_eq!(
            statuses(&scheduler),
            vec![
                (a, JobStatus::Running),
                (b, JobStatus::Completed),
                (c, JobStatus::Completed)
            ]
        );
        assert!(!scheduler.job(a).unwrap().is_signalled_paused());
        scheduler.shutdown();
    }

    #[test]
    fn test_paused_jobs_resume_by_priority() {
        let mut scheduler = Scheduler::new(2);
        scheduler.set_preemptive(true);
        let low = scheduler.add_job("low", 60, 7).unwrap();
        let mid = scheduler.add_job("mid", 60, 5).unwrap();
        let top = scheduler.add_job("top", 60, 1).unwrap();
        let top2 = scheduler.add_job("top2", 60, 2).unwrap();
        assert_eq!(scheduler.job(low).unwrap().status(), JobStatus::Paused);
        assert_eq!(scheduler.job(mid).unwrap().status(), JobStatus::Paused);

        scheduler.set_preemptive(false);
        complete(&mut scheduler, top);
        assert_eq!(scheduler.job(mid).unwrap().status(), JobStatus::Running);
        assert_eq!(scheduler.job(low).unwrap().status(), JobStatus::Paused);
        assert_eq!(scheduler.job(top2).unwrap().status(), JobStatus::Running);
        scheduler.shutdown();
    }

    #[test]
    fn test_preemption_counted() {
        let mut scheduler = Scheduler::new(1);
        scheduler.set_preemptive(true);
        scheduler.add_job("low", 60, 9).unwrap();
        scheduler.add_job("high", 60, 1).unwrap();

        let stats = scheduler.stats();
        assert_eq!(stats.preemptions, 1);
        assert_eq!(stats.admissions, 2);
        scheduler.shutdown();
    }
}
