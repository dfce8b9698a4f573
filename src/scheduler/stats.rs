/*!
 * Scheduler Statistics
 * Status counts and lifetime counters for dashboards
 */

use super::Scheduler;
use crate::core::types::SchedulingPolicy;
use crate::job::JobStatus;
use serde::{Deserialize, Serialize};

/// Snapshot of scheduler state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerStats {
    pub policy: SchedulingPolicy,
    pub max_running: usize,
    pub total_jobs: usize,
    pub running: usize,
    pub paused: usize,
    pub waiting: usize,
    pub completed: usize,
    pub admissions: u64,
    pub preemptions: u64,
    pub completions: u64,
}

impl Scheduler {
    pub fn stats(&self) -> SchedulerStats {
        SchedulerStats {
            policy: self.policy,
            max_running: self.config.max_running,
            total_jobs: self.registry.len(),
            running: self.count_with(JobStatus::Running),
            paused: self.count_with(JobStatus::Paused),
            waiting: self.count_with(JobStatus::Waiting),
            completed: self.count_with(JobStatus::Completed),
            admissions: self.counters.admissions,
            preemptions: self.counters.preemptions,
            completions: self.counters.completions,
        }
    }
}
