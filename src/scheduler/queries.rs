/*!
 * Scheduler Queries
 * Read-only views of the registry for presentation layers
 */

use super::Scheduler;
use crate::core::errors::{SchedulerError, SchedulerResult};
use crate::core::types::{JobId, SchedulingPolicy};
use crate::events::Notification;
use crate::job::{Job, JobInfo, JobStatus, TimelineRecord};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

/// Listing order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    /// Priority ascending, ties by id
    #[default]
    Priority,
    /// Running, Paused, Waiting, Completed; ties by id
    Status,
    /// Not-yet-started first, then by start instant; ties by id
    StartTime,
}

impl FromStr for SortKey {
    type Err = SchedulerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "priority" | "prio" => Ok(Self::Priority),
            "status" => Ok(Self::Status),
            "start_time" | "start" | "started" => Ok(Self::StartTime),
            _ => Err(SchedulerError::InvalidInput(format!(
                "Invalid sort key '{}'. Valid: priority, status, start_time",
                s
            ))),
        }
    }
}

impl Scheduler {
    /// Borrow a job from the registry
    pub fn job(&self, job_id: JobId) -> Option<&Job> {
        self.registry.get(&job_id)
    }

    /// Snapshot of one job
    pub fn get_job(&self, job_id: JobId) -> SchedulerResult<JobInfo> {
        self.registry
            .get(&job_id)
            .map(Job::info)
            .ok_or(SchedulerError::NotFound(job_id))
    }

    /// Jobs in insertion order
    pub fn jobs(&self) -> impl Iterator<Item = &Job> {
        self.registry.values()
    }

    /// Snapshots of every job in the requested order
    pub fn list_jobs(&self, sort_by: SortKey) -> Vec<JobInfo> {
        let mut jobs: Vec<JobInfo> = self.registry.values().map(Job::info).collect();
        // Registry order is id order and the sort is stable, so ties stay by id
        match sort_by {
            SortKey::Priority => jobs.sort_by_key(|job| job.priority),
            SortKey::Status => jobs.sort_by_key(|job| job.status.display_rank()),
            SortKey::StartTime => jobs.sort_by_key(|job| job.started_at),
        }
        jobs
    }

    /// Start/end instants of every job that has begun executing
    pub fn timeline(&self) -> BTreeMap<JobId, TimelineRecord> {
        self.timeline.clone()
    }

    pub fn running_count(&self) -> usize {
        self.count_with(JobStatus::Running)
    }

    pub(super) fn count_with(&self, status: JobStatus) -> usize {
        self.registry
            .values()
            .filter(|job| job.status() == status)
            .count()
    }

    /// Whether every registered job has completed
    pub fn all_completed(&self) -> bool {
        self.registry.values().all(|job| job.status().is_terminal())
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    pub fn policy(&self) -> SchedulingPolicy {
        self.policy
    }

    pub fn max_running(&self) -> usize {
        self.config.max_running
    }

    /// Receive every notification published from now on
    pub fn subscribe(&mut self) -> flume::Receiver<Notification> {
        self.bus.subscribe()
    }
}
