/*!
 * Job Types
 * Lifecycle status, read-only snapshots, and timeline records
 */

use crate::core::types::{JobId, Priority, Seconds};
use serde::{Deserialize, Serialize};
use std::fmt;
use time::OffsetDateTime;

/// Job lifecycle status
///
/// `Waiting -> Running <-> Paused -> Completed`. The preemptive policy may
/// also park a never-started job straight from `Waiting` to `Paused`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobStatus {
    Waiting,
    Running,
    Paused,
    Completed,
}

impl JobStatus {
    #[inline]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed)
    }

    /// Whether the scheduler may move a job from `self` to `next`
    pub const fn can_transition_to(&self, next: JobStatus) -> bool {
        use JobStatus::*;
        matches!(
            (*self, next),
            (Waiting, Running)
                | (Waiting, Paused)
                | (Running, Paused)
                | (Running, Completed)
                | (Paused, Running)
                // final unit was already in flight when the pause landed
                | (Paused, Completed)
        )
    }

    /// Listing rank when sorting by status
    #[inline]
    pub const fn display_rank(&self) -> u8 {
        match self {
            Self::Running => 0,
            Self::Paused => 1,
            Self::Waiting => 2,
            Self::Completed => 3,
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Waiting => "Waiting",
            Self::Running => "Running",
            Self::Paused => "Paused",
            Self::Completed => "Completed",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Point-in-time copy of a job for presentation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobInfo {
    pub id: JobId,
    pub name: String,
    pub priority: Priority,
    pub status: JobStatus,
    pub progress: u8,
    pub total: Seconds,
    pub remaining: Seconds,
    #[serde(with = "time::serde::timestamp::option", default)]
    pub started_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::timestamp::option", default)]
    pub ended_at: Option<OffsetDateTime>,
}

/// Start/end pair for chart rendering, independent of live status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineRecord {
    #[serde(with = "time::serde::timestamp")]
    pub start: OffsetDateTime,
    /// `None` while the job has started but not finished
    #[serde(with = "time::serde::timestamp::option", default)]
    pub end: Option<OffsetDateTime>,
}

impl TimelineRecord {
    #[inline]
    pub fn is_open(&self) -> bool {
        self.end.is_none()
    }
}

/// Whole-percent progress, floored
#[inline]
pub fn progress_percent(total: Seconds, remaining: Seconds) -> u8 {
    if total == 0 {
        return 100;
    }
    let done = u64::from(total.saturating_sub(remaining));
    (done * 100 / u64::from(total)) as u8
}
