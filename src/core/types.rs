/*!
 * Core Types
 * Common types used across the scheduler
 */

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Job identifier, allocated by the scheduler in creation order
pub type JobId = u32;

/// Priority level (lower value = higher precedence)
pub type Priority = i32;

/// Simulated duration in whole work units ("seconds")
pub type Seconds = u32;

/// Arbitration policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchedulingPolicy {
    /// Priority-ordered FIFO admission into free slots; running jobs are never displaced
    #[default]
    NonPreemptive,
    /// Admission recomputed from scratch on every pass; lower priority numbers displace running jobs
    Preemptive,
}

impl SchedulingPolicy {
    /// Policy from the console's on/off toggle
    #[inline]
    pub const fn from_preemptive(enabled: bool) -> Self {
        if enabled {
            Self::Preemptive
        } else {
            Self::NonPreemptive
        }
    }

    #[inline]
    pub const fn is_preemptive(&self) -> bool {
        matches!(self, Self::Preemptive)
    }

    #[inline(always)]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NonPreemptive => "non_preemptive",
            Self::Preemptive => "preemptive",
        }
    }
}

impl fmt::Display for SchedulingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SchedulingPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "preemptive" | "preempt" | "on" | "true" | "1" => Ok(Self::Preemptive),
            "non_preemptive" | "nonpreemptive" | "fifo" | "off" | "false" | "0" => {
                Ok(Self::NonPreemptive)
            }
            _ => Err(format!(
                "Invalid policy '{}'. Valid: preemptive, non_preemptive",
                s
            )),
        }
    }
}
