/*!
 * Console Commands
 *
 * Typed command surface for UI and CLI hosts. Commands arrive either as JSON
 * (`{"command":"add_job",...}`) or as a short text form:
 *
 * ```text
 * add <name> <seconds> <priority>
 * prio <job_id> <priority>
 * preempt on|off
 * list [priority|status|start_time]
 * get <job_id>
 * timeline
 * stats
 * quit
 * ```
 *
 * Several text commands separated by `;` run as one batch with a single
 * arbitration pass at the end.
 */

use crate::core::errors::{SchedulerError, SchedulerResult};
use crate::core::types::{JobId, Priority, Seconds};
use crate::job::{JobInfo, TimelineRecord};
use crate::scheduler::{Scheduler, SchedulerStats, SortKey};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Command from a UI or CLI
///
/// Numeric fields are wide signed integers so out-of-range input is reported
/// as `InvalidInput` rather than failing to parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    AddJob {
        name: String,
        duration: i64,
        priority: i64,
    },
    ChangePriority {
        job_id: JobId,
        priority: i64,
    },
    SetPreemptive {
        enabled: bool,
    },
    ListJobs {
        #[serde(default)]
        sort_by: SortKey,
    },
    GetJob {
        job_id: JobId,
    },
    GetTimeline,
    Stats,
    Quit,
}

/// Result of a successful command
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "response", rename_all = "snake_case")]
pub enum Response {
    JobAdded { job_id: JobId },
    Ok,
    Jobs { jobs: Vec<JobInfo> },
    Job { job: JobInfo },
    Timeline { timeline: BTreeMap<JobId, TimelineRecord> },
    Stats { stats: SchedulerStats },
    Bye,
}

impl Command {
    /// Parse one input line in JSON or text form
    pub fn parse(line: &str) -> SchedulerResult<Self> {
        let line = line.trim();
        if line.starts_with('{') {
            return serde_json::from_str(line)
                .map_err(|e| SchedulerError::InvalidInput(format!("malformed command: {}", e)));
        }

        let tokens: Vec<&str> = line.split_whitespace().collect();
        let Some((&verb, args)) = tokens.split_first() else {
            return Err(SchedulerError::InvalidInput("empty command".into()));
        };

        match (verb.to_lowercase().as_str(), args) {
            ("add", [name @ .., duration, priority]) if !name.is_empty() => Ok(Self::AddJob {
                name: name.join(" "),
                duration: parse_int("duration", duration)?,
                priority: parse_int("priority", priority)?,
            }),
            ("prio" | "priority", [job_id, priority]) => Ok(Self::ChangePriority {
                job_id: parse_int("job id", job_id)?,
                priority: parse_int("priority", priority)?,
            }),
            ("preempt" | "preemptive", [toggle]) => Ok(Self::SetPreemptive {
                enabled: parse_toggle(toggle)?,
            }),
            ("list" | "ls", []) => Ok(Self::ListJobs {
                sort_by: SortKey::default(),
            }),
            ("list" | "ls", [key]) => Ok(Self::ListJobs {
                sort_by: key.parse()?,
            }),
            ("get" | "show", [job_id]) => Ok(Self::GetJob {
                job_id: parse_int("job id", job_id)?,
            }),
            ("timeline" | "gantt", []) => Ok(Self::GetTimeline),
            ("stats", []) => Ok(Self::Stats),
            ("quit" | "exit", []) => Ok(Self::Quit),
            _ => Err(SchedulerError::InvalidInput(format!(
                "unrecognised command '{}'",
                line
            ))),
        }
    }

    /// Run against the scheduler
    pub fn execute(self, scheduler: &mut Scheduler) -> SchedulerResult<Response> {
        debug!(command = ?self, "executing command");
        match self {
            Self::AddJob {
                name,
                duration,
                priority,
            } => {
                let total = to_seconds(duration)?;
                let priority = to_priority(priority)?;
                let job_id = scheduler.add_job(name, total, priority)?;
                Ok(Response::JobAdded { job_id })
            }
            Self::ChangePriority { job_id, priority } => {
                scheduler.set_priority(job_id, to_priority(priority)?)?;
                Ok(Response::Ok)
            }
            Self::SetPreemptive { enabled } => {
                scheduler.set_preemptive(enabled);
                Ok(Response::Ok)
            }
            Self::ListJobs { sort_by } => Ok(Response::Jobs {
                jobs: scheduler.list_jobs(sort_by),
            }),
            Self::GetJob { job_id } => Ok(Response::Job {
                job: scheduler.get_job(job_id)?,
            }),
            Self::GetTimeline => Ok(Response::Timeline {
                timeline: scheduler.timeline(),
            }),
            Self::Stats => Ok(Response::Stats {
                stats: scheduler.stats(),
            }),
            Self::Quit => Ok(Response::Bye),
        }
    }
}

/// Parse and run one input line, batching `;`-separated commands
pub fn execute_line(line: &str, scheduler: &mut Scheduler) -> Vec<SchedulerResult<Response>> {
    let line = line.trim();
    if line.starts_with('{') || !line.contains(';') {
        return vec![Command::parse(line).and_then(|command| command.execute(scheduler))];
    }

    scheduler.batch(|scheduler| {
        line.split(';')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| Command::parse(part).and_then(|command| command.execute(scheduler)))
            .collect()
    })
}

fn parse_int<T: std::str::FromStr>(field: &str, raw: &str) -> SchedulerResult<T> {
    raw.parse()
        .map_err(|_| SchedulerError::InvalidInput(format!("{} must be a number, got '{}'", field, raw)))
}

fn parse_toggle(raw: &str) -> SchedulerResult<bool> {
    match raw.to_lowercase().as_str() {
        "on" | "true" | "yes" | "1" => Ok(true),
        "off" | "false" | "no" | "0" => Ok(false),
        _ => Err(SchedulerError::InvalidInput(format!(
            "expected on or off, got '{}'",
            raw
        ))),
    }
}

fn to_seconds(duration: i64) -> SchedulerResult<Seconds> {
    match Seconds::try_from(duration) {
        Ok(total) if total > 0 => Ok(total),
        _ => Err(SchedulerError::InvalidInput(format!(
            "job duration must be a positive number of seconds, got {}",
            duration
        ))),
    }
}

fn to_priority(priority: i64) -> SchedulerResult<Priority> {
    Priority::try_from(priority).map_err(|_| {
        SchedulerError::InvalidInput(format!("priority {} is out of range", priority))
    })
}
