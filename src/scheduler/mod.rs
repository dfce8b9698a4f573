/*!
 * Job Scheduler
 *
 * Owns the job registry and is the only writer of job status. Runners report
 * through the event channel; the host calls `drain_events` on its own tick,
 * and every mutation ends in a full arbitration pass.
 */

use crate::core::config::SchedulerConfig;
use crate::core::types::{JobId, SchedulingPolicy};
use crate::events::{self, EventReceiver, EventSender, NotificationBus};
use crate::job::{Job, TimelineRecord};
use std::collections::BTreeMap;
use tracing::{info, warn};

mod operations;
mod policy;
mod queries;
mod stats;

pub use queries::SortKey;
pub use stats::SchedulerStats;

/// Lifetime counters, reported through `stats()`
#[derive(Debug, Default, Clone, Copy)]
struct Counters {
    admissions: u64,
    preemptions: u64,
    completions: u64,
}

/// Job scheduler
///
/// Not `Sync`-shared internally: hosts with several callers wrap it in a
/// mutex so every command and drain runs with exclusive access.
pub struct Scheduler {
    config: SchedulerConfig,
    policy: SchedulingPolicy,

    // Ids are allocated in increasing order, so key order is insertion order
    registry: BTreeMap<JobId, Job>,
    next_id: JobId,

    timeline: BTreeMap<JobId, TimelineRecord>,

    events_tx: EventSender,
    events_rx: EventReceiver,
    bus: NotificationBus,

    counters: Counters,
    arbitration_held: bool,
    shut_down: bool,
}

impl Scheduler {
    /// Create a scheduler with `max_running` slots and default settings.
    /// Zero slots is treated as one.
    pub fn new(max_running: usize) -> Self {
        Self::with_config(SchedulerConfig::default().with_max_running(max_running.max(1)))
    }

    pub fn with_config(config: SchedulerConfig) -> Self {
        info!(
            max_running = config.max_running,
            policy = %config.policy,
            work_unit_ms = config.work_unit.as_millis() as u64,
            event_batch = config.event_batch,
            "Scheduler initialized"
        );

        let (events_tx, events_rx) = events::channel();
        Self {
            policy: config.policy,
            config,
            registry: BTreeMap::new(),
            next_id: 1,
            timeline: BTreeMap::new(),
            events_tx,
            events_rx,
            bus: NotificationBus::new(),
            counters: Counters::default(),
            arbitration_held: false,
            shut_down: false,
        }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Stop every runner and wait for its thread. Jobs keep their last status.
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        self.shut_down = true;

        for job in self.registry.values() {
            job.stop();
        }
        for job in self.registry.values_mut() {
            job.join();
        }
        info!(jobs = self.registry.len(), "Scheduler shut down, all runners stopped");
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::with_config(SchedulerConfig::default())
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        if !self.shut_down {
            if self.registry.values().any(Job::has_runner) {
                warn!("Scheduler dropped without shutdown(), stopping runners");
            }
            self.shutdown();
        }
    }
}
