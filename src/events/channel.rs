/*!
 * Event Channel
 * Unbounded multi-producer/single-consumer conduit from job runners to the scheduler
 */

use crate::core::types::{JobId, Seconds};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::trace;

/// What a runner observed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RunnerEventKind {
    /// One work unit finished
    Progress { percent: u8, remaining: Seconds },
    /// Remaining time reached zero
    Completed,
    /// First execution started
    TimelineBegin {
        #[serde(with = "time::serde::timestamp")]
        at: OffsetDateTime,
    },
    /// Execution finished
    TimelineEnd {
        #[serde(with = "time::serde::timestamp")]
        at: OffsetDateTime,
    },
}

/// Immutable record emitted by a runner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunnerEvent {
    pub job_id: JobId,
    #[serde(flatten)]
    pub kind: RunnerEventKind,
}

impl RunnerEvent {
    #[inline]
    pub fn new(job_id: JobId, kind: RunnerEventKind) -> Self {
        Self { job_id, kind }
    }
}

/// Create a connected sender/receiver pair
pub fn channel() -> (EventSender, EventReceiver) {
    let (tx, rx) = flume::unbounded();
    (EventSender { tx }, EventReceiver { rx })
}

/// Producer half, cloned into every runner
#[derive(Debug, Clone)]
pub struct EventSender {
    tx: flume::Sender<RunnerEvent>,
}

impl EventSender {
    /// Enqueue without blocking. A dropped receiver means the scheduler is gone
    /// and the event has nowhere to go.
    pub fn send(&self, event: RunnerEvent) {
        if self.tx.send(event).is_err() {
            trace!(job_id = event.job_id, "event receiver dropped, discarding event");
        }
    }
}

/// Consumer half, owned by the scheduler
#[derive(Debug)]
pub struct EventReceiver {
    rx: flume::Receiver<RunnerEvent>,
}

impl EventReceiver {
    /// Take at most `limit` queued events in arrival order. Never blocks;
    /// anything past the limit stays queued for the next call.
    pub fn drain(&self, limit: usize) -> Vec<RunnerEvent> {
        if self.rx.is_empty() {
            return Vec::new();
        }
        let mut batch = Vec::with_capacity(limit.min(self.rx.len()));
        while batch.len() < limit {
            match self.rx.try_recv() {
                Ok(event) => batch.push(event),
                Err(_) => break,
            }
        }
        batch
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}
