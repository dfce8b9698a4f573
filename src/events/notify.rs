/*!
 * Notification Bus
 * Publish-subscribe fan-out of scheduler changes to presentation layers
 */

use crate::core::types::{JobId, Priority, SchedulingPolicy, Seconds};
use crate::job::JobInfo;
use serde::Serialize;
use tracing::debug;

/// Change observed by presentation layers
///
/// Each variant carries enough to render without re-querying the registry.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Notification {
    JobAdded {
        job: JobInfo,
    },
    PriorityChanged {
        job_id: JobId,
        name: String,
        old_priority: Priority,
        new_priority: Priority,
    },
    JobStarted {
        job_id: JobId,
        name: String,
        priority: Priority,
    },
    JobPaused {
        job_id: JobId,
        name: String,
    },
    JobResumed {
        job_id: JobId,
        name: String,
    },
    JobProgressed {
        job_id: JobId,
        percent: u8,
        remaining: Seconds,
    },
    JobCompleted {
        job_id: JobId,
        name: String,
        total: Seconds,
    },
    PolicyChanged {
        policy: SchedulingPolicy,
    },
}

/// Fan-out to any number of subscribers
#[derive(Debug, Default)]
pub struct NotificationBus {
    subscribers: Vec<flume::Sender<Notification>>,
}

impl NotificationBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self) -> flume::Receiver<Notification> {
        let (tx, rx) = flume::unbounded();
        self.subscribers.push(tx);
        debug!(subscribers = self.subscribers.len(), "notification subscriber added");
        rx
    }

    /// Deliver to every live subscriber, pruning disconnected ones
    pub fn publish(&mut self, notification: Notification) -> usize {
        if self.subscribers.is_empty() {
            return 0;
        }

        let before = self.subscribers.len();
        self.subscribers
            .retain(|tx| tx.send(notification.clone()).is_ok());

        let pruned = before - self.subscribers.len();
        if pruned > 0 {
            debug!(pruned, "notification subscribers disconnected");
        }
        self.subscribers.len()
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}
