/*!
 * Job Runner
 *
 * Thread body that drives one job to completion. The runner owns a private
 * countdown and reports through the event channel; it never touches the
 * registry and never sets a status.
 */

use super::signal::{Checkpoint, RunSignal};
use super::types::progress_percent;
use crate::core::types::{JobId, Seconds};
use crate::events::{EventSender, RunnerEvent, RunnerEventKind};
use std::sync::Arc;
use std::time::Duration;
use time::OffsetDateTime;
use tracing::{debug, trace};

/// How a runner finished
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Completed,
    Stopped { remaining: Seconds },
}

pub struct JobRunner {
    job_id: JobId,
    total: Seconds,
    remaining: Seconds,
    unit: Duration,
    signal: Arc<RunSignal>,
    events: EventSender,
}

impl JobRunner {
    pub fn new(
        job_id: JobId,
        total: Seconds,
        unit: Duration,
        signal: Arc<RunSignal>,
        events: EventSender,
    ) -> Self {
        Self {
            job_id,
            total,
            remaining: total,
            unit,
            signal,
            events,
        }
    }

    pub fn run(mut self) -> RunOutcome {
        self.emit(RunnerEventKind::TimelineBegin {
            at: OffsetDateTime::now_utc(),
        });
        debug!(job_id = self.job_id, total = self.total, "runner began");

        while self.remaining > 0 {
            if self.signal.checkpoint() == Checkpoint::Stopped
                || self.signal.work_for(self.unit) == Checkpoint::Stopped
            {
                debug!(
                    job_id = self.job_id,
                    remaining = self.remaining,
                    "runner stopped before completion"
                );
                return RunOutcome::Stopped {
                    remaining: self.remaining,
                };
            }

            self.remaining -= 1;
            let percent = progress_percent(self.total, self.remaining);
            trace!(job_id = self.job_id, remaining = self.remaining, percent, "work unit done");
            self.emit(RunnerEventKind::Progress {
                percent,
                remaining: self.remaining,
            });
        }

        self.emit(RunnerEventKind::Completed);
        self.emit(RunnerEventKind::TimelineEnd {
            at: OffsetDateTime::now_utc(),
        });
        debug!(job_id = self.job_id, "runner completed");
        RunOutcome::Completed
    }

    #[inline]
    fn emit(&self, kind: RunnerEventKind) {
        self.events.send(RunnerEvent::new(self.job_id, kind));
    }
}
