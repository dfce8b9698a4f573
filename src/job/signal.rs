/*!
 * Run Signal
 *
 * Two-state gate (running/paused) plus a one-way stop latch, shared between
 * the scheduler and a job's runner thread. Built on parking_lot::Condvar so
 * a stop can wake a runner parked at its checkpoint or mid work unit.
 */

use parking_lot::{Condvar, Mutex};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct GateState {
    paused: bool,
    stopped: bool,
}

/// Outcome of a runner checkpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Checkpoint {
    /// Gate is open, keep working
    Proceed,
    /// Stop was requested, exit without completing
    Stopped,
}

/// Pause/resume/stop signal for one job
#[derive(Debug)]
pub struct RunSignal {
    state: Mutex<GateState>,
    condvar: Condvar,
}

impl RunSignal {
    /// New signal with the gate open
    pub fn new() -> Self {
        Self {
            state: Mutex::new(GateState {
                paused: false,
                stopped: false,
            }),
            condvar: Condvar::new(),
        }
    }

    /// Close the gate; the runner parks at its next checkpoint
    pub fn pause(&self) {
        self.state.lock().paused = true;
    }

    /// Open the gate and wake a parked runner
    pub fn resume(&self) {
        let mut state = self.state.lock();
        state.paused = false;
        self.condvar.notify_all();
    }

    /// Latch stop and wake the runner wherever it is parked
    pub fn stop(&self) {
        let mut state = self.state.lock();
        state.stopped = true;
        self.condvar.notify_all();
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.state.lock().paused
    }

    /// Block while paused. Stop is checked after every wake.
    pub fn checkpoint(&self) -> Checkpoint {
        let mut state = self.state.lock();
        loop {
            if state.stopped {
                return Checkpoint::Stopped;
            }
            if !state.paused {
                return Checkpoint::Proceed;
            }
            self.condvar.wait(&mut state);
        }
    }

    /// Spend one work unit of real time, returning early only on stop.
    ///
    /// Pausing does not cut a unit short; the runner honours it at the
    /// next checkpoint.
    pub fn work_for(&self, unit: Duration) -> Checkpoint {
        let deadline = Instant::now() + unit;
        let mut state = self.state.lock();
        loop {
            if state.stopped {
                return Checkpoint::Stopped;
            }
            if self.condvar.wait_until(&mut state, deadline).timed_out() {
                return if state.stopped {
                    Checkpoint::Stopped
                } else {
                    Checkpoint::Proceed
                };
            }
        }
    }
}

impl Default for RunSignal {
    fn default() -> Self {
        Self::new()
    }
}
