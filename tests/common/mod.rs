/*!
 * Shared test helpers
 */

#![allow(dead_code)]

use procsched::{Scheduler, SchedulerConfig, SchedulingPolicy};
use std::thread;
use std::time::{Duration, Instant};

/// Work units long enough that nothing completes during a test
pub const SLOW_UNIT: Duration = Duration::from_secs(60);

/// Work units short enough to run jobs to completion quickly
pub const FAST_UNIT: Duration = Duration::from_millis(5);

pub fn scheduler(max_running: usize, policy: SchedulingPolicy, unit: Duration) -> Scheduler {
    Scheduler::with_config(
        SchedulerConfig::default()
            .with_max_running(max_running)
            .with_policy(policy)
            .with_work_unit(unit),
    )
}

/// Drain on a short tick until `done` holds or the deadline passes
pub fn drive_until<F>(scheduler: &mut Scheduler, timeout: Duration, mut done: F) -> bool
where
    F: FnMut(&Scheduler) -> bool,
{
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        scheduler.drain_events();
        if done(scheduler) {
            return true;
        }
        thread::sleep(Duration::from_millis(2));
    }
    false
}
