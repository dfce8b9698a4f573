/*!
 * Arbitration Property Tests
 * Invariants over random command sequences
 */

mod common;

use common::{scheduler, SLOW_UNIT};
use procsched::{JobId, JobStatus, Scheduler, SchedulingPolicy};
use proptest::prelude::*;
use std::collections::HashSet;

#[derive(Debug, Clone)]
enum Op {
    Add { priority: i32, total: u32 },
    SetPriority { pick: usize, priority: i32 },
    SetPreemptive(bool),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (-3i32..10, 1u32..100).prop_map(|(priority, total)| Op::Add { priority, total }),
        3 => (any::<usize>(), -3i32..10)
            .prop_map(|(pick, priority)| Op::SetPriority { pick, priority }),
        1 => any::<bool>().prop_map(Op::SetPreemptive),
    ]
}

fn assignment(scheduler: &Scheduler) -> Vec<(JobId, JobStatus)> {
    scheduler.jobs().map(|job| (job.id(), job.status())).collect()
}

/// Top `max_running` active jobs by priority, ties by id
fn expected_admitted(scheduler: &Scheduler) -> Vec<JobId> {
    let mut active: Vec<_> = scheduler
        .jobs()
        .filter(|job| !job.status().is_terminal())
        .map(|job| (job.priority(), job.id()))
        .collect();
    active.sort();
    let mut ids: Vec<JobId> = active
        .into_iter()
        .take(scheduler.max_running())
        .map(|(_, id)| id)
        .collect();
    ids.sort();
    ids
}

fn running_ids(scheduler: &Scheduler) -> Vec<JobId> {
    scheduler
        .jobs()
        .filter(|job| job.status() == JobStatus::Running)
        .map(|job| job.id())
        .collect()
}

fn apply(scheduler: &mut Scheduler, op: &Op) {
    match *op {
        Op::Add { priority, total } => {
            scheduler.add_job("job", total, priority).unwrap();
        }
        Op::SetPriority { pick, priority } => {
            if scheduler.is_empty() {
                return;
            }
            let id = (pick % scheduler.len()) as JobId + 1;
            scheduler.set_priority(id, priority).unwrap();
        }
        Op::SetPreemptive(enabled) => scheduler.set_preemptive(enabled),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn running_never_exceeds_slots(
        max_running in 1usize..4,
        ops in prop::collection::vec(op_strategy(), 1..20),
    ) {
        let mut scheduler = scheduler(max_running, SchedulingPolicy::NonPreemptive, SLOW_UNIT);
        for op in &ops {
            apply(&mut scheduler, op);
            prop_assert!(scheduler.running_count() <= max_running);
        }
        scheduler.shutdown();
    }

    #[test]
    fn preemptive_admits_top_priorities_idempotently(
        max_running in 1usize..4,
        ops in prop::collection::vec(op_strategy(), 1..20),
    ) {
        let mut scheduler = scheduler(max_running, SchedulingPolicy::Preemptive, SLOW_UNIT);
        for op in &ops {
            if matches!(op, Op::SetPreemptive(_)) {
                continue;
            }
            apply(&mut scheduler, op);
            prop_assert_eq!(running_ids(&scheduler), expected_admitted(&scheduler));

            let before = assignment(&scheduler);
            scheduler.arbitrate();
            prop_assert_eq!(assignment(&scheduler), before);
        }
        scheduler.shutdown();
    }

    #[test]
    fn non_preemptive_running_is_monotonic(
        max_running in 1usize..4,
        ops in prop::collection::vec(op_strategy(), 1..20),
    ) {
        let mut scheduler = scheduler(max_running, SchedulingPolicy::NonPreemptive, SLOW_UNIT);
        let mut seen_running: HashSet<JobId> = HashSet::new();
        for op in &ops {
            if matches!(op, Op::SetPreemptive(_)) {
                continue;
            }
            apply(&mut scheduler, op);
            for id in &seen_running {
                prop_assert_eq!(scheduler.job(*id).unwrap().status(), JobStatus::Running);
            }
            seen_running.extend(running_ids(&scheduler));
        }
        scheduler.shutdown();
    }
}
