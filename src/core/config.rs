/*!
 * Scheduler Configuration
 *
 * Defaults mirror the interactive tool this simulator models: two execution
 * slots, one-second work units, ten events applied per drain.
 *
 * Environment overrides:
 * - PROCSCHED_MAX_RUNNING: execution slots (>= 1)
 * - PROCSCHED_WORK_UNIT_MS: real-time length of one simulated second
 * - PROCSCHED_EVENT_BATCH: events applied per drain pass (>= 1)
 * - PROCSCHED_TICK_MS: host drain interval, clamped to 100..=500
 * - PROCSCHED_PREEMPTIVE: start in preemptive mode
 */

use super::errors::{SchedulerError, SchedulerResult};
use super::types::SchedulingPolicy;
use std::time::Duration;

// =============================================================================
// LIMITS
// =============================================================================

/// Default concurrent execution slots
pub const DEFAULT_MAX_RUNNING: usize = 2;

/// Real-time length of one simulated second
pub const DEFAULT_WORK_UNIT: Duration = Duration::from_secs(1);

/// Events applied per drain pass; leftovers wait for the next pass
pub const DEFAULT_EVENT_BATCH: usize = 10;

/// Host drain cadence
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(250);

/// Recommended host drain cadence band
pub const MIN_TICK_INTERVAL: Duration = Duration::from_millis(100);
pub const MAX_TICK_INTERVAL: Duration = Duration::from_millis(500);

// =============================================================================
// CONFIGURATION
// =============================================================================

/// Scheduler configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulerConfig {
    pub max_running: usize,
    pub work_unit: Duration,
    pub event_batch: usize,
    pub tick_interval: Duration,
    pub policy: SchedulingPolicy,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            max_running: DEFAULT_MAX_RUNNING,
            work_unit: DEFAULT_WORK_UNIT,
            event_batch: DEFAULT_EVENT_BATCH,
            tick_interval: DEFAULT_TICK_INTERVAL,
            policy: SchedulingPolicy::NonPreemptive,
        }
    }
}

impl SchedulerConfig {
    /// Defaults overridden by `PROCSCHED_*` environment variables
    pub fn from_env() -> SchedulerResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> SchedulerResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup("PROCSCHED_MAX_RUNNING") {
            config.max_running = parse_number("PROCSCHED_MAX_RUNNING", &raw)?;
        }
        if let Some(raw) = lookup("PROCSCHED_WORK_UNIT_MS") {
            config.work_unit = Duration::from_millis(parse_number("PROCSCHED_WORK_UNIT_MS", &raw)?);
        }
        if let Some(raw) = lookup("PROCSCHED_EVENT_BATCH") {
            config.event_batch = parse_number("PROCSCHED_EVENT_BATCH", &raw)?;
        }
        if let Some(raw) = lookup("PROCSCHED_TICK_MS") {
            config.tick_interval = Duration::from_millis(parse_number("PROCSCHED_TICK_MS", &raw)?);
        }
        if let Some(raw) = lookup("PROCSCHED_PREEMPTIVE") {
            config.policy = raw.parse().map_err(SchedulerError::InvalidInput)?;
        }

        config.validated()
    }

    pub fn with_max_running(mut self, max_running: usize) -> Self {
        self.max_running = max_running;
        self
    }

    pub fn with_work_unit(mut self, work_unit: Duration) -> Self {
        self.work_unit = work_unit;
        self
    }

    pub fn with_event_batch(mut self, event_batch: usize) -> Self {
        self.event_batch = event_batch;
        self
    }

    pub fn with_tick_interval(mut self, tick_interval: Duration) -> Self {
        self.tick_interval = tick_interval;
        self
    }

    pub fn with_policy(mut self, policy: SchedulingPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Reject unusable values and clamp the tick into its band
    pub fn validated(mut self) -> SchedulerResult<Self> {
        if self.max_running == 0 {
            return Err(SchedulerError::InvalidInput(
                "max_running must be at least 1".into(),
            ));
        }
        if self.event_batch == 0 {
            return Err(SchedulerError::InvalidInput(
                "event_batch must be at least 1".into(),
            ));
        }
        if self.work_unit.is_zero() {
            return Err(SchedulerError::InvalidInput(
                "work_unit must be positive".into(),
            ));
        }
        self.tick_interval = self.tick_interval.clamp(MIN_TICK_INTERVAL, MAX_TICK_INTERVAL);
        Ok(self)
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, raw: &str) -> SchedulerResult<T> {
    raw.trim()
        .parse()
        .map_err(|_| SchedulerError::InvalidInput(format!("{}={:?} is not a valid number", key, raw)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = SchedulerConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config, SchedulerConfig::default());
        assert_eq!(config.max_running, 2);
        assert_eq!(config.event_batch, 10);
    }

    #[test]
    fn test_overrides() {
        let config = SchedulerConfig::from_lookup(lookup_from(&[
            ("PROCSCHED_MAX_RUNNING", "4"),
            ("PROCSCHED_WORK_UNIT_MS", "20"),
            ("PROCSCHED_PREEMPTIVE", "true"),
        ]))
        .unwrap();

        assert_eq!(config.max_running, 4);
        assert_eq!(config.work_unit, Duration::from_millis(20));
        assert_eq!(config.policy, SchedulingPolicy::Preemptive);
    }

    #[test]
    fn test_tick_is_clamped() {
        let config =
            SchedulerConfig::from_lookup(lookup_from(&[("PROCSCHED_TICK_MS", "5000")])).unwrap();
        assert_eq!(config.tick_interval, MAX_TICK_INTERVAL);

        let config =
            SchedulerConfig::from_lookup(lookup_from(&[("PROCSCHED_TICK_MS", "1")])).unwrap();
        assert_eq!(config.tick_interval, MIN_TICK_INTERVAL);
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            SchedulerConfig::from_lookup(lookup_from(&[("PROCSCHED_MAX_RUNNING", "0")])),
            Err(SchedulerError::InvalidInput(_))
        ));
        assert!(matches!(
            SchedulerConfig::from_lookup(lookup_from(&[("PROCSCHED_EVENT_BATCH", "ten")])),
            Err(SchedulerError::InvalidInput(_))
        ));
        assert!(matches!(
            SchedulerConfig::from_lookup(lookup_from(&[("PROCSCHED_PREEMPTIVE", "maybe")])),
            Err(SchedulerError::InvalidInput(_))
        ));
    }
}
