/*!
 * Error Types
 * Caller-facing scheduler errors with thiserror, miette, and serde support
 */

use super::types::JobId;
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Scheduler errors
///
/// Every variant is a caller error reported synchronously; a rejected command
/// leaves the registry untouched.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum SchedulerError {
    #[error("Invalid input: {0}")]
    #[diagnostic(
        code(scheduler::invalid_input),
        help("Job names must be non-empty, durations positive, and priorities integers.")
    )]
    InvalidInput(String),

    #[error("Job {0} not found")]
    #[diagnostic(
        code(scheduler::not_found),
        help("Job ids are assigned by add_job; list jobs to see the known ids.")
    )]
    NotFound(JobId),

    #[error("Failed to spawn job runner: {0}")]
    #[diagnostic(
        code(scheduler::runner_spawn),
        help("The host refused to create a worker thread. The job stays waiting and is retried on the next pass.")
    )]
    RunnerSpawn(String),
}

/// Result type for scheduler operations
pub type SchedulerResult<T> = Result<T, SchedulerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scheduler_error_serialization() {
        let error = SchedulerError::NotFound(42);
        let json = serde_json::to_string(&error).unwrap();
        assert_eq!(json, r#"{"error_type":"not_found","details":42}"#);

        let deserialized: SchedulerError = serde_json::from_str(&json).unwrap();
        assert_eq!(error, deserialized);
    }

    #[test]
    fn test_error_display() {
        let error = SchedulerError::InvalidInput("name must not be empty".into());
        assert_eq!(error.to_string(), "Invalid input: name must not be empty");
        assert_eq!(SchedulerError::NotFound(7).to_string(), "Job 7 not found");
    }

    #[test]
    fn test_diagnostic_codes() {
        let error = SchedulerError::NotFound(1);
        let code = error.code().map(|c| c.to_string());
        assert_eq!(code.as_deref(), Some("scheduler::not_found"));
    }
}
