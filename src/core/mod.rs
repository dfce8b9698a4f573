/*!
 * Core Module
 * Fundamental scheduler types, configuration, and error handling
 */

pub mod config;
pub mod errors;
pub mod types;

// Re-export for convenience
pub use config::SchedulerConfig;
pub use errors::*;
pub use types::*;
