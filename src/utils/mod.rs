// file: src/utils/mod.rs
// description: utility functions module exports
// reference: internal module structure

pub mod logging;
pub mod telemetry;
pub mod validation;

pub use telemetry::{HealthCheck, HealthReport, HealthStatus};
pub use validation::Validator;
