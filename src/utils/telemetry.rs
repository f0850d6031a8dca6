// file: src/utils/telemetry.rs
// description: health report served by the HTTP service
// reference: component checks plus a serializable stats payload

use serde::{Deserialize, Serialize};

/// A degraded component still serves requests, possibly with fallback text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum HealthStatus {
    Healthy,
    Degraded,
}

/// Health check result for a component
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheck {
    pub component: String,
    pub status: HealthStatus,
    pub message: Option<String>,
}

impl HealthCheck {
    pub fn healthy(component: &str, message: Option<String>) -> Self {
        Self {
            component: component.to_string(),
            status: HealthStatus::Healthy,
            message,
        }
    }

    pub fn degraded(component: &str, message: String) -> Self {
        Self {
            component: component.to_string(),
            status: HealthStatus::Degraded,
            message: Some(message),
        }
    }
}

/// Report for `GET /health`; `stats` carries service counters.
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport<T: Serialize> {
    pub overall_status: HealthStatus,
    pub checks: Vec<HealthCheck>,
    pub timestamp: i64,
    pub version: String,
    pub stats: T,
}

impl<T: Serialize> HealthReport<T> {
    pub fn new(checks: Vec<HealthCheck>, stats: T) -> Self {
        let overall_status = if checks.iter().any(|c| c.status == HealthStatus::Degraded) {
            HealthStatus::Degraded
        } else {
            HealthStatus::Healthy
        };

        Self {
            overall_status,
            checks,
            timestamp: chrono::Utc::now().timestamp(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            stats,
        }
    }
}
