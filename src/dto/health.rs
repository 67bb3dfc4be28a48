use serde::Serialize;
use utoipa::ToSchema;

/// Simple health response returned by the `/healthcheck` route.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Health status ("ok").
    pub status: String,
    /// Number of displays currently connected.
    pub displays: usize,
}

impl HealthResponse {
    /// Create a health response indicating the system is operational.
    pub fn ok(displays: usize) -> Self {
        Self {
            status: "ok".to_string(),
            displays,
        }
    }
}
