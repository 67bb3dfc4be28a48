use crate::{dto::health::HealthResponse, state::SharedState};

/// Respond with a static health payload including the number of connected displays.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    HealthResponse::ok(state.displays().len())
}
