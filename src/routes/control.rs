use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
};
use uuid::Uuid;

use crate::{
    dto::control::{ClientSummary, ModuleListItem, PlayModuleRequest, PlayModuleResponse},
    error::AppError,
    geometry::Point,
    services::control_service,
    state::SharedState,
};

/// Operator endpoints: inspect displays and forward play commands to their controllers.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/clients", get(list_displays))
        .route("/clients/{id}/play", post(play_on_display))
        .route("/play", post(play_on_all))
        .route("/modules", get(list_modules))
        .route("/geometry", put(replace_geometry))
}

/// List connected displays with their controller status.
#[utoipa::path(
    get,
    path = "/clients",
    tag = "control",
    responses((status = 200, description = "Connected displays", body = [ClientSummary]))
)]
pub async fn list_displays(State(state): State<SharedState>) -> Json<Vec<ClientSummary>> {
    Json(control_service::list_displays(&state).await)
}

/// Ask one display to switch module at a deadline.
#[utoipa::path(
    post,
    path = "/clients/{id}/play",
    tag = "control",
    params(("id" = Uuid, Path, description = "Identifier of the display")),
    request_body = PlayModuleRequest,
    responses(
        (status = 200, description = "Request forwarded", body = PlayModuleResponse),
        (status = 404, description = "Unknown display or module")
    )
)]
pub async fn play_on_display(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<PlayModuleRequest>,
) -> Result<Json<PlayModuleResponse>, AppError> {
    Ok(Json(
        control_service::play_on_display(&state, id, payload).await?,
    ))
}

/// Ask every connected display to switch module at the same deadline.
#[utoipa::path(
    post,
    path = "/play",
    tag = "control",
    request_body = PlayModuleRequest,
    responses(
        (status = 200, description = "Request forwarded", body = PlayModuleResponse),
        (status = 404, description = "Unknown module")
    )
)]
pub async fn play_on_all(
    State(state): State<SharedState>,
    Json(payload): Json<PlayModuleRequest>,
) -> Result<Json<PlayModuleResponse>, AppError> {
    Ok(Json(control_service::play_on_all(&state, payload).await?))
}

/// List registered modules.
#[utoipa::path(
    get,
    path = "/modules",
    tag = "control",
    responses((status = 200, description = "Registered modules", body = [ModuleListItem]))
)]
pub async fn list_modules(State(state): State<SharedState>) -> Json<Vec<ModuleListItem>> {
    Json(control_service::list_modules(&state))
}

/// Replace the wall outline sent with subsequent module loads.
#[utoipa::path(
    put,
    path = "/geometry",
    tag = "control",
    request_body = [Point],
    responses(
        (status = 204, description = "Geometry replaced"),
        (status = 400, description = "Outline has fewer than three points")
    )
)]
pub async fn replace_geometry(
    State(state): State<SharedState>,
    Json(points): Json<Vec<Point>>,
) -> Result<StatusCode, AppError> {
    control_service::replace_geometry(&state, points)?;
    Ok(StatusCode::NO_CONTENT)
}
