use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::{
    clock::Timestamp,
    control::ControllerHandle,
    dto::control::{ClientSummary, ModuleListItem, PlayModuleRequest, PlayModuleResponse},
    error::{ControlError, ServiceError},
    geometry::Point,
    state::SharedState,
};

/// Forward a play request to a single display.
pub async fn play_on_display(
    state: &SharedState,
    id: Uuid,
    request: PlayModuleRequest,
) -> Result<PlayModuleResponse, ServiceError> {
    let (module, deadline) = prepare_request(state, request)?;
    let handle = state
        .display(&id)
        .ok_or_else(|| ServiceError::NotFound(format!("display `{id}`")))?;

    handle.play_module(module.clone(), deadline)?;
    info!(client_id = %id, %module, %deadline, "forwarded play request");

    Ok(PlayModuleResponse {
        module,
        deadline,
        clients: vec![id],
    })
}

/// Forward a play request to every connected display with one shared deadline.
pub async fn play_on_all(
    state: &SharedState,
    request: PlayModuleRequest,
) -> Result<PlayModuleResponse, ServiceError> {
    let (module, deadline) = prepare_request(state, request)?;

    let clients = state
        .display_handles()
        .into_iter()
        .filter_map(|handle| match handle.play_module(module.clone(), deadline) {
            Ok(()) => Some(handle.client_id()),
            Err(err) => {
                warn!(client_id = %handle.client_id(), error = %err, "display dropped before play request");
                None
            }
        })
        .collect::<Vec<_>>();

    info!(%module, %deadline, displays = clients.len(), "broadcast play request");
    Ok(PlayModuleResponse {
        module,
        deadline,
        clients,
    })
}

/// Status of every connected display, skipping those whose controller already stopped.
pub async fn list_displays(state: &SharedState) -> Vec<ClientSummary> {
    let mut summaries = Vec::new();
    for handle in state.display_handles() {
        match summarize(&handle).await {
            Ok(summary) => summaries.push(summary),
            Err(err) => warn!(client_id = %handle.client_id(), error = %err, "skipping display"),
        }
    }
    summaries.sort_by(|a, b| a.connected_at.cmp(&b.connected_at).then(a.id.cmp(&b.id)));
    summaries
}

/// Registered modules, in registration order.
pub fn list_modules(state: &SharedState) -> Vec<ModuleListItem> {
    state
        .library()
        .names()
        .into_iter()
        .map(|name| ModuleListItem { name })
        .collect()
}

/// Replace the wall outline sent with subsequent module loads.
pub fn replace_geometry(state: &SharedState, points: Vec<Point>) -> Result<(), ServiceError> {
    if points.len() < 3 {
        return Err(ServiceError::InvalidInput(
            "geometry needs at least three points".into(),
        ));
    }
    info!(points = points.len(), "wall geometry replaced");
    state.geometry().replace(points);
    Ok(())
}

/// Validate a play request and resolve its deadline.
fn prepare_request(
    state: &SharedState,
    request: PlayModuleRequest,
) -> Result<(String, Timestamp), ServiceError> {
    request
        .validate()
        .map_err(|err| ServiceError::InvalidInput(format!("validation failed: {err}")))?;

    if state.library().resolve(&request.module).is_none() {
        return Err(ControlError::UnknownModule(request.module).into());
    }

    let deadline = request
        .deadline
        .unwrap_or_else(|| state.clock().now().saturating_add(state.config().default_lead()));
    Ok((request.module, deadline))
}

async fn summarize(handle: &ControllerHandle) -> Result<ClientSummary, ControlError> {
    let status = handle.status().await?;
    let client = handle.client_info();
    Ok(ClientSummary {
        id: client.id(),
        rect: client.rect(),
        connected_at: client.connected_at().to_string(),
        status,
    })
}
