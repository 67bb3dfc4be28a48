//! DTO definitions used by the operator REST API.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{clock::Timestamp, control::StateKind, dto::ws::DisplayRect};

/// Request to switch one or every display to a module.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct PlayModuleRequest {
    /// Identifier of a registered module.
    #[validate(length(min = 1, message = "module must not be empty"))]
    pub module: String,
    /// Wall-clock instant (ms since epoch) of the switch. Defaults to now plus the
    /// configured lead time.
    #[serde(default)]
    pub deadline: Option<Timestamp>,
}

/// Outcome of a play request.
#[derive(Debug, Serialize, ToSchema)]
pub struct PlayModuleResponse {
    pub module: String,
    pub deadline: Timestamp,
    /// Displays the request was forwarded to.
    pub clients: Vec<Uuid>,
}

/// Diagnostic snapshot of one display controller.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ControllerStatus {
    pub client_id: Uuid,
    pub state: StateKind,
    /// Module targeted or shown (`<None>` while idle).
    pub module: String,
    /// Present while preparing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<Timestamp>,
    pub transitions: u64,
}

/// Connected display with its controller status.
#[derive(Debug, Serialize, ToSchema)]
pub struct ClientSummary {
    pub id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rect: Option<DisplayRect>,
    pub connected_at: String,
    pub status: ControllerStatus,
}

/// Registered module as listed for operators.
#[derive(Debug, Serialize, ToSchema)]
pub struct ModuleListItem {
    pub name: String,
}
