use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{clock::Timestamp, geometry::Point, library::ClientModuleConfig};

#[derive(Debug, Deserialize, Serialize, ToSchema)]
/// Messages accepted from display WebSocket clients.
#[serde(tag = "type")]
pub enum DisplayInboundMessage {
    /// First frame of every connection.
    #[serde(rename = "hello")]
    Hello {
        #[serde(default)]
        rect: Option<DisplayRect>,
    },
    /// The display hit an unrecoverable problem with the current module.
    #[serde(rename = "error")]
    Error { message: String },
    #[serde(other)]
    Unknown,
}

impl DisplayInboundMessage {
    /// Parse a text frame.
    pub fn from_json_str(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

/// Region of the wall covered by one display, in wall coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize, ToSchema)]
pub struct DisplayRect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

/// Messages pushed to display WebSocket clients.
#[derive(Debug, Serialize)]
#[serde(tag = "event", content = "payload")]
pub enum DisplayOutboundMessage {
    /// Load `module` now and start showing it at `time`.
    #[serde(rename = "loadModule")]
    LoadModule(LoadModulePayload),
}

/// Body of the `loadModule` event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LoadModulePayload {
    pub module: ClientModuleConfig,
    pub time: Timestamp,
    pub geo: Vec<Point>,
}
