use axum::extract::ws::Message;
use tokio::sync::mpsc;
use tracing::warn;
use uuid::Uuid;

use crate::{
    clock::Timestamp,
    dto::ws::{DisplayOutboundMessage, DisplayRect, LoadModulePayload},
    error::ControlError,
};

/// Identifier assigned to a display connection when it is accepted.
pub type ClientId = Uuid;

/// Addressable, write-only channel to one remote display.
///
/// Cloning is cheap; every clone feeds the same writer task.
#[derive(Debug, Clone)]
pub struct ClientHandle {
    id: ClientId,
    rect: Option<DisplayRect>,
    connected_at: Timestamp,
    tx: mpsc::UnboundedSender<Message>,
}

impl ClientHandle {
    /// Wrap the outbound writer channel of a freshly identified display.
    pub fn new(
        id: ClientId,
        rect: Option<DisplayRect>,
        connected_at: Timestamp,
        tx: mpsc::UnboundedSender<Message>,
    ) -> Self {
        Self {
            id,
            rect,
            connected_at,
            tx,
        }
    }

    /// Connection identifier.
    pub fn id(&self) -> ClientId {
        self.id
    }

    /// Region of the wall covered by this display, if it reported one.
    pub fn rect(&self) -> Option<DisplayRect> {
        self.rect
    }

    /// Instant the display identified itself.
    pub fn connected_at(&self) -> Timestamp {
        self.connected_at
    }

    /// Tell the display to load a module ahead of `payload.time`.
    ///
    /// Fire-and-forget: the message is queued on the writer task and no acknowledgement
    /// is awaited.
    pub fn load_module(&self, payload: LoadModulePayload) -> Result<(), ControlError> {
        self.send(&DisplayOutboundMessage::LoadModule(payload))
    }

    /// Serialize `message` and queue it for the writer task.
    ///
    /// Serialization failures surface as [`ControlError::Encode`]; a closed writer channel is
    /// reported as [`ControlError::ClientGone`].
    fn send(&self, message: &DisplayOutboundMessage) -> Result<(), ControlError> {
        let payload = serde_json::to_string(message).inspect_err(|err| {
            warn!(client_id = %self.id, error = %err, "failed to serialize display message");
        })?;

        self.tx
            .send(Message::Text(payload.into()))
            .map_err(|_| ControlError::ClientGone(self.id))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::*;
    use crate::{geometry::Point, library::ClientModuleConfig};

    #[test]
    fn load_module_emits_event_envelope() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let handle = ClientHandle::new(Uuid::new_v4(), None, Timestamp::from_millis(0), tx);

        handle
            .load_module(LoadModulePayload {
                module: ClientModuleConfig {
                    name: "slither".into(),
                    path: "slither.js".into(),
                    config: Value::Null,
                },
                time: Timestamp::from_millis(5_000),
                geo: vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0)],
            })
            .unwrap();

        let Some(Message::Text(text)) = rx.try_recv().ok() else {
            panic!("expected a text frame");
        };
        let value: Value = serde_json::from_str(text.as_str()).unwrap();
        assert_eq!(
            value,
            json!({
                "event": "loadModule",
                "payload": {
                    "module": { "name": "slither", "path": "slither.js", "config": null },
                    "time": 5000,
                    "geo": [{ "x": 0.0, "y": 0.0 }, { "x": 1.0, "y": 0.0 }]
                }
            })
        );
    }

    #[test]
    fn load_module_reports_closed_channel() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        let id = Uuid::new_v4();
        let handle = ClientHandle::new(id, None, Timestamp::from_millis(0), tx);

        let err = handle
            .load_module(LoadModulePayload {
                module: ClientModuleConfig {
                    name: "slither".into(),
                    path: "slither.js".into(),
                    config: Value::Null,
                },
                time: Timestamp::from_millis(0),
                geo: Vec::new(),
            })
            .unwrap_err();
        assert!(matches!(err, ControlError::ClientGone(gone) if gone == id));
    }
}
