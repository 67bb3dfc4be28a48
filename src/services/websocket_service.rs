use std::time::Duration;

use axum::extract::ws::{Message, WebSocket};
use futures::{SinkExt, StreamExt};
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    control::{ClientHandle, spawn_controller},
    dto::ws::{DisplayInboundMessage, DisplayRect},
    error::ControlError,
    state::SharedState,
};

const IDENT_TIMEOUT: Duration = Duration::from_secs(10);

/// Handle the full lifecycle for an individual display WebSocket connection.
pub async fn handle_socket(state: SharedState, socket: WebSocket) {
    let (mut sender, mut receiver) = socket.split();
    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<Message>();

    // Dedicated writer task keeps outbound messages flowing even while we await inbound frames.
    let writer_task = tokio::spawn(async move {
        while let Some(message) = outbound_rx.recv().await {
            if sender.send(message).await.is_err() {
                break;
            }
        }
    });

    let initial_message = match tokio::time::timeout(IDENT_TIMEOUT, receiver.next()).await {
        Ok(Some(Ok(Message::Text(text)))) => text,
        Ok(Some(Ok(Message::Close(_)))) => {
            finalize(writer_task, outbound_tx).await;
            return;
        }
        Ok(Some(Ok(_))) => {
            let _ = outbound_tx.send(Message::Close(None));
            finalize(writer_task, outbound_tx).await;
            return;
        }
        Ok(Some(Err(err))) => {
            warn!(error = %err, "websocket receive error");
            finalize(writer_task, outbound_tx).await;
            return;
        }
        Ok(None) => {
            info!("display disconnected before hello");
            finalize(writer_task, outbound_tx).await;
            return;
        }
        Err(_) => {
            warn!(timeout = ?IDENT_TIMEOUT, "display hello timed out");
            let _ = outbound_tx.send(Message::Close(None));
            finalize(writer_task, outbound_tx).await;
            return;
        }
    };

    let rect = match hello_rect(&initial_message) {
        Ok(rect) => rect,
        Err(reason) => {
            warn!(%reason, "rejecting display connection");
            let _ = outbound_tx.send(Message::Close(None));
            finalize(writer_task, outbound_tx).await;
            return;
        }
    };

    let client_id = Uuid::new_v4();
    let client = ClientHandle::new(client_id, rect, state.clock().now(), outbound_tx.clone());
    let (controller, controller_task) = spawn_controller(client, state.services().clone());
    state.displays().insert(client_id, controller.clone());
    info!(client_id = %client_id, rect = ?rect, "display connected");

    while let Some(message) = receiver.next().await {
        match message {
            Ok(Message::Text(text)) => match DisplayInboundMessage::from_json_str(&text) {
                Ok(DisplayInboundMessage::Error { message }) => {
                    warn!(client_id = %client_id, %message, "display reported an error");
                    if controller.handle_error(ControlError::Fault(message)).is_err() {
                        break;
                    }
                }
                Ok(DisplayInboundMessage::Hello { .. }) => {
                    warn!(client_id = %client_id, "ignoring duplicate hello message");
                }
                Ok(DisplayInboundMessage::Unknown) => {
                    warn!(client_id = %client_id, payload = %text, "ignoring unknown display message");
                }
                Err(err) => {
                    warn!(client_id = %client_id, error = %err, "failed to parse display message");
                }
            },
            Ok(Message::Ping(payload)) => {
                let _ = outbound_tx.send(Message::Pong(payload));
            }
            Ok(Message::Close(frame)) => {
                info!(client_id = %client_id, "display closed");
                let _ = outbound_tx.send(Message::Close(frame));
                break;
            }
            Ok(Message::Binary(_)) => {}
            Ok(Message::Pong(_)) => {}
            Err(err) => {
                warn!(client_id = %client_id, error = %err, "websocket error");
                break;
            }
        }
    }

    state.displays().remove(&client_id);
    drop(controller);
    // The controller drops its clone of the writer channel once it has shut down.
    let _ = controller_task.await;
    info!(client_id = %client_id, "display disconnected");

    finalize(writer_task, outbound_tx).await;
}

/// Parse the first frame of a connection, which must be a hello message.
fn hello_rect(text: &str) -> Result<Option<DisplayRect>, String> {
    match DisplayInboundMessage::from_json_str(text) {
        Ok(DisplayInboundMessage::Hello { rect }) => Ok(rect),
        Ok(_) => Err("first message was not hello".into()),
        Err(err) => Err(format!("failed to parse hello: {err}")),
    }
}

/// Ensure the writer task winds down before we return from the socket handler.
async fn finalize(writer_task: JoinHandle<()>, outbound_tx: mpsc::UnboundedSender<Message>) {
    drop(outbound_tx);
    let _ = writer_task.await;
}
