use std::sync::Arc;

use tokio::{
    sync::{mpsc, oneshot},
    task::JoinHandle,
};
use tracing::debug;

use crate::{
    clock::Timestamp,
    control::{
        client::{ClientHandle, ClientId},
        context::{ControlContext, ControlServices},
        controller::ClientControlMachine,
        timer::{TimerToken, TokioTimers},
    },
    dto::control::ControllerStatus,
    error::ControlError,
};

/// Commands processed, one at a time, by a controller task.
#[derive(Debug)]
pub enum ControlCommand {
    /// Switch the display to `module_id` at `deadline`.
    PlayModule {
        module_id: String,
        deadline: Timestamp,
    },
    /// A timer scheduled by a preparing state fired.
    DeadlineReached(TimerToken),
    /// An unexpected fault to recover from.
    Fail(ControlError),
    /// Report the controller's status.
    Status(oneshot::Sender<ControllerStatus>),
}

/// Cloneable command surface of a running controller task.
///
/// The task stops, resetting the display to idle, once every handle is dropped.
#[derive(Debug, Clone)]
pub struct ControllerHandle {
    client: ClientHandle,
    commands: mpsc::UnboundedSender<ControlCommand>,
}

impl ControllerHandle {
    /// Transport handle of the display driven by this controller.
    pub fn client_info(&self) -> &ClientHandle {
        &self.client
    }

    pub fn client_id(&self) -> ClientId {
        self.client.id()
    }

    /// Queue a play request.
    pub fn play_module(
        &self,
        module_id: impl Into<String>,
        deadline: Timestamp,
    ) -> Result<(), ControlError> {
        self.send(ControlCommand::PlayModule {
            module_id: module_id.into(),
            deadline,
        })
    }

    /// Queue a fault; the controller logs it and resets to idle.
    pub fn handle_error(&self, err: ControlError) -> Result<(), ControlError> {
        self.send(ControlCommand::Fail(err))
    }

    /// Snapshot of the controller once every previously queued command has been handled.
    pub async fn status(&self) -> Result<ControllerStatus, ControlError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(ControlCommand::Status(reply_tx))?;
        reply_rx
            .await
            .map_err(|_| ControlError::ControllerStopped(self.client.id()))
    }

    /// Module targeted or shown right now.
    pub async fn module_name(&self) -> Result<String, ControlError> {
        self.status().await.map(|status| status.module)
    }

    fn send(&self, command: ControlCommand) -> Result<(), ControlError> {
        self.commands
            .send(command)
            .map_err(|_| ControlError::ControllerStopped(self.client.id()))
    }
}

/// Start a controller task for `client`.
pub fn spawn_controller(
    client: ClientHandle,
    services: ControlServices,
) -> (ControllerHandle, JoinHandle<()>) {
    let (commands, rx) = mpsc::unbounded_channel();
    let timers = Arc::new(TokioTimers::new(commands.downgrade()));
    let controller = ClientControlMachine::new(ControlContext::new(client.clone(), services, timers));
    let task = tokio::spawn(run(controller, rx));

    (ControllerHandle { client, commands }, task)
}

async fn run(mut controller: ClientControlMachine, mut rx: mpsc::UnboundedReceiver<ControlCommand>) {
    while let Some(command) = rx.recv().await {
        apply(&mut controller, command);
    }
    debug!(client_id = %controller.client_info().id(), "controller command channel closed");
    controller.shutdown();
}

fn apply(controller: &mut ClientControlMachine, command: ControlCommand) {
    match command {
        ControlCommand::PlayModule {
            module_id,
            deadline,
        } => controller.play_module(module_id, deadline),
        ControlCommand::DeadlineReached(token) => controller.deadline_reached(token),
        ControlCommand::Fail(err) => controller.handle_error(err),
        ControlCommand::Status(reply) => {
            let _ = reply.send(controller.status());
        }
    }
}
