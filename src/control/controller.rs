use tracing::{error, info};

use crate::{
    clock::Timestamp,
    control::{
        client::ClientHandle,
        context::ControlContext,
        machine::{Machine, State},
        states::{ControlState, StateKind},
        timer::TimerToken,
    },
    dto::control::ControllerStatus,
    error::ControlError,
};

/// State machine driving one connected display.
///
/// All commands run to completion synchronously. Any fault raised while handling a command
/// is routed to [`ClientControlMachine::handle_error`], which resets the display to idle.
pub struct ClientControlMachine {
    machine: Machine<ControlState>,
    client: ClientHandle,
}

impl ClientControlMachine {
    /// Create an idle controller bound to `context`.
    pub fn new(context: ControlContext) -> Self {
        let client = context.client().clone();
        let mut machine = Machine::new(ControlState::Idle);
        machine.set_context(context);
        Self { machine, client }
    }

    /// Ask the display to switch to `module_id` at `deadline`.
    ///
    /// The deadline may already be in the past, in which case the switch happens on the
    /// next timer tick.
    pub fn play_module(&mut self, module_id: impl Into<String>, deadline: Timestamp) {
        let module_id = module_id.into();
        info!(
            client_id = %self.client.id(),
            module = %module_id,
            %deadline,
            "play module requested"
        );
        self.supervise(move |state, _| Ok(state.play_module(module_id, deadline)));
    }

    /// Deliver a fired timer. Tokens from cancelled or superseded timers are ignored.
    pub fn deadline_reached(&mut self, token: TimerToken) {
        self.supervise(move |state, _| Ok(state.deadline_reached(token)));
    }

    /// Log `err` and force the controller back to idle, discarding any pending timer.
    pub fn handle_error(&mut self, err: ControlError) {
        error!(
            client_id = %self.client.id(),
            state = self.machine.state().label(),
            module = %self.module_name(),
            error = %err,
            "display control fault; resetting to idle"
        );
        if let Err(reset_err) = self.reset() {
            error!(client_id = %self.client.id(), error = %reset_err, "failed to reset display controller");
        }
    }

    /// Force idle, e.g. when the display disconnects.
    pub fn shutdown(&mut self) {
        info!(client_id = %self.client.id(), module = %self.module_name(), "stopping display controller");
        if let Err(err) = self.machine.transition_to(ControlState::Idle) {
            error!(client_id = %self.client.id(), error = %err, "failed to stop display controller");
        }
    }

    /// Module targeted or shown right now.
    pub fn module_name(&self) -> &str {
        self.machine.state().module_name()
    }

    /// Transport handle of the display driven by this controller.
    pub fn client_info(&self) -> &ClientHandle {
        &self.client
    }

    pub fn state_kind(&self) -> StateKind {
        self.machine.state().kind()
    }

    /// Diagnostic snapshot of the controller.
    pub fn status(&self) -> ControllerStatus {
        let state = self.machine.state();
        ControllerStatus {
            client_id: self.client.id(),
            state: state.kind(),
            module: state.module_name().to_string(),
            deadline: state.deadline(),
            transitions: self.machine.transitions(),
        }
    }

    fn reset(&mut self) -> Result<(), ControlError> {
        self.machine.transition_to(ControlState::Idle)?;
        self.machine.drive_machine()
    }

    fn supervise<F>(&mut self, handler: F)
    where
        F: FnOnce(&mut ControlState, &ControlContext) -> Result<Option<ControlState>, ControlError>,
    {
        if let Err(err) = self.machine.dispatch(handler) {
            self.handle_error(err);
        }
    }
}
