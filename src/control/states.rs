use serde::Serialize;
use tracing::{debug, info};
use utoipa::ToSchema;

use crate::{
    clock::{self, Timestamp},
    control::{
        context::ControlContext,
        machine::State,
        timer::{TimerHandle, TimerToken},
    },
    dto::ws::LoadModulePayload,
    error::ControlError,
};

/// Module name reported while no module is assigned.
pub const IDLE_MODULE_NAME: &str = "<None>";

/// Discriminant of [`ControlState`], exposed for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum StateKind {
    /// Waiting for the first (or next after a fault) command.
    Idle,
    /// Display told to load a module; waiting for its deadline.
    Preparing,
    /// Deadline passed; the module is on screen.
    Displaying,
}

/// Phase of one display controller.
#[derive(Debug)]
pub enum ControlState {
    Idle,
    Preparing(Preparing),
    Displaying(Displaying),
}

/// Display is loading `module_id` and will switch to it at `deadline`.
#[derive(Debug)]
pub struct Preparing {
    module_id: String,
    deadline: Timestamp,
    timer: Option<TimerHandle>,
}

/// Display is showing `module_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Displaying {
    module_id: String,
}

impl ControlState {
    /// Preparing state targeting `module_id` at `deadline`.
    pub fn preparing(module_id: impl Into<String>, deadline: Timestamp) -> Self {
        Self::Preparing(Preparing {
            module_id: module_id.into(),
            deadline,
            timer: None,
        })
    }

    /// Displaying state for `module_id`.
    pub fn displaying(module_id: impl Into<String>) -> Self {
        Self::Displaying(Displaying {
            module_id: module_id.into(),
        })
    }

    pub fn kind(&self) -> StateKind {
        match self {
            Self::Idle => StateKind::Idle,
            Self::Preparing(_) => StateKind::Preparing,
            Self::Displaying(_) => StateKind::Displaying,
        }
    }

    /// Identifier of the module targeted or shown, or [`IDLE_MODULE_NAME`].
    pub fn module_name(&self) -> &str {
        match self {
            Self::Idle => IDLE_MODULE_NAME,
            Self::Preparing(preparing) => &preparing.module_id,
            Self::Displaying(displaying) => &displaying.module_id,
        }
    }

    /// Deadline the display is preparing for, if any.
    pub fn deadline(&self) -> Option<Timestamp> {
        match self {
            Self::Preparing(preparing) => Some(preparing.deadline),
            _ => None,
        }
    }

    /// Handle a request to play `module_id` at `deadline`.
    pub fn play_module(&mut self, module_id: String, deadline: Timestamp) -> Option<Self> {
        match self {
            Self::Idle | Self::Displaying(_) => Some(Self::preparing(module_id, deadline)),
            // Supersede the pending module; its timer is cancelled on exit, before the
            // replacement is announced to the display.
            Self::Preparing(pending) => {
                info!(
                    superseded = %pending.module_id,
                    module = %module_id,
                    "preempting pending module"
                );
                Some(Self::preparing(module_id, deadline))
            }
        }
    }

    /// Handle a fired timer.
    pub fn deadline_reached(&mut self, token: TimerToken) -> Option<Self> {
        match self {
            Self::Preparing(preparing) if preparing.owns(token) => {
                Some(Self::displaying(preparing.module_id.clone()))
            }
            other => {
                debug!(%token, state = other.label(), "ignoring stale deadline");
                None
            }
        }
    }
}

impl Preparing {
    fn owns(&self, token: TimerToken) -> bool {
        self.timer
            .as_ref()
            .is_some_and(|timer| timer.token() == token)
    }

    fn enter(&mut self, context: &ControlContext) -> Result<(), ControlError> {
        let module = context
            .library()
            .resolve(&self.module_id)
            .ok_or_else(|| ControlError::UnknownModule(self.module_id.clone()))?;

        context.client().load_module(LoadModulePayload {
            module: module.serialize_for_client(),
            time: self.deadline,
            geo: context.geometry().current_geometry(),
        })?;

        let delay = clock::until(self.deadline, context.clock().now());
        let token = TimerToken::new();
        debug!(
            client_id = %context.client().id(),
            module = %self.module_id,
            deadline = %self.deadline,
            delay_ms = delay.as_millis() as u64,
            "module load sent; waiting for deadline"
        );
        self.timer = Some(context.timers().schedule(delay, token));
        Ok(())
    }

    fn exit(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.cancel();
        }
    }
}

impl State for ControlState {
    type Context = ControlContext;
    type Error = ControlError;

    fn label(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Preparing(_) => "preparing",
            Self::Displaying(_) => "displaying",
        }
    }

    fn enter(&mut self, context: &ControlContext) -> Result<Option<Self>, ControlError> {
        match self {
            Self::Preparing(preparing) => preparing.enter(context)?,
            Self::Displaying(displaying) => {
                info!(
                    client_id = %context.client().id(),
                    module = %displaying.module_id,
                    "display switched module"
                );
            }
            Self::Idle => {}
        }
        Ok(None)
    }

    fn exit(&mut self, _context: &ControlContext) {
        if let Self::Preparing(preparing) = self {
            preparing.exit();
        }
    }
}
