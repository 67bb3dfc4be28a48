//! Generic single-active-state engine.
//!
//! A [`Machine`] owns exactly one state value at a time. States never hold a callback
//! back into the machine: enter hooks and command handlers return the next state they
//! want instead, and the engine applies those requests before control returns to the
//! caller.

use thiserror::Error;
use tracing::{debug, warn};

/// Error returned when the machine is driven before [`Machine::set_context`] was called.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("state machine context has not been installed")]
pub struct ContextMissing;

/// Behaviour shared by every state variant driven by a [`Machine`].
pub trait State: Sized {
    /// Read-only data shared by all states of one machine.
    type Context;
    /// Fault raised by hooks and handlers.
    type Error: From<ContextMissing>;

    /// Short label used in logs.
    fn label(&self) -> &'static str;

    /// Called once the state becomes current. Returning `Some` requests an immediate
    /// transition to the returned state.
    fn enter(&mut self, context: &Self::Context) -> Result<Option<Self>, Self::Error>;

    /// Called before the state is replaced. Must release anything the state holds.
    fn exit(&mut self, _context: &Self::Context) {}
}

/// Engine holding the active state and performing transitions.
pub struct Machine<S: State> {
    state: S,
    context: Option<S::Context>,
    transitions: u64,
}

impl<S: State> Machine<S> {
    /// Create a machine whose current state is `initial`. The initial state is not entered
    /// until [`Machine::drive_machine`] is called.
    pub fn new(initial: S) -> Self {
        Self {
            state: initial,
            context: None,
            transitions: 0,
        }
    }

    /// Install the shared context. Only the first call has an effect; returns whether the
    /// context was installed.
    pub fn set_context(&mut self, context: S::Context) -> bool {
        if self.context.is_some() {
            warn!("state machine context already installed; ignoring replacement");
            return false;
        }
        self.context = Some(context);
        true
    }

    /// Currently active state.
    pub fn state(&self) -> &S {
        &self.state
    }

    /// Shared context, once installed.
    pub fn context(&self) -> Option<&S::Context> {
        self.context.as_ref()
    }

    /// Number of transitions performed so far.
    pub fn transitions(&self) -> u64 {
        self.transitions
    }

    /// Exit the current state, install `next` and enter it.
    ///
    /// Transitions requested by enter hooks are applied in the same call, so by the time
    /// this returns the last requested state is current and every enter side effect has
    /// happened. If an enter hook fails, the state it belongs to stays current and the
    /// error is returned.
    pub fn transition_to(&mut self, next: S) -> Result<(), S::Error> {
        let context = self.context.as_ref().ok_or(ContextMissing)?;

        let mut pending = Some(next);
        while let Some(next) = pending.take() {
            self.state.exit(context);
            let previous = std::mem::replace(&mut self.state, next);
            self.transitions += 1;
            debug!(
                from = previous.label(),
                to = self.state.label(),
                transitions = self.transitions,
                "state transition"
            );
            pending = self.state.enter(context)?;
        }

        Ok(())
    }

    /// Re-run the enter hook of the current state to resume dispatch.
    pub fn drive_machine(&mut self) -> Result<(), S::Error> {
        let context = self.context.as_ref().ok_or(ContextMissing)?;
        match self.state.enter(context)? {
            Some(next) => self.transition_to(next),
            None => Ok(()),
        }
    }

    /// Hand a command to the current state and apply the transition it requests, if any.
    pub fn dispatch<F>(&mut self, handler: F) -> Result<(), S::Error>
    where
        F: FnOnce(&mut S, &S::Context) -> Result<Option<S>, S::Error>,
    {
        let context = self.context.as_ref().ok_or(ContextMissing)?;
        match handler(&mut self.state, context)? {
            Some(next) => self.transition_to(next),
            None => Ok(()),
        }
    }
}
