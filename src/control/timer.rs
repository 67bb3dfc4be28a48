use std::{fmt, time::Duration};

use tokio::{sync::mpsc, time::sleep};
use uuid::Uuid;

use crate::control::task::ControlCommand;

/// Identity of one scheduled deadline.
///
/// A fired timer only counts if its token still matches the state that scheduled it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerToken(Uuid);

impl TimerToken {
    /// Allocate a fresh, unique token.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TimerToken {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TimerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Pending one-shot timer. Cancelled explicitly with [`TimerHandle::cancel`] or when dropped.
pub struct TimerHandle {
    token: TimerToken,
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl TimerHandle {
    /// Wrap a scheduled timer together with the action that cancels it.
    pub fn new(token: TimerToken, cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            token,
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Token the timer will report when it fires.
    pub fn token(&self) -> TimerToken {
        self.token
    }

    /// Stop the timer from firing.
    pub fn cancel(mut self) {
        self.cancel_now();
    }

    fn cancel_now(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.cancel_now();
    }
}

impl fmt::Debug for TimerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerHandle")
            .field("token", &self.token)
            .field("armed", &self.cancel.is_some())
            .finish()
    }
}

/// Deferred-callback facility used by states that wait for a deadline.
pub trait TimerScheduler: Send + Sync {
    /// Arrange for `token` to be delivered back to the owning controller after `delay`.
    fn schedule(&self, delay: Duration, token: TimerToken) -> TimerHandle;
}

/// [`TimerScheduler`] running each timer as a tokio task that posts
/// [`ControlCommand::DeadlineReached`] to the controller's command channel.
///
/// Only a weak sender is kept so pending timers never keep a controller alive.
#[derive(Debug, Clone)]
pub struct TokioTimers {
    commands: mpsc::WeakUnboundedSender<ControlCommand>,
}

impl TokioTimers {
    /// Build a scheduler feeding the given command channel.
    pub fn new(commands: mpsc::WeakUnboundedSender<ControlCommand>) -> Self {
        Self { commands }
    }
}

impl TimerScheduler for TokioTimers {
    fn schedule(&self, delay: Duration, token: TimerToken) -> TimerHandle {
        let commands = self.commands.clone();
        let task = tokio::spawn(async move {
            sleep(delay).await;
            if let Some(tx) = commands.upgrade() {
                let _ = tx.send(ControlCommand::DeadlineReached(token));
            }
        });
        let abort = task.abort_handle();
        TimerHandle::new(token, move || abort.abort())
    }
}
