//! Per-display control plane: tells one connected display which module to load and
//! switches it over at the requested wall-clock deadline.

pub mod client;
pub mod context;
pub mod controller;
pub mod machine;
pub mod states;
pub mod task;
pub mod timer;

#[cfg(test)]
pub(crate) mod testing;

pub use self::client::{ClientHandle, ClientId};
pub use self::context::{ControlContext, ControlServices};
pub use self::controller::ClientControlMachine;
pub use self::states::{ControlState, IDLE_MODULE_NAME, StateKind};
pub use self::task::{ControlCommand, ControllerHandle, spawn_controller};
