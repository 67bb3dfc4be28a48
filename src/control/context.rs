use std::sync::Arc;

use crate::{
    clock::{Clock, SystemClock},
    control::{client::ClientHandle, timer::TimerScheduler},
    geometry::GeometryProvider,
    library::ModuleRegistry,
};

/// Collaborators shared by every display controller of the process.
#[derive(Clone)]
pub struct ControlServices {
    pub library: Arc<dyn ModuleRegistry>,
    pub geometry: Arc<dyn GeometryProvider>,
    pub clock: Arc<dyn Clock>,
}

impl ControlServices {
    /// Bundle a registry and a geometry provider with the system clock.
    pub fn new(library: Arc<dyn ModuleRegistry>, geometry: Arc<dyn GeometryProvider>) -> Self {
        Self {
            library,
            geometry,
            clock: Arc::new(SystemClock),
        }
    }

    /// Replace the clock, mainly for deterministic tests.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }
}

/// Read-only data available to every state of one controller.
pub struct ControlContext {
    client: ClientHandle,
    services: ControlServices,
    timers: Arc<dyn TimerScheduler>,
}

impl ControlContext {
    /// Bind the shared services and a timer scheduler to one display connection.
    pub fn new(
        client: ClientHandle,
        services: ControlServices,
        timers: Arc<dyn TimerScheduler>,
    ) -> Self {
        Self {
            client,
            services,
            timers,
        }
    }

    /// Transport handle of the display this context belongs to.
    pub fn client(&self) -> &ClientHandle {
        &self.client
    }

    pub fn library(&self) -> &dyn ModuleRegistry {
        self.services.library.as_ref()
    }

    pub fn geometry(&self) -> &dyn GeometryProvider {
        self.services.geometry.as_ref()
    }

    pub fn clock(&self) -> &dyn Clock {
        self.services.clock.as_ref()
    }

    pub fn timers(&self) -> &dyn TimerScheduler {
        self.timers.as_ref()
    }
}
