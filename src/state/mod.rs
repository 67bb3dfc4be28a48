use std::sync::Arc;

use dashmap::DashMap;

use crate::{
    clock::Clock,
    config::AppConfig,
    control::{ClientId, ControlServices, ControllerHandle},
    geometry::StaticGeometry,
    library::ModuleRegistry,
};

pub type SharedState = Arc<AppState>;

/// Central application state: configuration, shared control services and the registry of
/// connected displays.
pub struct AppState {
    config: AppConfig,
    services: ControlServices,
    geometry: Arc<StaticGeometry>,
    displays: DashMap<ClientId, ControllerHandle>,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    pub fn new(config: AppConfig) -> SharedState {
        let geometry = Arc::new(StaticGeometry::new(config.geometry().to_vec()));
        let services = ControlServices::new(Arc::new(config.library()), geometry.clone());
        Self::with_services(config, services, geometry)
    }

    /// Construct the state around explicit services (custom clock, registry...).
    pub fn with_services(
        config: AppConfig,
        services: ControlServices,
        geometry: Arc<StaticGeometry>,
    ) -> SharedState {
        Arc::new(Self {
            config,
            services,
            geometry,
            displays: DashMap::new(),
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Collaborators handed to every new display controller.
    pub fn services(&self) -> &ControlServices {
        &self.services
    }

    pub fn library(&self) -> &dyn ModuleRegistry {
        self.services.library.as_ref()
    }

    pub fn clock(&self) -> &dyn Clock {
        self.services.clock.as_ref()
    }

    /// Wall outline served to displays; can be replaced at runtime.
    pub fn geometry(&self) -> &StaticGeometry {
        &self.geometry
    }

    /// Registry of connected displays keyed by their identifier.
    pub fn displays(&self) -> &DashMap<ClientId, ControllerHandle> {
        &self.displays
    }

    /// Controller handle of one display, if connected.
    pub fn display(&self, id: &ClientId) -> Option<ControllerHandle> {
        self.displays.get(id).map(|entry| entry.value().clone())
    }

    /// Snapshot of every connected controller handle.
    pub fn display_handles(&self) -> Vec<ControllerHandle> {
        self.displays
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }
}
