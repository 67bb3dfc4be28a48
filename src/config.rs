//! Application-level configuration loading: module library, wall geometry and timing.

use std::{env, fs, io::ErrorKind, path::PathBuf, time::Duration};

use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};

use crate::{
    geometry::{Point, rectangle},
    library::{ModuleDef, ModuleLibrary},
};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "WALL_CONTROL_CONFIG_PATH";
/// Lead time applied to play requests that carry no explicit deadline.
const DEFAULT_LEAD: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    modules: Vec<ModuleDef>,
    geometry: Vec<Point>,
    default_lead: Duration,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to built-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let app_config: Self = raw.into();
                    info!(
                        path = %path.display(),
                        modules = app_config.modules.len(),
                        "loaded module library from config"
                    );
                    app_config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Module library built from the configured definitions.
    pub fn library(&self) -> ModuleLibrary {
        ModuleLibrary::new(self.modules.iter().cloned())
    }

    /// Wall outline sent with every module load.
    pub fn geometry(&self) -> &[Point] {
        &self.geometry
    }

    /// Lead time used when a play request has no deadline.
    pub fn default_lead(&self) -> Duration {
        self.default_lead
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            modules: default_modules(),
            geometry: rectangle(1920.0, 1080.0),
            default_lead: DEFAULT_LEAD,
        }
    }
}

#[derive(Debug, Deserialize)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    modules: Vec<ModuleDef>,
    #[serde(default)]
    geometry: Option<Vec<Point>>,
    #[serde(default)]
    default_lead_ms: Option<u64>,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        let defaults = Self::default();
        Self {
            modules: value.modules,
            geometry: value.geometry.unwrap_or(defaults.geometry),
            default_lead: value
                .default_lead_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.default_lead),
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

/// Demo modules shipped with the binary.
fn default_modules() -> Vec<ModuleDef> {
    vec![
        ModuleDef::new(
            "slideshow-flickr",
            "demo_modules/slideshow/slideshow.js",
            json!({
                "load": { "flickr": { "query": "landscape" } },
                "display": { "fullscreen": { "period": 10000 } }
            }),
        ),
        ModuleDef::new(
            "slither",
            "demo_modules/slither/slither.js",
            json!({}),
        ),
    ]
}
