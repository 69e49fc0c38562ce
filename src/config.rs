use std::{fs, path::Path};

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::pin::{Direction, EdgeTrigger, Level, PinNumber};
use crate::sysfs::SYSFS_GPIO_ROOT;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct HttpConfig {
    pub unix_socket: Option<String>,
    pub host: Option<String>,
    pub path: String,
}

/// A pin the service owns, with the configuration applied at startup.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PinConfig {
    pub name: String,
    #[serde(default)]
    pub direction: Option<Direction>,
    #[serde(default)]
    pub edge: Option<EdgeTrigger>,
    #[serde(default)]
    pub initial: Option<Level>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    pub http: HttpConfig,
    #[serde(default = "default_sysfs_root")]
    pub sysfs_root: String,
    pub gpios: FxHashMap<PinNumber, PinConfig>,
    #[serde(default)]
    pub unexport_on_exit: bool,
}

fn default_sysfs_root() -> String {
    SYSFS_GPIO_ROOT.to_string()
}

impl AppConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, AppError> {
        let contents = fs::read_to_string(&path)
            .map_err(|e| AppError::Config(format!("Failed to read config: {e}")))?;
        Self::from_json(&contents)
    }

    pub fn from_json(contents: &str) -> Result<Self, AppError> {
        let config: AppConfig = serde_json::from_str(contents)
            .map_err(|e| AppError::Config(format!("Invalid config json: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if !self.http.path.starts_with('/') {
            return Err(AppError::Config(format!(
                "http.path must start with '/': {}",
                self.http.path
            )));
        }
        if self.http.unix_socket.is_none() && self.http.host.is_none() {
            return Err(AppError::Config(
                "either 'unix_socket' or 'host' must be specified".into(),
            ));
        }

        for (pin, cfg) in &self.gpios {
            if cfg.initial.is_some() && cfg.direction != Some(Direction::Output) {
                return Err(AppError::Config(format!(
                    "pin {pin}: an initial level requires direction 'output'"
                )));
            }
            if cfg.edge.is_some_and(|e| e != EdgeTrigger::None)
                && cfg.direction != Some(Direction::Input)
            {
                return Err(AppError::Config(format!(
                    "pin {pin}: edge detection requires direction 'input'"
                )));
            }
        }
        Ok(())
    }
}
