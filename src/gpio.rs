use std::collections::HashMap;
use std::sync::Arc;

use log::{info, warn};
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::config::{AppConfig, PinConfig};
use crate::error::AppError;
use crate::pin::{Direction, EdgeTrigger, Level, PinNumber};
use crate::sysfs::PinController;

/// Live view of a configured pin, re-read from sysfs on every request.
#[derive(Debug, Clone, Serialize)]
pub struct PinDescriptor {
    pub info: PinConfig,
    pub exported: bool,
    pub value: Option<u8>,
}

/// Owns the configured pins on behalf of the HTTP workers.
///
/// Each configured pin has its own lock so concurrent requests on one pin
/// are serialized. Other processes on the host are not covered by it.
pub struct GpioManager {
    config: Arc<AppConfig>,
    controller: PinController,
    locks: FxHashMap<PinNumber, Mutex<()>>,
}

impl GpioManager {
    pub fn new(config: Arc<AppConfig>, controller: PinController) -> Self {
        let locks = config
            .gpios
            .keys()
            .map(|pin| (*pin, Mutex::new(())))
            .collect();

        Self {
            config,
            controller,
            locks,
        }
    }

    pub fn controller(&self) -> &PinController {
        &self.controller
    }

    fn pin_config(&self, pin: PinNumber) -> Result<&PinConfig, AppError> {
        self.config
            .gpios
            .get(&pin)
            .ok_or_else(|| AppError::NotFoundPin(pin.to_string()))
    }

    fn with_pin<T>(
        &self,
        pin: PinNumber,
        op: &str,
        f: impl FnOnce(&PinController) -> Result<T, AppError>,
    ) -> Result<T, AppError> {
        self.pin_config(pin)?;
        let lock = self
            .locks
            .get(&pin)
            .ok_or_else(|| AppError::NotFoundPin(pin.to_string()))?;
        let _guard = lock.lock();

        f(&self.controller).inspect_err(|e| warn!("{op} failed for pin {pin}: {e}"))
    }

    /// Exports every configured pin, then applies direction, edge and
    /// initial level in that order.
    pub fn setup_pins(&self) -> Result<(), AppError> {
        let mut pins: Vec<_> = self.config.gpios.iter().collect();
        pins.sort_by_key(|(pin, _)| **pin);

        for (pin, cfg) in pins {
            let pin = *pin;
            self.export(pin)?;
            if let Some(direction) = cfg.direction {
                self.set_direction(pin, direction)?;
            }
            if let Some(edge) = cfg.edge {
                self.set_edge(pin, edge)?;
            }
            if let Some(level) = cfg.initial {
                self.write_value(pin, level.as_u8())?;
            }
            info!("pin {pin} ({}) ready", cfg.name);
        }
        Ok(())
    }

    /// Unexports every configured pin, continuing past failures.
    pub fn release_pins(&self) -> Result<(), AppError> {
        let mut first_err = None;
        for pin in self.config.gpios.keys() {
            match self.unexport(*pin) {
                Ok(()) => info!("pin {pin} released"),
                Err(e) => {
                    first_err.get_or_insert(e);
                }
            }
        }
        first_err.map_or(Ok(()), Err)
    }

    pub fn list_pins(&self) -> HashMap<PinNumber, PinDescriptor> {
        self.config
            .gpios
            .keys()
            .filter_map(|pin| Some((*pin, self.get_pin_descriptor(*pin).ok()?)))
            .collect()
    }

    pub fn get_pin_descriptor(&self, pin: PinNumber) -> Result<PinDescriptor, AppError> {
        let info = self.pin_config(pin)?.clone();
        self.with_pin(pin, "describe", |ctl| {
            let exported = ctl.is_exported(pin);
            let value = if exported {
                ctl.get_value(pin).ok().map(|l| l.as_u8())
            } else {
                None
            };
            Ok(PinDescriptor {
                info,
                exported,
                value,
            })
        })
    }

    pub fn export(&self, pin: PinNumber) -> Result<(), AppError> {
        self.with_pin(pin, "export", |ctl| ctl.export(pin))
    }

    pub fn unexport(&self, pin: PinNumber) -> Result<(), AppError> {
        self.with_pin(pin, "unexport", |ctl| ctl.unexport(pin))
    }

    pub fn set_direction(&self, pin: PinNumber, direction: Direction) -> Result<(), AppError> {
        self.with_pin(pin, "set direction", |ctl| ctl.set_direction(pin, direction))
    }

    pub fn set_edge(&self, pin: PinNumber, edge: EdgeTrigger) -> Result<(), AppError> {
        self.with_pin(pin, "set edge", |ctl| ctl.set_edge(pin, edge))
    }

    pub fn read_value(&self, pin: PinNumber) -> Result<u8, AppError> {
        self.with_pin(pin, "read value", |ctl| ctl.get_value(pin).map(|l| l.as_u8()))
    }

    pub fn write_value(&self, pin: PinNumber, value: u8) -> Result<(), AppError> {
        let level = match value {
            0 => Level::Low,
            1 => Level::High,
            _ => return Err(AppError::InvalidValue("Value must be 0 or 1".into())),
        };

        self.with_pin(pin, "write value", |ctl| ctl.set_value(pin, level))
    }
}
