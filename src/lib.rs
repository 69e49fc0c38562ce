//! Control of Linux GPIO lines through the sysfs interface under
//! `/sys/class/gpio`, plus a small HTTP service that owns a configured set
//! of pins.

pub mod config;
pub mod error;
pub mod gpio;
pub mod handle;
pub mod pin;
pub mod routes;
pub mod sysfs;

pub use config::{AppConfig, HttpConfig, PinConfig};
pub use error::AppError;
pub use gpio::{GpioManager, PinDescriptor};
pub use handle::PinHandle;
pub use pin::{Direction, EdgeTrigger, Level, PinNumber};
pub use routes::{AppState, api_scope};
pub use sysfs::{PinController, SYSFS_GPIO_ROOT};
