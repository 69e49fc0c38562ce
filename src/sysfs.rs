//! Pin control through the kernel's sysfs GPIO interface.
//!
//! The filesystem under the root is the only state. Every configuration or
//! data operation re-checks that `<root>/gpio<N>` exists before touching any
//! attribute, and no result is cached between calls.

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Write};
use std::os::unix::fs::OpenOptionsExt;
use std::os::unix::io::IntoRawFd;
use std::path::{Path, PathBuf};

use log::debug;

use crate::error::AppError;
use crate::handle::PinHandle;
use crate::pin::{Direction, EdgeTrigger, Level, PinNumber};

pub const SYSFS_GPIO_ROOT: &str = "/sys/class/gpio";

const EXPORT: &str = "export";
const UNEXPORT: &str = "unexport";
const DIRECTION: &str = "direction";
const EDGE: &str = "edge";
const VALUE: &str = "value";

/// Stateless façade over one sysfs GPIO root.
///
/// Callers are expected to serialize access to a given pin number; two
/// processes driving the same pin observe the same unsynchronized files.
#[derive(Debug, Clone)]
pub struct PinController {
    root: PathBuf,
}

impl Default for PinController {
    fn default() -> Self {
        Self::new(SYSFS_GPIO_ROOT)
    }
}

impl PinController {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn pin_dir(&self, pin: PinNumber) -> PathBuf {
        self.root.join(format!("gpio{pin}"))
    }

    pub fn attr_path(&self, pin: PinNumber, attr: &str) -> PathBuf {
        self.pin_dir(pin).join(attr)
    }

    pub fn control_path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    pub fn is_exported(&self, pin: PinNumber) -> bool {
        self.pin_dir(pin).exists()
    }

    fn ensure_exported(&self, pin: PinNumber) -> Result<(), AppError> {
        if self.is_exported(pin) {
            Ok(())
        } else {
            Err(AppError::NotExported(pin))
        }
    }

    /// Makes the pin visible to user space. Succeeds without writing if it already is.
    pub fn export(&self, pin: PinNumber) -> Result<(), AppError> {
        if self.is_exported(pin) {
            return Ok(());
        }
        write_token(&self.control_path(EXPORT), &pin.to_string())
    }

    /// Releases the pin. Succeeds without writing if it is not exported.
    pub fn unexport(&self, pin: PinNumber) -> Result<(), AppError> {
        if !self.is_exported(pin) {
            return Ok(());
        }
        write_token(&self.control_path(UNEXPORT), &pin.to_string())
    }

    pub fn set_direction(&self, pin: PinNumber, direction: Direction) -> Result<(), AppError> {
        self.ensure_exported(pin)?;
        write_token(&self.attr_path(pin, DIRECTION), direction.as_str())
    }

    /// Selects which transitions wake a poller of the value file.
    ///
    /// Only meaningful once the pin is an input; ordering the two calls is up
    /// to the caller.
    pub fn set_edge(&self, pin: PinNumber, edge: EdgeTrigger) -> Result<(), AppError> {
        self.ensure_exported(pin)?;
        write_token(&self.attr_path(pin, EDGE), edge.as_str())
    }

    /// Drives the pin. Direction is not checked here, the kernel rejects
    /// writes to inputs.
    pub fn set_value(&self, pin: PinNumber, level: Level) -> Result<(), AppError> {
        self.ensure_exported(pin)?;
        write_token(&self.attr_path(pin, VALUE), level.as_str())
    }

    pub fn get_value(&self, pin: PinNumber) -> Result<Level, AppError> {
        self.ensure_exported(pin)?;

        let path = self.attr_path(pin, VALUE);
        let mut file = File::open(&path).map_err(|e| AppError::io(&path, e))?;

        let mut byte = [0u8; 1];
        let read = file.read(&mut byte).map_err(|e| AppError::io(&path, e))?;
        let found = (read == 1).then_some(byte[0]);
        let Some(level) = found.and_then(Level::from_byte) else {
            return Err(AppError::CorruptValue { path, found });
        };
        debug!("read {level} <- {}", path.display());

        close_file(file, &path)?;
        Ok(level)
    }

    /// Opens the value file non-blocking for registration with an external
    /// poller. Export state is not re-checked.
    pub fn open_handle(&self, pin: PinNumber) -> Result<PinHandle, AppError> {
        let path = self.attr_path(pin, VALUE);
        let file = OpenOptions::new()
            .read(true)
            .custom_flags(libc::O_NONBLOCK)
            .open(&path)
            .map_err(|e| AppError::io(&path, e))?;
        debug!("opened handle on {}", path.display());

        Ok(PinHandle::new(pin, path, file))
    }

    pub fn close_handle(&self, handle: PinHandle) -> Result<(), AppError> {
        handle.close()
    }
}

/// One `write(2)` of the whole token, no retries. A short count is a failure.
fn write_token(path: &Path, token: &str) -> Result<(), AppError> {
    debug!("write {token:?} -> {}", path.display());

    let mut file = OpenOptions::new()
        .write(true)
        .truncate(true)
        .open(path)
        .map_err(|e| AppError::io(path, e))?;

    let written = file
        .write(token.as_bytes())
        .map_err(|e| AppError::io(path, e))?;
    if written != token.len() {
        return Err(AppError::ShortWrite {
            path: path.to_path_buf(),
            written,
            expected: token.len(),
        });
    }

    close_file(file, path)
}

/// Closes `file` and reports the result of `close(2)`, which dropping a `File` discards.
pub(crate) fn close_file(file: File, path: &Path) -> Result<(), AppError> {
    let fd = file.into_raw_fd();
    // SAFETY: `fd` was released by `file` above and is not used after this call.
    if unsafe { libc::close(fd) } != 0 {
        return Err(AppError::io(path, io::Error::last_os_error()));
    }
    Ok(())
}
