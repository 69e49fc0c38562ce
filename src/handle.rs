use std::fs::File;
use std::os::unix::fs::FileExt;
use std::os::unix::io::{AsFd, AsRawFd, BorrowedFd, IntoRawFd, RawFd};
use std::path::{Path, PathBuf};

use crate::error::AppError;
use crate::pin::{Level, PinNumber};
use crate::sysfs::close_file;

/// Non-blocking read handle on a pin's value file.
///
/// Register the descriptor for `POLLPRI | POLLERR` to be woken by the edges
/// configured through [`PinController::set_edge`](crate::PinController::set_edge),
/// then call [`read_level`](Self::read_level) to consume the event.
#[derive(Debug)]
pub struct PinHandle {
    pin: PinNumber,
    path: PathBuf,
    file: File,
}

impl PinHandle {
    pub(crate) fn new(pin: PinNumber, path: PathBuf, file: File) -> Self {
        Self { pin, path, file }
    }

    pub fn pin(&self) -> PinNumber {
        self.pin
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the level at offset 0, which also re-arms sysfs edge notification.
    pub fn read_level(&self) -> Result<Level, AppError> {
        let mut byte = [0u8; 1];
        let read = self
            .file
            .read_at(&mut byte, 0)
            .map_err(|e| AppError::io(&self.path, e))?;
        let found = (read == 1).then_some(byte[0]);

        found
            .and_then(Level::from_byte)
            .ok_or_else(|| AppError::CorruptValue {
                path: self.path.clone(),
                found,
            })
    }

    pub fn close(self) -> Result<(), AppError> {
        close_file(self.file, &self.path)
    }
}

impl AsFd for PinHandle {
    fn as_fd(&self) -> BorrowedFd<'_> {
        self.file.as_fd()
    }
}

impl AsRawFd for PinHandle {
    fn as_raw_fd(&self) -> RawFd {
        self.file.as_raw_fd()
    }
}

impl IntoRawFd for PinHandle {
    fn into_raw_fd(self) -> RawFd {
        self.file.into_raw_fd()
    }
}
