#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use sysgpio::PinController;
use tempfile::TempDir;

/// A directory laid out like `/sys/class/gpio`. The kernel's reaction to
/// writes on `export`/`unexport` is emulated explicitly with
/// [`FakeSysfs::kernel_export`] and [`FakeSysfs::kernel_unexport`].
pub struct FakeSysfs {
    dir: TempDir,
}

impl FakeSysfs {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("create temp sysfs root");
        fs::write(dir.path().join("export"), "").expect("create export");
        fs::write(dir.path().join("unexport"), "").expect("create unexport");
        Self { dir }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn controller(&self) -> PinController {
        PinController::new(self.root())
    }

    pub fn pin_dir(&self, pin: u32) -> PathBuf {
        self.root().join(format!("gpio{pin}"))
    }

    pub fn attr(&self, pin: u32, name: &str) -> PathBuf {
        self.pin_dir(pin).join(name)
    }

    /// Creates `gpio<N>` with empty attributes and a low value, as the kernel does on export.
    pub fn kernel_export(&self, pin: u32) {
        let dir = self.pin_dir(pin);
        fs::create_dir_all(&dir).expect("create pin dir");
        fs::write(dir.join("direction"), "").expect("create direction");
        fs::write(dir.join("edge"), "").expect("create edge");
        fs::write(dir.join("value"), "0").expect("create value");
    }

    pub fn kernel_unexport(&self, pin: u32) {
        fs::remove_dir_all(self.pin_dir(pin)).expect("remove pin dir");
    }

    pub fn read(&self, path: impl AsRef<Path>) -> String {
        fs::read_to_string(path).expect("read fake sysfs file")
    }

    pub fn clear(&self, path: impl AsRef<Path>) {
        fs::write(path, "").expect("clear fake sysfs file");
    }
}
