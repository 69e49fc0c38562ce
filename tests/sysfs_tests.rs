mod common;

use std::fs;
use std::os::unix::io::AsRawFd;

use common::FakeSysfs;
use sysgpio::{AppError, Direction, EdgeTrigger, Level, PinController};

#[test]
fn export_writes_decimal_pin_number() {
    let sysfs = FakeSysfs::new();
    let ctl = sysfs.controller();

    ctl.export(17).unwrap();
    assert_eq!(sysfs.read(sysfs.root().join("export")), "17");
}

#[test]
fn export_is_idempotent_for_exported_pin() {
    let sysfs = FakeSysfs::new();
    let ctl = sysfs.controller();
    sysfs.kernel_export(4);

    for _ in 0..3 {
        ctl.export(4).unwrap();
    }
    assert_eq!(sysfs.read(sysfs.root().join("export")), "");
}

#[test]
fn unexport_is_idempotent_for_unexported_pin() {
    let sysfs = FakeSysfs::new();
    let ctl = sysfs.controller();

    for pin in [0, 17, 511] {
        ctl.unexport(pin).unwrap();
    }
    assert_eq!(sysfs.read(sysfs.root().join("unexport")), "");
}

#[test]
fn unexport_writes_pin_number_for_exported_pin() {
    let sysfs = FakeSysfs::new();
    let ctl = sysfs.controller();
    sysfs.kernel_export(203);

    ctl.unexport(203).unwrap();
    assert_eq!(sysfs.read(sysfs.root().join("unexport")), "203");
}

#[test]
fn export_fails_without_subsystem() {
    let dir = tempfile::tempdir().unwrap();
    let ctl = PinController::new(dir.path().join("missing"));

    assert!(matches!(ctl.export(17), Err(AppError::Io { .. })));
}

#[test]
fn operations_on_unexported_pin_fail_without_io() {
    let sysfs = FakeSysfs::new();
    let ctl = sysfs.controller();

    assert!(matches!(
        ctl.set_direction(5, Direction::Output),
        Err(AppError::NotExported(5))
    ));
    assert!(matches!(
        ctl.set_edge(5, EdgeTrigger::Both),
        Err(AppError::NotExported(5))
    ));
    assert!(matches!(
        ctl.set_value(5, Level::High),
        Err(AppError::NotExported(5))
    ));
    assert!(matches!(ctl.get_value(5), Err(AppError::NotExported(5))));
    assert!(!sysfs.pin_dir(5).exists());
}

#[test]
fn direction_literals() {
    let sysfs = FakeSysfs::new();
    let ctl = sysfs.controller();
    sysfs.kernel_export(6);
    let path = sysfs.attr(6, "direction");

    ctl.set_direction(6, Direction::Input).unwrap();
    assert_eq!(sysfs.read(&path), "in");

    ctl.set_direction(6, Direction::Output).unwrap();
    assert_eq!(sysfs.read(&path), "out");
}

#[test]
fn edge_literals() {
    let sysfs = FakeSysfs::new();
    let ctl = sysfs.controller();
    sysfs.kernel_export(7);
    let path = sysfs.attr(7, "edge");

    for (edge, token) in [
        (EdgeTrigger::Both, "both"),
        (EdgeTrigger::Rising, "rising"),
        (EdgeTrigger::Falling, "falling"),
        (EdgeTrigger::None, "none"),
    ] {
        ctl.set_edge(7, edge).unwrap();
        assert_eq!(sysfs.read(&path), token);
    }
}

#[test]
fn value_literals() {
    let sysfs = FakeSysfs::new();
    let ctl = sysfs.controller();
    sysfs.kernel_export(8);
    let path = sysfs.attr(8, "value");

    ctl.set_value(8, Level::High).unwrap();
    assert_eq!(sysfs.read(&path), "1");

    ctl.set_value(8, Level::Low).unwrap();
    assert_eq!(sysfs.read(&path), "0");
}

#[test]
fn set_edge_fails_when_attribute_missing() {
    let sysfs = FakeSysfs::new();
    let ctl = sysfs.controller();
    sysfs.kernel_export(9);
    fs::remove_file(sysfs.attr(9, "edge")).unwrap();

    assert!(matches!(
        ctl.set_edge(9, EdgeTrigger::Rising),
        Err(AppError::Io { .. })
    ));
}

#[test]
fn value_round_trip_alternating() {
    let sysfs = FakeSysfs::new();
    let ctl = sysfs.controller();
    sysfs.kernel_export(10);
    ctl.set_direction(10, Direction::Output).unwrap();

    for level in [Level::High, Level::Low, Level::High, Level::Low, Level::High] {
        ctl.set_value(10, level).unwrap();
        assert_eq!(ctl.get_value(10).unwrap(), level);
    }
}

#[test]
fn get_value_reads_only_first_byte() {
    let sysfs = FakeSysfs::new();
    let ctl = sysfs.controller();
    sysfs.kernel_export(11);
    fs::write(sysfs.attr(11, "value"), "1\n").unwrap();

    assert_eq!(ctl.get_value(11).unwrap(), Level::High);
}

#[test]
fn get_value_rejects_malformed_byte() {
    let sysfs = FakeSysfs::new();
    let ctl = sysfs.controller();
    sysfs.kernel_export(12);

    for content in ["2", "x", " ", "\n"] {
        fs::write(sysfs.attr(12, "value"), content).unwrap();
        match ctl.get_value(12) {
            Err(AppError::CorruptValue { found, .. }) => {
                assert_eq!(found, Some(content.as_bytes()[0]))
            }
            other => panic!("expected corrupt value for {content:?}, got {other:?}"),
        }
    }
}

#[test]
fn get_value_rejects_empty_file() {
    let sysfs = FakeSysfs::new();
    let ctl = sysfs.controller();
    sysfs.kernel_export(13);
    sysfs.clear(sysfs.attr(13, "value"));

    assert!(matches!(
        ctl.get_value(13),
        Err(AppError::CorruptValue { found: None, .. })
    ));
}

#[test]
fn end_to_end_export_drive_release() {
    let sysfs = FakeSysfs::new();
    let ctl = sysfs.controller();
    let export = sysfs.root().join("export");
    let unexport = sysfs.root().join("unexport");

    ctl.export(17).unwrap();
    assert_eq!(sysfs.read(&export), "17");
    sysfs.kernel_export(17);
    assert!(ctl.is_exported(17));

    ctl.set_direction(17, Direction::Output).unwrap();
    ctl.set_value(17, Level::High).unwrap();
    assert_eq!(ctl.get_value(17).unwrap(), Level::High);

    ctl.unexport(17).unwrap();
    assert_eq!(sysfs.read(&unexport), "17");
    sysfs.kernel_unexport(17);
    assert!(!ctl.is_exported(17));
    assert!(matches!(ctl.get_value(17), Err(AppError::NotExported(17))));

    sysfs.clear(&export);
    ctl.export(17).unwrap();
    assert_eq!(sysfs.read(&export), "17");
}

#[test]
fn handle_is_non_blocking_and_closes_once() {
    let sysfs = FakeSysfs::new();
    let ctl = sysfs.controller();
    sysfs.kernel_export(20);
    fs::write(sysfs.attr(20, "value"), "1").unwrap();

    let handle = ctl.open_handle(20).unwrap();
    assert_eq!(handle.pin(), 20);

    let flags = unsafe { libc::fcntl(handle.as_raw_fd(), libc::F_GETFL) };
    assert!(flags >= 0);
    assert_ne!(flags & libc::O_NONBLOCK, 0);
    assert_eq!(flags & libc::O_ACCMODE, libc::O_RDONLY);

    assert_eq!(handle.read_level().unwrap(), Level::High);
    ctl.close_handle(handle).unwrap();
}

#[test]
fn handle_read_level_rereads_from_start() {
    let sysfs = FakeSysfs::new();
    let ctl = sysfs.controller();
    sysfs.kernel_export(21);

    let handle = ctl.open_handle(21).unwrap();
    assert_eq!(handle.read_level().unwrap(), Level::Low);

    ctl.set_value(21, Level::High).unwrap();
    assert_eq!(handle.read_level().unwrap(), Level::High);

    handle.close().unwrap();
}

#[test]
fn open_handle_fails_for_missing_value_file() {
    let sysfs = FakeSysfs::new();
    let ctl = sysfs.controller();

    assert!(matches!(ctl.open_handle(22), Err(AppError::Io { .. })));
}
