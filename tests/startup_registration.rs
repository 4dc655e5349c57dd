// tests/startup_registration.rs

use std::path::Path;

use tempfile::TempDir;

use delaystart::fs::mock::MockFileSystem;
use delaystart::fs::{PathError, RealFileSystem};
use delaystart::startup::{
    register, startup_command_line, unregister, AutostartRegistrar, RegistryError,
    StartupRegistrar, RUN_VALUE_NAME,
};
use delaystart_test_utils::fake_registrar::MemoryRegistrar;

#[test]
fn register_then_read_back_then_unregister() {
    let fs = MockFileSystem::new();
    fs.add_file("/etc/delaystart/tasks.json", b"[]");
    let registrar = MemoryRegistrar::new();

    let written = register(
        &registrar,
        &fs,
        Path::new("/opt/delaystart/delaystart"),
        "/etc/delaystart/tasks.json",
    )
    .unwrap();

    let stored = registrar.get(RUN_VALUE_NAME).unwrap();
    assert_eq!(stored, written);
    assert!(stored.starts_with("\"/opt/delaystart/delaystart\""));
    assert!(stored.contains(" -c \"/etc/delaystart/tasks.json\""));

    unregister(&registrar).unwrap();
    assert!(matches!(
        registrar.get(RUN_VALUE_NAME),
        Err(RegistryError::NotFound(_))
    ));
    assert!(registrar.is_empty());
}

#[test]
fn relative_config_is_made_absolute() {
    let fs = MockFileSystem::new();
    fs.add_file("/DelayStart.json", b"[]");

    let line = startup_command_line(&fs, Path::new("/opt/ds"), "DelayStart.json").unwrap();
    assert_eq!(line, "\"/opt/ds\" -c \"/DelayStart.json\"");
}

#[test]
fn empty_config_registers_executable_only() {
    let fs = MockFileSystem::new();
    let line = startup_command_line(&fs, Path::new("/opt/ds"), "").unwrap();
    assert_eq!(line, "\"/opt/ds\"");
}

#[test]
fn missing_or_directory_config_is_rejected() {
    let fs = MockFileSystem::new();
    fs.add_dir("/etc/delaystart");
    let registrar = MemoryRegistrar::new();

    let err = register(&registrar, &fs, Path::new("/opt/ds"), "/etc/missing.json").unwrap_err();
    assert!(matches!(err, RegistryError::Config(PathError::NotFound(_))));

    let err = register(&registrar, &fs, Path::new("/opt/ds"), "/etc/delaystart").unwrap_err();
    assert!(matches!(err, RegistryError::Config(PathError::IsDir(_))));

    assert!(registrar.is_empty(), "nothing written on failure");
}

#[test]
fn unregister_without_entry_reports_not_found() {
    let registrar = MemoryRegistrar::new();
    assert!(matches!(
        unregister(&registrar),
        Err(RegistryError::NotFound(_))
    ));
}

#[test]
fn autostart_registrar_round_trips_through_desktop_file() {
    let tmp = TempDir::new().unwrap();
    let config = tmp.path().join("tasks.json");
    std::fs::write(&config, b"[]").unwrap();
    let registrar = AutostartRegistrar::new(tmp.path().join("autostart"));

    let written = register(
        &registrar,
        &RealFileSystem,
        &tmp.path().join("delaystart"),
        config.to_str().unwrap(),
    )
    .unwrap();

    let entry = registrar.dir().join(format!("{RUN_VALUE_NAME}.desktop"));
    assert!(entry.is_file());
    assert_eq!(registrar.get(RUN_VALUE_NAME).unwrap(), written);
    assert!(written.contains(&format!(" -c \"{}\"", config.display())));

    unregister(&registrar).unwrap();
    assert!(!entry.exists());
    assert!(matches!(
        registrar.get(RUN_VALUE_NAME),
        Err(RegistryError::NotFound(_))
    ));
}
