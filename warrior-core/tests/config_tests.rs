//! Config persistence, corruption recovery and atomic-write tests.

use assert_fs::prelude::*;
use predicates::prelude::predicate;
use rstest::rstest;
use std::fs;
use warrior_core::{
    config::{self, resolve_selector},
    paths, Config, ConfigError, ListName, ListSelector,
};

// ---------------------------------------------------------------------------
// 1. Round trip
// ---------------------------------------------------------------------------

#[rstest]
#[case(ListSelector::All)]
#[case(ListSelector::Named(ListName::from("Groceries")))]
#[case(ListSelector::Named(ListName::from("Work: Q3 (shared)")))]
fn default_list_survives_save_and_load(#[case] selector: ListSelector) {
    let home = assert_fs::TempDir::new().expect("tempdir");
    let cfg = Config {
        default_list: Some(selector.clone()),
        ..Config::default()
    };
    config::save_at(home.path(), &cfg).expect("save");

    let loaded = config::load_at(home.path()).expect("load");
    assert_eq!(loaded.default_list, Some(selector));
}

#[test]
fn star_is_persisted_for_all_lists() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    let cfg = Config {
        default_list: Some(ListSelector::All),
        ..Config::default()
    };
    config::save_at(home.path(), &cfg).expect("save");

    home.child(".reminder-warrior/config.yaml")
        .assert(predicate::str::contains("default_list"))
        .assert(predicate::str::contains("*"));
}

// ---------------------------------------------------------------------------
// 2. Corruption recovery
// ---------------------------------------------------------------------------

#[test]
fn corrupt_config_is_moved_aside_and_defaults_used() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    let path = paths::config_path(home.path());
    fs::create_dir_all(path.parent().unwrap()).expect("mkdir");
    fs::write(&path, b"default_list: [unclosed\n  : : !!!").expect("write");

    let loaded = config::load_at(home.path()).expect("load never fails on parse errors");
    assert_eq!(loaded, Config::default());

    assert!(!path.exists(), "corrupt config must be moved away");
    home.child(".reminder-warrior/config.yaml.bak")
        .assert(predicate::str::contains("[unclosed"));
}

// ---------------------------------------------------------------------------
// 3. Atomic write
// ---------------------------------------------------------------------------

#[test]
fn tmp_file_removed_after_save() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    config::save_at(home.path(), &Config::default()).expect("save");
    home.child(".reminder-warrior/config.yaml.tmp")
        .assert(predicate::path::missing());
    home.child(".reminder-warrior/config.yaml")
        .assert(predicate::path::exists());
}

#[cfg(unix)]
#[test]
fn saved_config_is_private() {
    use std::os::unix::fs::PermissionsExt;

    let home = assert_fs::TempDir::new().expect("tempdir");
    config::save_at(home.path(), &Config::default()).expect("save");
    let mode = fs::metadata(paths::config_path(home.path()))
        .expect("metadata")
        .permissions()
        .mode();
    assert_eq!(mode & 0o777, 0o600);
}

// ---------------------------------------------------------------------------
// 4. Selector resolution
// ---------------------------------------------------------------------------

#[test]
fn configured_default_used_when_nothing_explicit() {
    let cfg = Config {
        default_list: Some(ListSelector::Named(ListName::from("Home"))),
        ..Config::default()
    };
    let selector = resolve_selector(None, false, &cfg).expect("resolve");
    assert_eq!(selector, ListSelector::Named(ListName::from("Home")));
}

#[test]
fn all_flag_overrides_configured_default() {
    let cfg = Config {
        default_list: Some(ListSelector::Named(ListName::from("Home"))),
        ..Config::default()
    };
    let selector = resolve_selector(None, true, &cfg).expect("resolve");
    assert_eq!(selector, ListSelector::All);
}

#[test]
fn nothing_selected_reports_how_to_fix() {
    let err = resolve_selector(None, false, &Config::default()).unwrap_err();
    assert!(matches!(err, ConfigError::NoListSelected), "got: {err}");
}
