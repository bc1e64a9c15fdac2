//! Tests for preset persistence


use ptz_face_tracker::{
    constants::DEFAULT_PRESET,
    presets::{apply_preset, default_values, PresetStore, PresetValues},
    Error,
};
use std::{
    fs,
    path::PathBuf,
    sync::atomic::{AtomicUsize, Ordering},
};
use test_helpers::RecordingGateway;

/// Unique scratch directory, removed on drop
struct Scratch(PathBuf);

impl Scratch {
    fn new(name: &str) -> Self {
        static COUNTER: AtomicUsize = AtomicUsize::new(0);
        let dir = std::env::temp_dir().join(format!(
            "ptz-presets-{}-{}-{}",
            name,
            std::process::id(),
            COUNTER.fetch_add(1, Ordering::SeqCst)
        ));
        let _ = fs::remove_dir_all(&dir);
        Self(dir)
    }

    fn store(&self) -> PresetStore {
        PresetStore::new(self.0.join("meet2ui").join("presets.json"))
    }
}

impl Drop for Scratch {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.0);
    }
}

fn preset(pairs: &[(&str, i32)]) -> PresetValues {
    pairs.iter().map(|(k, v)| ((*k).to_string(), *v)).collect()
}

#[test]
fn test_missing_file_yields_default() {
    let scratch = Scratch::new("missing");
    let presets = scratch.store().load();
    assert_eq!(presets.len(), 1);
    assert_eq!(presets[DEFAULT_PRESET], default_values());
}

#[test]
fn test_corrupt_file_falls_back_to_defaults() {
    let scratch = Scratch::new("corrupt");
    let store = scratch.store();
    fs::create_dir_all(store.path().parent().unwrap()).unwrap();
    fs::write(store.path(), "{ not json").unwrap();

    let presets = store.load();
    assert_eq!(presets.len(), 1);
    assert_eq!(presets[DEFAULT_PRESET], default_values());
}

#[test]
fn test_save_creates_directory_and_round_trips() {
    let scratch = Scratch::new("save");
    let store = scratch.store();

    store.save_preset("Evening", preset(&[("brightness", 30), ("contrast", 70)])).unwrap();
    assert!(store.path().exists());

    assert_eq!(store.get_preset("Evening").unwrap()["brightness"], 30);
    assert_eq!(store.list_names(), vec!["Default", "Evening"]);
}

#[test]
fn test_loaded_set_without_default_gets_one() {
    let scratch = Scratch::new("nodefault");
    let store = scratch.store();
    fs::create_dir_all(store.path().parent().unwrap()).unwrap();
    fs::write(store.path(), r#"{"Bright": {"brightness": 90}}"#).unwrap();

    let presets = store.load();
    assert_eq!(presets["Bright"]["brightness"], 90);
    assert_eq!(presets[DEFAULT_PRESET], default_values());
}

#[test]
fn test_names_sorted_with_default_first() {
    let scratch = Scratch::new("order");
    let store = scratch.store();
    for name in ["Zoom call", "Alpha", "Meeting"] {
        store.save_preset(name, PresetValues::new()).unwrap();
    }
    assert_eq!(store.list_names(), vec!["Default", "Alpha", "Meeting", "Zoom call"]);
}

#[test]
fn test_default_cannot_be_deleted() {
    let scratch = Scratch::new("protected");
    let store = scratch.store();
    assert!(matches!(store.delete_preset(DEFAULT_PRESET), Err(Error::ProtectedPreset(_))));
    assert!(store.get_preset(DEFAULT_PRESET).is_some());
}

#[test]
fn test_delete_preset() {
    let scratch = Scratch::new("delete");
    let store = scratch.store();
    store.save_preset("Temp", preset(&[("zoom_absolute", 10)])).unwrap();

    store.delete_preset("Temp").unwrap();
    assert!(store.get_preset("Temp").is_none());

    // unknown names are a no-op
    store.delete_preset("Temp").unwrap();
}

#[test]
fn test_empty_name_rejected() {
    let scratch = Scratch::new("empty");
    assert!(matches!(
        scratch.store().save_preset("  ", PresetValues::new()),
        Err(Error::InvalidInput(_))
    ));
}

#[test]
fn test_unknown_preset_lists_available_names() {
    let scratch = Scratch::new("unknown");
    let store = scratch.store();
    store.save_preset("Studio", PresetValues::new()).unwrap();

    match store.require_preset("Nope") {
        Err(Error::PresetNotFound { name, available }) => {
            assert_eq!(name, "Nope");
            assert_eq!(available, vec!["Default", "Studio"]);
        }
        other => panic!("expected PresetNotFound, got {other:?}"),
    }

    let message = store.require_preset("Nope").unwrap_err().to_string();
    assert!(message.contains("Default, Studio"), "{message}");
}

#[test]
fn test_apply_preset_reports_each_control() {
    let mut gateway = RecordingGateway::new().failing_on("contrast");
    let applied = apply_preset(&mut gateway, &preset(&[("contrast", 40), ("brightness", 80)]));

    assert_eq!(applied.len(), 2);
    assert_eq!(applied[0].control, "brightness");
    assert!(applied[0].ok);
    assert_eq!(applied[1].control, "contrast");
    assert_eq!(applied[1].value, 40);
    assert!(!applied[1].ok);
}
