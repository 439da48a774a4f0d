use super::*;
use mockall::predicate::{always, eq};
use serde_json::json;

fn mapping(value: Value) -> Mapping {
    value.as_object().cloned().unwrap()
}

#[test]
fn test_semantic_types() {
    assert_eq!(SemanticType::of(&json!(true)), SemanticType::Boolean);
    assert_eq!(SemanticType::of(&json!(0)), SemanticType::Integer);
    assert_eq!(SemanticType::of(&json!(1.5)), SemanticType::Float);
    assert_eq!(SemanticType::of(&json!("x")), SemanticType::String);
    assert_eq!(SemanticType::of(&json!([])), SemanticType::Array);
    assert_eq!(SemanticType::of(&json!({})), SemanticType::Mapping);
    assert_eq!(SemanticType::of(&Value::Null), SemanticType::Null);
}

#[test]
fn test_round_trip_defaults() {
    let store = MemoryStore::new();
    let defaults = Settings::default().to_mapping();

    store.save_mapping("k", &defaults, true).unwrap();
    assert_eq!(load_or_default(&store, "k", &defaults).unwrap(), defaults);
}

#[test]
fn test_valid_record_is_returned_without_save() {
    let mut store = MockConfigStore::new();
    store
        .expect_load_mapping()
        .with(eq("k"))
        .times(1)
        .returning(|_| Ok(Some(json!({"led_on": true, "log_on": false, "extra": 3}))));
    store.expect_save_mapping().never();

    let loaded = load_or_default(&store, "k", &Settings::default().to_mapping()).unwrap();
    assert_eq!(loaded.get("extra"), Some(&json!(3)));
    assert_eq!(
        Settings::from_mapping(&loaded).unwrap(),
        Settings {
            led_on: true,
            log_on: false
        }
    );
}

#[test]
fn test_missing_key_resets_and_saves_once() {
    let defaults = Settings::default().to_mapping();
    let expected = defaults.clone();

    let mut store = MockConfigStore::new();
    store
        .expect_load_mapping()
        .returning(|_| Ok(Some(json!({"led_on": true}))));
    store
        .expect_save_mapping()
        .withf(move |key, saved, overwrite| key == "k" && *saved == expected && *overwrite)
        .times(1)
        .returning(|_, _, _| Ok(()));

    assert_eq!(load_or_default(&store, "k", &defaults).unwrap(), defaults);
}

#[test]
fn test_wrong_type_resets_and_saves_once() {
    let defaults = Settings::default().to_mapping();

    let mut store = MockConfigStore::new();
    store
        .expect_load_mapping()
        .returning(|_| Ok(Some(json!({"led_on": "yes", "log_on": true}))));
    store
        .expect_save_mapping()
        .with(eq("k"), always(), eq(true))
        .times(1)
        .returning(|_, _, _| Ok(()));

    assert_eq!(load_or_default(&store, "k", &defaults).unwrap(), defaults);
}

#[test]
fn test_integer_flags_are_accepted() {
    let store = MemoryStore::new();
    store.insert("k", json!({"led_on": 1, "log_on": 0, "extra": "kept"}));

    let settings = Settings::load(&store, "k").unwrap();
    assert_eq!(
        settings,
        Settings {
            led_on: true,
            log_on: false,
        }
    );
    // Valid record: left as stored
    assert_eq!(
        store.get("k"),
        Some(json!({"led_on": 1, "log_on": 0, "extra": "kept"}))
    );
}

#[test]
fn test_integer_flag_out_of_range_resets() {
    for stored in [json!({"led_on": 2, "log_on": true}), json!({"led_on": -1, "log_on": true})] {
        let store = MemoryStore::new();
        store.insert("k", stored);

        assert_eq!(Settings::load(&store, "k").unwrap(), Settings::default());
        assert_eq!(store.get("k"), Some(Value::Object(Settings::default().to_mapping())));
    }
}

#[test]
fn test_float_flag_resets() {
    let store = MemoryStore::new();
    store.insert("k", json!({"led_on": 1.0, "log_on": true}));
    assert_eq!(Settings::load(&store, "k").unwrap(), Settings::default());
}

#[test]
fn test_non_mapping_resets() {
    for stored in [json!([1, 2]), json!("led_on"), Value::Null] {
        let store = MemoryStore::new();
        store.insert("k", stored);
        assert_eq!(Settings::load(&store, "k").unwrap(), Settings::default());
    }
}

#[test]
fn test_integer_defaults_accept_integers_only() {
    let defaults = mapping(json!({"pin": 12}));
    let store = MemoryStore::new();

    store.insert("k", json!({"pin": 6}));
    assert_eq!(load_or_default(&store, "k", &defaults).unwrap(), mapping(json!({"pin": 6})));

    store.insert("k", json!({"pin": 6.5}));
    assert_eq!(load_or_default(&store, "k", &defaults).unwrap(), defaults);
}

#[test]
fn test_store_error_propagates() {
    let mut store = MockConfigStore::new();
    store
        .expect_load_mapping()
        .returning(|_| Err(crate::Error::Store("offline".into())));
    store.expect_save_mapping().never();

    assert!(Settings::load(&store, "k").is_err());
}

#[test]
fn test_led_polarity() {
    let active_low = Settings {
        led_on: false,
        log_on: true,
    };
    assert!(!active_low.led_level(true));
    assert!(active_low.led_level(false));

    let active_high = Settings {
        led_on: true,
        log_on: true,
    };
    assert!(active_high.led_level(true));
    assert!(!active_high.led_level(false));
}

#[test]
fn test_memory_store_respects_overwrite_flag() {
    let store = MemoryStore::new();
    store
        .save_mapping("k", &mapping(json!({"a": 1})), false)
        .unwrap();
    store
        .save_mapping("k", &mapping(json!({"a": 2})), false)
        .unwrap();
    assert_eq!(store.get("k"), Some(json!({"a": 1})));

    store
        .save_mapping("k", &mapping(json!({"a": 3})), true)
        .unwrap();
    assert_eq!(store.get("k"), Some(json!({"a": 3})));
}

#[test]
fn test_json_file_store() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::new(dir.path().join("settings"));

    assert!(store.load_mapping(DEFAULT_SETTINGS_KEY).unwrap().is_none());

    let settings = Settings::load(&store, DEFAULT_SETTINGS_KEY).unwrap();
    assert_eq!(settings, Settings::default());
    assert!(dir
        .path()
        .join("settings")
        .join("gpio_config_config.json")
        .exists());

    store
        .save_mapping(
            DEFAULT_SETTINGS_KEY,
            &mapping(json!({"led_on": true, "log_on": true})),
            false,
        )
        .unwrap();
    assert_eq!(
        Settings::load(&store, DEFAULT_SETTINGS_KEY).unwrap(),
        Settings::default()
    );
}

#[test]
fn test_json_file_store_corrupt_file_resets() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("k.json"), "{not json").unwrap();
    let store = JsonFileStore::new(dir.path());

    assert_eq!(store.load_mapping("k").unwrap(), Some(Value::Null));
    assert_eq!(Settings::load(&store, "k").unwrap(), Settings::default());
    assert_eq!(
        store.load_mapping("k").unwrap(),
        Some(Value::Object(Settings::default().to_mapping()))
    );
}

#[test]
fn test_json_file_store_binary_file_resets() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("k.json");
    std::fs::write(&path, [0xff, 0xfe, 0x7b]).unwrap();
    let store = JsonFileStore::new(dir.path());

    assert_eq!(store.load_mapping("k").unwrap(), Some(Value::Null));
    assert_eq!(Settings::load(&store, "k").unwrap(), Settings::default());

    let saved: Value = serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
    assert_eq!(saved, Value::Object(Settings::default().to_mapping()));
}

#[test]
fn test_json_file_store_rejects_path_keys() {
    let store = JsonFileStore::new("/tmp/unused");
    assert!(store.load_mapping("../etc/passwd").is_err());
    assert!(store.load_mapping("").is_err());
}
