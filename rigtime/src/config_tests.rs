use crate::{Error, SettingValue, Settings};

#[test]
fn typed_lookups() {
    let settings = Settings::new()
        .with("loop", true)
        .with("frame_duration", 0.25f32)
        .with("name", "walk");

    assert_eq!(settings.len(), 3);
    assert_eq!(settings.get_bool("loop").unwrap(), Some(true));
    assert_eq!(settings.get_f32("frame_duration").unwrap(), Some(0.25));
    assert_eq!(settings.get_str("name").unwrap(), Some("walk"));
    assert_eq!(settings.get_bool("missing").unwrap(), None);
    assert!(settings.contains("name"));
}

#[test]
fn wrong_type_is_an_error() {
    let settings = Settings::new().with("loop", 1.0f32);
    let err = settings.get_bool("loop").unwrap_err();
    assert!(matches!(
        err,
        Error::SettingType {
            expected: "bool",
            ..
        }
    ));
    assert!(settings.get_str("loop").is_err());
}

#[test]
fn later_inserts_replace_earlier_ones() {
    let mut settings = Settings::new();
    settings.insert("reverse", false);
    settings.insert("reverse", true);
    assert_eq!(settings.len(), 1);
    assert_eq!(settings.get("reverse"), Some(&SettingValue::Bool(true)));
}

#[test]
fn collects_from_pairs_in_key_order() {
    let settings: Settings = [("b", 2.0f32), ("a", 1.0f32)].into_iter().collect();
    let keys: Vec<&str> = settings.iter().map(|(k, _)| k).collect();
    assert_eq!(keys, vec!["a", "b"]);
}

#[cfg(feature = "json")]
#[test]
fn parses_flat_json_object() {
    let settings = Settings::from_json_str(
        r#"{ "frame_duration": 0.05, "loop": true, "speed_coefficient": 2, "label": "x" }"#,
    )
    .unwrap();
    assert_eq!(settings.get_f32("frame_duration").unwrap(), Some(0.05));
    assert_eq!(settings.get_f32("speed_coefficient").unwrap(), Some(2.0));
    assert_eq!(settings.get_bool("loop").unwrap(), Some(true));
    assert_eq!(settings.get_str("label").unwrap(), Some("x"));

    assert!(matches!(
        Settings::from_json_str("[1, 2]"),
        Err(Error::JsonParse { .. })
    ));
}
