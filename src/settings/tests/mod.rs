use std::io::Write;

use validator::Validate;

use super::{Settings, SettingsError};

fn settings_from(content: &str) -> Result<Settings, SettingsError> {
    let mut file = tempfile::Builder::new()
        .suffix(".toml")
        .tempfile()
        .unwrap();
    file.write_all(content.as_bytes()).unwrap();
    Settings::new(Some(file.path()))
}

#[test]
fn test_settings_new() {
    assert!(Settings::new(Some("configs/config.toml")).is_ok());
    assert!(Settings::new(Some("configs/missing.toml")).is_err());
}

#[test]
fn test_settings_defaults() {
    let settings = Settings::new(None::<&str>).unwrap();

    assert_eq!(settings.redis.key, "students");
    assert_eq!(settings.selection.seed, None);
    assert!(settings.validate().is_ok());
}

#[test]
fn test_settings_from_file() {
    let settings = settings_from(
        r#"
        [redis]
        url = "redis://localhost:6380/2"
        key = "class_7b"

        [log]
        filter = "rollcall=debug"

        [selection]
        seed = 42
        "#,
    )
    .unwrap();

    assert_eq!(settings.redis.key, "class_7b");
    assert_eq!(settings.selection.seed, Some(42));
}

#[test]
fn test_settings_partial_file_keeps_defaults() {
    let settings = settings_from("[selection]\nseed = 7\n").unwrap();

    assert_eq!(settings.redis.key, "students");
    assert_eq!(settings.selection.seed, Some(7));
}

#[test]
fn test_validate_redis_key() {
    assert!(matches!(
        settings_from("[redis]\nkey = \"\"\n"),
        Err(SettingsError::Validation(_))
    ));
}

#[test]
fn test_invalid_values() {
    assert!(matches!(
        settings_from("[redis]\nurl = \"not a url\"\n"),
        Err(SettingsError::Loading(_))
    ));
    assert!(matches!(
        settings_from("[log]\nfilter = \"rollcall=loud\"\n"),
        Err(SettingsError::Loading(_))
    ));
}
