/*!
 * Tests for application configuration
 */

use anyhow::Result;
use lingosub::app_config::{Config, LogLevel};
use lingosub::document::FileMode;
use lingosub::translation::PersonaPreset;
use crate::common;

/// A missing config file is created with defaults and can be read back
#[test]
fn test_loadOrCreate_withMissingFile_shouldWriteDefaults() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("conf.json");

    let created = Config::load_or_create(&path)?;
    assert!(path.exists());
    assert_eq!(created.target_language, "Traditional Chinese");

    let loaded = Config::load_or_create(&path)?;
    assert_eq!(loaded.translation.model, created.translation.model);
    assert_eq!(loaded.translation.persona_preset, PersonaPreset::Subtitle);
    assert_eq!(loaded.log_level, LogLevel::Info);
    Ok(())
}

#[test]
fn test_loadOrCreate_withInvalidJson_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "conf.json", "{ not json")?;
    assert!(Config::load_or_create(&path).is_err());
    Ok(())
}

#[test]
fn test_loadOrCreate_withPresetAndMode_shouldResolvePersona() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(
        temp_dir.path(),
        "conf.json",
        r#"{"file_mode":"srt","translation":{"persona_preset":"technical","temperature":0.2}}"#,
    )?;

    let config = Config::load_or_create(&path)?;
    config.validate()?;
    assert_eq!(config.job_config().persona_instruction, PersonaPreset::Technical.instruction());
    assert_eq!(config.translation.temperature, Some(0.2));
    Ok(())
}

#[test]
fn test_validate_withOutOfRangeValues_shouldFail() {
    let mut config = common::test_config(100, FileMode::PlainText);
    assert!(config.validate().is_ok());

    config.translation.temperature = Some(1.5);
    assert!(config.validate().is_err());

    let mut config = common::test_config(20, FileMode::Srt);
    config.source_language = "  ".to_string();
    assert!(config.validate().is_err());

    let mut config = common::test_config(20, FileMode::Srt);
    config.translation.model = String::new();
    assert!(config.validate().is_err());
}
