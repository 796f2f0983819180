//! Integration tests for config loading from fixture files.
//!
//! These tests verify that all config modules can parse the sample config file correctly.

use std::fs;
use std::path::Path;

/// Read the sample config file content.
fn read_sample_config() -> String {
    let config_path = Path::new("tests/fixtures/sample_config.toml");
    fs::read_to_string(config_path).expect("Failed to read sample config file")
}

#[test]
fn sample_config_file_exists() {
    let config_path = Path::new("tests/fixtures/sample_config.toml");
    assert!(config_path.exists(), "Sample config file should exist");
}

#[test]
fn sample_config_is_valid_toml() {
    let config_content = read_sample_config();
    let result: Result<toml::Value, _> = toml::from_str(&config_content);
    assert!(result.is_ok(), "Sample config should be valid TOML: {:?}", result.err());
}

#[test]
fn sample_config_has_all_sections() {
    let config_content = read_sample_config();
    let value: toml::Value = toml::from_str(&config_content).expect("should parse");

    let table = value.as_table().expect("should be a table");

    for section in ["ep_merge", "ep_rename"] {
        assert!(table.contains_key(section), "Config should have [{section}] section");
    }
}

#[test]
fn ep_merge_section_has_expected_structure() {
    let config_content = read_sample_config();
    let value: toml::Value = toml::from_str(&config_content).expect("should parse");

    let ep_merge = value.get("ep_merge").expect("should have ep_merge section");

    assert!(ep_merge.get("regex").is_some());
    assert!(ep_merge.get("sample").is_some());
    assert!(ep_merge.get("overwrite").is_some());
    assert!(ep_merge.get("target_width").is_some());
    assert!(ep_merge.get("target_height").is_some());
    assert!(ep_merge.get("target_fps").is_some());
    assert!(ep_merge.get("sample_rate").is_some());
    assert!(ep_merge.get("channel_layout").is_some());
}

#[test]
fn ep_rename_section_has_expected_structure() {
    let config_content = read_sample_config();
    let value: toml::Value = toml::from_str(&config_content).expect("should parse");

    let ep_rename = value.get("ep_rename").expect("should have ep_rename section");

    assert!(ep_rename.get("regex").is_some());
    assert!(ep_rename.get("template").is_some());
    assert!(ep_rename.get("verbose").is_some());
}

#[test]
fn config_values_have_correct_types() {
    let config_content = read_sample_config();
    let value: toml::Value = toml::from_str(&config_content).expect("should parse");

    let ep_merge = value.get("ep_merge").expect("should have ep_merge section");
    assert!(ep_merge.get("overwrite").unwrap().is_bool());
    assert!(ep_merge.get("target_width").unwrap().is_integer());
    assert!(ep_merge.get("target_fps").unwrap().is_str());
    assert!(ep_merge.get("channel_layout").unwrap().is_str());

    let ep_rename = value.get("ep_rename").expect("should have ep_rename section");
    assert!(ep_rename.get("template").unwrap().is_str());
    assert!(ep_rename.get("verbose").unwrap().is_bool());
}
