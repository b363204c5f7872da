//! Settings loading from configuration files.
//!
//! This module provides functions to load [`Settings`] from TOML files, JSON
//! files, and to apply environment variable overrides.
//!
//! ## Loading Order
//!
//! 1. Start with default settings.
//! 2. Load from a TOML or JSON file (overriding defaults).
//! 3. Apply environment variable overrides (highest priority).
//!
//! ## Environment Variable Mapping
//!
//! Environment variables are mapped from `TALLY_<SETTING_NAME>` format:
//!
//! | Env Var | Setting |
//! |---|---|
//! | `TALLY_DEBUG` | `debug` |
//! | `TALLY_LOG_LEVEL` | `log_level` |
//! | `TALLY_LANGUAGE_CODE` | `language_code` |
//! | `TALLY_TIME_ZONE` | `time_zone` |
//! | `TALLY_CURRENCY` | `currency` |
//! | `TALLY_SESSION_KEY` | `tenancy.session_key` |
//! | `TALLY_AUTOCOMPLETE_PAGE_SIZE` | `forms.autocomplete_page_size` |
//!
//! ## Examples
//!
//! ```rust,no_run
//! use tally_rs_core::settings_loader;
//!
//! // Load from TOML
//! let settings = settings_loader::from_toml_file("config/settings.toml").unwrap();
//!
//! // Load from TOML with environment overrides
//! let settings = settings_loader::from_toml_file_with_env("config/settings.toml").unwrap();
//! ```

use std::path::Path;

use crate::error::TallyError;
use crate::settings::Settings;

/// Loads settings from a TOML string.
///
/// The TOML is deserialized directly into a [`Settings`] struct. Any fields
/// not present in the TOML will use the default values.
///
/// # Errors
///
/// Returns an error if the TOML is malformed or cannot be deserialized.
pub fn from_toml_str(toml_str: &str) -> Result<Settings, TallyError> {
    // Deserialize the TOML into a serde_json::Value, then merge it with the
    // default settings so any keys the file omits keep their defaults.
    let toml_value: toml::Value = toml::from_str(toml_str)
        .map_err(|e| TallyError::ConfigurationError(format!("Failed to parse TOML: {e}")))?;

    let json_value = toml_to_json(toml_value);
    let default_json = serde_json::to_value(Settings::default()).map_err(|e| {
        TallyError::ConfigurationError(format!("Failed to serialize default settings: {e}"))
    })?;

    let merged = merge_json(default_json, json_value);
    serde_json::from_value(merged).map_err(|e| {
        TallyError::ConfigurationError(format!("Failed to deserialize settings from TOML: {e}"))
    })
}

/// Loads settings from a TOML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or the TOML is malformed.
pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Settings, TallyError> {
    let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
        TallyError::ConfigurationError(format!(
            "Failed to read TOML file '{}': {e}",
            path.as_ref().display()
        ))
    })?;
    from_toml_str(&content)
}

/// Loads settings from a TOML file and then applies environment variable overrides.
///
/// # Errors
///
/// Returns an error if the file cannot be read or the TOML is malformed.
pub fn from_toml_file_with_env(path: impl AsRef<Path>) -> Result<Settings, TallyError> {
    let mut settings = from_toml_file(path)?;
    apply_env_overrides(&mut settings);
    Ok(settings)
}

/// Loads settings from a JSON string.
///
/// # Errors
///
/// Returns an error if the JSON is malformed or cannot be deserialized.
pub fn from_json_str(json_str: &str) -> Result<Settings, TallyError> {
    let json_value: serde_json::Value = serde_json::from_str(json_str)
        .map_err(|e| TallyError::ConfigurationError(format!("Failed to parse JSON: {e}")))?;

    let default_json = serde_json::to_value(Settings::default()).map_err(|e| {
        TallyError::ConfigurationError(format!("Failed to serialize default settings: {e}"))
    })?;

    let merged = merge_json(default_json, json_value);
    serde_json::from_value(merged).map_err(|e| {
        TallyError::ConfigurationError(format!("Failed to deserialize settings from JSON: {e}"))
    })
}

/// Loads settings from a JSON file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or the JSON is malformed.
pub fn from_json_file(path: impl AsRef<Path>) -> Result<Settings, TallyError> {
    let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
        TallyError::ConfigurationError(format!(
            "Failed to read JSON file '{}': {e}",
            path.as_ref().display()
        ))
    })?;
    from_json_str(&content)
}

/// Loads settings from just environment variables (starting from defaults).
pub fn from_env() -> Settings {
    let mut settings = Settings::default();
    apply_env_overrides(&mut settings);
    settings
}

/// Applies environment variable overrides to a settings struct.
///
/// Supported environment variables:
///
/// - `TALLY_DEBUG` -> `debug` (values: "true"/"1"/"yes" => true, anything else => false)
/// - `TALLY_LOG_LEVEL` -> `log_level`
/// - `TALLY_LANGUAGE_CODE` -> `language_code`
/// - `TALLY_TIME_ZONE` -> `time_zone`
/// - `TALLY_CURRENCY` -> `currency`
/// - `TALLY_SESSION_KEY` -> `tenancy.session_key`
/// - `TALLY_AUTOCOMPLETE_PAGE_SIZE` -> `forms.autocomplete_page_size`
pub fn apply_env_overrides(settings: &mut Settings) {
    if let Ok(val) = std::env::var("TALLY_DEBUG") {
        settings.debug = matches!(val.to_lowercase().as_str(), "true" | "1" | "yes");
    }

    if let Ok(val) = std::env::var("TALLY_LOG_LEVEL") {
        settings.log_level = val;
    }

    if let Ok(val) = std::env::var("TALLY_LANGUAGE_CODE") {
        settings.language_code = val;
    }

    if let Ok(val) = std::env::var("TALLY_TIME_ZONE") {
        settings.time_zone = val;
    }

    if let Ok(val) = std::env::var("TALLY_CURRENCY") {
        settings.currency = val;
    }

    if let Ok(val) = std::env::var("TALLY_SESSION_KEY") {
        settings.tenancy.session_key = val;
    }

    if let Ok(val) = std::env::var("TALLY_AUTOCOMPLETE_PAGE_SIZE") {
        if let Ok(size) = val.parse::<usize>() {
            settings.forms.autocomplete_page_size = size;
        }
    }
}

// ============================================================
// Helpers
// ============================================================

/// Converts a TOML value to a `serde_json::Value`.
fn toml_to_json(value: toml::Value) -> serde_json::Value {
    match value {
        toml::Value::String(s) => serde_json::Value::String(s),
        toml::Value::Integer(i) => serde_json::json!(i),
        toml::Value::Float(f) => serde_json::json!(f),
        toml::Value::Boolean(b) => serde_json::Value::Bool(b),
        toml::Value::Datetime(dt) => serde_json::Value::String(dt.to_string()),
        toml::Value::Array(arr) => {
            serde_json::Value::Array(arr.into_iter().map(toml_to_json).collect())
        }
        toml::Value::Table(table) => {
            let map: serde_json::Map<String, serde_json::Value> = table
                .into_iter()
                .map(|(k, v)| (k, toml_to_json(v)))
                .collect();
            serde_json::Value::Object(map)
        }
    }
}

/// Deep-merges two JSON values. The `override_val` takes precedence.
fn merge_json(base: serde_json::Value, override_val: serde_json::Value) -> serde_json::Value {
    match (base, override_val) {
        (serde_json::Value::Object(mut base_map), serde_json::Value::Object(override_map)) => {
            for (key, override_v) in override_map {
                let merged = if let Some(base_v) = base_map.remove(&key) {
                    merge_json(base_v, override_v)
                } else {
                    override_v
                };
                base_map.insert(key, merged);
            }
            serde_json::Value::Object(base_map)
        }
        (_, override_val) => override_val,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── TOML loading ────────────────────────────────────────────────

    #[test]
    fn test_from_toml_str_basic() {
        let toml = r#"
            debug = false
            log_level = "debug"
            currency = "EUR"
        "#;

        let settings = from_toml_str(toml).unwrap();
        assert!(!settings.debug);
        assert_eq!(settings.log_level, "debug");
        assert_eq!(settings.currency, "EUR");
        // Defaults preserved
        assert_eq!(settings.language_code, "en-us");
        assert_eq!(settings.tenancy.session_key, "selected_organization");
    }

    #[test]
    fn test_from_toml_str_tenancy_table() {
        let toml = r#"
            [tenancy]
            session_key = "active_orga"
        "#;

        let settings = from_toml_str(toml).unwrap();
        assert_eq!(settings.tenancy.session_key, "active_orga");
    }

    #[test]
    fn test_from_toml_str_forms_table() {
        let toml = r#"
            [forms]
            autocomplete_page_size = 50
        "#;

        let settings = from_toml_str(toml).unwrap();
        assert_eq!(settings.forms.autocomplete_page_size, 50);
    }

    #[test]
    fn test_from_toml_str_empty() {
        // Empty TOML should produce defaults
        let settings = from_toml_str("").unwrap();
        assert!(settings.debug);
        assert_eq!(settings.currency, "USD");
    }

    #[test]
    fn test_from_toml_str_invalid() {
        let result = from_toml_str("[[invalid toml content");
        assert!(result.is_err());
    }

    // ── JSON loading ────────────────────────────────────────────────

    #[test]
    fn test_from_json_str_basic() {
        let json = r#"{
            "debug": false,
            "log_level": "warn",
            "tenancy": {"session_key": "orga_pk"}
        }"#;

        let settings = from_json_str(json).unwrap();
        assert!(!settings.debug);
        assert_eq!(settings.log_level, "warn");
        assert_eq!(settings.tenancy.session_key, "orga_pk");
        // Defaults preserved
        assert_eq!(settings.time_zone, "UTC");
    }

    #[test]
    fn test_from_json_str_empty_object() {
        let settings = from_json_str("{}").unwrap();
        assert!(settings.debug);
        assert_eq!(settings.currency, "USD");
    }

    #[test]
    fn test_from_json_str_invalid() {
        let result = from_json_str("{invalid json");
        assert!(result.is_err());
    }

    // ── File loading ────────────────────────────────────────────────

    #[test]
    fn test_from_toml_file() {
        let dir = std::env::temp_dir().join("tally_rs_test_toml");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("test_settings.toml");

        let toml_content = r#"
            debug = false
            currency = "GBP"
        "#;
        std::fs::write(&path, toml_content).unwrap();

        let settings = from_toml_file(&path).unwrap();
        assert!(!settings.debug);
        assert_eq!(settings.currency, "GBP");

        std::fs::remove_file(&path).ok();
        std::fs::remove_dir(&dir).ok();
    }

    #[test]
    fn test_from_toml_file_missing() {
        let result = from_toml_file("/nonexistent/path/settings.toml");
        assert!(result.is_err());
    }

    #[test]
    fn test_from_json_file_missing() {
        let result = from_json_file("/nonexistent/path/settings.json");
        assert!(result.is_err());
    }

    // ── Environment variable overrides ──────────────────────────────

    #[test]
    fn test_apply_env_overrides_currency() {
        let mut settings = Settings::default();
        std::env::set_var("TALLY_CURRENCY", "CHF");
        apply_env_overrides(&mut settings);
        assert_eq!(settings.currency, "CHF");
        std::env::remove_var("TALLY_CURRENCY");
    }

    #[test]
    fn test_apply_env_overrides_debug() {
        let mut settings = Settings {
            debug: false,
            ..Settings::default()
        };
        std::env::set_var("TALLY_DEBUG", "1");
        apply_env_overrides(&mut settings);
        assert!(settings.debug);
        std::env::remove_var("TALLY_DEBUG");
    }

    #[test]
    fn test_apply_env_overrides_session_key() {
        let mut settings = Settings::default();
        std::env::set_var("TALLY_SESSION_KEY", "tenant_pk");
        apply_env_overrides(&mut settings);
        assert_eq!(settings.tenancy.session_key, "tenant_pk");
        std::env::remove_var("TALLY_SESSION_KEY");
    }

    #[test]
    fn test_apply_env_overrides_invalid_page_size() {
        let mut settings = Settings::default();
        let original = settings.forms.autocomplete_page_size;
        std::env::set_var("TALLY_AUTOCOMPLETE_PAGE_SIZE", "not-a-number");
        apply_env_overrides(&mut settings);
        assert_eq!(settings.forms.autocomplete_page_size, original);
        std::env::remove_var("TALLY_AUTOCOMPLETE_PAGE_SIZE");
    }

    // ── merge_json helper ───────────────────────────────────────────

    #[test]
    fn test_merge_json_basic() {
        let base = serde_json::json!({"a": 1, "b": 2});
        let over = serde_json::json!({"b": 3, "c": 4});
        let merged = merge_json(base, over);
        assert_eq!(merged["a"], 1);
        assert_eq!(merged["b"], 3);
        assert_eq!(merged["c"], 4);
    }

    #[test]
    fn test_merge_json_nested() {
        let base = serde_json::json!({"tenancy": {"session_key": "a", "x": 1}});
        let over = serde_json::json!({"tenancy": {"session_key": "b"}});
        let merged = merge_json(base, over);
        assert_eq!(merged["tenancy"]["session_key"], "b");
        assert_eq!(merged["tenancy"]["x"], 1);
    }

    #[test]
    fn test_toml_to_json() {
        let toml_val: toml::Value = toml::from_str(
            r#"
            name = "test"
            count = 42
            flag = true
            [nested]
            key = "value"
        "#,
        )
        .unwrap();

        let json = toml_to_json(toml_val);
        assert_eq!(json["name"], "test");
        assert_eq!(json["count"], 42);
        assert_eq!(json["flag"], true);
        assert_eq!(json["nested"]["key"], "value");
    }

    // ── Full flow with env ──────────────────────────────────────────

    #[test]
    fn test_toml_with_env_override() {
        let dir = std::env::temp_dir().join("tally_rs_test_toml_env");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("settings_env.toml");

        std::fs::write(&path, "log_level = \"debug\"\n").unwrap();

        std::env::set_var("TALLY_LOG_LEVEL", "warn");

        let settings = from_toml_file_with_env(&path).unwrap();
        assert_eq!(settings.log_level, "warn");

        std::env::remove_var("TALLY_LOG_LEVEL");
        std::fs::remove_file(&path).ok();
        std::fs::remove_dir(&dir).ok();
    }
}
