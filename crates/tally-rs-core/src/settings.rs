//! Settings system for the tally-rs workspace.
//!
//! This module provides the [`Settings`] struct, which holds application
//! configuration, and [`LazySettings`], a globally-accessible,
//! lazily-initialized settings instance with sensible defaults.

use std::collections::HashMap;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

/// Multi-tenancy configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenancySettings {
    /// The session key holding the selected organization's primary key.
    pub session_key: String,
}

impl Default for TenancySettings {
    fn default() -> Self {
        Self {
            session_key: "selected_organization".to_string(),
        }
    }
}

/// Form-layer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormSettings {
    /// Number of results returned per page by autocomplete fields.
    pub autocomplete_page_size: usize,
}

impl Default for FormSettings {
    fn default() -> Self {
        Self {
            autocomplete_page_size: 20,
        }
    }
}

/// The complete set of application settings.
///
/// Use [`SETTINGS`] to access the global instance.
///
/// # Examples
///
/// ```
/// use tally_rs_core::settings::Settings;
///
/// let settings = Settings::default();
/// assert!(settings.debug);
/// assert_eq!(settings.currency, "USD");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    // ── Core ─────────────────────────────────────────────────────────

    /// Whether debug mode is enabled.
    pub debug: bool,
    /// The log level (e.g. "info", "debug", "warn").
    pub log_level: String,

    // ── Internationalization ─────────────────────────────────────────

    /// The language code (e.g. "en-us").
    pub language_code: String,
    /// The default time zone (e.g. "UTC").
    pub time_zone: String,
    /// The ISO 4217 currency code used for new documents.
    pub currency: String,

    // ── Tenancy ──────────────────────────────────────────────────────

    /// Multi-tenancy configuration.
    pub tenancy: TenancySettings,

    // ── Forms ────────────────────────────────────────────────────────

    /// Form-layer configuration.
    pub forms: FormSettings,

    // ── Escape hatch ─────────────────────────────────────────────────

    /// Custom settings that don't fit into the above categories.
    pub extra: HashMap<String, serde_json::Value>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            debug: true,
            log_level: "info".to_string(),
            language_code: "en-us".to_string(),
            time_zone: "UTC".to_string(),
            currency: "USD".to_string(),
            tenancy: TenancySettings::default(),
            forms: FormSettings::default(),
            extra: HashMap::new(),
        }
    }
}

/// A lazily-initialized, globally-accessible settings container.
///
/// Call [`configure`](LazySettings::configure) once at startup to set the
/// settings, then use [`get`](LazySettings::get) to access them.
///
/// # Panics
///
/// [`get`](LazySettings::get) panics if settings have not been configured.
/// [`configure`](LazySettings::configure) panics if called more than once.
pub struct LazySettings {
    inner: OnceLock<Settings>,
}

impl Default for LazySettings {
    fn default() -> Self {
        Self::new()
    }
}

impl LazySettings {
    /// Creates a new, unconfigured `LazySettings`.
    pub const fn new() -> Self {
        Self {
            inner: OnceLock::new(),
        }
    }

    /// Configures the global settings. Must be called exactly once.
    ///
    /// # Panics
    ///
    /// Panics if settings have already been configured.
    pub fn configure(&self, settings: Settings) {
        self.inner
            .set(settings)
            .expect("Settings have already been configured");
    }

    /// Returns a reference to the configured settings.
    ///
    /// # Panics
    ///
    /// Panics if settings have not been configured.
    pub fn get(&self) -> &Settings {
        self.inner
            .get()
            .expect("Settings have not been configured. Call SETTINGS.configure() first.")
    }

    /// Returns `true` if settings have been configured.
    pub fn is_configured(&self) -> bool {
        self.inner.get().is_some()
    }
}

/// The global settings instance.
///
/// Call `SETTINGS.configure(settings)` once at application startup, then
/// access settings via `SETTINGS.get()` anywhere in the application.
pub static SETTINGS: LazySettings = LazySettings::new();

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let s = Settings::default();
        assert!(s.debug);
        assert_eq!(s.log_level, "info");
        assert_eq!(s.language_code, "en-us");
        assert_eq!(s.time_zone, "UTC");
        assert_eq!(s.currency, "USD");
        assert!(s.extra.is_empty());
    }

    #[test]
    fn test_default_tenancy() {
        let s = Settings::default();
        assert_eq!(s.tenancy.session_key, "selected_organization");
    }

    #[test]
    fn test_default_forms() {
        let s = Settings::default();
        assert_eq!(s.forms.autocomplete_page_size, 20);
    }

    #[test]
    fn test_lazy_settings_configure_and_get() {
        let lazy = LazySettings::new();
        assert!(!lazy.is_configured());

        let settings = Settings {
            debug: false,
            currency: "EUR".to_string(),
            ..Settings::default()
        };

        lazy.configure(settings);
        assert!(lazy.is_configured());
        assert!(!lazy.get().debug);
        assert_eq!(lazy.get().currency, "EUR");
    }

    #[test]
    #[should_panic(expected = "already been configured")]
    fn test_lazy_settings_double_configure_panics() {
        let lazy = LazySettings::new();
        lazy.configure(Settings::default());
        lazy.configure(Settings::default());
    }

    #[test]
    #[should_panic(expected = "not been configured")]
    fn test_lazy_settings_get_before_configure_panics() {
        let lazy = LazySettings::new();
        let _ = lazy.get();
    }
}
