#![forbid(unsafe_code)]

//! WASM frontend for pagekit.
//!
//! This crate is host-specific (web/WASM). It implements the
//! `pagekit-core` ports over the real document:
//! - [`pagekit_core::Host`] over `web-sys` elements and listeners,
//! - [`pagekit_core::KeyValueStore`] over `sessionStorage`,
//! - the load signal from the Performance navigation entry,
//!
//! and exports `boot`, `showNotification` and `signIn` to JS.

use pagekit_core::{ConfigError, SiteConfig};

#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(target_arch = "wasm32")]
pub use wasm::{SessionStore, WebHost, boot, show_notification, sign_in};

/// Parse the optional JSON override handed to `boot`.
///
/// A missing or blank document means the stock configuration.
pub fn parse_config(raw: Option<&str>) -> Result<SiteConfig, ConfigError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(SiteConfig::default()),
        Some(json) => SiteConfig::from_json(json),
    }
}

/// Native builds compile this crate as a stub so `cargo check --workspace` stays
/// green on non-wasm targets.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Default)]
pub struct PagekitWeb;

#[cfg(not(target_arch = "wasm32"))]
impl PagekitWeb {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self
    }

    /// Validate a config the way the browser `boot` would, without a document.
    pub fn check_config(&self, raw: Option<&str>) -> Result<SiteConfig, ConfigError> {
        parse_config(raw)
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;
    use pagekit_core::Features;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn blank_config_is_stock() {
        assert_eq!(parse_config(None).unwrap(), SiteConfig::default());
        assert_eq!(parse_config(Some("  \n")).unwrap(), SiteConfig::default());
    }

    #[test]
    fn override_keeps_other_defaults() {
        let config = parse_config(Some(r#"{ "chrome": { "threshold": 64.0 } }"#)).unwrap();
        assert_eq!(config.chrome.threshold, 64.0);
        assert_eq!(config.chrome.scrolled_class, "scrolled");
        assert_eq!(config.session, SiteConfig::default().session);
    }

    #[test]
    fn features_parse_from_flag_names() {
        let config = parse_config(Some(r#"{ "features": "OVERLAY | FORMS" }"#)).unwrap();
        assert!(config.enabled(Features::FORMS));
        assert!(!config.enabled(Features::SESSION));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = PagekitWeb::new().check_config(Some("{ nope")).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    proptest! {
        #[test]
        fn reveal_threshold_range_is_enforced(t in -2.0f64..3.0) {
            let json = format!(r#"{{ "reveal": {{ "threshold": {t} }} }}"#);
            let parsed = parse_config(Some(&json));
            prop_assert_eq!(parsed.is_ok(), (0.0..=1.0).contains(&t));
        }
    }
}
