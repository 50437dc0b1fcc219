//! Site configuration.
//!
//! Every section has `#[serde(default)]`, so an embedder only spells out what
//! differs from the stock site. [`SiteConfig::default`] reproduces the stock
//! markup contract (ids, classes, labels, thresholds) exactly.

use std::fmt;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Components [`crate::Page::boot`] wires up.
    ///
    /// The overlay is always installed; the bit only exists so a config can
    /// name it.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct Features: u8 {
        const OVERLAY = 0b0000_0001;
        const SESSION = 0b0000_0010;
        const REVEAL  = 0b0000_0100;
        const CHROME  = 0b0000_1000;
        const FORMS   = 0b0001_0000;
        const ANCHORS = 0b0010_0000;
    }
}

impl Default for Features {
    fn default() -> Self {
        Self::all()
    }
}

/// Configuration errors.
#[derive(Debug)]
pub enum ConfigError {
    /// The JSON document did not parse or did not match the schema.
    Parse(serde_json::Error),
    /// A field holds a value outside its allowed range.
    Invalid { field: &'static str, reason: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(e) => write!(f, "config parse error: {e}"),
            Self::Invalid { field, reason } => write!(f, "invalid config `{field}`: {reason}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Parse(e) => Some(e),
            Self::Invalid { .. } => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse(e)
    }
}

/// Overlay markup contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    pub overlay_id: String,
    pub overlay_class: String,
    pub content_class: String,
    pub title_id: String,
    pub message_id: String,
    pub close_id: String,
    pub close_class: String,
    pub close_label: String,
    /// Placeholder title until the first `show`.
    pub initial_title: String,
    pub initial_message: String,
    /// Presentation class while visible.
    pub active_class: String,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            overlay_id: "globalModal".into(),
            overlay_class: "modal-overlay".into(),
            content_class: "modal-content".into(),
            title_id: "globalModalTitle".into(),
            message_id: "globalModalMessage".into(),
            close_id: "globalModalClose".into(),
            close_class: "btn-modal".into(),
            close_label: "Understood".into(),
            initial_title: "Notification".into(),
            initial_message: "Message goes here.".into(),
            active_class: "active".into(),
        }
    }
}

/// Ephemeral session indicator contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Storage key of the signed-in identifier.
    pub storage_key: String,
    /// Path fragments of authentication pages; matched by substring.
    pub auth_routes: Vec<String>,
    pub nav_container_class: String,
    /// `href` of the sign-in link inside the container.
    pub sign_in_href: String,
    pub status_class: String,
    pub info_class: String,
    pub dot_class: String,
    pub username_class: String,
    pub sign_out_id: String,
    pub sign_out_class: String,
    pub sign_out_label: String,
    pub confirm_title: String,
    pub confirm_message: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            storage_key: "user".into(),
            auth_routes: vec!["login.html".into(), "signup.html".into()],
            nav_container_class: "nav-right".into(),
            sign_in_href: "login.html".into(),
            status_class: "user-status".into(),
            info_class: "user-info".into(),
            dot_class: "dot".into(),
            username_class: "username".into(),
            sign_out_id: "signOut".into(),
            sign_out_class: "btn-signout".into(),
            sign_out_label: "Sign Out".into(),
            confirm_title: "Sign Out".into(),
            confirm_message: "Are you sure you want to end your session?".into(),
        }
    }
}

/// Scroll reveal contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RevealConfig {
    pub target_class: String,
    pub revealed_class: String,
    /// Fraction of the element that must be visible (0.0..=1.0).
    pub threshold: f64,
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            target_class: "feature-row".into(),
            revealed_class: "visible".into(),
            threshold: 0.2,
        }
    }
}

/// Header chrome contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChromeConfig {
    pub header_class: String,
    pub scrolled_class: String,
    /// Offsets strictly greater than this count as scrolled.
    pub threshold: f64,
}

impl Default for ChromeConfig {
    fn default() -> Self {
        Self {
            header_class: "header".into(),
            scrolled_class: "scrolled".into(),
            threshold: 20.0,
        }
    }
}

/// One acknowledged form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormSpec {
    pub form_id: String,
    pub title: String,
    pub message: String,
}

impl FormSpec {
    #[must_use]
    pub fn new(
        form_id: impl Into<String>,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            form_id: form_id.into(),
            title: title.into(),
            message: message.into(),
        }
    }
}

fn default_forms() -> Vec<FormSpec> {
    vec![
        FormSpec::new(
            "contactForm",
            "Message Sent",
            "Thank you! We have received your message and will get back to you shortly.",
        ),
        FormSpec::new(
            "inquiryForm",
            "Inquiry Received",
            "Thank you! Our engineering team will review your inquiry and contact you soon.",
        ),
    ]
}

/// Complete configuration for one page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub features: Features,
    pub overlay: OverlayConfig,
    pub session: SessionConfig,
    pub reveal: RevealConfig,
    pub chrome: ChromeConfig,
    pub forms: Vec<FormSpec>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            features: Features::default(),
            overlay: OverlayConfig::default(),
            session: SessionConfig::default(),
            reveal: RevealConfig::default(),
            chrome: ChromeConfig::default(),
            forms: default_forms(),
        }
    }
}

impl SiteConfig {
    /// Parse a JSON override and validate it.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check value ranges that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.session.storage_key.is_empty() {
            return Err(ConfigError::Invalid {
                field: "session.storage_key",
                reason: "must not be empty".into(),
            });
        }
        if self.overlay.overlay_id.is_empty() {
            return Err(ConfigError::Invalid {
                field: "overlay.overlay_id",
                reason: "must not be empty".into(),
            });
        }
        let t = self.reveal.threshold;
        if !(0.0..=1.0).contains(&t) {
            return Err(ConfigError::Invalid {
                field: "reveal.threshold",
                reason: format!("{t} is outside 0.0..=1.0"),
            });
        }
        let t = self.chrome.threshold;
        if !t.is_finite() || t < 0.0 {
            return Err(ConfigError::Invalid {
                field: "chrome.threshold",
                reason: format!("{t} is not a finite, non-negative offset"),
            });
        }
        if let Some(form) = self.forms.iter().find(|f| f.form_id.is_empty()) {
            return Err(ConfigError::Invalid {
                field: "forms.form_id",
                reason: format!("empty id for form titled {:?}", form.title),
            });
        }
        Ok(())
    }

    /// Whether `feature` is enabled. The overlay always is.
    #[must_use]
    pub fn enabled(&self, feature: Features) -> bool {
        feature == Features::OVERLAY || self.features.contains(feature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_match_stock_site() {
        let c = SiteConfig::default();
        assert_eq!(c.session.storage_key, "user");
        assert_eq!(c.session.auth_routes, ["login.html", "signup.html"]);
        assert_eq!(c.reveal.threshold, 0.2);
        assert_eq!(c.chrome.threshold, 20.0);
        assert_eq!(c.overlay.close_label, "Understood");
        assert_eq!(c.forms.len(), 2);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn empty_json_is_default() {
        assert_eq!(SiteConfig::from_json("{}").unwrap(), SiteConfig::default());
    }

    #[test]
    fn json_roundtrips_defaults() {
        let json = SiteConfig::default().to_json().unwrap();
        assert_eq!(SiteConfig::from_json(&json).unwrap(), SiteConfig::default());
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let c = SiteConfig::from_json(r#"{ "chrome": { "threshold": 64 } }"#).unwrap();
        assert_eq!(c.chrome.threshold, 64.0);
        assert_eq!(c.chrome.header_class, "header");
        assert_eq!(c.reveal, RevealConfig::default());
    }

    #[test]
    fn features_parse_from_flag_names() {
        let c = SiteConfig::from_json(r#"{ "features": "SESSION | FORMS" }"#).unwrap();
        assert!(c.enabled(Features::SESSION));
        assert!(c.enabled(Features::FORMS));
        assert!(!c.enabled(Features::REVEAL));
        assert!(c.enabled(Features::OVERLAY));
    }

    #[test]
    fn rejects_out_of_range_reveal_threshold() {
        let err = SiteConfig::from_json(r#"{ "reveal": { "threshold": 1.5 } }"#).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "reveal.threshold",
                ..
            }
        ));
    }

    #[test]
    fn rejects_negative_chrome_threshold() {
        let err = SiteConfig::from_json(r#"{ "chrome": { "threshold": -1 } }"#).unwrap_err();
        assert!(err.to_string().contains("chrome.threshold"));
    }

    #[test]
    fn rejects_empty_storage_key() {
        let err = SiteConfig::from_json(r#"{ "session": { "storage_key": "" } }"#).unwrap_err();
        assert!(err.to_string().contains("session.storage_key"));
    }

    #[test]
    fn parse_error_has_source() {
        use std::error::Error as _;
        let err = SiteConfig::from_json("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(err.source().is_some());
    }
}
