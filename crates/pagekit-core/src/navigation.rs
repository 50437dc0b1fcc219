//! Page-load classification.
//!
//! The browser reports how the current document was reached through the
//! Performance navigation entry (`"navigate"`, `"reload"`, `"back_forward"`,
//! `"prerender"`). Only [`LoadKind::Reload`] matters to the session logic;
//! the rest are kept so traces show what actually happened.

use serde::{Deserialize, Serialize};

/// How the current document load was initiated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadKind {
    /// Fresh navigation (link, typed URL, form post).
    #[default]
    Navigate,
    /// Reload of the same document.
    Reload,
    /// History traversal.
    BackForward,
    /// Speculative prerender.
    Prerender,
}

impl LoadKind {
    /// Parse the navigation entry `type` string.
    ///
    /// Unknown or missing values are treated as a fresh navigation so the
    /// session record is never cleared on a guess.
    #[must_use]
    pub fn from_entry_type(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("reload") => Self::Reload,
            Some("back_forward") => Self::BackForward,
            Some("prerender") => Self::Prerender,
            _ => Self::Navigate,
        }
    }

    #[must_use]
    pub const fn is_reload(self) -> bool {
        matches!(self, Self::Reload)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Navigate => "navigate",
            Self::Reload => "reload",
            Self::BackForward => "back_forward",
            Self::Prerender => "prerender",
        }
    }
}

/// Facts about the current page load, captured once at boot.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PageLoad {
    pub kind: LoadKind,
    /// `location.pathname` of the current document.
    pub path: String,
}

impl PageLoad {
    #[must_use]
    pub fn new(kind: LoadKind, path: impl Into<String>) -> Self {
        Self {
            kind,
            path: path.into(),
        }
    }

    /// Whether the path names one of `routes` (substring match).
    #[must_use]
    pub fn matches_any<S: AsRef<str>>(&self, routes: &[S]) -> bool {
        routes
            .iter()
            .map(AsRef::as_ref)
            .filter(|route| !route.is_empty())
            .any(|route| self.path.contains(route))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_entry_types() {
        assert_eq!(LoadKind::from_entry_type(Some("reload")), LoadKind::Reload);
        assert_eq!(
            LoadKind::from_entry_type(Some("navigate")),
            LoadKind::Navigate
        );
        assert_eq!(
            LoadKind::from_entry_type(Some("back_forward")),
            LoadKind::BackForward
        );
        assert_eq!(
            LoadKind::from_entry_type(Some("prerender")),
            LoadKind::Prerender
        );
    }

    #[test]
    fn unknown_or_missing_is_navigate() {
        assert_eq!(LoadKind::from_entry_type(None), LoadKind::Navigate);
        assert_eq!(LoadKind::from_entry_type(Some("")), LoadKind::Navigate);
        assert_eq!(LoadKind::from_entry_type(Some("RELOAD")), LoadKind::Navigate);
    }

    #[test]
    fn only_reload_is_reload() {
        for kind in [LoadKind::Navigate, LoadKind::BackForward, LoadKind::Prerender] {
            assert!(!kind.is_reload(), "{}", kind.as_str());
        }
        assert!(LoadKind::Reload.is_reload());
    }

    #[test]
    fn route_matching_is_substring() {
        let routes = ["login.html", "signup.html"];
        assert!(PageLoad::new(LoadKind::Navigate, "/login.html").matches_any(&routes));
        assert!(PageLoad::new(LoadKind::Navigate, "/site/signup.html").matches_any(&routes));
        assert!(!PageLoad::new(LoadKind::Navigate, "/index.html").matches_any(&routes));
        assert!(!PageLoad::new(LoadKind::Navigate, "/").matches_any(&[""]));
    }
}
