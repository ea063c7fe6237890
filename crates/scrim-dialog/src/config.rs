#![forbid(unsafe_code)]

//! Engine-wide dialog policy.

use crate::diagnostics::DEFAULT_DIAGNOSTIC_CAPACITY;

/// Default marker attribute carried by every portal node.
pub const DEFAULT_PORTAL_ATTRIBUTE: &str = "data-scrim-dialog-portal";

/// Dialog configuration shared by every session of one [`Dialog`](crate::Dialog).
///
/// Per-dialog host inputs (open signal, callbacks, focus targets) live in
/// [`DialogProps`](crate::DialogProps); this struct is policy.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DialogConfig {
    /// Attribute that identifies portal nodes in the document.
    pub portal_attribute: String,
    /// Invoke the dismissal callback on `Escape`.
    pub close_on_escape: bool,
    /// Invoke the dismissal callback on overlay clicks.
    pub close_on_backdrop: bool,
    /// Redirect focus that lands outside the content root while open.
    pub contain_focus: bool,
    /// Write `data-keep-*` markers on pre-tagged siblings in legacy mode.
    pub diagnostic_markers: bool,
    /// Entries retained by the dialog's diagnostic log; older ones are evicted.
    pub diagnostic_capacity: usize,
}

impl Default for DialogConfig {
    fn default() -> Self {
        Self {
            portal_attribute: DEFAULT_PORTAL_ATTRIBUTE.to_owned(),
            close_on_escape: true,
            close_on_backdrop: true,
            contain_focus: true,
            diagnostic_markers: true,
            diagnostic_capacity: DEFAULT_DIAGNOSTIC_CAPACITY,
        }
    }
}

impl DialogConfig {
    pub fn portal_attribute(mut self, name: impl Into<String>) -> Self {
        self.portal_attribute = name.into();
        self
    }

    pub fn close_on_escape(mut self, close: bool) -> Self {
        self.close_on_escape = close;
        self
    }

    pub fn close_on_backdrop(mut self, close: bool) -> Self {
        self.close_on_backdrop = close;
        self
    }

    pub fn contain_focus(mut self, contain: bool) -> Self {
        self.contain_focus = contain;
        self
    }

    pub fn diagnostic_markers(mut self, markers: bool) -> Self {
        self.diagnostic_markers = markers;
        self
    }

    pub fn diagnostic_capacity(mut self, capacity: usize) -> Self {
        self.diagnostic_capacity = capacity;
        self
    }

    /// Parse a policy file. Missing keys keep their defaults.
    ///
    /// ```toml
    /// close_on_backdrop = false
    /// portal_attribute = "data-app-portal"
    /// ```
    #[cfg(feature = "policy-config")]
    pub fn from_toml_str(source: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_dismiss_on_both_triggers() {
        let config = DialogConfig::default();
        assert!(config.close_on_escape);
        assert!(config.close_on_backdrop);
        assert!(config.contain_focus);
        assert_eq!(config.diagnostic_capacity, DEFAULT_DIAGNOSTIC_CAPACITY);
        assert_eq!(config.portal_attribute, DEFAULT_PORTAL_ATTRIBUTE);
    }

    #[test]
    fn builder_chain() {
        let config = DialogConfig::default()
            .close_on_escape(false)
            .portal_attribute("data-app-portal")
            .diagnostic_markers(false);
        assert!(!config.close_on_escape);
        assert!(config.close_on_backdrop);
        assert!(!config.diagnostic_markers);
        assert_eq!(config.portal_attribute, "data-app-portal");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn json_fills_missing_fields_with_defaults() {
        let config: DialogConfig =
            serde_json::from_str(r#"{"contain_focus": false}"#).expect("valid json");
        assert!(!config.contain_focus);
        assert!(config.close_on_escape);
        assert_eq!(config.portal_attribute, DEFAULT_PORTAL_ATTRIBUTE);
    }
}
