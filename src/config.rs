//! Runtime Configuration
//!
//! Read once at startup from an optional
//! `<script id="board-config" type="application/json">` block in the page.
//! Every field has a default, so a missing or partial block is fine.

use log::warn;
use serde::Deserialize;

use crate::drag_session::Throttle;

const CONFIG_ELEMENT_ID: &str = "board-config";

fn default_api_base() -> String {
    "/api".to_string()
}

fn default_activation_distance() -> f64 {
    8.0
}

fn default_column_throttle() -> f64 {
    140.0
}

fn default_row_throttle() -> f64 {
    90.0
}

fn default_notice_ttl() -> u32 {
    4000
}

fn default_list_color() -> String {
    "#fffbe6".to_string()
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BoardConfig {
    /// API root, absolute or relative to the page origin
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// Pointer travel before a press turns into a drag
    #[serde(default = "default_activation_distance")]
    pub activation_distance_px: f64,
    #[serde(default = "default_column_throttle")]
    pub column_throttle_ms: f64,
    #[serde(default = "default_row_throttle")]
    pub row_throttle_ms: f64,
    /// How long a notice stays on screen
    #[serde(default = "default_notice_ttl")]
    pub notice_ttl_ms: u32,
    #[serde(default = "default_list_color")]
    pub default_list_color: String,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            activation_distance_px: default_activation_distance(),
            column_throttle_ms: default_column_throttle(),
            row_throttle_ms: default_row_throttle(),
            notice_ttl_ms: default_notice_ttl(),
            default_list_color: default_list_color(),
        }
    }
}

impl BoardConfig {
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// Reads the page's config block, falling back to defaults.
    pub fn from_page() -> Self {
        let raw = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(CONFIG_ELEMENT_ID))
            .and_then(|el| el.text_content());
        match raw.as_deref().map(str::trim) {
            None | Some("") => Self::default(),
            Some(raw) => Self::from_json(raw).unwrap_or_else(|e| {
                warn!("ignoring malformed #{}: {}", CONFIG_ELEMENT_ID, e);
                Self::default()
            }),
        }
    }

    pub fn throttle(&self) -> Throttle {
        Throttle {
            column_ms: self.column_throttle_ms,
            row_ms: self.row_throttle_ms,
        }
    }

    /// Absolute API root; relative bases are joined onto `origin`.
    pub fn api_url(&self, origin: &str) -> String {
        if self.api_base.starts_with("http://") || self.api_base.starts_with("https://") {
            return self.api_base.clone();
        }
        let origin = origin.trim_end_matches('/');
        if self.api_base.starts_with('/') {
            format!("{}{}", origin, self.api_base)
        } else {
            format!("{}/{}", origin, self.api_base)
        }
    }
}

/// `window.location.origin`, or empty outside a browser
pub fn page_origin() -> String {
    web_sys::window()
        .and_then(|w| w.location().origin().ok())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config = BoardConfig::from_json(r#"{"api_base":"http://localhost:5000/api","row_throttle_ms":50}"#).unwrap();
        assert_eq!(config.api_base, "http://localhost:5000/api");
        assert_eq!(config.throttle(), Throttle { column_ms: 140.0, row_ms: 50.0 });
        assert_eq!(config.activation_distance_px, 8.0);
        assert_eq!(config.default_list_color, "#fffbe6");

        assert_eq!(BoardConfig::from_json("{}").unwrap(), BoardConfig::default());
        assert!(BoardConfig::from_json("{").is_err());
    }

    #[test]
    fn test_default_throttle_matches_tracker() {
        assert_eq!(BoardConfig::default().throttle(), Throttle::default());
    }

    #[test]
    fn test_api_url() {
        let mut config = BoardConfig::default();
        assert_eq!(config.api_url("http://localhost:5173/"), "http://localhost:5173/api");

        config.api_base = "v2".into();
        assert_eq!(config.api_url("https://board.example"), "https://board.example/v2");

        config.api_base = "https://api.example/api".into();
        assert_eq!(config.api_url("http://localhost"), "https://api.example/api");
    }
}
