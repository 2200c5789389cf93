//! Core data types for the embedding shim

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::errors::{AppError, AppResult};
use crate::utils::constants::{
    DEFAULT_BUTTON_LABEL, DEFAULT_CAPTION, DEFAULT_FRAME_HEIGHT, DEFAULT_PAGE_ICON,
    DEFAULT_PAGE_TITLE, DEFAULT_REDIRECT_LABEL, DEFAULT_TARGET_URL,
};

/// The fixed external URL the shim points at.
///
/// Any string is accepted. A target that is not a valid absolute URL still
/// renders; the embed just shows nothing useful and the fallback link points
/// nowhere.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TargetReference(String);

impl TargetReference {
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when the target parses as an absolute http(s) URL
    pub fn is_navigable(&self) -> bool {
        match url::Url::parse(&self.0) {
            Ok(parsed) => matches!(parsed.scheme(), "http" | "https") && parsed.has_host(),
            Err(_) => false,
        }
    }
}

impl Default for TargetReference {
    fn default() -> Self {
        Self::new(DEFAULT_TARGET_URL)
    }
}

impl fmt::Display for TargetReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How the page surfaces the target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Strategy {
    /// Nested frame sourced at the target
    #[default]
    FrameEmbed,
    /// Top-level navigation to the target right after render
    AutoRedirect,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::FrameEmbed => "FRAME_EMBED",
            Strategy::AutoRedirect => "AUTO_REDIRECT",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = AppError;

    fn from_str(s: &str) -> AppResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "frame_embed" | "frame-embed" | "embed" | "iframe" => Ok(Strategy::FrameEmbed),
            "auto_redirect" | "auto-redirect" | "redirect" => Ok(Strategy::AutoRedirect),
            other => Err(AppError::bad_request(format!(
                "Unknown strategy {:?} (expected frame_embed or auto_redirect)",
                other
            ))),
        }
    }
}

/// Size hints for the embed region, in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub height: u32,
    /// `None` fills the container width
    pub width: Option<u32>,
}

impl Dimensions {
    pub fn new(height: u32, width: Option<u32>) -> AppResult<Self> {
        if height == 0 {
            return Err(AppError::bad_request("height must be a positive integer"));
        }
        if width == Some(0) {
            return Err(AppError::bad_request("width must be a positive integer"));
        }
        Ok(Self { height, width })
    }

    /// Same dimensions with any provided overrides applied
    pub fn with_overrides(self, height: Option<u32>, width: Option<u32>) -> AppResult<Self> {
        Self::new(height.unwrap_or(self.height), width.or(self.width))
    }

    /// Value for the frame's `width` attribute
    pub fn width_attr(&self) -> String {
        match self.width {
            Some(w) => w.to_string(),
            None => "100%".to_string(),
        }
    }
}

impl Default for Dimensions {
    fn default() -> Self {
        Self {
            height: DEFAULT_FRAME_HEIGHT,
            width: None,
        }
    }
}

/// Text and decoration around the embed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageChrome {
    pub title: String,
    pub icon: String,
    /// Fallback label for the embed page (opens a new tab)
    pub button_label: String,
    /// Fallback label for the redirect page (navigates the whole window)
    pub redirect_label: String,
    pub caption: Option<String>,
}

impl Default for PageChrome {
    fn default() -> Self {
        Self {
            title: DEFAULT_PAGE_TITLE.to_string(),
            icon: DEFAULT_PAGE_ICON.to_string(),
            button_label: DEFAULT_BUTTON_LABEL.to_string(),
            redirect_label: DEFAULT_REDIRECT_LABEL.to_string(),
            caption: Some(DEFAULT_CAPTION.to_string()),
        }
    }
}

/// Output of one render pass: the document plus what it points at
#[derive(Debug, Clone, Serialize)]
pub struct RenderedPage {
    #[serde(skip)]
    pub html: String,
    pub target: TargetReference,
    pub strategy: Strategy,
    /// Destination of the always-present fallback link
    pub fallback_href: String,
    /// Frame source, `FrameEmbed` only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embed_src: Option<String>,
    /// Meta refresh destination, `AutoRedirect` only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_target: Option<String>,
    /// Script navigation destination, `AutoRedirect` only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub script_target: Option<String>,
    /// Embed region height; 0 when nothing is embedded
    pub embed_height: u32,
}

impl RenderedPage {
    /// Every navigation the page can perform, fallback first
    pub fn destinations(&self) -> Vec<&str> {
        let mut out = vec![self.fallback_href.as_str()];
        out.extend(self.embed_src.as_deref());
        out.extend(self.refresh_target.as_deref());
        out.extend(self.script_target.as_deref());
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_target_is_navigable() {
        assert!(TargetReference::default().is_navigable());
    }

    #[test]
    fn test_non_navigable_targets() {
        assert!(!TargetReference::new("").is_navigable());
        assert!(!TargetReference::new("electrospot.lovable.app").is_navigable());
        assert!(!TargetReference::new("javascript:alert(1)").is_navigable());
        assert!(!TargetReference::new("ftp://example.com").is_navigable());
    }

    #[test]
    fn test_strategy_parsing() {
        assert_eq!("FRAME_EMBED".parse::<Strategy>().unwrap(), Strategy::FrameEmbed);
        assert_eq!("iframe".parse::<Strategy>().unwrap(), Strategy::FrameEmbed);
        assert_eq!(" redirect ".parse::<Strategy>().unwrap(), Strategy::AutoRedirect);
        assert_eq!("Auto-Redirect".parse::<Strategy>().unwrap(), Strategy::AutoRedirect);
        assert!("popup".parse::<Strategy>().is_err());
    }

    #[test]
    fn test_strategy_serde_names() {
        let json = serde_json::to_string(&Strategy::AutoRedirect).unwrap();
        assert_eq!(json, "\"AUTO_REDIRECT\"");
    }

    #[test]
    fn test_dimensions_reject_zero() {
        assert!(Dimensions::new(0, None).is_err());
        assert!(Dimensions::new(700, Some(0)).is_err());
        assert_eq!(Dimensions::new(700, Some(1024)).unwrap().width_attr(), "1024");
        assert_eq!(Dimensions::default().width_attr(), "100%");
    }

    #[test]
    fn test_dimension_overrides() {
        let base = Dimensions::default();
        let dims = base.with_overrides(Some(700), None).unwrap();
        assert_eq!(dims.height, 700);
        assert_eq!(dims.width, None);
        assert!(base.with_overrides(None, Some(0)).is_err());
    }
}
