//! Browser/viewport execution profiles
//!
//! The run matrix crosses browser engines with viewport presets. Each
//! profile is opaque to the core logic, which runs unmodified under
//! any of them.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::{RunnerError, RunnerResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BrowserKind {
    Chrome,
    Firefox,
    Safari,
    Edge,
}

impl BrowserKind {
    /// Playwright engine module backing this browser.
    pub fn engine(&self) -> &'static str {
        match self {
            BrowserKind::Chrome | BrowserKind::Edge => "chromium",
            BrowserKind::Firefox => "firefox",
            BrowserKind::Safari => "webkit",
        }
    }

    /// Browser distribution channel, where one applies.
    pub fn channel(&self) -> Option<&'static str> {
        match self {
            BrowserKind::Edge => Some("msedge"),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BrowserKind::Chrome => "chrome",
            BrowserKind::Firefox => "firefox",
            BrowserKind::Safari => "safari",
            BrowserKind::Edge => "edge",
        }
    }

    /// Firefox has no mobile emulation; its mobile profile is left out
    /// of the matrix.
    pub fn supports_mobile(&self) -> bool {
        !matches!(self, BrowserKind::Firefox)
    }

    pub const ALL: [BrowserKind; 4] = [
        BrowserKind::Chrome,
        BrowserKind::Firefox,
        BrowserKind::Safari,
        BrowserKind::Edge,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewportPreset {
    Desktop,
    Tablet,
    Mobile,
}

impl ViewportPreset {
    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            ViewportPreset::Desktop => (1920, 1080),
            ViewportPreset::Tablet => (768, 1024),
            ViewportPreset::Mobile => (375, 667),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ViewportPreset::Desktop => "desktop",
            ViewportPreset::Tablet => "tablet",
            ViewportPreset::Mobile => "mobile",
        }
    }

    pub const ALL: [ViewportPreset; 3] = [
        ViewportPreset::Desktop,
        ViewportPreset::Tablet,
        ViewportPreset::Mobile,
    ];
}

/// One named execution profile, e.g. `chrome-desktop`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub browser: BrowserKind,
    pub viewport: ViewportPreset,
}

impl Profile {
    pub fn name(&self) -> String {
        format!("{}-{}", self.browser.as_str(), self.viewport.as_str())
    }

    /// Mobile profiles emulate a touch device, except on Firefox.
    pub fn is_mobile(&self) -> bool {
        self.viewport == ViewportPreset::Mobile && self.browser.supports_mobile()
    }

    /// The full supported cross-product of browsers and viewports.
    pub fn matrix() -> Vec<Profile> {
        let mut profiles = Vec::new();
        for browser in BrowserKind::ALL {
            for viewport in ViewportPreset::ALL {
                if viewport == ViewportPreset::Mobile && !browser.supports_mobile() {
                    continue;
                }
                profiles.push(Profile { browser, viewport });
            }
        }
        profiles
    }

    pub fn from_name(name: &str) -> RunnerResult<Profile> {
        Self::matrix()
            .into_iter()
            .find(|p| p.name() == name)
            .ok_or_else(|| RunnerError::UnknownProfile {
                requested: name.to_string(),
                available: Self::matrix().iter().map(Profile::name).collect(),
            })
    }
}

impl std::fmt::Display for Profile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matrix_excludes_firefox_mobile() {
        let profiles = Profile::matrix();
        assert_eq!(profiles.len(), 11);
        assert!(!profiles
            .iter()
            .any(|p| p.browser == BrowserKind::Firefox && p.viewport == ViewportPreset::Mobile));
    }

    #[test]
    fn profile_names_are_stable() {
        let names: Vec<String> = Profile::matrix().iter().map(Profile::name).collect();
        assert!(names.contains(&"chrome-desktop".to_string()));
        assert!(names.contains(&"safari-tablet".to_string()));
        assert!(names.contains(&"edge-mobile".to_string()));
        assert!(!names.contains(&"firefox-mobile".to_string()));
    }

    #[test]
    fn from_name_round_trips() {
        for profile in Profile::matrix() {
            assert_eq!(Profile::from_name(&profile.name()).unwrap(), profile);
        }
    }

    #[test]
    fn unknown_profile_lists_options() {
        let err = Profile::from_name("netscape-desktop").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("netscape-desktop"));
        assert!(msg.contains("chrome-desktop"));
    }

    #[test]
    fn edge_runs_chromium_with_msedge_channel() {
        assert_eq!(BrowserKind::Edge.engine(), "chromium");
        assert_eq!(BrowserKind::Edge.channel(), Some("msedge"));
        assert_eq!(BrowserKind::Chrome.channel(), None);
    }

    #[test]
    fn viewport_dimensions() {
        assert_eq!(ViewportPreset::Desktop.dimensions(), (1920, 1080));
        assert_eq!(ViewportPreset::Tablet.dimensions(), (768, 1024));
        assert_eq!(ViewportPreset::Mobile.dimensions(), (375, 667));
    }
}
