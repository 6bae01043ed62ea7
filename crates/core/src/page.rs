//! Page registry types

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Coarse page category, used both for test filtering and for
/// baseline-image directory placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageGroup {
    Static,
    Woo,
    Product,
}

impl PageGroup {
    /// On-disk baseline subdirectory for this group.
    pub fn baseline_dir(&self) -> &'static str {
        match self {
            PageGroup::Static => "static",
            PageGroup::Woo => "woo",
            PageGroup::Product => "products",
        }
    }

    pub const ALL: [PageGroup; 3] = [PageGroup::Static, PageGroup::Woo, PageGroup::Product];
}

impl std::fmt::Display for PageGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PageGroup::Static => write!(f, "static"),
            PageGroup::Woo => write!(f, "woo"),
            PageGroup::Product => write!(f, "product"),
        }
    }
}

impl std::str::FromStr for PageGroup {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "static" => Ok(PageGroup::Static),
            "woo" => Ok(PageGroup::Woo),
            "product" => Ok(PageGroup::Product),
            other => Err(Error::InvalidSite(format!(
                "unknown page group '{}' (expected static, woo, or product)",
                other
            ))),
        }
    }
}

/// A single page to be captured.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageConfig {
    /// Human-readable page name, e.g. "Shop"
    pub name: String,

    /// URL path with a leading slash, e.g. "/shop/"
    pub path: String,

    pub group: PageGroup,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl PageConfig {
    /// Paths must be site-relative. A full URL here would silently
    /// escape the configured environment's base URL.
    pub fn validate(&self) -> Result<()> {
        if !self.path.starts_with('/') {
            return Err(Error::InvalidPagePath {
                path: self.path.clone(),
                reason: "must start with '/'".to_string(),
            });
        }
        if self.path.contains("://") {
            return Err(Error::InvalidPagePath {
                path: self.path.clone(),
                reason: "must be a path, not a full URL".to_string(),
            });
        }
        Ok(())
    }
}

/// Per-group page counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSummary {
    #[serde(rename = "static")]
    pub static_pages: usize,
    pub woo: usize,
    pub product: usize,
    pub total: usize,
}

/// Ordered, immutable collection of a site's pages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageSet {
    pages: Vec<PageConfig>,
}

impl PageSet {
    pub fn new(pages: Vec<PageConfig>) -> Result<Self> {
        for page in &pages {
            page.validate()?;
        }
        Ok(Self { pages })
    }

    pub fn iter(&self) -> impl Iterator<Item = &PageConfig> {
        self.pages.iter()
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Pages belonging to one group, in definition order.
    pub fn in_group(&self, group: PageGroup) -> impl Iterator<Item = &PageConfig> {
        self.pages.iter().filter(move |p| p.group == group)
    }

    pub fn by_name(&self, name: &str) -> Option<&PageConfig> {
        self.pages.iter().find(|p| p.name == name)
    }

    pub fn summary(&self) -> PageSummary {
        let static_pages = self.in_group(PageGroup::Static).count();
        let woo = self.in_group(PageGroup::Woo).count();
        let product = self.in_group(PageGroup::Product).count();
        PageSummary {
            static_pages,
            woo,
            product,
            total: self.pages.len(),
        }
    }

    /// Paths that appear more than once. Duplicates are not rejected,
    /// but two pages sharing a path resolve to the same baseline
    /// identifier, so the runner warns about them before a run.
    pub fn duplicate_paths(&self) -> Vec<String> {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for page in &self.pages {
            *counts.entry(page.path.as_str()).or_insert(0) += 1;
        }
        counts
            .into_iter()
            .filter(|(_, n)| *n > 1)
            .map(|(path, _)| path.to_string())
            .collect()
    }
}
