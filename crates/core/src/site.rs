//! Per-site declarative definitions and the derived run configuration
//!
//! A site is one YAML file under `sites/`. Loading happens once at
//! startup; everything downstream receives immutable references.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::environment::{EnvironmentSet, SiteEnvironment};
use crate::error::{Error, Result};
use crate::page::{PageConfig, PageSet, PageSummary};
use crate::selectors::SelectorCatalog;

/// A site definition as written in YAML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteSpec {
    /// Site identity, e.g. "example-store.com"
    pub site: String,

    /// Short tag used for filtering, e.g. "example"
    pub tag: String,

    pub environments: BTreeMap<String, SiteEnvironment>,

    #[serde(default = "default_environment_key")]
    pub default_environment: String,

    pub pages: Vec<PageConfig>,

    /// Optional selector overrides, merged over the WooCommerce
    /// defaults with the site value winning.
    #[serde(default)]
    pub selectors: SelectorCatalog,
}

fn default_environment_key() -> String {
    "live".to_string()
}

impl SiteSpec {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let spec: SiteSpec = serde_yaml::from_str(yaml)?;
        if spec.pages.is_empty() {
            return Err(Error::InvalidSite(format!(
                "site '{}' defines no pages",
                spec.site
            )));
        }
        Ok(spec)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Load every site definition under a directory. Files whose name
    /// starts with `_` are templates and are skipped.
    pub fn load_all(dir: &Path) -> Result<Vec<Self>> {
        let mut specs = Vec::new();
        for entry in walkdir::WalkDir::new(dir)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| {
                e.path()
                    .extension()
                    .map(|ext| ext == "yaml" || ext == "yml")
                    .unwrap_or(false)
            })
            .filter(|e| {
                !e.path()
                    .file_name()
                    .map(|n| n.to_string_lossy().starts_with('_'))
                    .unwrap_or(false)
            })
        {
            specs.push(Self::from_file(entry.path())?);
        }
        Ok(specs)
    }

    /// Resolve this definition against an environment into the
    /// immutable configuration a run consumes. Recomputed per run,
    /// never stored.
    pub fn resolve(&self, env_override: Option<&str>) -> Result<SiteConfig> {
        let environments = EnvironmentSet::new(
            self.environments.clone(),
            self.default_environment.clone(),
        )?;
        let (environment_key, environment) = environments.select(env_override)?;

        let pages = PageSet::new(self.pages.clone())?;
        for path in pages.duplicate_paths() {
            warn!(
                site = %self.site,
                path = %path,
                "duplicate page path; tests will share one baseline identifier"
            );
        }

        let selectors = SelectorCatalog::woocommerce_defaults().merged_with(&self.selectors);

        Ok(SiteConfig {
            site_name: self.site.clone(),
            tag: self.tag.clone(),
            environment_name: environment.name.clone(),
            environment_key,
            base_url: environment.base_url.trim_end_matches('/').to_string(),
            summary: pages.summary(),
            pages,
            selectors,
        })
    }
}

/// Fully resolved configuration for one site run.
#[derive(Debug, Clone)]
pub struct SiteConfig {
    pub site_name: String,
    pub tag: String,
    pub environment_name: String,
    pub environment_key: String,
    pub base_url: String,
    pub pages: PageSet,
    pub selectors: SelectorCatalog,
    pub summary: PageSummary,
}

impl SiteConfig {
    /// Absolute URL for a page of this site.
    pub fn url_for(&self, page: &PageConfig) -> String {
        format!("{}{}", self.base_url, page.path)
    }
}
