//! Storeshot core: site configuration and baseline addressing
//!
//! This crate holds the data model shared by the visual-regression
//! runner:
//!
//! - per-site page registries ([`page`]) grouped into static, woo, and
//!   product pages
//! - named environments with fail-fast selection ([`environment`])
//! - the WooCommerce selector catalog with per-site overrides
//!   ([`selectors`])
//! - the pure addressing scheme mapping a page path to its baseline
//!   image ([`slug`])
//! - YAML site definitions and their resolution into an immutable
//!   run configuration ([`site`])
//!
//! Nothing here touches a browser; the runner crate consumes these
//! types.

pub mod environment;
pub mod error;
pub mod page;
pub mod selectors;
pub mod site;
pub mod slug;

pub use environment::{EnvironmentSet, SiteEnvironment, ENV_VAR};
pub use error::{Error, Result};
pub use page::{PageConfig, PageGroup, PageSet, PageSummary};
pub use selectors::{SelectorCatalog, SelectorValue};
pub use site::{SiteConfig, SiteSpec};
pub use slug::{baseline_image, slugify};
