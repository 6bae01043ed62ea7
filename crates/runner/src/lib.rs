//! Storeshot visual regression runner
//!
//! Drives Playwright against configured storefront sites and compares
//! full-page screenshots with slug-addressed baselines.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     SiteRunner (Rust)                       │
//! ├─────────────────────────────────────────────────────────────┤
//! │  run(filter)                                                │
//! │    ├── preflight()          probe base URL                  │
//! │    ├── per page (worker pool, retry budget):                │
//! │    │     PlaywrightHandle::capture_page                     │
//! │    │       navigate → stabilization protocol → screenshot   │
//! │    │     VisualTester::compare                              │
//! │    │       baselines/{group}/{slug}.png                     │
//! │    └── RunReport            reports/results.json            │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Stabilization protocol (ordered, best-effort)              │
//! │    load-state wait → settle → loader-hidden waits →         │
//! │    scroll sweep → hide overlays → trailing settle           │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Site definitions, selector catalogs, and the addressing scheme live
//! in `storeshot-core`.

pub mod error;
pub mod playwright;
pub mod profile;
pub mod report;
pub mod runner;
pub mod stabilize;
pub mod visual;

pub use error::{RunnerError, RunnerResult};
pub use playwright::{PageShot, PlaywrightConfig, PlaywrightHandle, StepOutcome};
pub use profile::{BrowserKind, Profile, ViewportPreset};
pub use report::{PageOutcome, PageResult, RunReport};
pub use runner::{PageFilter, RunnerConfig, SiteRunner};
pub use stabilize::{
    stabilization_protocol, StabilizationConfig, StabilizeStep, WaitOutcome,
};
pub use visual::{VisualConfig, VisualDiff, VisualTester};
