//! Screenshot stabilization protocol
//!
//! The ordered sequence of waits and DOM mutations that turns a
//! freshly navigated, possibly still-loading page into something
//! deterministic enough for pixel comparison. Every wait here is
//! tolerant: a timeout is recorded as [`WaitOutcome::TimedOut`] in the
//! step report and the sequence continues. The protocol never aborts
//! the page test.

use serde::{Deserialize, Serialize};

/// Timeouts and settle delays for the stabilization sequence.
#[derive(Debug, Clone)]
pub struct StabilizationConfig {
    /// Bound on the DOM-ready load-state wait.
    pub load_timeout_ms: u64,

    /// Fixed delay after load-state for initial paint/layout.
    pub settle_ms: u64,

    /// Bound on each loader-hidden wait.
    pub loader_timeout_ms: u64,

    /// Pause between viewport-height scroll increments.
    pub scroll_pause_ms: u64,

    /// Pause after scrolling back to the top.
    pub scroll_settle_ms: u64,

    /// Final pause for trailing animations.
    pub trailing_settle_ms: u64,
}

impl Default for StabilizationConfig {
    fn default() -> Self {
        Self {
            load_timeout_ms: 30_000,
            settle_ms: 1_000,
            loader_timeout_ms: 10_000,
            scroll_pause_ms: 100,
            scroll_settle_ms: 500,
            trailing_settle_ms: 500,
        }
    }
}

/// One step of the stabilization sequence.
#[derive(Debug, Clone, PartialEq)]
pub enum StabilizeStep {
    /// Wait for the DOM-ready load-state signal. Tolerant.
    AwaitLoadState { timeout_ms: u64 },

    /// Fixed settle delay.
    Settle { ms: u64 },

    /// If an element matching the selector exists, wait for it to
    /// become hidden. Tolerant.
    AwaitLoaderHidden { selector: String, timeout_ms: u64 },

    /// Scroll top to bottom in viewport-height increments to trigger
    /// lazy-loaded content, then return to the top.
    ScrollSweep { pause_ms: u64, settle_ms: u64 },

    /// Hide everything matching the overlay selectors. Destructive,
    /// irreversible mutation of the in-memory page; the page is
    /// discarded after the screenshot.
    HideOverlays { selectors: Vec<String> },
}

impl StabilizeStep {
    /// Stable identifier used in step reports.
    pub fn name(&self) -> String {
        match self {
            StabilizeStep::AwaitLoadState { .. } => "load-state".to_string(),
            StabilizeStep::Settle { ms } => format!("settle:{}ms", ms),
            StabilizeStep::AwaitLoaderHidden { selector, .. } => {
                format!("loader-hidden:{}", selector)
            }
            StabilizeStep::ScrollSweep { .. } => "scroll-sweep".to_string(),
            StabilizeStep::HideOverlays { .. } => "hide-overlays".to_string(),
        }
    }

    /// Whether this step may time out without failing the page test.
    pub fn is_tolerant(&self) -> bool {
        matches!(
            self,
            StabilizeStep::AwaitLoadState { .. } | StabilizeStep::AwaitLoaderHidden { .. }
        )
    }
}

/// How a tolerant wait ended. Failure-tolerance lives in this type
/// instead of a blanket catch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaitOutcome {
    Settled,
    TimedOut,
}

/// Cookie-consent, GDPR-banner, and popup-overlay patterns hidden
/// before every screenshot.
pub fn overlay_selectors() -> Vec<String> {
    [
        ".cookie-consent",
        ".cookie-banner",
        ".cookie-notice",
        "#cookie-notice",
        "#cookie-law-info-bar",
        ".cc-banner",
        ".cc-window",
        "[class*=\"cookie\"]",
        "[class*=\"gdpr\"]",
        "[id*=\"cookie\"]",
        ".modal-backdrop",
        ".popup-overlay",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// Build the ordered stabilization sequence for a page.
///
/// `loader_selectors` comes from the site's merged selector catalog
/// (`general.loader`); each selector gets its own tolerant wait.
pub fn stabilization_protocol(
    config: &StabilizationConfig,
    loader_selectors: &[String],
) -> Vec<StabilizeStep> {
    let mut steps = Vec::with_capacity(loader_selectors.len() + 5);

    steps.push(StabilizeStep::AwaitLoadState {
        timeout_ms: config.load_timeout_ms,
    });
    steps.push(StabilizeStep::Settle {
        ms: config.settle_ms,
    });

    for selector in loader_selectors {
        steps.push(StabilizeStep::AwaitLoaderHidden {
            selector: selector.clone(),
            timeout_ms: config.loader_timeout_ms,
        });
    }

    steps.push(StabilizeStep::ScrollSweep {
        pause_ms: config.scroll_pause_ms,
        settle_ms: config.scroll_settle_ms,
    });
    steps.push(StabilizeStep::HideOverlays {
        selectors: overlay_selectors(),
    });
    steps.push(StabilizeStep::Settle {
        ms: config.trailing_settle_ms,
    });

    steps
}
