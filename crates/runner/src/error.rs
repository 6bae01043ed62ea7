//! Error types for the visual regression runner

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("Playwright not found. Install with: npx playwright install")]
    PlaywrightNotFound,

    #[error("Playwright error: {0}")]
    Playwright(String),

    #[error("Navigation failed for {url}: {reason}")]
    Navigation { url: String, reason: String },

    #[error("Page test exceeded {ms} ms ceiling")]
    PageTimeout { ms: u64 },

    #[error("Site unreachable: {url} ({reason})")]
    SiteUnreachable { url: String, reason: String },

    #[error("Screenshot not captured: {0}")]
    ScreenshotMissing(String),

    #[error("Unknown profile: {requested}. Available: {}", available.join(", "))]
    UnknownProfile {
        requested: String,
        available: Vec<String>,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

pub type RunnerResult<T> = Result<T, RunnerError>;
