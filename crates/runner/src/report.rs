//! Run results: JSON document plus logged summary

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use storeshot_core::PageGroup;
use tracing::{error, info};

use crate::error::RunnerResult;
use crate::playwright::StepOutcome;

/// Outcome of one page test after all attempts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PageOutcome {
    Passed,
    NewBaseline,
    Mismatch {
        diff_percent: f64,
        diff_image: Option<String>,
    },
    Failed {
        error: String,
    },
}

impl PageOutcome {
    /// Passed and NewBaseline both leave the run green.
    pub fn is_ok(&self) -> bool {
        matches!(self, PageOutcome::Passed | PageOutcome::NewBaseline)
    }
}

/// Result of one page test.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResult {
    pub page: String,
    pub path: String,
    pub group: PageGroup,

    /// Baseline identifier, e.g. `woo/shop.png`.
    pub baseline: String,

    pub outcome: PageOutcome,

    /// Attempts consumed, including the final one.
    pub attempts: u32,

    pub duration_ms: u64,

    /// Stabilization step outcomes from the final attempt.
    pub stabilization: Vec<StepOutcome>,
}

/// Full results of one site/profile run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub site: String,
    pub environment: String,
    pub profile: String,
    pub started_at: chrono::DateTime<chrono::Utc>,
    pub duration_ms: u64,

    pub total: usize,
    pub passed: usize,
    pub new_baselines: usize,
    pub failed: usize,

    pub results: Vec<PageResult>,
}

impl RunReport {
    pub fn new(
        site: &str,
        environment: &str,
        profile: &str,
        started_at: chrono::DateTime<chrono::Utc>,
        duration_ms: u64,
        results: Vec<PageResult>,
    ) -> Self {
        let passed = results
            .iter()
            .filter(|r| matches!(r.outcome, PageOutcome::Passed))
            .count();
        let new_baselines = results
            .iter()
            .filter(|r| matches!(r.outcome, PageOutcome::NewBaseline))
            .count();
        let failed = results.iter().filter(|r| !r.outcome.is_ok()).count();

        Self {
            site: site.to_string(),
            environment: environment.to_string(),
            profile: profile.to_string(),
            started_at,
            duration_ms,
            total: results.len(),
            passed,
            new_baselines,
            failed,
            results,
        }
    }

    pub fn success(&self) -> bool {
        self.failed == 0
    }

    /// Write the results document to `<output_dir>/results.json`.
    pub fn write(&self, output_dir: &Path) -> RunnerResult<PathBuf> {
        std::fs::create_dir_all(output_dir)?;
        let path = output_dir.join("results.json");
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, json)?;
        info!("Results written to: {}", path.display());
        Ok(path)
    }

    /// List-style summary lines.
    pub fn log_summary(&self) {
        for result in &self.results {
            match &result.outcome {
                PageOutcome::Passed => {
                    info!("✓ {} ({} ms)", result.page, result.duration_ms);
                }
                PageOutcome::NewBaseline => {
                    info!("+ {} -> {} (new baseline)", result.page, result.baseline);
                }
                PageOutcome::Mismatch { diff_percent, .. } => {
                    error!(
                        "✗ {} - {:.3}% pixels differ from {}",
                        result.page, diff_percent, result.baseline
                    );
                }
                PageOutcome::Failed { error } => {
                    error!("✗ {} - {}", result.page, error);
                }
            }
        }
        info!(
            "{} [{}] on {}: {} passed, {} new baseline(s), {} failed ({} ms)",
            self.site,
            self.environment,
            self.profile,
            self.passed,
            self.new_baselines,
            self.failed,
            self.duration_ms
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(page: &str, outcome: PageOutcome) -> PageResult {
        PageResult {
            page: page.to_string(),
            path: "/".to_string(),
            group: PageGroup::Static,
            baseline: "static/home.png".to_string(),
            outcome,
            attempts: 1,
            duration_ms: 10,
            stabilization: vec![],
        }
    }

    #[test]
    fn counts_partition_results() {
        let report = RunReport::new(
            "example.com",
            "Production",
            "chrome-desktop",
            chrono::Utc::now(),
            100,
            vec![
                result("Home", PageOutcome::Passed),
                result("About", PageOutcome::NewBaseline),
                result(
                    "Shop",
                    PageOutcome::Mismatch {
                        diff_percent: 4.2,
                        diff_image: None,
                    },
                ),
                result(
                    "Cart",
                    PageOutcome::Failed {
                        error: "boom".to_string(),
                    },
                ),
            ],
        );

        assert_eq!(report.total, 4);
        assert_eq!(report.passed, 1);
        assert_eq!(report.new_baselines, 1);
        assert_eq!(report.failed, 2);
        assert!(!report.success());
    }

    #[test]
    fn new_baseline_is_not_a_failure() {
        let report = RunReport::new(
            "example.com",
            "Production",
            "chrome-desktop",
            chrono::Utc::now(),
            5,
            vec![result("Home", PageOutcome::NewBaseline)],
        );
        assert!(report.success());
    }

    #[test]
    fn report_round_trips_through_json() {
        let dir = tempfile::tempdir().unwrap();
        let report = RunReport::new(
            "example.com",
            "Production",
            "chrome-desktop",
            chrono::Utc::now(),
            5,
            vec![result("Home", PageOutcome::Passed)],
        );
        let path = report.write(dir.path()).unwrap();
        let loaded: RunReport =
            serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(loaded.site, "example.com");
        assert_eq!(loaded.total, 1);
        assert!(matches!(loaded.results[0].outcome, PageOutcome::Passed));
    }
}
