//! Site orchestration: preflight, page fan-out, retries, reporting

use std::path::PathBuf;
use std::time::{Duration, Instant};

use futures::stream::{self, StreamExt};
use storeshot_core::{baseline_image, PageConfig, PageGroup, SiteConfig};
use tracing::{debug, info};

use crate::error::{RunnerError, RunnerResult};
use crate::playwright::{PlaywrightConfig, PlaywrightHandle};
use crate::profile::Profile;
use crate::report::{PageOutcome, PageResult, RunReport};
use crate::stabilize::{stabilization_protocol, StabilizationConfig, StabilizeStep};
use crate::visual::{VisualConfig, VisualTester};

/// Runner configuration. Worker and retry defaults follow the CI
/// split: fewer workers and more retries under CI.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Concurrent page tests.
    pub workers: usize,

    /// Re-attempts after a failed or mismatched page test.
    pub retries: u32,

    /// Tolerated pixel-difference percentage.
    pub threshold: f64,

    pub baseline_dir: PathBuf,
    pub output_dir: PathBuf,

    pub stabilization: StabilizationConfig,
    pub playwright: PlaywrightConfig,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        let ci = std::env::var_os("CI").is_some();
        Self {
            workers: if ci { 2 } else { 4 },
            retries: if ci { 2 } else { 1 },
            threshold: 0.2,
            baseline_dir: PathBuf::from("baselines"),
            output_dir: PathBuf::from("reports"),
            stabilization: StabilizationConfig::default(),
            playwright: PlaywrightConfig::default(),
        }
    }
}

/// Filters selecting a subset of a site's pages.
#[derive(Debug, Clone, Default)]
pub struct PageFilter {
    pub group: Option<PageGroup>,
    pub page_name: Option<String>,
}

impl PageFilter {
    fn accepts(&self, page: &PageConfig) -> bool {
        if let Some(group) = self.group {
            if page.group != group {
                return false;
            }
        }
        if let Some(name) = &self.page_name {
            if &page.name != name {
                return false;
            }
        }
        true
    }
}

/// Drives all page tests for one site under one profile.
pub struct SiteRunner {
    site: SiteConfig,
    profile: Profile,
    config: RunnerConfig,
    playwright: PlaywrightHandle,
    visual: VisualTester,
}

impl SiteRunner {
    pub fn new(site: SiteConfig, profile: Profile, config: RunnerConfig) -> RunnerResult<Self> {
        let playwright = PlaywrightHandle::new(
            profile,
            config.playwright.clone(),
            config.output_dir.join("actual"),
        )?;
        let visual = VisualTester::new(VisualConfig {
            baseline_dir: config.baseline_dir.clone(),
            actual_dir: config.output_dir.join("actual"),
            diff_dir: config.output_dir.join("diffs"),
            threshold: config.threshold,
        })?;

        Ok(Self {
            site,
            profile,
            config,
            playwright,
            visual,
        })
    }

    /// Probe the site's base URL before spending browser time on it.
    /// An unreachable site is fatal for the whole site run.
    pub async fn preflight(&self) -> RunnerResult<()> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        let response = client
            .get(&self.site.base_url)
            .header("Accept-Language", &self.config.playwright.accept_language)
            .send()
            .await
            .map_err(|e| RunnerError::SiteUnreachable {
                url: self.site.base_url.clone(),
                reason: e.to_string(),
            })?;

        if !response.status().is_success() && !response.status().is_redirection() {
            return Err(RunnerError::SiteUnreachable {
                url: self.site.base_url.clone(),
                reason: format!("status {}", response.status()),
            });
        }

        debug!("Preflight ok: {}", self.site.base_url);
        Ok(())
    }

    /// Run the selected page tests and assemble the report.
    pub async fn run(&self, filter: &PageFilter) -> RunnerResult<RunReport> {
        let started_at = chrono::Utc::now();
        let start = Instant::now();

        self.preflight().await?;
        self.visual.clean_diffs()?;

        let steps = stabilization_protocol(
            &self.config.stabilization,
            &self.site.selectors.loader_selectors(),
        );

        let pages: Vec<&PageConfig> = self
            .site
            .pages
            .iter()
            .filter(|p| filter.accepts(p))
            .collect();

        info!(
            "Running {} page test(s) for {} [{}] on {}",
            pages.len(),
            self.site.site_name,
            self.site.environment_name,
            self.profile
        );

        let results: Vec<PageResult> = stream::iter(
            pages
                .into_iter()
                .map(|page| self.run_page(page, &steps)),
        )
        .buffer_unordered(self.config.workers.max(1))
        .collect()
        .await;

        let report = RunReport::new(
            &self.site.site_name,
            &self.site.environment_name,
            &self.profile.name(),
            started_at,
            start.elapsed().as_millis() as u64,
            results,
        );
        report.log_summary();
        report.write(&self.config.output_dir)?;
        Ok(report)
    }

    /// One page test: navigate, stabilize, capture, compare, with the
    /// configured retry budget. Errors fold into the outcome; a single
    /// page never aborts the run.
    async fn run_page(&self, page: &PageConfig, steps: &[StabilizeStep]) -> PageResult {
        let baseline = baseline_image(page.group, &page.path);
        let url = self.site.url_for(page);
        let start = Instant::now();

        let mut attempts = 0;
        let mut outcome = PageOutcome::Failed {
            error: "no attempt made".to_string(),
        };
        let mut stabilization = Vec::new();

        while attempts <= self.config.retries {
            attempts += 1;
            if attempts > 1 {
                debug!("Retrying {} (attempt {})", page.name, attempts);
            }

            match self.attempt_page(&url, steps, &baseline).await {
                Ok((page_outcome, step_outcomes)) => {
                    stabilization = step_outcomes;
                    let done = page_outcome.is_ok();
                    outcome = page_outcome;
                    if done {
                        break;
                    }
                }
                Err(e) => {
                    outcome = PageOutcome::Failed {
                        error: e.to_string(),
                    };
                }
            }
        }

        PageResult {
            page: page.name.clone(),
            path: page.path.clone(),
            group: page.group,
            baseline,
            outcome,
            attempts,
            duration_ms: start.elapsed().as_millis() as u64,
            stabilization,
        }
    }

    async fn attempt_page(
        &self,
        url: &str,
        steps: &[StabilizeStep],
        baseline: &str,
    ) -> RunnerResult<(PageOutcome, Vec<crate::playwright::StepOutcome>)> {
        let shot = self.playwright.capture_page(url, steps, baseline).await?;
        let diff = self.visual.compare(baseline, Some(self.config.threshold))?;

        let outcome = if diff.new_baseline {
            PageOutcome::NewBaseline
        } else if diff.matches {
            PageOutcome::Passed
        } else {
            PageOutcome::Mismatch {
                diff_percent: diff.diff_percent,
                diff_image: diff
                    .diff_image_path
                    .map(|p| p.to_string_lossy().to_string()),
            }
        };

        Ok((outcome, shot.steps))
    }

    /// Promote every capture from this run to a baseline.
    pub fn update_baselines(&self) -> RunnerResult<Vec<String>> {
        self.visual.update_all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storeshot_core::SiteSpec;

    fn site() -> SiteConfig {
        SiteSpec::from_yaml(
            r#"
site: example.com
tag: example
environments:
  live:
    name: Production
    base_url: https://example.com
pages:
  - name: Home
    path: /
    group: static
  - name: Shop
    path: /shop/
    group: woo
  - name: Widget
    path: /product/widget/
    group: product
"#,
        )
        .unwrap()
        .resolve(None)
        .unwrap()
    }

    #[test]
    fn filter_selects_groups_and_names() {
        let site = site();
        let all = PageFilter::default();
        assert_eq!(site.pages.iter().filter(|p| all.accepts(p)).count(), 3);

        let woo_only = PageFilter {
            group: Some(PageGroup::Woo),
            page_name: None,
        };
        let selected: Vec<&str> = site
            .pages
            .iter()
            .filter(|p| woo_only.accepts(p))
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(selected, vec!["Shop"]);

        let by_name = PageFilter {
            group: None,
            page_name: Some("Widget".to_string()),
        };
        assert_eq!(site.pages.iter().filter(|p| by_name.accepts(p)).count(), 1);
    }

    #[test]
    fn ci_defaults_trade_workers_for_retries() {
        // Whatever the ambient CI setting, the two shapes are the only
        // possibilities.
        let config = RunnerConfig::default();
        assert!(
            (config.workers == 2 && config.retries == 2)
                || (config.workers == 4 && config.retries == 1)
        );
        assert!((config.threshold - 0.2).abs() < f64::EPSILON);
    }

    #[test]
    fn baseline_addresses_follow_groups() {
        let site = site();
        let expected = ["static/home.png", "woo/shop.png", "products/product-widget.png"];
        for (page, want) in site.pages.iter().zip(expected) {
            assert_eq!(baseline_image(page.group, &page.path), want);
        }
    }
}
