//! Playwright browser automation
//!
//! Each page test compiles into a self-contained Playwright script that
//! navigates, runs the stabilization sequence, captures a full-page
//! screenshot, and prints a single JSON report line with the per-step
//! wait outcomes. The script runs under `node`, bounded by the page
//! test ceiling.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::process::Command as TokioCommand;
use tracing::debug;

use crate::error::{RunnerError, RunnerResult};
use crate::profile::Profile;
use crate::stabilize::{StabilizeStep, WaitOutcome};

/// Fixed driver settings shared by every page test.
#[derive(Debug, Clone)]
pub struct PlaywrightConfig {
    pub headless: bool,

    /// Default timeout for individual page actions.
    pub action_timeout_ms: u64,

    /// Bound on the initial navigation.
    pub navigation_timeout_ms: u64,

    /// Ceiling on one whole page test; exceeding it fails that page
    /// only.
    pub test_timeout_ms: u64,

    /// Sent with every request; storefronts vary layout by locale.
    pub accept_language: String,
}

impl Default for PlaywrightConfig {
    fn default() -> Self {
        Self {
            headless: true,
            action_timeout_ms: 15_000,
            navigation_timeout_ms: 60_000,
            test_timeout_ms: 60_000,
            accept_language: "en-US,en;q=0.9".to_string(),
        }
    }
}

/// Wait outcome of one stabilization step, as reported by the script.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepOutcome {
    pub step: String,
    pub outcome: WaitOutcome,
}

/// JSON report line printed by the generated script.
#[derive(Debug, Deserialize)]
struct ScriptReport {
    success: bool,
    #[serde(default)]
    steps: Vec<StepOutcome>,
    #[serde(default)]
    error: Option<String>,
}

/// A captured, stabilized screenshot.
#[derive(Debug, Clone)]
pub struct PageShot {
    pub screenshot: PathBuf,
    pub steps: Vec<StepOutcome>,
}

/// Handle for driving one browser profile.
pub struct PlaywrightHandle {
    config: PlaywrightConfig,
    profile: Profile,
    actual_dir: PathBuf,
}

impl PlaywrightHandle {
    pub fn new(
        profile: Profile,
        config: PlaywrightConfig,
        actual_dir: PathBuf,
    ) -> RunnerResult<Self> {
        Self::check_playwright_installed()?;
        std::fs::create_dir_all(&actual_dir)?;

        Ok(Self {
            config,
            profile,
            actual_dir,
        })
    }

    fn check_playwright_installed() -> RunnerResult<()> {
        let status = std::process::Command::new("npx")
            .args(["playwright", "--version"])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();

        match status {
            Ok(status) if status.success() => Ok(()),
            _ => Err(RunnerError::PlaywrightNotFound),
        }
    }

    /// Navigate to `url`, run the stabilization steps, and capture a
    /// full-page screenshot at `relative_png` under the actual
    /// directory.
    pub async fn capture_page(
        &self,
        url: &str,
        steps: &[StabilizeStep],
        relative_png: &str,
    ) -> RunnerResult<PageShot> {
        let screenshot = self.actual_dir.join(relative_png);
        if let Some(parent) = screenshot.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let script = self.build_script(url, steps, &screenshot);
        let report = self.run_script(&script).await?;

        if !report.success {
            return Err(RunnerError::Navigation {
                url: url.to_string(),
                reason: report
                    .error
                    .unwrap_or_else(|| "script reported failure".to_string()),
            });
        }
        if !screenshot.exists() {
            return Err(RunnerError::ScreenshotMissing(
                screenshot.to_string_lossy().to_string(),
            ));
        }

        Ok(PageShot {
            screenshot,
            steps: report.steps,
        })
    }

    /// Build the Playwright script for one page test.
    pub fn build_script(&self, url: &str, steps: &[StabilizeStep], screenshot: &Path) -> String {
        let (width, height) = self.profile.viewport.dimensions();
        let channel = self
            .profile
            .browser
            .channel()
            .map(|c| format!(", channel: '{}'", c))
            .unwrap_or_default();

        let mut script = format!(
            r#"const {{ chromium, firefox, webkit }} = require('playwright');

(async () => {{
  const steps = [];
  const browser = await {engine}.launch({{ headless: {headless}{channel} }});
  const context = await browser.newContext({{
    viewport: {{ width: {width}, height: {height} }},
    isMobile: {is_mobile},
    extraHTTPHeaders: {{ 'Accept-Language': {accept_language} }}
  }});
  context.setDefaultTimeout({action_timeout});
  const page = await context.newPage();

  try {{
    await page.goto({url}, {{ waitUntil: 'domcontentloaded', timeout: {nav_timeout} }});
"#,
            engine = self.profile.browser.engine(),
            headless = self.config.headless,
            channel = channel,
            width = width,
            height = height,
            is_mobile = self.profile.is_mobile(),
            accept_language = js_str(&self.config.accept_language),
            action_timeout = self.config.action_timeout_ms,
            url = js_str(url),
            nav_timeout = self.config.navigation_timeout_ms,
        );

        for step in steps {
            script.push_str(&format!("\n    // {}\n", step.name()));
            script.push_str(&self.step_to_js(step));
        }

        script.push_str(&format!(
            r#"
    await page.screenshot({{ path: {path}, fullPage: true, animations: 'disabled' }});
    console.log(JSON.stringify({{ success: true, steps }}));
  }} catch (error) {{
    console.log(JSON.stringify({{ success: false, steps, error: error.message }}));
    process.exitCode = 1;
  }} finally {{
    await browser.close();
  }}
}})();
"#,
            path = js_str(&screenshot.to_string_lossy()),
        ));

        script
    }

    fn step_to_js(&self, step: &StabilizeStep) -> String {
        let name = js_str(&step.name());
        match step {
            StabilizeStep::AwaitLoadState { timeout_ms } => format!(
                r#"    {{
      let outcome = 'settled';
      await page.waitForLoadState('domcontentloaded', {{ timeout: {timeout} }}).catch(() => {{ outcome = 'timed_out'; }});
      steps.push({{ step: {name}, outcome }});
    }}
"#,
                timeout = timeout_ms,
                name = name,
            ),
            StabilizeStep::Settle { ms } => format!(
                r#"    await page.waitForTimeout({ms});
    steps.push({{ step: {name}, outcome: 'settled' }});
"#,
                ms = ms,
                name = name,
            ),
            StabilizeStep::AwaitLoaderHidden {
                selector,
                timeout_ms,
            } => format!(
                r#"    {{
      let outcome = 'settled';
      const loader = page.locator({selector});
      if (await loader.count() > 0) {{
        await loader.first().waitFor({{ state: 'hidden', timeout: {timeout} }}).catch(() => {{ outcome = 'timed_out'; }});
      }}
      steps.push({{ step: {name}, outcome }});
    }}
"#,
                selector = js_str(selector),
                timeout = timeout_ms,
                name = name,
            ),
            StabilizeStep::ScrollSweep {
                pause_ms,
                settle_ms,
            } => format!(
                r#"    await page.evaluate(async ([pause, settle]) => {{
      const delay = (ms) => new Promise((resolve) => setTimeout(resolve, ms));
      const scrollHeight = document.body.scrollHeight;
      const viewportHeight = window.innerHeight;
      let position = 0;
      while (position < scrollHeight) {{
        window.scrollTo(0, position);
        position += viewportHeight;
        await delay(pause);
      }}
      window.scrollTo(0, 0);
      await delay(settle);
    }}, [{pause}, {settle}]);
    steps.push({{ step: {name}, outcome: 'settled' }});
"#,
                pause = pause_ms,
                settle = settle_ms,
                name = name,
            ),
            StabilizeStep::HideOverlays { selectors } => {
                let list = selectors
                    .iter()
                    .map(|s| js_str(s))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!(
                    r#"    await page.evaluate((selectors) => {{
      for (const selector of selectors) {{
        document.querySelectorAll(selector).forEach((el) => {{ el.style.display = 'none'; }});
      }}
    }}, [{list}]);
    steps.push({{ step: {name}, outcome: 'settled' }});
"#,
                    list = list,
                    name = name,
                )
            }
        }
    }

    /// Execute the script via node, bounded by the page test ceiling.
    async fn run_script(&self, script: &str) -> RunnerResult<ScriptReport> {
        let temp_dir = tempfile::tempdir()?;
        let script_path = temp_dir.path().join("page-test.js");
        std::fs::write(&script_path, script)?;

        debug!("Running Playwright script: {}", script_path.display());

        let mut cmd = TokioCommand::new("node");
        cmd.arg(&script_path)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = cmd.spawn().map_err(|e| {
            RunnerError::Playwright(format!("failed to spawn node: {}", e))
        })?;

        let ceiling = Duration::from_millis(self.config.test_timeout_ms);
        let output = match tokio::time::timeout(ceiling, child.wait_with_output()).await {
            Ok(output) => output?,
            Err(_) => {
                return Err(RunnerError::PageTimeout {
                    ms: self.config.test_timeout_ms,
                })
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout);
        let report_line = stdout
            .lines()
            .rev()
            .find(|line| line.trim_start().starts_with('{'));

        match report_line {
            Some(line) => Ok(serde_json::from_str(line)?),
            None => {
                let stderr = String::from_utf8_lossy(&output.stderr);
                Err(RunnerError::Playwright(format!(
                    "no report from script:\nstdout: {}\nstderr: {}",
                    stdout, stderr
                )))
            }
        }
    }
}

/// Quote a string as a single-quoted JS literal.
fn js_str(s: &str) -> String {
    format!("'{}'", s.replace('\\', "\\\\").replace('\'', "\\'"))
}
