//! Visual regression harness entry point
//!
//! Runs page tests for every configured site (or a filtered subset).
//! Run with: cargo test --package storeshot-runner --test visual

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use storeshot_core::{PageGroup, SiteSpec};
use storeshot_runner::runner::{PageFilter, RunnerConfig};
use storeshot_runner::{Profile, SiteRunner};

#[derive(Parser, Debug)]
#[command(name = "storeshot")]
#[command(about = "Visual regression runner for WooCommerce storefronts")]
struct Args {
    /// Directory of site definitions
    #[arg(long, default_value = "sites")]
    sites_dir: PathBuf,

    /// Run only this site (matched against site name or tag)
    #[arg(long)]
    site: Option<String>,

    /// Run only pages in this group (static, woo, product)
    #[arg(long)]
    group: Option<String>,

    /// Run only the page with this name
    #[arg(long)]
    page: Option<String>,

    /// Environment key (falls back to STORESHOT_ENV, then the site default)
    #[arg(long)]
    env: Option<String>,

    /// Execution profile, e.g. chrome-desktop
    #[arg(long, default_value = "chrome-desktop")]
    profile: String,

    /// Promote this run's captures to baselines after comparing
    #[arg(long)]
    update_baselines: bool,

    /// Concurrent page tests (default: 2 in CI, 4 locally)
    #[arg(long)]
    workers: Option<usize>,

    /// Re-attempts per failed page (default: 2 in CI, 1 locally)
    #[arg(long)]
    retries: Option<u32>,

    /// Tolerated pixel-difference percentage
    #[arg(long)]
    threshold: Option<f64>,

    /// Baseline image root
    #[arg(long, default_value = "baselines")]
    baseline_dir: PathBuf,

    /// Output directory for screenshots, diffs, and results
    #[arg(short, long, default_value = "reports")]
    output: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args = Args::parse();

    let rt = tokio::runtime::Runtime::new()?;
    let failed = rt.block_on(run(args))?;

    if failed > 0 {
        std::process::exit(1);
    }
    Ok(())
}

async fn run(args: Args) -> anyhow::Result<usize> {
    let profile = Profile::from_name(&args.profile)?;

    let group = args
        .group
        .as_deref()
        .map(str::parse::<PageGroup>)
        .transpose()?;
    let filter = PageFilter {
        group,
        page_name: args.page.clone(),
    };

    let mut specs = SiteSpec::load_all(&args.sites_dir)?;
    if let Some(wanted) = &args.site {
        specs.retain(|s| &s.site == wanted || &s.tag == wanted);
        if specs.is_empty() {
            anyhow::bail!("no site named or tagged '{}' under {}", wanted, args.sites_dir.display());
        }
    }
    if specs.is_empty() {
        anyhow::bail!("no site definitions under {}", args.sites_dir.display());
    }

    let mut config = RunnerConfig {
        baseline_dir: args.baseline_dir,
        ..RunnerConfig::default()
    };
    if let Some(workers) = args.workers {
        config.workers = workers;
    }
    if let Some(retries) = args.retries {
        config.retries = retries;
    }
    if let Some(threshold) = args.threshold {
        config.threshold = threshold;
    }

    let mut failed = 0;
    for spec in &specs {
        let site = spec.resolve(args.env.as_deref())?;

        // Keep per-site artifacts apart when running several sites.
        let mut site_config = config.clone();
        site_config.output_dir = args.output.join(&site.tag);
        site_config.baseline_dir = config.baseline_dir.join(&site.tag);

        let runner = SiteRunner::new(site, profile, site_config)?;
        let report = runner.run(&filter).await?;
        failed += report.failed;

        if args.update_baselines {
            let updated = runner.update_baselines()?;
            tracing::info!("Updated {} baseline(s) for {}", updated.len(), spec.site);
        }
    }

    Ok(failed)
}
