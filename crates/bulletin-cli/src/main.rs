//! Bulletin - notice-board crawler batch driver.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use futures::stream::{self, StreamExt};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use bulletin_cli::{load_universities, JsonFileStore, NoticeStore, RunReport, SiteOutcome};
use bulletin_config::{apply_env_overrides, CrawlerConfig};
use bulletin_extraction::{ExtractionEngine, TemplateRegistry};
use bulletin_headless::HeadlessBrowser;

#[derive(Parser)]
#[command(name = "bulletin")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Crawl university notice boards and store new postings", long_about = None)]
struct Cli {
    /// Configuration file; defaults apply when the default path is absent
    #[arg(long, env = "BULLETIN_CONFIG")]
    config: Option<PathBuf>,

    /// University list (JSON array of {name, url})
    #[arg(long, default_value = "universities.json")]
    universities: PathBuf,

    /// Template registry file
    #[arg(long, default_value = "data/templates.json")]
    templates: PathBuf,

    /// Directory for run reports
    #[arg(long, default_value = "data")]
    report_dir: PathBuf,

    /// Notice store file
    #[arg(long, default_value = "data/notices.json")]
    store: PathBuf,

    /// How many boards to crawl at once
    #[arg(long, default_value_t = 4)]
    concurrency: usize,

    /// Crawl and report without persisting notices
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(&cli)?;
    let universities = load_universities(&cli.universities)
        .context("university list is required")?;
    if universities.is_empty() {
        warn!(path = %cli.universities.display(), "university list is empty");
    }

    let registry = Arc::new(TemplateRegistry::load(&cli.templates));
    let use_browser = config.fallback.use_browser;
    let browser_settings = config.browser.clone();

    let mut engine = ExtractionEngine::new(config, registry)?;
    let browser = if use_browser {
        let browser = Arc::new(HeadlessBrowser::new(browser_settings));
        engine = engine.with_renderer(browser.clone());
        Some(browser)
    } else {
        None
    };
    let engine = Arc::new(engine);

    let store: Option<Arc<dyn NoticeStore>> = if cli.dry_run {
        info!("dry run: notices will not be persisted");
        None
    } else {
        Some(Arc::new(JsonFileStore::new(&cli.store)))
    };

    info!(
        sites = universities.len(),
        concurrency = cli.concurrency,
        "batch crawl started"
    );

    let outcomes: Vec<SiteOutcome> = stream::iter(universities)
        .map(|university| {
            let engine = engine.clone();
            let store = store.clone();
            async move {
                let result = engine.extract(&university.url, &university.name).await;

                let saved = match (&store, result.success) {
                    (Some(store), true) => {
                        match store.save(&result.notices, &university.name).await {
                            Ok(count) => count,
                            Err(e) => {
                                warn!(site = %university.name, error = %e, "store save failed");
                                0
                            }
                        }
                    }
                    _ => 0,
                };

                SiteOutcome::from_result(university.name, university.url, &result, saved)
            }
        })
        .buffer_unordered(cli.concurrency.max(1))
        .collect()
        .await;

    let report = RunReport::new(outcomes, engine.stats());
    let report_path = report
        .write(&cli.report_dir)
        .context("cannot write run report")?;

    info!(
        successes = report.totals.successes,
        failures = report.totals.failures,
        saved = report.totals.notices_saved,
        report = %report_path.display(),
        "batch crawl finished"
    );

    if let Some(browser) = browser {
        browser.shutdown().await;
    }

    // Partial failures are recorded in the report, not in the exit code.
    Ok(())
}

/// Explicitly-named configuration must exist; the default path may be
/// absent, in which case built-in defaults plus environment overrides
/// apply.
fn load_config(cli: &Cli) -> anyhow::Result<CrawlerConfig> {
    match &cli.config {
        Some(path) => {
            let mut config = CrawlerConfig::load(path)?;
            apply_env_overrides(&mut config)?;
            config.validate()?;
            Ok(config)
        }
        None => Ok(CrawlerConfig::load_or_default(Path::new("config.json"))?),
    }
}
