mod duration;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use duration::HumanDuration;
use gl_cleaner::{BatchCleaner, CleaningRules, CleaningSummary, RecordCleaner, TextCleaner};
use gl_scraper::logging::init_logging;
use gl_scraper::{ChromiumLauncher, CrawlSettings, Crawler, FetchConfig, ReqwestBackend, SiteProfile};
use gl_storage::{CleanedStore, DataLayout, FileStorage};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about = "Harvests and cleans AASLD practice guidelines", long_about = None)]
struct Cli {
    /// Root of the run artifacts (metadata/, json/, text_content/, pdfs/)
    #[arg(long, default_value = "data", global = true)]
    data_dir: PathBuf,
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Discover every guideline link and process it
    Crawl {
        #[command(flatten)]
        fetch: FetchArgs,
    },
    /// Process a single guideline URL
    Url {
        url: String,
        #[command(flatten)]
        fetch: FetchArgs,
    },
    /// Clean the raw JSON records of a previous crawl
    Clean {
        #[command(flatten)]
        clean: CleanArgs,
    },
    /// Crawl, then clean
    Run {
        #[command(flatten)]
        fetch: FetchArgs,
        #[command(flatten)]
        clean: CleanArgs,
    },
}

#[derive(Args, Debug, Clone)]
struct FetchArgs {
    /// Listing page the category links are discovered from
    #[arg(long)]
    root_url: Option<String>,
    /// Pause before each plain HTTP request (e.g. 1500ms)
    #[arg(long, default_value = "1500ms")]
    http_delay: HumanDuration,
    /// Pause before each browser navigation
    #[arg(long, default_value = "5s")]
    browser_delay: HumanDuration,
    /// Send every request through the browser
    #[arg(long)]
    force_browser: bool,
}

impl FetchArgs {
    fn settings(&self) -> CrawlSettings {
        let mut profile = SiteProfile::default();
        if let Some(root_url) = &self.root_url {
            profile.root_url = root_url.clone();
        }
        CrawlSettings {
            fetch: FetchConfig {
                http_delay: self.http_delay.0,
                browser_delay: self.browser_delay.0,
                ..FetchConfig::default()
            },
            profile,
            force_automation: self.force_browser,
        }
    }
}

#[derive(Args, Debug, Clone)]
struct CleanArgs {
    /// Directory of raw records (defaults to <data-dir>/json)
    #[arg(long)]
    input: Option<PathBuf>,
    /// Directory for cleaned records and the summary
    #[arg(long, default_value = "cleaned_data")]
    output: PathBuf,
    /// TOML boilerplate rule table (defaults to the built-in table)
    #[arg(long)]
    rules: Option<PathBuf>,
}

async fn build_crawler(data_dir: &Path, fetch: &FetchArgs) -> anyhow::Result<Crawler> {
    let settings = fetch.settings();
    let storage = FileStorage::new(DataLayout::new(data_dir))
        .await
        .with_context(|| format!("Failed to prepare {}", data_dir.display()))?;
    let http = ReqwestBackend::new(&settings.fetch)?;
    let launcher = ChromiumLauncher::new(&settings.fetch);

    Ok(Crawler::new(
        Arc::new(http),
        Arc::new(launcher),
        Arc::new(storage),
        settings,
    ))
}

async fn crawl(data_dir: &Path, fetch: &FetchArgs) -> anyhow::Result<()> {
    let crawler = build_crawler(data_dir, fetch).await?;
    let (results, stats) = crawler.run().await?;
    info!(
        "🦗 Processed {} links ({} successful)",
        results.len(),
        stats.success
    );
    Ok(())
}

async fn clean(data_dir: &Path, args: &CleanArgs) -> anyhow::Result<CleaningSummary> {
    let rules = match &args.rules {
        Some(path) => CleaningRules::load(path).await?,
        None => CleaningRules::default(),
    };
    let cleaner = TextCleaner::new(&rules)?;
    info!(
        "🧹 Cleaning with rule table v{} ({} patterns)",
        cleaner.version(),
        cleaner.rule_count()
    );

    let input = args
        .input
        .clone()
        .unwrap_or_else(|| DataLayout::new(data_dir).json_dir());
    let store = CleanedStore::new(&args.output).await?;
    let summary = BatchCleaner::new(RecordCleaner::new(cleaner))
        .clean_dir(&input, &store)
        .await
        .with_context(|| format!("Failed to clean {}", input.display()))?;
    Ok(summary)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Crawl { fetch } => crawl(&cli.data_dir, &fetch).await?,
        Commands::Url { url, fetch } => {
            info!("Processing single URL: {}", url);
            let crawler = build_crawler(&cli.data_dir, &fetch).await?;
            let result = crawler.process_one(&url).await?;
            info!("{} → {:?}", result.url, result.status);
        }
        Commands::Clean { clean: args } => {
            clean(&cli.data_dir, &args).await?;
        }
        Commands::Run { fetch, clean: args } => {
            crawl(&cli.data_dir, &fetch).await?;
            clean(&cli.data_dir, &args).await?;
        }
    }

    Ok(())
}
