//! teen-crawler CLI
//!
//! Single batch run: search every configured subreddit, classify and write
//! one CSV table.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use teen_crawler::{
    api::{Credentials, RedditClient},
    error::Result,
    models::Config,
    pipeline::{self, CrawlPlan},
    storage::LocalStorage,
};

/// teen-crawler - sensitive-topic dataset crawler
#[derive(Parser, Debug)]
#[command(
    name = "teen-crawler",
    version,
    about = "Collects sensitive-topic subreddit posts written by minors"
)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Crawl all configured subreddits and write the output table
    Crawl {
        /// Output CSV path (default: output.path from config)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Crawl only these subreddits (repeatable)
        #[arg(long = "forum")]
        forums: Vec<String>,
    },

    /// Validate configuration, taxonomy and patterns
    Validate,

    /// Print the search query chunks that a crawl would issue
    Chunks,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Ok(path) = dotenvy::dotenv() {
        log::debug!("Loaded environment from {}", path.display());
    }

    let mut config = Config::load_or_default(&cli.config)
        .inspect_err(|e| log::error!("Config load failed from {}: {}", cli.config.display(), e))?;
    log::info!("Loaded configuration from {}", cli.config.display());

    match cli.command {
        Command::Crawl { output, forums } => {
            if let Some(path) = output {
                config.output.path = path.display().to_string();
            }
            if !forums.is_empty() {
                config.forums = forums;
            }

            // Fail on configuration before any network work starts.
            CrawlPlan::build(&config)?;
            let credentials = Credentials::from_env()?;
            let client = RedditClient::new(&config.api, credentials)?;
            let storage = LocalStorage::new(&config.output.path);

            let stats = pipeline::run_crawler(&config, &client, &storage).await?;

            let elapsed = stats.end_time - stats.start_time;
            log::info!(
                "Crawl complete: {} forum(s), {} candidate(s), {} row(s) in {}s",
                stats.forum_count,
                stats.candidate_count,
                stats.row_count,
                elapsed.num_seconds()
            );
            if let Some(location) = &stats.output_location {
                log::info!("Output: {}", location);
            }
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            let plan = match CrawlPlan::build(&config) {
                Ok(plan) => plan,
                Err(e) => {
                    log::error!("Config validation failed: {}", e);
                    return Err(e);
                }
            };
            let taxonomy = plan.classifier.taxonomy();
            log::info!("✓ {} forum(s)", config.forums.len());
            log::info!(
                "✓ {} theme(s), {} distinct keyword(s)",
                taxonomy.themes().len(),
                taxonomy.keywords().len()
            );
            for theme in taxonomy.themes() {
                log::info!("  {}: {} keyword(s)", theme.name(), theme.patterns().len());
            }
            log::info!(
                "✓ {} query chunk(s) at {} chars",
                plan.chunks.len(),
                config.crawler.chunk_max_len
            );
            log::info!(
                "✓ Age range {}-{}, {} youth phrase(s)",
                config.classifier.min_age,
                config.classifier.max_age,
                config.classifier.youth_phrases.len()
            );

            log::info!("All validations passed!");
        }

        Command::Chunks => {
            let plan = CrawlPlan::build(&config)?;
            for (i, chunk) in plan.chunks.iter().enumerate() {
                println!(
                    "#{:<3} [{} keywords, {} chars] {}",
                    i + 1,
                    chunk.keywords().len(),
                    chunk.len(),
                    chunk
                );
            }
        }
    }

    Ok(())
}
