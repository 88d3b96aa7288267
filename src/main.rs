mod catalog;
mod config;
mod crawler;
mod db;
mod doubleheader;
mod fetch;
mod notify;
mod parse;
mod record;
mod sink;

use std::time::Instant;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};

use crate::catalog::ReferenceCatalog;
use crate::config::Config;
use crate::fetch::SeasonKind;
use crate::sink::MatchSink;

#[derive(Parser)]
#[command(name = "kbo_crawler", about = "KBO match schedule crawler")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum SinkArg {
    /// POST records to the backend schedule endpoint
    Http,
    /// Write records into the local SQLite store
    Store,
}

#[derive(Subcommand)]
enum Commands {
    /// Crawl the full season (regular + postseason) and persist every match
    Run {
        /// Season year (default: current year)
        #[arg(short, long)]
        year: Option<i32>,
        #[arg(long, value_enum, default_value = "store")]
        sink: SinkArg,
    },
    /// Crawl a single month
    Month {
        /// Season year (default: current year)
        #[arg(short, long)]
        year: Option<i32>,
        /// Month to crawl, 1-12
        #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..=12))]
        month: u32,
        /// Query the postseason series instead of the regular season
        #[arg(long)]
        post: bool,
        #[arg(long, value_enum, default_value = "store")]
        sink: SinkArg,
    },
    /// Load and print the reference catalog
    Catalog,
    /// Local store statistics
    Stats,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let config = Config::from_env()?;

    let result = match cli.command {
        Commands::Run { year, sink } => {
            let client = http_client()?;
            let year = year.unwrap_or_else(config::default_season_year);
            let catalog = load_catalog_or_notify(&client, &config).await?;
            let sink = build_sink(&client, &config, year, sink)?;
            let summary = crawler::run(&client, &catalog, &sink, &config, year).await?;
            summary.print();
            Ok(())
        }
        Commands::Month {
            year,
            month,
            post,
            sink,
        } => {
            let client = http_client()?;
            let year = year.unwrap_or_else(config::default_season_year);
            let kind = if post {
                SeasonKind::Post
            } else {
                SeasonKind::Regular
            };
            let catalog = ReferenceCatalog::load(&client, &config).await?;
            let sink = build_sink(&client, &config, year, sink)?;
            let stats = crawler::crawl_month(&client, &catalog, &sink, year, month, kind).await?;
            println!(
                "{} {}-{:02}: {} saved, {} skipped, {} persist errors",
                kind.label(),
                year,
                month,
                stats.saved,
                stats.skipped,
                stats.persist_errors
            );
            Ok(())
        }
        Commands::Catalog => {
            let client = http_client()?;
            let catalog = ReferenceCatalog::load(&client, &config).await?;

            println!("{:>4} | {}", "ID", "Team");
            println!("{}", "-".repeat(24));
            for (name, id) in catalog.team_list() {
                println!("{id:>4} | {name}");
            }

            println!("\n{:>4} | {}", "ID", "Stadium");
            println!("{}", "-".repeat(24));
            for (name, id) in catalog.stadium_list() {
                println!("{id:>4} | {name}");
            }
            Ok(())
        }
        Commands::Stats => {
            let conn = db::connect(&config.db_path)?;
            db::init_schema(&conn)?;
            let s = db::get_stats(&conn)?;
            println!("Matches:       {}", s.total);
            println!("Played:        {}", s.played);
            println!("Scheduled:     {}", s.scheduled);
            println!("Doubleheaders: {}", s.doubleheaders);
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {:.1}s", elapsed.as_secs_f64());
    }

    result
}

fn http_client() -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(30))
        .build()?)
}

fn build_sink(
    client: &reqwest::Client,
    config: &Config,
    year: i32,
    arg: SinkArg,
) -> Result<MatchSink> {
    match arg {
        SinkArg::Http => MatchSink::http(client.clone(), config, year),
        SinkArg::Store => MatchSink::store(config),
    }
}

/// A run that cannot even load its reference data still tells the webhook
/// before bailing out.
async fn load_catalog_or_notify(
    client: &reqwest::Client,
    config: &Config,
) -> Result<ReferenceCatalog> {
    match ReferenceCatalog::load(client, config).await {
        Ok(catalog) => Ok(catalog),
        Err(e) => {
            notify::notify(
                client,
                config.webhook_url.as_deref(),
                &format!("KBO schedule crawl failed before starting: {e:#}"),
            )
            .await;
            Err(e)
        }
    }
}
