use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing::{error, info};

use cricbuzz_scraper::{
    config::ScraperConfig,
    display,
    fetcher::HttpFetcher,
    match_scraper::MatchScraper,
    squad_scraper::SquadScraper,
    store::Store,
};

#[derive(Debug, Parser)]
#[command(author, version, about = "Scrapes international cricket results and squads from Cricbuzz", long_about = None)]
struct Cli {
    /// Database URL, overrides DATABASE_URL
    #[arg(long, global = true)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Discover recent international matches and replace the stored results
    Matches,
    /// Store squads and player profiles for the given matches
    Squads {
        /// Match id to process (repeatable); defaults to SQUAD_MATCH_IDS
        #[arg(short, long = "match-id")]
        match_ids: Vec<String>,
        /// Use the match ids currently in the matches table
        #[arg(long, conflicts_with = "match_ids")]
        from_store: bool,
    },
    /// Scrape matches, then squads for every accepted match
    Run,
    /// Print the stored matches
    Show {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Drop and recreate all tables
    Reset,
}

async fn run_matches(fetcher: Arc<HttpFetcher>, store: &Store, config: &ScraperConfig) -> Result<Vec<String>> {
    let scraper = MatchScraper::new(fetcher, config);
    let report = scraper.run(store).await?;
    print!("{}", display::matches_table(&report.accepted));
    println!("{}", display::match_summary(&report));
    Ok(report.accepted.into_iter().map(|m| m.match_id).collect())
}

async fn run_squads(
    fetcher: Arc<HttpFetcher>,
    store: &Store,
    config: &ScraperConfig,
    match_ids: &[String],
) -> Result<()> {
    let scraper = SquadScraper::new(fetcher, config);
    let report = scraper.run(store, match_ids).await?;
    println!("{}", display::squad_summary(&report));
    Ok(())
}

async fn execute(cli: Cli, config: ScraperConfig) -> Result<()> {
    let store = Store::connect(&config.database.url)
        .await
        .with_context(|| format!("Failed to open database {}", config.database.url))?;
    let fetcher = Arc::new(HttpFetcher::new(&config)?);

    match cli.command {
        Commands::Matches => {
            run_matches(fetcher.clone(), &store, &config).await?;
        }
        Commands::Squads { match_ids, from_store } => {
            let match_ids = if from_store {
                store.match_ids().await?
            } else if match_ids.is_empty() {
                config.squad_match_ids.clone()
            } else {
                match_ids
            };
            run_squads(fetcher.clone(), &store, &config, &match_ids).await?;
        }
        Commands::Run => {
            let accepted = run_matches(fetcher.clone(), &store, &config).await?;
            run_squads(fetcher.clone(), &store, &config, &accepted).await?;
        }
        Commands::Show { json } => {
            let matches = store.matches().await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&matches)?);
            } else {
                print!("{}", display::matches_table(&matches));
            }
        }
        Commands::Reset => {
            store.reset_schema().await?;
            println!("Database reset");
        }
    }

    let metrics = fetcher.metrics().get_metrics();
    if metrics.total_requests > 0 {
        println!("{}", display::fetch_summary(&metrics));
    }
    store.close().await;
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let mut config = ScraperConfig::from_env();
    if let Some(url) = &cli.database_url {
        config.database.url = url.clone();
    }
    info!("Using database {}", config.database.url);

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(execute(cli, config)).map_err(|e| {
        error!("{:#}", e);
        e
    })
}
