use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use wayfinder_core::file_config::{config_dir, load_config, load_toml_value};
use wayfinder_core::{AppConfig, ContentEntry, Dataset, FileConfig, PromptRegistry};
use wayfinder_search::{FunctionCallInterpreter, SearchPipeline, SearchSession, SearchView};

/// Search term used when none is given.
const DEFAULT_TERM: &str = "nature";

#[derive(Parser)]
#[command(name = "wayfinder")]
#[command(about = "Natural-language search over the Wayfinder catalog")]
#[command(version)]
struct Cli {
    /// Path to the TOML config file
    #[arg(long, global = true, env = "WAYFINDER_CONFIG", default_value = "config/wayfinder.toml")]
    config: PathBuf,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one natural-language search and print the matching entries
    Search {
        /// Free-text search phrase
        #[arg(default_value = DEFAULT_TERM)]
        term: String,

        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the keyword allow-list
    Keywords,

    /// Print the location table
    Locations,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Before clap, so `.env` can supply WAYFINDER_CONFIG.
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    if let Err(e) = init_tracing(cli.json_logs) {
        eprintln!("Error: {:#}", e);
        return ExitCode::from(1);
    }

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(1)
        }
    }
}

fn init_tracing(json: bool) -> Result<()> {
    let filter = EnvFilter::from_default_env()
        .add_directive("wayfinder=info".parse()?)
        .add_directive("ai_client=info".parse()?);

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
    Ok(())
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let file_config = load_config(&cli.config)?;
    let dir = config_dir(&cli.config);
    let dataset = Dataset::load(&dir.join(&file_config.data.dataset))
        .with_context(|| format!("Failed to load dataset for {}", cli.config.display()))?;

    match cli.command {
        Commands::Search { term, json } => {
            cmd_search(&cli.config, &dir, &file_config, &dataset, term, json).await
        }
        Commands::Keywords => {
            for keyword in dataset.registry.iter() {
                println!("{keyword}");
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Locations => {
            for location in dataset.locations.iter() {
                println!(
                    "{:<14} {:<16} {:?}  ({:.4}, {:.4})  zoom {}",
                    location.key,
                    location.name,
                    location.location_type,
                    location.center.lat,
                    location.center.lng,
                    location.zoom
                );
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn cmd_search(
    config_path: &Path,
    dir: &Path,
    file_config: &FileConfig,
    dataset: &Dataset,
    term: String,
    json: bool,
) -> Result<ExitCode> {
    let app_config = AppConfig::from_env()?.with_config_path(config_path);
    let toml_value = load_toml_value(config_path)?;
    let prompts = Arc::new(PromptRegistry::load(file_config, dir, &toml_value)?);

    let interpreter = FunctionCallInterpreter::from_config(
        &app_config,
        file_config,
        dataset.registry.clone(),
        prompts,
    );
    let pipeline = SearchPipeline::from_dataset(Arc::new(interpreter), dataset);
    let session = SearchSession::new(Arc::new(pipeline));

    info!(
        region = %file_config.identity.region,
        term = %term,
        "Searching"
    );
    let view = session.search(term).await;

    if let Some(err) = &view.error {
        eprintln!("Search failed: {err}");
        return Ok(ExitCode::from(2));
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&view.results)?);
    } else {
        print_results(&view, dataset);
    }
    Ok(ExitCode::SUCCESS)
}

fn print_results(view: &SearchView, dataset: &Dataset) {
    if view.results.is_empty() {
        println!("No matching entries.");
        return;
    }

    for entry in &view.results {
        println!("{}", describe(entry, dataset));
        if !entry.summary.is_empty() {
            println!("    {}", entry.summary);
        }
    }
}

fn describe(entry: &ContentEntry, dataset: &Dataset) -> String {
    let place = entry
        .location
        .as_deref()
        .and_then(|key| dataset.locations.get(key))
        .map(|l| format!(" @ {}", l.name))
        .unwrap_or_default();

    format!(
        "#{:<4} {}{}  [{}]",
        entry.id,
        entry.title,
        place,
        entry.keywords.join(", ")
    )
}
