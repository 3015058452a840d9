use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use resume_analyzer::cli::{depth_override, Cli, Commands};
use resume_analyzer::config::Config;
use resume_analyzer::export::{export_json, render_markdown};
use resume_analyzer::extraction::{self, GeminiClient};
use resume_analyzer::parser::ResponseParser;
use resume_analyzer::pipeline::Analyzer;
use resume_analyzer::store::{JsonFileStorage, ResumeStore};
use resume_analyzer::AnalyzerError;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("resume_analyzer={}", &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting resume analyzer v{}", env!("CARGO_PKG_VERSION"));

    // Fail before touching the store if the command cannot run at all.
    let api_key = if cli.command.needs_api_key() {
        Some(config.require_api_key()?)
    } else {
        None
    };

    let mut store = ResumeStore::open(JsonFileStorage::new(&config.store_dir))
        .with_context(|| format!("Could not open store in {}", config.store_dir.display()))?;
    info!("Loaded {} stored resumes", store.list().len());

    match cli.command {
        Commands::Analyze {
            basic,
            detailed,
            files,
        } => {
            let client = GeminiClient::new(api_key.unwrap_or_default())?;
            info!("Extraction client initialized (model: {})", extraction::MODEL);
            let analyzer = Analyzer::new(
                client,
                depth_override(basic, detailed).unwrap_or(config.analysis_depth),
                ResponseParser::new(config.aggressive_repair),
            );

            let mut failures = 0usize;
            for file in &files {
                let outcome = match analyzer.analyze_file(file).await {
                    Ok(completed) => analyzer.commit(completed, &mut store),
                    Err(e) => Err(e),
                };
                match outcome {
                    Ok(Some(record)) => info!(
                        "{} scored {}/100 (id {})",
                        file.display(),
                        record.score,
                        record.id
                    ),
                    Ok(None) => warn!("{}: result superseded, not stored", file.display()),
                    Err(e) => {
                        failures += 1;
                        eprintln!("{}: {}", file.display(), e.user_message());
                    }
                }
            }

            info!("Highest score so far: {}/100", store.highest_score());
            for record in store.recent() {
                info!(
                    "Recent: {} {} ({}/100)",
                    record.analyzed_at.format("%Y-%m-%d %H:%M"),
                    record.analysis.candidate_name().unwrap_or("Unknown"),
                    record.score
                );
            }
            println!("{}", serde_json::to_string_pretty(store.analytics())?);
            if failures > 0 {
                bail!("{failures} of {} files could not be analyzed", files.len());
            }
        }
        Commands::Check => {
            let client = GeminiClient::new(api_key.unwrap_or_default())?;
            if let Err(e) = client.check_credentials().await {
                let message = AnalyzerError::from(e).user_message();
                bail!("API key check failed: {message}");
            }
            println!("API key is valid.");
        }
        Commands::ExportMd { id } => {
            let record = store.get(id).with_context(|| format!("No resume with id {id}"))?;
            print!("{}", render_markdown(record));
        }
        Commands::ExportJson { id } => {
            let record = store.get(id).with_context(|| format!("No resume with id {id}"))?;
            println!("{}", serde_json::to_string_pretty(&export_json(record)?)?);
        }
        Commands::Remove { id } => match store.remove(id) {
            Ok(Some(_)) => info!("Removed {id}"),
            Ok(None) => warn!("No resume with id {id}"),
            Err(e) => {
                error!("Failed to remove {id}: {e}");
                return Err(e.into());
            }
        },
        Commands::Clear => {
            store.clear()?;
            info!("Cleared all stored resumes");
        }
    }

    Ok(())
}
