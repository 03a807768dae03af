use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use ai_client::{OpenAi, Provider};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use mediascreen_archive::{GoogleSearchClient, HttpArticleExtractor};
use mediascreen_common::{load_config, Entity, FileConfig, ScreeningReport, Secrets};
use mediascreen_scout::io::{
    read_candidates, read_entities, write_candidates, write_report,
};
use mediascreen_scout::{
    classify_stage, search_stage, EntityScreener, LogProgress, ScreeningOrchestrator,
    VerdictClassifier,
};

#[derive(Parser)]
#[command(name = "mediascreen", about = "Adverse media screening for named entities")]
struct Cli {
    /// Path to config TOML file
    #[arg(long, global = true, default_value = "./config/mediascreen.toml")]
    config: PathBuf,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Search and classify in one run
    Screen {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        output: PathBuf,
        /// Also write the ranked candidates here
        #[arg(long)]
        candidates: Option<PathBuf>,
    },
    /// Search stage only: entities in, ranked candidates out
    Search {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        output: PathBuf,
    },
    /// Classification stage only: candidates in, report out
    Classify {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        output: PathBuf,
    },
}

fn init_tracing(json: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("mediascreen=info"))?;
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
    Ok(())
}

fn build_screener(config: &FileConfig, secrets: &Secrets) -> Result<EntityScreener> {
    let (api_key, cx) = secrets.search_credentials()?;
    let client = GoogleSearchClient::new(
        api_key,
        cx,
        &config.search.endpoint,
        Duration::from_secs(config.search.timeout_secs),
    )?;
    Ok(EntityScreener::from_config(Arc::new(client), &config.search))
}

fn build_classifier(
    config: &FileConfig,
    provider: Provider,
    secrets: &Secrets,
) -> Result<VerdictClassifier> {
    let cfg = &config.classifier;
    let mut model = OpenAi::for_provider(provider, secrets.model_api_key()?, &cfg.model)
        .with_timeout(Duration::from_secs(cfg.model_timeout_secs));
    if let Some(url) = &cfg.base_url {
        model = model.with_base_url(url);
    }
    info!(model = model.model(), base_url = model.base_url(), "Language model configured");

    let extractor = HttpArticleExtractor::new(Duration::from_secs(cfg.fetch_timeout_secs))?;
    Ok(VerdictClassifier::from_config(
        Arc::new(extractor),
        Arc::new(model),
        cfg,
    ))
}

fn finish(output: &Path, report: &ScreeningReport) -> Result<()> {
    if report.is_empty() {
        warn!("No valid results");
    }
    write_report(output, &report.verdicts)
        .with_context(|| format!("Failed to write report to {}", output.display()))?;
    println!("{}", report.summary());
    Ok(())
}

fn entities_from(path: &Path, config: &FileConfig) -> Result<Vec<Entity>> {
    read_entities(path, &config.input.entity_column)
        .with_context(|| format!("Failed to read entities from {}", path.display()))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.json)?;

    let config = load_config(&cli.config)?;
    let provider: Provider = config.classifier.provider.parse()?;
    let secrets = Secrets::from_env(provider.api_key_var());

    match cli.command {
        Command::Screen {
            input,
            output,
            candidates,
        } => {
            let entities = entities_from(&input, &config)?;
            let screener = build_screener(&config, &secrets)?;
            let classifier = build_classifier(&config, provider, &secrets)?;

            let report = match candidates {
                Some(path) => {
                    let found = search_stage(&screener, &entities).await;
                    write_candidates(&path, &found)?;
                    let mut report = classify_stage(&classifier, &found, &mut LogProgress).await;
                    report.entities_processed = entities.len();
                    report
                }
                None => {
                    ScreeningOrchestrator::new(screener, classifier)
                        .run(&entities, &mut LogProgress)
                        .await
                }
            };

            finish(&output, &report)?;
        }
        Command::Search { input, output } => {
            let entities = entities_from(&input, &config)?;
            let screener = build_screener(&config, &secrets)?;

            let found = search_stage(&screener, &entities).await;
            write_candidates(&output, &found)?;
            println!(
                "Entities processed: {} | Articles retrieved: {}",
                entities.len(),
                found.len()
            );
        }
        Command::Classify { input, output } => {
            let candidates = read_candidates(&input)
                .with_context(|| format!("Failed to read candidates from {}", input.display()))?;
            let classifier = build_classifier(&config, provider, &secrets)?;

            let report = classify_stage(&classifier, &candidates, &mut LogProgress).await;
            finish(&output, &report)?;
        }
    }

    Ok(())
}
