mod cli;
mod report;

use clap::Parser;
use cli::{Cli, Command};
use std::sync::Arc;
use storyjudge_core::application::read_story_ids;
use storyjudge_core::config::ProcessEnv;
use storyjudge_core::repository::{
    CriterionRepository, FileCriterionRepository, FileStoryRepository, FileTrialRepository,
    StoryDataRepository, TrialRepository,
};
use storyjudge_core::{
    AppConfig, Analyzer, CancellationToken, EvaluationRunner, Evaluator, ModelFactory,
};
use thiserror::Error;
use tracing::{debug, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Debug, Error)]
enum CliError {
    #[error("batch incomplete: {failed} failed ({ids}), {skipped} skipped")]
    BatchIncomplete {
        failed: usize,
        ids: String,
        skipped: usize,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let cli = Cli::parse();
    debug!(command = ?cli.command, config = ?cli.config, "CLI arguments parsed");
    run(cli).await
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load(cli.config.as_deref())?;
    info!(
        data_dir = %config.data_dir.display(),
        default_model = config.default_model.as_str(),
        "Loaded configuration"
    );

    let cancel = CancellationToken::new();
    spawn_interrupt_handler(cancel.clone());

    let criteria: Arc<dyn CriterionRepository> =
        Arc::new(FileCriterionRepository::new(&config.data_dir));
    let stories: Arc<dyn StoryDataRepository> =
        Arc::new(FileStoryRepository::new(&config.data_dir));
    let trials: Arc<dyn TrialRepository> = Arc::new(FileTrialRepository::new(&config.data_dir));

    match cli.command {
        Command::Evaluate {
            story_id,
            trial_id,
            model,
        } => {
            let runner = build_runner(&config, model, &cancel, criteria, stories, trials)?;
            let results = runner.run(&story_id, &trial_id).await?;
            print!("{}", report::render_trials(&story_id, &results));
        }
        Command::Batch {
            story_ids_file,
            trial_id,
            model,
        } => {
            let story_ids = read_story_ids(&story_ids_file)?;
            info!(
                path = %story_ids_file.display(),
                stories = story_ids.len(),
                "Loaded story ids"
            );
            let runner = build_runner(&config, model, &cancel, criteria, stories, trials)?;
            let outcome = runner.run_batch(&story_ids, &trial_id, &cancel).await;
            print!("{}", report::render_batch(&outcome));
            if !outcome.is_success() {
                return Err(CliError::BatchIncomplete {
                    failed: outcome.failed.len(),
                    ids: outcome.failed_ids().join(", "),
                    skipped: outcome.skipped.len(),
                }
                .into());
            }
        }
        Command::Analyze { story_id, trial_id } => {
            let summary = Analyzer::new(criteria, trials).run(&story_id, &trial_id)?;
            print!("{}", report::render_summary(&story_id, &summary));
        }
    }
    info!("Command finished");
    Ok(())
}

fn build_runner(
    config: &AppConfig,
    model: Option<String>,
    cancel: &CancellationToken,
    criteria: Arc<dyn CriterionRepository>,
    stories: Arc<dyn StoryDataRepository>,
    trials: Arc<dyn TrialRepository>,
) -> Result<EvaluationRunner, Box<dyn std::error::Error>> {
    let model_name = model.unwrap_or_else(|| config.default_model.clone());
    let factory = ModelFactory::new(config.clone(), Arc::new(ProcessEnv))
        .with_cancellation(cancel.clone());
    let judge = factory.resolve(&model_name)?;

    let evaluator = Evaluator::new(judge)
        .with_max_concurrency(config.max_concurrency)
        .with_cancellation(cancel.clone());
    Ok(EvaluationRunner::new(evaluator, criteria, stories, trials))
}

fn spawn_interrupt_handler(cancel: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, cancelling after the current request");
            cancel.cancel();
        }
    });
}

fn init_tracing() {
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_level(true)
            .with_writer(std::io::stderr)
            .init();
    });
}
