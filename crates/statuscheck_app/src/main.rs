mod app;
mod effects;
mod persistence;
mod render;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use engine_logging::{engine_info, LogDestination, DEFAULT_LOG_FILE};
use log::LevelFilter;
use statuscheck_core::{
    CompanyFields, CompanyId, CompanyRecord, Msg, RunStatus, BATCH_SIZE, INTER_BATCH_DELAY,
};
use statuscheck_engine::{
    ClientSettings, EngineHandle, GeminiClient, SchedulerSettings, DEFAULT_MODEL, EXPORT_FILENAME,
};

use app::App;
use effects::EffectRunner;

/// Checks whether companies are still operating, using a search-grounded
/// language model.
#[derive(Debug, Parser)]
#[command(name = "statuscheck", version)]
struct Cli {
    /// Directory holding the pending queue file.
    #[arg(long, global = true, env = "STATUSCHECK_STATE_DIR", default_value = ".")]
    state_dir: PathBuf,

    #[arg(long, global = true, value_enum, default_value_t = LogTarget::File)]
    log: LogTarget,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogTarget {
    Terminal,
    File,
    Both,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Queue a single company.
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        location: String,
        #[arg(long, default_value = "")]
        website: String,
    },
    /// Queue every valid row of a CSV file with name, location and optional website columns.
    Import { file: PathBuf },
    /// Remove a queued company by id.
    Remove { id: String },
    /// Show the queue.
    List,
    /// Empty the queue.
    Clear,
    /// Analyze the queue and export the results as CSV.
    Analyze(AnalyzeArgs),
}

#[derive(Debug, Args)]
struct AnalyzeArgs {
    #[arg(long, default_value = EXPORT_FILENAME)]
    output: PathBuf,
    /// Falls back to `API_KEY` when `GEMINI_API_KEY` is unset.
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,
    #[arg(long, env = "STATUSCHECK_MODEL", default_value = DEFAULT_MODEL)]
    model: String,
    #[arg(long, default_value_t = BATCH_SIZE)]
    batch_size: usize,
    #[arg(long, default_value_t = INTER_BATCH_DELAY.as_secs())]
    delay_secs: u64,
}

fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    init_logging(cli.log);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(target: LogTarget) {
    let file = PathBuf::from(DEFAULT_LOG_FILE);
    let destination = match target {
        LogTarget::Terminal => LogDestination::Terminal,
        LogTarget::File => LogDestination::File(file),
        LogTarget::Both => LogDestination::Both(file),
    };
    engine_logging::initialize(destination, LevelFilter::Info);
}

fn run(cli: Cli) -> Result<()> {
    let state_dir = cli.state_dir;
    let queue = persistence::load_queue(&state_dir)?;

    match cli.command {
        Command::Add {
            name,
            location,
            website,
        } => {
            let mut app = open(&state_dir, queue, EffectRunner::for_queue(&state_dir))?;
            let before = app.view().queue.len();
            app.dispatch(Msg::CompanySubmitted(CompanyFields::new(name, website, location)))?;
            let view = app.view();
            if view.queue.len() == before {
                bail!(render::input_error_lines(&view).join(" "));
            }
            if let Some(added) = view.queue.last() {
                println!("Queued {} ({})", added.name, added.id);
            }
        }
        Command::Import { file } => {
            let raw =
                std::fs::read_to_string(&file).with_context(|| format!("reading {file:?}"))?;
            let mut app = open(&state_dir, queue, EffectRunner::for_queue(&state_dir))?;
            let before = app.view().queue.len();
            app.dispatch(Msg::BulkUploaded(raw))?;
            let view = app.view();
            let errors = render::input_error_lines(&view);
            if !errors.is_empty() {
                bail!(errors.join(" "));
            }
            println!(
                "Queued {} companies from {}",
                view.queue.len() - before,
                file.display()
            );
        }
        Command::Remove { id } => {
            let mut app = open(&state_dir, queue, EffectRunner::for_queue(&state_dir))?;
            if app.dispatch(Msg::CompanyRemoved(CompanyId::from(id.as_str())))?.is_none() {
                bail!("no queued company with id {id}");
            }
            println!("Removed {id}");
        }
        Command::List => {
            let app = open(&state_dir, queue, EffectRunner::for_queue(&state_dir))?;
            for line in render::queue_lines(&app.view()) {
                println!("{line}");
            }
        }
        Command::Clear => {
            persistence::save_queue(&state_dir, &[])?;
            println!("Cleared {} queued companies", queue.len());
        }
        Command::Analyze(args) => analyze(&state_dir, queue, args)?,
    }
    Ok(())
}

/// Builds an [`App`] around the saved queue.
fn open(state_dir: &Path, queue: Vec<CompanyRecord>, effects: EffectRunner) -> Result<App> {
    let mut app = App::new(effects);
    app.dispatch(Msg::RestoreQueue(queue))
        .with_context(|| format!("restoring queue from {state_dir:?}"))?;
    Ok(app)
}

fn analyze(state_dir: &Path, queue: Vec<CompanyRecord>, args: AnalyzeArgs) -> Result<()> {
    let api_key = args
        .api_key
        .or_else(|| std::env::var("API_KEY").ok())
        .unwrap_or_default();
    let mut settings = ClientSettings::new(api_key);
    settings.model = args.model;
    let client = GeminiClient::new(settings).context("configuring analysis client")?;
    engine_info!("Using endpoint {}", client.endpoint());

    let engine = EngineHandle::new(
        Arc::new(client),
        SchedulerSettings {
            batch_size: args.batch_size,
            inter_batch_delay: Duration::from_secs(args.delay_secs),
        },
    );
    engine.cancel_on_interrupt();
    let effects = EffectRunner::new(state_dir.to_path_buf(), args.output).with_engine(engine);
    let mut app = open(state_dir, queue, effects)?;

    let outcome = app.run_analysis()?;
    app.dispatch(Msg::ExportClicked)?;

    for line in render::results_lines(&app.view()) {
        println!("{line}");
    }
    if let Some(export) = app.effects().last_export() {
        println!(
            "Exported {} results to {}",
            export.rows,
            export.output_path.display()
        );
    }

    match outcome {
        RunStatus::Completed => Ok(()),
        RunStatus::Cancelled => bail!("analysis cancelled"),
        RunStatus::Failed | RunStatus::Idle | RunStatus::Running => {
            bail!("analysis did not complete")
        }
    }
}
