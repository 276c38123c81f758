use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use desglose_core::{
    FileRef, Navigator, Processor, SimulatedProcessor, UploadBatch, navigate_on_completion,
};
use desglose_finance::{StatementProcessor, process_statement_text};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod config;
mod picker;
mod render;
mod report_view;
mod state;

use config::{Config, config_path, init_config, load_config};
use picker::FilePicker;
use report_view::{ReportNavigator, SummaryNavigator, render_report};

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("DESGLOSE_BUILD_SHA"),
    ")"
);

#[derive(Parser, Debug)]
#[command(
    name = "desglose",
    version,
    long_version = LONG_VERSION,
    about = "Credit-card statement breakdown: expenses, installments and projections"
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Data directory (default: ~/.desglose)
    #[arg(long, global = true)]
    home: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Upload statements and process them one after another
    Process {
        /// Statement files (extracted text; PDFs are accepted but need extraction)
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Preview the upload flow with simulated progress and failures
        #[arg(long)]
        simulate: bool,

        /// Simulated failure probability (overrides config)
        #[arg(long, requires = "simulate")]
        failure_rate: Option<f64>,

        /// Seed for reproducible simulated failures
        #[arg(long, requires = "simulate")]
        seed: Option<u64>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Parse one statement's extracted text and print its report
    Parse {
        file: PathBuf,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage ~/.desglose/config.toml
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write the default config if none exists
    Init,
    /// Print the effective config
    Show,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("info")
        } else {
            EnvFilter::new("warn")
        }
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let home = state::resolve_home(cli.home.as_deref())?;

    match cli.command {
        Command::Process {
            files,
            simulate,
            failure_rate,
            seed,
            json,
        } => {
            let cfg = load_config(&home)?;
            process(&cfg, &files, simulate, failure_rate, seed, json).await?;
        }

        Command::Parse { file, json } => {
            let cfg = load_config(&home)?;
            parse(&cfg, &file, json)?;
        }

        Command::Config { command } => match command {
            ConfigCommand::Init => init_config(&home)?,
            ConfigCommand::Show => {
                let cfg = load_config(&home)?;
                println!("# {}\n", config_path(&home).display());
                print!("{}", toml::to_string_pretty(&cfg).context("serialize config")?);
            }
        },
    }

    Ok(())
}

async fn process(
    cfg: &Config,
    paths: &[PathBuf],
    simulate: bool,
    failure_rate: Option<f64>,
    seed: Option<u64>,
    json: bool,
) -> Result<()> {
    let picker = FilePicker::new(&cfg.upload.extensions, cfg.max_file_bytes());
    let selection = picker.select(paths);
    for r in &selection.rejected {
        warn!(path = %r.path.display(), reason = %r.reason, "file not added");
        eprintln!("Skipping {}: {}", r.path.display(), r.reason);
    }
    if selection.accepted.is_empty() {
        bail!("no files to process");
    }

    if simulate {
        let mut settings = cfg.simulation_settings();
        if let Some(rate) = failure_rate {
            settings.failure_rate = rate;
        }
        let processor = match seed {
            Some(seed) => SimulatedProcessor::with_seed(settings, seed),
            None => SimulatedProcessor::new(settings),
        }
        .context("invalid simulation settings")?;

        let batch = UploadBatch::with_settings(processor, cfg.batch_settings());
        run_batch(&batch, selection.accepted, &mut SummaryNavigator, cfg.redirect_delay(), json)
            .await
    } else {
        let processor = StatementProcessor::new(cfg.category_rules());
        let batch = UploadBatch::with_settings(processor, cfg.batch_settings());
        let mut navigator = ReportNavigator::new(batch.clone(), json);
        run_batch(&batch, selection.accepted, &mut navigator, cfg.redirect_delay(), json).await?;
        if navigator.shown().is_none() {
            bail!("no statement could be processed");
        }
        Ok(())
    }
}

async fn run_batch<P: Processor, N: Navigator>(
    batch: &UploadBatch<P>,
    files: Vec<FileRef>,
    navigator: &mut N,
    redirect_delay: Duration,
    json: bool,
) -> Result<()> {
    batch.add_files(files);

    let view_updates = batch.subscribe();
    let mut nav_updates = batch.subscribe();
    let view = tokio::spawn(render::run_progress_view(
        view_updates,
        batch.snapshot(),
        json,
    ));

    let counts = batch
        .start_batch()
        .await
        .context("nothing pending to process")?;
    info!(
        completed = counts.completed,
        failed = counts.failed,
        "batch finished"
    );

    let last = view.await.context("progress view stopped unexpectedly")?;
    eprint!("\n{}", render::completion_banner(&last));

    navigate_on_completion(&mut nav_updates, navigator, redirect_delay).await;
    Ok(())
}

fn parse(cfg: &Config, file: &Path, json: bool) -> Result<()> {
    let text = std::fs::read_to_string(file).with_context(|| format!("read {}", file.display()))?;
    let report = process_statement_text(&text, &cfg.category_rules())
        .with_context(|| format!("parsing {}", file.display()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!(
            "Parsed {} expenses from {}",
            report.expenses.len(),
            file.display()
        );
        print!("{}", render_report(&report));
    }
    Ok(())
}
