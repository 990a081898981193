use anyhow::Context;
use clap::Parser;
use generator::profile::{build_scan_grid, write_batch, GeneratorConfig, ScanGeneratorConfig};
use std::path::PathBuf;
use tctcore::prelude::CancelFlag;
use tokio::runtime::Builder as TokioBuilder;
use tokio::signal;
use workflow::config::AnalysisCard;
use workflow::runner::Runner;

mod generator;
mod input;
mod output;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Transient-current waveform analysis driver")]
struct Args {
    /// Load an analysis card from YAML
    #[arg(long)]
    config: Option<PathBuf>,
    /// Measurement data folder to process
    #[arg(long)]
    data: Option<PathBuf>,
    /// Output folder for result documents
    #[arg(long, default_value = "results")]
    out: PathBuf,
    /// Generate a synthetic acquisition batch and run the pipeline on it
    #[arg(long, default_value_t = false)]
    offline: bool,
    /// Run the scan modules against a synthetic grid
    #[arg(long, default_value_t = false)]
    scan_demo: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let card = match args.config {
        Some(path) => AnalysisCard::load(path)?,
        None => AnalysisCard::default(),
    };

    let cancel = CancelFlag::new();
    spawn_cancel_watcher(cancel.clone());

    let runner = Runner::new(card, args.out.clone());

    if args.offline {
        let dir = tempfile::tempdir().context("creating offline data folder")?;
        let generated = write_batch(dir.path(), &GeneratorConfig::default())?;
        println!("Offline run -> {} synthetic acquisitions", generated);
        let summary = runner.run_measurements(dir.path(), &cancel)?;
        println!(
            "Offline run -> folders {}, canceled {}",
            summary.folders_processed, summary.canceled
        );
    }

    if args.scan_demo {
        let grid = build_scan_grid(&ScanGeneratorConfig::default());
        let ran = runner.run_scan(&grid)?;
        println!("Scan demo -> {} module(s) ran", ran);
    }

    if let Some(data) = args.data {
        let summary = runner.run_measurements(&data, &cancel)?;
        println!(
            "Run -> folders {}, canceled {}",
            summary.folders_processed, summary.canceled
        );
        if summary.canceled {
            println!("Run canceled; partial results were discarded.");
        }
    }

    Ok(())
}

/// Ctrl-C sets the shared cancellation flag; the pipeline notices between
/// files.
fn spawn_cancel_watcher(cancel: CancelFlag) {
    std::thread::spawn(move || {
        let runtime = TokioBuilder::new_current_thread()
            .enable_all()
            .build()
            .expect("failed to build runtime");
        runtime.block_on(async move {
            if signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        });
    });
}
