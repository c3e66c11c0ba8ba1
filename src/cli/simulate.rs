use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use tracing::info;

use crate::config::loader::load_simulation_config;
use crate::pipeline::stage1_load::run_stage1;
use crate::pipeline::stage2_simulate::{SimulateOptions, run_stage2};
use crate::pipeline::stage3_report::run_stage3_report;

#[derive(Args, Debug)]
pub struct SimulateArgs {
    /// Input dataset directory (metadata.tsv plus repertoire files)
    #[arg(long)]
    pub(crate) input: PathBuf,

    /// Simulation definition (TOML)
    #[arg(long)]
    pub(crate) config: PathBuf,

    /// Output directory
    #[arg(long)]
    pub(crate) out: PathBuf,

    /// Run seed, overrides the simulation file
    #[arg(long)]
    pub(crate) seed: Option<u64>,

    /// Worker threads, overrides the simulation file
    #[arg(long)]
    pub(crate) batch_size: Option<usize>,
}

pub fn handle(args: SimulateArgs) -> anyhow::Result<()> {
    std::fs::create_dir_all(&args.out)?;

    let config = load_simulation_config(&args.config)?;
    info!(
        motifs = config.motifs.len(),
        signals = config.signals.len(),
        rules = config.simulation.implantings().len(),
        "loaded simulation config"
    );

    let start = Instant::now();
    info!(stage = "stage1_load", "starting stage");
    let ctx = run_stage1(&args.input)?;
    info!(
        stage = "stage1_load",
        elapsed_ms = start.elapsed().as_millis(),
        repertoires = ctx.n_repertoires,
        sequences = ctx.n_sequences,
        empty_repertoires = ctx.empty_repertoires,
        "finished stage"
    );

    let start = Instant::now();
    info!(stage = "stage2_simulate", "starting stage");
    let options = SimulateOptions {
        seed: args.seed,
        batch_size: args.batch_size,
    };
    let sim_ctx = run_stage2(ctx.dataset, &config, options)?;
    info!(
        stage = "stage2_simulate",
        elapsed_ms = start.elapsed().as_millis(),
        seed = sim_ctx.seed,
        batch_size = sim_ctx.batch_size,
        "finished stage"
    );

    let start = Instant::now();
    info!(stage = "stage3_report", "starting stage");
    let summary = run_stage3_report(&sim_ctx, &args.out)?;
    for (signal_id, signal) in &summary.signals {
        info!(
            signal = signal_id.as_str(),
            repertoires_flagged = signal.repertoires_flagged,
            sequences_implanted = signal.sequences_implanted
        );
    }
    info!(
        stage = "stage3_report",
        elapsed_ms = start.elapsed().as_millis(),
        "finished stage"
    );
    Ok(())
}
