use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::config::loader::load_simulation_config;

#[derive(Args, Debug)]
pub struct SignalsArgs {
    #[command(subcommand)]
    pub(crate) command: SignalsCommand,
}

#[derive(Subcommand, Debug)]
pub(crate) enum SignalsCommand {
    List(SignalsListArgs),
    Dump(SignalsDumpArgs),
}

#[derive(Args, Debug)]
pub struct SignalsListArgs {
    /// Simulation definition (TOML)
    #[arg(long)]
    pub(crate) config: PathBuf,
}

#[derive(Args, Debug)]
pub struct SignalsDumpArgs {
    /// Simulation definition (TOML)
    #[arg(long)]
    pub(crate) config: PathBuf,

    /// Output directory
    #[arg(long)]
    pub(crate) out: PathBuf,
}

pub fn handle(args: SignalsArgs) -> anyhow::Result<()> {
    match args.command {
        SignalsCommand::List(args) => list_signals(args),
        SignalsCommand::Dump(args) => dump_signals(args),
    }
}

fn list_signals(args: SignalsListArgs) -> anyhow::Result<()> {
    let config = load_simulation_config(&args.config)?;
    println!("signal_id\tn_motifs\tmax_motif_length\timplanting");
    for signal in &config.signals {
        println!(
            "{}\t{}\t{}\t{}",
            signal.identifier,
            signal.motifs().len(),
            signal.max_motif_length(),
            signal.implanting_strategy().name()
        );
    }
    Ok(())
}

fn dump_signals(args: SignalsDumpArgs) -> anyhow::Result<()> {
    std::fs::create_dir_all(&args.out)?;
    let config = load_simulation_config(&args.config)?;
    let json = serde_json::to_string_pretty(&config.definition)?;
    let path = args.out.join("signals_manifest.json");
    std::fs::write(path, json)?;
    Ok(())
}
