use std::path::PathBuf;

use clap::Args;
use tracing::info;

use crate::config::loader::{SimulationConfig, load_simulation_config};

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Simulation definition (TOML)
    #[arg(long)]
    pub(crate) config: PathBuf,
}

pub fn handle(args: ValidateArgs) -> anyhow::Result<()> {
    let config = load_simulation_config(&args.config)?;
    info!(path = %args.config.display(), "simulation config is valid");
    print!("{}", overview(&config));
    Ok(())
}

pub(crate) fn overview(config: &SimulationConfig) -> String {
    let mut lines: Vec<(&str, String, String)> = Vec::new();
    for motif in &config.motifs {
        lines.push((
            "motif",
            motif.identifier.clone(),
            format!(
                "seed={} instantiation={} max_length={}",
                motif.seed().as_str(),
                motif.instantiation().name(),
                motif.max_length()
            ),
        ));
    }
    for signal in &config.signals {
        let motifs: Vec<&str> = signal.motifs().iter().map(|m| m.identifier.as_str()).collect();
        lines.push((
            "signal",
            signal.identifier.clone(),
            format!(
                "motifs={} implanting={}",
                motifs.join(","),
                signal.implanting_strategy().name()
            ),
        ));
    }
    for implanting in config.simulation.implantings() {
        let signals: Vec<&str> = implanting
            .signals()
            .iter()
            .map(|s| s.identifier.as_str())
            .collect();
        lines.push((
            "implanting",
            implanting.name.clone(),
            format!(
                "dataset_rate={} repertoire_rate={} signals={}",
                implanting.dataset_implanting_rate,
                implanting.repertoire_implanting_rate,
                signals.join(",")
            ),
        ));
    }

    let mut buf = String::new();
    buf.push_str("kind\tid\tdetails\n");
    for (kind, id, details) in lines {
        buf.push_str(kind);
        buf.push('\t');
        buf.push_str(&id);
        buf.push('\t');
        buf.push_str(&details);
        buf.push('\n');
    }
    buf
}
