use clap::{Parser, Subcommand};

mod signals;
mod simulate;
mod validate;

#[derive(Parser, Debug)]
#[command(name = "immune-implant", version, about = "Immune repertoire signal implanting CLI")]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Simulate(simulate::SimulateArgs),
    Validate(validate::ValidateArgs),
    Signals(signals::SignalsArgs),
}

impl Cli {
    pub fn dispatch(self) -> anyhow::Result<()> {
        match self.command {
            Command::Simulate(args) => simulate::handle(args),
            Command::Validate(args) => validate::handle(args),
            Command::Signals(args) => signals::handle(args),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/cli/mod.rs"]
mod tests;
