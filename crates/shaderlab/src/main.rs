mod catalog;
mod cli;
mod paths;
mod run;

use anyhow::Result;
use cli::Command;

fn main() -> Result<()> {
    let cli = cli::parse();
    run::initialise_tracing();

    let config = run::load_config(cli.config.as_deref())?;
    match cli.command {
        Command::List(args) => catalog::list(&config, args.json),
        Command::Probe(args) => catalog::probe(&run::factory_config(&config.factory, &args)),
        Command::Apply(args) => run::apply(&config, args),
    }
}
