mod commands;
mod telemetry;

use clap::Parser;
use commands::Cli;
use event_sessions_infra::setup_context;
use telemetry::{get_subscriber, init_subscriber};

fn main() -> anyhow::Result<()> {
    let subscriber = get_subscriber("event_sessions".into(), "warn".into());
    init_subscriber(subscriber)?;

    let cli = Cli::parse();
    let context = setup_context();
    let output = cli.command.run(&context)?;
    println!("{}", output);
    Ok(())
}
