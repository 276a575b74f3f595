use std::io::Write;
use std::process::ExitCode;

use agrilend::cli::{self, Cli};
use agrilend::env::RealEnv;
use agrilend::logging;
use anyhow::Context;
use clap::Parser;

async fn run(cli: Cli) -> anyhow::Result<()> {
    let dir = std::env::current_dir().context("cannot determine working directory")?;
    let config = cli::load_config(&cli, &RealEnv, &dir)?;
    logging::init(&config)?;

    let output = cli::run(&cli.command, &config).await?;
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(output.as_bytes())?;
    stdout.flush()?;
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err:#}");
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
