//! Logger setup.

use std::fs::OpenOptions;

use anyhow::Context;
use simplelog::{
    ColorChoice, Config, ConfigBuilder, LevelFilter, TermLogger, TerminalMode, WriteLogger,
};

use crate::config::AppConfig;

/// Installs the global logger: a file logger when `log_file` is set,
/// otherwise stderr. Stdout stays reserved for command output.
pub fn init(config: &AppConfig) -> anyhow::Result<()> {
    let level = config.level_filter()?;
    if level == LevelFilter::Off {
        return Ok(());
    }

    match &config.log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("cannot open log file {}", path.display()))?;
            WriteLogger::init(level, Config::default(), file).context("logger already installed")?;
        }
        None => {
            let term_config = ConfigBuilder::new().set_time_level(LevelFilter::Off).build();
            TermLogger::init(level, term_config, TerminalMode::Stderr, ColorChoice::Auto)
                .context("logger already installed")?;
        }
    }
    log::debug!("logging at {level}");
    Ok(())
}
