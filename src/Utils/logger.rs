use crate::settings::LoggingConfig;
use log::{LevelFilter, warn};
use simplelog::{
    ColorChoice, CombinedLogger, Config, SharedLogger, TermLogger, TerminalMode, WriteLogger,
};
use std::fs::File;

/// Level from the configuration, "info" if the string is not a known level
pub fn parse_level(level: &str) -> LevelFilter {
    level.trim().parse::<LevelFilter>().unwrap_or(LevelFilter::Info)
}

/// Installs the terminal logger and, if a log file is configured, a file logger next to it.
/// Calling it a second time only produces a warning.
pub fn init_logger(config: &LoggingConfig) -> crate::error::Result<()> {
    let level = parse_level(&config.level);
    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )];
    if let Some(log_file) = &config.log_file {
        loggers.push(WriteLogger::new(level, Config::default(), File::create(log_file)?));
    }
    if CombinedLogger::init(loggers).is_err() {
        warn!("logger is already initialized");
    }
    Ok(())
}
