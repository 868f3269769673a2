use std::str::FromStr;

use tracing::{debug, level_filters::LevelFilter, warn};
use tracing_subscriber::{
    fmt::format::{Format, Writer},
    EnvFilter,
};

struct SinkTimer;

impl tracing_subscriber::fmt::time::FormatTime for SinkTimer {
    fn format_time(&self, writer: &mut Writer<'_>) -> std::fmt::Result {
        let now = chrono::Local::now();
        write!(writer, "{} - {}", now.format("%d %B"), now.format("%H:%M:%S%.6f"))
    }
}

pub fn setup_logger(log_level: LevelFilter) {
    let filter = EnvFilter::from_default_env().add_directive(log_level.into());

    let format = Format::default().with_timer(SinkTimer).with_level(true).with_target(false);

    let subscriber =
        tracing_subscriber::fmt().with_env_filter(filter).event_format(format).finish();

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        debug!("Logger has already been set up, continuing...");
    }
}

pub fn setup_info_logger() {
    setup_logger(LevelFilter::INFO);
}

/// Resolves a textual level such as `debug` or `WARN`, falling back to `info`.
pub fn log_level_from_str(level: &str) -> LevelFilter {
    match LevelFilter::from_str(level.trim()) {
        Ok(filter) => filter,
        Err(_) => {
            warn!("Unknown log level '{}', using info", level);
            LevelFilter::INFO
        }
    }
}
