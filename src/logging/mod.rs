// Logging module - tracing subscriber setup
//
// Human-readable events go to stderr so stdout stays clean for command
// output. File logging optionally writes JSON lines to rotating files.
//
// Precedence: RUST_LOG env var > config file > default "info"

use crate::config::{LogRotation, LoggingConfig};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::RollingFileAppender;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter directive used when RUST_LOG is not set
fn default_directive(level: &str) -> String {
    format!("marketmind={},reqwest=warn,hyper=warn", level)
}

/// Rolling appender for the configured rotation
fn file_appender(config: &LoggingConfig) -> RollingFileAppender {
    match config.file_rotation {
        LogRotation::Hourly => {
            tracing_appender::rolling::hourly(&config.file_dir, &config.file_prefix)
        }
        LogRotation::Daily => tracing_appender::rolling::daily(&config.file_dir, &config.file_prefix),
        LogRotation::Never => tracing_appender::rolling::never(&config.file_dir, &config.file_prefix),
    }
}

/// Install the global subscriber
///
/// The returned guard must be kept alive for the duration of the program so
/// buffered file logs get flushed.
pub fn init_tracing(config: &LoggingConfig) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_directive(&config.level).into());

    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    if config.file_enabled {
        if let Err(e) = std::fs::create_dir_all(&config.file_dir) {
            eprintln!(
                "Warning: Could not create log directory {:?}: {}",
                config.file_dir, e
            );
        } else {
            // Non-blocking writer: writes happen in a background thread
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender(config));

            tracing_subscriber::registry()
                .with(filter)
                .with(stderr_layer)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(non_blocking)
                        .with_ansi(false),
                )
                .init();

            return Some(guard);
        }
    }

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .init();
    None
}
