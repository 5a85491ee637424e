use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt};

/// File name prefix of the daily-rolled log files.
pub const LOG_FILE_PREFIX: &str = "logsplit.log";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Initialize structured JSON logging filtered by `RUST_LOG` (default `info`).
///
/// With a `log_dir` the output goes to a daily-rolled file in that directory
/// through a non-blocking writer. The returned guard flushes that writer and
/// must be held for the life of the process.
pub fn init_logging(log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let builder = fmt().with_env_filter(env_filter()).json().flatten_event(true);

    match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            builder.with_writer(writer).with_ansi(false).init();
            Some(guard)
        }
        None => {
            builder.init();
            None
        }
    }
}
