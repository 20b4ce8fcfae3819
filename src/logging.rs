use std::fs::OpenOptions;
use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Initialise logging. The default level is `info`, or `debug` when debug
/// logging is enabled in the settings file. `RUST_LOG` only overrides the
/// level in debug mode.
///
/// With `log_file` set, output is appended to that file through a background
/// writer. Keep the returned guard alive for as long as logs should be flushed.
pub fn init(debug: bool, log_file: Option<PathBuf>) -> Option<WorkerGuard> {
    let filter = env_filter(debug);

    let Some(path) = log_file else {
        let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
        return None;
    };

    match OpenOptions::new().create(true).append(true).open(&path) {
        Ok(file) => {
            let (writer, guard) = tracing_appender::non_blocking(file);
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(writer)
                .with_ansi(false)
                .try_init();
            Some(guard)
        }
        Err(err) => {
            let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
            tracing::warn!(path = %path.display(), %err, "cannot open log file, logging to stderr");
            None
        }
    }
}

fn env_filter(debug: bool) -> EnvFilter {
    // Without debug logging a stray `RUST_LOG` in the environment is ignored.
    let level = if debug { "debug" } else { "info" };
    if debug {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
    } else {
        EnvFilter::new(level)
    }
}
