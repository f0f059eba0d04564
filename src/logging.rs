use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Environment variable holding the log filter, e.g. `REPLINE_LOG=repline=debug`
pub const LOG_ENV: &str = "REPLINE_LOG";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Send logs to `log_path`, since the terminal belongs to the UI.
///
/// The returned guard flushes buffered lines on drop and must be held by `main`.
/// Returns `None` when a global subscriber is already installed.
pub fn init(log_path: &Path) -> Option<WorkerGuard> {
    let dir = log_path.parent()?;
    let file_name = log_path.file_name()?;
    std::fs::create_dir_all(dir).ok()?;

    let appender = tracing_appender::rolling::never(dir, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(env_filter())
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .try_init()
        .ok()?;

    Some(guard)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn init_creates_log_file_under_missing_dir() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state").join("repline.log");

        let guard = init(&path);
        assert!(guard.is_some());
        tracing::info!("hello from the test");
        drop(guard);

        assert!(path.exists());
    }
}
