use std::fs::{self, File};
use std::path::Path;
use std::sync::Arc;

use chrono::Local;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::error::AppError;

/// Keeps the run's log file alive; call [`LogGuard::finish`] on every exit
/// path, including fatal ones that end in `process::exit`.
pub struct LogGuard {
    file: Arc<File>,
}

/// Installs the global subscriber writing to stderr and to
/// `<log_dir>/logfile_<timestamp>.log`.
pub fn init(log_dir: &Path) -> Result<LogGuard, AppError> {
    fs::create_dir_all(log_dir)?;
    let log_path = log_dir.join(format!("logfile_{}.log", Local::now().format("%Y%m%d%H%M%S")));
    let file = Arc::new(File::create(&log_path)?);

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "coursewatch=info".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(file.clone()),
        )
        .init();

    info!("Logging to {}", log_path.display());

    Ok(LogGuard { file })
}

impl LogGuard {
    pub fn finish(self) {
        info!("Shutting down");
        if let Err(e) = self.file.sync_all() {
            eprintln!("failed to flush log file: {}", e);
        }
    }
}
