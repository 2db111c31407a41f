pub mod config;
pub mod initialization;
pub mod logging_system;
pub mod shutdown;

pub use config::{Config, ConfigError, LogFormat, LogLevel};
pub use initialization::InitializationError;
pub use logging_system::{LoggingSystem, setup_logging_safe};
pub use shutdown::shutdown_signal;

use crate::pipeline::{PipelineBuilder, PipelineError, PipelineStats, WriteStream};
use std::future::Future;
use std::process;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncRead;
use tracing::{error, info, warn};

/// How long the reporting client may take to send queued events on exit.
pub const FLUSH_TIMEOUT: Duration = Duration::from_secs(2);

pub struct App {
    config: Config,
}

impl App {
    pub fn from_args<I, T>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Ok(Self::new(Config::from_args(args)?))
    }

    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Forward stdin to stdout and into the pipeline until stdin closes or a
    /// shutdown signal arrives, then flush the reporting client.
    pub async fn run(self) -> Result<PipelineStats, Box<dyn std::error::Error + Send + Sync>> {
        let stream = PipelineBuilder::new(self.config.sentry_options())
            .passthrough(tokio::io::stdout())
            .buffer_capacity(self.config.buffer_capacity)
            .build()?;
        let transport = Arc::clone(stream.transport());

        info!("Logging initialized");

        let result = forward(tokio::io::stdin(), stream, shutdown_signal()).await;

        // Flush even after a failure so already-captured events are not lost.
        let flushed = tokio::task::spawn_blocking(move || transport.flush(FLUSH_TIMEOUT)).await?;
        if !flushed {
            warn!(timeout = ?FLUSH_TIMEOUT, "Reporting client did not drain before timeout");
        }

        let stats = result?;
        info!(
            lines = stats.lines,
            exceptions = stats.exceptions,
            breadcrumbs = stats.breadcrumbs,
            filtered = stats.filtered,
            malformed = stats.malformed,
            "Input closed"
        );
        Ok(stats)
    }
}

/// Copy `reader` into `stream` until EOF or until `shutdown` completes, then
/// finish the stream.
pub async fn forward<R, S>(
    mut reader: R,
    mut stream: WriteStream,
    shutdown: S,
) -> Result<PipelineStats, PipelineError>
where
    R: AsyncRead + Unpin,
    S: Future<Output = ()>,
{
    let copied = tokio::select! {
        result = tokio::io::copy(&mut reader, &mut stream) => result.map(Some),
        () = shutdown => Ok(None),
    };

    // A worker failure surfaces as a broken pipe on copy; finish reports the cause.
    let stats = stream.finish().await?;
    copied?;
    Ok(stats)
}

pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

pub async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let app = match App::from_args(std::env::args()) {
        Ok(app) => app,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            process::exit(1);
        }
    };

    if let Err(e) = setup_logging_safe(app.config().log_level, app.config().log_format) {
        eprintln!("Warning: {e}");
    }

    info!("Starting sentry-log-bridge v{}", get_version());

    if let Err(e) = app.run().await {
        error!("Application error: {}", e);
        process::exit(1);
    }

    Ok(())
}
