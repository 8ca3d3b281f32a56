use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt, layer::Layered, prelude::*, util::TryInitError, EnvFilter, Layer, Registry,
};

use crate::config::LoggingConfig;

type BoxedLayer = Box<dyn Layer<Layered<EnvFilter, Registry>> + Send + Sync>;

/// Installs the global subscriber. `RUST_LOG` wins over the configured level.
///
/// The returned guard flushes the file writer on drop and must outlive the server.
pub fn init_logging(config: &LoggingConfig) -> Result<Option<WorkerGuard>, TryInitError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{},tower_http=info", config.level)));

    let mut layers: Vec<BoxedLayer> = Vec::new();
    let mut guard = None;

    if let Some(dir) = &config.dir {
        let appender = match config.rotation.as_str() {
            "hourly" => tracing_appender::rolling::hourly(dir, &config.file),
            "daily" => tracing_appender::rolling::daily(dir, &config.file),
            _ => tracing_appender::rolling::never(dir, &config.file),
        };
        let (non_blocking, file_guard) = tracing_appender::non_blocking(appender);
        guard = Some(file_guard);

        let file_layer = if config.json {
            fmt::layer()
                .json()
                .with_target(true)
                .with_writer(non_blocking)
                .with_ansi(false)
                .boxed()
        } else {
            fmt::layer()
                .with_target(false)
                .with_writer(non_blocking)
                .with_ansi(false)
                .boxed()
        };
        layers.push(file_layer);
    }

    let stdout_layer = if config.json {
        fmt::layer().json().with_target(true).boxed()
    } else {
        fmt::layer().with_target(false).boxed()
    };
    layers.push(stdout_layer);

    tracing_subscriber::registry()
        .with(filter)
        .with(layers)
        .try_init()?;
    Ok(guard)
}
