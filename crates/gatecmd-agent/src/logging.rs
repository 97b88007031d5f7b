use std::path::Path;

use gatecmd_models::{LogConfig, LogFormat};
use tracing::info;
use tracing::subscriber::DefaultGuard;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{fmt, EnvFilter, Layer, Registry};

use crate::error::AgentError;

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Owns the process's log sinks for the lifetime of an agent.
///
/// `init` installs a subscriber for the current thread and `close` (or drop)
/// flushes the file sink and restores whatever subscriber was active before.
pub struct Logger {
    dispatch: Option<DefaultGuard>,
    file_guard: Option<WorkerGuard>,
}

impl Logger {
    pub fn init(config: &LogConfig) -> Result<Self, AgentError> {
        let mut layers: Vec<BoxedLayer> = vec![format_layer(
            config.format,
            std::io::stderr,
            true,
            env_filter(&config.level)?,
        )];

        let mut file_guard = None;
        if let Some(path) = config.file.as_deref() {
            let appender = file_appender(Path::new(path))?;
            let (writer, guard) = tracing_appender::non_blocking(appender);
            layers.push(format_layer(
                config.format,
                writer,
                false,
                env_filter(&config.level)?,
            ));
            file_guard = Some(guard);
        }

        let dispatch = tracing::subscriber::set_default(Registry::default().with(layers));
        info!(level = %config.level, file = ?config.file, "Logger initialized");

        Ok(Self {
            dispatch: Some(dispatch),
            file_guard,
        })
    }

    /// A logger that installs nothing, for callers that manage tracing themselves.
    pub fn disabled() -> Self {
        Self {
            dispatch: None,
            file_guard: None,
        }
    }

    pub fn close(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        if self.dispatch.is_none() {
            return;
        }
        info!("Logs are synchronized");
        drop(self.file_guard.take());
        drop(self.dispatch.take());
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// `RUST_LOG` wins over the configured level when set.
fn env_filter(level: &str) -> Result<EnvFilter, AgentError> {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .map_err(|e| AgentError::Logging(format!("invalid log level {level:?}: {e}")))
}

fn format_layer<W>(format: LogFormat, writer: W, ansi: bool, filter: EnvFilter) -> BoxedLayer
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    match format {
        LogFormat::Text => fmt::layer()
            .with_writer(writer)
            .with_ansi(ansi)
            .with_filter(filter)
            .boxed(),
        LogFormat::Json => fmt::layer()
            .json()
            .with_writer(writer)
            .with_filter(filter)
            .boxed(),
    }
}

fn file_appender(path: &Path) -> Result<RollingFileAppender, AgentError> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| AgentError::Logging(format!("invalid log file path: {}", path.display())))?;
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).map_err(|e| {
        AgentError::Logging(format!("failed to create log directory {}: {e}", dir.display()))
    })?;

    RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file_name)
        .build(dir)
        .map_err(|e| AgentError::Logging(format!("failed to open {}: {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::warn;

    fn file_config(path: &Path) -> LogConfig {
        LogConfig {
            level: "info".to_string(),
            format: LogFormat::Text,
            file: Some(path.to_string_lossy().into_owned()),
        }
    }

    #[test]
    fn close_flushes_file_sink() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("gatecmd.log");

        let logger = Logger::init(&file_config(&path)).unwrap();
        warn!(symbol = "btc_usdt", "Price lookup failed, valuing at 1");
        logger.close();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("Logger initialized"));
        assert!(contents.contains("Price lookup failed"));
        assert!(contents.contains("Logs are synchronized"));
    }

    #[test]
    fn json_format_writes_json_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gatecmd.json.log");
        let config = LogConfig {
            format: LogFormat::Json,
            ..file_config(&path)
        };

        let logger = Logger::init(&config).unwrap();
        logger.close();

        let contents = std::fs::read_to_string(&path).unwrap();
        let first = contents.lines().next().unwrap();
        let parsed: serde_json::Value = serde_json::from_str(first).unwrap();
        assert_eq!(parsed["level"], "INFO");
    }

    #[test]
    fn disabled_logger_closes_quietly() {
        Logger::disabled().close();
    }
}
