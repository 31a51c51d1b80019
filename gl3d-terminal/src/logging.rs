//! Logger setup for the terminal front end.
//!
//! The renderer owns the alternate screen, so records go to a file when one
//! is configured and the default level stays at `warn`.

use std::fs::File;
use std::path::PathBuf;
use std::sync::Once;

/// Logger configuration.
///
/// `env_filter` follows the `env_logger` filter syntax (e.g. "info",
/// "gl3d_core=debug").
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub env_filter: Option<String>,
    pub write_style: env_logger::WriteStyle,
    /// Write records to this file instead of stderr.
    pub log_file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            write_style: env_logger::WriteStyle::Auto,
            log_file: None,
        }
    }
}

static INIT: Once = Once::new();

/// Initializes the global logger once.
///
/// This function is idempotent; subsequent calls are ignored.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let mut builder = env_logger::Builder::new();

        if let Some(filter) = &config.env_filter {
            builder.parse_filters(filter);
        } else if let Ok(filter) = std::env::var("RUST_LOG") {
            builder.parse_filters(&filter);
        } else {
            builder.filter_level(log::LevelFilter::Warn);
        }

        builder.write_style(config.write_style);

        let mut file_error = None;
        if let Some(path) = &config.log_file {
            match File::create(path) {
                Ok(file) => {
                    builder
                        .target(env_logger::Target::Pipe(Box::new(file)))
                        .write_style(env_logger::WriteStyle::Never);
                }
                Err(err) => file_error = Some((path.clone(), err)),
            }
        }

        builder.init();

        if let Some((path, err)) = file_error {
            log::warn!("cannot open log file {}: {}", path.display(), err);
        }
        log::debug!("logging initialized");
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_idempotent() {
        let path = std::env::temp_dir().join("gl3d-terminal-logging-test.log");
        init_logging(LoggingConfig {
            env_filter: Some("debug".to_string()),
            log_file: Some(path.clone()),
            ..LoggingConfig::default()
        });
        init_logging(LoggingConfig::default());

        log::debug!("after init");
        assert!(path.exists());
    }
}
