// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::log::tracing_init::try_create_layers;
use tracing::dispatcher;
use tracing_core::LevelFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub const DEFAULT_LOG_FILE_NAME: &str = "r3bl_raw_term.log";

/// Where log output goes, and at what level.
#[derive(Debug, Clone, PartialEq)]
pub struct TracingConfig {
    pub writer_config: WriterConfig,
    pub level_filter: LevelFilter,
}

/// There is no stdout writer. Stdout usually carries the program's own output, and may
/// be in raw mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriterConfig {
    Stderr,
    File(String /* log file path */),
    StderrAndFile(String /* log file path */),
}

impl WriterConfig {
    #[must_use]
    pub fn writes_to_stderr(&self) -> bool {
        matches!(self, WriterConfig::Stderr | WriterConfig::StderrAndFile(_))
    }

    #[must_use]
    pub fn file_path(&self) -> Option<&str> {
        match self {
            WriterConfig::File(path) | WriterConfig::StderrAndFile(path) => {
                Some(path.as_str())
            }
            WriterConfig::Stderr => None,
        }
    }
}

impl TracingConfig {
    #[must_use]
    pub fn new_file(file_path: Option<String>, level_filter: LevelFilter) -> Self {
        Self {
            writer_config: WriterConfig::File(
                file_path.unwrap_or_else(|| DEFAULT_LOG_FILE_NAME.to_string()),
            ),
            level_filter,
        }
    }

    #[must_use]
    pub fn new_stderr(level_filter: LevelFilter) -> Self {
        Self {
            writer_config: WriterConfig::Stderr,
            level_filter,
        }
    }

    #[must_use]
    pub fn get_writer_config(&self) -> WriterConfig { self.writer_config.clone() }

    #[must_use]
    pub fn get_level_filter(&self) -> LevelFilter { self.level_filter }

    /// Sets the process wide default subscriber. This can only happen once.
    ///
    /// # Errors
    ///
    /// If the log file can't be created, or a global subscriber is already set.
    pub fn install_global(self) -> miette::Result<()> {
        let layers = try_create_layers(self)?;
        tracing_subscriber::registry()
            .with(layers)
            .try_init()
            .map_err(|error| miette::miette!("Can't install tracing subscriber: {error}"))
    }

    /// Sets the default subscriber for the current thread, until the returned guard is
    /// dropped.
    ///
    /// # Errors
    ///
    /// If the log file can't be created.
    pub fn install_thread_local(self) -> miette::Result<dispatcher::DefaultGuard> {
        let layers = try_create_layers(self)?;
        Ok(tracing_subscriber::registry().with(layers).set_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_new_file_uses_default_name() {
        let config = TracingConfig::new_file(None, LevelFilter::DEBUG);
        assert_eq!(config.get_writer_config().file_path(), Some(DEFAULT_LOG_FILE_NAME));
        assert!(!config.get_writer_config().writes_to_stderr());
    }

    #[test]
    fn test_writer_config_targets() {
        let both = WriterConfig::StderrAndFile("a.log".into());
        assert!(both.writes_to_stderr());
        assert_eq!(both.file_path(), Some("a.log"));
        assert_eq!(WriterConfig::Stderr.file_path(), None);
    }
}
