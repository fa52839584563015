// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::log::TracingConfig;
use tracing::dispatcher;
use tracing_core::LevelFilter;

/// Logging is **DISABLED** by **default**. Until this is called with a level other than
/// [`LevelFilter::OFF`], the [`tracing`] events this crate emits go nowhere.
///
/// # Errors
///
/// If the log file can't be created, or a global subscriber is already set.
pub fn try_initialize_logging_global(options: impl Into<TracingConfig>) -> miette::Result<()> {
    let it: TracingConfig = options.into();

    // Early return if the level filter is off.
    if it.get_level_filter() == LevelFilter::OFF {
        return Ok(());
    }

    it.install_global()
}

/// Like [`try_initialize_logging_global()`] but only for the current thread. This is
/// useful in tests.
///
/// # Errors
///
/// If the log file can't be created.
pub fn try_initialize_logging_thread_local(
    options: impl Into<TracingConfig>,
) -> miette::Result<Option<dispatcher::DefaultGuard>> {
    let it: TracingConfig = options.into();

    // Early return if the level filter is off.
    if it.get_level_filter() == LevelFilter::OFF {
        return Ok(None);
    }

    it.install_thread_local().map(Some)
}

/// A level on its own logs to the default log file.
impl From<LevelFilter> for TracingConfig {
    fn from(level_filter: LevelFilter) -> Self { TracingConfig::new_file(None, level_filter) }
}
