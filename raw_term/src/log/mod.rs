// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Logging setup. A process that has put stderr in raw mode should log to a file, so
//! [`WriterConfig::File`] is what [`try_initialize_logging_global()`] uses by default.

// Attach sources.
pub mod log_public_api;
pub mod rolling_file_appender_impl;
pub mod tracing_config;
pub mod tracing_init;

// Re-export.
pub use log_public_api::*;
pub use tracing_config::*;
pub use tracing_init::*;
