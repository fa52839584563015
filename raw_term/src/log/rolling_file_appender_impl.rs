// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::path::{Path, PathBuf};
use tracing_appender::rolling::RollingFileAppender;

/// A file appender that never rolls over. A bare file name is created in the current
/// directory.
///
/// # Errors
///
/// Returns an error if:
/// - The path has no file name
/// - The file or its folder can't be created
pub fn try_create(path_str: &str) -> miette::Result<RollingFileAppender> {
    let path = PathBuf::from(path_str);

    let file_name = path.file_name().ok_or_else(|| {
        miette::miette!("Can't use {} as a log file, it has no file name.", path.display())
    })?;

    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    RollingFileAppender::builder()
        .filename_prefix(file_name.to_string_lossy().as_ref())
        .build(parent)
        .map_err(|error| {
            miette::miette!(
                "Can't create log file {}. The folder might not exist, or you don't have the required permissions: {error}",
                path.display()
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_creates_file_in_existing_folder() {
        let dir = std::env::temp_dir()
            .join(format!("r3bl_raw_term_appender_{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let file_path = dir.join("appender.log");

        let appender = try_create(file_path.to_str().unwrap());
        assert!(appender.is_ok());
        assert!(file_path.exists());

        drop(appender);
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_path_without_file_name_is_an_error() {
        assert!(try_create("/").is_err());
    }
}
