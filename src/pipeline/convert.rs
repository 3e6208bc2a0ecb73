//! Converter invocation: one blocking subprocess, bounded by a deadline.
//!
//! The external tool is treated as a black box with a two-argument
//! contract: `<tool> <source> <destination>`, exit 0 meaning the
//! destination file will appear in the same directory. Calibre's
//! `ebook-convert` derives the target format from the destination
//! extension, so no further flags are needed.
//!
//! The deadline exists because `ebook-convert` has been observed to hang on
//! malformed input; a fired timeout is reported as its own error variant
//! but handled identically to a non-zero exit — fatal, no email attempted.

use crate::error::HookError;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, info};

/// Run `<converter> <source> <destination>` to completion.
///
/// Converter output goes to the hook's own stdout/stderr so Readarr's
/// script log captures it.
pub async fn invoke(
    converter: &Path,
    source: &str,
    destination: &str,
    timeout: Duration,
) -> Result<(), HookError> {
    info!(
        converter = %converter.display(),
        source,
        destination,
        "invoking converter"
    );

    let mut child = Command::new(converter)
        .arg(source)
        .arg(destination)
        .stdin(Stdio::null())
        .spawn()
        .map_err(|e| HookError::ConverterSpawnFailed {
            converter: converter.to_path_buf(),
            source: e,
        })?;

    let status = match tokio::time::timeout(timeout, child.wait()).await {
        Ok(Ok(status)) => status,
        Ok(Err(e)) => {
            return Err(HookError::ConverterSpawnFailed {
                converter: converter.to_path_buf(),
                source: e,
            })
        }
        Err(_elapsed) => {
            child.start_kill().ok();
            return Err(HookError::ConverterTimedOut {
                secs: timeout.as_secs(),
                source_path: source.to_string(),
            });
        }
    };

    if !status.success() {
        return Err(HookError::ConverterFailed {
            status: status.to_string(),
            source_path: source.to_string(),
        });
    }

    debug!(source, "converter exited cleanly");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[tokio::test]
    async fn missing_binary_is_spawn_failure() {
        let err = invoke(
            &PathBuf::from("/nonexistent/ebook-convert"),
            "/books/Foo/Foo.epub",
            "/books/Foo/Foo.mobi",
            Duration::from_secs(5),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, HookError::ConverterSpawnFailed { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn nonzero_exit_is_converter_failure() {
        let err = invoke(
            &PathBuf::from("/bin/false"),
            "src",
            "dst",
            Duration::from_secs(5),
        )
        .await
        .unwrap_err();
        match err {
            HookError::ConverterFailed { status, .. } => {
                assert!(status.contains('1'), "got: {status}")
            }
            other => panic!("expected ConverterFailed, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn zero_exit_is_ok() {
        invoke(
            &PathBuf::from("/bin/true"),
            "src",
            "dst",
            Duration::from_secs(5),
        )
        .await
        .unwrap();
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn deadline_fires_as_timeout() {
        // sleep sums its operands, so this is a 4 s sleep against a 50 ms
        // deadline.
        let err = invoke(
            &PathBuf::from("/bin/sleep"),
            "2",
            "2",
            Duration::from_millis(50),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, HookError::ConverterTimedOut { .. }));
    }
}
