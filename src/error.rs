//! Error types for the book2kindle library.
//!
//! Everything here is **fatal**: the hook is a single fire-and-forget run per
//! Readarr event, so there is no partial-success state to resume from. A
//! condition that merely means "nothing to do" (test event, ignored
//! extension, output already present) is not an error at all — it surfaces
//! as [`crate::outcome::RunOutcome::Skipped`] and the process exits 0.
//!
//! The variants follow the run's failure taxonomy: configuration errors
//! (before any side effect), conversion errors (subprocess or polling), and
//! delivery errors (attachment read or API submission). The binary maps any
//! `Err(HookError)` to one structured log line and a non-zero exit.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the book2kindle library.
#[derive(Debug, Error)]
pub enum HookError {
    // ── Configuration errors ──────────────────────────────────────────────
    /// The SendGrid API key variable is absent or empty.
    #[error("SendGrid API key is not set.\nPut READARR_SNDGRD_AP_KY=<key> in the hook's .env file.")]
    MissingApiKey,

    /// The Kindle recipient address variable is absent or empty.
    #[error("Kindle recipient address is not set.\nPut READARR_KINDLE_EMAIL=<address>@kindle.com in the hook's .env file.")]
    MissingRecipient,

    /// The sender address variable is absent or empty.
    #[error("Sender address is not set.\nPut READARR_FROM_EMAIL=<verified sender> in the hook's .env file.")]
    MissingSender,

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Conversion errors ─────────────────────────────────────────────────
    /// The converter binary could not be spawned at all.
    #[error("Failed to spawn converter '{converter}': {source}\nCheck the binary exists and is executable (--converter / B2K_CONVERTER).")]
    ConverterSpawnFailed {
        converter: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The converter exited with a non-zero status.
    #[error("Converter exited with {status} for '{source_path}'")]
    ConverterFailed { status: String, source_path: String },

    /// The converter ran past the configured deadline and was given up on.
    ///
    /// Handled exactly like a non-zero exit: fatal, no email attempted.
    #[error("Converter timed out after {secs}s for '{source_path}'\nRaise --convert-timeout for very large books.")]
    ConverterTimedOut { secs: u64, source_path: String },

    /// The converter exited 0 but its output never appeared within the
    /// polling bound.
    #[error("Converted file '{expected}' never appeared in '{folder}' after {attempts} checks")]
    ConversionMissing {
        folder: String,
        expected: String,
        attempts: u32,
    },

    // ── Delivery errors ───────────────────────────────────────────────────
    /// The converted file could not be read for attachment.
    #[error("Failed to read converted file '{path}': {source}")]
    AttachmentReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The delivery API answered with a non-success status.
    #[error("SendGrid rejected the message: HTTP {status}\n{body}")]
    DeliveryRejected { status: u16, body: String },

    /// The delivery API could not be reached at all.
    #[error("Failed to reach SendGrid: {source}")]
    DeliveryTransport {
        #[source]
        source: reqwest::Error,
    },
}
