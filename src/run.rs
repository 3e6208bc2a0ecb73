//! The run orchestrator: one triggering event, end to end.
//!
//! This is the analog of the whole original hook: gate the event, derive
//! the paths, check the skip preconditions, convert, wait for the output,
//! encode it, mail it, clean up. Stages live in [`crate::pipeline`]; this
//! module only sequences them, times them, and owns the two precondition
//! checks that need the resolved paths.

use crate::config::HookConfig;
use crate::error::HookError;
use crate::outcome::{DeliveryReceipt, RunOutcome, RunStats};
use crate::paths::{self, BookPaths};
use crate::pipeline::deliver::{Mailer, OutboundMessage, SendGridClient};
use crate::pipeline::{convert, encode, watch};
use crate::trigger::{Gate, SkipReason, Trigger};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Run the full pipeline for one triggering event.
///
/// # Returns
/// - `Ok(RunOutcome::Skipped(..))` — a precondition said there is nothing
///   to do; no side effects were performed.
/// - `Ok(RunOutcome::Delivered(..))` — the book was converted, mailed,
///   and the temporary file removed.
///
/// # Errors
/// Any [`HookError`]: missing credentials, converter failure or timeout,
/// polling exhaustion, attachment read failure, delivery failure. No email
/// is sent on any conversion error, and the converted file is only deleted
/// after the mailer confirms the send.
pub async fn run(trigger: &Trigger, config: &HookConfig) -> Result<RunOutcome, HookError> {
    let total_start = Instant::now();

    // ── Step 1: Gate the event ───────────────────────────────────────────
    let book_path = match trigger.gate()? {
        Gate::Proceed { book_path } => book_path,
        Gate::Skip(skip) => {
            info!(%skip, "nothing to do");
            return Ok(RunOutcome::Skipped { skip });
        }
    };
    let credentials = trigger.credentials()?;
    info!(book_path = %book_path, "handling download event");

    // ── Step 2: Resolve paths ────────────────────────────────────────────
    let book = BookPaths::resolve(&book_path, &config.output_format);

    // ── Step 3: Skip preconditions ───────────────────────────────────────
    if config.is_ignored_extension(&book.extension) {
        let skip = SkipReason::IgnoredExtension {
            extension: book.extension.clone(),
        };
        info!(%skip, "nothing to do");
        return Ok(RunOutcome::Skipped { skip });
    }

    let existing = paths::list_filenames(&book.folder).unwrap_or_default();
    if existing.iter().any(|n| *n == book.converted_filename) {
        let skip = SkipReason::AlreadyConverted {
            converted_filename: book.converted_filename.clone(),
        };
        info!(%skip, "nothing to do");
        return Ok(RunOutcome::Skipped { skip });
    }

    // ── Step 4: Convert ──────────────────────────────────────────────────
    let convert_start = Instant::now();
    convert::invoke(
        &config.converter,
        &book_path,
        &book.destination,
        config.convert_timeout,
    )
    .await?;
    let convert_duration_ms = convert_start.elapsed().as_millis() as u64;

    // ── Step 5: Wait for the output ──────────────────────────────────────
    let wait_start = Instant::now();
    let poll_attempts = watch::await_converted(
        &book.folder,
        &book.converted_filename,
        config.poll_attempts,
        config.poll_interval,
    )
    .await?;
    let wait_duration_ms = wait_start.elapsed().as_millis() as u64;

    // ── Step 6: Encode the attachment ────────────────────────────────────
    let attachment_bytes = tokio::fs::metadata(&book.destination)
        .await
        .map(|m| m.len())
        .unwrap_or(0);
    let attachment = encode::load_attachment(&book.destination, &book.converted_filename).await?;

    // ── Step 7: Deliver ──────────────────────────────────────────────────
    let mailer: Arc<dyn Mailer> = match &config.mailer {
        Some(mailer) => Arc::clone(mailer),
        None => Arc::new(SendGridClient::new(
            credentials.api_key.clone(),
            config.api_timeout,
        )?),
    };

    let message = OutboundMessage {
        from: credentials.from_email.clone(),
        to: credentials.kindle_email.clone(),
        subject: config.subject.clone(),
        html_body: config.html_body.clone(),
        attachment,
    };

    let send_start = Instant::now();
    mailer.send(&message).await?;
    let send_duration_ms = send_start.elapsed().as_millis() as u64;

    // ── Step 8: Clean up ─────────────────────────────────────────────────
    // Only after a confirmed send; a failed delivery keeps the converted
    // file so the next event skips conversion instead of redoing it.
    let cleaned_up = match tokio::fs::remove_file(&book.destination).await {
        Ok(()) => true,
        Err(e) => {
            warn!(destination = %book.destination, error = %e, "failed to delete converted file");
            false
        }
    };

    let stats = RunStats {
        convert_duration_ms,
        wait_duration_ms,
        send_duration_ms,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
    };
    info!(
        attachment = %message.attachment.filename,
        poll_attempts,
        total_ms = stats.total_duration_ms,
        "book delivered"
    );

    Ok(RunOutcome::Delivered {
        receipt: DeliveryReceipt {
            attachment: message.attachment.filename.clone(),
            attachment_bytes,
            poll_attempts,
            cleaned_up,
            stats,
        },
    })
}

/// Synchronous wrapper around [`run`].
///
/// Creates a temporary tokio runtime internally; for callers that are not
/// already async (cron wrappers, other hosts' script hooks).
pub fn run_sync(trigger: &Trigger, config: &HookConfig) -> Result<RunOutcome, HookError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| HookError::InvalidConfig(format!("failed to create tokio runtime: {e}")))?
        .block_on(run(trigger, config))
}
