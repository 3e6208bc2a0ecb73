//! Result types for a hook run.
//!
//! A run that ends early because a precondition says there is nothing to do
//! is a [`RunOutcome::Skipped`], not an error — the distinction is what
//! lets the binary exit 0 on Readarr's test handshake and on re-delivered
//! events while still failing loudly on real faults.

use crate::trigger::SkipReason;
use serde::Serialize;

/// What a completed (non-error) run did.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum RunOutcome {
    /// A precondition short-circuited the run; no side effects.
    Skipped { skip: SkipReason },
    /// The book was converted, mailed, and the temporary file removed.
    Delivered { receipt: DeliveryReceipt },
}

/// Proof of a completed delivery, for logs and `--json` output.
#[derive(Debug, Clone, Serialize)]
pub struct DeliveryReceipt {
    /// Attachment filename as the recipient sees it.
    pub attachment: String,
    /// Size of the converted file before base64 expansion.
    pub attachment_bytes: u64,
    /// Directory checks the poll loop used before the file appeared.
    pub poll_attempts: u32,
    /// Whether the converted file was removed after the send.
    pub cleaned_up: bool,
    /// Per-stage wall-clock timings.
    pub stats: RunStats,
}

/// Wall-clock spent in each pipeline stage.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunStats {
    pub convert_duration_ms: u64,
    pub wait_duration_ms: u64,
    pub send_duration_ms: u64,
    pub total_duration_ms: u64,
}
