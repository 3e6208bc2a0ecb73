//! # book2kindle
//!
//! Readarr "on download" hook: convert a freshly imported ebook with
//! Calibre's `ebook-convert` and mail the result to a Kindle address via
//! SendGrid.
//!
//! ## Why this crate?
//!
//! Amazon's send-to-kindle pipeline wants a Kindle-native file in a mailbox,
//! while Readarr only knows how to drop an `.epub` in a folder and fire a
//! custom-script event. This crate is the glue between the two: it reacts to
//! exactly one event type, converts exactly one file, sends exactly one
//! email, and gets out of the way — idempotently, so re-fired events and
//! connection tests are cheap no-ops.
//!
//! ## Pipeline Overview
//!
//! ```text
//! Readarr event (environment)
//!  │
//!  ├─ 1. Gate     ordered short-circuits: API key, Test event, path, type
//!  ├─ 2. Resolve  folder / stem / extension / converted filename
//!  ├─ 3. Convert  ebook-convert <source> <destination>, bounded by timeout
//!  ├─ 4. Watch    re-list the folder until the output appears (bounded)
//!  ├─ 5. Encode   converted file → base64 attachment
//!  ├─ 6. Deliver  SendGrid v3 mail/send, Bearer auth
//!  └─ 7. Cleanup  delete the converted file after a confirmed send
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use book2kindle::{run, HookConfig, Trigger};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Credentials and event come from the environment (Readarr sets the
//!     // event vars; the .env file next to the hook holds the credentials).
//!     dotenvy::dotenv().ok();
//!     let trigger = Trigger::from_env();
//!     let config = HookConfig::default();
//!     let outcome = run(&trigger, &config).await?;
//!     eprintln!("{outcome:?}");
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `book2kindle` binary (clap + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when embedding only the library:
//! ```toml
//! book2kindle = { version = "0.3", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod outcome;
pub mod paths;
pub mod pipeline;
pub mod run;
pub mod trigger;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{HookConfig, HookConfigBuilder};
pub use error::HookError;
pub use outcome::{DeliveryReceipt, RunOutcome, RunStats};
pub use paths::BookPaths;
pub use pipeline::deliver::{Mailer, OutboundMessage, SendGridClient};
pub use pipeline::encode::Attachment;
pub use run::{run, run_sync};
pub use trigger::{Credentials, Gate, SkipReason, Trigger};
