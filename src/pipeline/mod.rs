//! Pipeline stages for the convert-and-deliver run.
//!
//! Each submodule implements exactly one step. Keeping stages separate
//! makes each independently testable and lets us swap implementations
//! (e.g. a different mail transport) without touching other stages.
//!
//! ## Data Flow
//!
//! ```text
//! convert ──▶ watch ──▶ encode ──▶ deliver
//! (subprocess) (poll)   (base64)   (mail/send)
//! ```
//!
//! 1. [`convert`] — spawn the external converter on the source book and
//!    wait for it, bounded by the configured timeout
//! 2. [`watch`]   — re-list the book folder until the converted file
//!    appears or the attempt bound is exhausted
//! 3. [`encode`]  — read the converted file and base64-wrap it as an
//!    email attachment
//! 4. [`deliver`] — submit the message through the delivery API; the only
//!    stage with network I/O

pub mod convert;
pub mod deliver;
pub mod encode;
pub mod watch;
