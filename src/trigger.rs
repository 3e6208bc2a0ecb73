//! Trigger snapshot and gate: what Readarr told us, and whether to act on it.
//!
//! Readarr communicates with custom scripts purely through environment
//! variables. [`Trigger::from_env`] snapshots the five values this hook
//! cares about exactly once at startup; nothing downstream reads the
//! environment again. The delivery credentials are expected to come from
//! the hook's own `.env` file (loaded by the binary before the snapshot),
//! not from Readarr's process environment.
//!
//! [`Trigger::gate`] then applies the ordered short-circuit checks. The
//! order is a contract: the API-key check runs first so a misconfigured
//! install fails loudly even on Readarr's connection test, and the `Test`
//! event check runs before any path validation so the test handshake
//! succeeds with no side effects.

use crate::error::HookError;
use serde::Serialize;
use std::fmt;

/// Readarr event variable: `Test` on connection test, `Download` on import.
pub const ENV_EVENT_TYPE: &str = "readarr_eventtype";
/// Readarr event variable: absolute path of the imported book file.
pub const ENV_BOOK_PATH: &str = "readarr_addedbookpaths";
/// Hook credential: SendGrid API key.
pub const ENV_API_KEY: &str = "READARR_SNDGRD_AP_KY";
/// Hook credential: Kindle recipient address.
pub const ENV_KINDLE_EMAIL: &str = "READARR_KINDLE_EMAIL";
/// Hook credential: verified sender address.
pub const ENV_FROM_EMAIL: &str = "READARR_FROM_EMAIL";

/// Event sentinel Readarr sends when the user presses "Test".
pub const EVENT_TEST: &str = "Test";
/// Event sentinel Readarr sends after a completed book import.
pub const EVENT_DOWNLOAD: &str = "Download";

/// One-time snapshot of the triggering environment.
///
/// Fields are `Option<String>` with empty strings normalised to `None`;
/// the gate and credential accessors own all presence decisions.
#[derive(Debug, Clone, Default)]
pub struct Trigger {
    pub event_type: Option<String>,
    pub book_path: Option<String>,
    pub api_key: Option<String>,
    pub kindle_email: Option<String>,
    pub from_email: Option<String>,
}

fn non_empty(var: &str) -> Option<String> {
    std::env::var(var).ok().filter(|v| !v.is_empty())
}

impl Trigger {
    /// Snapshot the five hook variables from the process environment.
    pub fn from_env() -> Self {
        Self {
            event_type: non_empty(ENV_EVENT_TYPE),
            book_path: non_empty(ENV_BOOK_PATH),
            api_key: non_empty(ENV_API_KEY),
            kindle_email: non_empty(ENV_KINDLE_EMAIL),
            from_email: non_empty(ENV_FROM_EMAIL),
        }
    }

    /// Apply the ordered short-circuit checks.
    ///
    /// The checks run in this order, and none runs after the first one
    /// that fires:
    ///
    /// 1. missing API key → `Err(MissingApiKey)` (fatal, nothing attempted)
    /// 2. `Test` event → `Ok(Gate::Skip(TestEvent))`
    /// 3. missing book path → `Ok(Gate::Skip(MissingBookPath))`
    /// 4. missing event type → `Ok(Gate::Skip(MissingEventType))`
    /// 5. event type other than `Download` → `Ok(Gate::Skip(NotDownload))`
    /// 6. otherwise → `Ok(Gate::Proceed { book_path })`
    pub fn gate(&self) -> Result<Gate, HookError> {
        if self.api_key.is_none() {
            return Err(HookError::MissingApiKey);
        }
        if self.event_type.as_deref() == Some(EVENT_TEST) {
            return Ok(Gate::Skip(SkipReason::TestEvent));
        }
        let book_path = match &self.book_path {
            Some(p) => p.clone(),
            None => return Ok(Gate::Skip(SkipReason::MissingBookPath)),
        };
        let event_type = match &self.event_type {
            Some(e) => e,
            None => return Ok(Gate::Skip(SkipReason::MissingEventType)),
        };
        if event_type != EVENT_DOWNLOAD {
            return Ok(Gate::Skip(SkipReason::NotDownload {
                event_type: event_type.clone(),
            }));
        }
        Ok(Gate::Proceed { book_path })
    }

    /// The validated credentials bundle, checked only after the gate passes.
    pub fn credentials(&self) -> Result<Credentials, HookError> {
        Ok(Credentials {
            api_key: self.api_key.clone().ok_or(HookError::MissingApiKey)?,
            kindle_email: self
                .kindle_email
                .clone()
                .ok_or(HookError::MissingRecipient)?,
            from_email: self.from_email.clone().ok_or(HookError::MissingSender)?,
        })
    }
}

/// Outcome of the gate: act, or stop cleanly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Gate {
    /// All checks passed; the hook should run the pipeline on `book_path`.
    Proceed { book_path: String },
    /// A precondition says there is nothing to do. Exit 0.
    Skip(SkipReason),
}

/// Why a run ended early without doing anything.
///
/// None of these is an error: the host's self-test, foreign event types and
/// re-delivered events are all normal operation for a Readarr hook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "reason")]
pub enum SkipReason {
    /// Readarr's connection-test handshake.
    TestEvent,
    /// Event carried no book path.
    MissingBookPath,
    /// Event carried no event type.
    MissingEventType,
    /// Event type was present but not `Download`.
    NotDownload { event_type: String },
    /// Source extension is in the ignored set.
    IgnoredExtension { extension: String },
    /// The converted file already exists next to the source.
    AlreadyConverted { converted_filename: String },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::TestEvent => write!(f, "test event"),
            SkipReason::MissingBookPath => write!(f, "no book path in event"),
            SkipReason::MissingEventType => write!(f, "no event type in event"),
            SkipReason::NotDownload { event_type } => {
                write!(f, "event type '{event_type}' is not Download")
            }
            SkipReason::IgnoredExtension { extension } => {
                write!(f, "extension '{extension}' is ignored")
            }
            SkipReason::AlreadyConverted { converted_filename } => {
                write!(f, "'{converted_filename}' already exists")
            }
        }
    }
}

/// Delivery credentials, loaded once and never mutated.
#[derive(Clone)]
pub struct Credentials {
    pub api_key: String,
    pub kindle_email: String,
    pub from_email: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"<redacted>")
            .field("kindle_email", &self.kindle_email)
            .field("from_email", &self.from_email)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full() -> Trigger {
        Trigger {
            event_type: Some("Download".into()),
            book_path: Some("/books/Foo/Foo.epub".into()),
            api_key: Some("SG.key".into()),
            kindle_email: Some("reader@kindle.com".into()),
            from_email: Some("hook@example.com".into()),
        }
    }

    #[test]
    fn download_event_proceeds() {
        assert_eq!(
            full().gate().unwrap(),
            Gate::Proceed {
                book_path: "/books/Foo/Foo.epub".into()
            }
        );
    }

    #[test]
    fn missing_api_key_is_fatal_before_everything() {
        // Even a Test event must fail when the key is absent: the key
        // check is ordered first.
        let t = Trigger {
            api_key: None,
            event_type: Some("Test".into()),
            ..full()
        };
        assert!(matches!(t.gate(), Err(HookError::MissingApiKey)));
    }

    #[test]
    fn test_event_skips_before_path_check() {
        let t = Trigger {
            event_type: Some("Test".into()),
            book_path: None,
            ..full()
        };
        assert_eq!(t.gate().unwrap(), Gate::Skip(SkipReason::TestEvent));
    }

    #[test]
    fn missing_book_path_skips() {
        let t = Trigger {
            book_path: None,
            ..full()
        };
        assert_eq!(t.gate().unwrap(), Gate::Skip(SkipReason::MissingBookPath));
    }

    #[test]
    fn missing_event_type_skips_after_path_check() {
        let t = Trigger {
            event_type: None,
            ..full()
        };
        assert_eq!(t.gate().unwrap(), Gate::Skip(SkipReason::MissingEventType));
    }

    #[test]
    fn foreign_event_type_skips() {
        let t = Trigger {
            event_type: Some("Upgrade".into()),
            ..full()
        };
        assert_eq!(
            t.gate().unwrap(),
            Gate::Skip(SkipReason::NotDownload {
                event_type: "Upgrade".into()
            })
        );
    }

    #[test]
    fn credentials_require_all_three() {
        let t = Trigger {
            kindle_email: None,
            ..full()
        };
        assert!(matches!(t.credentials(), Err(HookError::MissingRecipient)));

        let t = Trigger {
            from_email: None,
            ..full()
        };
        assert!(matches!(t.credentials(), Err(HookError::MissingSender)));

        let c = full().credentials().unwrap();
        assert_eq!(c.kindle_email, "reader@kindle.com");
    }
}
