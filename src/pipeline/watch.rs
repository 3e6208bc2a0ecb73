//! Bounded poll for the converted file's appearance.
//!
//! `ebook-convert` exiting 0 only promises the destination file will
//! *eventually* be visible — on network shares the write can trail the
//! process exit. There is no inotify here on purpose: the wait is almost
//! always a single iteration, and a filesystem-watch subscription for a
//! one-shot hook costs more than it buys. Instead the folder is re-listed
//! fresh on every attempt (never cached — the converter writes
//! asynchronously) with a fixed sleep between misses, bounded by the
//! configured attempt count so the hook cannot hang.

use crate::error::HookError;
use crate::paths;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Where the wait currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    /// File not seen yet, attempts remain.
    Waiting { attempt: u32 },
    /// File observed. Terminal success.
    Ready { attempts: u32 },
    /// Attempt bound exhausted without the file appearing. Terminal failure.
    Exhausted { attempts: u32 },
}

/// Pure transition function: fold one directory observation into the state.
///
/// Kept separate from the sleeping loop so the bound arithmetic is
/// testable without waiting on a clock.
pub fn advance(state: PollState, present: bool, max_attempts: u32) -> PollState {
    match state {
        PollState::Waiting { attempt } if present => PollState::Ready { attempts: attempt },
        PollState::Waiting { attempt } if attempt >= max_attempts => {
            PollState::Exhausted { attempts: attempt }
        }
        PollState::Waiting { attempt } => PollState::Waiting {
            attempt: attempt + 1,
        },
        terminal => terminal,
    }
}

/// Wait until `expected` shows up in `folder`, or give up.
///
/// Returns the number of attempts used on success.
pub async fn await_converted(
    folder: &str,
    expected: &str,
    max_attempts: u32,
    interval: Duration,
) -> Result<u32, HookError> {
    let mut state = PollState::Waiting { attempt: 1 };

    loop {
        let present = match paths::list_filenames(folder) {
            Ok(names) => names.iter().any(|n| n == expected),
            Err(e) => {
                // A transient listing error counts as a miss; the bound
                // still terminates the loop.
                warn!(folder, error = %e, "directory listing failed");
                false
            }
        };

        state = advance(state, present, max_attempts);
        match state {
            PollState::Ready { attempts } => {
                debug!(expected, attempts, "converted file observed");
                return Ok(attempts);
            }
            PollState::Exhausted { attempts } => {
                return Err(HookError::ConversionMissing {
                    folder: folder.to_string(),
                    expected: expected.to_string(),
                    attempts,
                });
            }
            PollState::Waiting { attempt } => {
                debug!(expected, attempt, "converted file not present yet");
                sleep(interval).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn present_is_ready_on_first_attempt() {
        let s = advance(PollState::Waiting { attempt: 1 }, true, 5);
        assert_eq!(s, PollState::Ready { attempts: 1 });
    }

    #[test]
    fn miss_increments_by_one() {
        // The counter steps linearly: 5 misses take 5 real iterations,
        // not the 3 a self-doubling counter would.
        let mut s = PollState::Waiting { attempt: 1 };
        for expected in 2..=5 {
            s = advance(s, false, 5);
            assert_eq!(s, PollState::Waiting { attempt: expected });
        }
    }

    #[test]
    fn bound_exhausts_exactly_at_max() {
        let mut s = PollState::Waiting { attempt: 1 };
        for _ in 0..4 {
            s = advance(s, false, 5);
        }
        assert_eq!(s, PollState::Waiting { attempt: 5 });
        s = advance(s, false, 5);
        assert_eq!(s, PollState::Exhausted { attempts: 5 });
    }

    #[test]
    fn terminal_states_are_sticky() {
        let ready = PollState::Ready { attempts: 2 };
        assert_eq!(advance(ready, false, 5), ready);
        let gone = PollState::Exhausted { attempts: 5 };
        assert_eq!(advance(gone, true, 5), gone);
    }

    #[tokio::test]
    async fn observes_file_written_mid_wait() {
        let dir = tempfile::tempdir().unwrap();
        let folder = format!("{}/", dir.path().display());
        let target = dir.path().join("Foo.mobi");

        let writer = tokio::spawn(async move {
            sleep(Duration::from_millis(30)).await;
            std::fs::write(target, b"mobi").unwrap();
        });

        let attempts = await_converted(&folder, "Foo.mobi", 50, Duration::from_millis(10))
            .await
            .unwrap();
        assert!(attempts > 1);
        writer.await.unwrap();
    }

    #[tokio::test]
    async fn exhausts_when_file_never_appears() {
        let dir = tempfile::tempdir().unwrap();
        let folder = format!("{}/", dir.path().display());

        let err = await_converted(&folder, "Foo.mobi", 3, Duration::from_millis(5))
            .await
            .unwrap_err();
        match err {
            HookError::ConversionMissing { attempts, .. } => assert_eq!(attempts, 3),
            other => panic!("expected ConversionMissing, got {other:?}"),
        }
    }
}
