//! Configuration types for the download hook.
//!
//! All hook behaviour is controlled through [`HookConfig`], built via its
//! [`HookConfigBuilder`] and passed explicitly into every pipeline stage.
//! Keeping every knob in one struct makes a run reproducible from its config
//! alone and keeps the stages free of ad-hoc environment reads.
//!
//! # Design choice: builder over constructor
//! The hook has enough knobs (converter path, format, ignore list, poll
//! bound, three timeouts) that a positional constructor would be unreadable
//! and break on every new field. The builder lets callers set only what they
//! care about and rely on documented defaults for the rest.

use crate::error::HookError;
use crate::pipeline::deliver::Mailer;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Default converter binary, resolved on `PATH`.
pub const DEFAULT_CONVERTER: &str = "ebook-convert";

/// Target format token appended to the filename stem.
pub const DEFAULT_OUTPUT_FORMAT: &str = "mobi";

/// Source extensions for which no conversion or delivery is attempted.
///
/// `pdf` is readable on a Kindle as-is; `m4b`/`mp3` are audiobooks that
/// Calibre cannot convert to a page format anyway.
pub const DEFAULT_IGNORED_EXTENSIONS: &[&str] = &["pdf", "m4b", "mp3"];

/// Configuration for one hook run.
///
/// Built via [`HookConfig::builder()`] or using [`HookConfig::default()`].
///
/// # Example
/// ```rust
/// use book2kindle::HookConfig;
///
/// let config = HookConfig::builder()
///     .output_format("azw3")
///     .poll_attempts(10)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct HookConfig {
    /// Converter binary invoked as `<converter> <source> <destination>`.
    /// Default: `ebook-convert` (Calibre) on `PATH`.
    pub converter: PathBuf,

    /// Target format token; the converted filename is `<stem>.<format>`.
    /// Default: `mobi`.
    pub output_format: String,

    /// Source extensions (lowercase) that skip the run entirely.
    /// Compared case-insensitively against the source file's extension.
    pub ignored_extensions: Vec<String>,

    /// Maximum directory re-checks before declaring the conversion lost.
    /// Default: 5.
    ///
    /// The converter holds the destination path while it writes; the file
    /// shows up in the listing shortly after the process exits. Five checks
    /// a second apart covers slow network shares with a wide margin.
    pub poll_attempts: u32,

    /// Sleep between directory re-checks. Default: 1 s.
    pub poll_interval: Duration,

    /// Deadline for the converter subprocess. Default: 300 s.
    ///
    /// Treated exactly like a non-zero exit when it fires. Large books on
    /// slow hardware can take minutes; five of them has never been observed.
    pub convert_timeout: Duration,

    /// Deadline for the mail/send HTTP call. Default: 60 s.
    ///
    /// Attachment upload dominates this: a 10 MB book on a slow uplink
    /// needs well over reqwest's default of 30 s.
    pub api_timeout: Duration,

    /// Subject line of the delivery email. Default: `Send To Kindle`.
    pub subject: String,

    /// HTML body of the delivery email. Default: `Send To Kindle`.
    ///
    /// Amazon's ingestion ignores the body; it exists so the message is not
    /// empty for human recipients testing with a normal mailbox.
    pub html_body: String,

    /// Pre-constructed mailer. Takes precedence over the built-in SendGrid
    /// client; used by tests and embedders that need a custom transport.
    pub mailer: Option<Arc<dyn Mailer>>,
}

impl Default for HookConfig {
    fn default() -> Self {
        Self {
            converter: PathBuf::from(DEFAULT_CONVERTER),
            output_format: DEFAULT_OUTPUT_FORMAT.to_string(),
            ignored_extensions: DEFAULT_IGNORED_EXTENSIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            poll_attempts: 5,
            poll_interval: Duration::from_secs(1),
            convert_timeout: Duration::from_secs(300),
            api_timeout: Duration::from_secs(60),
            subject: "Send To Kindle".to_string(),
            html_body: "Send To Kindle".to_string(),
            mailer: None,
        }
    }
}

impl fmt::Debug for HookConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookConfig")
            .field("converter", &self.converter)
            .field("output_format", &self.output_format)
            .field("ignored_extensions", &self.ignored_extensions)
            .field("poll_attempts", &self.poll_attempts)
            .field("poll_interval", &self.poll_interval)
            .field("convert_timeout", &self.convert_timeout)
            .field("api_timeout", &self.api_timeout)
            .field("subject", &self.subject)
            .field("mailer", &self.mailer.as_ref().map(|_| "<dyn Mailer>"))
            .finish()
    }
}

impl HookConfig {
    /// Create a new builder for `HookConfig`.
    pub fn builder() -> HookConfigBuilder {
        HookConfigBuilder {
            config: Self::default(),
        }
    }

    /// True when `extension` is in the ignored set, compared
    /// case-insensitively.
    pub fn is_ignored_extension(&self, extension: &str) -> bool {
        let ext = extension.to_lowercase();
        self.ignored_extensions.iter().any(|e| *e == ext)
    }
}

/// Builder for [`HookConfig`].
#[derive(Debug)]
pub struct HookConfigBuilder {
    config: HookConfig,
}

impl HookConfigBuilder {
    pub fn converter(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.converter = path.into();
        self
    }

    pub fn output_format(mut self, format: impl Into<String>) -> Self {
        self.config.output_format = format.into();
        self
    }

    /// Replace the ignored-extension set. Entries are lowercased.
    pub fn ignored_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.ignored_extensions = extensions
            .into_iter()
            .map(|s| s.into().to_lowercase())
            .collect();
        self
    }

    pub fn poll_attempts(mut self, n: u32) -> Self {
        self.config.poll_attempts = n.max(1);
        self
    }

    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.config.poll_interval = interval;
        self
    }

    pub fn convert_timeout(mut self, timeout: Duration) -> Self {
        self.config.convert_timeout = timeout;
        self
    }

    pub fn api_timeout(mut self, timeout: Duration) -> Self {
        self.config.api_timeout = timeout;
        self
    }

    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.config.subject = subject.into();
        self
    }

    pub fn html_body(mut self, body: impl Into<String>) -> Self {
        self.config.html_body = body.into();
        self
    }

    pub fn mailer(mut self, mailer: Arc<dyn Mailer>) -> Self {
        self.config.mailer = Some(mailer);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<HookConfig, HookError> {
        let c = &self.config;
        if c.output_format.is_empty() || c.output_format.contains('.') {
            return Err(HookError::InvalidConfig(format!(
                "output format must be a bare extension token, got '{}'",
                c.output_format
            )));
        }
        if c.poll_attempts == 0 {
            return Err(HookError::InvalidConfig(
                "poll attempts must be ≥ 1".into(),
            ));
        }
        if c.convert_timeout.is_zero() {
            return Err(HookError::InvalidConfig(
                "convert timeout must be non-zero".into(),
            ));
        }
        Ok(self.config)
    }
}
