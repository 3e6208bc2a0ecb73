//! CLI binary for book2kindle.
//!
//! A thin shim over the library crate: load the `.env` credential store,
//! snapshot the Readarr environment, map CLI flags to `HookConfig`, run the
//! pipeline, and translate the outcome into an exit code. Wire it up in
//! Readarr under Settings → Connect → Custom Script.

use anyhow::{Context, Result};
use book2kindle::{run, HookConfig, Trigger};
use clap::Parser;
use std::io;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

const AFTER_HELP: &str = r#"EXAMPLES:
  # As Readarr runs it (event data arrives via environment)
  book2kindle

  # Convert to AZW3 instead of MOBI
  book2kindle --format azw3

  # Calibre installed outside PATH
  book2kindle --converter /opt/calibre/ebook-convert

  # Slow NAS: wait up to 30 checks, 2s apart
  book2kindle --poll-attempts 30 --poll-interval-ms 2000

  # Print the structured outcome
  book2kindle --json

ENVIRONMENT (set by Readarr):
  readarr_eventtype         "Download" to act, "Test" for the handshake
  readarr_addedbookpaths    absolute path of the imported book file

ENVIRONMENT (the hook's .env file, next to the binary or in $PWD):
  READARR_SNDGRD_AP_KY      SendGrid API key
  READARR_KINDLE_EMAIL      your @kindle.com address
  READARR_FROM_EMAIL        sender verified with SendGrid

EXIT CODES:
  0  delivered, or nothing to do (test event, ignored extension,
     already converted, foreign event type)
  1  fatal error (missing credentials, converter failure or timeout,
     output never appeared, delivery rejected)

Remember to allow READARR_FROM_EMAIL in the Kindle's approved sender
list, or Amazon silently drops the message.
"#;

/// Convert a freshly downloaded ebook and mail it to a Kindle.
#[derive(Parser, Debug)]
#[command(
    name = "book2kindle",
    version,
    about = "Readarr download hook: Calibre-convert the new book and mail it to a Kindle",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Converter binary invoked as `<converter> <source> <destination>`.
    #[arg(long, env = "B2K_CONVERTER", default_value = "ebook-convert")]
    converter: PathBuf,

    /// Target format token (destination extension).
    #[arg(long, env = "B2K_FORMAT", default_value = "mobi")]
    format: String,

    /// Source extensions to skip, comma-separated.
    #[arg(
        long,
        env = "B2K_IGNORE",
        default_value = "pdf,m4b,mp3",
        value_delimiter = ','
    )]
    ignore: Vec<String>,

    /// Directory re-checks before declaring the conversion lost.
    #[arg(long, env = "B2K_POLL_ATTEMPTS", default_value_t = 5,
          value_parser = clap::value_parser!(u32).range(1..))]
    poll_attempts: u32,

    /// Sleep between directory re-checks, in milliseconds.
    #[arg(long, env = "B2K_POLL_INTERVAL_MS", default_value_t = 1000)]
    poll_interval_ms: u64,

    /// Converter deadline in seconds; a timeout counts as a failed run.
    #[arg(long, env = "B2K_CONVERT_TIMEOUT", default_value_t = 300)]
    convert_timeout: u64,

    /// mail/send HTTP deadline in seconds.
    #[arg(long, env = "B2K_API_TIMEOUT", default_value_t = 60)]
    api_timeout: u64,

    /// Subject line of the delivery email.
    #[arg(long, env = "B2K_SUBJECT", default_value = "Send To Kindle")]
    subject: String,

    /// Print the structured run outcome as JSON on stdout.
    #[arg(long, env = "B2K_JSON")]
    json: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "B2K_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "B2K_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Credentials live in the hook's own .env, not Readarr's environment;
    // load it before the snapshot so Trigger::from_env sees the merge.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Snapshot the trigger and build the config ────────────────────────
    let trigger = Trigger::from_env();

    let config = HookConfig::builder()
        .converter(cli.converter)
        .output_format(cli.format)
        .ignored_extensions(cli.ignore)
        .poll_attempts(cli.poll_attempts)
        .poll_interval(Duration::from_millis(cli.poll_interval_ms))
        .convert_timeout(Duration::from_secs(cli.convert_timeout))
        .api_timeout(Duration::from_secs(cli.api_timeout))
        .subject(cli.subject)
        .build()
        .context("Invalid configuration")?;

    // ── Run ──────────────────────────────────────────────────────────────
    // One error-reporting convention for every fatal path: a single
    // structured error line, then exit 1. Skips and success exit 0.
    let outcome = match run(&trigger, &config).await {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::error!(error = %e, "hook run failed");
            std::process::exit(1);
        }
    };

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&outcome).context("Failed to serialise outcome")?
        );
    }

    // Skips and deliveries both exit 0; run() already logged which one.
    Ok(())
}
