#![allow(clippy::print_stderr, clippy::print_stdout)]

//! CLI entrypoint for `crossutil`.
//!
//! The helpers themselves live in the `crossutil` library crate (`src/id.rs`, `src/error.rs`, `src/locale.rs`).

use anyhow::Context;
use clap::{Parser, Subcommand};
use crossutil::error::normalize_error;
use crossutil::id::{IdGenerator, SourceKind, DEFAULT_ID_LENGTH};
use crossutil::locale::resolve_locale_key;
use serde::Serialize;
use serde_json::Value;
use std::io::Write;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the `tracing` filter directive.
const LOG_ENV: &str = "CROSSUTIL_LOG";
const DEFAULT_LOG_FILTER: &str = "warn";

#[derive(Parser)]
#[command(
    name = "crossutil",
    version,
    about = "Cross-environment helpers: random ids, error messages, locale keys",
    long_about = "Cross-environment helpers: random ids, error messages, locale keys.\n\n\
None of the helpers fail: `id` degrades to a timestamp-derived value when no random source works,\n\
`error` always produces a message, and `locale` always produces `zh-CN` or `en-US`.\n\n\
Use `--json` for machine-readable output. Diagnostics go to stderr; set CROSSUTIL_LOG=debug to see\n\
which random sources were tried.",
    after_long_help = r#"Examples:
  crossutil id
  crossutil id --length 36
  crossutil id --length 12 --source getrandom --source os-rng
  crossutil error 'boom'
  crossutil error --input-json '{"msg":"oops"}'
  crossutil locale zh-TW
"#
)]
struct Cli {
    #[arg(
        long,
        global = true,
        env = "CROSSUTIL_JSON",
        default_value_t = false,
        help = "Emit pretty JSON (suitable for scripting)."
    )]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a random identifier (hex, or a UUID for 36+ characters).
    #[command(after_long_help = r#"Selection:
  - Sources are probed in order; the first that works produces the id.
  - With --length 36 or more the result is a canonical 36-character UUID.
  - If every source fails, a base-36 timestamp is used (not random, not unique).

Examples:
  crossutil id --length 8
  crossutil id --length 36 --json
  crossutil id --clock-only
"#)]
    Id {
        #[arg(
            long,
            default_value_t = DEFAULT_ID_LENGTH,
            value_name = "N",
            help = "Number of characters to generate."
        )]
        length: usize,
        #[arg(
            long = "source",
            value_enum,
            ignore_case = true,
            value_name = "SOURCE",
            help = "Random source to probe; repeat to set the order (default: os-rng, getrandom)."
        )]
        sources: Vec<SourceKind>,
        #[arg(
            long,
            conflicts_with = "sources",
            help = "Skip every random source and use the timestamp fallback."
        )]
        clock_only: bool,
    },
    /// Normalize an error-like value into a human-readable message.
    #[command(after_long_help = r#"Input:
  - By default, INPUT is treated as a plain message and printed unchanged.
  - With --input-json, INPUT is parsed as JSON; objects yield `msg`, then `message`,
    then their compact JSON.

Examples:
  crossutil error 'connection reset'
  crossutil error --input-json '{"message":"denied","code":403}'
"#)]
    Error {
        #[arg(value_name = "INPUT", allow_hyphen_values = true)]
        input: String,
        #[arg(long, help = "Interpret INPUT as JSON instead of a plain string.")]
        input_json: bool,
    },
    /// Resolve a language tag to `zh-CN` or `en-US`.
    Locale {
        #[arg(value_name = "LANGUAGE", allow_hyphen_values = true)]
        language: String,
    },
}

fn main() {
    init_logging();
    if let Err(err) = run() {
        eprintln!("{err:?}");
        std::process::exit(1);
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .compact(),
        )
        .init();
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Id {
            length,
            sources,
            clock_only,
        } => {
            let generator = if clock_only {
                IdGenerator::with_sources(Vec::new())
            } else if sources.is_empty() {
                IdGenerator::default()
            } else {
                IdGenerator::from_kinds(&sources)
            };
            tracing::debug!(sources = ?generator.source_names(), length, "generating id");

            let generated = generator.generate_with_source(length);
            if cli.json {
                write_json(&generated)?;
            } else {
                println!("{}", generated.id);
            }
        }

        Commands::Error { input, input_json } => {
            let message = if input_json {
                let value = parse_input(&input)?;
                normalize_error(&value)
            } else {
                normalize_error(&input)
            };
            write_text(cli.json, &message)?;
        }

        Commands::Locale { language } => {
            let key = resolve_locale_key(&language);
            write_text(cli.json, key.as_str())?;
        }
    }

    Ok(())
}

fn parse_input(raw: &str) -> anyhow::Result<Value> {
    serde_json::from_str(raw).context("parse INPUT as JSON")
}

fn write_text(json: bool, text: &str) -> anyhow::Result<()> {
    if json {
        write_json(&text)
    } else {
        println!("{text}");
        Ok(())
    }
}

fn write_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    let mut stdout = std::io::stdout();
    let raw = serde_json::to_string_pretty(value).context("serialize JSON")?;
    stdout.write_all(raw.as_bytes()).context("write stdout")?;
    stdout.write_all(b"\n").context("write stdout newline")?;
    Ok(())
}
