//! Incident Bookmarks - PagerDuty Channel Bookmarker
//!
//! Resolves an incident channel (named `<prefix>_<incident number>`) to the
//! matching open PagerDuty incident and prints bookmark directives for it and
//! for the JIRA ticket linked through its external references.
//!
//! Directives go to stdout as `#!#<json>` lines. Diagnostics go to stderr and
//! are controlled with `RUST_LOG`.
//!
//! # Usage
//!
//! ```bash
//! export PAGERDUTY_API_TOKEN=u+abcdef
//!
//! incident-bookmarks '{"Channel": {"ID": "C024BE91L", "Name": "inc_1234"}}'
//!
//! # Against a different API host, with a request timeout
//! incident-bookmarks --api-url http://localhost:8080 --timeout 10 '{"Channel": ...}'
//! ```
//!
//! # Exit Codes
//!
//! - `0` - incident bookmarked (with or without a ticket)
//! - `1` - any failure; the error message is printed to stdout

mod bookmark;
mod channel;
mod error;
mod pagerduty;

use std::{io, time::Duration};

use clap::Parser;
use tracing::warn;
use tracing_subscriber::{EnvFilter, filter::LevelFilter};

use crate::{
    channel::ChannelInput,
    error::Error,
    pagerduty::{ClientConfig, DEFAULT_API_URL, PagerDutyClient},
};

/// Bookmarks the PagerDuty incident behind a chat channel.
#[derive(Parser, Debug)]
#[command(name = "incident-bookmarks")]
#[command(about = "Bookmarks the PagerDuty incident and JIRA ticket for an incident channel")]
struct Args {
    /// Channel payload, e.g. {"Channel": {"ID": "C1", "Name": "inc_42"}}.
    input: String,

    /// PagerDuty REST API token.
    #[arg(long, env = "PAGERDUTY_API_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// PagerDuty API base URL.
    #[arg(long, env = "PAGERDUTY_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,

    /// Incidents requested per page.
    #[arg(
        long,
        env = "PAGERDUTY_PAGE_LIMIT",
        default_value = "25",
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    limit: u32,

    /// Optional request timeout in seconds.
    #[arg(long, env = "PAGERDUTY_TIMEOUT")]
    timeout: Option<u64>,
}

/// Log filter from `RUST_LOG`-style directives, `warn` when none are given.
fn env_filter(directives: &str) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .parse_lossy(directives)
}

/// Rejects an absent or empty token.
fn require_token(token: Option<String>) -> Result<String, Error> {
    token.filter(|t| !t.is_empty()).ok_or(Error::MissingToken)
}

/// Resolves the channel and writes its bookmarks to stdout.
async fn run(args: Args) -> Result<(), Error> {
    let token = require_token(args.token)?;

    let input = ChannelInput::parse(&args.input)?;
    let number = input.channel.incident_number()?;

    let client = PagerDutyClient::new(ClientConfig {
        api_url: args.api_url,
        limit: args.limit,
        timeout: args.timeout.map(Duration::from_secs),
        ..ClientConfig::new(token)
    })?;
    let incident = client.find_incident(number).await?;

    let mut stdout = io::stdout().lock();
    if !bookmark::write_bookmarks(&mut stdout, &input.channel.id, &incident)? {
        warn!(number, "incident has no linked JIRA issue");
    }

    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(env_filter(
            &std::env::var(EnvFilter::DEFAULT_ENV).unwrap_or_default(),
        ))
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    if let Err(e) = run(args).await {
        println!("{e}");
        std::process::exit(1);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn token_must_be_present() {
        assert!(matches!(require_token(None), Err(Error::MissingToken)));
        assert!(matches!(
            require_token(Some(String::new())),
            Err(Error::MissingToken)
        ));
        assert_eq!(require_token(Some("abc".to_string())).unwrap(), "abc");
    }

    #[test]
    fn missing_token_message_names_variable() {
        assert!(Error::MissingToken.to_string().contains("PAGERDUTY_API_TOKEN"));
    }

    #[test]
    fn args_defaults() {
        let args = Args::try_parse_from(["incident-bookmarks", "{}"]).unwrap();

        assert_eq!(args.input, "{}");
        assert_eq!(args.limit, 25);
        assert_eq!(args.timeout, None);
    }

    #[test]
    fn zero_page_limit_is_rejected() {
        let err =
            Args::try_parse_from(["incident-bookmarks", "--limit", "0", "{}"]).unwrap_err();

        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn log_level_defaults_to_warn() {
        assert_eq!(env_filter("").max_level_hint(), Some(LevelFilter::WARN));
    }

    #[test]
    fn rust_log_level_overrides_default() {
        assert_eq!(env_filter("debug").max_level_hint(), Some(LevelFilter::DEBUG));
        assert_eq!(env_filter("error").max_level_hint(), Some(LevelFilter::ERROR));
    }

    #[test]
    fn args_overrides() {
        let args = Args::try_parse_from([
            "incident-bookmarks",
            "--token",
            "t0k",
            "--api-url",
            "http://localhost:9000",
            "--limit",
            "100",
            "--timeout",
            "5",
            "{}",
        ])
        .unwrap();

        assert_eq!(args.token.as_deref(), Some("t0k"));
        assert_eq!(args.api_url, "http://localhost:9000");
        assert_eq!(args.limit, 100);
        assert_eq!(args.timeout, Some(5));
    }
}
