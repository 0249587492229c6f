//! Error types for incident bookmarking.

use thiserror::Error;

/// Errors that abort a bookmarking run.
#[derive(Debug, Error)]
pub enum Error {
    /// No API token was supplied
    #[error(
        "PagerDuty API token not found. Please specify it as PAGERDUTY_API_TOKEN with dynamic config"
    )]
    MissingToken,

    /// The command-line argument is not a valid channel payload
    #[error("invalid channel input: {0}")]
    Input(#[source] serde_json::Error),

    /// The channel name does not carry an incident number
    #[error("channel name '{name}' does not end in _<incident number>")]
    ChannelName { name: String },

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// PagerDuty answered with a non-success status
    #[error("PagerDuty API returned {status}: {body}")]
    Api {
        status: reqwest::StatusCode,
        body: String,
    },

    /// The response body is not an incident listing
    #[error("failed to decode PagerDuty response: {0}")]
    Decode(#[source] serde_json::Error),

    /// The next page offset does not fit in a u32
    #[error("pagination offset overflow: {offset} + {limit}")]
    OffsetOverflow { offset: u32, limit: u32 },

    /// Pagination ran out without a matching incident
    #[error("Failed to find incident.")]
    IncidentNotFound,

    /// Serialization error
    #[error("failed to encode bookmark: {0}")]
    Serialization(#[source] serde_json::Error),

    /// Writing to stdout failed
    #[error("failed to write output: {0}")]
    Io(#[from] std::io::Error),
}
