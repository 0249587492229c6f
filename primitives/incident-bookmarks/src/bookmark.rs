//! Bookmark directives for the chat platform.
//!
//! Each directive is one stdout line: the `#!#` marker followed by the JSON
//! encoding of a [`BookmarkDirective`].

use std::io::Write;

use serde::Serialize;

use crate::error::Error;
use crate::pagerduty::IncidentMatch;

/// Marker the chat platform scans stdout for.
pub const DIRECTIVE_MARKER: &str = "#!#";

/// Printed instead of a second bookmark when no ticket is linked.
pub const MISSING_TICKET_MESSAGE: &str = "Failed to find JIRA issue for incident";

/// Pins `content` under `title` in a channel.
#[derive(Debug, Serialize)]
pub struct BookmarkDirective<'a> {
    #[serde(rename = "Action")]
    action: &'static str,

    #[serde(rename = "ChannelID")]
    channel_id: &'a str,

    #[serde(rename = "Title")]
    title: String,

    #[serde(rename = "Content")]
    content: &'a str,
}

impl<'a> BookmarkDirective<'a> {
    pub fn new(channel_id: &'a str, title: impl Into<String>, content: &'a str) -> Self {
        Self {
            action: "bookmark",
            channel_id,
            title: title.into(),
            content,
        }
    }

    /// Formats the directive as a marker-prefixed line, without the newline.
    pub fn render(&self) -> Result<String, Error> {
        let json = serde_json::to_string(self).map_err(Error::Serialization)?;
        Ok(format!("{DIRECTIVE_MARKER}{json}"))
    }
}

/// Writes the incident bookmark and, when linked, the ticket bookmark.
///
/// Returns whether a ticket bookmark was written.
pub fn write_bookmarks<W: Write>(
    out: &mut W,
    channel_id: &str,
    incident: &IncidentMatch,
) -> Result<bool, Error> {
    let pagerduty = BookmarkDirective::new(channel_id, "PagerDuty", &incident.url);
    writeln!(out, "{}", pagerduty.render()?)?;

    let written = match &incident.ticket {
        Some(ticket) => {
            let title = format!("JIRA: {}", ticket.id);
            let jira = BookmarkDirective::new(channel_id, title, &ticket.url);
            writeln!(out, "{}", jira.render()?)?;
            true
        }
        None => {
            writeln!(out, "{MISSING_TICKET_MESSAGE}")?;
            false
        }
    };

    out.flush()?;
    Ok(written)
}
