//! PagerDuty incident lookup.
//!
//! Pages through open (triggered or acknowledged) incidents until one with the
//! requested incident number turns up, then reports its URL together with the
//! JIRA ticket linked through its external references.

use std::time::Duration;

use reqwest::{Client, header};
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::Error;

/// Production API endpoint.
pub const DEFAULT_API_URL: &str = "https://api.pagerduty.com";

/// External reference summary that marks a JIRA ticket.
const JIRA_SUMMARY: &str = "JIRA";

const ACCEPT_V2: &str = "application/vnd.pagerduty+json;version=2";

/// One page of `GET /incidents`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct IncidentPage {
    pub incidents: Vec<Incident>,
    pub more: bool,
    pub limit: u32,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Incident {
    pub id: String,
    pub incident_number: i64,
    pub external_references: Vec<ExternalReference>,
    pub html_url: String,
}

/// Link from an incident to a record in another system.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ExternalReference {
    pub summary: String,
    pub external_id: String,
    pub external_url: String,
}

/// Ticket linked to a matched incident.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkedTicket {
    pub id: String,
    pub url: String,
}

/// The incident a channel resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncidentMatch {
    pub url: String,
    pub ticket: Option<LinkedTicket>,
}

impl Incident {
    /// Last JIRA reference wins; one without a URL is no ticket at all.
    fn jira_ticket(&self) -> Option<LinkedTicket> {
        self.external_references
            .iter()
            .rev()
            .find(|r| r.summary == JIRA_SUMMARY)
            .filter(|r| !r.external_url.is_empty())
            .map(|r| LinkedTicket {
                id: r.external_id.clone(),
                url: r.external_url.clone(),
            })
    }
}

/// Connection settings for [`PagerDutyClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_url: String,
    pub token: String,
    pub limit: u32,
    pub timeout: Option<Duration>,
}

impl ClientConfig {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            token: token.into(),
            limit: 25,
            timeout: None,
        }
    }
}

/// Read-only client for the incidents endpoint.
pub struct PagerDutyClient {
    client: Client,
    incidents_url: String,
    token: String,
    limit: u32,
}

impl PagerDutyClient {
    pub fn new(config: ClientConfig) -> Result<Self, Error> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            incidents_url: format!("{}/incidents", config.api_url.trim_end_matches('/')),
            token: config.token,
            // a zero limit would never advance the offset
            limit: config.limit.max(1),
        })
    }

    /// Fetches the page of open incidents starting at `offset`.
    pub async fn list_incidents(&self, offset: u32) -> Result<IncidentPage, Error> {
        let limit = self.limit.to_string();
        let offset = offset.to_string();

        let response = self
            .client
            .get(&self.incidents_url)
            .query(&[
                ("include[]", "external_references"),
                ("statuses[]", "triggered"),
                ("statuses[]", "acknowledged"),
                ("limit", limit.as_str()),
                ("offset", offset.as_str()),
            ])
            .header(header::AUTHORIZATION, format!("Token token={}", self.token))
            .header(header::ACCEPT, ACCEPT_V2)
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            return Err(Error::Api {
                status,
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }

        serde_json::from_slice(&body).map_err(Error::Decode)
    }

    /// Pages through incidents until `number` is found.
    ///
    /// Stops requesting pages as soon as the incident is seen. The offset
    /// advances by the `limit` the server reports for each page.
    pub async fn find_incident(&self, number: i64) -> Result<IncidentMatch, Error> {
        let mut offset: u32 = 0;

        loop {
            let page = self.list_incidents(offset).await?;
            debug!(
                offset,
                count = page.incidents.len(),
                more = page.more,
                "fetched incident page"
            );

            if let Some(incident) = page
                .incidents
                .iter()
                .find(|i| i.incident_number == number)
            {
                if incident.html_url.is_empty() {
                    return Err(Error::IncidentNotFound);
                }

                info!(incident = %incident.id, number, "matched incident");
                return Ok(IncidentMatch {
                    url: incident.html_url.clone(),
                    ticket: incident.jira_ticket(),
                });
            }

            if !page.more {
                return Err(Error::IncidentNotFound);
            }

            let step = if page.limit == 0 { self.limit } else { page.limit };
            offset = offset
                .checked_add(step)
                .ok_or(Error::OffsetOverflow { offset, limit: step })?;
        }
    }
}
