//! HTTP calendar client
//!
//! Speaks a Google-Calendar-v3-shaped events API: POST
//! `{base}/calendars/{calendar_id}/events` with a bearer token. Event times
//! go out as RFC 3339 with a fixed "UTC" timezone label.

use super::{CalendarClient, CalendarError, CalendarEvent};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/calendar/v3";

// The conversation never waits on this client, but the worker should not
// hang on a dead connection either.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Environment-driven configuration for the calendar boundary
#[derive(Debug, Clone)]
pub struct CalendarConfig {
    pub token: Option<String>,
    pub base_url: String,
    pub calendar_id: String,
}

impl CalendarConfig {
    pub fn from_env() -> Self {
        Self {
            token: std::env::var("CALENDAR_API_TOKEN").ok(),
            base_url: std::env::var("CALENDAR_API_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            calendar_id: std::env::var("CALENDAR_ID").unwrap_or_else(|_| "primary".to_string()),
        }
    }
}

/// Production calendar client
pub struct HttpCalendarClient {
    client: Client,
    token: String,
    events_url: String,
}

impl HttpCalendarClient {
    /// `token` must be a ready-to-use bearer token; refresh is external.
    pub fn new(token: String, base_url: &str, calendar_id: &str) -> Self {
        let events_url = format!(
            "{}/calendars/{}/events",
            base_url.trim_end_matches('/'),
            calendar_id
        );
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to create HTTP client");
        Self {
            client,
            token,
            events_url,
        }
    }
}

#[derive(Serialize)]
struct EventBody<'a> {
    summary: &'a str,
    start: EventTime,
    end: EventTime,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EventTime {
    date_time: String,
    time_zone: &'static str,
}

impl EventTime {
    fn utc(ts: DateTime<Utc>) -> Self {
        Self {
            date_time: ts.to_rfc3339_opts(SecondsFormat::Secs, true),
            time_zone: "UTC",
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventCreated {
    #[serde(default)]
    html_link: Option<String>,
    #[serde(default)]
    id: Option<String>,
}

#[async_trait]
impl CalendarClient for HttpCalendarClient {
    async fn create_event(&self, event: &CalendarEvent) -> Result<String, CalendarError> {
        let body = EventBody {
            summary: &event.summary,
            start: EventTime::utc(event.start),
            end: EventTime::utc(event.end),
        };

        let response = self
            .client
            .post(&self.events_url)
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await
            .map_err(|e| CalendarError::network(format!("calendar request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(error_for_status(status, &detail));
        }

        let created: EventCreated = response
            .json()
            .await
            .map_err(|e| CalendarError::unknown(format!("malformed create-event response: {e}")))?;
        Ok(created
            .html_link
            .or(created.id)
            .unwrap_or_else(|| "<no link>".to_string()))
    }
}

fn error_for_status(status: StatusCode, detail: &str) -> CalendarError {
    let message = format!("calendar returned {status}: {detail}");
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => CalendarError::auth(message),
        StatusCode::TOO_MANY_REQUESTS => CalendarError::rate_limit(message),
        s if s.is_server_error() => CalendarError::server_error(message),
        s if s.is_client_error() => CalendarError::invalid_request(message),
        _ => CalendarError::unknown(message),
    }
}
