// Source fetcher - one blocking call to the statistics API per run

use crate::data_quality::RawRecord;
use crate::error::FetchError;
use crate::fields::format_timestamp;
use chrono::NaiveDateTime;
use std::time::Duration;
use tracing::{error, info};

/// Time window of attempts to request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

/// Anything that can hand over a batch of raw records for a window.
pub trait SourceFetcher {
    fn fetch(&self, window: &TimeWindow) -> Result<Vec<RawRecord>, FetchError>;
}

/// Credentials identifying the caller to the statistics API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    pub client: String,
    pub client_key: String,
}

pub struct HttpFetcher {
    api_url: String,
    credentials: ApiClient,
    http: reqwest::blocking::Client,
}

impl HttpFetcher {
    pub fn new(api_url: impl Into<String>, credentials: ApiClient) -> Result<Self, FetchError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()?;

        Ok(HttpFetcher {
            api_url: api_url.into(),
            credentials,
            http,
        })
    }

    /// Query string sent upstream.
    pub fn query(&self, window: &TimeWindow) -> Vec<(&'static str, String)> {
        vec![
            ("client", self.credentials.client.clone()),
            ("client_key", self.credentials.client_key.clone()),
            ("start", format_timestamp(&window.start)),
            ("end", format_timestamp(&window.end)),
        ]
    }
}

impl SourceFetcher for HttpFetcher {
    fn fetch(&self, window: &TimeWindow) -> Result<Vec<RawRecord>, FetchError> {
        info!(url = %self.api_url, "Downloading records from API");

        let response = self
            .http
            .get(&self.api_url)
            .query(&self.query(window))
            .send()?;

        let status = response.status();
        info!(status = status.as_u16(), "API responded");
        if !status.is_success() {
            error!(status = status.as_u16(), "API access failed");
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = response.text()?;
        let records = decode_records(&body)?;
        info!(records = records.len(), "Records downloaded");
        Ok(records)
    }
}

/// Body must be a JSON array of objects.
pub fn decode_records(body: &str) -> Result<Vec<RawRecord>, FetchError> {
    serde_json::from_str::<Vec<RawRecord>>(body).map_err(|e| FetchError::Decode(e.to_string()))
}
