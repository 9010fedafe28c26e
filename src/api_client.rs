use reqwest::{StatusCode, Url};
use serde::Deserialize;
use thiserror::Error;

use crate::config::config::Config;
use crate::data::record::Record;

/// Query parameter carrying the pagination cursor
const OFFSET_PARAM: &str = "offset";

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Airtable fetch failed: {status}")]
    Status { status: u16 },

    #[error("Airtable request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("Airtable response could not be decoded: {0}")]
    Decode(#[source] reqwest::Error),

    #[error("Airtable API key missing: set the {env} environment variable")]
    MissingApiKey { env: String },

    #[error("Airtable endpoint missing: set AIRTABLE_URL or data_source.endpoint")]
    MissingEndpoint,

    #[error("Invalid Airtable endpoint {endpoint}: {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },
}

impl FetchError {
    /// Status code for non-success responses
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Status { status } => Some(*status),
            _ => None,
        }
    }

    /// Next step for the user when the token was rejected
    pub fn auth_hint(&self, api_key_env: &str) -> Option<String> {
        self.status()
            .filter(|s| is_auth_failure(*s))
            .map(|_| format!("The API token was rejected; check the {} environment variable", api_key_env))
    }
}

/// One page of the list-records response
#[derive(Debug, Deserialize)]
pub struct AirtablePage {
    #[serde(default)]
    pub records: Vec<Record>,
    /// Cursor for the next page; absent or empty on the last page
    pub offset: Option<String>,
}

impl AirtablePage {
    fn next_offset(&self) -> Option<&str> {
        self.offset.as_deref().filter(|o| !o.is_empty())
    }
}

#[derive(Clone)]
pub struct AirtableClient {
    endpoint: Url,
    api_key: String,
    client: reqwest::Client,
}

impl AirtableClient {
    pub fn new(endpoint: &str, api_key: impl Into<String>) -> Result<Self, FetchError> {
        let endpoint = Url::parse(endpoint).map_err(|e| FetchError::InvalidEndpoint {
            endpoint: endpoint.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            endpoint,
            api_key: api_key.into(),
            client: reqwest::Client::new(),
        })
    }

    /// Build a client from the endpoint and token the config resolves
    pub fn from_config(config: &Config) -> Result<Self, FetchError> {
        let endpoint = config.endpoint().ok_or(FetchError::MissingEndpoint)?;
        let api_key = config.api_key().ok_or_else(|| FetchError::MissingApiKey {
            env: config.data_source.api_key_env.clone(),
        })?;
        Self::new(&endpoint, api_key)
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Fetch a single page, optionally continuing from a cursor
    pub async fn fetch_page(&self, offset: Option<&str>) -> Result<AirtablePage, FetchError> {
        let mut url = self.endpoint.clone();
        if let Some(offset) = offset {
            url.query_pairs_mut().append_pair(OFFSET_PARAM, offset);
        }

        let response = self
            .client
            .get(url)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(FetchError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(target: "fetch", "Page request failed with {}", status);
            return Err(FetchError::Status {
                status: status.as_u16(),
            });
        }

        response.json::<AirtablePage>().await.map_err(FetchError::Decode)
    }

    /// Fetch every page in order. Any failure aborts the whole load;
    /// records from earlier pages are discarded.
    pub async fn fetch_all_records(&self) -> Result<Vec<Record>, FetchError> {
        let mut records = Vec::new();
        let mut offset: Option<String> = None;
        let mut pages = 0usize;

        loop {
            let page = self.fetch_page(offset.as_deref()).await?;
            pages += 1;
            tracing::debug!(
                target: "fetch",
                "Page {} returned {} records (more: {})",
                pages,
                page.records.len(),
                page.next_offset().is_some()
            );

            let next = page.next_offset().map(str::to_string);
            records.extend(page.records);
            match next {
                Some(next) => offset = Some(next),
                None => break,
            }
        }

        tracing::info!(target: "fetch", "Fetched {} records in {} pages", records.len(), pages);
        Ok(records)
    }
}

/// True for statuses that point at credentials rather than the endpoint
pub fn is_auth_failure(status: u16) -> bool {
    status == StatusCode::UNAUTHORIZED.as_u16() || status == StatusCode::FORBIDDEN.as_u16()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_message() {
        let err = FetchError::Status { status: 401 };
        assert_eq!(err.to_string(), "Airtable fetch failed: 401");
        assert_eq!(err.status(), Some(401));
        assert_eq!(
            err.auth_hint("AIRTABLE_API_KEY").as_deref(),
            Some("The API token was rejected; check the AIRTABLE_API_KEY environment variable")
        );
        assert!(FetchError::Status { status: 403 }.auth_hint("KEY").is_some());
        assert_eq!(FetchError::Status { status: 500 }.auth_hint("KEY"), None);
        assert_eq!(FetchError::MissingEndpoint.auth_hint("KEY"), None);
        assert!(is_auth_failure(401));
        assert!(!is_auth_failure(500));
    }

    #[test]
    fn test_invalid_endpoint() {
        let err = AirtableClient::new("not a url", "key").err().unwrap();
        assert!(matches!(err, FetchError::InvalidEndpoint { .. }));
    }

    #[test]
    fn test_page_decoding_and_offset() {
        let page: AirtablePage =
            serde_json::from_str(r#"{"records":[{"id":"r1","fields":{"Name":"Ann"}}],"offset":""}"#).unwrap();
        assert_eq!(page.records.len(), 1);
        assert_eq!(page.next_offset(), None);

        let page: AirtablePage = serde_json::from_str(r#"{"records":[],"offset":"itr2"}"#).unwrap();
        assert_eq!(page.next_offset(), Some("itr2"));
    }
}
