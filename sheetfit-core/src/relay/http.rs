//! Blocking HTTP transport for the relay endpoint

use super::{RawResponse, Transport};
use crate::error::RelayError;
use reqwest::blocking::{Client, Response};
use reqwest::header::CONTENT_TYPE;
use serde_json::Value;
use std::time::Duration;

pub struct HttpTransport {
    client: Client,
    url: String,
}

impl HttpTransport {
    /// Transport for `url`. `None` disables the client-side timeout.
    pub fn new(url: &str, timeout: Option<Duration>) -> Result<Self, RelayError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RelayError::Network(e.to_string()))?;

        Ok(Self {
            client,
            url: url.to_string(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Transport for HttpTransport {
    fn get(&self, query: &[(&str, String)]) -> Result<RawResponse, RelayError> {
        let response = self
            .client
            .get(&self.url)
            .query(query)
            .send()
            .map_err(|e| RelayError::Network(e.to_string()))?;
        read_response(response)
    }

    fn post_json(&self, body: &Value) -> Result<RawResponse, RelayError> {
        let response = self
            .client
            .post(&self.url)
            .header(CONTENT_TYPE, "application/json")
            .body(body.to_string())
            .send()
            .map_err(|e| RelayError::Network(e.to_string()))?;
        read_response(response)
    }
}

fn read_response(response: Response) -> Result<RawResponse, RelayError> {
    let status = response.status().as_u16();
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string());
    let body = response
        .text()
        .map_err(|e| RelayError::Network(e.to_string()))?;

    Ok(RawResponse {
        status,
        content_type,
        body,
    })
}
