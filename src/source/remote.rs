//! Synonym rules from an HTTP endpoint.
//!
//! Change detection is a conditional `HEAD` request carrying the validators
//! of the previous response:
//!
//! ```text
//! HEAD /synonyms.txt
//! If-Modified-Since: <last Last-Modified>
//! If-None-Match: <last ETag>
//!
//! 304          -> unchanged
//! 200          -> changed unless Last-Modified and ETag both match
//! other status -> unchanged, logged
//! ```

use std::time::Duration;

use log::{debug, warn};
use reqwest::StatusCode;
use reqwest::blocking::{Client, Response};
use reqwest::header::{ETAG, HeaderName, IF_MODIFIED_SINCE, IF_NONE_MATCH, LAST_MODIFIED};

use super::SynonymSource;
use crate::error::{Result, SynonymError};
use crate::synonym::extend::ExtendFilter;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const HEAD_TIMEOUT: Duration = Duration::from_secs(15);
const GET_TIMEOUT: Duration = Duration::from_secs(60);

/// A rule file served over HTTP(S).
#[derive(Debug)]
pub struct RemoteSynonymSource {
    url: String,
    client: Client,
    extend: Option<ExtendFilter>,
    last_modified: Option<String>,
    etag: Option<String>,
}

fn header(response: &Response, name: HeaderName) -> Option<String> {
    response
        .headers()
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

fn same_validator(a: &Option<String>, b: &Option<String>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
        (None, None) => true,
        _ => false,
    }
}

impl RemoteSynonymSource {
    /// Create a source polling `url`.
    pub fn new<S: Into<String>>(url: S, extend: Option<ExtendFilter>) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| SynonymError::configuration(format!("failed to build HTTP client: {e}")))?;

        Ok(RemoteSynonymSource {
            url: url.into(),
            client,
            extend,
            last_modified: None,
            etag: None,
        })
    }

    /// The last `Last-Modified` value seen.
    pub fn last_modified(&self) -> Option<&str> {
        self.last_modified.as_deref()
    }

    /// The last `ETag` value seen.
    pub fn etag(&self) -> Option<&str> {
        self.etag.as_deref()
    }
}

impl SynonymSource for RemoteSynonymSource {
    fn detect_change(&mut self) -> Result<bool> {
        let mut request = self.client.head(&self.url).timeout(HEAD_TIMEOUT);
        if let Some(last_modified) = &self.last_modified {
            request = request.header(IF_MODIFIED_SINCE, last_modified);
        }
        if let Some(etag) = &self.etag {
            request = request.header(IF_NONE_MATCH, etag);
        }

        let response = request
            .send()
            .map_err(|e| SynonymError::source_fetch(format!("HEAD {} failed: {e}", self.url)))?;

        match response.status() {
            StatusCode::NOT_MODIFIED => {
                debug!("remote synonyms at {} not modified", self.url);
                Ok(false)
            }
            StatusCode::OK => {
                let last_modified = header(&response, LAST_MODIFIED);
                let etag = header(&response, ETAG);
                let validated = last_modified.is_some() || etag.is_some();

                if validated
                    && same_validator(&last_modified, &self.last_modified)
                    && same_validator(&etag, &self.etag)
                {
                    return Ok(false);
                }
                self.last_modified = last_modified;
                self.etag = etag;
                Ok(true)
            }
            status => {
                warn!("remote synonyms at {} answered {status}, skipping", self.url);
                Ok(false)
            }
        }
    }

    fn fetch(&self) -> Result<String> {
        let response = self
            .client
            .get(&self.url)
            .timeout(GET_TIMEOUT)
            .send()
            .map_err(|e| SynonymError::source_fetch(format!("GET {} failed: {e}", self.url)))?;

        if response.status() != StatusCode::OK {
            return Err(SynonymError::source_fetch(format!(
                "GET {} answered {}",
                self.url,
                response.status()
            )));
        }

        let body = response.text_with_charset("utf-8").map_err(|e| {
            SynonymError::source_fetch(format!("failed to read body of {}: {e}", self.url))
        })?;

        let lines: Vec<String> = body
            .lines()
            .map(|line| match &self.extend {
                Some(extend) => extend.handle_line(line),
                None => line.to_string(),
            })
            .collect();
        Ok(lines.join("\n"))
    }

    fn location(&self) -> &str {
        &self.url
    }
}
