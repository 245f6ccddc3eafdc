//! Validated stream endpoint value.
//!
//! [`Endpoint`] is an immutable value identifying where the client
//! connects: the stream URL plus any extra request headers. It is the
//! only input validated synchronously — a malformed URL is rejected at
//! construction, before any network activity.

use std::fmt;

use reqwest::Url;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use crate::error::IngestError;

/// Immutable target of one streaming subscription.
///
/// Supplied at construction; never mutated afterwards. Extra headers are
/// sent on every connection attempt (initial and reconnects), which is
/// where auth tokens belong.
#[derive(Debug, Clone)]
pub struct Endpoint {
    url: Url,
    headers: HeaderMap,
}

impl Endpoint {
    /// Parses and validates a stream URL.
    ///
    /// Only `http` and `https` schemes are accepted.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::InvalidEndpoint`] if the URL does not
    /// parse or uses an unsupported scheme.
    pub fn parse(url: &str) -> Result<Self, IngestError> {
        let url: Url =
            url.parse().map_err(|e| IngestError::InvalidEndpoint(format!("{url}: {e}")))?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(IngestError::InvalidEndpoint(format!(
                "unsupported scheme: {}",
                url.scheme()
            )));
        }

        Ok(Self {
            url,
            headers: HeaderMap::new(),
        })
    }

    /// Returns a copy of this endpoint with an extra request header.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::InvalidEndpoint`] if the header name or
    /// value is not valid HTTP header syntax.
    pub fn with_header(mut self, name: &str, value: &str) -> Result<Self, IngestError> {
        let name: HeaderName = name
            .parse()
            .map_err(|e| IngestError::InvalidEndpoint(format!("header name {name}: {e}")))?;
        let value: HeaderValue = value
            .parse()
            .map_err(|e| IngestError::InvalidEndpoint(format!("header value: {e}")))?;
        let _ = self.headers.insert(name, value);
        Ok(self)
    }

    /// Returns the stream URL.
    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.url
    }

    /// Returns the extra request headers.
    #[must_use]
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.url)
    }
}
