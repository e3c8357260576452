//! Remote image fetching
//!
//! A HEAD request confirms the link is alive and points at an image before
//! the body is downloaded with a GET. Each request carries its own timeout;
//! failures are not retried.

use super::UploadError;
use bytes::Bytes;
use reqwest::header::CONTENT_TYPE;
use reqwest::{StatusCode, Url};
use std::time::Duration;
use url::ParseError;

/// Whether a scheme-less string is a usable relative reference
///
/// A colon before the first `/` cannot be told apart from a malformed scheme.
fn is_reference(raw: &str) -> bool {
    let first_segment = raw.split('/').next().unwrap_or_default();
    !first_segment.contains(':')
}

/// HTTP fetcher for remote images
#[derive(Debug, Clone)]
pub struct RemoteFetcher {
    client: reqwest::Client,
}

impl RemoteFetcher {
    /// Create a fetcher whose requests time out after `timeout`
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    /// Parse `raw` and require an http or https scheme
    ///
    /// Scheme-less references such as `example.com/a.png` or `/a.png` are
    /// well-formed but not http, so they report [`UploadError::NotHttp`].
    pub fn parse_url(raw: &str) -> Result<Url, UploadError> {
        let url = match Url::parse(raw) {
            Ok(url) => url,
            Err(ParseError::RelativeUrlWithoutBase) if is_reference(raw) => {
                return Err(UploadError::NotHttp(String::new()))
            }
            Err(e) => return Err(UploadError::InvalidUrl(e.to_string())),
        };

        let scheme = url.scheme();
        if !scheme.eq_ignore_ascii_case("http") && !scheme.eq_ignore_ascii_case("https") {
            return Err(UploadError::NotHttp(scheme.to_string()));
        }

        Ok(url)
    }

    /// Check that `url` answers 200 with an image content type
    #[tracing::instrument(name = "remote.probe", skip(self), fields(url = %url), err)]
    pub async fn probe(&self, url: &Url) -> Result<(), UploadError> {
        let response = self
            .client
            .head(url.clone())
            .send()
            .await
            .map_err(|e| UploadError::DeadLink(e.to_string()))?;

        if response.status() != StatusCode::OK {
            return Err(UploadError::DeadLink(format!(
                "HEAD returned {}",
                response.status()
            )));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        match content_type {
            Some(ref ct) if ct.to_lowercase().contains("image") => {
                tracing::debug!(content_type = %ct, "Remote link looks like an image");
                Ok(())
            }
            other => Err(UploadError::WrongContentType(other)),
        }
    }

    /// Download the full body of `url`
    #[tracing::instrument(name = "remote.download", skip(self), fields(url = %url), err)]
    pub async fn download(&self, url: &Url) -> Result<Bytes, UploadError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| UploadError::DeadLink(e.to_string()))?;

        if response.status() != StatusCode::OK {
            return Err(UploadError::DeadLink(format!(
                "GET returned {}",
                response.status()
            )));
        }

        response.bytes().await.map_err(UploadError::RemoteRead)
    }
}
