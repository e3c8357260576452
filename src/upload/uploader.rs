//! Uploader
//!
//! Implements the three editor ingestion modes on top of the shared
//! validate → render path → prepare directory → write pipeline.
//!
//! # Example
//!
//! ```no_run
//! use editor_uploadr::config::UploaderConfig;
//! use editor_uploadr::upload::{UploadHandler, Uploader};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = UploaderConfig::new("/var/www/upload/{yyyy}{mm}{dd}/{time}", 2 * 1024 * 1024);
//! let uploader = Uploader::new(config)?;
//!
//! let result = uploader.save_remote("https://example.com/cat.png").await?;
//! println!("Saved to {}", result.path.display());
//! # Ok(())
//! # }
//! ```
//!
//! # Collisions
//!
//! Paths are not checked for uniqueness. Two uploads rendering to the same
//! path (a template without `{time}`, or concurrent calls in the same
//! nanosecond) race at the filesystem and the last write wins.

use super::clock::{Clock, SystemClock};
use super::remote::RemoteFetcher;
use super::validate::Policy;
use super::{path, storage, IncomingFile, UploadError, UploadHandler, UploadResult};
use crate::config::{ConfigError, UploaderConfig};
use crate::metrics;
use async_trait::async_trait;
use base64::alphabet;
use base64::engine::{GeneralPurpose, GeneralPurposeConfig};
use base64::Engine as _;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::AsyncRead;

/// Standard alphabet, canonical padding, non-zero trailing bits tolerated
const EDITOR_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_allow_trailing_bits(true),
);

/// Decode an editor base64 payload; line breaks are ignored
fn decode_base64(data: &str) -> Result<Vec<u8>, UploadError> {
    let cleaned: String = data.chars().filter(|c| *c != '\r' && *c != '\n').collect();
    Ok(EDITOR_BASE64.decode(cleaned)?)
}

/// Local-disk uploader for one upload policy
pub struct Uploader {
    config: UploaderConfig,
    policy: Policy,
    fetcher: RemoteFetcher,
    clock: Arc<dyn Clock>,
    record_metrics: bool,
}

impl Uploader {
    /// Create an uploader after validating `config`
    pub fn new(config: UploaderConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let policy = Policy::new(config.max_size, &config.allowed_extensions);
        let fetcher = RemoteFetcher::new(Duration::from_secs(config.remote_timeout_secs))?;

        Ok(Self {
            config,
            policy,
            fetcher,
            clock: Arc::new(SystemClock),
            record_metrics: true,
        })
    }

    /// Use `clock` when rendering destination paths
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Enable or disable Prometheus recording
    pub fn with_metrics(mut self, enabled: bool) -> Self {
        self.record_metrics = enabled;
        self
    }

    // ========================================================================
    // Pipelines
    // ========================================================================

    async fn store_file<R>(&self, file: Option<IncomingFile<R>>) -> Result<UploadResult, UploadError>
    where
        R: AsyncRead + Unpin + Send,
    {
        let mut file = match file {
            Some(file) if file.size > 0 => file,
            _ => return Err(UploadError::EmptyUpload),
        };

        self.policy.check_size(file.size)?;

        let extension = path::extension(&file.original_name).to_string();
        self.policy.check_type(&extension)?;

        self.persist(&file.original_name, extension, &mut file.content)
            .await
    }

    async fn store_base64(
        &self,
        file_name: &str,
        base64_data: &str,
    ) -> Result<UploadResult, UploadError> {
        let data = decode_base64(base64_data)?;

        self.policy.check_size(data.len() as u64)?;

        let extension = path::extension(file_name).to_string();
        self.policy.check_type(&extension)?;

        self.persist(file_name, extension, &mut data.as_slice())
            .await
    }

    async fn store_remote(&self, remote_url: &str) -> Result<UploadResult, UploadError> {
        let url = RemoteFetcher::parse_url(remote_url)?;

        let name = path::decoded_file_name(url.path());
        let extension = path::extension(&name).to_string();
        self.policy.check_type(&extension)?;

        self.fetcher.probe(&url).await?;
        let body = self.fetcher.download(&url).await?;

        self.policy.check_size(body.len() as u64)?;

        self.persist(&name, extension, &mut &body[..]).await
    }

    /// Render the destination, create its directory and write `content`
    async fn persist<R>(
        &self,
        original_name: &str,
        extension: String,
        content: &mut R,
    ) -> Result<UploadResult, UploadError>
    where
        R: AsyncRead + Unpin + Send + ?Sized,
    {
        let destination = path::render(&self.config.path_format, self.clock.now(), original_name);

        storage::prepare_destination(&destination).await?;
        let size = storage::write_stream(&destination, content).await?;

        Ok(UploadResult {
            path: destination,
            original_name: original_name.to_string(),
            extension,
            size,
        })
    }

    /// Log and record the outcome of one call
    fn observe(
        &self,
        mode: &str,
        started: Instant,
        outcome: Result<UploadResult, UploadError>,
    ) -> Result<UploadResult, UploadError> {
        let elapsed = started.elapsed();

        match &outcome {
            Ok(result) => {
                tracing::info!(
                    mode = mode,
                    path = %result.path.display(),
                    bytes_written = result.size,
                    duration_ms = elapsed.as_millis(),
                    "Upload stored"
                );
                if self.record_metrics {
                    metrics::record_upload_success(mode, result.size);
                }
            }
            Err(e) => {
                tracing::warn!(
                    mode = mode,
                    kind = %e.kind(),
                    error = %e,
                    duration_ms = elapsed.as_millis(),
                    "Upload rejected"
                );
                if self.record_metrics {
                    metrics::record_upload_failure(mode, e.kind().as_str());
                }
            }
        }

        if self.record_metrics {
            metrics::record_upload_duration(mode, elapsed.as_secs_f64());
        }

        outcome
    }
}

#[async_trait]
impl UploadHandler for Uploader {
    #[tracing::instrument(
        name = "upload.file",
        skip(self, file),
        fields(
            upload.original_name = file.as_ref().map(|f| f.original_name.as_str()).unwrap_or(""),
            upload.size = file.as_ref().map(|f| f.size).unwrap_or(0)
        ),
        err
    )]
    async fn upload_file<R>(
        &self,
        file: Option<IncomingFile<R>>,
    ) -> Result<UploadResult, UploadError>
    where
        R: AsyncRead + Unpin + Send,
    {
        let started = Instant::now();
        let outcome = self.store_file(file).await;
        self.observe("file", started, outcome)
    }

    #[tracing::instrument(
        name = "upload.base64",
        skip(self, base64_data),
        fields(upload.encoded_len = base64_data.len()),
        err
    )]
    async fn upload_base64(
        &self,
        file_name: &str,
        base64_data: &str,
    ) -> Result<UploadResult, UploadError> {
        let started = Instant::now();
        let outcome = self.store_base64(file_name, base64_data).await;
        self.observe("base64", started, outcome)
    }

    #[tracing::instrument(name = "upload.remote", skip(self), err)]
    async fn save_remote(&self, remote_url: &str) -> Result<UploadResult, UploadError> {
        let started = Instant::now();
        let outcome = self.store_remote(remote_url).await;
        self.observe("remote", started, outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upload::{ErrorKind, FixedClock};
    use chrono::{Local, TimeZone};

    fn uploader(root: &std::path::Path, max_size: u64) -> Uploader {
        let template = format!("{}/{{yyyy}}{{mm}}{{dd}}/{{hh}}{{ii}}{{ss}}", root.display());
        let config = UploaderConfig::new(template, max_size).with_allowed_extensions([".png", ".jpg"]);
        let at = Local.with_ymd_and_hms(2024, 3, 7, 9, 5, 1).unwrap();
        Uploader::new(config)
            .unwrap()
            .with_clock(FixedClock(at))
            .with_metrics(false)
    }

    #[tokio::test]
    async fn test_upload_file_writes_to_rendered_path() {
        let root = tempfile::tempdir().unwrap();
        let uploader = uploader(root.path(), 64);

        let file = IncomingFile::new(&b"png bytes"[..], 9, "cat.PNG");
        let result = uploader.upload_file(Some(file)).await.unwrap();

        assert_eq!(result.path, root.path().join("20240307/090501.PNG"));
        assert_eq!(result.size, 9);
        assert_eq!(result.extension, ".PNG");
        assert_eq!(std::fs::read(&result.path).unwrap(), b"png bytes");
    }

    #[tokio::test]
    async fn test_upload_file_none_is_empty() {
        let root = tempfile::tempdir().unwrap();
        let uploader = uploader(root.path(), 64);

        let err = uploader
            .upload_file(None::<IncomingFile<&[u8]>>)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EmptyUpload);
    }

    #[tokio::test]
    async fn test_upload_file_zero_size_is_empty() {
        let root = tempfile::tempdir().unwrap();
        let uploader = uploader(root.path(), 64);

        let file = IncomingFile::new(&b""[..], 0, "cat.png");
        let err = uploader.upload_file(Some(file)).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EmptyUpload);
    }

    #[tokio::test]
    async fn test_size_checked_before_type() {
        let root = tempfile::tempdir().unwrap();
        let uploader = uploader(root.path(), 4);

        let file = IncomingFile::new(&b"12345"[..], 5, "virus.exe");
        let err = uploader.upload_file(Some(file)).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SizeExceeded);
    }

    #[tokio::test]
    async fn test_base64_decode_checked_first() {
        let root = tempfile::tempdir().unwrap();
        let uploader = uploader(root.path(), 1);

        let err = uploader
            .upload_base64("bad.exe", "%%% not base64 %%%")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Base64DecodeFailed);
    }

    #[tokio::test]
    async fn test_remote_type_checked_before_fetch() {
        let root = tempfile::tempdir().unwrap();
        let uploader = uploader(root.path(), 64);

        // Unroutable host: only reachable if the type gate were skipped.
        let err = uploader
            .save_remote("http://127.0.0.1:9/payload.exe")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TypeNotAllowed);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = UploaderConfig::new("", 10);
        assert!(Uploader::new(config).is_err());
    }
}
