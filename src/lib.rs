//! Editor Uploadr Library
//!
//! Upload backend for rich-text editors (UEditor-compatible).
//!
//! # Features
//!
//! - **Three ingestion modes**: multipart file streams, inline base64
//!   images, and remote image URLs
//! - **Upload policy**: inclusive size limit and case-insensitive
//!   extension allow-list
//! - **Templated paths**: `{yyyy}{mm}{dd}/{time}` style destinations with
//!   automatic directory creation
//! - **Typed errors**: a closed [`upload::ErrorKind`] set with the legacy
//!   localized messages available for editor responses
//!
//! # Example
//!
//! ```no_run
//! use editor_uploadr::{config::Config, upload::{UploadHandler, Uploader}};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.yaml")?;
//!     let uploader = Uploader::new(config.uploader)?;
//!     let result = uploader.upload_base64("dot.png", "iVBORw0KGgo=").await?;
//!     println!("{}", result.path.display());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod logging;
pub mod metrics;
pub mod upload;

// Re-export commonly used types
pub use config::{Config, UploaderConfig};
pub use upload::{ErrorKind, UploadError, UploadHandler, UploadResult, Uploader};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
