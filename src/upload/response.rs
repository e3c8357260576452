//! UEditor response payload
//!
//! The editor front-end expects `state` to be `"SUCCESS"` or a
//! human-readable failure message.

use super::{UploadError, UploadResult, SUCCESS};
use serde::{Deserialize, Serialize};

/// JSON body returned to the editor after an upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadState {
    pub state: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub original: String,
    #[serde(default, rename = "type")]
    pub file_type: String,
    #[serde(default)]
    pub size: u64,
}

impl UploadState {
    /// Successful upload, with `url` as the public location
    pub fn success(result: &UploadResult, url: impl Into<String>) -> Self {
        let url = url.into();
        let title = url.rsplit('/').next().unwrap_or_default().to_string();
        Self {
            state: SUCCESS.to_string(),
            url,
            title,
            original: result.original_name.clone(),
            file_type: result.extension.clone(),
            size: result.size,
        }
    }

    /// Failed upload carrying the editor's localized message
    pub fn failure(error: &UploadError) -> Self {
        Self {
            state: error.kind().legacy_message().to_string(),
            url: String::new(),
            title: String::new(),
            original: String::new(),
            file_type: String::new(),
            size: 0,
        }
    }

    /// Build from an upload outcome, using the written path as the url
    pub fn from_outcome(outcome: &Result<UploadResult, UploadError>) -> Self {
        match outcome {
            Ok(result) => {
                let url = result.path.to_string_lossy().replace('\\', "/");
                Self::success(result, url)
            }
            Err(e) => Self::failure(e),
        }
    }

    pub fn is_success(&self) -> bool {
        self.state == SUCCESS
    }
}
