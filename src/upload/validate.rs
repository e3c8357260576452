//! Size and type gates shared by every ingestion mode

use super::UploadError;
use std::collections::HashSet;

/// Size and extension policy, normalized for lookup
#[derive(Debug, Clone)]
pub struct Policy {
    max_size: u64,
    allowed: HashSet<String>,
}

impl Policy {
    pub fn new<I, S>(max_size: u64, allowed_extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            max_size,
            allowed: allowed_extensions
                .into_iter()
                .map(|ext| ext.as_ref().to_lowercase())
                .collect(),
        }
    }

    /// Reject content larger than the limit; the limit itself is accepted
    pub fn check_size(&self, size: u64) -> Result<(), UploadError> {
        if size > self.max_size {
            return Err(UploadError::SizeExceeded {
                size,
                max: self.max_size,
            });
        }
        Ok(())
    }

    /// Reject extensions outside the allowed set, ignoring case
    pub fn check_type(&self, extension: &str) -> Result<(), UploadError> {
        if !self.allowed.contains(&extension.to_lowercase()) {
            return Err(UploadError::TypeNotAllowed(extension.to_string()));
        }
        Ok(())
    }
}
