//! Upload module
//!
//! Accepts editor uploads in three forms (multipart file stream, inline
//! base64 image, remote URL), validates them against the configured size
//! and extension policy, and persists them under a templated path.

use std::path::PathBuf;
use thiserror::Error;

pub mod clock;
pub mod path;
pub mod remote;
pub mod response;
pub mod storage;
pub mod uploader;
pub mod validate;

pub use clock::{Clock, FixedClock, SystemClock};
pub use response::UploadState;
pub use uploader::Uploader;

/// State reported to the editor for a successful upload
pub const SUCCESS: &str = "SUCCESS";

/// Closed set of upload failure kinds
///
/// Callers branch on this rather than on message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    EmptyUpload,
    SizeExceeded,
    TypeNotAllowed,
    FileState,
    DirectoryCreateFailed,
    NotWritable,
    WriteFailed,
    Base64DecodeFailed,
    InvalidUrl,
    NotHttp,
    DeadLink,
    WrongContentType,
    RemoteReadFailed,
}

impl ErrorKind {
    /// Stable machine-readable code, also used as a metrics label
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::EmptyUpload => "empty_upload",
            ErrorKind::SizeExceeded => "size_exceeded",
            ErrorKind::TypeNotAllowed => "type_not_allowed",
            ErrorKind::FileState => "file_state",
            ErrorKind::DirectoryCreateFailed => "directory_create_failed",
            ErrorKind::NotWritable => "not_writable",
            ErrorKind::WriteFailed => "write_failed",
            ErrorKind::Base64DecodeFailed => "base64_decode_failed",
            ErrorKind::InvalidUrl => "invalid_url",
            ErrorKind::NotHttp => "not_http",
            ErrorKind::DeadLink => "dead_link",
            ErrorKind::WrongContentType => "wrong_content_type",
            ErrorKind::RemoteReadFailed => "remote_read_failed",
        }
    }

    /// Localized message understood by UEditor front-ends
    pub fn legacy_message(&self) -> &'static str {
        match self {
            ErrorKind::EmptyUpload => "上传文件为空",
            ErrorKind::SizeExceeded => "文件大小超出网站限制",
            ErrorKind::TypeNotAllowed => "文件类型不允许",
            ErrorKind::FileState => "文件系统错误",
            ErrorKind::DirectoryCreateFailed => "目录创建失败",
            ErrorKind::NotWritable => "目录没有写权限",
            ErrorKind::WriteFailed => "写入文件内容错误",
            ErrorKind::Base64DecodeFailed => "base64图片解码错误",
            ErrorKind::InvalidUrl => "非法 URL",
            ErrorKind::NotHttp => "链接不是http链接",
            ErrorKind::DeadLink => "链接不可用",
            ErrorKind::WrongContentType => "链接contentType不正确",
            ErrorKind::RemoteReadFailed => "读取远程链接出错",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Upload errors
#[derive(Error, Debug)]
pub enum UploadError {
    #[error("No file was uploaded")]
    EmptyUpload,

    #[error("File size {size} exceeds limit of {max} bytes")]
    SizeExceeded { size: u64, max: u64 },

    #[error("File type '{0}' is not allowed")]
    TypeNotAllowed(String),

    #[error("Could not stat destination directory {path}: {source}")]
    FileState {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to create directory {path}: {source}")]
    DirectoryCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Destination {path} is not writable: {source}")]
    NotWritable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid base64 data: {0}")]
    Base64Decode(#[from] base64::DecodeError),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("URL scheme '{0}' is not http or https")]
    NotHttp(String),

    #[error("Remote link is not available: {0}")]
    DeadLink(String),

    #[error("Remote content type {0:?} is not an image")]
    WrongContentType(Option<String>),

    #[error("Failed to read remote body: {0}")]
    RemoteRead(#[source] reqwest::Error),
}

impl UploadError {
    /// Project the error onto its kind
    pub fn kind(&self) -> ErrorKind {
        match self {
            UploadError::EmptyUpload => ErrorKind::EmptyUpload,
            UploadError::SizeExceeded { .. } => ErrorKind::SizeExceeded,
            UploadError::TypeNotAllowed(_) => ErrorKind::TypeNotAllowed,
            UploadError::FileState { .. } => ErrorKind::FileState,
            UploadError::DirectoryCreate { .. } => ErrorKind::DirectoryCreateFailed,
            UploadError::NotWritable { .. } => ErrorKind::NotWritable,
            UploadError::Write { .. } => ErrorKind::WriteFailed,
            UploadError::Base64Decode(_) => ErrorKind::Base64DecodeFailed,
            UploadError::InvalidUrl(_) => ErrorKind::InvalidUrl,
            UploadError::NotHttp(_) => ErrorKind::NotHttp,
            UploadError::DeadLink(_) => ErrorKind::DeadLink,
            UploadError::WrongContentType(_) => ErrorKind::WrongContentType,
            UploadError::RemoteRead(_) => ErrorKind::RemoteReadFailed,
        }
    }
}

/// Upload result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadResult {
    /// Where the content was written
    pub path: PathBuf,
    /// Name supplied by the client (or the last URL path segment)
    pub original_name: String,
    /// Source extension including the dot, as given
    pub extension: String,
    pub size: u64,
}

/// A file received from a multipart form
pub struct IncomingFile<R> {
    pub content: R,
    /// Size declared by the form part
    pub size: u64,
    pub original_name: String,
}

impl<R> IncomingFile<R> {
    pub fn new(content: R, size: u64, original_name: impl Into<String>) -> Self {
        Self {
            content,
            size,
            original_name: original_name.into(),
        }
    }
}

/// Upload handler trait
///
/// Each operation is a linear sequence of validation gates; the first
/// failing gate determines the returned error.
#[async_trait::async_trait]
pub trait UploadHandler: Send + Sync {
    /// Persist a multipart file stream
    async fn upload_file<R>(
        &self,
        file: Option<IncomingFile<R>>,
    ) -> Result<UploadResult, UploadError>
    where
        R: tokio::io::AsyncRead + Unpin + Send;

    /// Decode and persist a base64-encoded image
    async fn upload_base64(
        &self,
        file_name: &str,
        base64_data: &str,
    ) -> Result<UploadResult, UploadError>;

    /// Fetch an image over http(s) and persist it
    async fn save_remote(&self, remote_url: &str) -> Result<UploadResult, UploadError>;
}
