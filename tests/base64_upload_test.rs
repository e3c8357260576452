//! Base64 Upload Integration Tests

#[cfg(test)]
mod tests {
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use editor_uploadr::config::UploaderConfig;
    use editor_uploadr::upload::{ErrorKind, UploadHandler, Uploader};
    use std::path::Path;

    fn create_uploader(root: &Path, max_size: u64) -> Uploader {
        let config = UploaderConfig::new(format!("{}/scrawl/{{time}}", root.display()), max_size);
        Uploader::new(config).unwrap().with_metrics(false)
    }

    #[tokio::test]
    async fn test_decoded_bytes_written() {
        let root = tempfile::tempdir().unwrap();
        let uploader = create_uploader(root.path(), 1024);
        let payload = b"\x89PNG\r\n\x1a\nrest-of-image";

        let result = uploader
            .upload_base64("scrawl.png", &STANDARD.encode(payload))
            .await
            .unwrap();

        assert_eq!(result.size, payload.len() as u64);
        assert_eq!(result.extension, ".png");
        assert!(result.path.starts_with(root.path().join("scrawl")));
        assert_eq!(std::fs::read(&result.path).unwrap(), payload);
    }

    /// Malformed input fails on decode even when size and type would also fail
    #[tokio::test]
    async fn test_invalid_base64_reported_first() {
        let root = tempfile::tempdir().unwrap();
        let uploader = create_uploader(root.path(), 1);

        let err = uploader
            .upload_base64("payload.exe", "this is *not* base64!")
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Base64DecodeFailed);
    }

    /// The limit applies to decoded length, not encoded length
    #[tokio::test]
    async fn test_limit_applies_to_decoded_length() {
        let root = tempfile::tempdir().unwrap();
        let uploader = create_uploader(root.path(), 6);

        // 8 encoded characters, 6 decoded bytes
        let encoded = STANDARD.encode(b"abcdef");
        assert_eq!(encoded.len(), 8);
        assert!(uploader.upload_base64("a.png", &encoded).await.is_ok());

        let err = uploader
            .upload_base64("a.png", &STANDARD.encode(b"abcdefg"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SizeExceeded);
    }

    /// Editors wrap long payloads; line breaks are not part of the data
    #[tokio::test]
    async fn test_line_wrapped_payload_decodes() {
        let root = tempfile::tempdir().unwrap();
        let uploader = create_uploader(root.path(), 1024);

        for encoded in ["aGVsbG8g\nd29ybGQh", "aGVsbG8g\r\nd29ybGQh\r\n"] {
            let result = uploader.upload_base64("wrapped.png", encoded).await.unwrap();
            assert_eq!(result.size, 12);
            assert_eq!(std::fs::read(&result.path).unwrap(), b"hello world!");
        }
    }

    /// Non-zero bits after the last full byte are ignored
    #[tokio::test]
    async fn test_trailing_bits_tolerated() {
        let root = tempfile::tempdir().unwrap();
        let uploader = create_uploader(root.path(), 1024);

        let result = uploader.upload_base64("bits.png", "YR==").await.unwrap();

        assert_eq!(result.size, 1);
        assert_eq!(std::fs::read(&result.path).unwrap(), b"a");
    }

    #[tokio::test]
    async fn test_type_checked_after_size() {
        let root = tempfile::tempdir().unwrap();
        let uploader = create_uploader(root.path(), 1024);

        let err = uploader
            .upload_base64("notes.txt", &STANDARD.encode(b"hello"))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::TypeNotAllowed);
        assert!(!root.path().join("scrawl").exists());
    }
}
