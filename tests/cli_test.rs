//! CLI Integration Tests
//!
//! Runs the `editor-uploadr` binary against a temporary config.

#[cfg(test)]
mod tests {
    use assert_cmd::Command;
    use predicates::prelude::*;
    use std::path::{Path, PathBuf};

    /// Write a config file under `root` and return its path
    fn write_config(root: &Path, max_size: u64) -> PathBuf {
        let config = format!(
            r#"
uploader:
  path_format: "{}/out/{{yyyy}}{{mm}}{{dd}}/{{time}}"
  max_size: {}
  allowed_extensions: [".png", ".jpg"]
metrics:
  enabled: false
logging:
  level: warn
  json: false
"#,
            root.display(),
            max_size
        );
        let path = root.join("config.yaml");
        std::fs::write(&path, config).unwrap();
        path
    }

    fn cli() -> Command {
        Command::cargo_bin("editor-uploadr").unwrap()
    }

    #[test]
    fn test_file_upload_prints_success_state() {
        let root = tempfile::tempdir().unwrap();
        let config = write_config(root.path(), 1024);
        let source = root.path().join("cat.png");
        std::fs::write(&source, b"meow").unwrap();

        cli()
            .arg("--config")
            .arg(&config)
            .arg("file")
            .arg(&source)
            .assert()
            .success()
            .stdout(predicate::str::contains(r#""state":"SUCCESS""#))
            .stdout(predicate::str::contains(r#""original":"cat.png""#));

        assert!(root.path().join("out").is_dir());
    }

    #[test]
    fn test_base64_rejected_type_prints_legacy_message() {
        let root = tempfile::tempdir().unwrap();
        let config = write_config(root.path(), 1024);

        cli()
            .arg("--config")
            .arg(&config)
            .args(["base64", "--name", "a.exe", "--data", "aGVsbG8="])
            .assert()
            .failure()
            .stdout(predicate::str::contains("文件类型不允许"));
    }

    #[test]
    fn test_base64_from_file() {
        let root = tempfile::tempdir().unwrap();
        let config = write_config(root.path(), 1024);
        let data_file = root.path().join("payload.b64");
        std::fs::write(&data_file, "aGVsbG8=\n").unwrap();

        cli()
            .arg("--config")
            .arg(&config)
            .args(["base64", "--name", "hello.png", "--data-file"])
            .arg(&data_file)
            .assert()
            .success()
            .stdout(predicate::str::contains(r#""size":5"#));
    }

    #[test]
    fn test_unknown_log_level_rejected() {
        let root = tempfile::tempdir().unwrap();
        let config = write_config(root.path(), 1024);

        cli()
            .arg("--config")
            .arg(&config)
            .args(["--log-level", "loud", "remote", "http://example.com/a.png"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("invalid value"));
    }

    #[test]
    fn test_missing_config_fails() {
        cli()
            .args(["--config", "/no/such/config.yaml", "remote", "http://example.com/a.png"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Failed to load configuration"));
    }
}
