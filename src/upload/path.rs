//! Destination path rendering
//!
//! Templates use `{yyyy} {mm} {dd} {hh} {ii} {ss}` for zero-padded date
//! and time components and `{time}` for Unix nanoseconds. Each placeholder
//! is replaced at most once, in that order, and the source extension is
//! appended to the result.
//!
//! Templates without `{time}` can map two uploads in the same second to
//! one path; the later write wins.

use crate::config::PATH_PLACEHOLDERS;
use chrono::{DateTime, Datelike, Local, Timelike};
use percent_encoding::percent_decode_str;
use std::path::PathBuf;

/// Render `template` for `now`, appending the extension of `original_name`
pub fn render(template: &str, now: DateTime<Local>, original_name: &str) -> PathBuf {
    let nanos = now
        .timestamp_nanos_opt()
        .unwrap_or_else(|| now.timestamp().saturating_mul(1_000_000_000));

    let values = [
        format!("{:04}", now.year()),
        format!("{:02}", now.month()),
        format!("{:02}", now.day()),
        format!("{:02}", now.hour()),
        format!("{:02}", now.minute()),
        format!("{:02}", now.second()),
        nanos.to_string(),
    ];

    let mut rendered = template.to_string();
    for (placeholder, value) in PATH_PLACEHOLDERS.iter().zip(values.iter()) {
        rendered = rendered.replacen(placeholder, value, 1);
    }
    rendered.push_str(extension(original_name));

    PathBuf::from(rendered)
}

/// Extension of the final path element, including the dot
///
/// Returns an empty string when the final element has no dot.
pub fn extension(name: &str) -> &str {
    let base_start = name.rfind(|c: char| c == '/' || c == '\\').map(|i| i + 1).unwrap_or(0);
    let base = &name[base_start..];
    match base.rfind('.') {
        Some(i) => &base[i..],
        None => "",
    }
}

/// Last segment of a percent-encoded URL path, decoded
///
/// Decoding happens before splitting, so `%2F` acts as a separator and
/// `%2E` can introduce the extension.
pub fn decoded_file_name(url_path: &str) -> String {
    let decoded = percent_decode_str(url_path).decode_utf8_lossy();
    file_name(&decoded).to_string()
}

/// Last non-empty segment of a URL path
fn file_name(url_path: &str) -> &str {
    url_path
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default()
}
