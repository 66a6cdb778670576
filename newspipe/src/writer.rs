use crate::types::{NewspipeError, Result};
use crate::utils::time;
use chrono::{DateTime, Local};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::PathBuf;
use tracing::info;

const FILE_PREFIX: &str = "ai_news_summary_";

/// Stores digests as `ai_news_summary_<timestamp>.md`, never replacing a file
/// that already exists.
pub struct DigestWriter {
    output_dir: PathBuf,
}

impl DigestWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn write(&self, markdown: &str) -> Result<PathBuf> {
        self.write_at(markdown, &Local::now())
    }

    pub fn write_at(&self, markdown: &str, at: &DateTime<Local>) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir)?;

        let stamp = time::file_stamp(at);
        for attempt in 0u32.. {
            let file_name = if attempt == 0 {
                format!("{}{}.md", FILE_PREFIX, stamp)
            } else {
                format!("{}{}_{}.md", FILE_PREFIX, stamp, attempt)
            };
            let path = self.output_dir.join(file_name);

            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(mut file) => {
                    file.write_all(markdown.as_bytes())?;
                    file.flush()?;
                    info!("Saved digest to: {}", path.display());
                    return Ok(path);
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(NewspipeError::Io(e)),
            }
        }

        Err(NewspipeError::Io(std::io::Error::new(
            ErrorKind::AlreadyExists,
            "no free digest file name",
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn creates_directory_and_timestamped_file() {
        let dir = tempfile::tempdir().unwrap();
        let output_dir = dir.path().join("summaries");
        let writer = DigestWriter::new(&output_dir);
        let at = Local.with_ymd_and_hms(2026, 10, 16, 7, 30, 0).unwrap();

        let path = writer.write_at("# AI News Summary\n", &at).unwrap();

        assert_eq!(path, output_dir.join("ai_news_summary_20261016_073000.md"));
        assert_eq!(fs::read_to_string(&path).unwrap(), "# AI News Summary\n");
    }

    #[test]
    fn never_overwrites_an_existing_digest() {
        let dir = tempfile::tempdir().unwrap();
        let writer = DigestWriter::new(dir.path());
        let at = Local.with_ymd_and_hms(2026, 10, 16, 7, 30, 0).unwrap();

        let first = writer.write_at("first", &at).unwrap();
        let second = writer.write_at("second", &at).unwrap();

        assert_ne!(first, second);
        assert!(second.ends_with("ai_news_summary_20261016_073000_1.md"));
        assert_eq!(fs::read_to_string(first).unwrap(), "first");
        assert_eq!(fs::read_to_string(second).unwrap(), "second");
    }
}
