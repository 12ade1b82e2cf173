use async_trait::async_trait;
use serde::Deserialize;
use tokio::{
    fs::File,
    io::{self, AsyncBufRead, AsyncBufReadExt, BufReader, Lines},
};
use tracing::{debug, trace};

use crate::backends::Source;
use crate::error::PipelineError;

// -- 📂 FileSourceConfig: "It's just a file", said no sysadmin ever before the disk filled up.
// -- Lives next to the FileSource that uses it, so nobody goes on a 2am scavenger hunt.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct FileSourceConfig {
    pub file_name: String,
}

/// 📂 FileSource: reads newline-delimited records from any buffered async reader.
///
/// Two ways in: [`FileSource::stdin`] for the classic `cat logs | esgz my-index`,
/// and [`FileSource::open`] for a file path from the config. Either way it's a
/// `Lines` over a `BufReader`, and either way empty lines are skipped.
pub(crate) struct FileSource {
    lines: Lines<Box<dyn AsyncBufRead + Send + Unpin>>,
    // 🏷️ what we're reading, for the logs. "stdin" or a path.
    origin: String,
    lines_read: u64,
}

// 🎭 manual Debug because a boxed reader has no opinion about how to print itself
impl std::fmt::Debug for FileSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileSource")
            .field("origin", &self.origin)
            .field("lines_read", &self.lines_read)
            .finish()
    }
}

impl FileSource {
    /// 🚰 Read records from standard input.
    pub(crate) fn stdin() -> Self {
        Self::from_reader("stdin", BufReader::new(io::stdin()))
    }

    /// 🚀 Open the configured file and read records from it.
    ///
    /// If the file doesn't exist: 💀 you get an `Input` error and a very quiet pipeline.
    pub(crate) async fn open(config: &FileSourceConfig) -> Result<Self, PipelineError> {
        let file = File::open(&config.file_name)
            .await
            .map_err(|source| PipelineError::Input { source })?;
        debug!("📂 opened '{}' for reading", config.file_name);
        Ok(Self::from_reader(config.file_name.clone(), BufReader::new(file)))
    }

    /// 🔧 Wrap any buffered reader. Tests hand in byte slices; prod hands in pipes.
    pub(crate) fn from_reader(
        origin: impl Into<String>,
        reader: impl AsyncBufRead + Send + Unpin + 'static,
    ) -> Self {
        let boxed: Box<dyn AsyncBufRead + Send + Unpin> = Box::new(reader);
        Self {
            lines: boxed.lines(),
            origin: origin.into(),
            lines_read: 0,
        }
    }
}

#[async_trait]
impl Source for FileSource {
    /// 📄 Next non-empty line, or `None` at EOF.
    ///
    /// `Lines` already strips `\n` and `\r\n`. Empty lines are not records, so
    /// we loop past them like they owe us money.
    async fn next_line(&mut self) -> Result<Option<String>, PipelineError> {
        loop {
            let next = self
                .lines
                .next_line()
                .await
                .map_err(|source| PipelineError::Input { source })?;
            match next {
                Some(line) if line.is_empty() => continue,
                Some(line) => {
                    self.lines_read += 1;
                    trace!("📖 line {} from {}", self.lines_read, self.origin);
                    return Ok(Some(line));
                }
                None => {
                    debug!("🏁 {} exhausted after {} lines", self.origin, self.lines_read);
                    return Ok(None);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn the_one_where_empty_lines_and_carriage_returns_get_the_cold_shoulder() -> anyhow::Result<()> {
        let input: &'static [u8] = b"{\"id\":\"a\"}\r\n\n\n{\"id\":\"b\"}\n{\"id\":\"c\"}";
        let mut source = FileSource::from_reader("test", input);

        let mut seen = Vec::new();
        while let Some(line) = source.next_line().await? {
            seen.push(line);
        }
        assert_eq!(seen, vec![r#"{"id":"a"}"#, r#"{"id":"b"}"#, r#"{"id":"c"}"#]);
        Ok(())
    }

    #[tokio::test]
    async fn the_one_where_whitespace_is_a_record_not_a_blank() -> anyhow::Result<()> {
        let input: &'static [u8] = b"{\"id\":\"a\"}\n   \n{\"id\":\"b\"}\n";
        let mut source = FileSource::from_reader("test", input);

        assert_eq!(source.next_line().await?.as_deref(), Some(r#"{"id":"a"}"#));
        assert_eq!(source.next_line().await?.as_deref(), Some("   "));
        assert_eq!(source.next_line().await?.as_deref(), Some(r#"{"id":"b"}"#));
        assert_eq!(source.next_line().await?, None);
        Ok(())
    }

    #[tokio::test]
    async fn the_one_where_an_empty_stream_is_just_eof() -> anyhow::Result<()> {
        let mut source = FileSource::from_reader("test", &b""[..]);
        assert_eq!(source.next_line().await?, None);
        Ok(())
    }

    #[tokio::test]
    async fn the_one_where_a_real_file_gets_read_front_to_back() -> anyhow::Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        writeln!(file, r#"{{"id":"one"}}"#)?;
        writeln!(file, r#"{{"id":"two"}}"#)?;
        file.flush()?;

        let config = FileSourceConfig {
            file_name: file.path().display().to_string(),
        };
        let mut source = FileSource::open(&config).await?;
        assert_eq!(source.next_line().await?.as_deref(), Some(r#"{"id":"one"}"#));
        assert_eq!(source.next_line().await?.as_deref(), Some(r#"{"id":"two"}"#));
        assert_eq!(source.next_line().await?, None);
        Ok(())
    }

    #[tokio::test]
    async fn the_one_where_the_file_is_a_figment_of_our_imagination() {
        let config = FileSourceConfig {
            file_name: "/definitely/not/here/esgz-input.ndjson".to_string(),
        };
        let err = FileSource::open(&config).await.expect_err("💀 missing file should fail");
        assert!(matches!(err, PipelineError::Input { .. }));
    }
}
