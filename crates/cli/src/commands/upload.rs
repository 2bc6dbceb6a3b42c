//! Upload command handler.
//!
//! Reads a document inline or from a file and stores it in the collection.

use super::{build_service, print_json};
use anyhow::Context;
use clap::Args;
use grounded_core::{config::AppConfig, AppError, AppResult};
use grounded_rag::{Metadata, UploadOutcome};
use serde::Serialize;
use std::path::PathBuf;

const SUCCESS_MESSAGE: &str = "문서가 성공적으로 업로드되었습니다.";
const FAILURE_MESSAGE: &str = "문서 업로드 중 오류가 발생했습니다";

/// Upload a document
#[derive(Args, Debug)]
pub struct UploadCommand {
    /// Document text
    #[arg(required_unless_present = "file", conflicts_with = "file")]
    pub text: Option<String>,

    /// Read the document from a file
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Metadata as a JSON object, e.g. '{"source": "wiki"}'
    #[arg(short, long)]
    pub metadata: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Upload result as reported to the caller.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub success: bool,
    pub document_id: String,
    pub message: String,
}

impl UploadCommand {
    pub async fn execute(&self, config: &AppConfig) -> anyhow::Result<()> {
        tracing::info!("Executing upload command");

        match self.upload(config).await {
            Ok(outcome) => {
                tracing::debug!(chunks = outcome.chunk_count, "Upload finished");
                let response = UploadResponse {
                    success: true,
                    document_id: outcome.document_id,
                    message: SUCCESS_MESSAGE.to_string(),
                };

                if self.json {
                    print_json(&response)?;
                } else {
                    println!("{}", response.message);
                    println!("document_id: {}", response.document_id);
                }
                Ok(())
            }
            Err(e) => {
                if self.json {
                    print_json(&UploadResponse {
                        success: false,
                        document_id: String::new(),
                        message: format!("{}: {}", FAILURE_MESSAGE, e),
                    })?;
                }
                Err(e).context(FAILURE_MESSAGE)
            }
        }
    }

    async fn upload(&self, config: &AppConfig) -> AppResult<UploadOutcome> {
        let text = self.read_text().await?;
        let metadata = self.metadata.as_deref().map(parse_metadata).transpose()?;

        let service = build_service(config).await?;
        service.upload(&text, metadata).await
    }

    async fn read_text(&self) -> AppResult<String> {
        match (&self.text, &self.file) {
            (Some(text), _) => Ok(text.clone()),
            (None, Some(path)) => {
                tracing::debug!(?path, "Reading document file");
                Ok(tokio::fs::read_to_string(path).await?)
            }
            (None, None) => Err(AppError::Validation(
                "Provide document text or --file".to_string(),
            )),
        }
    }
}

/// Parse `--metadata`, which must be a JSON object.
pub fn parse_metadata(raw: &str) -> AppResult<Metadata> {
    match serde_json::from_str::<serde_json::Value>(raw)? {
        serde_json::Value::Object(map) => Ok(map),
        other => Err(AppError::Validation(format!(
            "Metadata must be a JSON object, got {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn command(text: Option<&str>, file: Option<PathBuf>) -> UploadCommand {
        UploadCommand {
            text: text.map(str::to_string),
            file,
            metadata: None,
            json: false,
        }
    }

    #[test]
    fn test_parse_metadata_object() {
        let metadata = parse_metadata(r#"{"source": "doc1", "page": 3}"#).unwrap();
        assert_eq!(metadata["source"], "doc1");
        assert_eq!(metadata["page"], 3);
    }

    #[test]
    fn test_parse_metadata_rejects_non_objects() {
        assert!(matches!(
            parse_metadata("[1, 2]"),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            parse_metadata("{broken"),
            Err(AppError::Serialization(_))
        ));
    }

    #[tokio::test]
    async fn test_read_text_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "서울은 대한민국의 수도입니다.").unwrap();

        let cmd = command(None, Some(file.path().to_path_buf()));
        assert_eq!(cmd.read_text().await.unwrap(), "서울은 대한민국의 수도입니다.");
    }

    #[tokio::test]
    async fn test_read_text_inline() {
        let cmd = command(Some("inline"), None);
        assert_eq!(cmd.read_text().await.unwrap(), "inline");
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let cmd = command(None, Some(PathBuf::from("/nonexistent/grounded/doc.txt")));
        assert!(matches!(cmd.read_text().await, Err(AppError::Io(_))));
    }
}
