use std::path::PathBuf;

use thiserror::Error;

use crate::extraction::RequestError;
use crate::parser::ParseError;
use crate::store::StorageError;

/// Pipeline-level error type.
/// Every failure between file selection and storage ends up here and is turned
/// into a single user-visible string by [`AnalyzerError::user_message`].
#[derive(Debug, Error)]
pub enum AnalyzerError {
    #[error("Could not read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unsupported input: {0}")]
    UnsupportedInput(String),

    #[error("Extraction request failed: {0}")]
    Request(#[from] RequestError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl AnalyzerError {
    /// The message shown to the end user. Diagnostic detail (raw service
    /// replies, io errors) goes to the log, never into this string.
    pub fn user_message(&self) -> String {
        match self {
            AnalyzerError::Read { path, source } => {
                tracing::error!("Read error for {}: {source}", path.display());
                "Could not read the file. Please try again with a different PDF.".to_string()
            }
            AnalyzerError::UnsupportedInput(msg) => msg.clone(),
            AnalyzerError::Request(e) => {
                tracing::error!("Extraction request error: {e:?}");
                e.to_string()
            }
            AnalyzerError::Parse(e) => {
                tracing::error!("Parse error: {e}");
                tracing::debug!("Unparseable reply: {}", e.raw());
                "The AI response could not be parsed. The resume content might be too complex. \
                 Please try with a simpler PDF or try again."
                    .to_string()
            }
            AnalyzerError::Storage(e) => {
                tracing::error!("Storage error: {e}");
                "Could not save your analysis history. Please try again.".to_string()
            }
        }
    }
}
