//! Turns a resume file into the base64 payload attached to extraction requests.

use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use tracing::debug;

use crate::errors::AnalyzerError;

pub const PDF_MIME_TYPE: &str = "application/pdf";
/// Upload ceiling, matching what the extraction service accepts inline.
pub const MAX_FILE_BYTES: u64 = 10 * 1024 * 1024;
const PDF_SIGNATURE: &[u8] = b"%PDF-";

/// A document ready to be embedded in a request.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedDocument {
    pub mime_type: &'static str,
    pub data: String,
    pub byte_len: usize,
}

/// Base64 (standard alphabet, padded) of the raw bytes.
pub fn encode_bytes(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Strips a `data:<mime>;base64,` prefix, leaving only the payload.
/// Input without a prefix is returned unchanged.
pub fn strip_data_url_prefix(encoded: &str) -> &str {
    match encoded.strip_prefix("data:") {
        Some(rest) => rest.split_once(',').map(|(_, payload)| payload).unwrap_or(encoded),
        None => encoded,
    }
}

/// Reads a PDF from disk and encodes it.
pub async fn encode_file(path: &Path) -> Result<EncodedDocument, AnalyzerError> {
    let read_error = |source: std::io::Error| AnalyzerError::Read {
        path: path.to_path_buf(),
        source,
    };

    let metadata = tokio::fs::metadata(path).await.map_err(read_error)?;
    if metadata.len() > MAX_FILE_BYTES {
        return Err(AnalyzerError::UnsupportedInput(
            "File size too large. Please select a file under 10MB.".to_string(),
        ));
    }

    let bytes = tokio::fs::read(path).await.map_err(read_error)?;
    encode_document(&bytes)
}

/// Encodes an in-memory PDF.
pub fn encode_document(bytes: &[u8]) -> Result<EncodedDocument, AnalyzerError> {
    if bytes.len() as u64 > MAX_FILE_BYTES {
        return Err(AnalyzerError::UnsupportedInput(
            "File size too large. Please select a file under 10MB.".to_string(),
        ));
    }
    if !bytes.starts_with(PDF_SIGNATURE) {
        return Err(AnalyzerError::UnsupportedInput(
            "Only PDF resumes are supported. Please select a PDF file.".to_string(),
        ));
    }

    let data = encode_bytes(bytes);
    debug!("Encoded {} bytes into {} base64 chars", bytes.len(), data.len());

    Ok(EncodedDocument {
        mime_type: PDF_MIME_TYPE,
        data,
        byte_len: bytes.len(),
    })
}
