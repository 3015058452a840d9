//! Extraction client: the single point of entry for calls to the generative
//! extraction service.
//!
//! No other module talks to the service directly. Everything goes through the
//! `ExtractionService` trait so the pipeline can run against a stub in tests.
//!
//! Requests are never retried here: a failure is surfaced to the user, who
//! decides whether to try again.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, warn};

pub mod prompts;
pub mod request;

pub use request::{build_request, credential_check_request, AnalysisDepth, AnalysisRequest};

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
/// The model used for every extraction call.
pub const MODEL: &str = "gemini-1.5-flash";
const REQUEST_TIMEOUT_SECS: u64 = 120;

/// Failure classes reported by the extraction service. The `Display` text is
/// the user-facing message.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("Invalid request: {0}. Please check if your PDF is valid and not corrupted.")]
    InvalidRequest(String),

    #[error("Invalid API key. Please check your Google Gemini API key.")]
    InvalidCredential,

    #[error("API access forbidden. Please check your API key permissions and billing status.")]
    Forbidden,

    #[error("Rate limit exceeded. Please wait a moment and try again.")]
    RateLimited,

    #[error("API Error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("No content received from the API. The model may have refused to process the content.")]
    EmptyResult,

    #[error("Network error. Please check your internet connection and try again.")]
    Transport(#[from] reqwest::Error),

    #[error("Unexpected response from the API: {0}")]
    Decode(String),
}

impl RequestError {
    /// Maps a non-success HTTP status and its body to an error kind.
    pub fn from_status(status: StatusCode, body: String) -> Self {
        match status.as_u16() {
            400 => RequestError::InvalidRequest(extract_error_message(&body)),
            401 => RequestError::InvalidCredential,
            403 => RequestError::Forbidden,
            429 => RequestError::RateLimited,
            code => RequestError::Server {
                status: code,
                message: extract_error_message(&body),
            },
        }
    }
}

/// Anything that can turn an [`AnalysisRequest`] into the service's reply text.
#[async_trait]
pub trait ExtractionService: Send + Sync {
    async fn generate(&self, request: &AnalysisRequest) -> Result<String, RequestError>;
}

#[derive(Debug, Deserialize)]
pub struct GenerateResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
pub struct Candidate {
    pub content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
pub struct ResponsePart {
    pub text: Option<String>,
}

impl GenerateResponse {
    /// Text of the first part of the first candidate.
    pub fn text(&self) -> Option<&str> {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .and_then(|c| c.parts.first())
            .and_then(|p| p.text.as_deref())
    }
}

#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

fn extract_error_message(body: &str) -> String {
    serde_json::from_str::<ApiError>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.trim().to_string())
}

/// HTTP client for the Gemini `generateContent` endpoint.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
}

impl GeminiClient {
    pub fn new(api_key: String) -> Result<Self, RequestError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self { client, api_key })
    }

    fn endpoint(&self) -> String {
        format!("{GEMINI_API_BASE}/{MODEL}:generateContent")
    }

    /// Sends a tiny text-only request to confirm the key is accepted.
    pub async fn check_credentials(&self) -> Result<(), RequestError> {
        let reply = self.generate(&credential_check_request()).await?;
        info!("Credential check succeeded: {}", reply.trim());
        Ok(())
    }
}

#[async_trait]
impl ExtractionService for GeminiClient {
    async fn generate(&self, request: &AnalysisRequest) -> Result<String, RequestError> {
        let body = serde_json::to_vec(request)
            .map_err(|e| RequestError::Decode(format!("could not encode request: {e}")))?;
        debug!("Sending extraction request: model={MODEL}, payload_bytes={}", body.len());

        let response = self
            .client
            .post(self.endpoint())
            .query(&[("key", self.api_key.as_str())])
            .header("content-type", "application/json")
            .body(body)
            .send()
            .await
            // The URL carries the key; keep it out of error text and logs.
            .map_err(|e| RequestError::Transport(e.without_url()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Extraction service returned {status}: {body}");
            return Err(RequestError::from_status(status, body));
        }

        let payload: GenerateResponse = response
            .json()
            .await
            .map_err(|e| RequestError::Decode(e.without_url().to_string()))?;

        let text = payload.text().ok_or(RequestError::EmptyResult)?;
        debug!("Extraction reply received: {} chars", text.len());
        Ok(text.to_string())
    }
}
