use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use crate::extraction::AnalysisDepth;

const PLACEHOLDER_API_KEY: &str = "YOUR_API_KEY";
const DEFAULT_STORE_DIR: &str = ".resume-analyzer";

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Raw value; checked by [`Config::require_api_key`] only where the
    /// extraction service is called.
    pub gemini_api_key: Option<String>,
    pub store_dir: PathBuf,
    pub analysis_depth: AnalysisDepth,
    pub aggressive_repair: bool,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            gemini_api_key: std::env::var("GEMINI_API_KEY").ok(),
            store_dir: std::env::var("RESUME_STORE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_STORE_DIR)),
            analysis_depth: match std::env::var("ANALYSIS_DEPTH") {
                Ok(value) => value
                    .parse::<AnalysisDepth>()
                    .map_err(anyhow::Error::msg)
                    .context("ANALYSIS_DEPTH must be 'basic' or 'detailed'")?,
                Err(_) => AnalysisDepth::default(),
            },
            aggressive_repair: std::env::var("PARSER_AGGRESSIVE_REPAIR")
                .ok()
                .map(|v| parse_flag(&v))
                .transpose()
                .context("PARSER_AGGRESSIVE_REPAIR must be true or false")?
                .unwrap_or(false),
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }

    pub fn require_api_key(&self) -> Result<String> {
        validate_api_key(self.gemini_api_key.as_deref())
    }
}

/// The key must be set to something other than the sample placeholder.
fn validate_api_key(key: Option<&str>) -> Result<String> {
    let key = key.context("Required environment variable 'GEMINI_API_KEY' is not set")?;
    let trimmed = key.trim();
    if trimmed.is_empty() || trimmed == PLACEHOLDER_API_KEY {
        bail!("GEMINI_API_KEY is not configured. Set it in the environment or a .env file");
    }
    Ok(trimmed.to_string())
}

fn parse_flag(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => bail!("unrecognised boolean '{other}'"),
    }
}
