pub mod analytics;
pub mod cli;
pub mod comparison;
pub mod config;
pub mod encoder;
pub mod errors;
pub mod export;
pub mod extraction;
pub mod models;
pub mod parser;
pub mod pipeline;
pub mod scoring;
pub mod store;

pub use analytics::AnalyticsSnapshot;
pub use errors::AnalyzerError;
pub use extraction::{AnalysisDepth, ExtractionService, GeminiClient};
pub use models::{ResumeAnalysis, ResumeRecord};
pub use parser::ResponseParser;
pub use pipeline::Analyzer;
pub use store::{JsonFileStorage, MemoryStorage, ResumeStore, StorageBackend};
