//! encode → build request → extraction service → parse → score → store.
//!
//! Each run is tagged with a sequence number when it starts. Only the result
//! of the most recently started run may be committed; anything older (or any
//! run started before a `reset`) is dropped on arrival. The in-flight HTTP
//! request itself is not aborted.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, info};

use crate::encoder::{encode_document, encode_file, EncodedDocument};
use crate::errors::AnalyzerError;
use crate::extraction::{build_request, AnalysisDepth, ExtractionService};
use crate::models::{ResumeAnalysis, ResumeRecord};
use crate::parser::ResponseParser;
use crate::store::{ResumeStore, StorageBackend};

/// Identifies one analysis run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Attempt(u64);

/// A finished extraction that has not been stored yet.
#[derive(Debug, Clone)]
pub struct CompletedAnalysis {
    pub attempt: Attempt,
    pub analysis: ResumeAnalysis,
}

pub struct Analyzer<S: ExtractionService> {
    service: S,
    depth: AnalysisDepth,
    parser: ResponseParser,
    latest: AtomicU64,
}

impl<S: ExtractionService> Analyzer<S> {
    pub fn new(service: S, depth: AnalysisDepth, parser: ResponseParser) -> Self {
        Self {
            service,
            depth,
            parser,
            latest: AtomicU64::new(0),
        }
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    pub fn depth(&self) -> AnalysisDepth {
        self.depth
    }

    /// Reads, encodes and analyzes the PDF at `path`.
    pub async fn analyze_file(&self, path: &Path) -> Result<CompletedAnalysis, AnalyzerError> {
        let attempt = self.begin();
        info!("Analyzing {} ({} analysis, attempt {})", path.display(), self.depth, attempt.0);
        let document = encode_file(path).await?;
        self.run(attempt, document).await
    }

    /// Analyzes an in-memory PDF.
    pub async fn analyze_bytes(&self, bytes: &[u8]) -> Result<CompletedAnalysis, AnalyzerError> {
        let attempt = self.begin();
        let document = encode_document(bytes)?;
        self.run(attempt, document).await
    }

    async fn run(
        &self,
        attempt: Attempt,
        document: EncodedDocument,
    ) -> Result<CompletedAnalysis, AnalyzerError> {
        let request = build_request(&document.data, self.depth);
        let reply = self.service.generate(&request).await?;
        debug!("Attempt {} received {} chars", attempt.0, reply.len());

        let analysis = self.parser.parse(&reply)?;
        Ok(CompletedAnalysis { attempt, analysis })
    }

    /// Stores `completed` if it is still the latest run. A superseded result
    /// is discarded and `Ok(None)` returned.
    pub fn commit<B: StorageBackend>(
        &self,
        completed: CompletedAnalysis,
        store: &mut ResumeStore<B>,
    ) -> Result<Option<ResumeRecord>, AnalyzerError> {
        if !self.is_latest(completed.attempt) {
            debug!("Discarding result of superseded attempt {}", completed.attempt.0);
            return Ok(None);
        }
        Ok(Some(store.add(completed.analysis)?))
    }

    /// Invalidates every run started so far.
    pub fn reset(&self) {
        self.latest.fetch_add(1, Ordering::SeqCst);
    }

    pub fn is_latest(&self, attempt: Attempt) -> bool {
        self.latest.load(Ordering::SeqCst) == attempt.0
    }

    fn begin(&self) -> Attempt {
        Attempt(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::extraction::{AnalysisRequest, RequestError};
    use crate::store::MemoryStorage;

    const PDF: &[u8] = b"%PDF-1.4\n% test resume";

    /// Replies with queued texts in order and records what it was sent.
    struct StubService {
        replies: Mutex<Vec<Result<String, RequestError>>>,
        seen: Mutex<Vec<AnalysisRequest>>,
    }

    impl StubService {
        fn new(replies: Vec<Result<String, RequestError>>) -> Self {
            Self {
                replies: Mutex::new(replies),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ExtractionService for StubService {
        async fn generate(&self, request: &AnalysisRequest) -> Result<String, RequestError> {
            self.seen.lock().unwrap().push(request.clone());
            self.replies.lock().unwrap().remove(0)
        }
    }

    fn analyzer(replies: Vec<Result<String, RequestError>>) -> Analyzer<StubService> {
        Analyzer::new(
            StubService::new(replies),
            AnalysisDepth::Basic,
            ResponseParser::default(),
        )
    }

    #[tokio::test]
    async fn test_full_pipeline_stores_record() {
        let analyzer = analyzer(vec![Ok(
            "```json\n{\"contactInfo\": {\"name\": \"Kim\"}, \"skills\": [\"React\"],}\n```".to_string(),
        )]);
        let mut store = ResumeStore::open(MemoryStorage::new()).unwrap();

        let completed = analyzer.analyze_bytes(PDF).await.unwrap();
        let record = analyzer.commit(completed, &mut store).unwrap().unwrap();

        assert_eq!(record.analysis.candidate_name(), Some("Kim"));
        assert_eq!(record.score, 7);
        assert_eq!(store.analytics().industry_breakdown.get("Technology"), Some(&1));

        let seen = analyzer.service().seen.lock().unwrap();
        let json = serde_json::to_value(&seen[0]).unwrap();
        assert_eq!(json["contents"][0]["parts"][1]["inlineData"]["data"], "JVBERi0xLjQKJSB0ZXN0IHJlc3VtZQ==");
    }

    #[tokio::test]
    async fn test_stale_result_is_discarded() {
        let analyzer = analyzer(vec![
            Ok("{\"skills\": [\"Go\"]}".to_string()),
            Ok("{\"skills\": [\"Rust\"]}".to_string()),
        ]);
        let mut store = ResumeStore::open(MemoryStorage::new()).unwrap();

        let first = analyzer.analyze_bytes(PDF).await.unwrap();
        let second = analyzer.analyze_bytes(PDF).await.unwrap();

        assert!(analyzer.commit(first, &mut store).unwrap().is_none());
        let stored = analyzer.commit(second, &mut store).unwrap().unwrap();
        assert_eq!(stored.analysis.skill_names().collect::<Vec<_>>(), vec!["Rust"]);
        assert_eq!(store.list().len(), 1);
    }

    #[tokio::test]
    async fn test_reset_invalidates_in_flight_result() {
        let analyzer = analyzer(vec![Ok("{}".to_string())]);
        let mut store = ResumeStore::open(MemoryStorage::new()).unwrap();

        let completed = analyzer.analyze_bytes(PDF).await.unwrap();
        analyzer.reset();

        assert!(analyzer.commit(completed, &mut store).unwrap().is_none());
        assert!(store.list().is_empty());
    }

    #[tokio::test]
    async fn test_request_error_leaves_store_untouched() {
        let analyzer = analyzer(vec![Err(RequestError::Forbidden)]);
        let store = ResumeStore::open(MemoryStorage::new()).unwrap();

        let err = analyzer.analyze_bytes(PDF).await.unwrap_err();
        assert!(matches!(err, AnalyzerError::Request(RequestError::Forbidden)));
        assert!(store.list().is_empty());
    }

    #[tokio::test]
    async fn test_unparseable_reply_is_parse_error() {
        let analyzer = analyzer(vec![Ok("I could not find a resume here.".to_string())]);
        let err = analyzer.analyze_bytes(PDF).await.unwrap_err();
        assert!(matches!(err, AnalyzerError::Parse(_)));
    }

    #[tokio::test]
    async fn test_non_pdf_never_reaches_service() {
        let analyzer = analyzer(vec![]);
        let err = analyzer.analyze_bytes(b"plain text resume").await.unwrap_err();
        assert!(matches!(err, AnalyzerError::UnsupportedInput(_)));
        assert!(analyzer.service().seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_analyze_file_reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resume.pdf");
        std::fs::write(&path, PDF).unwrap();

        let analyzer = analyzer(vec![Ok("{\"summary\": \"ok\"}".to_string())]);
        let completed = analyzer.analyze_file(&path).await.unwrap();
        assert_eq!(completed.analysis.summary.as_deref(), Some("ok"));
        assert!(analyzer.is_latest(completed.attempt));
    }
}
