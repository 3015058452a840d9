//! The ordered collection of analyzed resumes and its analytics snapshot.
//!
//! The store is the only owner of both. Every mutation stages the new
//! collection, recomputes analytics over it, persists the pair and only then
//! swaps it in, so a caller can never observe records and analytics out of
//! step, and a failed save leaves the previous state untouched.

use chrono::Utc;
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::analytics::{recompute, AnalyticsSnapshot};
use crate::comparison::ComparisonRow;
use crate::models::{RecordPatch, ResumeAnalysis, ResumeRecord};
use crate::scoring::compute_score;

pub mod persistence;
pub mod versioning;

pub use persistence::{JsonFileStorage, MemoryStorage, StorageBackend};
pub use versioning::{STORAGE_KEY, STORAGE_VERSION};

pub const RECENT_LIMIT: usize = 5;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Stored data has schema version {found}, this build supports up to {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },
}

pub struct ResumeStore<B: StorageBackend> {
    backend: B,
    records: Vec<ResumeRecord>,
    current: Option<Uuid>,
    analytics: AnalyticsSnapshot,
}

impl<B: StorageBackend> ResumeStore<B> {
    /// Loads any previously persisted collection from `backend`.
    /// A blob that no longer decodes is set aside and the store starts empty;
    /// a blob from a newer schema is refused so it is never overwritten.
    pub fn open(mut backend: B) -> Result<Self, StorageError> {
        let state = match backend.read(STORAGE_KEY)? {
            Some(blob) => match versioning::decode(&blob) {
                Ok(state) => state,
                Err(StorageError::Serialization(e)) => {
                    warn!("Stored resumes are unreadable ({e}), starting with an empty store");
                    backend.quarantine(STORAGE_KEY)?;
                    versioning::PersistedState::default()
                }
                Err(e) => return Err(e),
            },
            None => versioning::PersistedState::default(),
        };

        let mut records = state.resumes;
        for record in &mut records {
            let score = compute_score(&record.analysis);
            if score != record.score {
                debug!("Rescored {}: {} -> {}", record.id, record.score, score);
                record.score = score;
            }
        }

        let current = state
            .current_resume
            .filter(|id| records.iter().any(|r| r.id == *id));
        let analytics = recompute(&records);
        info!("Opened resume store with {} records", records.len());

        Ok(Self {
            backend,
            records,
            current,
            analytics,
        })
    }

    /// Stores a new analysis. Assigns `id` and `analyzed_at`, computes the
    /// score and makes it the current record.
    pub fn add(&mut self, analysis: ResumeAnalysis) -> Result<ResumeRecord, StorageError> {
        let record = ResumeRecord {
            id: Uuid::new_v4(),
            analyzed_at: Utc::now(),
            score: compute_score(&analysis),
            analysis,
        };

        let mut records = self.records.clone();
        records.push(record.clone());
        self.commit(records, Some(record.id))?;

        info!("Added resume {} (score {})", record.id, record.score);
        Ok(record)
    }

    /// Deletes the record with `id`. Absent ids are a no-op.
    pub fn remove(&mut self, id: Uuid) -> Result<Option<ResumeRecord>, StorageError> {
        let Some(pos) = self.records.iter().position(|r| r.id == id) else {
            debug!("Remove of unknown resume {id} ignored");
            return Ok(None);
        };

        let mut records = self.records.clone();
        let removed = records.remove(pos);
        let current = self.current.filter(|c| *c != id);
        self.commit(records, current)?;

        info!("Removed resume {id}");
        Ok(Some(removed))
    }

    /// Merges `patch` into the record with `id`. `id` and `analyzed_at` are
    /// kept, the score is recomputed. Absent ids are a no-op.
    pub fn update(
        &mut self,
        id: Uuid,
        patch: RecordPatch,
    ) -> Result<Option<ResumeRecord>, StorageError> {
        let Some(pos) = self.records.iter().position(|r| r.id == id) else {
            debug!("Update of unknown resume {id} ignored");
            return Ok(None);
        };

        let mut records = self.records.clone();
        let record = &mut records[pos];
        patch.apply_to(&mut record.analysis);
        record.score = compute_score(&record.analysis);
        let updated = record.clone();
        self.commit(records, self.current)?;

        info!("Updated resume {id} (score {})", updated.score);
        Ok(Some(updated))
    }

    /// Empties the collection and resets analytics.
    pub fn clear(&mut self) -> Result<(), StorageError> {
        self.commit(Vec::new(), None)?;
        info!("Cleared all resumes");
        Ok(())
    }

    /// Makes `id` the current record; `None` clears the selection.
    /// Returns false, changing nothing, if `id` is unknown.
    pub fn select(&mut self, id: Option<Uuid>) -> Result<bool, StorageError> {
        if let Some(id) = id {
            if self.get(id).is_none() {
                return Ok(false);
            }
        }
        let records = self.records.clone();
        self.commit(records, id)?;
        Ok(true)
    }

    /// Records in insertion order.
    pub fn list(&self) -> &[ResumeRecord] {
        &self.records
    }

    pub fn get(&self, id: Uuid) -> Option<&ResumeRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn current(&self) -> Option<&ResumeRecord> {
        self.current.and_then(|id| self.get(id))
    }

    pub fn analytics(&self) -> &AnalyticsSnapshot {
        &self.analytics
    }

    /// Best score in the collection, 0 when empty.
    pub fn highest_score(&self) -> u8 {
        self.records.iter().map(|r| r.score).max().unwrap_or(0)
    }

    /// The last [`RECENT_LIMIT`] records added, newest first.
    pub fn recent(&self) -> impl Iterator<Item = &ResumeRecord> {
        self.records.iter().rev().take(RECENT_LIMIT)
    }

    /// Side-by-side rows for the given ids, in the order given. Unknown ids
    /// are skipped.
    pub fn compare(&self, ids: &[Uuid]) -> Vec<ComparisonRow> {
        ids.iter()
            .filter_map(|id| self.get(*id))
            .map(ComparisonRow::from)
            .collect()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn into_backend(self) -> B {
        self.backend
    }

    fn commit(&mut self, records: Vec<ResumeRecord>, current: Option<Uuid>) -> Result<(), StorageError> {
        let analytics = recompute(&records);
        let blob = versioning::encode(&records, current, &analytics)?;
        if let Err(e) = self.backend.write(STORAGE_KEY, &blob) {
            warn!("Persisting resume store failed, keeping previous state: {e}");
            return Err(e);
        }

        self.records = records;
        self.current = current;
        self.analytics = analytics;
        Ok(())
    }
}
