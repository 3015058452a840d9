//! On-disk format of the store and its schema migrations.
//!
//! One blob under [`STORAGE_KEY`]:
//!
//! ```json
//! { "name": "resume-analyzer-storage", "version": 1,
//!   "state": { "resumes": [...], "currentResume": "<uuid>" | null, "analytics": {...} } }
//! ```
//!
//! `analytics` is written for readers of the raw blob but never trusted on
//! load; the store recomputes it from `resumes`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;
use uuid::Uuid;

use crate::analytics::AnalyticsSnapshot;
use crate::models::ResumeRecord;
use crate::store::StorageError;

pub const STORAGE_KEY: &str = "resume-analyzer-storage";
pub const STORAGE_VERSION: u32 = 1;

#[derive(Debug, Serialize)]
struct EnvelopeRef<'a> {
    name: &'a str,
    version: u32,
    state: StateRef<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StateRef<'a> {
    resumes: &'a [ResumeRecord],
    current_resume: Option<Uuid>,
    analytics: &'a AnalyticsSnapshot,
}

#[derive(Debug, Deserialize)]
struct Envelope {
    // Blobs written before versioning carried no version field.
    #[serde(default)]
    version: u32,
    state: Value,
}

/// The parts of a stored blob the store actually uses.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedState {
    #[serde(default)]
    pub resumes: Vec<ResumeRecord>,
    #[serde(default)]
    pub current_resume: Option<Uuid>,
}

pub fn encode(
    resumes: &[ResumeRecord],
    current_resume: Option<Uuid>,
    analytics: &AnalyticsSnapshot,
) -> Result<String, StorageError> {
    Ok(serde_json::to_string(&EnvelopeRef {
        name: STORAGE_KEY,
        version: STORAGE_VERSION,
        state: StateRef {
            resumes,
            current_resume,
            analytics,
        },
    })?)
}

pub fn decode(blob: &str) -> Result<PersistedState, StorageError> {
    let envelope: Envelope = serde_json::from_str(blob)?;
    migrate(envelope.version, envelope.state)
}

fn migrate(version: u32, state: Value) -> Result<PersistedState, StorageError> {
    match version {
        STORAGE_VERSION => Ok(serde_json::from_value(state)?),
        0 => {
            // Version 0 has the same record shape; it only lacked the header.
            info!("Migrating stored resumes from schema v0 to v{STORAGE_VERSION}");
            Ok(serde_json::from_value(state)?)
        }
        found => Err(StorageError::UnsupportedVersion {
            found,
            supported: STORAGE_VERSION,
        }),
    }
}
