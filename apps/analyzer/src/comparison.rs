use serde::Serialize;
use uuid::Uuid;

use crate::models::ResumeRecord;

/// One column of a side-by-side comparison.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonRow {
    pub id: Uuid,
    pub name: String,
    pub score: u8,
    pub ats_score: u8,
    pub work_experience_count: usize,
    pub skills_count: usize,
    pub education_count: usize,
}

impl From<&ResumeRecord> for ComparisonRow {
    fn from(record: &ResumeRecord) -> Self {
        Self {
            id: record.id,
            name: record
                .analysis
                .candidate_name()
                .unwrap_or("Unknown")
                .to_string(),
            score: record.score,
            ats_score: record.analysis.ats_score.unwrap_or(0),
            work_experience_count: record.analysis.work_experience.len(),
            skills_count: record.analysis.skills.len(),
            education_count: record.analysis.education.len(),
        }
    }
}
