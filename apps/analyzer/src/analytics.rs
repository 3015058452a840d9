//! Derived statistics over every stored analysis.
//!
//! The snapshot is always rebuilt from the full collection. Nothing is carried
//! between calls, so the result cannot drift after edits or deletions.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::models::{ResumeAnalysis, ResumeRecord};

pub const TOP_SKILLS_LIMIT: usize = 10;

const TECHNOLOGY_KEYWORDS: &[&str] = &["javascript", "python", "react", "node", "sql", "html", "css"];
const BUSINESS_KEYWORDS: &[&str] = &["marketing", "sales", "finance", "accounting", "management"];
const DESIGN_KEYWORDS: &[&str] = &["design", "photoshop", "illustrator", "figma", "ui", "ux"];

/// Checked in order; the first set with a hit wins.
const INDUSTRIES: &[(&str, &[&str])] = &[
    ("Technology", TECHNOLOGY_KEYWORDS),
    ("Business", BUSINESS_KEYWORDS),
    ("Design", DESIGN_KEYWORDS),
];
pub const OTHER_INDUSTRY: &str = "Other";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SkillCount {
    pub skill: String,
    pub count: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSnapshot {
    pub total_resumes: usize,
    pub average_score: u8,
    pub top_skills: Vec<SkillCount>,
    pub industry_breakdown: BTreeMap<String, usize>,
}

pub fn recompute(records: &[ResumeRecord]) -> AnalyticsSnapshot {
    if records.is_empty() {
        return AnalyticsSnapshot::default();
    }

    let mut industry_breakdown = BTreeMap::new();
    for record in records {
        *industry_breakdown
            .entry(classify_industry(&record.analysis).to_string())
            .or_insert(0) += 1;
    }

    AnalyticsSnapshot {
        total_resumes: records.len(),
        average_score: average_score(records),
        top_skills: top_skills(records),
        industry_breakdown,
    }
}

fn average_score(records: &[ResumeRecord]) -> u8 {
    let total: u32 = records.iter().map(|r| u32::from(r.score)).sum();
    (total as f64 / records.len() as f64).round() as u8
}

/// Case-sensitive skill frequency, most frequent first. Ties keep the order
/// in which the skills were first seen.
fn top_skills(records: &[ResumeRecord]) -> Vec<SkillCount> {
    let mut counts: Vec<SkillCount> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for name in records.iter().flat_map(|r| r.analysis.skill_names()) {
        match index.get(name) {
            Some(&i) => counts[i].count += 1,
            None => {
                index.insert(name, counts.len());
                counts.push(SkillCount {
                    skill: name.to_string(),
                    count: 1,
                });
            }
        }
    }

    // sort_by is stable, which preserves first-seen order on ties.
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts.truncate(TOP_SKILLS_LIMIT);
    counts
}

/// Coarse industry label from the resume's skills.
pub fn classify_industry(analysis: &ResumeAnalysis) -> &'static str {
    let skills: Vec<String> = analysis.skill_names().map(str::to_lowercase).collect();

    INDUSTRIES
        .iter()
        .find(|(_, keywords)| {
            skills
                .iter()
                .any(|skill| keywords.iter().any(|k| skill.contains(k)))
        })
        .map(|(label, _)| *label)
        .unwrap_or(OTHER_INDUSTRY)
}
