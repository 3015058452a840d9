//! Deterministic completeness score (0–100) for a single resume.
//!
//! Canonical weighting:
//!
//! | section         | points                    | cap |
//! |-----------------|---------------------------|-----|
//! | contact         | 5 each: name/email/phone/linkedin | 20 |
//! | summary         | 15 if longer than 50 chars | 15 |
//! | work experience | 10 per entry              | 30  |
//! | education       | 7.5 per entry             | 15  |
//! | skills          | 2 per entry               | 20  |
//!
//! The sum is clamped to 100 and rounded half-up.

use serde::{Deserialize, Serialize};

use crate::models::{ContactInfo, ResumeAnalysis};

const CONTACT_FIELD_POINTS: f64 = 5.0;
const SUMMARY_POINTS: f64 = 15.0;
const SUMMARY_MIN_CHARS: usize = 50;

/// (points per entry, section cap)
const WORK_EXPERIENCE_WEIGHT: (f64, f64) = (10.0, 30.0);
const EDUCATION_WEIGHT: (f64, f64) = (7.5, 15.0);
const SKILLS_WEIGHT: (f64, f64) = (2.0, 20.0);

pub const MAX_SCORE: u8 = 100;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum ScoreBand {
    Excellent,
    Good,
    NeedsImprovement,
}

impl ScoreBand {
    pub fn from_score(score: u8) -> Self {
        match score {
            s if s >= 80 => ScoreBand::Excellent,
            s if s >= 60 => ScoreBand::Good,
            _ => ScoreBand::NeedsImprovement,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ScoreBand::Excellent => "Excellent",
            ScoreBand::Good => "Good",
            ScoreBand::NeedsImprovement => "Needs Improvement",
        }
    }
}

/// Points earned per section, before clamping.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ScoreBreakdown {
    pub contact: f64,
    pub summary: f64,
    pub work_experience: f64,
    pub education: f64,
    pub skills: f64,
}

impl ScoreBreakdown {
    pub fn total(&self) -> u8 {
        let sum = self.contact + self.summary + self.work_experience + self.education + self.skills;
        sum.clamp(0.0, MAX_SCORE as f64).round() as u8
    }
}

pub fn compute_breakdown(analysis: &ResumeAnalysis) -> ScoreBreakdown {
    ScoreBreakdown {
        contact: analysis
            .contact_info
            .as_ref()
            .map(contact_points)
            .unwrap_or(0.0),
        summary: if analysis
            .summary
            .as_deref()
            .is_some_and(|s| s.chars().count() > SUMMARY_MIN_CHARS)
        {
            SUMMARY_POINTS
        } else {
            0.0
        },
        work_experience: capped(analysis.work_experience.len(), WORK_EXPERIENCE_WEIGHT),
        education: capped(analysis.education.len(), EDUCATION_WEIGHT),
        skills: capped(analysis.skills.len(), SKILLS_WEIGHT),
    }
}

/// Total score in `0..=100`. Never fails; missing sections contribute zero.
pub fn compute_score(analysis: &ResumeAnalysis) -> u8 {
    compute_breakdown(analysis).total()
}

fn contact_points(contact: &ContactInfo) -> f64 {
    [&contact.name, &contact.email, &contact.phone, &contact.linkedin]
        .into_iter()
        .filter(|field| has_text(field))
        .count() as f64
        * CONTACT_FIELD_POINTS
}

fn capped(entries: usize, (per_entry, cap): (f64, f64)) -> f64 {
    (entries as f64 * per_entry).min(cap)
}

fn has_text(field: &Option<String>) -> bool {
    field.as_deref().is_some_and(|s| !s.trim().is_empty())
}

/// Improvement suggestions for a scored resume.
pub fn generate_suggestions(analysis: &ResumeAnalysis, score: u8) -> Vec<String> {
    let mut suggestions = Vec::new();

    let has_linkedin = analysis
        .contact_info
        .as_ref()
        .is_some_and(|c| has_text(&c.linkedin));
    if !has_linkedin {
        suggestions.push("Add LinkedIn profile URL to increase professional credibility".to_string());
    }

    let summary_len = analysis.summary.as_deref().map_or(0, |s| s.chars().count());
    if summary_len < SUMMARY_MIN_CHARS {
        suggestions.push("Add a compelling professional summary (50+ words)".to_string());
    }

    if analysis.work_experience.len() < 2 {
        suggestions
            .push("Include more work experience entries with detailed descriptions".to_string());
    }

    if analysis.skills.len() < 5 {
        suggestions.push("Add more relevant skills to showcase your expertise".to_string());
    }

    if score < 70 {
        suggestions
            .push("Consider adding certifications, projects, or volunteer experience".to_string());
    }

    suggestions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Education, Skill, WorkExperience};

    fn full_resume() -> ResumeAnalysis {
        ResumeAnalysis {
            contact_info: Some(ContactInfo {
                name: Some("Grace Hopper".to_string()),
                email: Some("grace@example.com".to_string()),
                phone: Some("+1 555 0100".to_string()),
                linkedin: Some("linkedin.com/in/grace".to_string()),
                ..Default::default()
            }),
            summary: Some(
                "Systems engineer with two decades of compiler and distributed systems work."
                    .to_string(),
            ),
            work_experience: vec![WorkExperience::default(); 5],
            education: vec![Education::default(); 3],
            skills: (0..15).map(|i| Skill::Name(format!("skill-{i}"))).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_empty_record_scores_zero() {
        assert_eq!(compute_score(&ResumeAnalysis::default()), 0);
    }

    #[test]
    fn test_fully_populated_record_scores_hundred() {
        let breakdown = compute_breakdown(&full_resume());
        assert_eq!(breakdown.contact, 20.0);
        assert_eq!(breakdown.summary, 15.0);
        assert_eq!(breakdown.work_experience, 30.0);
        assert_eq!(breakdown.education, 15.0);
        assert_eq!(breakdown.skills, 20.0);
        assert_eq!(breakdown.total(), 100);
    }

    #[test]
    fn test_partial_record() {
        let analysis = ResumeAnalysis {
            contact_info: Some(ContactInfo {
                name: Some("A".to_string()),
                email: Some("  ".to_string()),
                ..Default::default()
            }),
            summary: Some("too short".to_string()),
            work_experience: vec![WorkExperience::default()],
            skills: vec![Skill::Name("Go".to_string()), Skill::Name("Rust".to_string())],
            ..Default::default()
        };
        // 5 + 0 + 10 + 0 + 4
        assert_eq!(compute_score(&analysis), 19);
    }

    #[test]
    fn test_half_points_round_up() {
        let analysis = ResumeAnalysis {
            education: vec![Education::default()],
            ..Default::default()
        };
        assert_eq!(compute_breakdown(&analysis).education, 7.5);
        assert_eq!(compute_score(&analysis), 8);
    }

    #[test]
    fn test_summary_needs_more_than_fifty_chars() {
        let exactly_fifty = ResumeAnalysis {
            summary: Some("x".repeat(50)),
            ..Default::default()
        };
        assert_eq!(compute_score(&exactly_fifty), 0);
        let fifty_one = ResumeAnalysis {
            summary: Some("x".repeat(51)),
            ..Default::default()
        };
        assert_eq!(compute_score(&fifty_one), 15);
    }

    #[test]
    fn test_score_bands() {
        assert_eq!(ScoreBand::from_score(100), ScoreBand::Excellent);
        assert_eq!(ScoreBand::from_score(80), ScoreBand::Excellent);
        assert_eq!(ScoreBand::from_score(79), ScoreBand::Good);
        assert_eq!(ScoreBand::from_score(60), ScoreBand::Good);
        assert_eq!(ScoreBand::from_score(59).label(), "Needs Improvement");
    }

    #[test]
    fn test_suggestions_for_empty_resume() {
        let suggestions = generate_suggestions(&ResumeAnalysis::default(), 0);
        assert_eq!(suggestions.len(), 5);
        assert!(suggestions[0].contains("LinkedIn"));
    }

    #[test]
    fn test_no_suggestions_for_complete_resume() {
        let resume = full_resume();
        let score = compute_score(&resume);
        assert!(generate_suggestions(&resume, score).is_empty());
    }
}
