use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::de;

/// Structured fields recovered from one resume by the extraction service.
///
/// Every section is optional on the wire. Absent or `null` collections decode
/// as empty, so consumers never need to special-case missing data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeAnalysis {
    #[serde(
        default,
        deserialize_with = "de::opt_record",
        skip_serializing_if = "Option::is_none"
    )]
    pub contact_info: Option<ContactInfo>,
    #[serde(
        default,
        deserialize_with = "de::opt_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub summary: Option<String>,
    #[serde(default, deserialize_with = "de::list", skip_serializing_if = "Vec::is_empty")]
    pub work_experience: Vec<WorkExperience>,
    #[serde(default, deserialize_with = "de::list", skip_serializing_if = "Vec::is_empty")]
    pub education: Vec<Education>,
    #[serde(default, deserialize_with = "de::list", skip_serializing_if = "Vec::is_empty")]
    pub skills: Vec<Skill>,
    #[serde(default, deserialize_with = "de::list", skip_serializing_if = "Vec::is_empty")]
    pub certifications: Vec<Certification>,
    #[serde(default, deserialize_with = "de::list", skip_serializing_if = "Vec::is_empty")]
    pub projects: Vec<Project>,
    #[serde(default, deserialize_with = "de::list", skip_serializing_if = "Vec::is_empty")]
    pub languages: Vec<Language>,
    #[serde(default, deserialize_with = "de::list", skip_serializing_if = "Vec::is_empty")]
    pub recommendations: Vec<String>,
    #[serde(default, deserialize_with = "de::list", skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
    /// ATS compatibility as estimated by the service (detailed analysis only).
    #[serde(
        default,
        deserialize_with = "de::opt_percent",
        skip_serializing_if = "Option::is_none"
    )]
    pub ats_score: Option<u8>,
}

impl ResumeAnalysis {
    /// Candidate name, if the service found one.
    pub fn candidate_name(&self) -> Option<&str> {
        self.contact_info
            .as_ref()
            .and_then(|c| c.name.as_deref())
            .filter(|n| !n.trim().is_empty())
    }

    /// Skill names with both skill shapes normalised to a bare name.
    pub fn skill_names(&self) -> impl Iterator<Item = &str> {
        self.skills.iter().map(Skill::name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContactInfo {
    #[serde(default, deserialize_with = "de::opt_text", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "de::opt_text", skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "de::opt_text", skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "de::opt_text", skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
    #[serde(default, deserialize_with = "de::opt_text", skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "de::opt_text", skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkExperience {
    #[serde(default, deserialize_with = "de::opt_text", skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "de::opt_text", skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, deserialize_with = "de::opt_text", skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(default, deserialize_with = "de::opt_text", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "de::list", skip_serializing_if = "Vec::is_empty")]
    pub achievements: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Education {
    #[serde(default, deserialize_with = "de::opt_text", skip_serializing_if = "Option::is_none")]
    pub degree: Option<String>,
    #[serde(default, deserialize_with = "de::opt_text", skip_serializing_if = "Option::is_none")]
    pub institution: Option<String>,
    #[serde(default, deserialize_with = "de::opt_text", skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    #[serde(default, deserialize_with = "de::opt_text", skip_serializing_if = "Option::is_none")]
    pub gpa: Option<String>,
    #[serde(default, deserialize_with = "de::opt_text", skip_serializing_if = "Option::is_none")]
    pub honors: Option<String>,
}

/// A skill arrives either as a bare name (basic analysis) or as a record with
/// category and proficiency (detailed analysis). Both shapes coexist in the
/// store; use [`Skill::name`] wherever only the name matters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Skill {
    Name(String),
    Detailed(DetailedSkill),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailedSkill {
    #[serde(deserialize_with = "de::text")]
    pub name: String,
    #[serde(default, deserialize_with = "de::opt_text", skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "de::opt_percent", skip_serializing_if = "Option::is_none")]
    pub proficiency: Option<u8>,
}

impl Skill {
    pub fn name(&self) -> &str {
        match self {
            Skill::Name(name) => name,
            Skill::Detailed(detailed) => &detailed.name,
        }
    }

    pub fn proficiency(&self) -> Option<u8> {
        match self {
            Skill::Name(_) => None,
            Skill::Detailed(detailed) => detailed.proficiency,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Certification {
    Name(String),
    Detailed(DetailedCertification),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailedCertification {
    #[serde(deserialize_with = "de::text")]
    pub name: String,
    #[serde(default, deserialize_with = "de::opt_text", skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,
    #[serde(default, deserialize_with = "de::opt_text", skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
}

impl Certification {
    pub fn name(&self) -> &str {
        match self {
            Certification::Name(name) => name,
            Certification::Detailed(detailed) => &detailed.name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Project {
    Name(String),
    Detailed(DetailedProject),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailedProject {
    #[serde(deserialize_with = "de::text")]
    pub name: String,
    #[serde(default, deserialize_with = "de::opt_text", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "de::list", skip_serializing_if = "Vec::is_empty")]
    pub technologies: Vec<String>,
    #[serde(default, deserialize_with = "de::opt_text", skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl Project {
    pub fn name(&self) -> &str {
        match self {
            Project::Name(name) => name,
            Project::Detailed(detailed) => &detailed.name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Language {
    Name(String),
    Detailed(DetailedLanguage),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailedLanguage {
    #[serde(deserialize_with = "de::text")]
    pub language: String,
    #[serde(default, deserialize_with = "de::opt_text", skip_serializing_if = "Option::is_none")]
    pub proficiency: Option<String>,
}

impl Language {
    pub fn name(&self) -> &str {
        match self {
            Language::Name(name) => name,
            Language::Detailed(detailed) => &detailed.language,
        }
    }
}

/// One stored analysis. `id` and `analyzed_at` are assigned by the store and
/// never change; `score` is always the locally computed value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeRecord {
    pub id: Uuid,
    pub analyzed_at: DateTime<Utc>,
    pub score: u8,
    #[serde(flatten)]
    pub analysis: ResumeAnalysis,
}

/// Partial update merged into a stored record. Absent fields are left alone;
/// an explicit `null` clears an optional field or empties a list.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RecordPatch {
    #[serde(deserialize_with = "de::patch_record")]
    pub contact_info: Option<Option<ContactInfo>>,
    #[serde(deserialize_with = "de::patch_text")]
    pub summary: Option<Option<String>>,
    #[serde(deserialize_with = "de::patch_list")]
    pub work_experience: Option<Vec<WorkExperience>>,
    #[serde(deserialize_with = "de::patch_list")]
    pub education: Option<Vec<Education>>,
    #[serde(deserialize_with = "de::patch_list")]
    pub skills: Option<Vec<Skill>>,
    #[serde(deserialize_with = "de::patch_list")]
    pub certifications: Option<Vec<Certification>>,
    #[serde(deserialize_with = "de::patch_list")]
    pub projects: Option<Vec<Project>>,
    #[serde(deserialize_with = "de::patch_list")]
    pub languages: Option<Vec<Language>>,
    #[serde(deserialize_with = "de::patch_list")]
    pub recommendations: Option<Vec<String>>,
    #[serde(deserialize_with = "de::patch_list")]
    pub keywords: Option<Vec<String>>,
    #[serde(deserialize_with = "de::patch_percent")]
    pub ats_score: Option<Option<u8>>,
}

impl RecordPatch {
    pub fn apply_to(self, analysis: &mut ResumeAnalysis) {
        if let Some(v) = self.contact_info {
            analysis.contact_info = v;
        }
        if let Some(v) = self.summary {
            analysis.summary = v;
        }
        if let Some(v) = self.work_experience {
            analysis.work_experience = v;
        }
        if let Some(v) = self.education {
            analysis.education = v;
        }
        if let Some(v) = self.skills {
            analysis.skills = v;
        }
        if let Some(v) = self.certifications {
            analysis.certifications = v;
        }
        if let Some(v) = self.projects {
            analysis.projects = v;
        }
        if let Some(v) = self.languages {
            analysis.languages = v;
        }
        if let Some(v) = self.recommendations {
            analysis.recommendations = v;
        }
        if let Some(v) = self.keywords {
            analysis.keywords = v;
        }
        if let Some(v) = self.ats_score {
            analysis.ats_score = v.map(|score| score.min(100));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_both_skill_shapes_decode() {
        let analysis: ResumeAnalysis = serde_json::from_str(
            r#"{"skills": ["Go", {"name": "Rust", "category": "Languages", "proficiency": 90}]}"#,
        )
        .unwrap();
        assert_eq!(analysis.skills.len(), 2);
        assert_eq!(analysis.skill_names().collect::<Vec<_>>(), vec!["Go", "Rust"]);
        assert_eq!(analysis.skills[1].proficiency(), Some(90));
    }

    #[test]
    fn test_empty_object_is_empty_analysis() {
        let analysis: ResumeAnalysis = serde_json::from_str("{}").unwrap();
        assert_eq!(analysis, ResumeAnalysis::default());
        assert_eq!(analysis.candidate_name(), None);
    }

    #[test]
    fn test_contact_info_of_wrong_type_is_dropped() {
        let analysis: ResumeAnalysis =
            serde_json::from_str(r#"{"contactInfo": "Jane Doe", "summary": "x"}"#).unwrap();
        assert!(analysis.contact_info.is_none());
        assert_eq!(analysis.summary.as_deref(), Some("x"));
    }

    #[test]
    fn test_nulls_decode_as_absent() {
        let analysis: ResumeAnalysis = serde_json::from_str(
            r#"{"contactInfo": null, "summary": null, "skills": null, "atsScore": null}"#,
        )
        .unwrap();
        assert_eq!(analysis, ResumeAnalysis::default());
    }

    #[test]
    fn test_record_flattens_analysis() {
        let record = ResumeRecord {
            id: Uuid::new_v4(),
            analyzed_at: Utc::now(),
            score: 42,
            analysis: ResumeAnalysis {
                summary: Some("Backend engineer".to_string()),
                ..Default::default()
            },
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["summary"], "Backend engineer");
        assert_eq!(json["score"], 42);
        assert!(json.get("analysis").is_none());

        let back: ResumeRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_patch_only_touches_given_fields() {
        let mut analysis = ResumeAnalysis {
            summary: Some("old".to_string()),
            keywords: vec!["kept".to_string()],
            ..Default::default()
        };
        let patch: RecordPatch =
            serde_json::from_str(r#"{"summary": "new", "atsScore": 77}"#).unwrap();
        patch.apply_to(&mut analysis);
        assert_eq!(analysis.summary.as_deref(), Some("new"));
        assert_eq!(analysis.keywords, vec!["kept"]);
        assert_eq!(analysis.ats_score, Some(77));
    }

    #[test]
    fn test_patch_decodes_like_service_output() {
        let mut analysis = ResumeAnalysis::default();
        let patch: RecordPatch = serde_json::from_str(
            r#"{"atsScore": "85%", "skills": ["Go", 7], "summary": 42}"#,
        )
        .unwrap();
        patch.apply_to(&mut analysis);
        assert_eq!(analysis.ats_score, Some(85));
        assert_eq!(analysis.skill_names().collect::<Vec<_>>(), vec!["Go"]);
        assert_eq!(analysis.summary.as_deref(), Some("42"));

        let patch: RecordPatch = serde_json::from_str(r#"{"atsScore": 150}"#).unwrap();
        patch.apply_to(&mut analysis);
        assert_eq!(analysis.ats_score, Some(100));
    }

    #[test]
    fn test_patch_null_clears_field() {
        let mut analysis = ResumeAnalysis {
            contact_info: Some(ContactInfo::default()),
            summary: Some("old".to_string()),
            keywords: vec!["k".to_string()],
            ats_score: Some(60),
            ..Default::default()
        };
        let patch: RecordPatch = serde_json::from_str(
            r#"{"contactInfo": null, "summary": null, "keywords": null, "atsScore": null}"#,
        )
        .unwrap();
        patch.apply_to(&mut analysis);
        assert_eq!(analysis, ResumeAnalysis::default());
    }
}
