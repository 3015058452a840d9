//! Export formats. Pure transformations of a stored record; nothing here
//! touches the store.

use serde_json::{json, Value};

use crate::models::{Certification, Language, Project, ResumeRecord, Skill};
use crate::scoring::{compute_breakdown, generate_suggestions, ScoreBand};

/// The record as stored, plus the analysis date and improvement suggestions.
pub fn export_json(record: &ResumeRecord) -> Result<Value, serde_json::Error> {
    let mut value = serde_json::to_value(record)?;
    if let Some(obj) = value.as_object_mut() {
        obj.insert(
            "analysisDate".to_string(),
            json!(record.analyzed_at.format("%Y-%m-%d").to_string()),
        );
        obj.insert(
            "suggestions".to_string(),
            json!(generate_suggestions(&record.analysis, record.score)),
        );
    }
    Ok(value)
}

/// Renders the analysis as a markdown report.
pub fn render_markdown(record: &ResumeRecord) -> String {
    let analysis = &record.analysis;
    let mut md = String::from("# Resume Analysis Report\n\n");
    md.push_str(&format!(
        "- **Analyzed:** {}\n",
        record.analyzed_at.format("%Y-%m-%d %H:%M UTC")
    ));
    md.push_str(&format!(
        "- **Overall Score:** {}/100 ({})\n",
        record.score,
        ScoreBand::from_score(record.score).label()
    ));
    if let Some(ats) = analysis.ats_score {
        md.push_str(&format!("- **ATS Compatibility:** {ats}/100\n"));
    }
    md.push('\n');

    if let Some(contact) = &analysis.contact_info {
        md.push_str("## Contact Information\n\n");
        for (label, field) in [
            ("Name", &contact.name),
            ("Email", &contact.email),
            ("Phone", &contact.phone),
            ("LinkedIn", &contact.linkedin),
            ("Location", &contact.location),
            ("Website", &contact.website),
        ] {
            md.push_str(&format!("- **{label}:** {}\n", or_na(field.as_deref())));
        }
        md.push('\n');
    }

    if let Some(summary) = analysis.summary.as_deref().filter(|s| !s.trim().is_empty()) {
        md.push_str("## Professional Summary\n\n");
        md.push_str(summary.trim());
        md.push_str("\n\n");
    }

    let breakdown = compute_breakdown(analysis);
    md.push_str("## Score Breakdown\n\n");
    md.push_str(&format!("- Contact: {}/20\n", breakdown.contact));
    md.push_str(&format!("- Summary: {}/15\n", breakdown.summary));
    md.push_str(&format!("- Work Experience: {}/30\n", breakdown.work_experience));
    md.push_str(&format!("- Education: {}/15\n", breakdown.education));
    md.push_str(&format!("- Skills: {}/20\n\n", breakdown.skills));

    if !analysis.work_experience.is_empty() {
        md.push_str("## Work Experience\n\n");
        for job in &analysis.work_experience {
            md.push_str(&format!(
                "### {} at {}\n",
                or_na(job.title.as_deref()),
                or_na(job.company.as_deref())
            ));
            if let Some(duration) = &job.duration {
                md.push_str(&format!("*{duration}*\n\n"));
            }
            if let Some(description) = &job.description {
                md.push_str(&format!("{description}\n\n"));
            }
            for achievement in &job.achievements {
                md.push_str(&format!("- {achievement}\n"));
            }
            md.push('\n');
        }
    }

    if !analysis.education.is_empty() {
        md.push_str("## Education\n\n");
        for edu in &analysis.education {
            md.push_str(&format!(
                "- **{}**, {}",
                or_na(edu.degree.as_deref()),
                or_na(edu.institution.as_deref())
            ));
            if let Some(year) = &edu.year {
                md.push_str(&format!(" ({year})"));
            }
            if let Some(gpa) = &edu.gpa {
                md.push_str(&format!(" GPA {gpa}"));
            }
            if let Some(honors) = &edu.honors {
                md.push_str(&format!(" {honors}"));
            }
            md.push('\n');
        }
        md.push('\n');
    }

    if !analysis.skills.is_empty() {
        md.push_str("## Skills\n\n");
        let skills: Vec<String> = analysis.skills.iter().map(skill_label).collect();
        md.push_str(&skills.join(", "));
        md.push_str("\n\n");
    }

    push_list(
        &mut md,
        "Certifications",
        analysis.certifications.iter().map(certification_label),
    );
    push_list(&mut md, "Projects", analysis.projects.iter().map(project_label));
    push_list(&mut md, "Languages", analysis.languages.iter().map(language_label));
    push_list(&mut md, "Recommendations", analysis.recommendations.iter().cloned());
    push_list(
        &mut md,
        "Suggestions",
        generate_suggestions(analysis, record.score).into_iter(),
    );

    md
}

fn or_na(field: Option<&str>) -> &str {
    field.filter(|s| !s.trim().is_empty()).unwrap_or("N/A")
}

fn push_list(md: &mut String, title: &str, items: impl Iterator<Item = String>) {
    let items: Vec<String> = items.collect();
    if items.is_empty() {
        return;
    }
    md.push_str(&format!("## {title}\n\n"));
    for item in items {
        md.push_str(&format!("- {item}\n"));
    }
    md.push('\n');
}

fn skill_label(skill: &Skill) -> String {
    match skill.proficiency() {
        Some(p) => format!("{} ({p}%)", skill.name()),
        None => skill.name().to_string(),
    }
}

fn certification_label(cert: &Certification) -> String {
    match cert {
        Certification::Name(name) => name.clone(),
        Certification::Detailed(c) => {
            let mut label = c.name.clone();
            if let Some(issuer) = &c.issuer {
                label.push_str(&format!(" ({issuer})"));
            }
            if let Some(year) = &c.year {
                label.push_str(&format!(", {year}"));
            }
            label
        }
    }
}

fn project_label(project: &Project) -> String {
    match project {
        Project::Name(name) => name.clone(),
        Project::Detailed(p) => {
            let mut label = format!("**{}**", p.name);
            if let Some(description) = &p.description {
                label.push_str(&format!(": {description}"));
            }
            if !p.technologies.is_empty() {
                label.push_str(&format!(" [{}]", p.technologies.join(", ")));
            }
            label
        }
    }
}

fn language_label(language: &Language) -> String {
    match language {
        Language::Name(name) => name.clone(),
        Language::Detailed(l) => match &l.proficiency {
            Some(level) => format!("{} ({level})", l.language),
            None => l.language.clone(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ContactInfo, DetailedSkill, ResumeAnalysis, WorkExperience};
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn sample() -> ResumeRecord {
        ResumeRecord {
            id: Uuid::nil(),
            analyzed_at: Utc.with_ymd_and_hms(2024, 3, 9, 14, 30, 0).unwrap(),
            score: 37,
            analysis: ResumeAnalysis {
                contact_info: Some(ContactInfo {
                    name: Some("Sam Rivera".to_string()),
                    ..Default::default()
                }),
                work_experience: vec![WorkExperience {
                    title: Some("Data Engineer".to_string()),
                    company: Some("Acme".to_string()),
                    achievements: vec!["Cut ETL time by 40%".to_string()],
                    ..Default::default()
                }],
                skills: vec![Skill::Detailed(DetailedSkill {
                    name: "SQL".to_string(),
                    category: None,
                    proficiency: Some(85),
                })],
                ats_score: Some(72),
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_json_export_keeps_record_fields() {
        let json = export_json(&sample()).unwrap();
        assert_eq!(json["score"], 37);
        assert_eq!(json["atsScore"], 72);
        assert_eq!(json["analysisDate"], "2024-03-09");
        assert_eq!(json["contactInfo"]["name"], "Sam Rivera");
        assert!(json["suggestions"].as_array().unwrap().len() >= 3);
    }

    #[test]
    fn test_markdown_report_sections() {
        let md = render_markdown(&sample());
        assert!(md.starts_with("# Resume Analysis Report"));
        assert!(md.contains("- **Overall Score:** 37/100 (Needs Improvement)"));
        assert!(md.contains("- **ATS Compatibility:** 72/100"));
        assert!(md.contains("- **Email:** N/A"));
        assert!(md.contains("### Data Engineer at Acme"));
        assert!(md.contains("- Cut ETL time by 40%"));
        assert!(md.contains("SQL (85%)"));
        assert!(md.contains("## Suggestions"));
        assert!(!md.contains("## Education"));
    }
}
