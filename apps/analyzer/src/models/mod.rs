pub mod de;
pub mod resume;

pub use resume::{
    Certification, ContactInfo, DetailedCertification, DetailedLanguage, DetailedProject,
    DetailedSkill, Education, Language, Project, RecordPatch, ResumeAnalysis, ResumeRecord,
    Skill, WorkExperience,
};
