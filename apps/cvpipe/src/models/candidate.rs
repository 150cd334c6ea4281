//! Candidate record — the typed shape of one extracted resume.
//!
//! The wire format uses the Title Case keys the extraction prompt asks
//! for ("Full Name", "Work Experience", ...). Every nested field is
//! optional or defaulted: the model reply is parsed, not trusted. A
//! reply that is not a JSON object matching the top-level shape fails
//! the extraction attempt; missing inner detail does not.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CandidateRecord {
    /// Assigned locally, never supplied by the model.
    #[serde(skip_deserializing, default = "Uuid::new_v4")]
    pub id: Uuid,

    #[serde(rename = "Full Name")]
    pub full_name: String,

    #[serde(rename = "Professional Title")]
    pub professional_title: String,

    #[serde(rename = "Contact Information")]
    pub contact_info: Option<ContactInfo>,

    #[serde(rename = "Professional Summary")]
    pub professional_summary: Option<ProfessionalSummary>,

    #[serde(rename = "Work Experience")]
    pub work_experience: Vec<WorkExperience>,

    #[serde(rename = "Education")]
    pub education: Vec<Education>,

    #[serde(rename = "Skills")]
    pub skills: Option<Skills>,

    #[serde(rename = "Certifications")]
    pub certifications: Vec<Certification>,

    #[serde(rename = "HR Evaluation")]
    pub hr_evaluation: Option<HrEvaluation>,
}

impl CandidateRecord {
    /// Total years of experience from the professional summary.
    ///
    /// `Some(0.0)` when the field is absent, `None` when it is present
    /// but not numeric (the scorer treats that as malformed input and
    /// fails soft).
    pub fn years_of_experience(&self) -> Option<f64> {
        let raw = match self
            .professional_summary
            .as_ref()
            .and_then(|s| s.years_of_experience.as_ref())
        {
            None => return Some(0.0),
            Some(v) => v,
        };
        match raw {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
    }

    pub fn technical_skills(&self) -> &[String] {
        self.skills.as_ref().map_or(&[], |s| &s.technical)
    }

    pub fn soft_skills(&self) -> &[String] {
        self.skills.as_ref().map_or(&[], |s| &s.soft)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ContactInfo {
    #[serde(rename = "Email")]
    pub email: Option<String>,
    #[serde(rename = "Phone")]
    pub phone: Option<String>,
    #[serde(rename = "LinkedIn")]
    pub linkedin: Option<String>,
    #[serde(rename = "Location")]
    pub location: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ProfessionalSummary {
    #[serde(rename = "Executive Summary")]
    pub executive_summary: Option<String>,
    /// Kept as raw JSON — models return this as a number or a string.
    #[serde(rename = "Years of Experience")]
    pub years_of_experience: Option<Value>,
    #[serde(rename = "Industry Focus")]
    pub industry_focus: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct WorkExperience {
    #[serde(rename = "Title")]
    pub title: Option<String>,
    #[serde(rename = "Company")]
    pub company: Option<String>,
    #[serde(rename = "Location")]
    pub location: Option<String>,
    #[serde(rename = "Period")]
    pub period: Option<Period>,
    #[serde(rename = "Achievements")]
    pub achievements: Vec<String>,
    #[serde(rename = "Technologies Used")]
    pub technologies_used: Vec<String>,
    #[serde(rename = "Company Industry")]
    pub company_industry: Option<String>,
    #[serde(rename = "Management Scope")]
    pub management_scope: Option<ManagementScope>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Period {
    #[serde(rename = "Start Date")]
    pub start_date: Option<String>,
    #[serde(rename = "End Date")]
    pub end_date: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ManagementScope {
    #[serde(rename = "Team Size")]
    pub team_size: Option<Value>,
    #[serde(rename = "Budget Responsibility")]
    pub budget_responsibility: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Education {
    #[serde(rename = "Degree")]
    pub degree: Option<String>,
    #[serde(rename = "Field of Study")]
    pub field_of_study: Option<String>,
    #[serde(rename = "Institution")]
    pub institution: Option<String>,
    #[serde(rename = "Location")]
    pub location: Option<String>,
    #[serde(rename = "Graduation Date")]
    pub graduation_date: Option<Value>,
    #[serde(rename = "GPA")]
    pub gpa: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Skills {
    #[serde(rename = "Technical Skills")]
    pub technical: Vec<String>,
    #[serde(rename = "Soft Skills")]
    pub soft: Vec<String>,
    #[serde(rename = "Languages")]
    pub languages: Vec<Language>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Language {
    #[serde(rename = "Language")]
    pub language: Option<String>,
    #[serde(rename = "Proficiency")]
    pub proficiency: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Certification {
    #[serde(rename = "Name")]
    pub name: Option<String>,
    #[serde(rename = "Issuer")]
    pub issuer: Option<String>,
    #[serde(rename = "Date")]
    pub date: Option<String>,
    #[serde(rename = "Expiry")]
    pub expiry: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct HrEvaluation {
    #[serde(rename = "Key Strengths")]
    pub key_strengths: Vec<String>,
    #[serde(rename = "Potential Roles")]
    pub potential_roles: Vec<String>,
    #[serde(rename = "Seniority Level")]
    pub seniority_level: Option<String>,
    #[serde(rename = "Cultural Indicators")]
    pub cultural_indicators: Vec<String>,
    #[serde(rename = "Development Areas")]
    pub development_areas: Vec<String>,
}

/// Shared test fixture: a complete extraction reply in the wire format.
#[cfg(test)]
pub(crate) const SAMPLE_CANDIDATE: &str = r#"{
        "Full Name": "Jane Doe",
        "Professional Title": "Senior Software Engineer",
        "Contact Information": {
            "Email": "jane@example.com",
            "Phone": "+1 555 0100",
            "LinkedIn": "linkedin.com/in/janedoe",
            "Location": "Berlin"
        },
        "Professional Summary": {
            "Executive Summary": "Backend engineer with a platform focus.",
            "Years of Experience": 7,
            "Industry Focus": ["FinTech", "Cloud"]
        },
        "Work Experience": [
            {
                "Title": "Senior Software Engineer",
                "Company": "Acme Corp",
                "Location": "Berlin",
                "Period": {"Start Date": "2020-03", "End Date": "Present"},
                "Achievements": ["Cut p99 latency by 40%"],
                "Technologies Used": ["Rust", "PostgreSQL"],
                "Company Industry": "FinTech",
                "Management Scope": {"Team Size": 4, "Budget Responsibility": null}
            }
        ],
        "Education": [
            {
                "Degree": "MSc",
                "Field of Study": "Computer Science",
                "Institution": "TU Berlin",
                "Graduation Date": "2016",
                "GPA": 3.8
            }
        ],
        "Skills": {
            "Technical Skills": ["Python", "AWS", "Docker", "Kubernetes"],
            "Soft Skills": ["Communication", "Mentoring"],
            "Languages": [{"Language": "English", "Proficiency": "Fluent"}]
        },
        "Certifications": [
            {"Name": "AWS SA", "Issuer": "Amazon", "Date": "2021-06", "Expiry": "2024-06"}
        ],
        "HR Evaluation": {
            "Key Strengths": ["Ownership"],
            "Potential Roles": ["Staff Engineer"],
            "Seniority Level": "Senior",
            "Cultural Indicators": ["Mentors juniors"],
            "Development Areas": ["Public speaking"]
        }
    }"#;
