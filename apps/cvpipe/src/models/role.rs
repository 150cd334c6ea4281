//! Role definition — the job a candidate pool is matched against.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// A role definition loaded from a JSON file. `title`, `company` and
/// `requirements` drive scoring and the email gate; the remaining
/// fields are display-only context for the email prompt.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RoleDefinition {
    pub title: String,
    pub company: String,
    pub requirements: Option<Requirements>,
    pub culture: Option<String>,
    pub team_size: Option<String>,
    pub remote_policy: Option<String>,
    pub industry: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Requirements {
    pub must_have: Vec<String>,
    pub nice_to_have: Vec<String>,
    pub experience_level: Option<String>,
}

impl RoleDefinition {
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot read role file {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Role file {} is not valid JSON", path.display()))
    }

    pub fn must_have(&self) -> &[String] {
        self.requirements.as_ref().map_or(&[], |r| &r.must_have)
    }

    pub fn nice_to_have(&self) -> &[String] {
        self.requirements.as_ref().map_or(&[], |r| &r.nice_to_have)
    }

    pub fn experience_level(&self) -> &str {
        self.requirements
            .as_ref()
            .and_then(|r| r.experience_level.as_deref())
            .unwrap_or("")
    }
}

#[cfg(test)]
pub(crate) fn sample_role() -> RoleDefinition {
    RoleDefinition {
        title: "Senior Software Engineer".to_string(),
        company: "TechCorp".to_string(),
        requirements: Some(Requirements {
            must_have: vec!["Python".to_string(), "AWS".to_string()],
            nice_to_have: vec!["Microservices".to_string(), "Docker".to_string()],
            experience_level: Some("3-5 years".to_string()),
        }),
        culture: Some("Fast-paced, innovative startup environment".to_string()),
        team_size: Some("10-15 people".to_string()),
        remote_policy: Some("Hybrid".to_string()),
        industry: Some("FinTech".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_json_roundtrip() {
        let json = r#"{
            "title": "Senior Software Engineer",
            "company": "TechCorp",
            "requirements": {
                "must_have": ["Python", "AWS"],
                "nice_to_have": ["Microservices", "Docker"],
                "experience_level": "3-5 years"
            },
            "culture": "Fast-paced, innovative startup environment",
            "team_size": "10-15 people",
            "remote_policy": "Hybrid",
            "industry": "FinTech"
        }"#;
        let role: RoleDefinition = serde_json::from_str(json).unwrap();
        assert_eq!(role.must_have(), ["Python", "AWS"]);
        assert_eq!(role.experience_level(), "3-5 years");
        assert_eq!(role.industry.as_deref(), Some("FinTech"));
    }

    #[test]
    fn test_missing_requirements_defaults_empty() {
        let role: RoleDefinition =
            serde_json::from_str(r#"{"title": "Engineer", "company": "X"}"#).unwrap();
        assert!(role.requirements.is_none());
        assert!(role.must_have().is_empty());
        assert_eq!(role.experience_level(), "");
    }
}
