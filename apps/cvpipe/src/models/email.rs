//! Generated outreach email records and the email-run report shape.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::role::RoleDefinition;
use crate::scoring::MatchScore;
use crate::usage::UsageStats;

/// One personalized email as returned by the model, with the match
/// score attached after generation. The first four fields are the
/// strict JSON contract of the email prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailContent {
    pub subject_line: String,
    pub email_body: String,
    pub personalization_points: Vec<String>,
    pub highlight_skills: Vec<String>,

    /// "NN.N%", attached by the decision gate.
    #[serde(default)]
    pub match_score: Option<String>,
    #[serde(default)]
    pub match_details: Option<MatchScore>,
}

/// Per-candidate entry in the email-run output file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedEmail {
    pub candidate_name: String,
    pub email_data: EmailContent,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailRunStatistics {
    pub total_processed: usize,
    pub successful: usize,
    pub failed: usize,
    pub success_rate: f64,
    pub processing_time: String,
    pub processing_time_seconds: f64,
    pub api_usage: UsageStats,
}

/// Top-level shape of `generated_emails_<timestamp>.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailRunReport {
    pub emails: Vec<GeneratedEmail>,
    pub statistics: EmailRunStatistics,
    pub role_data: RoleDefinition,
    pub timestamp: DateTime<Utc>,
}
