//! Email Decision Gate — decides whether a candidate qualifies for
//! outreach and, if so, generates the personalized email.
//!
//! The gate is a pure pre-filter in front of the generation service:
//! validation failures and sub-threshold scores return `None` before
//! any remote call, so unqualified candidates cost nothing. Every
//! failure past that point is soft — one candidate's error never
//! aborts a batch of generations.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::{info, warn};

use crate::llm_client::prompts::EMAIL_PROMPT_TEMPLATE;
use crate::llm_client::{strip_json_fences, CompletionService};
use crate::models::candidate::CandidateRecord;
use crate::models::email::{EmailContent, EmailRunReport, EmailRunStatistics, GeneratedEmail};
use crate::models::role::RoleDefinition;
use crate::pipeline::orchestrator::format_processing_time;
use crate::scoring;
use crate::usage::UsageMeter;

/// Minimum total match score for outreach to be worth an API call.
const QUALIFICATION_THRESHOLD: f64 = 50.0;
/// Output cap for email replies.
const EMAIL_MAX_TOKENS: u32 = 1000;
/// Creative sampling for email copy, unlike the deterministic extraction.
const EMAIL_TEMPERATURE: f32 = 0.7;

pub struct EmailDecisionGate {
    service: Arc<dyn CompletionService>,
    threshold: f64,
}

impl EmailDecisionGate {
    pub fn new(service: Arc<dyn CompletionService>) -> Self {
        Self {
            service,
            threshold: QUALIFICATION_THRESHOLD,
        }
    }

    /// Scores the candidate against the role and generates an outreach
    /// email when the match clears the threshold. Returns `None` — at
    /// zero API cost — for invalid input or a sub-threshold score, and
    /// on any soft failure during generation.
    pub async fn decide_and_generate(
        &self,
        candidate: &CandidateRecord,
        role: &RoleDefinition,
        meter: &UsageMeter,
    ) -> Option<EmailContent> {
        if !validate_role(role) || !validate_candidate(candidate) {
            return None;
        }

        let match_result = scoring::score(candidate, role);
        if match_result.total_score < self.threshold {
            info!(
                "Score too low ({}%) for candidate: {}",
                match_result.total_score, candidate.full_name
            );
            return None;
        }

        let prompt = EMAIL_PROMPT_TEMPLATE
            .replace("{match_score}", &format!("{:.1}", match_result.total_score))
            .replace("{candidate_info}", &format_candidate_info(candidate))
            .replace("{role_info}", &format_role_info(role));

        let completion = match self
            .service
            .complete(&prompt, EMAIL_MAX_TOKENS, EMAIL_TEMPERATURE)
            .await
        {
            Ok(c) => c,
            Err(e) => {
                warn!("Error generating email for {}: {e}", candidate.full_name);
                return None;
            }
        };
        meter.update(completion.total_tokens);

        let mut email: EmailContent =
            match serde_json::from_str(strip_json_fences(&completion.text)) {
                Ok(email) => email,
                Err(e) => {
                    warn!("Unparseable email reply for {}: {e}", candidate.full_name);
                    return None;
                }
            };

        email.match_score = Some(format!("{:.1}%", match_result.total_score));
        email.match_details = Some(match_result);
        Some(email)
    }
}

/// The role must name a title, a company, and a requirements block.
fn validate_role(role: &RoleDefinition) -> bool {
    let valid = !role.title.trim().is_empty()
        && !role.company.trim().is_empty()
        && role.requirements.is_some();
    if !valid {
        warn!("Role definition is missing title, company, or requirements");
    }
    valid
}

/// The candidate must have a name, a title, work history, and skills.
fn validate_candidate(candidate: &CandidateRecord) -> bool {
    !candidate.full_name.trim().is_empty()
        && !candidate.professional_title.trim().is_empty()
        && !candidate.work_experience.is_empty()
        && candidate
            .skills
            .as_ref()
            .map(|s| !s.technical.is_empty() || !s.soft.is_empty())
            .unwrap_or(false)
}

/// Builds the candidate summary injected into the email prompt:
/// identity, current position, most notable achievement, tenure, top
/// degree, and a capped skill list (4 technical + 3 soft).
fn format_candidate_info(candidate: &CandidateRecord) -> String {
    let mut lines = vec![
        format!("Name: {}", candidate.full_name),
        format!("Current Role: {}", candidate.professional_title),
    ];

    if let Some(current) = candidate.work_experience.first() {
        lines.push(format!(
            "- Current: {} ({})",
            current.company.as_deref().unwrap_or("N/A"),
            current.title.as_deref().unwrap_or("N/A")
        ));
        if let Some(achievement) = current.achievements.first() {
            lines.push(format!("- Notable Achievement: {achievement}"));
        }
    }

    if let Some(years) = candidate.years_of_experience() {
        if years > 0.0 {
            lines.push(format!("- Total Experience: {years} years"));
        }
    }

    if let Some(latest) = candidate.education.first() {
        let mut parts: Vec<String> = Vec::new();
        if let Some(degree) = &latest.degree {
            parts.push(degree.clone());
        }
        if let Some(field) = &latest.field_of_study {
            parts.push(format!("in {field}"));
        }
        if let Some(institution) = &latest.institution {
            parts.push(format!("from {institution}"));
        }
        if !parts.is_empty() {
            lines.push(format!("Education: {}", parts.join(" ")));
        }
    }

    let technical = candidate.technical_skills();
    if !technical.is_empty() {
        let top: Vec<&str> = technical.iter().take(4).map(String::as_str).collect();
        lines.push(format!("Technical Skills: {}", top.join(", ")));
    }
    let soft = candidate.soft_skills();
    if !soft.is_empty() {
        let top: Vec<&str> = soft.iter().take(3).map(String::as_str).collect();
        lines.push(format!("Soft Skills: {}", top.join(", ")));
    }

    lines.join("\n")
}

fn format_role_info(role: &RoleDefinition) -> String {
    let join_or = |skills: &[String], fallback: &str| {
        if skills.is_empty() {
            fallback.to_string()
        } else {
            skills.join(", ")
        }
    };
    let or_unspecified = |value: Option<&str>| match value {
        Some(v) if !v.trim().is_empty() => v.to_string(),
        _ => "Not specified".to_string(),
    };

    format!(
        "Title: {}\n\
         Company: {}\n\
         Required Skills: {}\n\
         Nice-to-have Skills: {}\n\
         Experience Level: {}\n\
         Work Style: {}\n\
         Team Size: {}\n\
         Industry: {}\n\
         Company Culture: {}",
        role.title,
        role.company,
        join_or(role.must_have(), "None specified"),
        join_or(role.nice_to_have(), "None specified"),
        or_unspecified(Some(role.experience_level())),
        or_unspecified(role.remote_policy.as_deref()),
        or_unspecified(role.team_size.as_deref()),
        or_unspecified(role.industry.as_deref()),
        or_unspecified(role.culture.as_deref()),
    )
}

/// Runs the gate over every successful record in a parsed-resumes file
/// and writes the timestamped email report to `output_dir`.
///
/// Unreadable input and an unwritable output directory are fatal;
/// everything per-candidate is soft and lands in the statistics.
pub async fn process_batch(
    gate: &EmailDecisionGate,
    resumes_path: &Path,
    role: &RoleDefinition,
    output_dir: &Path,
) -> Result<PathBuf> {
    let raw = std::fs::read_to_string(resumes_path)
        .with_context(|| format!("Cannot read parsed resumes from {}", resumes_path.display()))?;
    let parsed: serde_json::Value = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not valid JSON", resumes_path.display()))?;
    let records = parsed["resumes"]
        .as_array()
        .context("Parsed resumes file has no 'resumes' array")?;

    info!("Starting to process {} CVs", records.len());
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("Cannot create output directory {}", output_dir.display()))?;

    let meter = UsageMeter::new();
    let started = Instant::now();
    let mut emails: Vec<GeneratedEmail> = Vec::new();
    let mut failed = 0usize;

    for record in records {
        if !record["_metadata"]["success"].as_bool().unwrap_or(false) {
            continue;
        }
        let candidate: CandidateRecord = match serde_json::from_value(record.clone()) {
            Ok(c) => c,
            Err(e) => {
                warn!("Skipping malformed candidate record: {e}");
                failed += 1;
                continue;
            }
        };

        match gate.decide_and_generate(&candidate, role, &meter).await {
            Some(email_data) => emails.push(GeneratedEmail {
                candidate_name: candidate.full_name.clone(),
                email_data,
                timestamp: Utc::now(),
            }),
            None => failed += 1,
        }
    }

    let elapsed = started.elapsed().as_secs_f64();
    let successful = emails.len();
    let total = records.len();
    let report = EmailRunReport {
        emails,
        statistics: EmailRunStatistics {
            total_processed: total,
            successful,
            failed,
            success_rate: if total > 0 {
                successful as f64 / total as f64 * 100.0
            } else {
                0.0
            },
            processing_time: format_processing_time(elapsed),
            processing_time_seconds: elapsed,
            api_usage: meter.get_stats(),
        },
        role_data: role.clone(),
        timestamp: Utc::now(),
    };

    let output_file = output_dir.join(format!(
        "generated_emails_{}.json",
        Utc::now().format("%Y%m%d_%H%M%S")
    ));
    std::fs::write(&output_file, serde_json::to_string_pretty(&report)?)?;

    info!(
        "Successfully generated {successful} emails out of {total} CVs, saved to {}",
        output_file.display()
    );
    Ok(output_file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::candidate::{ProfessionalSummary, Skills, WorkExperience};
    use crate::models::role::sample_role;
    use crate::pipeline::worker::test_support::ScriptedService;
    use serde_json::json;

    const EMAIL_REPLY: &str = r#"{
        "subject_line": "Exciting Senior Software Engineer opportunity at TechCorp😊",
        "email_body": "Hey Jane 👋\n\nI noticed your strong Python work at Acme Corp.\n\nBest regards,\nSam",
        "personalization_points": ["Strong platform background"],
        "highlight_skills": ["Python", "AWS"]
    }"#;

    fn strong_candidate() -> CandidateRecord {
        serde_json::from_str(crate::models::candidate::SAMPLE_CANDIDATE).unwrap()
    }

    fn weak_candidate() -> CandidateRecord {
        // Valid for the pre-filter but scores 20.0: half the required
        // skills, no experience, no title or industry overlap.
        CandidateRecord {
            full_name: "John Smith".to_string(),
            professional_title: "Data Analyst".to_string(),
            professional_summary: Some(ProfessionalSummary {
                years_of_experience: Some(json!(0)),
                ..Default::default()
            }),
            work_experience: vec![WorkExperience {
                title: Some("Data Analyst".to_string()),
                company: Some("RetailCo".to_string()),
                ..Default::default()
            }],
            skills: Some(Skills {
                technical: vec!["Python".to_string()],
                soft: vec![],
                languages: vec![],
            }),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_qualified_candidate_gets_email_with_score_attached() {
        let meter = UsageMeter::new();
        let gate = EmailDecisionGate::new(Arc::new(ScriptedService::ok(EMAIL_REPLY, 500)));

        let email = gate
            .decide_and_generate(&strong_candidate(), &sample_role(), &meter)
            .await
            .expect("strong candidate should qualify");

        assert!(email.subject_line.contains("TechCorp"));
        let score = email.match_score.as_deref().unwrap();
        assert!(score.ends_with('%'), "got {score}");
        assert!(email.match_details.unwrap().total_score >= 50.0);
        assert_eq!(meter.get_stats().total_api_calls, 1);
        assert_eq!(meter.get_stats().total_tokens, 500);
    }

    #[tokio::test]
    async fn test_sub_threshold_score_skips_generation_at_zero_cost() {
        let meter = UsageMeter::new();
        let service = ScriptedService::ok(EMAIL_REPLY, 500);
        let calls = Arc::clone(&service.calls);
        let gate = EmailDecisionGate::new(Arc::new(service));

        let email = gate
            .decide_and_generate(&weak_candidate(), &sample_role(), &meter)
            .await;

        assert!(email.is_none());
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 0);
        assert_eq!(meter.get_stats().total_api_calls, 0);
        assert_eq!(meter.get_stats().total_tokens, 0);
    }

    #[tokio::test]
    async fn test_role_without_requirements_is_rejected_before_scoring() {
        let meter = UsageMeter::new();
        let service = ScriptedService::ok(EMAIL_REPLY, 500);
        let calls = Arc::clone(&service.calls);
        let gate = EmailDecisionGate::new(Arc::new(service));

        let mut role = sample_role();
        role.requirements = None;
        let email = gate
            .decide_and_generate(&strong_candidate(), &role, &meter)
            .await;

        assert!(email.is_none());
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_candidate_without_work_history_is_rejected() {
        let meter = UsageMeter::new();
        let gate = EmailDecisionGate::new(Arc::new(ScriptedService::ok(EMAIL_REPLY, 500)));

        let mut candidate = strong_candidate();
        candidate.work_experience.clear();
        let email = gate
            .decide_and_generate(&candidate, &sample_role(), &meter)
            .await;

        assert!(email.is_none());
        assert_eq!(meter.get_stats().total_api_calls, 0);
    }

    #[tokio::test]
    async fn test_service_error_fails_soft() {
        let meter = UsageMeter::new();
        let gate = EmailDecisionGate::new(Arc::new(ScriptedService::failing(|| {
            crate::llm_client::LlmError::EmptyContent
        })));

        let email = gate
            .decide_and_generate(&strong_candidate(), &sample_role(), &meter)
            .await;
        assert!(email.is_none());
    }

    #[tokio::test]
    async fn test_unparseable_reply_fails_soft_but_bills_tokens() {
        let meter = UsageMeter::new();
        let gate = EmailDecisionGate::new(Arc::new(ScriptedService::ok("not json", 400)));

        let email = gate
            .decide_and_generate(&strong_candidate(), &sample_role(), &meter)
            .await;
        assert!(email.is_none());
        // The call happened, so its tokens are accounted
        assert_eq!(meter.get_stats().total_tokens, 400);
    }

    #[test]
    fn test_candidate_info_caps_skill_lists() {
        let info = format_candidate_info(&strong_candidate());
        assert!(info.contains("Name: Jane Doe"));
        assert!(info.contains("- Current: Acme Corp (Senior Software Engineer)"));
        assert!(info.contains("- Notable Achievement: Cut p99 latency by 40%"));
        assert!(info.contains("- Total Experience: 7 years"));
        assert!(info.contains("Education: MSc in Computer Science from TU Berlin"));
        // Sample has exactly 4 technical skills; all fit under the cap
        assert!(info.contains("Technical Skills: Python, AWS, Docker, Kubernetes"));
        assert!(info.contains("Soft Skills: Communication, Mentoring"));
    }

    #[test]
    fn test_role_info_falls_back_to_not_specified() {
        let role = RoleDefinition {
            title: "Engineer".to_string(),
            company: "X".to_string(),
            ..Default::default()
        };
        let info = format_role_info(&role);
        assert!(info.contains("Required Skills: None specified"));
        assert!(info.contains("Work Style: Not specified"));
        assert!(info.contains("Industry: Not specified"));
    }

    #[tokio::test]
    async fn test_process_batch_writes_report() {
        let dir = tempfile::tempdir().unwrap();
        let resumes_path = dir.path().join("parsed_resumes.json");

        // Two successful records (one strong, one weak) and one failure
        let strong: serde_json::Value =
            serde_json::from_str(crate::models::candidate::SAMPLE_CANDIDATE).unwrap();
        let mut strong = strong;
        strong["_metadata"] = json!({"filename": "jane.txt", "file_type": ".txt", "success": true});
        let mut weak = serde_json::to_value(weak_candidate()).unwrap();
        weak["_metadata"] = json!({"filename": "john.pdf", "file_type": ".pdf", "success": true});
        let failed = json!({"_metadata": {"filename": "bad.pdf", "file_type": ".pdf", "success": false, "error": "boom"}});
        std::fs::write(
            &resumes_path,
            serde_json::to_string(&json!({"resumes": [strong, weak, failed]})).unwrap(),
        )
        .unwrap();

        let gate = EmailDecisionGate::new(Arc::new(ScriptedService::ok(EMAIL_REPLY, 500)));
        let out_dir = dir.path().join("emails");
        let output = process_batch(&gate, &resumes_path, &sample_role(), &out_dir)
            .await
            .unwrap();

        let report: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(report["emails"].as_array().unwrap().len(), 1);
        assert_eq!(report["emails"][0]["candidate_name"], "Jane Doe");
        assert_eq!(report["statistics"]["total_processed"], 3);
        assert_eq!(report["statistics"]["successful"], 1);
        assert_eq!(report["statistics"]["failed"], 1);
        assert_eq!(report["role_data"]["company"], "TechCorp");
    }
}
