//! Match Scoring — weighted multi-factor compatibility between one
//! extracted candidate and one role definition.
//!
//! Pure functions, no I/O, no LLM call: the same (candidate, role)
//! pair always produces the same score. Weights: required skills 40%,
//! nice-to-have 10%, experience 30%, background 20%.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::models::candidate::CandidateRecord;
use crate::models::role::RoleDefinition;

// ────────────────────────────────────────────────────────────────────────────
// Output data model
// ────────────────────────────────────────────────────────────────────────────

/// Sub-scores behind a total, each in [0, 100] rounded to one decimal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub required_skills: f64,
    pub nice_to_have: f64,
    pub experience: f64,
    pub background: f64,
}

/// Full match result for one (candidate, role) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchScore {
    pub total_score: f64,
    /// `None` when scoring failed soft on malformed candidate data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breakdown: Option<ScoreBreakdown>,
    pub matching_skills: Vec<String>,
    pub bonus_skills: Vec<String>,
}

impl MatchScore {
    /// The soft-failure score: zero total, empty breakdown. Returned
    /// instead of an error so one malformed candidate cannot halt a
    /// batch of email generations.
    pub fn zero() -> Self {
        Self {
            total_score: 0.0,
            breakdown: None,
            matching_skills: vec![],
            bonus_skills: vec![],
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Scoring entry point
// ────────────────────────────────────────────────────────────────────────────

/// Computes the weighted match score.
///
/// Skill comparison is case-insensitive and set-based; the candidate
/// skill set is the union of technical and soft skills. Fails soft to
/// `MatchScore::zero()` when the candidate's experience field is
/// present but not numeric.
pub fn score(candidate: &CandidateRecord, role: &RoleDefinition) -> MatchScore {
    let candidate_years = match candidate.years_of_experience() {
        Some(years) => years,
        None => {
            warn!(
                "Malformed years-of-experience for candidate '{}', scoring as zero",
                candidate.full_name
            );
            return MatchScore::zero();
        }
    };

    let required = lowered_set(role.must_have());
    let nice = lowered_set(role.nice_to_have());
    let candidate_skills: BTreeSet<String> = candidate
        .technical_skills()
        .iter()
        .chain(candidate.soft_skills())
        .map(|s| s.to_lowercase())
        .collect();

    let required_match = skills_match(&required, &candidate_skills);
    let nice_match = skills_match(&nice, &candidate_skills);
    let required_years = parse_experience_requirement(role.experience_level());
    let experience_score = experience_relevance(candidate_years, required_years);
    let background_score = background_relevance(candidate, role);

    let total = required_match * 0.4
        + nice_match * 0.1
        + experience_score * 0.3
        + background_score * 0.2;
    let total = total.clamp(0.0, 100.0);

    MatchScore {
        total_score: round1(total),
        breakdown: Some(ScoreBreakdown {
            required_skills: round1(required_match),
            nice_to_have: round1(nice_match),
            experience: round1(experience_score),
            background: round1(background_score),
        }),
        matching_skills: required.intersection(&candidate_skills).cloned().collect(),
        bonus_skills: nice.intersection(&candidate_skills).cloned().collect(),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Sub-score functions
// ────────────────────────────────────────────────────────────────────────────

/// Percentage of `required` covered by `candidate`; an empty
/// requirement set is vacuously satisfied.
fn skills_match(required: &BTreeSet<String>, candidate: &BTreeSet<String>) -> f64 {
    if required.is_empty() {
        return 100.0;
    }
    let matches = required.intersection(candidate).count();
    matches as f64 / required.len() as f64 * 100.0
}

/// Experience score: 80 at the requirement floor with a +5/year bonus
/// above it (capped at 100), linear ramp up to 80 below it, and 100
/// when the role states no requirement.
fn experience_relevance(candidate_years: f64, required_years: f64) -> f64 {
    if required_years <= 0.0 {
        return 100.0;
    }
    if candidate_years >= required_years {
        (80.0 + (candidate_years - required_years) * 5.0).min(100.0)
    } else {
        candidate_years / required_years * 80.0
    }
}

/// Minimum-years number from an experience requirement expression:
/// "3-5 years" → 3, "7 years" → 7, anything else → 0.
fn parse_experience_requirement(requirement: &str) -> f64 {
    let requirement = requirement.trim();
    if let Some((low, _)) = requirement.split_once('-') {
        return low
            .chars()
            .filter(|c| c.is_ascii_digit() || *c == '.')
            .collect::<String>()
            .parse()
            .unwrap_or(0.0);
    }
    if requirement.to_lowercase().contains("year") {
        return requirement
            .chars()
            .filter(|c| c.is_ascii_digit())
            .collect::<String>()
            .parse()
            .unwrap_or(0.0);
    }
    0.0
}

/// Background relevance: +60 when any word of the role title appears in
/// the candidate's current title, +40 when the role's industry appears
/// in any work-history company industry. Capped at 100.
fn background_relevance(candidate: &CandidateRecord, role: &RoleDefinition) -> f64 {
    let current_title = candidate.professional_title.to_lowercase();
    let target_title = role.title.to_lowercase();

    let mut score: f64 = 0.0;

    if target_title
        .split_whitespace()
        .any(|word| current_title.contains(word))
    {
        score += 60.0;
    }

    let industry = role
        .industry
        .as_deref()
        .unwrap_or("")
        .trim()
        .to_lowercase();
    if !industry.is_empty()
        && candidate.work_experience.iter().any(|exp| {
            exp.company_industry
                .as_deref()
                .map(|i| i.to_lowercase().contains(&industry))
                .unwrap_or(false)
        })
    {
        score += 40.0;
    }

    score.min(100.0)
}

fn lowered_set(skills: &[String]) -> BTreeSet<String> {
    skills.iter().map(|s| s.to_lowercase()).collect()
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
