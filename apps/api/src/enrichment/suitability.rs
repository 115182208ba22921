//! The `scoreSuitability` tool offered to the chat model.
//!
//! Scoring runs locally against the `SkillProfile`; the model only chooses
//! which skills to ask about and explains the result.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::content::skills::SkillProfile;
use crate::llm_client::{FunctionCallingConfig, FunctionDeclaration, Tool, ToolConfig};

pub const SCORE_SUITABILITY_TOOL: &str = "scoreSuitability";

/// Whole words that force the tool call.
const SUITABILITY_WORDS: &[&str] = &[
    "suitable",
    "suitability",
    "suited",
    "qualified",
    "qualifications",
    "hire",
    "hiring",
    "role",
    "roles",
    "job",
    "jobs",
    "position",
    "positions",
    "candidate",
    "match",
    "matches",
    "requirements",
];

/// Adjacent word pairs that force the tool call.
const SUITABILITY_PHRASES: &[[&str; 2]] = &[
    ["good", "fit"],
    ["fit", "for"],
    ["skills", "for"],
    ["skills", "match"],
    ["experience", "with"],
];

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuitabilityArgs {
    #[serde(default)]
    pub required_skills: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuitabilityReport {
    /// 0-100
    pub score: u32,
    pub matched_skills: Vec<String>,
    pub missing_skills: Vec<String>,
    pub comment: String,
}

/// Average proficiency over the required skills, missing skills counting 0.
pub fn score_suitability(profile: &SkillProfile, required: &[String]) -> SuitabilityReport {
    let required: Vec<&str> = required
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect();

    if required.is_empty() {
        return SuitabilityReport {
            score: 0,
            matched_skills: vec![],
            missing_skills: vec![],
            comment: "No required skills were given.".to_string(),
        };
    }

    let mut total = 0u32;
    let mut matched_skills = Vec::new();
    let mut missing_skills = Vec::new();
    for skill in &required {
        match profile.proficiency(skill) {
            Some(p) => {
                total += u32::from(p);
                matched_skills.push(skill.to_string());
            }
            None => missing_skills.push(skill.to_string()),
        }
    }

    let max = 100.0 * required.len() as f64;
    let score = (f64::from(total) / max * 100.0).round() as u32;

    let comment = match score {
        80.. => "Strong match for the required skills.",
        50..=79 => "Solid partial match; some skills would need ramp-up.",
        _ => "Limited overlap with the required skills.",
    }
    .to_string();

    SuitabilityReport {
        score,
        matched_skills,
        missing_skills,
        comment,
    }
}

pub fn concerns_suitability(question: &str) -> bool {
    let lowered = question.to_lowercase();
    let words: Vec<&str> = lowered
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();

    words.iter().any(|w| SUITABILITY_WORDS.contains(w))
        || words
            .windows(2)
            .any(|pair| SUITABILITY_PHRASES.iter().any(|p| p[..] == *pair))
}

pub fn tool() -> Tool {
    Tool {
        function_declarations: vec![FunctionDeclaration {
            name: SCORE_SUITABILITY_TOOL.to_string(),
            description: "Scores how well the portfolio owner's skills match a list of \
                          required skills. Returns a 0-100 score with matched and missing skills."
                .to_string(),
            parameters: json!({
                "type": "OBJECT",
                "properties": {
                    "requiredSkills": {
                        "type": "ARRAY",
                        "items": {"type": "STRING"},
                        "description": "Skills the role or project requires"
                    }
                },
                "required": ["requiredSkills"]
            }),
        }],
    }
}

/// `mode` is AUTO, ANY or NONE. ANY restricts the call to this tool.
pub fn tool_config(mode: &str) -> ToolConfig {
    let allowed_function_names = if mode == "ANY" {
        vec![SCORE_SUITABILITY_TOOL.to_string()]
    } else {
        vec![]
    };
    ToolConfig {
        function_calling_config: FunctionCallingConfig {
            mode: mode.to_string(),
            allowed_function_names,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn skills(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_score_python_sql_rust() {
        let report =
            score_suitability(&SkillProfile::default(), &skills(&["Python", "SQL", "Rust"]));
        // (90 + 95 + 0) / 300
        assert_eq!(report.score, 62);
        assert_eq!(report.matched_skills, vec!["Python", "SQL"]);
        assert_eq!(report.missing_skills, vec!["Rust"]);
    }

    #[test]
    fn test_score_preserves_caller_spelling() {
        let report = score_suitability(&SkillProfile::default(), &skills(&["python"]));
        assert_eq!(report.score, 90);
        assert_eq!(report.matched_skills, vec!["python"]);
    }

    #[test]
    fn test_empty_requirements_score_zero() {
        let report = score_suitability(&SkillProfile::default(), &[]);
        assert_eq!(report.score, 0);
        assert!(report.matched_skills.is_empty());
    }

    #[test]
    fn test_keyword_detection() {
        assert!(concerns_suitability("Would they be a good fit for a data platform role?"));
        assert!(!concerns_suitability("What is your favourite database?"));
    }

    #[test]
    fn test_skill_match_questions_force_the_tool() {
        assert!(concerns_suitability("How well do your skills match Python, SQL and Rust?"));
        assert!(concerns_suitability("Do you have the skills for a Rust backend team?"));
        assert!(concerns_suitability("What experience with Airflow do you have?"));
        assert!(concerns_suitability("Do you meet these requirements: Spark, dbt?"));
    }

    #[test]
    fn test_keywords_match_whole_words_only() {
        assert!(!concerns_suitability("Tell me about the composition of your dbt project"));
        assert!(!concerns_suitability("How did you control the rollout?"));
        assert!(!concerns_suitability("Which skills do you enjoy most?"));
    }

    #[test]
    fn test_forced_tool_config() {
        let value = serde_json::to_value(tool_config("ANY")).unwrap();
        assert_eq!(value["functionCallingConfig"]["mode"], "ANY");
        assert_eq!(
            value["functionCallingConfig"]["allowedFunctionNames"][0],
            SCORE_SUITABILITY_TOOL
        );
        let auto = serde_json::to_value(tool_config("AUTO")).unwrap();
        assert!(auto["functionCallingConfig"].get("allowedFunctionNames").is_none());
    }
}
