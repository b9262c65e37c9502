//! Company suggestions from coursework, projects, and interests.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::career::prompts::SUGGEST_COMPANIES_PROMPT;
use crate::career::{outer_json_object, string_vec};
use crate::llm_client::{strip_json_fences, TextGenerator};

const SUGGEST_MAX_TOKENS: u32 = 1200;
const SUGGEST_TEMPERATURE: f32 = 0.6;
const MAX_COMPANIES: usize = 15;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanySuggestion {
    pub name: String,
    pub reason: String,
    pub roles: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompanySuggestions {
    pub profile_summary: String,
    pub companies: Vec<CompanySuggestion>,
    pub summary: String,
}

/// Suggests specific companies that fit the student's background. A
/// response that cannot be decoded degrades to the raw text as the
/// profile summary with an empty company list.
pub async fn suggest_companies(
    llm: &dyn TextGenerator,
    coursework: &[String],
    projects: &[String],
    interests: &[String],
    target_role: Option<&str>,
    limit: usize,
) -> CompanySuggestions {
    let prompt = build_prompt(coursework, projects, interests, target_role, limit);

    match llm
        .generate(&prompt, SUGGEST_MAX_TOKENS, SUGGEST_TEMPERATURE)
        .await
    {
        Ok(response) => parse_suggestions(&response),
        Err(e) => {
            warn!("company suggestion call failed: {e}");
            CompanySuggestions {
                profile_summary: String::new(),
                companies: Vec::new(),
                summary: "Unable to generate suggestions. Please try again.".to_string(),
            }
        }
    }
}

fn bulleted_or_not_provided(items: &[String]) -> String {
    if items.is_empty() {
        "Not provided".to_string()
    } else {
        items
            .iter()
            .map(|i| format!("- {i}"))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn build_prompt(
    coursework: &[String],
    projects: &[String],
    interests: &[String],
    target_role: Option<&str>,
    limit: usize,
) -> String {
    let role_hint = target_role
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(|r| format!(" They are especially interested in roles like: {r}."))
        .unwrap_or_default();

    SUGGEST_COMPANIES_PROMPT
        .replace("{coursework}", &bulleted_or_not_provided(coursework))
        .replace("{projects}", &bulleted_or_not_provided(projects))
        .replace("{interests}", &bulleted_or_not_provided(interests))
        .replace("{role_hint}", &role_hint)
        .replace("{limit}", &limit.to_string())
}

/// Decodes the model response. Pure; tested directly.
fn parse_suggestions(response: &str) -> CompanySuggestions {
    let response = strip_json_fences(response).trim();

    if let Some(object) = outer_json_object(response) {
        if let Ok(data) = serde_json::from_str::<Value>(object) {
            let companies: Vec<CompanySuggestion> = data
                .get("companies")
                .and_then(|v| v.as_array())
                .map(|arr| {
                    arr.iter()
                        .filter_map(|item| {
                            item.as_object().map(|obj| CompanySuggestion {
                                name: obj
                                    .get("name")
                                    .and_then(|v| v.as_str())
                                    .unwrap_or("Unknown")
                                    .to_string(),
                                reason: obj
                                    .get("reason")
                                    .and_then(|v| v.as_str())
                                    .unwrap_or_default()
                                    .to_string(),
                                roles: string_vec(obj.get("roles")),
                            })
                        })
                        .take(MAX_COMPANIES)
                        .collect()
                })
                .unwrap_or_default();

            let profile_summary = data
                .get("profile_summary")
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string();
            let summary = if profile_summary.is_empty() {
                "Here are companies that match your profile.".to_string()
            } else {
                profile_summary.clone()
            };

            return CompanySuggestions {
                profile_summary,
                companies,
                summary,
            };
        }
    }

    // Fallback: raw response as summary, empty companies.
    CompanySuggestions {
        profile_summary: response.chars().take(500).collect(),
        companies: Vec::new(),
        summary: "See profile summary below. Could not parse company list.".to_string(),
    }
}
