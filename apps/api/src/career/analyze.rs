//! Coursework/resume/project analysis: which roles fit this student, and why.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::career::prompts::{ANALYZE_COURSEWORK_PROMPT, INTEREST_LINE_TEMPLATE};
use crate::career::{outer_json_object, string_vec};
use crate::llm_client::{strip_json_fences, TextGenerator, TEMPERATURE_DEFAULT};
use crate::models::course::CourseRecord;

const ANALYZE_MAX_TOKENS: u32 = 1200;
const MAX_SUITABLE_ROLES: usize = 5;
const MAX_IMPROVEMENT_AREAS: usize = 5;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuitableRole {
    pub role: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CourseworkAnalysis {
    pub summary: String,
    pub suitable_roles: Vec<SuitableRole>,
    pub strengths: Vec<String>,
    pub suggested_roles: Vec<String>,
    pub skills_to_highlight: Vec<String>,
    pub recommendations: Vec<String>,
    pub areas_to_improve: Vec<String>,
}

impl CourseworkAnalysis {
    fn with_summary(summary: &str) -> Self {
        Self {
            summary: summary.to_string(),
            ..Self::default()
        }
    }
}

/// Analyzes imported coursework, optionally combined with resume text,
/// project descriptions, and a stated job-area interest. A stated
/// interest is pinned to rank 1 of `suitable_roles` even when the model
/// forgets to put it first.
pub async fn analyze_coursework(
    llm: &dyn TextGenerator,
    course_grades: &[CourseRecord],
    resume_text: Option<&str>,
    projects: &[String],
    job_area_interest: Option<&str>,
) -> CourseworkAnalysis {
    let resume = resume_text.map(str::trim).filter(|t| !t.is_empty());
    if course_grades.is_empty() && resume.is_none() && projects.is_empty() {
        return CourseworkAnalysis::with_summary("No coursework, resume, or projects to analyze.");
    }

    let interest = job_area_interest.map(str::trim).filter(|i| !i.is_empty());
    let prompt = build_prompt(course_grades, resume, projects, interest);

    match llm
        .generate(&prompt, ANALYZE_MAX_TOKENS, TEMPERATURE_DEFAULT)
        .await
    {
        Ok(response) => parse_analysis(&response, interest).unwrap_or_else(|| {
            warn!("coursework analysis response was unusable");
            CourseworkAnalysis::with_summary("Analysis could not be generated.")
        }),
        Err(e) => {
            warn!("coursework analysis call failed: {e}");
            CourseworkAnalysis::with_summary("Analysis could not be generated.")
        }
    }
}

fn build_prompt(
    course_grades: &[CourseRecord],
    resume: Option<&str>,
    projects: &[String],
    interest: Option<&str>,
) -> String {
    let shown = &course_grades[..course_grades.len().min(40)];
    let courses_json = serde_json::to_string_pretty(shown).unwrap_or_else(|_| "[]".to_string());

    let resume_section = resume
        .map(|r| {
            let slice: String = r.chars().take(6000).collect();
            format!("\nResume (extracted text):\n{slice}\n")
        })
        .unwrap_or_default();

    let projects_str = if projects.is_empty() {
        "(none)".to_string()
    } else {
        projects
            .iter()
            .take(30)
            .map(|p| format!("- {p}"))
            .collect::<Vec<_>>()
            .join("\n")
    };

    let interest_line = interest
        .map(|i| INTEREST_LINE_TEMPLATE.replace("{interest}", i))
        .unwrap_or_default();

    ANALYZE_COURSEWORK_PROMPT
        .replace("{interest_line}", &interest_line)
        .replace("{courses_json}", &courses_json)
        .replace("{resume_section}", &resume_section)
        .replace("{projects}", &projects_str)
}

/// Decodes and normalizes the model response. Pure; tested directly.
fn parse_analysis(response: &str, interest: Option<&str>) -> Option<CourseworkAnalysis> {
    let object = outer_json_object(strip_json_fences(response))?;
    let data: Value = serde_json::from_str(object).ok()?;

    let mut suitable_roles: Vec<SuitableRole> = data
        .get("suitable_roles")
        .and_then(|v| v.as_array())
        .map(|arr| {
            arr.iter()
                .filter_map(|item| {
                    let role = item.get("role")?.as_str()?.trim().to_string();
                    if role.is_empty() {
                        return None;
                    }
                    let reason = item
                        .get("reason")
                        .and_then(|r| r.as_str())
                        .unwrap_or_default()
                        .trim()
                        .to_string();
                    Some(SuitableRole { role, reason })
                })
                .take(MAX_SUITABLE_ROLES)
                .collect()
        })
        .unwrap_or_default();

    // Pin the stated interest to rank 1 when the model ranked it lower.
    if let Some(interest) = interest {
        let interest_lower = interest.to_lowercase();
        if let Some(idx) = suitable_roles
            .iter()
            .position(|s| s.role.to_lowercase().contains(&interest_lower))
        {
            if idx > 0 {
                let pinned = suitable_roles.remove(idx);
                suitable_roles.insert(0, pinned);
            }
        }
    }

    let mut areas_to_improve = string_vec(data.get("areas_to_improve"));
    areas_to_improve.truncate(MAX_IMPROVEMENT_AREAS);

    Some(CourseworkAnalysis {
        summary: data
            .get("summary")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string(),
        suitable_roles,
        strengths: string_vec(data.get("strengths")),
        suggested_roles: string_vec(data.get("suggested_roles")),
        skills_to_highlight: string_vec(data.get("skills_to_highlight")),
        recommendations: string_vec(data.get("recommendations")),
        areas_to_improve,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::llm_client::LlmError;

    struct CountingGenerator(AtomicUsize);

    #[async_trait]
    impl TextGenerator for CountingGenerator {
        async fn generate(&self, _: &str, _: u32, _: f32) -> Result<String, LlmError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Err(LlmError::EmptyContent)
        }
    }

    const RESPONSE: &str = r#"{
        "summary": "Strong data engineering profile.",
        "suitable_roles": [
            {"role": "Data Engineer", "reason": "Coursework in pipelines."},
            {"role": "Python Developer", "reason": "Projects in Python."},
            {"role": "ML Engineer", "reason": "ML electives."}
        ],
        "strengths": ["Data & Analytics"],
        "suggested_roles": ["Data Engineer", "Analytics Engineer"],
        "skills_to_highlight": ["SQL", "Python"],
        "recommendations": ["Highlight pipeline projects."],
        "areas_to_improve": ["System design", "Cloud certifications"]
    }"#;

    #[test]
    fn test_parse_analysis_normalizes_fields() {
        let analysis = parse_analysis(RESPONSE, None).unwrap();
        assert_eq!(analysis.summary, "Strong data engineering profile.");
        assert_eq!(analysis.suitable_roles.len(), 3);
        assert_eq!(analysis.suitable_roles[0].role, "Data Engineer");
        assert_eq!(analysis.areas_to_improve.len(), 2);
    }

    #[test]
    fn test_parse_analysis_pins_stated_interest_first() {
        let analysis = parse_analysis(RESPONSE, Some("python developer")).unwrap();
        assert_eq!(analysis.suitable_roles[0].role, "Python Developer");
        assert_eq!(analysis.suitable_roles.len(), 3);
    }

    #[test]
    fn test_parse_analysis_interest_absent_from_roles_is_noop() {
        let analysis = parse_analysis(RESPONSE, Some("game developer")).unwrap();
        assert_eq!(analysis.suitable_roles[0].role, "Data Engineer");
    }

    #[test]
    fn test_parse_analysis_drops_malformed_roles() {
        let response = r#"{
            "summary": "ok",
            "suitable_roles": [{"reason": "no role key"}, {"role": "  "}, {"role": "QA Engineer"}]
        }"#;
        let analysis = parse_analysis(response, None).unwrap();
        assert_eq!(analysis.suitable_roles.len(), 1);
        assert_eq!(analysis.suitable_roles[0].role, "QA Engineer");
    }

    #[test]
    fn test_parse_analysis_rejects_non_json() {
        assert!(parse_analysis("I cannot analyze this.", None).is_none());
    }

    #[tokio::test]
    async fn test_empty_inputs_short_circuit_without_llm_call() {
        let llm = CountingGenerator(AtomicUsize::new(0));
        let analysis = analyze_coursework(&llm, &[], None, &[], None).await;
        assert_eq!(analysis.summary, "No coursework, resume, or projects to analyze.");
        assert_eq!(llm.0.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_provider_failure_degrades_to_placeholder() {
        let llm = CountingGenerator(AtomicUsize::new(0));
        let records = vec![CourseRecord::name_only("Data Mining")];
        let analysis = analyze_coursework(&llm, &records, None, &[], None).await;
        assert_eq!(analysis.summary, "Analysis could not be generated.");
        assert!(analysis.suitable_roles.is_empty());
    }
}
