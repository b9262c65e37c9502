//! Dashboard profile extraction from resume, coursework, and projects.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::career::outer_json_object;
use crate::career::prompts::EXTRACT_PROFILE_PROMPT;
use crate::llm_client::{strip_json_fences, TextGenerator, TEMPERATURE_DEFAULT};
use crate::models::course::CourseRecord;

const PROFILE_MAX_TOKENS: u32 = 2000;
const MAX_TECH_SKILLS: usize = 10;
const MAX_SOFT_SKILLS: usize = 6;
const MAX_COURSES: usize = 30;
const MAX_PROJECTS: usize = 20;
const MAX_COURSE_TAGS: usize = 5;
const MAX_PROJECT_TECHNOLOGIES: usize = 6;
const DEFAULT_SKILL_PERCENT: i64 = 70;

/// Placeholder for fields the model could not determine.
const DASH: &str = "—";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillEntry {
    pub name: String,
    pub percent: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileCourse {
    pub title: String,
    pub term: String,
    pub grade: String,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileProject {
    pub title: String,
    pub description: String,
    pub technologies: Vec<String>,
    pub date: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractedProfile {
    pub name: Option<String>,
    pub academic_title: Option<String>,
    pub technical_skills: Vec<SkillEntry>,
    pub soft_skills: Vec<SkillEntry>,
    pub courses: Vec<ProfileCourse>,
    pub profile_projects: Vec<ProfileProject>,
}

/// Extracts a dashboard profile (name, academic title, skills, courses
/// with term and tags, projects). Model failure degrades to a profile
/// built from the parsed course grades alone.
pub async fn extract_profile(
    llm: &dyn TextGenerator,
    resume_text: Option<&str>,
    course_grades: &[CourseRecord],
    coursework_raw_text: Option<&str>,
    projects: &[String],
) -> ExtractedProfile {
    let resume = resume_text.map(str::trim).filter(|t| !t.is_empty());
    if resume.is_none() && course_grades.is_empty() && projects.is_empty() {
        return ExtractedProfile::default();
    }

    let prompt = build_prompt(resume, course_grades, coursework_raw_text, projects);

    match llm
        .generate(&prompt, PROFILE_MAX_TOKENS, TEMPERATURE_DEFAULT)
        .await
    {
        Ok(response) => parse_profile(&response, course_grades).unwrap_or_else(|| {
            warn!("profile extraction response was unusable");
            courses_only_profile(course_grades)
        }),
        Err(e) => {
            warn!("profile extraction call failed: {e}");
            courses_only_profile(course_grades)
        }
    }
}

fn build_prompt(
    resume: Option<&str>,
    course_grades: &[CourseRecord],
    coursework_raw_text: Option<&str>,
    projects: &[String],
) -> String {
    let shown = &course_grades[..course_grades.len().min(40)];
    let courses_json = serde_json::to_string_pretty(shown).unwrap_or_else(|_| "[]".to_string());

    let resume_section = resume
        .map(|r| {
            let slice: String = r.chars().take(6000).collect();
            format!("\nResume:\n{slice}\n")
        })
        .unwrap_or_default();

    let coursework_text_section = coursework_raw_text
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(|t| {
            let slice: String = t.chars().take(6000).collect();
            format!("\nCoursework (raw transcript excerpt for term/semester context):\n{slice}\n")
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

    EXTRACT_PROFILE_PROMPT
        .replace("{resume_section}", &resume_section)
        .replace("{courses_json}", &courses_json)
        .replace("{coursework_text_section}", &coursework_text_section)
        .replace("{projects}", &projects_str)
}

/// Decodes and normalizes the model response. Pure; tested directly.
fn parse_profile(response: &str, course_grades: &[CourseRecord]) -> Option<ExtractedProfile> {
    let object = outer_json_object(strip_json_fences(response))?;
    let data: Value = serde_json::from_str(object).ok()?;

    let mut courses = parse_courses(data.get("courses"));
    if courses.is_empty() {
        courses = courses_from_grades(course_grades);
    }

    Some(ExtractedProfile {
        name: non_empty_string(data.get("name")),
        academic_title: non_empty_string(data.get("academic_title")),
        technical_skills: parse_skills(data.get("technical_skills"), MAX_TECH_SKILLS),
        soft_skills: parse_skills(data.get("soft_skills"), MAX_SOFT_SKILLS),
        courses,
        profile_projects: parse_projects(&data),
    })
}

fn parse_skills(value: Option<&Value>, limit: usize) -> Vec<SkillEntry> {
    value
        .and_then(|v| v.as_array())
        .map(|arr| {
            arr.iter()
                .filter_map(|item| {
                    let name = item.get("name")?.as_str()?.trim().to_string();
                    if name.is_empty() {
                        return None;
                    }
                    let percent = item
                        .get("percent")
                        .and_then(Value::as_i64)
                        .unwrap_or(DEFAULT_SKILL_PERCENT);
                    Some(SkillEntry { name, percent })
                })
                .take(limit)
                .collect()
        })
        .unwrap_or_default()
}

fn parse_courses(value: Option<&Value>) -> Vec<ProfileCourse> {
    value
        .and_then(|v| v.as_array())
        .map(|arr| {
            arr.iter()
                .filter_map(|item| {
                    let title = item.get("title")?.as_str()?.trim().to_string();
                    if title.is_empty() {
                        return None;
                    }
                    let tags = item
                        .get("tags")
                        .and_then(|t| t.as_array())
                        .map(|tags| {
                            tags.iter()
                                .filter_map(|t| t.as_str())
                                .map(str::trim)
                                .filter(|t| !t.is_empty())
                                .take(MAX_COURSE_TAGS)
                                .map(String::from)
                                .collect()
                        })
                        .unwrap_or_default();
                    Some(ProfileCourse {
                        title,
                        term: string_or_dash(item.get("term")),
                        grade: string_or_dash(item.get("grade")),
                        tags,
                    })
                })
                .take(MAX_COURSES)
                .collect()
        })
        .unwrap_or_default()
}

fn parse_projects(data: &Value) -> Vec<ProfileProject> {
    let raw = data
        .get("profile_projects")
        .or_else(|| data.get("projects"))
        .and_then(|v| v.as_array());
    raw.map(|arr| {
        arr.iter()
            .filter_map(|item| {
                let title = item.get("title")?.as_str()?.trim().to_string();
                if title.is_empty() {
                    return None;
                }
                let technologies = item
                    .get("technologies")
                    .or_else(|| item.get("technologies_used"))
                    .and_then(|t| t.as_array())
                    .map(|techs| {
                        techs
                            .iter()
                            .filter_map(|t| t.as_str())
                            .map(str::trim)
                            .filter(|t| !t.is_empty())
                            .take(MAX_PROJECT_TECHNOLOGIES)
                            .map(String::from)
                            .collect()
                    })
                    .unwrap_or_default();
                Some(ProfileProject {
                    title,
                    description: string_or_dash(item.get("description")),
                    technologies,
                    date: string_or_dash(item.get("date")),
                })
            })
            .take(MAX_PROJECTS)
            .collect()
    })
    .unwrap_or_default()
}

/// The degraded shape when the model gave us nothing usable: course
/// titles and grades straight from the parsed records.
fn courses_only_profile(course_grades: &[CourseRecord]) -> ExtractedProfile {
    ExtractedProfile {
        courses: courses_from_grades(course_grades),
        ..ExtractedProfile::default()
    }
}

fn courses_from_grades(course_grades: &[CourseRecord]) -> Vec<ProfileCourse> {
    course_grades
        .iter()
        .filter(|r| !r.course.trim().is_empty())
        .take(MAX_COURSES)
        .map(|r| ProfileCourse {
            title: r.course.trim().to_string(),
            term: DASH.to_string(),
            grade: r
                .grade
                .as_deref()
                .map(str::trim)
                .filter(|g| !g.is_empty())
                .unwrap_or(DASH)
                .to_string(),
            tags: Vec::new(),
        })
        .collect()
}

fn non_empty_string(value: Option<&Value>) -> Option<String> {
    value
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

fn string_or_dash(value: Option<&Value>) -> String {
    non_empty_string(value).unwrap_or_else(|| DASH.to_string())
}
