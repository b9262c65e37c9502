//! Profile persistence: the only part of the pipeline's output that
//! outlives a request. Profiles, coursework, projects, and interests are
//! stored under a user record keyed by lowercased email; related-job
//! lookup scores the stored jobs table by normalized skill overlap.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::PgPool;

use crate::errors::AppError;
use crate::models::profile::{
    CareerInterestRow, CourseworkRow, JobRow, ProjectRow, UserProfileRow, UserRow,
};

const DASH: &str = "—";

#[derive(Debug, Deserialize)]
pub struct SaveProfileRequest {
    pub email: String,
    pub name: Option<String>,
    pub academic_title: Option<String>,
    #[serde(default)]
    pub technical_skills: Vec<Value>,
    #[serde(default)]
    pub soft_skills: Vec<Value>,
    #[serde(default)]
    pub courses: Vec<CourseIn>,
    #[serde(default)]
    pub profile_projects: Vec<ProjectIn>,
    #[serde(default)]
    pub documents: Vec<DocumentIn>,
    #[serde(default)]
    pub career_interests: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct CourseIn {
    pub title: Option<String>,
    pub term: Option<String>,
    pub grade: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct ProjectIn {
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub technologies: Vec<String>,
    pub date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DocumentIn {
    pub category: Option<String>,
    pub filename: Option<String>,
    pub extracted_text: Option<String>,
}

/// Saves or updates a user profile. Child collections (coursework,
/// projects, interests, documents) are replaced wholesale inside one
/// transaction.
pub async fn save_profile(pool: &PgPool, req: &SaveProfileRequest) -> Result<(), AppError> {
    let email = req.email.trim().to_lowercase();
    if email.is_empty() {
        return Err(AppError::Validation("Email is required.".to_string()));
    }

    let mut tx = pool.begin().await?;

    let user: Option<UserRow> = sqlx::query_as("SELECT * FROM pathfinder_users WHERE email = $1")
        .bind(&email)
        .fetch_optional(&mut *tx)
        .await?;
    let user_id = match user {
        Some(u) => {
            if let Some(name) = req.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
                sqlx::query("UPDATE pathfinder_users SET name = $1, updated_at = now() WHERE id = $2")
                    .bind(name)
                    .bind(u.id)
                    .execute(&mut *tx)
                    .await?;
            }
            u.id
        }
        None => {
            let name = req
                .name
                .clone()
                .unwrap_or_else(|| email.split('@').next().unwrap_or(&email).to_string());
            let (id,): (i32,) =
                sqlx::query_as("INSERT INTO pathfinder_users (email, name) VALUES ($1, $2) RETURNING id")
                    .bind(&email)
                    .bind(&name)
                    .fetch_one(&mut *tx)
                    .await?;
            id
        }
    };

    let technical_skills = Value::Array(req.technical_skills.clone());
    let soft_skills = Value::Array(req.soft_skills.clone());
    let existing: Option<(i32,)> =
        sqlx::query_as("SELECT id FROM pathfinder_user_profiles WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await?;
    match existing {
        Some((profile_id,)) => {
            sqlx::query(
                "UPDATE pathfinder_user_profiles \
                 SET name = COALESCE($1, name), academic_title = $2, \
                     technical_skills = $3, soft_skills = $4, updated_at = now() \
                 WHERE id = $5",
            )
            .bind(&req.name)
            .bind(req.academic_title.as_deref().unwrap_or(""))
            .bind(&technical_skills)
            .bind(&soft_skills)
            .bind(profile_id)
            .execute(&mut *tx)
            .await?;
        }
        None => {
            sqlx::query(
                "INSERT INTO pathfinder_user_profiles \
                     (user_id, name, academic_title, technical_skills, soft_skills) \
                 VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(user_id)
            .bind(&req.name)
            .bind(req.academic_title.as_deref().unwrap_or(""))
            .bind(&technical_skills)
            .bind(&soft_skills)
            .execute(&mut *tx)
            .await?;
        }
    }

    sqlx::query("DELETE FROM pathfinder_user_coursework WHERE user_id = $1")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;
    for course in &req.courses {
        let title = course.title.as_deref().map(str::trim).unwrap_or("");
        if title.is_empty() {
            continue;
        }
        sqlx::query(
            "INSERT INTO pathfinder_user_coursework (user_id, title, term, grade, tags) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(user_id)
        .bind(title)
        .bind(clip(course.term.as_deref().unwrap_or(DASH), 100))
        .bind(clip(course.grade.as_deref().unwrap_or(DASH), 50))
        .bind(Value::from(course.tags.clone()))
        .execute(&mut *tx)
        .await?;
    }

    sqlx::query("DELETE FROM pathfinder_user_projects WHERE user_id = $1")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;
    for project in &req.profile_projects {
        let title = project.title.as_deref().map(str::trim).unwrap_or("");
        if title.is_empty() {
            continue;
        }
        sqlx::query(
            "INSERT INTO pathfinder_user_projects (user_id, title, description, technologies, date) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(user_id)
        .bind(title)
        .bind(clip(project.description.as_deref().unwrap_or(""), 5000))
        .bind(Value::from(project.technologies.clone()))
        .bind(clip(project.date.as_deref().unwrap_or(DASH), 100))
        .execute(&mut *tx)
        .await?;
    }

    sqlx::query("DELETE FROM pathfinder_user_career_interests WHERE user_id = $1")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;
    for interest in &req.career_interests {
        let interest = interest.trim();
        if interest.is_empty() {
            continue;
        }
        sqlx::query("INSERT INTO pathfinder_user_career_interests (user_id, interest) VALUES ($1, $2)")
            .bind(user_id)
            .bind(interest)
            .execute(&mut *tx)
            .await?;
    }

    sqlx::query("DELETE FROM pathfinder_user_documents WHERE user_id = $1")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;
    for doc in &req.documents {
        sqlx::query(
            "INSERT INTO pathfinder_user_documents (user_id, category, filename, extracted_text) \
             VALUES ($1, $2, $3, $4)",
        )
        .bind(user_id)
        .bind(clip(doc.category.as_deref().unwrap_or("other"), 50))
        .bind(clip(doc.filename.as_deref().unwrap_or("file"), 500))
        .bind(clip(doc.extracted_text.as_deref().unwrap_or(""), 15000))
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct ProfileData {
    pub name: Option<String>,
    pub academic_title: String,
    pub technical_skills: Value,
    pub soft_skills: Value,
}

#[derive(Debug, Serialize)]
pub struct CourseOut {
    pub title: String,
    pub term: String,
    pub grade: String,
    pub tags: Value,
}

#[derive(Debug, Serialize)]
pub struct ProjectOut {
    pub title: String,
    pub description: String,
    pub technologies: Value,
    pub date: String,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub profile: Option<ProfileData>,
    pub courses: Vec<CourseOut>,
    pub projects: Vec<ProjectOut>,
    pub career_interests: Vec<String>,
}

/// Loads a stored profile; a missing user yields the empty shape, not 404.
pub async fn get_profile(pool: &PgPool, email: &str) -> Result<ProfileResponse, AppError> {
    let email = email.trim().to_lowercase();
    if email.is_empty() {
        return Err(AppError::Validation("Email is required.".to_string()));
    }

    let user: Option<UserRow> = sqlx::query_as("SELECT * FROM pathfinder_users WHERE email = $1")
        .bind(&email)
        .fetch_optional(pool)
        .await?;
    let Some(user) = user else {
        return Ok(ProfileResponse {
            profile: None,
            courses: Vec::new(),
            projects: Vec::new(),
            career_interests: Vec::new(),
        });
    };

    let profile: Option<UserProfileRow> =
        sqlx::query_as("SELECT * FROM pathfinder_user_profiles WHERE user_id = $1")
            .bind(user.id)
            .fetch_optional(pool)
            .await?;
    let coursework: Vec<CourseworkRow> =
        sqlx::query_as("SELECT * FROM pathfinder_user_coursework WHERE user_id = $1")
            .bind(user.id)
            .fetch_all(pool)
            .await?;
    let projects: Vec<ProjectRow> =
        sqlx::query_as("SELECT * FROM pathfinder_user_projects WHERE user_id = $1")
            .bind(user.id)
            .fetch_all(pool)
            .await?;
    let interests: Vec<CareerInterestRow> =
        sqlx::query_as("SELECT * FROM pathfinder_user_career_interests WHERE user_id = $1")
            .bind(user.id)
            .fetch_all(pool)
            .await?;

    let profile_data = ProfileData {
        name: profile
            .as_ref()
            .and_then(|p| p.name.clone())
            .or(user.name.clone()),
        academic_title: profile
            .as_ref()
            .and_then(|p| p.academic_title.clone())
            .unwrap_or_default(),
        technical_skills: profile
            .as_ref()
            .map(|p| p.technical_skills.clone())
            .unwrap_or_else(|| Value::Array(Vec::new())),
        soft_skills: profile
            .as_ref()
            .map(|p| p.soft_skills.clone())
            .unwrap_or_else(|| Value::Array(Vec::new())),
    };

    Ok(ProfileResponse {
        profile: Some(profile_data),
        courses: coursework
            .into_iter()
            .map(|c| CourseOut {
                title: c.title,
                term: c.term.unwrap_or_else(|| DASH.to_string()),
                grade: c.grade.unwrap_or_else(|| DASH.to_string()),
                tags: c.tags,
            })
            .collect(),
        projects: projects
            .into_iter()
            .map(|p| ProjectOut {
                title: p.title,
                description: p.description.unwrap_or_default(),
                technologies: p.technologies,
                date: p.date.unwrap_or_else(|| DASH.to_string()),
            })
            .collect(),
        career_interests: interests.into_iter().map(|i| i.interest).collect(),
    })
}

#[derive(Debug, Serialize)]
pub struct RelatedJob {
    pub id: i32,
    pub title: String,
    pub company: Option<String>,
    pub description: Option<String>,
    pub required_skills: Option<String>,
    pub location: Option<String>,
    pub job_type: Option<String>,
    pub industry: Option<String>,
    pub salary: Option<String>,
    pub match_score: u32,
}

/// Jobs related to the stored profile, scored by skill overlap between
/// the user's skills/technologies/interests and each job's requirements.
pub async fn related_jobs(
    pool: &PgPool,
    email: &str,
    limit: usize,
) -> Result<Vec<RelatedJob>, AppError> {
    let email = email.trim().to_lowercase();
    if email.is_empty() {
        return Err(AppError::Validation("Email is required.".to_string()));
    }

    let user: Option<UserRow> = sqlx::query_as("SELECT * FROM pathfinder_users WHERE email = $1")
        .bind(&email)
        .fetch_optional(pool)
        .await?;

    let skills = match &user {
        None => std::collections::HashSet::new(),
        Some(user) => {
            let profile: Option<UserProfileRow> =
                sqlx::query_as("SELECT * FROM pathfinder_user_profiles WHERE user_id = $1")
                    .bind(user.id)
                    .fetch_optional(pool)
                    .await?;
            let projects: Vec<ProjectRow> =
                sqlx::query_as("SELECT * FROM pathfinder_user_projects WHERE user_id = $1")
                    .bind(user.id)
                    .fetch_all(pool)
                    .await?;
            let interests: Vec<CareerInterestRow> =
                sqlx::query_as("SELECT * FROM pathfinder_user_career_interests WHERE user_id = $1")
                    .bind(user.id)
                    .fetch_all(pool)
                    .await?;
            collect_profile_skills(profile.as_ref(), &projects, &interests)
        }
    };

    let jobs: Vec<JobRow> = sqlx::query_as("SELECT * FROM pathfinder_jobs LIMIT 200")
        .fetch_all(pool)
        .await?;

    Ok(rank_jobs(jobs, &skills, limit))
}

/// Gathers the user's normalized skill tokens from profile skills,
/// project technologies, and career interests.
fn collect_profile_skills(
    profile: Option<&UserProfileRow>,
    projects: &[ProjectRow],
    interests: &[CareerInterestRow],
) -> std::collections::HashSet<String> {
    let mut skills = std::collections::HashSet::new();

    if let Some(profile) = profile {
        if let Some(arr) = profile.technical_skills.as_array() {
            for s in arr {
                let name = s
                    .get("name")
                    .and_then(|n| n.as_str())
                    .or_else(|| s.as_str());
                if let Some(name) = name {
                    insert_normalized(&mut skills, name);
                }
            }
        }
    }
    for p in projects {
        if let Some(arr) = p.technologies.as_array() {
            for t in arr.iter().filter_map(|t| t.as_str()) {
                insert_normalized(&mut skills, t);
            }
        }
    }
    for i in interests {
        insert_normalized(&mut skills, &i.interest);
    }
    skills
}

fn insert_normalized(set: &mut std::collections::HashSet<String>, raw: &str) {
    let n = normalize_skill(raw);
    if !n.is_empty() {
        set.insert(n);
    }
}

fn normalize_skill(s: &str) -> String {
    s.to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect()
}

/// Scores and orders jobs: overlap desc, then title for a stable order.
/// Match score: base 60 + 8 per overlapping skill, capped at 100.
fn rank_jobs(
    jobs: Vec<JobRow>,
    skills: &std::collections::HashSet<String>,
    limit: usize,
) -> Vec<RelatedJob> {
    let mut scored: Vec<(usize, JobRow)> = jobs
        .into_iter()
        .map(|job| {
            let haystack = format!(
                "{} {}",
                job.required_skills.as_deref().unwrap_or(""),
                job.title
            );
            let job_tokens: std::collections::HashSet<String> = haystack
                .split(|c: char| matches!(c, ',' | '/' | ';') || c.is_whitespace())
                .map(normalize_skill)
                .filter(|t| !t.is_empty())
                .collect();
            let overlap = if skills.is_empty() {
                0
            } else {
                skills.intersection(&job_tokens).count()
            };
            (overlap, job)
        })
        .collect();

    scored.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.title.cmp(&b.1.title)));

    scored
        .into_iter()
        .take(limit)
        .map(|(overlap, job)| RelatedJob {
            match_score: (60 + overlap as u32 * 8).min(100),
            id: job.id,
            title: job.title,
            company: job.company,
            description: job.description,
            required_skills: job.required_skills,
            location: job.location,
            job_type: job.job_type,
            industry: job.industry,
            salary: job.salary,
        })
        .collect()
}

fn clip(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn job(id: i32, title: &str, required: &str) -> JobRow {
        JobRow {
            id,
            title: title.to_string(),
            company: Some("Acme".to_string()),
            description: None,
            required_skills: Some(required.to_string()),
            location: None,
            job_type: None,
            industry: None,
            salary: None,
            created_at: Utc::now(),
        }
    }

    fn skill_set(skills: &[&str]) -> std::collections::HashSet<String> {
        skills.iter().map(|s| normalize_skill(s)).collect()
    }

    #[test]
    fn test_normalize_skill_strips_punctuation_and_case() {
        assert_eq!(normalize_skill("C++"), "c");
        assert_eq!(normalize_skill("Node.js"), "nodejs");
        assert_eq!(normalize_skill("  SQL  "), "sql");
        assert_eq!(normalize_skill("!!"), "");
    }

    #[test]
    fn test_rank_jobs_orders_by_overlap_then_title() {
        let jobs = vec![
            job(1, "Backend Engineer", "go, sql"),
            job(2, "Data Engineer", "python, sql, spark"),
            job(3, "Analyst", "excel"),
        ];
        let skills = skill_set(&["Python", "SQL", "Spark"]);
        let ranked = rank_jobs(jobs, &skills, 10);
        assert_eq!(ranked[0].title, "Data Engineer");
        assert_eq!(ranked[0].match_score, 60 + 3 * 8);
        assert_eq!(ranked[1].title, "Backend Engineer");
        assert_eq!(ranked[2].match_score, 60);
    }

    #[test]
    fn test_rank_jobs_score_is_capped_at_100() {
        let jobs = vec![job(1, "Polyglot", "a1, a2, a3, a4, a5, a6, a7")];
        let skills = skill_set(&["a1", "a2", "a3", "a4", "a5", "a6", "a7"]);
        let ranked = rank_jobs(jobs, &skills, 10);
        assert_eq!(ranked[0].match_score, 100);
    }

    #[test]
    fn test_rank_jobs_empty_skills_keeps_base_score() {
        let jobs = vec![job(1, "Any Role", "anything")];
        let ranked = rank_jobs(jobs, &std::collections::HashSet::new(), 10);
        assert_eq!(ranked[0].match_score, 60);
    }

    #[test]
    fn test_rank_jobs_respects_limit_and_title_tiebreak() {
        let jobs = vec![job(2, "Zeta Role", "x"), job(1, "Alpha Role", "y")];
        let ranked = rank_jobs(jobs, &std::collections::HashSet::new(), 1);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].title, "Alpha Role");
    }

    #[test]
    fn test_collect_profile_skills_merges_sources() {
        let projects = vec![ProjectRow {
            id: 1,
            user_id: 1,
            title: "Pipeline".to_string(),
            description: None,
            technologies: serde_json::json!(["Kafka", "Rust"]),
            date: None,
            created_at: Utc::now(),
        }];
        let interests = vec![CareerInterestRow {
            id: 1,
            user_id: 1,
            interest: "Data Engineering".to_string(),
            created_at: Utc::now(),
        }];
        let skills = collect_profile_skills(None, &projects, &interests);
        assert!(skills.contains("kafka"));
        assert!(skills.contains("rust"));
        assert!(skills.contains("dataengineering"));
    }

    #[test]
    fn test_clip_counts_chars_not_bytes() {
        assert_eq!(clip("héllo", 2), "hé");
        assert_eq!(clip("abc", 10), "abc");
    }
}
