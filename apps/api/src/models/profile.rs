use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserRow {
    pub id: i32,
    pub email: String,
    pub name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserProfileRow {
    pub id: i32,
    pub user_id: i32,
    pub name: Option<String>,
    pub academic_title: Option<String>,
    pub resume_text: Option<String>,
    pub technical_skills: Value,
    pub soft_skills: Value,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CourseworkRow {
    pub id: i32,
    pub user_id: i32,
    pub title: String,
    pub term: Option<String>,
    pub grade: Option<String>,
    pub tags: Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ProjectRow {
    pub id: i32,
    pub user_id: i32,
    pub title: String,
    pub description: Option<String>,
    pub technologies: Value,
    pub date: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CareerInterestRow {
    pub id: i32,
    pub user_id: i32,
    pub interest: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JobRow {
    pub id: i32,
    pub title: String,
    pub company: Option<String>,
    pub description: Option<String>,
    pub required_skills: Option<String>,
    pub location: Option<String>,
    pub job_type: Option<String>,
    pub industry: Option<String>,
    pub salary: Option<String>,
    pub created_at: DateTime<Utc>,
}
