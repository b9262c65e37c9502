use axum::extract::{Multipart, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::career::analyze::{analyze_coursework, CourseworkAnalysis};
use crate::career::companies::{suggest_companies, CompanySuggestions};
use crate::career::persistence::{self, ProfileResponse, SaveProfileRequest};
use crate::career::profile::{extract_profile, ExtractedProfile};
use crate::config::MAX_PROJECT_FILES;
use crate::errors::AppError;
use crate::extract::{extract_document, DocumentKind};
use crate::models::course::CourseRecord;
use crate::state::AppState;
use crate::transcript::fallback;
use crate::transcript::pipeline::{
    import_course_grades_from_pdf, import_course_grades_from_text, PipelineDeps, TranscriptImport,
    MIN_RESUME_CHARS,
};
use crate::upload::SavedUpload;

/// Per-project-file extracted text is capped at this many characters.
const PROJECT_TEXT_LIMIT: usize = 15_000;

fn pipeline_deps(state: &AppState) -> PipelineDeps<'_> {
    PipelineDeps {
        llm: state.llm.as_ref(),
        tables: state.tables.as_ref(),
        ocr: state.ocr.as_deref(),
    }
}

/// Reads the first file field of a multipart upload.
async fn read_upload(multipart: &mut Multipart) -> Result<(String, Vec<u8>), AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart upload: {e}")))?
    {
        let Some(filename) = field.file_name().map(str::to_string) else {
            continue;
        };
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Failed to read upload: {e}")))?;
        return Ok((filename, data.to_vec()));
    }
    Err(AppError::Validation("No file provided.".to_string()))
}

/// Reads every file field of a multipart upload.
async fn read_uploads(multipart: &mut Multipart) -> Result<Vec<(String, Vec<u8>)>, AppError> {
    let mut files = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart upload: {e}")))?
    {
        let Some(filename) = field.file_name().map(str::to_string) else {
            continue;
        };
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Failed to read upload: {e}")))?;
        files.push((filename, data.to_vec()));
    }
    Ok(files)
}

#[derive(Debug, Deserialize)]
pub struct RawTextRequest {
    pub raw_text: String,
}

/// POST /api/v1/career/import-course-grades
/// Pasted course-grades page content in, structured records out.
pub async fn handle_import_course_grades(
    State(state): State<AppState>,
    Json(req): Json<RawTextRequest>,
) -> Json<Value> {
    let course_grades = import_course_grades_from_text(&req.raw_text, state.llm.as_ref()).await;
    Json(json!({ "course_grades": course_grades }))
}

/// POST /api/v1/career/extract-courses
/// Course names only, for the company-suggestions flow.
pub async fn handle_extract_courses(
    State(state): State<AppState>,
    Json(req): Json<RawTextRequest>,
) -> Json<Value> {
    let courses = fallback::extract_courses(&req.raw_text, state.llm.as_ref()).await;
    Json(json!({ "courses": courses }))
}

/// POST /api/v1/career/import-course-grades-pdf
pub async fn handle_import_course_grades_pdf(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<TranscriptImport>, AppError> {
    let (filename, bytes) = read_upload(&mut multipart).await?;
    if DocumentKind::from_filename(&filename) != Some(DocumentKind::Pdf) {
        return Err(AppError::Validation(
            "Please upload a PDF file (e.g. exported from your student portal).".to_string(),
        ));
    }

    let upload = SavedUpload::write(&state.config.upload_dir, "transcript", ".pdf", &bytes)?;
    let import = import_course_grades_from_pdf(upload.path(), pipeline_deps(&state)).await?;
    Ok(Json(import))
}

/// POST /api/v1/career/extract-resume-pdf
/// Extracts resume text for use in analyze-coursework / extract-profile.
pub async fn handle_extract_resume_pdf(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<Value>, AppError> {
    let (filename, bytes) = read_upload(&mut multipart).await?;
    let kind = match DocumentKind::from_filename(&filename) {
        Some(kind @ (DocumentKind::Pdf | DocumentKind::Txt)) => kind,
        _ => {
            return Err(AppError::Validation(
                "Please upload a resume as .pdf or .txt.".to_string(),
            ))
        }
    };

    let upload = SavedUpload::write(&state.config.upload_dir, "resume", kind.extension(), &bytes)?;
    let resume_text = extract_document(kind, upload.path(), state.ocr.as_deref()).into_text();
    if resume_text.trim().chars().count() < MIN_RESUME_CHARS {
        return Err(AppError::UnprocessableEntity(
            "Could not extract enough text from the PDF.".to_string(),
        ));
    }
    Ok(Json(json!({ "resume_text": resume_text })))
}

#[derive(Debug, Serialize)]
pub struct ProjectFileResult {
    pub filename: String,
    pub text: String,
    pub error: Option<String>,
}

/// POST /api/v1/career/import-project-files
/// Batch import of project documents (PDF, PPTX, DOCX). Per-file errors
/// are reported in-band; one bad file never fails the batch.
pub async fn handle_import_project_files(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<Value>, AppError> {
    let files = read_uploads(&mut multipart).await?;
    if files.len() > MAX_PROJECT_FILES {
        return Err(AppError::Validation(format!(
            "Maximum {MAX_PROJECT_FILES} project files."
        )));
    }

    let mut results = Vec::with_capacity(files.len());
    for (filename, bytes) in files {
        results.push(import_one_project_file(&state, filename, &bytes));
    }
    Ok(Json(json!({ "projects": results })))
}

fn import_one_project_file(state: &AppState, filename: String, bytes: &[u8]) -> ProjectFileResult {
    let kind = match DocumentKind::from_filename(&filename) {
        Some(kind @ (DocumentKind::Pdf | DocumentKind::Docx | DocumentKind::Pptx)) => kind,
        _ => {
            return ProjectFileResult {
                filename,
                text: String::new(),
                error: Some("Unsupported format. Use .pdf, .docx, .pptx".to_string()),
            }
        }
    };

    let upload = match SavedUpload::write(&state.config.upload_dir, "project", kind.extension(), bytes)
    {
        Ok(upload) => upload,
        Err(AppError::Validation(msg)) => {
            return ProjectFileResult {
                filename,
                text: String::new(),
                error: Some(msg),
            }
        }
        Err(e) => {
            return ProjectFileResult {
                filename,
                text: String::new(),
                error: Some(e.to_string()),
            }
        }
    };

    let text = extract_document(kind, upload.path(), state.ocr.as_deref()).into_text();
    ProjectFileResult {
        filename,
        text: text.trim().chars().take(PROJECT_TEXT_LIMIT).collect(),
        error: None,
    }
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeCourseworkRequest {
    pub course_grades: Vec<CourseRecord>,
    pub resume_text: Option<String>,
    #[serde(default)]
    pub projects: Vec<String>,
    pub job_area_interest: Option<String>,
}

/// POST /api/v1/career/analyze-coursework
pub async fn handle_analyze_coursework(
    State(state): State<AppState>,
    Json(req): Json<AnalyzeCourseworkRequest>,
) -> Json<CourseworkAnalysis> {
    let analysis = analyze_coursework(
        state.llm.as_ref(),
        &req.course_grades,
        req.resume_text.as_deref(),
        &req.projects,
        req.job_area_interest.as_deref(),
    )
    .await;
    Json(analysis)
}

#[derive(Debug, Deserialize)]
pub struct ExtractProfileRequest {
    pub resume_text: Option<String>,
    #[serde(default)]
    pub course_grades: Vec<CourseRecord>,
    pub coursework_raw_text: Option<String>,
    #[serde(default)]
    pub projects: Vec<String>,
}

/// POST /api/v1/career/extract-profile
pub async fn handle_extract_profile(
    State(state): State<AppState>,
    Json(req): Json<ExtractProfileRequest>,
) -> Json<ExtractedProfile> {
    let profile = extract_profile(
        state.llm.as_ref(),
        req.resume_text.as_deref(),
        &req.course_grades,
        req.coursework_raw_text.as_deref(),
        &req.projects,
    )
    .await;
    Json(profile)
}

fn default_company_limit() -> usize {
    10
}

#[derive(Debug, Deserialize)]
pub struct CompanySuggestionsRequest {
    #[serde(default)]
    pub coursework: Vec<String>,
    #[serde(default)]
    pub projects: Vec<String>,
    #[serde(default)]
    pub interests: Vec<String>,
    pub target_role: Option<String>,
    #[serde(default = "default_company_limit")]
    pub limit: usize,
}

/// POST /api/v1/career/company-suggestions
pub async fn handle_company_suggestions(
    State(state): State<AppState>,
    Json(req): Json<CompanySuggestionsRequest>,
) -> Json<CompanySuggestions> {
    let suggestions = suggest_companies(
        state.llm.as_ref(),
        &req.coursework,
        &req.projects,
        &req.interests,
        req.target_role.as_deref(),
        req.limit.clamp(1, 15),
    )
    .await;
    Json(suggestions)
}

/// POST /api/v1/career/save-profile
pub async fn handle_save_profile(
    State(state): State<AppState>,
    Json(req): Json<SaveProfileRequest>,
) -> Result<Json<Value>, AppError> {
    persistence::save_profile(&state.db, &req).await?;
    Ok(Json(json!({ "ok": true, "message": "Profile saved." })))
}

#[derive(Debug, Deserialize)]
pub struct EmailQuery {
    pub email: String,
}

/// GET /api/v1/career/profile
pub async fn handle_get_profile(
    State(state): State<AppState>,
    Query(params): Query<EmailQuery>,
) -> Result<Json<ProfileResponse>, AppError> {
    let profile = persistence::get_profile(&state.db, &params.email).await?;
    Ok(Json(profile))
}

fn default_jobs_limit() -> usize {
    20
}

#[derive(Debug, Deserialize)]
pub struct RelatedJobsQuery {
    pub email: String,
    #[serde(default = "default_jobs_limit")]
    pub limit: usize,
}

/// GET /api/v1/career/related-jobs
pub async fn handle_related_jobs(
    State(state): State<AppState>,
    Query(params): Query<RelatedJobsQuery>,
) -> Result<Json<Value>, AppError> {
    let jobs =
        persistence::related_jobs(&state.db, &params.email, params.limit.clamp(1, 50)).await?;
    Ok(Json(json!({ "jobs": jobs })))
}
