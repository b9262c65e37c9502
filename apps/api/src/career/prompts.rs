// All LLM prompt constants for the career module.
// Placeholders ({courses_json}, {projects}, ...) are replaced before sending.

/// Coursework/resume/projects analysis. Replace: {interest_line},
/// {courses_json}, {resume_section}, {projects}.
pub const ANALYZE_COURSEWORK_PROMPT: &str = r#"You are a career advisor. Analyze this profile (coursework, resume, and projects) and identify which job roles are most suitable and why.
Use their coursework (and grades if provided), resume (if provided), and projects (if provided) to give a combined, specific analysis.{interest_line}

Coursework data:
{courses_json}
{resume_section}
Projects they have done:
{projects}

Respond with ONLY a single JSON object (no other text) with these exact keys:
- "summary": 2-3 sentences summarizing their profile and why certain roles fit them. If they stated a job area interest, mention how their profile aligns with it.
- "suitable_roles": array of 3-5 objects, each with "role" (job title) and "reason" (1 sentence why this role fits). If the student stated a job interest, the FIRST role in this array MUST be the one that matches their interest (e.g. Python Developer if they said python developer). Then add other related roles.
- "strengths": array of 3-6 strength areas (e.g. "Data & Analytics", "Software Development").
- "suggested_roles": array of 4-8 job role titles that fit this profile.
- "skills_to_highlight": array of 5-10 skills they can claim on resume/LinkedIn (from courses, resume, and projects).
- "recommendations": array of 2-4 short recommendations (e.g. "Highlight X in applications", "Consider adding a course in Y").
- "areas_to_improve": array of 2-5 specific areas or skills they should improve to be stronger for their target role/interest (e.g. "Deep learning frameworks", "System design", "Cloud certifications"). Be concrete and actionable.

Use only the keys above. Be specific and actionable. suitable_roles must be an array of objects with "role" and "reason"."#;

/// Interest pin fragment for the analysis prompt. Replace {interest}.
pub const INTEREST_LINE_TEMPLATE: &str = "\nThe student's stated job role interest: \"{interest}\"\nIMPORTANT: Put the role that best matches this interest FIRST in suitable_roles (e.g. if they said Python Developer, list Python Developer as the #1 role). Then list other related roles. Also identify specific areas they need to improve for this target role.\n";

/// Dashboard profile extraction. Replace: {resume_section},
/// {courses_json}, {coursework_text_section}, {projects}.
pub const EXTRACT_PROFILE_PROMPT: &str = r#"You are extracting a student's profile for a dashboard. Based on the resume, coursework, and projects provided, extract:
1. Full name (from resume - typically at top)
2. Academic title (e.g. "Computer Science • Junior" or "Data Science • Senior" - degree/major and year from resume or coursework)
3. Technical skills with proficiency 50-95: PRIMARY SOURCE is the RESUME. Extract skills explicitly listed (programming languages, tools, frameworks). Assign proficiency based on years of experience, project depth, or how prominently each skill appears. Supplement with coursework/projects only if resume lacks detail.
4. Soft skills with proficiency 50-95: PRIMARY SOURCE is the RESUME. Extract soft skills mentioned (leadership, communication, teamwork, problem solving). Assign proficiency based on evidence (e.g. "led team" -> Leadership 85). Supplement with projects if resume lacks detail.
5. courses: array of objects for each course in the coursework data. Each object has:
   - "title": full course name
   - "term": semester (e.g. "Fall 2025", "Spring 2025") - infer from coursework transcript text if present, else use "—"
   - "grade": letter grade from the data
   - "tags": 2-4 skill/keyword tags inferred from the course (e.g. "Data Structures" -> ["Algorithms", "Problem Solving", "Python"])
6. profile_projects: array of project objects. Use BOTH sources:
   a) PROJECT DOCUMENTS (uploaded files): Each uploaded project file MUST produce at least one entry. Parse title, description, technologies, date from content. If content could not be extracted, infer a title and a brief generic description from the filename.
   b) RESUME: Include ONLY ACADEMIC projects (e.g. course projects, capstone, thesis, class assignments, university/campus projects). EXCLUDE work experience, internships, or professional projects.
   For each project: "title", "description" (1-2 sentences), "technologies" (3-5 items or empty if unknown), "date" (Mon YYYY or "—"). Avoid duplicates.

Return ONLY a JSON object with these exact keys:
- "name": string or null
- "academic_title": string or null
- "technical_skills": array of {"name": string, "percent": number 50-95}
- "soft_skills": array of {"name": string, "percent": number 50-95}
- "courses": array of {"title": string, "term": string, "grade": string, "tags": array of strings}
- "profile_projects": array of {"title": string, "description": string, "technologies": array of strings, "date": string}

Limit technical_skills to 6-8. Limit soft_skills to 3-5. Include all courses from the coursework data. Include all projects from the resume and project documents.
{resume_section}
Coursework (parsed):
{courses_json}
{coursework_text_section}
Projects:
{projects}

Return only the JSON object, no other text."#;

/// Company suggestions. Replace: {coursework}, {projects}, {interests},
/// {role_hint}, {limit}.
pub const SUGGEST_COMPANIES_PROMPT: &str = r#"You are a career advisor. Based on the following student profile, suggest specific real companies (startups, mid-size, and large) that would be a good fit for internships or full-time roles. Focus on companies that hire for the skills and interests shown.

STUDENT PROFILE:

Coursework:
{coursework}

Projects:
{projects}

Interests:
{interests}
{role_hint}

Respond in this exact JSON format only (no other text before or after):
{
  "profile_summary": "One sentence summary of the student's profile and strengths.",
  "companies": [
    {
      "name": "Company Name",
      "reason": "One sentence why this company fits (refer to their coursework/projects/interests).",
      "roles": ["Role 1", "Role 2"]
    }
  ]
}

Suggest exactly {limit} companies. Use real, well-known companies. Be specific and actionable."#;
