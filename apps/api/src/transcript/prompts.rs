// Prompt constants for the generative extraction fallback.
// Replace `{text}` before sending. Both contracts demand a bare JSON
// array — the response parser tolerates nothing else.

/// Course-names-only extraction (mode a).
pub const EXTRACT_COURSES_PROMPT: &str = r#"You are given raw text from a student's course grades or transcript (from any university or portal).
Extract EVERY course name (or course title) listed. Do not skip any. Ignore column headers, grades, dates, and page footers.
Return a JSON array of strings only. Example: ["Data Structures", "Machine Learning", "Web Development"]

Text to parse:
{text}

Return only the JSON array, e.g. ["Course One", "Course Two"]"#;

/// Course + grade + credits triple extraction (mode b).
pub const EXTRACT_COURSE_GRADES_PROMPT: &str = r#"You are given raw text from a student's course grades or transcript (from any university or portal).
The text often has a table with: course name, credits (e.g. 3, 1), and grade (letter like A/B+/C or IP for In Progress).

Extract EVERY course row. For each row return a JSON object with exactly these keys:
- "course": full course name or title (string)
- "credits": credit hours/units for that course (e.g. "3", "1"). Use null if not in the document.
- "grade": the grade for that course (letter like A, B+, A-, or IP). Use null if not in the document.

Return a JSON array of objects only. No other text.
Example: [{"course": "DS512 - Data Engineering", "credits": "3", "grade": "A"}, {"course": "CS521 - Software Project Management", "credits": "3", "grade": "B+"}]

Text to parse:
{text}

Return only the JSON array. Use null only when a value is truly missing."#;
