// LLM prompt constants for resume analysis.

/// System prompt for resume analysis — enforces JSON-only output.
pub const RESUME_ANALYSIS_SYSTEM: &str =
    "You are an experienced technical recruiter and career coach. \
    Analyze a candidate's resume and extract structured information. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Resume analysis prompt template. Replace `{resume_text}` before sending.
pub const RESUME_ANALYSIS_PROMPT_TEMPLATE: &str = r#"Analyze the following resume.

Return a JSON object with this EXACT schema (no extra fields):
{
  "candidate_name": "Jane Doe",
  "summary": "Two or three sentences describing the candidate's profile.",
  "skills": ["Rust", "PostgreSQL"],
  "experience_highlights": ["Led migration of billing service to Rust, cutting p99 latency by 40%"],
  "education": ["B.Sc. Computer Science, University of Example (2018)"],
  "strengths": ["Strong systems programming background"],
  "improvement_areas": ["No quantified impact for the most recent role"]
}

Rules:
- Use null for candidate_name if the resume does not state it.
- Only list skills, experience and education that appear in the resume text.
- Keep each list item to a single sentence.

Resume:
"""
{resume_text}
""""#;
