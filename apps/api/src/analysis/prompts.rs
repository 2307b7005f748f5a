// All LLM prompt constants for the analysis module.

/// Secondary resume gate. Replace `{resume_excerpt}` (first ~2000 chars)
/// before sending. The reply is checked for a "no".
pub const RESUME_CHECK_PROMPT_TEMPLATE: &str = r#"Does the following text appear to be a resume (CV)?
Answer only with "yes" or "no".

Text:
{resume_excerpt}"#;

/// Explicit-JD match prompt. Replace `{resume_text}` and `{jd_text}`.
pub const JD_MATCH_PROMPT_TEMPLATE: &str = r#"Compare this resume against the job description.

Resume:
{resume_text}

Job Description:
{jd_text}

Respond ONLY in JSON with:
{
  "match": <percentage number between 0 and 100>,
  "missing_keywords": [ "keyword1", "keyword2", ... ],
  "summary": "short summary"
}"#;

/// Auto/ATS prompt — the resume's own top section stands in for the JD.
/// Replace `{top_section}` and `{resume_text}`.
pub const ATS_PROMPT_TEMPLATE: &str = r#"You are an ATS system. Analyze the following resume.
Use the top section (profile/objective/summary) as the job focus.

Resume Top Section:
{top_section}

Full Resume:
{resume_text}

Respond ONLY in JSON with:
{
  "match": <percentage number between 0 and 100>,
  "strengths": ["skill1", "skill2", ...],
  "weaknesses": ["area1", "area2", ...],
  "summary": "short professional summary"
}"#;

/// Skill suggestion prompt. Replace `{role}`.
pub const SUGGEST_SKILLS_PROMPT_TEMPLATE: &str = r#"The job role is: "{role}". Suggest 5-7 technical skills, tools, or frameworks. Respond ONLY as a JSON array of strings."#;
