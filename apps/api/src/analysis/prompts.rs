// Prompt templates for the analysis module.

/// Domain compatibility prompt.
/// Replace: {resume_text}, {job_title}, {jd_text}, {heading_format}
pub const DOMAIN_COMPATIBILITY_PROMPT: &str = r#"Analyze the domain compatibility between this resume and job description.

RESUME TEXT:
{resume_text}

JOB DESCRIPTION:
{job_title}
{jd_text}

Provide analysis in this EXACT format:

## DOMAIN COMPATIBILITY
[Compatible/Partially Compatible/Incompatible]

## RESUME DOMAIN
[Primary domain/field of the resume: e.g., "Machine Learning", "Web Development", "Data Science"]

## JD DOMAIN
[Primary domain/field of the job: e.g., "Software Engineering", "AI/ML", "Backend Development"]

## COMPATIBILITY ANALYSIS
[Brief explanation of why they are compatible/incompatible]

## RECOMMENDATION
[Should proceed with reconstruction or ask user confirmation]

{heading_format}"#;
