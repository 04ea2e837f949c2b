// Prompt templates for the generation module.
// Reuses cross-cutting fragments from llm_client::prompts.

/// Full-document reconstruction prompt.
/// Replace: {job_title}, {company}, {template}, {personal}, {projects}, {skills},
/// {section_instructions}, {verbatim_instruction}, {latex_only}
pub const RECONSTRUCTION_PROMPT: &str = r#"Transform this resume for {job_title} at {company}.

TEMPLATE STRUCTURE (use exactly):
{template}

PERSONAL INFO (use EXACTLY - never modify):
{personal}

EXISTING PROJECTS/EXPERIENCE (enhance bullet points only):
{projects}

JOB REQUIREMENTS:
{skills}
{section_instructions}
INSTRUCTIONS:
1. Use EXACT personal details (name, email, phone, education)
2. Add "{job_title}" below the person's name in header
3. Keep existing project/experience structure but enhance bullet points for JD match
4. Ensure AT LEAST 4 bullet points for each project and work experience
5. Add metrics and JD keywords to bullet points (%, numbers, scale)
6. Transform work experience descriptions to match JD domain while keeping original company/job names
7. Use \textbf{} for key terms
8. Follow template structure exactly
9. Return only LaTeX code

{verbatim_instruction}
{latex_only}

Generate resume:"#;

/// Heading opening the per-section directives.
pub const SECTIONS_TO_ADD_HEADING: &str = "## SECTIONS TO ADD";

/// Heading opening the exclusion directive. Followed by `Do NOT include: a, b`.
pub const SECTIONS_TO_SKIP_HEADING: &str = "## SECTIONS TO SKIP";
