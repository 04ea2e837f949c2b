// Prompt templates for the section extractors.
// Replies are parsed by `## HEADING`; keep these headings in sync with the
// constants in jd_parser.rs, personal.rs and projects.rs.

/// Job requirements prompt. Replace `{jd_text}` and `{heading_format}` before sending.
pub const JOB_REQUIREMENTS_PROMPT: &str = r#"Analyze this job description and extract EVERY skill mentioned.

JOB DESCRIPTION:
{jd_text}

Provide structured extraction in this EXACT format:

## JOB TITLE
[Extract the exact job title: e.g., "Machine Learning Engineer", "Data Scientist", "AI Engineer"]

## COMPANY NAME
[Extract the company name if mentioned, else "Unknown Company"]

## REQUIRED TECHNICAL SKILLS
[List EVERY technical skill, tool, framework, library, programming language mentioned]
- Include variations (e.g., "Python", "ML", "Machine Learning", "TensorFlow", "PyTorch")
- Include both acronyms and full forms
- Include specific versions if mentioned (e.g., "Python 3.x", "AWS")

## REQUIRED SOFT SKILLS
[List ALL soft skills mentioned: communication, leadership, teamwork, problem-solving, etc.]

## REQUIRED CERTIFICATIONS
[List any certifications mentioned]

## EXPERIENCE REQUIREMENTS
[Years of experience, specific domains, industry experience]

## PRIORITY KEYWORDS FOR ATS
[List 30-40 most critical keywords that MUST appear in resume for ATS]
- Include job title variations
- Include all technical skills
- Include industry terms
- Include action verbs from JD

{heading_format}

Be exhaustive - missing a skill could cause ATS rejection."#;

/// Personal and education prompt. Replace `{resume_text}` and `{verbatim_instruction}`.
pub const PERSONAL_PROMPT: &str = r#"Extract the candidate's ACTUAL personal information and education details from this resume.

RESUME TEXT:
{resume_text}

Provide structured extraction in this EXACT format:

## PERSONAL INFORMATION
- Full Name: [Exact name from resume - DO NOT CHANGE OR MODIFY]
- Phone: [Phone number - EXACTLY as written]
- Email: [Email address - EXACTLY as written]
- LinkedIn: [LinkedIn URL if present, else "Not provided"]
- GitHub: [GitHub URL if present, else "Not provided"]
- Location: [City, State/Country if present, else "Not provided"]
- Portfolio/Website: [If present, else "Not provided"]

## EDUCATION
For EACH degree/education entry, extract EXACTLY as written:
### [Degree] in [Major/Field]
- Institution: [University/College name - EXACTLY as written]
- Duration: [Start date - End date OR Expected graduation - EXACTLY as written]
- GPA: [If mentioned, else "Not provided"]
- Relevant Coursework: [If mentioned]
- Honors/Awards: [If mentioned]
- Activities: [If mentioned]

{verbatim_instruction}"#;

/// Projects and experience prompt. Replace `{resume_text}`.
pub const PROJECTS_PROMPT: &str = r#"Extract ALL projects and work experiences from this resume.

RESUME TEXT:
{resume_text}

Provide structured extraction:

## WORK EXPERIENCES
For each work experience, extract:
- Company Name
- Job Title
- Duration
- Key Responsibilities (bullet points)
- Technologies Used
- Achievements/Impact

Format as:
### [Company] | [Job Title] | [Duration]
- Responsibility 1
- Responsibility 2
- Technologies: [list]

## PROJECTS
For each project, extract:
- Project Name
- Brief Description
- Technologies Used
- Key Features/Functionality
- Outcomes/Results

Format as:
### [Project Name]
- Description: [brief description]
- Technologies: [list]
- Feature 1
- Feature 2
- Outcome: [result]

## CORE TECHNICAL SKILLS
[List all technical skills candidate currently has]

Copy company names, job titles and durations exactly as written. Be comprehensive - extract every detail."#;
