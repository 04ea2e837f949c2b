// Section extractors: job requirements, personal/education, projects/experience.
// Each sends one fixed-structure prompt and parses the `## HEADING` reply.
// All three degrade to an empty, well-typed record instead of failing.

pub mod handlers;
pub mod headings;
pub mod jd_parser;
pub mod personal;
pub mod projects;
pub mod prompts;
