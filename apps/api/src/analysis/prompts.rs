// Instruction templates for the analysis operations.
// Every template carries a `{subject}` placeholder. Structured templates get
// the rendered output schema appended by the prompt builder; they must not
// spell the schema out themselves.

/// General-purpose analysis used by `Analyzer::perform_analysis`.
pub const GENERAL_ANALYSIS_PROMPT: &str = r#"Analyze the following text and provide clear, actionable feedback for a job seeker.

TEXT:
{subject}"#;

/// Full resume review with a score, section feedback and suggested roles.
pub const RESUME_FEEDBACK_PROMPT: &str = r#"Analyze the following resume and provide structured feedback.

RESUME:
{subject}

Provide detailed, actionable feedback that would help a job seeker improve their resume.
Scores and match percentages are numbers from 0 to 100."#;

/// Resume analysis feeding the career-advisor chat.
pub const CAREER_INSIGHTS_PROMPT: &str = r#"Analyze the following resume and identify the candidate's skills, matching jobs and learning opportunities.

RESUME:
{subject}

Focus on providing actionable insights that would help a fresh graduate find suitable job opportunities.
For each job match, give a short identifier, the role title, a plausible company type, a match percentage from 0 to 100 and the reasons for the match."#;

/// Free-form resume summary for the chat view.
pub const RESUME_SUMMARY_PROMPT: &str = r#"Analyze the following resume and provide structured feedback:

{subject}

Focus on identifying key skills, areas for improvement, and potential job matches."#;

/// Learning guide for a single skill.
pub const LEARNING_CONTENT_PROMPT: &str = r#"I want to learn about {subject} for a job in tech. Please provide:

1. A brief introduction to {subject} (what it is and why it's important)
2. Key concepts I need to understand
3. A learning roadmap (beginner to advanced)
4. Recommended resources (courses, books, websites)
5. A simple example or exercise to get started

Format your response with clear headings and bullet points where appropriate."#;
