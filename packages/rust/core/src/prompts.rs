//! Prompt templates for the four generation steps.
//!
//! Each builder interpolates its source fields verbatim; the model output is
//! stored as-is by the pipeline.

use meetingprep_shared::MeetingInputs;

/// Sections the executive brief prompt always asks for.
pub const BRIEF_SECTIONS: [&str; 4] = [
    "One-page executive summary",
    "Key talking points with data/examples",
    "Anticipated questions and answers",
    "Strategic recommendations and next steps",
];

/// Step 1: company context from the form and the search snippets.
pub fn context_prompt(inputs: &MeetingInputs, search_results: &str) -> String {
    format!(
        "You are a Meeting Context Specialist.\n\
Analyze the context for a meeting with {company}.\n\
Meeting Objective: {objective}\n\
Attendees: {attendees}\n\
Duration: {duration} minutes\n\
Focus Areas: {focus}\n\
\n\
Use the following recent search results:\n\
{search_results}\n\
\n\
Summarize:\n\
- Recent news and press releases\n\
- Key products or services\n\
- Major competitors\n\
\n\
Provide a markdown summary with headings.",
        company = inputs.company_name,
        objective = inputs.meeting_objective,
        attendees = inputs.attendees,
        duration = inputs.meeting_duration,
        focus = inputs.focus_areas,
    )
}

/// Step 2: industry analysis built on the context.
pub fn industry_prompt(company_name: &str, context_analysis: &str) -> String {
    format!(
        "You are an Industry Expert.\n\
Based on the following context: {context_analysis}\n\
\n\
Analyze the industry around {company_name}.\n\
Include:\n\
- Industry trends\n\
- Competitive landscape\n\
- Opportunities and threats\n\
- Market positioning\n\
\n\
Provide markdown output with headings."
    )
}

/// Step 3: time-boxed agenda and strategy.
pub fn strategy_prompt(
    context_analysis: &str,
    industry_insights: &str,
    meeting_duration: u32,
    focus_areas: &str,
) -> String {
    format!(
        "You are a Meeting Strategist.\n\
Based on:\n\
- Context: {context_analysis}\n\
- Industry: {industry_insights}\n\
\n\
Develop a {meeting_duration}-minute meeting agenda:\n\
- Time-boxed items\n\
- Key talking points\n\
- Speakers\n\
- Discussion prompts\n\
- Strategies for focus areas: {focus_areas}\n\
\n\
Output markdown with headings."
    )
}

/// Step 4: the executive brief shown to the user.
pub fn brief_prompt(
    meeting_objective: &str,
    attendees: &str,
    context_analysis: &str,
    industry_insights: &str,
    strategy: &str,
) -> String {
    let [summary, talking_points, questions, recommendations] = BRIEF_SECTIONS;
    format!(
        "You are a Communication Specialist.\n\
Create an executive brief based on the following:\n\
\n\
- Meeting Objective: {meeting_objective}\n\
- Attendees: {attendees}\n\
- Context: {context_analysis}\n\
- Industry: {industry_insights}\n\
- Strategy: {strategy}\n\
\n\
Include:\n\
1. {summary}\n\
2. {talking_points}\n\
3. {questions}\n\
4. {recommendations}\n\
\n\
Format using markdown with H1, H2, H3 headings."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn acme() -> MeetingInputs {
        MeetingInputs::new("Acme", "Q3 review", "Alice (CFO)\nBob (CTO)", 60, "budget")
    }

    #[test]
    fn context_prompt_interpolates_all_inputs() {
        let prompt = context_prompt(&acme(), "Acme launched X");
        assert!(prompt.contains("meeting with Acme."));
        assert!(prompt.contains("Meeting Objective: Q3 review"));
        assert!(prompt.contains("Alice (CFO)\nBob (CTO)"));
        assert!(prompt.contains("Duration: 60 minutes"));
        assert!(prompt.contains("Focus Areas: budget"));
        assert!(prompt.contains("search results:\nAcme launched X"));
    }

    #[test]
    fn context_prompt_with_empty_search() {
        let prompt = context_prompt(&acme(), "");
        assert!(prompt.contains("Use the following recent search results:"));
        assert!(prompt.contains("Major competitors"));
    }

    #[test]
    fn industry_prompt_uses_context_and_company() {
        let prompt = industry_prompt("Acme", "## Context\nStuff");
        assert!(prompt.contains("Based on the following context: ## Context\nStuff"));
        assert!(prompt.contains("industry around Acme."));
        assert!(prompt.contains("Opportunities and threats"));
    }

    #[test]
    fn strategy_prompt_uses_duration_and_focus() {
        let prompt = strategy_prompt("ctx", "ind", 45, "pricing, churn");
        assert!(prompt.contains("45-minute meeting agenda"));
        assert!(prompt.contains("- Context: ctx"));
        assert!(prompt.contains("- Industry: ind"));
        assert!(prompt.contains("Strategies for focus areas: pricing, churn"));
    }

    #[test]
    fn brief_prompt_requires_every_section() {
        let prompt = brief_prompt("Q3 review", "Alice (CFO)", "ctx", "ind", "plan");
        for section in BRIEF_SECTIONS {
            assert!(prompt.contains(section), "missing section: {section}");
        }
        assert!(prompt.contains("- Meeting Objective: Q3 review"));
        assert!(prompt.contains("- Attendees: Alice (CFO)"));
        assert!(prompt.contains("- Strategy: plan"));
        assert!(prompt.contains("H1, H2, H3"));
    }
}
