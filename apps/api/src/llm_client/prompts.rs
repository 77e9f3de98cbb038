// Cross-cutting prompt fragments.
// Each service that calls the LLM keeps its own prompts.rs alongside it.

/// Grounding rule shared by every prompt that includes retrieved passages.
pub const GROUNDING_INSTRUCTION: &str = "\
    Base every factual statement about an occupation on the reference passages provided. \
    Do NOT invent salaries, statistics, requirements or job duties. \
    If the passages do not cover the question, say so plainly and answer only \
    from the user's interest profile.";
