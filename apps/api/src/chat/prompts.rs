// Prompt constants for the career chat assistant.
// Reuses cross-cutting fragments from llm_client::prompts.

/// Persona for every chat answer. `{grounding_instruction}` is filled in by the generator.
pub const CHAT_SYSTEM_TEMPLATE: &str = "You are a friendly, practical career advisor. \
    You help people explore occupations that fit their RIASEC interest profile \
    (Realistic, Investigative, Artistic, Social, Enterprising, Conventional). \
    {grounding_instruction} \
    Keep answers concise and concrete. Do not claim to know the user beyond their profile.";

/// User turn template. Replace: {profile_summary}, {passages}, {question}
pub const CHAT_USER_TEMPLATE: &str = "USER INTEREST PROFILE (scores on a 1-5 scale):
{profile_summary}

REFERENCE PASSAGES (most relevant first):
{passages}

QUESTION:
{question}";

/// Substituted for the passage block when retrieval found nothing.
pub const NO_PASSAGES: &str = "(no reference passages matched this question)";
