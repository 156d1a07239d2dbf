//! Prompts for the extraction fallback and lifestyle advice.

/// Sentinel the model is told to answer with when no drug is present.
pub const NONE_SENTINEL: &str = "none";

/// System prompt for drug-name extraction.
pub const EXTRACTION_SYSTEM_PROMPT: &str = r#"You are a pharmacy assistant that reads prescriptions and lists the medicines they mention.

Rules:
- Answer with generic or brand drug names only, separated by commas.
- Do not include doses, strengths, frequencies or instructions.
- Do not explain your answer.
- If the text mentions no medicine at all, answer with the single word: none"#;

/// User prompt for drug-name extraction.
pub fn make_extraction_prompt(text: &str) -> String {
    format!(
        r#"List every medicine mentioned in this prescription text:

"{}"

Return a comma-separated list of drug names, or "{}" if there are none."#,
        text, NONE_SENTINEL
    )
}

/// System prompt for lifestyle advice.
pub const LIFESTYLE_SYSTEM_PROMPT: &str =
    "You are a medical assistant providing pharmacological lifestyle advice. Return only JSON.";

/// User prompt for lifestyle advice over a set of drugs.
pub fn make_lifestyle_prompt(drugs: &[String]) -> String {
    format!(
        r#"Analyze the following drugs and provide food and lifestyle recommendations (what to eat vs what to avoid/monitor).
Drugs: {}

Return ONLY a JSON object of the form {{"warnings": [ ... ]}} where each element has the structure:
{{
    "type": "food" | "alcohol" | "supplement" | "lifestyle",
    "warning": "Short descriptive title (e.g., 'Avoid Grapefruit')",
    "impact": "Brief explanation of the interaction or benefit",
    "action": "avoid" | "eat" | "monitor"
}}

Be specific for each drug. Focus on clinically significant interactions.
If a drug has no specific lifestyle interactions, leave it out."#,
        drugs.join(", ")
    )
}
