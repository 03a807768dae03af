use mediascreen_common::Entity;

const INSTRUCTIONS: &str = r#"You are a financial crime analyst. Analyze the article and:

1. Summarize it in 5-6 bullet points.
2. Classify it as "Negative" (real crime-related info about the entity) or "False Hit" (irrelevant or misleading).
3. Explain your reasoning.

IMPORTANT: Return ONLY valid JSON with double quotes and no extra explanation.
Use this format:
{
  "Summary": ["...", "...", "..."],
  "IsNegative": true or false,
  "Reason": "your reason"
}"#;

/// Classification prompt for one entity and its (already truncated) article text.
pub fn build_prompt(entity: &Entity, article_text: &str) -> String {
    format!("{INSTRUCTIONS}\n\nEntity: {entity}\nArticle:\n{article_text}\n")
}
