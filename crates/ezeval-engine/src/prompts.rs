pub const JUDGE_PREAMBLE: &str =
    "You are a helpful assistant that evaluates the quality of the response given by the model.";

pub const JUDGE_FORMAT_INSTRUCTIONS: &str = r#"Return data in raw JSON with this format:
{
  "score": 47,
  "reasoning": "The response is not accurate... because..."
}
"score" must be an integer from 0 to 100. "reasoning" must be a string.
Do not add any other fields.
IT IS VERY IMPORTANT THAT YOU DON'T INCLUDE ANY OTHER TEXT, MARKDOWN, FORMATTING, OR ANYTHING ELSE. JUST THE JSON."#;

/// Builds the judge instruction around the original prompts and the reply.
pub fn judge_prompt(system_prompt: &str, user_prompt: &str, response: &str) -> String {
    format!(
        "{JUDGE_PREAMBLE}\nThe system prompt is: {system_prompt}\nThe user prompt is: {user_prompt}\nThe response is: {response}\n{JUDGE_FORMAT_INSTRUCTIONS}"
    )
}
