//! Judge model: prompt construction and verdict parsing.
//!
//! Judge output is untrusted text. [`parse_verdict`] accepts the bare JSON the
//! prompt asks for, and also a fenced code block or an object embedded in
//! prose. Anything that still does not yield a well-formed
//! `{ "score": 0..=100, "reasoning": string }` is a [`EvalError::Parse`].

use std::sync::Arc;

use ezeval_core::{EvalError, JudgeVerdict, Message};
use ezeval_llm::ChatProvider;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::prompts::judge_prompt;

const MAX_SCORE: u64 = 100;
const EXCERPT_CHARS: usize = 200;

/// Scores candidate replies with a fixed judge model.
pub struct Judge {
    provider: Arc<dyn ChatProvider>,
    model: String,
}

impl Judge {
    pub fn new(provider: Arc<dyn ChatProvider>, model: impl Into<String>) -> Self {
        Self { provider, model: model.into() }
    }

    /// The judge model identifier.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Asks the judge to score `response` given the original prompts.
    pub async fn judge(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        response: &str,
    ) -> Result<JudgeVerdict, EvalError> {
        info!("JUDGE: Starting evaluation with {}", self.model);

        let instruction = judge_prompt(system_prompt, user_prompt, response);
        let messages = [Message::system(instruction.as_str()), Message::user(instruction.as_str())];
        let completion = self.provider.complete(&self.model, &messages).await?;

        let raw = completion.content.unwrap_or_default();
        debug!("JUDGE: Raw output: {}", raw);

        let verdict = parse_verdict(&raw).inspect_err(|e| warn!("JUDGE: {}", e))?;
        info!("JUDGE: score {}/100", verdict.score);

        Ok(verdict)
    }
}

/// Parses judge output into a verdict, failing loudly on anything else.
pub fn parse_verdict(raw: &str) -> Result<JudgeVerdict, EvalError> {
    let object = locate_object(raw).ok_or_else(|| {
        EvalError::Parse(format!("no JSON object in judge output: {:?}", excerpt(raw)))
    })?;

    let score = match object.get("score") {
        Some(value) => parse_score(value)?,
        None => return Err(EvalError::Parse("missing field `score`".into())),
    };

    let reasoning = match object.get("reasoning") {
        Some(Value::String(s)) => s.clone(),
        Some(other) => {
            return Err(EvalError::Parse(format!("`reasoning` must be a string, got {other}")))
        }
        None => return Err(EvalError::Parse("missing field `reasoning`".into())),
    };

    Ok(JudgeVerdict { score, reasoning })
}

/// Accepts integers and integral floats within `0..=100`.
fn parse_score(value: &Value) -> Result<u8, EvalError> {
    let Value::Number(n) = value else {
        return Err(EvalError::Parse(format!("`score` must be a number, got {value}")));
    };

    let whole = match n.as_u64() {
        Some(v) => Some(v),
        None => n
            .as_f64()
            .filter(|f| f.fract() == 0.0 && *f >= 0.0 && *f <= MAX_SCORE as f64)
            .map(|f| f as u64),
    };

    match whole {
        Some(v) if v <= MAX_SCORE => Ok(v as u8),
        _ => Err(EvalError::Parse(format!("`score` must be an integer in 0..=100, got {n}"))),
    }
}

/// Finds the first JSON object in `text`.
fn locate_object(text: &str) -> Option<Map<String, Value>> {
    let trimmed = text.trim();

    if let Ok(Value::Object(map)) = serde_json::from_str(trimmed) {
        return Some(map);
    }

    if let Some(inner) = strip_code_fence(trimmed) {
        if let Ok(Value::Object(map)) = serde_json::from_str(inner) {
            return Some(map);
        }
    }

    let mut offset = 0;
    while let Some(idx) = trimmed[offset..].find('{') {
        let start = offset + idx;
        let mut stream = serde_json::Deserializer::from_str(&trimmed[start..]).into_iter::<Value>();
        if let Some(Ok(Value::Object(map))) = stream.next() {
            return Some(map);
        }
        offset = start + 1;
    }

    None
}

/// Returns the body of a ```` ```json ```` (or bare ```` ``` ````) block.
fn strip_code_fence(text: &str) -> Option<&str> {
    let start = text.find("```")?;
    let after = &text[start + 3..];
    let body_start = after.find('\n')?;
    let body = &after[body_start + 1..];
    let end = body.find("```")?;
    Some(body[..end].trim())
}

fn excerpt(text: &str) -> String {
    text.chars().take(EXCERPT_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FnProvider;
    use ezeval_llm::ChatCompletion;

    #[test]
    fn parses_bare_json() {
        let verdict = parse_verdict(r#"{"score": 90, "reasoning": "Concise and correct."}"#).unwrap();
        assert_eq!(verdict, JudgeVerdict { score: 90, reasoning: "Concise and correct.".into() });
    }

    #[test]
    fn parses_fenced_block() {
        let raw = "```json\n{\"score\": 47, \"reasoning\": \"Partly wrong.\"}\n```";
        assert_eq!(parse_verdict(raw).unwrap().score, 47);
    }

    #[test]
    fn parses_object_wrapped_in_prose() {
        let raw = "Here is my evaluation {not json}: {\"score\": 12, \"reasoning\": \"Off topic.\"} Hope it helps.";
        let verdict = parse_verdict(raw).unwrap();
        assert_eq!(verdict.score, 12);
        assert_eq!(verdict.reasoning, "Off topic.");
    }

    #[test]
    fn accepts_integral_float_and_bounds() {
        assert_eq!(parse_verdict(r#"{"score": 100.0, "reasoning": ""}"#).unwrap().score, 100);
        assert_eq!(parse_verdict(r#"{"score": 0, "reasoning": "empty"}"#).unwrap().score, 0);
    }

    #[test]
    fn ignores_extra_fields() {
        let verdict = parse_verdict(r#"{"score": 5, "reasoning": "r", "confidence": 0.9}"#).unwrap();
        assert_eq!(verdict.score, 5);
    }

    #[test]
    fn rejects_out_of_range_scores() {
        for raw in [
            r#"{"score": 101, "reasoning": "r"}"#,
            r#"{"score": -1, "reasoning": "r"}"#,
            r#"{"score": 250.0, "reasoning": "r"}"#,
            r#"{"score": 87.5, "reasoning": "r"}"#,
        ] {
            assert!(matches!(parse_verdict(raw), Err(EvalError::Parse(_))), "{raw}");
        }
    }

    #[test]
    fn rejects_missing_or_mistyped_fields() {
        let err = parse_verdict(r#"{"score": 50}"#).unwrap_err();
        assert_eq!(err, EvalError::Parse("missing field `reasoning`".into()));

        let err = parse_verdict(r#"{"reasoning": "r"}"#).unwrap_err();
        assert_eq!(err, EvalError::Parse("missing field `score`".into()));

        assert!(matches!(parse_verdict(r#"{"score": "90", "reasoning": "r"}"#), Err(EvalError::Parse(_))));
        assert!(matches!(parse_verdict(r#"{"score": 90, "reasoning": 3}"#), Err(EvalError::Parse(_))));
    }

    #[test]
    fn rejects_text_without_object() {
        assert!(matches!(parse_verdict("I'd give it a 7/10."), Err(EvalError::Parse(_))));
        assert!(matches!(parse_verdict(""), Err(EvalError::Parse(_))));
        assert!(matches!(parse_verdict("[90, \"fine\"]"), Err(EvalError::Parse(_))));
    }

    #[test]
    fn prompt_restates_inputs_verbatim() {
        let prompt = judge_prompt("You are terse.", "Say hi.", "Hi.");
        assert!(prompt.contains("The system prompt is: You are terse."));
        assert!(prompt.contains("The user prompt is: Say hi."));
        assert!(prompt.contains("The response is: Hi."));
        assert!(prompt.contains("\"score\""));
        assert!(prompt.contains("\"reasoning\""));
        assert!(prompt.contains("JUST THE JSON"));
    }

    #[tokio::test]
    async fn sends_instruction_as_system_and_user() {
        let provider = FnProvider::new(|model, messages| {
            assert_eq!(model, "judge-model");
            assert_eq!(messages.len(), 2);
            assert_eq!(messages[0].content, messages[1].content);
            assert!(messages[0].content.contains("The response is: Hi."));
            Ok(ChatCompletion {
                content: Some(r#"{"score": 90, "reasoning": "Concise and correct."}"#.into()),
                ..Default::default()
            })
        });

        let judge = Judge::new(Arc::new(provider), "judge-model");
        let verdict = judge.judge("You are terse.", "Say hi.", "Hi.").await.unwrap();
        assert_eq!(verdict.score, 90);
    }

    #[tokio::test]
    async fn empty_judge_reply_is_parse_error() {
        let provider = FnProvider::new(|_, _| Ok(ChatCompletion::default()));
        let judge = Judge::new(Arc::new(provider), "judge-model");
        let err = judge.judge("s", "u", "r").await.unwrap_err();
        assert!(matches!(err, EvalError::Parse(_)));
    }
}
