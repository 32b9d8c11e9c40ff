//! Follow-up questions for the clarification path.
//!
//! Generation talks to the model; parsing is a pure function over the raw
//! model text so it can be tested without the network.

use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use mdt_agent::{ChatCompletion, ChatMessage, ModelConfig};
use regex::Regex;
use tracing::{debug, warn};

/// Fewest questions ever returned.
pub const MIN_QUESTIONS: usize = 3;

/// Most questions ever returned.
pub const MAX_QUESTIONS: usize = 5;

/// Used when the model answers with something that is not a question list.
pub const DEFAULT_FOLLOW_UP_QUESTIONS: [&str; MAX_QUESTIONS] = [
    "What specific symptoms are you experiencing?",
    "Do you have any recent test results or lab work?",
    "Which part of your health are you most concerned about?",
    "Are you taking any medications currently?",
    "What prompted you to seek medical advice today?",
];

static JSON_ARRAY_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\[.*\]").expect("Invalid JSON array regex"));

/// Outcome of parsing a model answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FollowUpParse {
    /// A JSON array of strings was found (blank entries dropped).
    Questions(Vec<String>),
    /// No usable array in the answer.
    Unparsable,
}

/// Parse the model's answer into questions.
///
/// Accepts a bare JSON array or one wrapped in prose or a code fence.
/// Non-string elements are ignored.
pub fn parse_follow_up_questions(raw: &str) -> FollowUpParse {
    let trimmed = raw.trim();
    let candidate = if trimmed.starts_with('[') {
        Some(trimmed)
    } else {
        JSON_ARRAY_REGEX.find(trimmed).map(|m| m.as_str())
    };

    let Some(candidate) = candidate else {
        return FollowUpParse::Unparsable;
    };

    match serde_json::from_str::<Vec<serde_json::Value>>(candidate) {
        Ok(values) => FollowUpParse::Questions(
            values
                .into_iter()
                .filter_map(|v| v.as_str().map(|s| s.trim().to_string()))
                .filter(|s| !s.is_empty())
                .collect(),
        ),
        Err(_) => FollowUpParse::Unparsable,
    }
}

/// Turn a parse outcome into 3 to 5 questions.
///
/// Fewer than three parsed questions counts as unparsable.
pub fn questions_from_parse(parse: FollowUpParse) -> Vec<String> {
    match parse {
        FollowUpParse::Questions(mut questions) if questions.len() >= MIN_QUESTIONS => {
            questions.truncate(MAX_QUESTIONS);
            questions
        }
        _ => DEFAULT_FOLLOW_UP_QUESTIONS.iter().map(|q| q.to_string()).collect(),
    }
}

/// Clamp a configured fallback list to 3 to 5 entries, padding from the defaults.
pub fn clamp_fallback(fallback: &[String]) -> Vec<String> {
    let mut questions: Vec<String> = fallback
        .iter()
        .map(|q| q.trim())
        .filter(|q| !q.is_empty())
        .take(MAX_QUESTIONS)
        .map(str::to_string)
        .collect();

    for default in DEFAULT_FOLLOW_UP_QUESTIONS {
        if questions.len() >= MIN_QUESTIONS {
            break;
        }
        if !questions.iter().any(|q| q == default) {
            questions.push(default.to_string());
        }
    }
    questions
}

/// Produces raw follow-up text for a user input.
#[async_trait]
pub trait QuestionGenerator: Send + Sync {
    /// Ask for follow-up questions given the input and the available specialists.
    async fn generate(&self, user_input: &str, specialists: &[String]) -> mdt_agent::Result<String>;
}

/// Asks the completion model for a JSON array of questions.
pub struct LlmQuestionGenerator {
    client: Arc<dyn ChatCompletion>,
    config: ModelConfig,
}

impl LlmQuestionGenerator {
    pub fn new(client: Arc<dyn ChatCompletion>, model: ModelConfig) -> Self {
        Self {
            client,
            config: model.with_temperature(0.3).with_max_tokens(300),
        }
    }
}

#[async_trait]
impl QuestionGenerator for LlmQuestionGenerator {
    async fn generate(&self, user_input: &str, specialists: &[String]) -> mdt_agent::Result<String> {
        let prompt = format!(
            "Based on the user's input: \"{user_input}\"\n\n\
             And the available medical specialists: {}\n\n\
             Generate 3-5 specific follow-up questions that would help clarify which \
             medical domain the user needs help with. Focus on symptoms, test results, \
             or specific health concerns that would indicate which specialist is most \
             relevant.\n\nFormat as a JSON array of strings.",
            specialists.join(", ")
        );
        let messages = vec![
            ChatMessage::system(
                "You are a medical triage assistant helping to route patients to appropriate specialists.",
            ),
            ChatMessage::user(prompt),
        ];
        self.client.complete(&self.config, messages).await
    }
}

/// Follow-up questions for a clarification result, always 3 to 5 entries.
///
/// A failed or missing generator yields the configured `fallback` list.
pub async fn follow_up_questions(
    generator: Option<&dyn QuestionGenerator>,
    user_input: &str,
    specialists: &[String],
    fallback: &[String],
) -> Vec<String> {
    let Some(generator) = generator else {
        return clamp_fallback(fallback);
    };

    match generator.generate(user_input, specialists).await {
        Ok(raw) => {
            let parse = parse_follow_up_questions(&raw);
            if parse == FollowUpParse::Unparsable {
                warn!("Follow-up answer was not a JSON array, using default questions");
            }
            let questions = questions_from_parse(parse);
            debug!(count = questions.len(), "Generated follow-up questions");
            questions
        }
        Err(err) => {
            warn!(error = %err, "Follow-up generation failed, using fallback questions");
            clamp_fallback(fallback)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mdt_agent::AgentError;

    struct FixedGenerator(Option<String>);

    #[async_trait]
    impl QuestionGenerator for FixedGenerator {
        async fn generate(&self, _user_input: &str, _specialists: &[String]) -> mdt_agent::Result<String> {
            self.0
                .clone()
                .ok_or_else(|| AgentError::Transport("connection reset".into()))
        }
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_bare_array() {
        assert_eq!(
            parse_follow_up_questions(r#"["Any chest pain?", "Any palpitations?"]"#),
            FollowUpParse::Questions(strings(&["Any chest pain?", "Any palpitations?"]))
        );
    }

    #[test]
    fn test_parse_fenced_array() {
        let raw = "Here you go:\n```json\n[\"A?\", 3, \"  \", \"B?\"]\n```";
        assert_eq!(
            parse_follow_up_questions(raw),
            FollowUpParse::Questions(strings(&["A?", "B?"]))
        );
    }

    #[test]
    fn test_parse_garbage() {
        assert_eq!(parse_follow_up_questions("no idea"), FollowUpParse::Unparsable);
        assert_eq!(parse_follow_up_questions("[not json]"), FollowUpParse::Unparsable);
        assert_eq!(parse_follow_up_questions(r#"{"q": "none"}"#), FollowUpParse::Unparsable);
    }

    #[test]
    fn test_questions_from_parse_bounds() {
        let many = FollowUpParse::Questions(strings(&["1", "2", "3", "4", "5", "6", "7"]));
        assert_eq!(questions_from_parse(many).len(), 5);

        let few = FollowUpParse::Questions(strings(&["1", "2"]));
        assert_eq!(questions_from_parse(few), strings(&DEFAULT_FOLLOW_UP_QUESTIONS));

        assert_eq!(questions_from_parse(FollowUpParse::Unparsable).len(), 5);
    }

    #[test]
    fn test_clamp_fallback() {
        assert_eq!(clamp_fallback(&[]).len(), 3);
        assert_eq!(clamp_fallback(&strings(&["Only one?"]))[0], "Only one?");
        assert_eq!(clamp_fallback(&strings(&["Only one?"])).len(), 3);
        assert_eq!(clamp_fallback(&strings(&["1", "2", "3", "4", "5", "6"])).len(), 5);
    }

    #[tokio::test]
    async fn test_follow_up_questions_paths() {
        let fallback = strings(&["F1?", "F2?", "F3?"]);

        let ok = FixedGenerator(Some(r#"["Q1?", "Q2?", "Q3?", "Q4?"]"#.into()));
        let questions = follow_up_questions(Some(&ok as &dyn QuestionGenerator), "hi", &[], &fallback).await;
        assert_eq!(questions, strings(&["Q1?", "Q2?", "Q3?", "Q4?"]));

        let garbage = FixedGenerator(Some("sorry".into()));
        let questions = follow_up_questions(Some(&garbage as &dyn QuestionGenerator), "hi", &[], &fallback).await;
        assert_eq!(questions.len(), 5);

        let failing = FixedGenerator(None);
        let questions = follow_up_questions(Some(&failing as &dyn QuestionGenerator), "hi", &[], &fallback).await;
        assert_eq!(questions, fallback);

        let questions = follow_up_questions(None, "hi", &[], &fallback).await;
        assert_eq!(questions, fallback);
    }
}
