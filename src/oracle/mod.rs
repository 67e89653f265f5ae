//! Optional text oracle: a chat-completion model asked for JSON replies.

mod openai;
pub mod prompts;

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use serde_json::Value;

pub use openai::OpenAiOracle;

#[derive(Debug, thiserror::Error)]
pub enum OracleError {
    #[error("oracle is not configured")]
    Unavailable,
    #[error("oracle request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("oracle returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("oracle reply had no content")]
    EmptyReply,
    #[error("oracle reply is not valid JSON: {0}")]
    Malformed(String),
    #[error("oracle call timed out")]
    Timeout,
}

#[async_trait]
pub trait TextOracle: Send + Sync {
    /// Cheap, call-free check that a credential is configured.
    fn is_available(&self) -> bool;

    /// Sends one system + user prompt pair and returns the raw reply text.
    async fn complete(&self, system: &str, user: &str) -> Result<String, OracleError>;
}

static RE_CODE_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```(?:json)?\s*(\{.*?\})\s*```").unwrap());

/// Pulls the first JSON object out of a model reply.
///
/// Tries the whole reply, then a fenced code block, then the outermost
/// `{ ... }` span.
pub fn extract_json(reply: &str) -> Result<Value, OracleError> {
    let trimmed = reply.trim();
    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        return Ok(value);
    }

    if let Some(block) = RE_CODE_BLOCK.captures(trimmed).and_then(|c| c.get(1)) {
        if let Ok(value) = serde_json::from_str::<Value>(block.as_str()) {
            return Ok(value);
        }
    }

    if let (Some(start), Some(end)) = (trimmed.find('{'), trimmed.rfind('}')) {
        if start < end {
            if let Ok(value) = serde_json::from_str::<Value>(&trimmed[start..=end]) {
                return Ok(value);
            }
        }
    }

    let preview: String = trimmed.chars().take(80).collect();
    Err(OracleError::Malformed(preview))
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::time::Duration;

    use super::*;

    pub enum Scripted {
        Reply(String),
        Fail,
        Hang,
    }

    /// Oracle that plays back a fixed list of outcomes, one per call.
    pub struct ScriptedOracle {
        script: Mutex<VecDeque<Scripted>>,
        pub calls: Mutex<Vec<String>>,
    }

    impl ScriptedOracle {
        pub fn new(script: Vec<Scripted>) -> Self {
            Self {
                script: Mutex::new(script.into()),
                calls: Mutex::new(Vec::new()),
            }
        }

        pub fn replying(reply: &str) -> Self {
            Self::new(vec![Scripted::Reply(reply.to_string())])
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl TextOracle for ScriptedOracle {
        fn is_available(&self) -> bool {
            true
        }

        async fn complete(&self, _system: &str, user: &str) -> Result<String, OracleError> {
            self.calls.lock().unwrap().push(user.to_string());
            let next = self.script.lock().unwrap().pop_front();
            match next {
                Some(Scripted::Reply(reply)) => Ok(reply),
                Some(Scripted::Hang) => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Err(OracleError::Timeout)
                }
                Some(Scripted::Fail) | None => Err(OracleError::Status {
                    status: 500,
                    body: "scripted failure".into(),
                }),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_plain_json() {
        let value = extract_json(r#"  {"primary_emotion": "calm"} "#).unwrap();
        assert_eq!(value["primary_emotion"], "calm");
    }

    #[test]
    fn test_extract_from_code_block() {
        let reply = "Here you go:\n```json\n{\"mental_state\": \"Calm\"}\n```\nHope it helps";
        let value = extract_json(reply).unwrap();
        assert_eq!(value["mental_state"], "Calm");
    }

    #[test]
    fn test_extract_from_surrounding_prose() {
        let reply = "Sure! {\"dominant_themes\": [\"Freedom\"]} done";
        let value = extract_json(reply).unwrap();
        assert_eq!(value["dominant_themes"][0], "Freedom");
    }

    #[test]
    fn test_extract_rejects_garbage() {
        assert!(matches!(
            extract_json("I cannot help with that"),
            Err(OracleError::Malformed(_))
        ));
        assert!(extract_json("} nope {").is_err());
    }
}
