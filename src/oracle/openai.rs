use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use super::{OracleError, TextOracle};
use crate::config::Config;

/// OpenAI-compatible chat-completions client.
#[derive(Clone)]
pub struct OpenAiOracle {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl OpenAiOracle {
    pub fn from_config(config: &Config) -> Result<Self, OracleError> {
        let client = reqwest::Client::builder()
            .timeout(config.oracle_timeout() + Duration::from_secs(5))
            .build()?;
        Ok(Self {
            client,
            api_key: config.openai_api_key.trim().to_string(),
            base_url: config.openai_base_url.clone(),
            model: config.openai_model.clone(),
        })
    }
}

#[async_trait]
impl TextOracle for OpenAiOracle {
    fn is_available(&self) -> bool {
        !self.api_key.is_empty()
    }

    async fn complete(&self, system: &str, user: &str) -> Result<String, OracleError> {
        if !self.is_available() {
            return Err(OracleError::Unavailable);
        }

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&serde_json::json!({
                "model": self.model,
                "messages": [
                    { "role": "system", "content": system },
                    { "role": "user", "content": user }
                ],
                "temperature": 0.7,
                "max_tokens": 800,
                "response_format": { "type": "json_object" }
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(OracleError::Status { status, body });
        }

        let body: Value = response.json().await?;
        body["choices"][0]["message"]["content"]
            .as_str()
            .filter(|content| !content.trim().is_empty())
            .map(str::to_string)
            .ok_or(OracleError::EmptyReply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unconfigured_oracle_skips_network() {
        let oracle = OpenAiOracle::from_config(&Config::for_tests()).unwrap();
        assert!(!oracle.is_available());
        assert!(matches!(
            oracle.complete("system", "user").await,
            Err(OracleError::Unavailable)
        ));
    }
}
