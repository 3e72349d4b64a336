//! HTTP client for an OpenAI-compatible chat-completion service.

use std::time::Duration;

use arbscout_core::AppConfig;
use reqwest::{Client, Url};

use crate::error::AdvisorError;
use crate::types::{ChatMessage, ChatRequest, ChatResponse};

/// Client for the advisory text service.
///
/// Use [`AdvisoryClient::from_config`] in the binary or
/// [`AdvisoryClient::with_base_url`] to point at a mock server in tests.
#[derive(Debug, Clone)]
pub struct AdvisoryClient {
    client: Client,
    base_url: Url,
    health_timeout: Duration,
}

impl AdvisoryClient {
    /// # Errors
    ///
    /// Same as [`AdvisoryClient::with_base_url`].
    pub fn from_config(config: &AppConfig) -> Result<Self, AdvisorError> {
        Self::with_base_url(
            &config.llm_base_url,
            config.llm_timeout(),
            config.llm_health_timeout(),
        )
    }

    /// # Errors
    ///
    /// Returns [`AdvisorError::Http`] if the `reqwest::Client` cannot be
    /// built, or [`AdvisorError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn with_base_url(
        base_url: &str,
        timeout: Duration,
        health_timeout: Duration,
    ) -> Result<Self, AdvisorError> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(5))
            .user_agent("arbscout/0.1 (advisory)")
            .build()?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| AdvisorError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            base_url,
            health_timeout,
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Sends `messages` to `POST /v1/chat/completions` and returns the first
    /// choice's content.
    ///
    /// # Errors
    ///
    /// - [`AdvisorError::Http`] on network failure.
    /// - [`AdvisorError::UnexpectedStatus`] on a non-2xx response.
    /// - [`AdvisorError::Malformed`] if the body lacks
    ///   `choices[0].message.content`.
    pub async fn chat_completion(
        &self,
        messages: &[ChatMessage],
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String, AdvisorError> {
        let url = self.endpoint("v1/chat/completions")?;
        let request = ChatRequest {
            messages,
            temperature,
            max_tokens,
        };

        let response = self.client.post(url).json(&request).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AdvisorError::UnexpectedStatus {
                status: status.as_u16(),
            });
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| AdvisorError::Malformed(e.to_string()))?;
        body.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| AdvisorError::Malformed("no choices[0].message.content".to_string()))
    }

    /// Like [`AdvisoryClient::chat_completion`] but maps every failure to an
    /// empty string, logging it at `warn`.
    pub async fn query(&self, system: &str, prompt: &str, temperature: f32, max_tokens: u32) -> String {
        let mut messages = Vec::with_capacity(2);
        if !system.is_empty() {
            messages.push(ChatMessage::system(system));
        }
        messages.push(ChatMessage::user(prompt));

        match self.chat_completion(&messages, temperature, max_tokens).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(error = %e, "advisory request failed");
                String::new()
            }
        }
    }

    /// `GET /health` returned 200 within the health timeout.
    pub async fn is_available(&self) -> bool {
        let Ok(url) = self.endpoint("health") else {
            return false;
        };
        match self
            .client
            .get(url)
            .timeout(self.health_timeout)
            .send()
            .await
        {
            Ok(resp) => resp.status() == reqwest::StatusCode::OK,
            Err(e) => {
                tracing::debug!(error = %e, "advisory health probe failed");
                false
            }
        }
    }

    fn endpoint(&self, path: &str) -> Result<Url, AdvisorError> {
        self.base_url
            .join(path)
            .map_err(|e| AdvisorError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: e.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_is_normalised_with_single_trailing_slash() {
        let client = AdvisoryClient::with_base_url(
            "http://localhost:5000//",
            Duration::from_secs(1),
            Duration::from_secs(1),
        )
        .unwrap();
        assert_eq!(client.base_url().as_str(), "http://localhost:5000/");
        assert_eq!(
            client.endpoint("v1/chat/completions").unwrap().as_str(),
            "http://localhost:5000/v1/chat/completions"
        );
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let err = AdvisoryClient::with_base_url(
            "not a url",
            Duration::from_secs(1),
            Duration::from_secs(1),
        )
        .unwrap_err();
        assert!(matches!(err, AdvisorError::InvalidBaseUrl { .. }));
    }
}
