#[cfg(test)]
#[path = "gemini_test.rs"]
mod tests;

use std::time::Duration;

use anyhow::bail;
use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;
use serde::Serialize;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::Author;
use crate::domain::models::Backend;
use crate::domain::models::BackendError;
use crate::domain::models::BackendPrompt;

const STOP_REASON: &str = "STOP";
const NO_RESPONSE_TEXT: &str = "No response text found from the AI.";

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Model {
    name: String,
    supported_generation_methods: Vec<String>,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct ModelListResponse {
    models: Vec<Model>,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct ContentPart {
    text: String,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct Content {
    role: String,
    parts: Vec<ContentPart>,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct CompletionRequest {
    contents: Vec<Content>,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ContentPart>,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct EndpointErrorDetail {
    message: String,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct EndpointErrorResponse {
    error: EndpointErrorDetail,
}

/// Extracts the reply text from a decoded completion response. Pure, the
/// same body always yields the same reply. A response with no usable text is
/// resolved to a placeholder reply rather than an error.
fn parse_reply(res: CompletionResponse) -> String {
    if let Some(candidate) = res.candidates.first() {
        if let Some(content) = &candidate.content {
            if let Some(part) = content.parts.first() {
                if !part.text.is_empty() {
                    return part.text.to_string();
                }
            }
        }

        if let Some(reason) = &candidate.finish_reason {
            if reason != STOP_REASON {
                return format!(
                    "[Response Blocked] The content may have violated safety policies. Reason: {reason}"
                );
            }
        }
    }

    return NO_RESPONSE_TEXT.to_string();
}

fn role_for(author: &Author) -> String {
    // The endpoint only knows the two conversation roles. Confab-authored
    // diagnostics never reach the history, so they can't show up here.
    if author == &Author::User {
        return "user".to_string();
    }

    return "model".to_string();
}

pub struct Gemini {
    url: String,
    token: String,
    model: String,
    timeout: String,
}

impl Default for Gemini {
    fn default() -> Gemini {
        return Gemini {
            url: Config::get(ConfigKey::GeminiURL),
            token: Config::get(ConfigKey::GeminiToken),
            model: Config::get(ConfigKey::Model),
            timeout: Config::get(ConfigKey::BackendHealthCheckTimeout),
        };
    }
}

#[async_trait]
impl Backend for Gemini {
    #[allow(clippy::implicit_return)]
    async fn health_check(&self) -> Result<()> {
        if self.url.is_empty() {
            bail!("Gemini URL is not defined");
        }
        if self.token.is_empty() {
            bail!("Gemini token is not defined");
        }

        let url = format!(
            "{url}/v1beta/models/{model}?key={key}",
            url = self.url,
            model = self.model,
            key = self.token
        );

        let res = reqwest::Client::new()
            .get(&url)
            .timeout(Duration::from_millis(self.timeout.parse::<u64>()?))
            .send()
            .await;

        if res.is_err() {
            tracing::error!(error = ?res.unwrap_err(), "Gemini is not reachable");
            bail!("Gemini is not reachable");
        }

        let status = res.unwrap().status().as_u16();
        if status >= 400 {
            tracing::error!(status = status, "Gemini health check failed");
            bail!("Gemini health check failed");
        }

        return Ok(());
    }

    #[allow(clippy::implicit_return)]
    async fn list_models(&self) -> Result<Vec<String>> {
        let res = reqwest::Client::new()
            .get(format!(
                "{url}/v1beta/models?key={key}",
                url = self.url,
                key = self.token
            ))
            .send()
            .await?
            .json::<ModelListResponse>()
            .await?;

        let mut models: Vec<String> = res
            .models
            .iter()
            .filter(|model| {
                return model
                    .supported_generation_methods
                    .contains(&"generateContent".to_string());
            })
            .map(|model| {
                return model.name.to_string();
            })
            .collect();

        models.sort();

        return Ok(models);
    }

    #[allow(clippy::implicit_return)]
    async fn get_completion(&self, prompt: BackendPrompt) -> Result<String, BackendError> {
        let req = CompletionRequest {
            contents: prompt
                .turns
                .iter()
                .map(|turn| {
                    return Content {
                        role: role_for(&turn.author),
                        parts: vec![ContentPart {
                            text: turn.text.to_string(),
                        }],
                    };
                })
                .collect(),
        };

        let res = reqwest::Client::new()
            .post(format!(
                "{url}/v1beta/models/{model}:generateContent?key={key}",
                url = self.url,
                model = self.model,
                key = self.token,
            ))
            .json(&req)
            .send()
            .await
            .map_err(|err| {
                tracing::error!(error = ?err, "completion request to Gemini did not go through");
                return BackendError::Transport(err.to_string());
            })?;

        let status = res.status().as_u16();
        if !res.status().is_success() {
            let body = res.text().await.unwrap_or_default();
            let message = serde_json::from_str::<EndpointErrorResponse>(&body)
                .map(|e| {
                    return e.error.message;
                })
                .unwrap_or_else(|_| {
                    return format!("API Error: Status {status}");
                });

            tracing::error!(status = status, error = %message, "Gemini rejected the completion request");
            return Err(BackendError::Endpoint { status, message });
        }

        let body = res
            .text()
            .await
            .map_err(|err| {
                return BackendError::Transport(err.to_string());
            })?;

        let decoded = serde_json::from_str::<CompletionResponse>(&body).map_err(|err| {
            tracing::error!(error = ?err, "Gemini returned a body that is not a completion response");
            return BackendError::Decode(err.to_string());
        })?;

        return Ok(parse_reply(decoded));
    }
}
