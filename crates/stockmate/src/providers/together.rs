//! HTTP client for OpenAI-style completion endpoints (Together API)

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::{CompletionConfig, DecodingParams};
use crate::error::{Error, Result};

use super::completion::{CompletionOutcome, CompletionProvider};

/// Completion API client
///
/// One attempt per call: no retries, and no timeout unless one is configured.
pub struct CompletionClient {
    /// HTTP client
    client: Client,
    /// Configuration
    config: CompletionConfig,
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Deserialize)]
struct CompletionChoice {
    text: String,
}

impl CompletionClient {
    /// Create a new completion client
    pub fn new(config: &CompletionConfig) -> Result<Self> {
        let mut builder = Client::builder().pool_max_idle_per_host(5);
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        if config.api_key.is_none() {
            tracing::warn!(
                "No completion API key configured; set {} to authenticate",
                crate::config::API_KEY_ENV
            );
        }

        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/completions", self.config.api_base.trim_end_matches('/'))
    }
}

#[async_trait]
impl CompletionProvider for CompletionClient {
    async fn complete(&self, prompt: &str, params: DecodingParams) -> Result<CompletionOutcome> {
        let request = CompletionRequest {
            model: &self.config.model,
            prompt,
            max_tokens: params.max_tokens,
            temperature: params.temperature,
        };

        let mut builder = self.client.post(self.endpoint()).json(&request);
        if let Some(key) = &self.config.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| Error::completion(format!("Completion request failed: {}", e)))?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!("Completion endpoint returned HTTP {}", status.as_u16());
            return Ok(CompletionOutcome::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: CompletionResponse = response
            .json()
            .await
            .map_err(|e| Error::completion(format!("Failed to parse completion response: {}", e)))?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| CompletionOutcome::Text(choice.text))
            .ok_or_else(|| Error::completion("Completion response has no choices"))
    }

    fn name(&self) -> &str {
        "together"
    }

    fn model(&self) -> &str {
        &self.config.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        extract::State,
        http::{HeaderMap, StatusCode as AxumStatus},
        routing::post,
        Json, Router,
    };
    use parking_lot::Mutex;
    use serde_json::{json, Value};
    use std::sync::Arc;

    #[derive(Clone, Default)]
    struct Captured {
        body: Arc<Mutex<Option<Value>>>,
        auth: Arc<Mutex<Option<String>>>,
    }

    /// Serve a fixed status and body on `/v1/completions`, recording the request
    async fn spawn_endpoint(status: u16, reply: &'static str) -> (String, Captured) {
        let captured = Captured::default();
        let app = Router::new()
            .route(
                "/v1/completions",
                post(
                    move |State(captured): State<Captured>,
                          headers: HeaderMap,
                          Json(body): Json<Value>| async move {
                        *captured.body.lock() = Some(body);
                        *captured.auth.lock() = headers
                            .get("authorization")
                            .and_then(|v| v.to_str().ok())
                            .map(str::to_string);
                        (AxumStatus::from_u16(status).unwrap(), reply)
                    },
                ),
            )
            .with_state(captured.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (format!("http://{}/v1", addr), captured)
    }

    fn client_for(api_base: String) -> CompletionClient {
        let config = CompletionConfig {
            api_base,
            api_key: Some("test-key".to_string()),
            ..CompletionConfig::default()
        };
        CompletionClient::new(&config).unwrap()
    }

    #[tokio::test]
    async fn test_complete_success() {
        let (base, captured) =
            spawn_endpoint(200, r#"{"choices": [{"text": "SELECT 1"}, {"text": "ignored"}]}"#).await;
        let client = client_for(base);

        let params = DecodingParams {
            max_tokens: 150,
            temperature: 0.3,
        };
        let outcome = client.complete("prompt text", params).await.unwrap();
        assert_eq!(outcome, CompletionOutcome::Text("SELECT 1".to_string()));

        let body = captured.body.lock().clone().unwrap();
        assert_eq!(
            body,
            json!({
                "model": "mistralai/Mixtral-8x7B-Instruct-v0.1",
                "prompt": "prompt text",
                "max_tokens": 150,
                "temperature": 0.3,
            })
        );
        assert_eq!(captured.auth.lock().as_deref(), Some("Bearer test-key"));
    }

    #[tokio::test]
    async fn test_complete_rejected_keeps_body() {
        let (base, _) = spawn_endpoint(500, "upstream exploded").await;
        let client = client_for(base);

        let outcome = client
            .complete("prompt", CompletionConfig::default().answer)
            .await
            .unwrap();
        assert_eq!(
            outcome,
            CompletionOutcome::Rejected {
                status: 500,
                body: "upstream exploded".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_complete_without_choices_is_error() {
        let (base, _) = spawn_endpoint(200, r#"{"choices": []}"#).await;
        let client = client_for(base);

        let result = client.complete("prompt", CompletionConfig::default().sql).await;
        assert!(matches!(result, Err(Error::Completion(_))));
    }

    #[tokio::test]
    async fn test_complete_unreachable_is_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = client_for(format!("http://{}/v1", addr));
        let result = client.complete("prompt", CompletionConfig::default().sql).await;
        assert!(matches!(result, Err(Error::Completion(_))));
    }
}
