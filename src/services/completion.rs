use reqwest::Client as HttpClient;

use crate::{
    error::{AppError, AppResult},
    models::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage},
};

/// Generative text model abstraction
///
/// One call sends one user-role message and returns the text of the first
/// choice. Implementations never retry; callers decide what a failure means.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> AppResult<String>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}

/// OpenAI Chat Completions client
///
/// Without an API key every call fails with [`AppError::ModelUnavailable`]
/// before touching the network.
#[derive(Clone)]
pub struct OpenAiClient {
    http_client: HttpClient,
    api_key: Option<String>,
    api_url: String,
    model: String,
}

impl OpenAiClient {
    pub fn new(api_key: Option<String>, api_url: String, model: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            api_url,
            model,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

#[async_trait::async_trait]
impl CompletionClient for OpenAiClient {
    async fn complete(&self, prompt: &str) -> AppResult<String> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| AppError::ModelUnavailable("OpenAI API key not configured".to_string()))?;

        let url = format!("{}/v1/chat/completions", self.api_url.trim_end_matches('/'));
        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage::user(prompt)],
        };

        tracing::debug!(model = %self.model, prompt_len = prompt.len(), "Calling chat completion");

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "OpenAI API returned status {}: {}",
                status, body
            )));
        }

        let completion: ChatCompletionResponse = response.json().await?;

        let content = completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content.trim().to_string())
            .ok_or_else(|| AppError::ExternalApi("No choices in OpenAI response".to_string()))?;

        if content.is_empty() {
            return Err(AppError::ExternalApi("Empty OpenAI response".to_string()));
        }

        Ok(content)
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{routing::post, Json, Router};
    use serde_json::{json, Value};

    /// Serves `body` from a local chat completions endpoint and returns its base URL
    async fn serve_completion(body: Value) -> String {
        let app = Router::new().route(
            "/v1/chat/completions",
            post(move |Json(request): Json<Value>| {
                let body = body.clone();
                async move {
                    assert_eq!(request["messages"][0]["role"], "user");
                    Json(body)
                }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn client(api_key: Option<&str>, api_url: String) -> OpenAiClient {
        OpenAiClient::new(
            api_key.map(str::to_string),
            api_url,
            "gpt-3.5-turbo".to_string(),
        )
    }

    #[tokio::test]
    async fn test_missing_key_is_model_unavailable() {
        let client = client(None, "http://127.0.0.1:9".to_string());
        assert!(!client.is_configured());

        let err = client.complete("hello").await.unwrap_err();
        assert!(matches!(err, AppError::ModelUnavailable(_)));
    }

    #[tokio::test]
    async fn test_blank_key_counts_as_missing() {
        let client = client(Some("  "), "http://127.0.0.1:9".to_string());
        assert!(!client.is_configured());
    }

    #[tokio::test]
    async fn test_returns_trimmed_first_choice() {
        let url = serve_completion(json!({
            "choices": [
                { "message": { "role": "assistant", "content": "  Inception\nThe Matrix \n" } },
                { "message": { "role": "assistant", "content": "ignored" } }
            ]
        }))
        .await;

        let text = client(Some("sk-test"), url).complete("prompt").await.unwrap();
        assert_eq!(text, "Inception\nThe Matrix");
    }

    #[tokio::test]
    async fn test_empty_choices_is_an_error() {
        let url = serve_completion(json!({ "choices": [] })).await;

        let err = client(Some("sk-test"), url).complete("prompt").await.unwrap_err();
        assert!(matches!(err, AppError::ExternalApi(_)));
    }

    #[tokio::test]
    async fn test_unparseable_body_is_an_error() {
        let url = serve_completion(json!({ "choices": "nope" })).await;

        let err = client(Some("sk-test"), url).complete("prompt").await.unwrap_err();
        assert!(matches!(err, AppError::HttpClient(_)));
    }
}
