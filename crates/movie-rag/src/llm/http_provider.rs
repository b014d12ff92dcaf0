//! HTTP generator for Ollama-native and OpenAI-compatible endpoints.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

use super::{
    ApiProvider, GenerationConfig, GenerationPrompt, GeneratorHealth, ProviderInfo, TextGenerator,
};
use crate::config::GeneratorConfig;

const HEALTH_TIMEOUT: Duration = Duration::from_secs(10);

pub struct HttpTextGenerator {
    provider: ApiProvider,
    base_url: String,
    model: String,
    api_key: Option<String>,
    generation: GenerationConfig,
    client: Client,
}

impl HttpTextGenerator {
    pub fn new(config: &GeneratorConfig) -> Result<Self> {
        // Per-request timeouts are set on each call; the client only bounds connecting.
        let client = Client::builder()
            .connect_timeout(config.connect_timeout())
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_nodelay(true)
            .build()?;

        tracing::info!(
            provider = config.provider.name(),
            base_url = %config.base_url,
            model = %config.model,
            connect_timeout_secs = config.connect_timeout_secs,
            "Creating HttpTextGenerator"
        );

        Ok(Self {
            provider: config.provider,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: config.api_key.clone().filter(|k| !k.trim().is_empty()),
            generation: GenerationConfig::from(config),
            client,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn generate_endpoint(&self) -> String {
        match self.provider {
            ApiProvider::Ollama => self.endpoint("/api/generate"),
            ApiProvider::OpenAICompatible => self.endpoint("/v1/chat/completions"),
        }
    }

    fn models_endpoint(&self) -> String {
        match self.provider {
            ApiProvider::Ollama => self.endpoint("/api/tags"),
            ApiProvider::OpenAICompatible => self.endpoint("/v1/models"),
        }
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => request.header("Authorization", format!("Bearer {}", key)),
            None => request,
        }
    }

    async fn send(
        &self,
        request: reqwest::RequestBuilder,
        endpoint: &str,
    ) -> Result<reqwest::Response> {
        let response = self.authorized(request).send().await.map_err(|e| {
            if e.is_timeout() {
                tracing::error!(endpoint = %endpoint, "Request timed out (connect or response timeout)");
                anyhow!("Request to {} timed out", endpoint)
            } else if e.is_connect() {
                tracing::error!(endpoint = %endpoint, error = %e, "Connection failed");
                anyhow!("Failed to connect to {}: {}", endpoint, e)
            } else {
                tracing::error!(endpoint = %endpoint, error = %e, "Request failed");
                anyhow!("Request to {} failed: {}", endpoint, e)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let error = response.text().await.unwrap_or_default();
            tracing::error!(endpoint = %endpoint, status = %status, error = %error, "API returned error");
            return Err(anyhow!("API error ({}) from {}: {}", status, endpoint, error));
        }
        Ok(response)
    }

    async fn parse_json_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
        endpoint: &str,
    ) -> Result<T> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| anyhow!("Failed to read response body from {}: {}", endpoint, e))?;
        parse_json_body(status, &body, endpoint)
    }

    async fn ollama_generate(&self, prompt: &GenerationPrompt, timeout: Duration) -> Result<String> {
        let endpoint = self.generate_endpoint();
        let request = json!({
            "model": self.model,
            "prompt": prompt.user,
            "system": prompt.system,
            "stream": false,
            "options": {
                "temperature": self.generation.temperature,
                "num_predict": self.generation.max_tokens,
            }
        });

        let response = self
            .send(self.client.post(&endpoint).timeout(timeout).json(&request), &endpoint)
            .await?;
        let result: OllamaGenerateResponse = Self::parse_json_response(response, &endpoint).await?;
        Ok(result.response.trim().to_string())
    }

    async fn openai_compatible_generate(
        &self,
        prompt: &GenerationPrompt,
        timeout: Duration,
    ) -> Result<String> {
        let endpoint = self.generate_endpoint();
        let request = json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": prompt.system},
                {"role": "user", "content": prompt.user}
            ],
            "max_tokens": self.generation.max_tokens,
            "temperature": self.generation.temperature,
            "stream": false
        });

        let response = self
            .send(self.client.post(&endpoint).timeout(timeout).json(&request), &endpoint)
            .await?;
        let result: OpenAIResponse = Self::parse_json_response(response, &endpoint).await?;

        let choice = result
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("No choices returned from {}", endpoint))?;
        Ok(choice.message.content.unwrap_or_default().trim().to_string())
    }

    async fn list_models(&self) -> Result<Vec<String>> {
        let endpoint = self.models_endpoint();
        let response = self
            .send(self.client.get(&endpoint).timeout(HEALTH_TIMEOUT), &endpoint)
            .await?;

        let models = match self.provider {
            ApiProvider::Ollama => {
                let tags: OllamaTagsResponse = Self::parse_json_response(response, &endpoint).await?;
                tags.models.into_iter().map(|m| m.name).collect()
            }
            ApiProvider::OpenAICompatible => {
                let list: OpenAIModelsResponse = Self::parse_json_response(response, &endpoint).await?;
                list.data.into_iter().map(|m| m.id).collect()
            }
        };
        Ok(models)
    }
}

#[async_trait]
impl TextGenerator for HttpTextGenerator {
    async fn generate(&self, prompt: &GenerationPrompt, timeout: Duration) -> Result<String> {
        tracing::debug!(
            endpoint = %self.generate_endpoint(),
            model = %self.model,
            max_tokens = self.generation.max_tokens,
            prompt_len = prompt.len(),
            "Sending generation request"
        );
        match self.provider {
            ApiProvider::Ollama => self.ollama_generate(prompt, timeout).await,
            ApiProvider::OpenAICompatible => self.openai_compatible_generate(prompt, timeout).await,
        }
    }

    async fn health_check(&self) -> GeneratorHealth {
        match self.list_models().await {
            Ok(models) => GeneratorHealth {
                reachable: true,
                model_loaded: model_is_served(&self.model, &models),
                model: self.model.clone(),
                available_models: models,
                error: None,
            },
            Err(e) => {
                tracing::warn!(error = %e, "Generator health check failed");
                GeneratorHealth::unreachable(self.model.clone(), e.to_string())
            }
        }
    }

    fn info(&self) -> ProviderInfo {
        ProviderInfo {
            name: self.provider.name().to_string(),
            model: self.model.clone(),
            endpoint: self.generate_endpoint(),
        }
    }
}

/// Parse a JSON body, with a clear error when a proxy or gateway returned
/// an HTML page instead.
fn parse_json_body<T: serde::de::DeserializeOwned>(
    status: StatusCode,
    body: &str,
    endpoint: &str,
) -> Result<T> {
    let trimmed = body.trim_start();
    if trimmed.starts_with('<') {
        let preview: String = trimmed.chars().take(200).collect();
        return Err(anyhow!(
            "Endpoint {} returned HTML instead of JSON (HTTP {}): {}",
            endpoint,
            status,
            preview
        ));
    }

    serde_json::from_str::<T>(body).map_err(|e| {
        let preview: String = body.chars().take(300).collect();
        anyhow!(
            "Failed to parse JSON from {} (HTTP {}): {}. Response body: {}",
            endpoint,
            status,
            e,
            preview
        )
    })
}

/// Ollama tags carry a version suffix ("phi3:mini" vs "phi3:mini-4k"), so
/// a substring match is used.
fn model_is_served(model: &str, available: &[String]) -> bool {
    available.iter().any(|m| m.contains(model))
}

#[derive(Deserialize)]
struct OllamaGenerateResponse {
    #[serde(default)]
    response: String,
}

#[derive(Deserialize)]
struct OllamaTagsResponse {
    #[serde(default)]
    models: Vec<OllamaModel>,
}

#[derive(Deserialize)]
struct OllamaModel {
    name: String,
}

#[derive(Deserialize)]
struct OpenAIResponse {
    choices: Vec<OpenAIChoice>,
}

#[derive(Deserialize)]
struct OpenAIChoice {
    message: OpenAIMessage,
}

#[derive(Deserialize)]
struct OpenAIMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct OpenAIModelsResponse {
    #[serde(default)]
    data: Vec<OpenAIModel>,
}

#[derive(Deserialize)]
struct OpenAIModel {
    id: String,
}
