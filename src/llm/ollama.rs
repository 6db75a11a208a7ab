//! Ollama HTTP API client
//! Uses the non-streaming `/api/generate` endpoint and `/api/tags` for listing models

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{GenerationError, Generator};

/// Default Ollama listen address
pub const DEFAULT_HOST: &str = "http://localhost:11434";

/// Default model name
pub const DEFAULT_MODEL: &str = "llama3.2";

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<ModelTag>,
}

#[derive(Debug, Deserialize)]
struct ModelTag {
    name: String,
}

#[derive(Debug, Clone)]
pub struct OllamaClient {
    inner: reqwest::Client,
    host: String,
    model: String,
}

impl OllamaClient {
    pub fn new(host: &str, model: impl Into<String>) -> Result<Self, GenerationError> {
        let inner = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        let host = normalize_host(host);
        let model = model.into();

        tracing::debug!("Ollama client for {} using model {}", host, model);

        Ok(Self { inner, host, model })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// List the models installed on the service
    pub async fn list_models(&self) -> Result<Vec<String>, GenerationError> {
        let url = format!("{}/api/tags", self.host);
        let response = self.inner.get(&url).send().await?;
        let body = Self::read_body(response).await?;
        let tags: TagsResponse = serde_json::from_slice(&body)?;
        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }

    /// Read the body of a response, turning a non-success status into an error
    async fn read_body(response: reqwest::Response) -> Result<Vec<u8>, GenerationError> {
        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            // Ollama reports failures as {"error": "..."}
            let message = serde_json::from_slice::<ErrorResponse>(&body)
                .map(|e| e.error)
                .unwrap_or_else(|_| String::from_utf8_lossy(&body).trim().to_string());
            return Err(GenerationError::Service {
                status: status.as_u16(),
                message,
            });
        }

        Ok(body.to_vec())
    }
}

#[async_trait]
impl Generator for OllamaClient {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let url = format!("{}/api/generate", self.host);
        let request = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
        };

        tracing::info!("Generating with {} ({} prompt bytes)", self.model, prompt.len());

        let response = self.inner.post(&url).json(&request).send().await?;
        let body = Self::read_body(response).await?;
        let generated: GenerateResponse = serde_json::from_slice(&body)?;

        tracing::debug!("Received {} bytes from {}", generated.response.len(), self.model);
        Ok(generated.response)
    }

    fn model(&self) -> &str {
        &self.model
    }
}

/// Accept `host:port`, `http://host:port/` and friends the way OLLAMA_HOST is usually written
fn normalize_host(host: &str) -> String {
    let host = host.trim().trim_end_matches('/');
    if host.is_empty() {
        return DEFAULT_HOST.to_string();
    }
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("http://{}", host)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_normalize_host() {
        assert_eq!(normalize_host("localhost:11434"), "http://localhost:11434");
        assert_eq!(normalize_host("http://127.0.0.1:11434/"), "http://127.0.0.1:11434");
        assert_eq!(normalize_host("https://ollama.lan"), "https://ollama.lan");
        assert_eq!(normalize_host("  "), DEFAULT_HOST);
    }

    #[tokio::test]
    async fn test_generate_returns_response_verbatim() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .and(body_json(serde_json::json!({
                "model": "llama3.2",
                "prompt": "Write a blog",
                "stream": false,
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "model": "llama3.2",
                "response": "\n# Title\n\nBody text.  \n",
                "done": true,
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = OllamaClient::new(&server.uri(), DEFAULT_MODEL).unwrap();
        let text = client.generate("Write a blog").await.unwrap();

        // No whitespace or markdown normalization
        assert_eq!(text, "\n# Title\n\nBody text.  \n");
    }

    #[tokio::test]
    async fn test_generate_service_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
                "error": "model \"missing\" not found, try pulling it first",
            })))
            .mount(&server)
            .await;

        let client = OllamaClient::new(&server.uri(), "missing").unwrap();
        let err = client.generate("hello").await.unwrap_err();

        match err {
            GenerationError::Service { status, message } => {
                assert_eq!(status, 404);
                assert!(message.contains("try pulling it first"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_generate_plain_text_error_body() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(ResponseTemplate::new(500).set_body_string("internal failure\n"))
            .mount(&server)
            .await;

        let client = OllamaClient::new(&server.uri(), DEFAULT_MODEL).unwrap();
        let err = client.generate("hello").await.unwrap_err();
        assert_eq!(err.to_string(), "model service returned 500: internal failure");
    }

    #[tokio::test]
    async fn test_generate_undecodable_body() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let client = OllamaClient::new(&server.uri(), DEFAULT_MODEL).unwrap();
        let err = client.generate("hello").await.unwrap_err();
        assert!(matches!(err, GenerationError::Decode(_)));
    }

    #[tokio::test]
    async fn test_generate_unreachable() {
        // Reserve a port and release it so nothing is listening there
        let addr = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap()
        };

        let client = OllamaClient::new(&addr.to_string(), DEFAULT_MODEL).unwrap();
        let err = client.generate("hello").await.unwrap_err();
        assert!(matches!(err, GenerationError::Unreachable(_)));
    }

    #[tokio::test]
    async fn test_list_models() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/tags"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "models": [
                    { "name": "llama3.2:latest", "size": 2019393189u64 },
                    { "name": "mistral:7b", "size": 4109865159u64 },
                ]
            })))
            .mount(&server)
            .await;

        let client = OllamaClient::new(&server.uri(), DEFAULT_MODEL).unwrap();
        let models = client.list_models().await.unwrap();
        assert_eq!(models, vec!["llama3.2:latest", "mistral:7b"]);
    }
}
