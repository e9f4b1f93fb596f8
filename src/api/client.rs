//! Backend trait and the HTTP implementation

use async_trait::async_trait;
use reqwest::{Client, Url};
use tracing::debug;

use super::{
    errors::{ApiError, ApiResult},
    types::{ChatRequest, ChatResponse},
};

/// Anything that can answer a question with sources
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Send one query and wait for the answer
    async fn ask(&self, query: &str) -> ApiResult<ChatResponse>;

    /// Human readable location of the backend, shown in the status bar
    fn endpoint(&self) -> &str;
}

/// Client for a backend exposing `POST {base_url}/chat`.
///
/// There is no retry, timeout or status-code handling: whatever the server
/// returns is decoded as a [`ChatResponse`] or the call fails.
#[derive(Debug, Clone)]
pub struct HttpChatBackend {
    client: Client,
    chat_url: String,
}

impl HttpChatBackend {
    pub fn new(base_url: &str) -> ApiResult<Self> {
        let chat_url = chat_url(base_url)?;
        let client = Client::builder()
            .user_agent(concat!("rag-chat/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client, chat_url })
    }
}

#[async_trait]
impl ChatBackend for HttpChatBackend {
    async fn ask(&self, query: &str) -> ApiResult<ChatResponse> {
        debug!("Posting query to {}", self.chat_url);

        let response = self
            .client
            .post(&self.chat_url)
            .json(&ChatRequest::new(query))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        debug!(status = %status, bytes = body.len(), "chat response received");

        Ok(serde_json::from_str(&body)?)
    }

    fn endpoint(&self) -> &str {
        &self.chat_url
    }
}

/// Join the configured base URL with the `chat` route
fn chat_url(base_url: &str) -> ApiResult<String> {
    let url = Url::parse(base_url)
        .map_err(|e| ApiError::ConfigError(format!("invalid base URL '{}': {}", base_url, e)))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ApiError::ConfigError(format!(
            "unsupported URL scheme '{}', expected http or https",
            url.scheme()
        )));
    }

    Ok(format!("{}/chat", url.as_str().trim_end_matches('/')))
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_backend(server: &MockServer) -> HttpChatBackend {
        HttpChatBackend::new(&format!("{}/api", server.uri())).unwrap()
    }

    #[test]
    fn test_chat_url_joining() {
        assert_eq!(
            chat_url("http://localhost:8000/api").unwrap(),
            "http://localhost:8000/api/chat"
        );
        assert_eq!(
            chat_url("http://localhost:8000/api/").unwrap(),
            "http://localhost:8000/api/chat"
        );
        assert_eq!(chat_url("http://localhost:8000").unwrap(), "http://localhost:8000/chat");
    }

    #[test]
    fn test_chat_url_rejects_bad_input() {
        assert!(matches!(chat_url("not a url"), Err(ApiError::ConfigError(_))));
        assert!(matches!(chat_url("ftp://host/api"), Err(ApiError::ConfigError(_))));
    }

    #[tokio::test]
    async fn test_ask_success() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .and(header("content-type", "application/json"))
            .and(body_json(serde_json::json!({ "query": "How is Atlas doing?" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "answer": "Growing fast.",
                "sources": [
                    {"document": "d", "page": 1, "relevance": 0.9, "chunk": "c", "page_content": "p"}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let backend = test_backend(&server);
        let response = backend.ask("How is Atlas doing?").await.unwrap();

        assert_eq!(response.answer, "Growing fast.");
        let sources = response.sources.unwrap();
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].document, "d");
        assert_eq!(sources[0].page, Some(1));
        assert_eq!(sources[0].relevance, Some(0.9));
    }

    #[tokio::test]
    async fn test_ask_error_body_is_a_failure() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(
                ResponseTemplate::new(500)
                    .set_body_json(serde_json::json!({ "detail": "internal error" })),
            )
            .mount(&server)
            .await;

        let backend = test_backend(&server);
        let err = backend.ask("anything").await.unwrap_err();
        assert!(matches!(err, ApiError::JsonError(_)), "got: {err}");
    }

    #[tokio::test]
    async fn test_ask_non_json_body_is_a_failure() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"))
            .mount(&server)
            .await;

        let backend = test_backend(&server);
        assert!(backend.ask("anything").await.is_err());
    }

    #[tokio::test]
    async fn test_ask_connection_refused() {
        // Reserve a free port, then release it so nothing is listening there.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let backend = HttpChatBackend::new(&format!("http://{}/api", addr)).unwrap();
        let err = backend.ask("anything").await.unwrap_err();
        assert!(matches!(err, ApiError::HttpError(_)), "got: {err}");
    }

    #[test]
    fn test_endpoint_reports_chat_url() {
        let backend = HttpChatBackend::new("https://rag.example.com/api").unwrap();
        assert_eq!(backend.endpoint(), "https://rag.example.com/api/chat");
    }
}
