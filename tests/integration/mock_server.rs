//! Mock HTTP server setup for integration tests

use mockito::{Matcher, Mock, Server, ServerGuard};
use simple_infer::batch::NoopProgressSink;
use simple_infer::transport::HttpTransportFactory;
use simple_infer::{BatchInference, CallParameters, RetryPolicy};
use std::sync::Arc;

pub const COMPLETIONS_PATH: &str = "/v1/chat/completions";
pub const TEST_KEY: &str = "test-key";

/// Test fixture that manages a mock server
pub struct MockServerFixture {
    pub server: ServerGuard,
    pub base_url: String,
}

impl MockServerFixture {
    pub async fn new() -> Self {
        let server = Server::new_async().await;
        let base_url = format!("{}/v1", server.url());
        Self { server, base_url }
    }

    /// Parameters pointing at the mock server, with retries that do not sleep.
    pub fn params(&self, max_concurrent: usize) -> CallParameters {
        CallParameters::new("gpt-4.1-nano")
            .with_base_url(&self.base_url)
            .with_max_concurrent(max_concurrent)
            .with_retry(RetryPolicy::immediate(3))
    }

    /// Engine wired to the real HTTP transport with a fixed API key.
    pub fn engine(&self) -> BatchInference {
        BatchInference::new()
            .with_transport_factory(Arc::new(HttpTransportFactory::new().with_api_key(TEST_KEY)))
            .with_progress(Arc::new(NoopProgressSink))
    }

    /// Answer any request whose body mentions `prompt` with `content`.
    pub async fn mock_completion(&mut self, prompt: &str, content: &str) -> Mock {
        let body = serde_json::json!({
            "id": "chatcmpl-test",
            "object": "chat.completion",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": content},
                "finish_reason": "stop"
            }]
        });
        self.server
            .mock("POST", COMPLETIONS_PATH)
            .match_header("authorization", format!("Bearer {}", TEST_KEY).as_str())
            .match_body(Matcher::Regex(regex_for(prompt)))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body.to_string())
            .create_async()
            .await
    }

    /// Create a mock for an error response that must be hit exactly `hits` times
    pub async fn mock_error_response(
        &mut self,
        prompt: &str,
        status: usize,
        error_body: &str,
        hits: usize,
    ) -> Mock {
        self.server
            .mock("POST", COMPLETIONS_PATH)
            .match_body(Matcher::Regex(regex_for(prompt)))
            .with_status(status)
            .expect(hits)
            .with_header("content-type", "application/json")
            .with_body(error_body)
            .create_async()
            .await
    }

    /// Create a mock for a raw body with a 200 status
    pub async fn mock_raw(&mut self, prompt: &str, body: &str) -> Mock {
        self.server
            .mock("POST", COMPLETIONS_PATH)
            .match_body(Matcher::Regex(regex_for(prompt)))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create_async()
            .await
    }
}

fn regex_for(prompt: &str) -> String {
    format!(r#""content":"{}""#, regex::escape(prompt))
}
