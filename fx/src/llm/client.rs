//! LlmClient trait definition

use async_trait::async_trait;

use super::{CompletionRequest, CompletionResponse, LlmError};

/// Stateless model client - each call is independent
///
/// The conversation lives in the request; no state is kept between calls.
/// Both the worker and the evaluator speak through this trait, so tests can
/// script entire runs with a mock.
#[async_trait]
pub trait LlmClient: Send + Sync + std::fmt::Debug {
    /// Send one completion request and wait for the full response
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError>;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Scripted mock client for unit tests
    ///
    /// Returns the queued responses in order and records every request it
    /// received for later inspection.
    #[derive(Debug)]
    pub struct MockLlmClient {
        responses: Mutex<Vec<CompletionResponse>>,
        requests: Mutex<Vec<CompletionRequest>>,
        call_count: AtomicUsize,
    }

    impl MockLlmClient {
        pub fn new(responses: Vec<CompletionResponse>) -> Self {
            Self {
                responses: Mutex::new(responses),
                requests: Mutex::new(Vec::new()),
                call_count: AtomicUsize::new(0),
            }
        }

        pub fn call_count(&self) -> usize {
            self.call_count.load(Ordering::SeqCst)
        }

        /// Requests seen so far, oldest first
        pub fn requests(&self) -> Vec<CompletionRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl LlmClient for MockLlmClient {
        async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
            self.call_count.fetch_add(1, Ordering::SeqCst);
            self.requests.lock().unwrap().push(request);

            let mut responses = self.responses.lock().unwrap();
            if responses.is_empty() {
                return Err(LlmError::InvalidResponse("No more scripted responses".to_string()));
            }
            Ok(responses.remove(0))
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[tokio::test]
        async fn test_mock_returns_scripted_responses_in_order() {
            let client = MockLlmClient::new(vec![
                CompletionResponse::text_only("first"),
                CompletionResponse::text_only("second"),
            ]);

            let req = CompletionRequest {
                system_prompt: "sys".to_string(),
                messages: vec![],
                tools: vec![],
                max_tokens: 100,
                tool_choice: None,
            };

            assert_eq!(client.complete(req.clone()).await.unwrap().content.as_deref(), Some("first"));
            assert_eq!(
                client.complete(req.clone()).await.unwrap().content.as_deref(),
                Some("second")
            );
            assert_eq!(client.call_count(), 2);
        }

        #[tokio::test]
        async fn test_mock_errors_when_exhausted() {
            let client = MockLlmClient::new(vec![]);

            let req = CompletionRequest {
                system_prompt: "sys".to_string(),
                messages: vec![],
                tools: vec![],
                max_tokens: 100,
                tool_choice: None,
            };

            assert!(client.complete(req).await.is_err());
        }

        #[tokio::test]
        async fn test_mock_records_requests() {
            let client = MockLlmClient::new(vec![CompletionResponse::text_only("ok")]);

            let req = CompletionRequest {
                system_prompt: "the directive".to_string(),
                messages: vec![],
                tools: vec![],
                max_tokens: 100,
                tool_choice: Some("record_verdict".to_string()),
            };
            client.complete(req).await.unwrap();

            let seen = client.requests();
            assert_eq!(seen.len(), 1);
            assert_eq!(seen[0].system_prompt, "the directive");
            assert_eq!(seen[0].tool_choice.as_deref(), Some("record_verdict"));
        }
    }
}
