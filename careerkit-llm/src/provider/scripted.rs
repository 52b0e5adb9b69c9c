//! Scripted provider - replays canned replies and records every request.
//!
//! Used by test suites to drive the crew without a network.

use super::*;
use std::collections::VecDeque;
use std::sync::Mutex;

pub struct ScriptedProvider {
    replies: Mutex<VecDeque<Result<String, ProviderError>>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue replies in call order
    pub fn with_replies<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let provider = Self::new();
        for reply in replies {
            provider.push_reply(reply);
        }
        provider
    }

    pub fn push_reply(&self, reply: impl Into<String>) {
        self.lock_replies().push_back(Ok(reply.into()));
    }

    pub fn push_error(&self, error: ProviderError) {
        self.lock_replies().push_back(Err(error));
    }

    pub fn call_count(&self) -> usize {
        self.lock_requests().len()
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.lock_requests().clone()
    }

    fn lock_replies(&self) -> std::sync::MutexGuard<'_, VecDeque<Result<String, ProviderError>>> {
        self.replies.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn lock_requests(&self) -> std::sync::MutexGuard<'_, Vec<CompletionRequest>> {
        self.requests.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for ScriptedProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    fn default_model(&self) -> &str {
        "scripted-model"
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, ProviderError> {
        let model = request.model.clone().unwrap_or_else(|| self.default_model().to_string());
        self.lock_requests().push(request);

        let reply = self
            .lock_replies()
            .pop_front()
            .unwrap_or_else(|| Err(ProviderError::Other("script exhausted".into())))?;

        let completion_tokens = reply.split_whitespace().count();
        Ok(CompletionResponse {
            id: format!("scripted-{}", self.call_count()),
            model,
            content: Some(reply),
            finish_reason: FinishReason::Stop,
            usage: Usage {
                prompt_tokens: 10,
                completion_tokens,
                total_tokens: 10 + completion_tokens,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replays_in_order_and_records() {
        let provider = ScriptedProvider::with_replies(["first", "second"]);
        provider.push_error(ProviderError::Network("down".into()));

        let ask = |text: &str| {
            tokio_test::block_on(provider.complete(CompletionRequest::new(vec![ChatMessage::user(text)])))
        };

        assert_eq!(ask("a").unwrap().content.as_deref(), Some("first"));
        assert_eq!(ask("b").unwrap().content.as_deref(), Some("second"));
        assert_eq!(ask("c").unwrap_err(), ProviderError::Network("down".into()));
        assert!(ask("d").is_err());

        assert_eq!(provider.call_count(), 4);
        assert_eq!(provider.requests()[1].messages[0].content, "b");
    }
}
