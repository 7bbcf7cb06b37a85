use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use shared::llm::{CompletionRequest, LlmGateway, LlmGatewayError, LlmGatewayFuture};

/// Replays canned model outcomes in order and records every request.
pub struct FakeModel {
    replies: Mutex<VecDeque<Result<String, LlmGatewayError>>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl FakeModel {
    pub fn replying(replies: Vec<Result<String, LlmGatewayError>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(VecDeque::from(replies)),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests
            .lock()
            .expect("requests mutex should not be poisoned")
            .clone()
    }
}

impl LlmGateway for FakeModel {
    fn complete<'a>(&'a self, request: CompletionRequest) -> LlmGatewayFuture<'a> {
        Box::pin(async move {
            self.requests
                .lock()
                .expect("requests mutex should not be poisoned")
                .push(request);
            self.replies
                .lock()
                .expect("replies mutex should not be poisoned")
                .pop_front()
                .unwrap_or_else(|| {
                    Err(LlmGatewayError::ProviderFailure(
                        "exhausted_test_replies".to_string(),
                    ))
                })
        })
    }
}
