//! Test doubles shared by unit tests

use async_trait::async_trait;
use mockall::mock;
use stockchat_llm::{
    CompletionRequest, CompletionResponse, LLMProvider, Message, StopReason, TokenUsage,
};

mock! {
    pub Provider {}

    #[async_trait]
    impl LLMProvider for Provider {
        async fn complete(&self, request: CompletionRequest) -> stockchat_llm::Result<CompletionResponse>;
        fn name(&self) -> &str;
    }
}

/// Successful completion carrying `text`
pub fn text_response(text: &str) -> CompletionResponse {
    CompletionResponse {
        message: Message::assistant(text),
        stop_reason: StopReason::EndTurn,
        usage: TokenUsage::default(),
    }
}
