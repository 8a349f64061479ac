use crate::config::LlmConfig;
use crate::types::{AppError, AppResult, LlmRequest, LlmResponse};
use async_trait::async_trait;

#[async_trait]
pub trait LlmAdapter: Send + Sync {
    async fn create_chat_completion(&self, request: &LlmRequest) -> AppResult<LlmResponse>;
}

pub struct Llm {
    adapter: Box<dyn LlmAdapter>,
}

impl Llm {
    pub fn new(config: &LlmConfig) -> AppResult<Self> {
        let adapter: Box<dyn LlmAdapter> = match config.provider.as_str() {
            "openai" => Box::new(crate::llm::openai::OpenAiAdapter::new(&config.api_key)),
            // OpenRouter speaks the same chat-completions dialect, only the
            // endpoint differs.
            "openrouter" => Box::new(crate::llm::openai::OpenAiAdapter::with_base_url(
                &config.api_key,
                crate::llm::openai::OPENROUTER_API_BASE,
            )),
            other => {
                return Err(AppError::LlmApi(format!("unsupported provider: {other}")));
            }
        };

        Ok(Self { adapter })
    }

    pub async fn create_chat_completion(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        self.adapter.create_chat_completion(request).await
    }
}
