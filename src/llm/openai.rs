//! Chat-completions implementation of [`TextGenerator`].

use super::{GenerationRequest, TextGenerator};
use crate::config::LlmSettings;
use crate::error::{Result, VidgraphError};
use crate::openai::create_client;
use async_openai::error::OpenAIError;
use async_openai::types::{ChatCompletionRequestMessage, ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs};
use async_trait::async_trait;
use tracing::{debug, instrument};

/// Text generator backed by an OpenAI-compatible chat completions endpoint.
pub struct OpenAIGenerator {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
}

impl OpenAIGenerator {
    /// Create a generator for the configured endpoint.
    pub fn new(settings: &LlmSettings) -> Result<Self> {
        Ok(Self {
            client: create_client(settings)?,
        })
    }
}

#[async_trait]
impl TextGenerator for OpenAIGenerator {
    #[instrument(skip(self, request), fields(model = %request.model, prompt_len = request.prompt.len()))]
    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestUserMessageArgs::default()
                .content(request.prompt.clone())
                .build()
                .map_err(|e| VidgraphError::GenerationRejected(e.to_string()))?
                .into(),
        ];

        let mut builder = CreateChatCompletionRequestArgs::default();
        builder.model(&request.model).messages(messages);
        if let Some(temperature) = request.temperature {
            builder.temperature(temperature);
        }
        let chat_request = builder
            .build()
            .map_err(|e| VidgraphError::GenerationRejected(format!("Failed to build request: {}", e)))?;

        let response = self
            .client
            .chat()
            .create(chat_request)
            .await
            .map_err(classify_error)?;

        let content = response
            .choices
            .first()
            .and_then(|c| c.message.content.as_ref())
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| VidgraphError::Generation("Empty response from model".to_string()))?
            .clone();

        debug!("Model returned {} characters", content.len());
        Ok(content)
    }
}

/// Split provider failures into ones worth retrying and ones that will fail
/// the same way every time.
fn classify_error(e: OpenAIError) -> VidgraphError {
    let permanent = match &e {
        OpenAIError::ApiError(api) => is_rejection(api.r#type.as_deref(), api.code.as_deref()),
        OpenAIError::Reqwest(err) => {
            if err.is_timeout() || err.is_connect() {
                false
            } else {
                err.status().is_some_and(|status| {
                    status.is_client_error() && status.as_u16() != 429
                })
            }
        }
        OpenAIError::InvalidArgument(_) => true,
        _ => false,
    };

    let message = format!("Model call failed: {}", e);
    if permanent {
        VidgraphError::GenerationRejected(message)
    } else {
        VidgraphError::Generation(message)
    }
}

/// Whether an API error body describes a request the provider will never accept.
fn is_rejection(error_type: Option<&str>, code: Option<&str>) -> bool {
    match code {
        Some("rate_limit_exceeded") | Some("server_error") => return false,
        Some("invalid_api_key")
        | Some("model_not_found")
        | Some("insufficient_quota")
        | Some("context_length_exceeded") => return true,
        _ => {}
    }

    matches!(
        error_type,
        Some("invalid_request_error")
            | Some("authentication_error")
            | Some("permission_error")
            | Some("not_found_error")
    )
}
