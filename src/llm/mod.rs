//! Generative text models.
//!
//! Every prompt in vidgraph goes through the [`TextGenerator`] trait, so the
//! extractor and the summary generator never see which provider answers them.

mod openai;
mod retry;

pub use openai::OpenAIGenerator;
pub use retry::RetryingGenerator;

use crate::error::Result;
use async_trait::async_trait;

/// A single-prompt completion request.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// Model identifier understood by the provider.
    pub model: String,
    /// The full user prompt.
    pub prompt: String,
    /// Sampling temperature. None leaves the provider default.
    pub temperature: Option<f32>,
}

impl GenerationRequest {
    /// Create a request with the provider's default temperature.
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            temperature: None,
        }
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }
}

/// Trait for text generation services.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Run one completion and return the raw model text.
    ///
    /// Failures worth retrying (transport, rate limits, server errors, empty
    /// output) are reported as [`crate::VidgraphError::Generation`]; requests
    /// the provider refuses (auth, unknown model, invalid request) as
    /// [`crate::VidgraphError::GenerationRejected`].
    async fn generate(&self, request: &GenerationRequest) -> Result<String>;
}

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted generator for tests.

    use super::{GenerationRequest, TextGenerator};
    use crate::error::{Result, VidgraphError};
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays queued replies in order and records every request it sees.
    #[derive(Default)]
    pub struct ScriptedGenerator {
        replies: Mutex<VecDeque<Result<String>>>,
        requests: Mutex<Vec<GenerationRequest>>,
    }

    impl ScriptedGenerator {
        pub fn new() -> Self {
            Self::default()
        }

        /// Queue a successful completion.
        pub fn reply(self, text: &str) -> Self {
            self.replies.lock().unwrap().push_back(Ok(text.to_string()));
            self
        }

        /// Queue a failed completion that is worth retrying.
        pub fn fail(self, message: &str) -> Self {
            self.replies
                .lock()
                .unwrap()
                .push_back(Err(VidgraphError::Generation(message.to_string())));
            self
        }

        /// Queue a completion the provider refuses outright.
        pub fn reject(self, message: &str) -> Self {
            self.replies
                .lock()
                .unwrap()
                .push_back(Err(VidgraphError::GenerationRejected(message.to_string())));
            self
        }

        /// Prompts received so far.
        pub fn prompts(&self) -> Vec<String> {
            self.requests
                .lock()
                .unwrap()
                .iter()
                .map(|r| r.prompt.clone())
                .collect()
        }

        /// Requests received so far.
        pub fn requests(&self) -> Vec<GenerationRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl TextGenerator for ScriptedGenerator {
        async fn generate(&self, request: &GenerationRequest) -> Result<String> {
            self.requests.lock().unwrap().push(request.clone());
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(VidgraphError::Generation("no scripted reply left".to_string())))
        }
    }
}
