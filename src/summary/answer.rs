//! Question answering about one ingested video.

use super::context::{format_relationships_for_prompt, GraphContext, GraphContextLoader};
use crate::config::{Prompts, SummarySettings};
use crate::error::{Result, VidgraphError};
use crate::graph_store::GraphStore;
use crate::llm::{GenerationRequest, TextGenerator};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument};

/// Answers free-text questions from a video's graph and transcript.
pub struct QuestionAnswerer {
    loader: GraphContextLoader,
    generator: Arc<dyn TextGenerator>,
    model: String,
    temperature: Option<f32>,
    prompts: Prompts,
}

impl QuestionAnswerer {
    /// Uses the summary model settings.
    pub fn new(
        store: Arc<dyn GraphStore>,
        generator: Arc<dyn TextGenerator>,
        settings: &SummarySettings,
    ) -> Self {
        Self {
            loader: GraphContextLoader::new(store),
            generator,
            model: settings.model.clone(),
            temperature: settings.temperature,
            prompts: Prompts::default(),
        }
    }

    /// Set custom prompts (with user-defined variables).
    pub fn with_prompts(mut self, prompts: Prompts) -> Self {
        self.prompts = prompts;
        self
    }

    pub fn build_prompt(&self, context: &GraphContext, question: &str, language: &str) -> String {
        let mut vars = HashMap::new();
        vars.insert("question".to_string(), question.to_string());
        vars.insert("language".to_string(), language.to_string());
        vars.insert(
            "relationships".to_string(),
            format_relationships_for_prompt(context),
        );
        vars.insert("transcript".to_string(), context.transcript.clone());

        self.prompts.render_with_custom(&self.prompts.answer.user, &vars)
    }

    /// Answer a question about an ingested video.
    #[instrument(skip(self), fields(question = %question))]
    pub async fn ask(&self, video_id: &str, question: &str, language: &str) -> Result<String> {
        if question.trim().is_empty() {
            return Err(VidgraphError::InvalidInput("question is empty".to_string()));
        }

        let context = self.loader.load(video_id).await?;
        let request = GenerationRequest::new(&self.model, self.build_prompt(&context, question, language))
            .with_temperature(self.temperature);

        let answer = self.generator.generate(&request).await?;
        let answer = answer.trim();
        if answer.is_empty() {
            return Err(VidgraphError::Generation(
                "Model returned an empty answer".to_string(),
            ));
        }

        info!("Answered question about {}", video_id);
        Ok(answer.to_string())
    }
}
