//! Controlled summary generation from the stored graph and transcript.
//!
//! Style, language and length are advisory: they are written into the prompt
//! and never checked against the model's output.

mod answer;
pub mod context;

pub use answer::QuestionAnswerer;
pub use context::{GraphContext, GraphContextLoader};

use crate::config::{Prompts, SummarySettings};
use crate::error::{Result, VidgraphError};
use crate::graph_store::GraphStore;
use crate::llm::{GenerationRequest, TextGenerator};
use context::format_relationships_for_prompt;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// How the summary should read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryRequest {
    /// Free-text style, e.g. "formal" or "casual".
    pub style: String,
    /// Approximate length in words.
    pub word_count: u32,
    /// Output language, e.g. "english".
    pub language: String,
}

impl SummaryRequest {
    pub fn new(style: impl Into<String>, word_count: u32, language: impl Into<String>) -> Self {
        Self {
            style: style.into(),
            word_count,
            language: language.into(),
        }
    }
}

impl From<&SummarySettings> for SummaryRequest {
    fn from(settings: &SummarySettings) -> Self {
        Self::new(
            &settings.default_style,
            settings.default_word_count,
            &settings.default_language,
        )
    }
}

/// Generates summaries of ingested videos.
pub struct SummaryGenerator {
    loader: GraphContextLoader,
    generator: Arc<dyn TextGenerator>,
    model: String,
    temperature: Option<f32>,
    prompts: Prompts,
}

impl SummaryGenerator {
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

    /// Build the summary prompt for a loaded context.
    pub fn build_prompt(&self, context: &GraphContext, request: &SummaryRequest) -> String {
        let mut vars = HashMap::new();
        vars.insert("style".to_string(), request.style.clone());
        vars.insert("word_count".to_string(), request.word_count.to_string());
        vars.insert("language".to_string(), request.language.clone());
        vars.insert(
            "relationships".to_string(),
            format_relationships_for_prompt(context),
        );
        vars.insert("transcript".to_string(), context.transcript.clone());

        self.prompts.render_with_custom(&self.prompts.summary.user, &vars)
    }

    /// Summarize an ingested video.
    #[instrument(skip(self), fields(style = %request.style, word_count = request.word_count))]
    pub async fn summarize(&self, video_id: &str, request: &SummaryRequest) -> Result<String> {
        if request.word_count == 0 {
            return Err(VidgraphError::InvalidInput(
                "word count must be positive".to_string(),
            ));
        }

        let context = self.loader.load(video_id).await?;
        let prompt = self.build_prompt(&context, request);
        debug!(
            "Summary prompt: {} chars, {} relationships",
            prompt.len(),
            context.relationships.len()
        );

        let generation = GenerationRequest::new(&self.model, prompt)
            .with_temperature(self.temperature);
        let summary = self.generator.generate(&generation).await?;

        let summary = summary.trim();
        if summary.is_empty() {
            return Err(VidgraphError::Generation(
                "Model returned an empty summary".to_string(),
            ));
        }

        info!("Generated summary for {} ({} words)", video_id, summary.split_whitespace().count());
        Ok(summary.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExtractionSettings;
    use crate::extraction::{Triple, TripleExtractor};
    use crate::graph_store::MemoryGraphStore;
    use crate::knowledge_graph::KnowledgeGraphBuilder;
    use crate::llm::testing::ScriptedGenerator;
    use tokio_test::assert_err;

    const TRANSCRIPT: &str = "Alice founded Acme. Acme makes widgets.";

    fn generator_for(
        store: Arc<MemoryGraphStore>,
        generator: Arc<ScriptedGenerator>,
    ) -> SummaryGenerator {
        SummaryGenerator::new(store, generator, &SummarySettings::default())
    }

    #[tokio::test]
    async fn test_end_to_end_prompt() {
        let store = Arc::new(MemoryGraphStore::new());
        let extraction = Arc::new(
            ScriptedGenerator::new().reply("Alice|founded|Acme\nAcme|makes|widgets"),
        );
        let builder = KnowledgeGraphBuilder::new(
            store.clone(),
            TripleExtractor::new(extraction, &ExtractionSettings::default()),
        );
        builder.ingest("vid1", TRANSCRIPT).await.unwrap();

        let model = Arc::new(ScriptedGenerator::new().reply("  Alice's company Acme makes widgets.\n"));
        let summaries = generator_for(store, model.clone());

        let summary = summaries
            .summarize("vid1", &SummaryRequest::new("formal", 50, "english"))
            .await
            .unwrap();
        assert_eq!(summary, "Alice's company Acme makes widgets.");

        let prompts = model.prompts();
        assert_eq!(prompts.len(), 1);
        let prompt = &prompts[0];
        assert!(prompt.contains("Alice founded Acme\n"));
        assert!(prompt.contains("Acme makes widgets\n"));
        assert!(prompt.contains(TRANSCRIPT));
        assert!(prompt.contains("formal"));
        assert!(prompt.contains("50"));
        assert!(prompt.contains("english"));
    }

    #[tokio::test]
    async fn test_summarize_unknown_video() {
        let model = Arc::new(ScriptedGenerator::new().reply("unused"));
        let summaries = generator_for(Arc::new(MemoryGraphStore::new()), model.clone());

        let err = summaries
            .summarize("never-seen", &SummaryRequest::new("formal", 50, "english"))
            .await
            .unwrap_err();
        assert!(matches!(err, VidgraphError::NotFound(_)));
        assert!(model.prompts().is_empty());
    }

    #[tokio::test]
    async fn test_zero_word_count_rejected() {
        let store = Arc::new(MemoryGraphStore::new());
        store.upsert_video("vid1", TRANSCRIPT).await.unwrap();
        let summaries = generator_for(store, Arc::new(ScriptedGenerator::new()));

        let result = summaries
            .summarize("vid1", &SummaryRequest::new("formal", 0, "english"))
            .await;
        assert!(matches!(assert_err!(result), VidgraphError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_word_count_is_not_enforced() {
        let store = Arc::new(MemoryGraphStore::new());
        store.upsert_video("vid1", TRANSCRIPT).await.unwrap();
        let long = "word ".repeat(500);
        let summaries = generator_for(
            store,
            Arc::new(ScriptedGenerator::new().reply("Short.").reply(&long)),
        );
        let request = SummaryRequest::new("casual", 100, "english");

        assert_eq!(summaries.summarize("vid1", &request).await.unwrap(), "Short.");
        assert_eq!(
            summaries
                .summarize("vid1", &request)
                .await
                .unwrap()
                .split_whitespace()
                .count(),
            500
        );
    }

    #[tokio::test]
    async fn test_empty_completion_is_generation_failure() {
        let store = Arc::new(MemoryGraphStore::new());
        store.upsert_video("vid1", TRANSCRIPT).await.unwrap();
        let summaries = generator_for(store, Arc::new(ScriptedGenerator::new().reply(" \n ")));

        let err = summaries
            .summarize("vid1", &SummaryRequest::new("formal", 50, "english"))
            .await
            .unwrap_err();
        assert!(matches!(err, VidgraphError::Generation(_)));
    }

    #[tokio::test]
    async fn test_prompt_only_uses_own_relationships() {
        let store = Arc::new(MemoryGraphStore::new());
        store.upsert_video("x", "Alice knows Bob.").await.unwrap();
        store.upsert_video("y", "Alice likes Carol.").await.unwrap();
        store.upsert_triple("x", &Triple::new("Alice", "knows", "Bob")).await.unwrap();
        store.upsert_triple("y", &Triple::new("Alice", "likes", "Carol")).await.unwrap();

        let model = Arc::new(ScriptedGenerator::new().reply("Alice likes Carol."));
        let summaries = generator_for(store, model.clone());
        summaries
            .summarize("y", &SummaryRequest::new("formal", 30, "english"))
            .await
            .unwrap();

        let prompt = &model.prompts()[0];
        assert!(prompt.contains("Alice likes Carol"));
        assert!(!prompt.contains("Alice knows Bob"));
    }

    #[tokio::test]
    async fn test_transcript_placeholders_not_expanded() {
        let store = Arc::new(MemoryGraphStore::new());
        let transcript = "Say {{language}} and {{style}} out loud.";
        store.upsert_video("vid1", transcript).await.unwrap();

        let model = Arc::new(ScriptedGenerator::new().reply("ok"));
        let summaries = generator_for(store, model.clone());
        summaries
            .summarize("vid1", &SummaryRequest::new("formal", 30, "german"))
            .await
            .unwrap();

        assert!(model.prompts()[0].contains(transcript));
    }

    #[test]
    fn test_request_from_settings() {
        let request = SummaryRequest::from(&SummarySettings::default());
        assert_eq!(request, SummaryRequest::new("formal", 150, "english"));
    }
}
