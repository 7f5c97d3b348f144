//! Graph context shared by summaries and answers.

use crate::error::{Result, VidgraphError};
use crate::graph_store::{GraphStore, Relationship};
use std::sync::Arc;

/// Everything the model is told about one video.
#[derive(Debug, Clone)]
pub struct GraphContext {
    pub video_id: String,
    /// Transcript exactly as stored.
    pub transcript: String,
    /// Relationships the video asserted, in first-seen order.
    pub relationships: Vec<Relationship>,
}

impl GraphContext {
    /// Relationship statements, one `"A relation B"` per line.
    pub fn statements(&self) -> Vec<String> {
        self.relationships.iter().map(Relationship::statement).collect()
    }
}

/// Loads a [`GraphContext`] from the store.
pub struct GraphContextLoader {
    store: Arc<dyn GraphStore>,
}

impl GraphContextLoader {
    pub fn new(store: Arc<dyn GraphStore>) -> Self {
        Self { store }
    }

    /// Load the transcript and relationships of a video.
    ///
    /// Fails with `NotFound` if the video was never ingested.
    pub async fn load(&self, video_id: &str) -> Result<GraphContext> {
        let video = self
            .store
            .get_video(video_id)
            .await?
            .ok_or_else(|| VidgraphError::NotFound(video_id.to_string()))?;

        let relationships = self.store.video_relationships(video_id).await?;

        Ok(GraphContext {
            video_id: video.video_id,
            transcript: video.transcript,
            relationships,
        })
    }
}

/// Format relationship statements for a prompt.
pub fn format_relationships_for_prompt(context: &GraphContext) -> String {
    if context.relationships.is_empty() {
        return "(no relationships were extracted)".to_string();
    }

    context
        .statements()
        .iter()
        .map(|s| format!("- {}", s))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::Triple;
    use crate::graph_store::MemoryGraphStore;

    #[tokio::test]
    async fn test_load_missing_video() {
        let loader = GraphContextLoader::new(Arc::new(MemoryGraphStore::new()));
        let err = loader.load("missing").await.unwrap_err();
        assert!(matches!(err, VidgraphError::NotFound(id) if id == "missing"));
    }

    #[tokio::test]
    async fn test_load_and_format() {
        let store = Arc::new(MemoryGraphStore::new());
        store.upsert_video("v1", "Alice founded Acme.").await.unwrap();
        store
            .upsert_triple("v1", &Triple::new("Alice", "founded", "Acme"))
            .await
            .unwrap();

        let context = GraphContextLoader::new(store).load("v1").await.unwrap();
        assert_eq!(context.transcript, "Alice founded Acme.");
        assert_eq!(context.statements(), vec!["Alice founded Acme"]);
        assert_eq!(format_relationships_for_prompt(&context), "- Alice founded Acme");
    }

    #[test]
    fn test_format_without_relationships() {
        let context = GraphContext {
            video_id: "v1".to_string(),
            transcript: "Just music.".to_string(),
            relationships: Vec::new(),
        };
        assert_eq!(
            format_relationships_for_prompt(&context),
            "(no relationships were extracted)"
        );
    }
}
