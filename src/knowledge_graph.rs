//! Turns a transcript into graph-store mutations for one video.

use crate::error::{Result, VidgraphError};
use crate::extraction::TripleExtractor;
use crate::graph_store::GraphStore;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, instrument};

/// Outcome of ingesting one transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    pub video_id: String,
    /// Well-formed triples the model produced, duplicates included.
    pub triples_extracted: usize,
    /// Distinct triples merged into the graph during this pass.
    pub triples_stored: usize,
}

/// Builds the knowledge graph for a video from its transcript.
pub struct KnowledgeGraphBuilder {
    store: Arc<dyn GraphStore>,
    extractor: TripleExtractor,
}

impl KnowledgeGraphBuilder {
    pub fn new(store: Arc<dyn GraphStore>, extractor: TripleExtractor) -> Self {
        Self { store, extractor }
    }

    /// Store the transcript, extract triples, and merge each one into the graph.
    ///
    /// Safe to repeat: every write merges by natural key. Triples stored before
    /// a failure stay stored.
    #[instrument(skip(self, transcript), fields(transcript_len = transcript.len()))]
    pub async fn ingest(&self, video_id: &str, transcript: &str) -> Result<IngestReport> {
        if video_id.trim().is_empty() {
            return Err(VidgraphError::InvalidInput("video id is empty".to_string()));
        }
        if transcript.trim().is_empty() {
            return Err(VidgraphError::InvalidInput(format!(
                "transcript for {} is empty",
                video_id
            )));
        }

        self.store.upsert_video(video_id, transcript).await?;

        let triples = self.extractor.extract(transcript).await?;

        let mut seen = HashSet::new();
        for triple in &triples {
            if !seen.insert(triple) {
                continue;
            }
            self.store.upsert_triple(video_id, triple).await?;
        }

        let report = IngestReport {
            video_id: video_id.to_string(),
            triples_extracted: triples.len(),
            triples_stored: seen.len(),
        };

        info!(
            "Ingested {}: {} triples extracted, {} stored",
            video_id, report.triples_extracted, report.triples_stored
        );

        Ok(report)
    }

    /// The store this builder writes to.
    pub fn store(&self) -> &Arc<dyn GraphStore> {
        &self.store
    }
}
