//! Knowledge graph persistence.
//!
//! The graph has two node kinds (videos and entities) and two edge kinds:
//! typed relationships between entities, and video → entity links scoping an
//! entity to the videos that mention it. Every write merges by natural key,
//! so repeating a write never creates duplicates.

mod memory;
mod sqlite;

pub use memory::MemoryGraphStore;
pub use sqlite::SqliteGraphStore;

use crate::config::{GraphStoreProvider, Settings};
use crate::error::Result;
use crate::extraction::Triple;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A stored video and its transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoNode {
    /// External video identifier.
    pub video_id: String,
    /// Transcript from the most recent ingest.
    pub transcript: String,
    /// When the video was first ingested.
    pub created_at: DateTime<Utc>,
    /// When the transcript was last written.
    pub updated_at: DateTime<Utc>,
}

/// A typed, directed relationship between two entities.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Relationship {
    pub subject: String,
    pub relation: String,
    pub object: String,
}

impl Relationship {
    /// Human-readable statement, e.g. "Alice founded Acme".
    pub fn statement(&self) -> String {
        format!("{} {} {}", self.subject, self.relation, self.object)
    }
}

impl From<&Triple> for Relationship {
    fn from(triple: &Triple) -> Self {
        Self {
            subject: triple.subject.clone(),
            relation: triple.relation.clone(),
            object: triple.object.clone(),
        }
    }
}

/// Summary information about a stored video.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoInfo {
    pub video_id: String,
    /// Entities linked to the video.
    pub entity_count: u32,
    /// Relationships the video asserted.
    pub relationship_count: u32,
    /// Transcript length in characters.
    pub transcript_chars: u64,
    pub updated_at: DateTime<Utc>,
}

/// The part of the graph belonging to one video.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoGraph {
    pub video_id: String,
    /// Linked entity names, sorted.
    pub entities: Vec<String>,
    /// Relationships in first-seen order.
    pub relationships: Vec<Relationship>,
}

/// Whole-graph counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphStats {
    pub videos: u64,
    pub entities: u64,
    pub relationships: u64,
    pub video_entity_links: u64,
}

/// Trait for graph store implementations.
///
/// Each method is atomic with respect to concurrent callers.
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Create the video node, or overwrite its transcript if it exists.
    async fn upsert_video(&self, video_id: &str, transcript: &str) -> Result<()>;

    /// Merge one triple into the graph for a video: both entities, the typed
    /// relationship, the video's links to both entities, and the record that
    /// this video asserted the relationship.
    ///
    /// Fails with `NotFound` if the video has not been upserted.
    async fn upsert_triple(&self, video_id: &str, triple: &Triple) -> Result<()>;

    /// Get a video node.
    async fn get_video(&self, video_id: &str) -> Result<Option<VideoNode>>;

    /// Relationships asserted by a video whose endpoints are both linked to it,
    /// in the order they were first stored for that video.
    async fn video_relationships(&self, video_id: &str) -> Result<Vec<Relationship>>;

    /// Entity names linked to a video, sorted.
    async fn video_entities(&self, video_id: &str) -> Result<Vec<String>>;

    /// List stored videos, most recently updated first.
    async fn list_videos(&self) -> Result<Vec<VideoInfo>>;

    /// Whole-graph counts.
    async fn stats(&self) -> Result<GraphStats>;
}

/// Open the store selected in settings.
pub fn open_store(settings: &Settings) -> Result<Arc<dyn GraphStore>> {
    match settings.graph_store.provider {
        GraphStoreProvider::Sqlite => Ok(Arc::new(SqliteGraphStore::new(&settings.sqlite_path())?)),
        GraphStoreProvider::Memory => Ok(Arc::new(MemoryGraphStore::new())),
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relationship_statement() {
        let rel = Relationship::from(&Triple::new("Acme", "makes", "widgets"));
        assert_eq!(rel.statement(), "Acme makes widgets");
    }

    #[test]
    fn test_open_memory_store() {
        let mut settings = Settings::default();
        settings.graph_store.provider = GraphStoreProvider::Memory;
        assert!(open_store(&settings).is_ok());
    }
}
