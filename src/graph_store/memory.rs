//! In-memory graph store implementation.
//!
//! Useful for testing and one-off runs that do not need durability.

use super::{GraphStats, GraphStore, Relationship, VideoInfo, VideoNode};
use crate::error::{Result, VidgraphError};
use crate::extraction::Triple;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Default)]
struct GraphState {
    videos: HashMap<String, VideoNode>,
    entities: HashSet<String>,
    /// Relationships in creation order; the index is the edge id.
    relationships: Vec<Relationship>,
    relationship_ids: HashMap<Relationship, usize>,
    video_entities: HashMap<String, BTreeSet<String>>,
    /// Edge ids asserted by each video, in first-seen order.
    video_relationships: HashMap<String, Vec<usize>>,
}

/// In-memory graph store.
pub struct MemoryGraphStore {
    state: RwLock<GraphState>,
}

impl MemoryGraphStore {
    /// Create a new, empty in-memory graph store.
    pub fn new() -> Self {
        Self {
            state: RwLock::new(GraphState::default()),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, GraphState>> {
        self.state
            .read()
            .map_err(|e| VidgraphError::GraphStore(format!("Failed to acquire lock: {}", e)))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, GraphState>> {
        self.state
            .write()
            .map_err(|e| VidgraphError::GraphStore(format!("Failed to acquire lock: {}", e)))
    }
}

impl Default for MemoryGraphStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GraphStore for MemoryGraphStore {
    async fn upsert_video(&self, video_id: &str, transcript: &str) -> Result<()> {
        let mut state = self.write()?;
        let now = Utc::now();

        state
            .videos
            .entry(video_id.to_string())
            .and_modify(|video| {
                video.transcript = transcript.to_string();
                video.updated_at = now;
            })
            .or_insert_with(|| VideoNode {
                video_id: video_id.to_string(),
                transcript: transcript.to_string(),
                created_at: now,
                updated_at: now,
            });

        Ok(())
    }

    async fn upsert_triple(&self, video_id: &str, triple: &Triple) -> Result<()> {
        let mut state = self.write()?;

        if !state.videos.contains_key(video_id) {
            return Err(VidgraphError::NotFound(video_id.to_string()));
        }

        state.entities.insert(triple.subject.clone());
        state.entities.insert(triple.object.clone());

        let relationship = Relationship::from(triple);
        let id = match state.relationship_ids.get(&relationship) {
            Some(id) => *id,
            None => {
                let id = state.relationships.len();
                state.relationships.push(relationship.clone());
                state.relationship_ids.insert(relationship, id);
                id
            }
        };

        let linked = state.video_entities.entry(video_id.to_string()).or_default();
        linked.insert(triple.subject.clone());
        linked.insert(triple.object.clone());

        let asserted = state
            .video_relationships
            .entry(video_id.to_string())
            .or_default();
        if !asserted.contains(&id) {
            asserted.push(id);
        }

        Ok(())
    }

    async fn get_video(&self, video_id: &str) -> Result<Option<VideoNode>> {
        Ok(self.read()?.videos.get(video_id).cloned())
    }

    async fn video_relationships(&self, video_id: &str) -> Result<Vec<Relationship>> {
        let state = self.read()?;

        let (Some(ids), Some(linked)) = (
            state.video_relationships.get(video_id),
            state.video_entities.get(video_id),
        ) else {
            return Ok(Vec::new());
        };

        Ok(ids
            .iter()
            .map(|id| &state.relationships[*id])
            .filter(|r| linked.contains(&r.subject) && linked.contains(&r.object))
            .cloned()
            .collect())
    }

    async fn video_entities(&self, video_id: &str) -> Result<Vec<String>> {
        let state = self.read()?;
        Ok(state
            .video_entities
            .get(video_id)
            .map(|linked| linked.iter().cloned().collect())
            .unwrap_or_default())
    }

    async fn list_videos(&self) -> Result<Vec<VideoInfo>> {
        let state = self.read()?;

        let mut videos: Vec<VideoInfo> = state
            .videos
            .values()
            .map(|video| VideoInfo {
                video_id: video.video_id.clone(),
                entity_count: state
                    .video_entities
                    .get(&video.video_id)
                    .map_or(0, |e| e.len() as u32),
                relationship_count: state
                    .video_relationships
                    .get(&video.video_id)
                    .map_or(0, |r| r.len() as u32),
                transcript_chars: video.transcript.chars().count() as u64,
                updated_at: video.updated_at,
            })
            .collect();

        videos.sort_by(|a, b| {
            b.updated_at
                .cmp(&a.updated_at)
                .then_with(|| a.video_id.cmp(&b.video_id))
        });

        Ok(videos)
    }

    async fn stats(&self) -> Result<GraphStats> {
        let state = self.read()?;
        Ok(GraphStats {
            videos: state.videos.len() as u64,
            entities: state.entities.len() as u64,
            relationships: state.relationships.len() as u64,
            video_entity_links: state.video_entities.values().map(|e| e.len() as u64).sum(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph_store::conformance;

    #[tokio::test]
    async fn test_upsert_is_idempotent() {
        conformance::upsert_is_idempotent(&MemoryGraphStore::new()).await;
    }

    #[tokio::test]
    async fn test_relation_types_are_distinct_edges() {
        conformance::relation_types_are_distinct_edges(&MemoryGraphStore::new()).await;
    }

    #[tokio::test]
    async fn test_transcript_last_write_wins() {
        conformance::transcript_last_write_wins(&MemoryGraphStore::new()).await;
    }

    #[tokio::test]
    async fn test_triple_requires_video() {
        conformance::triple_requires_video(&MemoryGraphStore::new()).await;
    }

    #[tokio::test]
    async fn test_relationships_are_scoped_per_video() {
        conformance::relationships_are_scoped_per_video(&MemoryGraphStore::new()).await;
    }

    #[tokio::test]
    async fn test_shared_relationship_counts_once() {
        conformance::shared_relationship_counts_once(&MemoryGraphStore::new()).await;
    }

    #[tokio::test]
    async fn test_list_videos_reports_counts() {
        conformance::list_videos_reports_counts(&MemoryGraphStore::new()).await;
    }

    #[tokio::test]
    async fn test_unknown_video_reads_are_empty() {
        conformance::unknown_video_reads_are_empty(&MemoryGraphStore::new()).await;
    }
}
