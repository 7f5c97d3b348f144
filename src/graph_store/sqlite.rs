//! SQLite-based graph store implementation.
//!
//! Nodes and edges live in plain tables keyed by their natural identities.
//! Merges are conditional inserts (`ON CONFLICT` / `INSERT OR IGNORE`) inside
//! one transaction per call, with the connection mutex held for the call.

use super::{GraphStats, GraphStore, Relationship, VideoInfo, VideoNode};
use crate::error::{Result, VidgraphError};
use crate::extraction::Triple;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info, instrument};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS videos (
    video_id TEXT PRIMARY KEY,
    transcript TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS entities (
    name TEXT PRIMARY KEY,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS relationships (
    id INTEGER PRIMARY KEY,
    subject TEXT NOT NULL REFERENCES entities(name),
    relation TEXT NOT NULL,
    object TEXT NOT NULL REFERENCES entities(name),
    created_at TEXT NOT NULL,
    UNIQUE (subject, relation, object)
);

CREATE TABLE IF NOT EXISTS video_entities (
    video_id TEXT NOT NULL REFERENCES videos(video_id),
    entity TEXT NOT NULL REFERENCES entities(name),
    PRIMARY KEY (video_id, entity)
);

CREATE TABLE IF NOT EXISTS video_relationships (
    id INTEGER PRIMARY KEY,
    video_id TEXT NOT NULL REFERENCES videos(video_id),
    relationship_id INTEGER NOT NULL REFERENCES relationships(id),
    UNIQUE (video_id, relationship_id)
);

CREATE INDEX IF NOT EXISTS idx_videos_updated_at ON videos(updated_at);
"#;

/// SQLite-based graph store.
pub struct SqliteGraphStore {
    conn: Mutex<Connection>,
}

impl SqliteGraphStore {
    /// Open (or create) a graph database at `path`.
    #[instrument(skip_all)]
    pub fn new(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.busy_timeout(std::time::Duration::from_secs(5))?;
        Self::initialize(&conn)?;

        info!("Initialized SQLite graph store at {:?}", path);

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory graph store (useful for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::initialize(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize(conn: &Connection) -> Result<()> {
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| VidgraphError::GraphStore(format!("Failed to acquire lock: {}", e)))
    }

    fn parse_timestamp(value: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(value)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now())
    }
}

#[async_trait]
impl GraphStore for SqliteGraphStore {
    #[instrument(skip(self, transcript), fields(transcript_len = transcript.len()))]
    async fn upsert_video(&self, video_id: &str, transcript: &str) -> Result<()> {
        let conn = self.lock()?;
        let now = Utc::now().to_rfc3339();

        conn.execute(
            r#"
            INSERT INTO videos (video_id, transcript, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?3)
            ON CONFLICT(video_id) DO UPDATE SET
                transcript = excluded.transcript,
                updated_at = excluded.updated_at
            "#,
            params![video_id, transcript, now],
        )?;

        debug!("Upserted video {}", video_id);
        Ok(())
    }

    #[instrument(skip(self))]
    async fn upsert_triple(&self, video_id: &str, triple: &Triple) -> Result<()> {
        let conn = self.lock()?;
        let tx = conn.unchecked_transaction()?;

        let video_exists: bool = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM videos WHERE video_id = ?1)",
            params![video_id],
            |row| row.get(0),
        )?;
        if !video_exists {
            return Err(VidgraphError::NotFound(video_id.to_string()));
        }

        let now = Utc::now().to_rfc3339();

        for name in [&triple.subject, &triple.object] {
            tx.execute(
                "INSERT OR IGNORE INTO entities (name, created_at) VALUES (?1, ?2)",
                params![name, now],
            )?;
        }

        tx.execute(
            r#"
            INSERT INTO relationships (subject, relation, object, created_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(subject, relation, object) DO NOTHING
            "#,
            params![triple.subject, triple.relation, triple.object, now],
        )?;

        let relationship_id: i64 = tx.query_row(
            "SELECT id FROM relationships WHERE subject = ?1 AND relation = ?2 AND object = ?3",
            params![triple.subject, triple.relation, triple.object],
            |row| row.get(0),
        )?;

        for name in [&triple.subject, &triple.object] {
            tx.execute(
                "INSERT OR IGNORE INTO video_entities (video_id, entity) VALUES (?1, ?2)",
                params![video_id, name],
            )?;
        }

        tx.execute(
            "INSERT OR IGNORE INTO video_relationships (video_id, relationship_id) VALUES (?1, ?2)",
            params![video_id, relationship_id],
        )?;

        tx.commit()?;
        debug!("Merged triple '{}' into video {}", triple, video_id);
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_video(&self, video_id: &str) -> Result<Option<VideoNode>> {
        let conn = self.lock()?;

        let video = conn
            .query_row(
                "SELECT video_id, transcript, created_at, updated_at FROM videos WHERE video_id = ?1",
                params![video_id],
                |row| {
                    let created_at: String = row.get(2)?;
                    let updated_at: String = row.get(3)?;
                    Ok(VideoNode {
                        video_id: row.get(0)?,
                        transcript: row.get(1)?,
                        created_at: Self::parse_timestamp(&created_at),
                        updated_at: Self::parse_timestamp(&updated_at),
                    })
                },
            )
            .optional()?;

        Ok(video)
    }

    #[instrument(skip(self))]
    async fn video_relationships(&self, video_id: &str) -> Result<Vec<Relationship>> {
        let conn = self.lock()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT r.subject, r.relation, r.object
            FROM video_relationships vr
            JOIN relationships r ON r.id = vr.relationship_id
            JOIN video_entities s ON s.video_id = vr.video_id AND s.entity = r.subject
            JOIN video_entities o ON o.video_id = vr.video_id AND o.entity = r.object
            WHERE vr.video_id = ?1
            ORDER BY vr.id
            "#,
        )?;

        let rows = stmt.query_map(params![video_id], |row| {
            Ok(Relationship {
                subject: row.get(0)?,
                relation: row.get(1)?,
                object: row.get(2)?,
            })
        })?;

        let relationships = rows.collect::<std::result::Result<Vec<_>, _>>()?;
        debug!("Found {} relationships for video {}", relationships.len(), video_id);
        Ok(relationships)
    }

    #[instrument(skip(self))]
    async fn video_entities(&self, video_id: &str) -> Result<Vec<String>> {
        let conn = self.lock()?;

        let mut stmt = conn.prepare(
            "SELECT entity FROM video_entities WHERE video_id = ?1 ORDER BY entity",
        )?;
        let rows = stmt.query_map(params![video_id], |row| row.get(0))?;

        Ok(rows.collect::<std::result::Result<Vec<String>, _>>()?)
    }

    #[instrument(skip(self))]
    async fn list_videos(&self) -> Result<Vec<VideoInfo>> {
        let conn = self.lock()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT v.video_id,
                   (SELECT COUNT(*) FROM video_entities ve WHERE ve.video_id = v.video_id),
                   (SELECT COUNT(*) FROM video_relationships vr WHERE vr.video_id = v.video_id),
                   LENGTH(v.transcript),
                   v.updated_at
            FROM videos v
            ORDER BY v.updated_at DESC, v.video_id
            "#,
        )?;

        let rows = stmt.query_map([], |row| {
            let transcript_chars: i64 = row.get(3)?;
            let updated_at: String = row.get(4)?;
            Ok(VideoInfo {
                video_id: row.get(0)?,
                entity_count: row.get(1)?,
                relationship_count: row.get(2)?,
                transcript_chars: transcript_chars.max(0) as u64,
                updated_at: Self::parse_timestamp(&updated_at),
            })
        })?;

        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    async fn stats(&self) -> Result<GraphStats> {
        let conn = self.lock()?;

        let count = |sql: &str| -> Result<u64> {
            let n: i64 = conn.query_row(sql, [], |row| row.get(0))?;
            Ok(n.max(0) as u64)
        };

        Ok(GraphStats {
            videos: count("SELECT COUNT(*) FROM videos")?,
            entities: count("SELECT COUNT(*) FROM entities")?,
            relationships: count("SELECT COUNT(*) FROM relationships")?,
            video_entity_links: count("SELECT COUNT(*) FROM video_entities")?,
        })
    }
}
