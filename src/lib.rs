//! vidgraph - Video Knowledge Graphs and Controlled Summaries
//!
//! Ingests a video transcript, extracts a lightweight knowledge graph of
//! entities and relationships with a language model, stores it, and later
//! writes style, length and language controlled summaries from the stored
//! graph plus the original transcript.
//!
//! # Overview
//!
//! vidgraph allows you to:
//! - Fetch YouTube subtitles or supply your own transcript
//! - Build a per-video knowledge graph of `subject relation object` facts
//! - Summarize a video in any style, length and language
//! - Ask questions about an ingested video
//! - Serve all of the above over HTTP
//!
//! # Architecture
//!
//! - `config` - Configuration and prompt templates
//! - `llm` - Text generation (OpenAI-compatible) with bounded retries
//! - `extraction` - Triple extraction and the line parser
//! - `graph_store` - Graph persistence (SQLite, in-memory)
//! - `knowledge_graph` - Transcript to graph mutations
//! - `summary` - Summary generation and question answering
//! - `transcript_source` - Video id parsing and subtitle fetching
//! - `speech` - Audio transcription and text-to-speech
//! - `orchestrator` - Pipeline coordination
//!
//! # Example
//!
//! ```rust,no_run
//! use vidgraph::config::Settings;
//! use vidgraph::orchestrator::{Pipeline, ProcessRequest};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let pipeline = Pipeline::new(settings)?;
//!
//!     let result = pipeline
//!         .process_video(&ProcessRequest {
//!             video: "https://www.youtube.com/watch?v=dQw4w9WgXcQ".to_string(),
//!             style: "casual".to_string(),
//!             word_count: 100,
//!             language: "english".to_string(),
//!             transcript: None,
//!         })
//!         .await?;
//!     println!("{}", result.summary);
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod extraction;
pub mod graph_store;
pub mod knowledge_graph;
pub mod llm;
pub mod openai;
pub mod orchestrator;
pub mod speech;
pub mod summary;
pub mod transcript_source;

pub use error::{ErrorKind, Result, VidgraphError};
