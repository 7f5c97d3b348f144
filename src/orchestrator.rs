//! Pipeline orchestrator for vidgraph.
//!
//! Sequences transcript retrieval, graph building and summary generation for
//! one request, and maps failures to the categories callers see.

use crate::config::{Prompts, Settings};
use crate::error::{ErrorKind, Result, VidgraphError};
use crate::extraction::TripleExtractor;
use crate::graph_store::{open_store, GraphStore, VideoGraph, VideoInfo};
use crate::knowledge_graph::{IngestReport, KnowledgeGraphBuilder};
use crate::llm::{OpenAIGenerator, RetryingGenerator, TextGenerator};
use crate::summary::{QuestionAnswerer, SummaryGenerator, SummaryRequest};
use crate::transcript_source::{video_id_from_input, TranscriptSource, YoutubeTranscriptSource};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{info, instrument};

/// A request to ingest a video and summarize it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessRequest {
    /// Video URL or raw id.
    pub video: String,
    pub style: String,
    pub word_count: u32,
    pub language: String,
    /// Transcript supplied by the caller; fetched when absent or blank.
    pub transcript: Option<String>,
}

/// Result of processing a video.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessResult {
    pub video_id: String,
    pub summary: String,
    pub ingest: IngestReport,
}

/// The external shape of a process outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessResponse {
    pub success: bool,
    pub summary: String,
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
}

impl ProcessResponse {
    pub fn from_result(result: Result<ProcessResult>) -> Self {
        match result {
            Ok(result) => Self {
                success: true,
                summary: result.summary,
                message: None,
                error_kind: None,
            },
            Err(e) => Self {
                success: false,
                summary: String::new(),
                message: Some(e.to_string()),
                error_kind: Some(e.kind()),
            },
        }
    }
}

/// The main orchestrator for the vidgraph pipeline.
pub struct Pipeline {
    settings: Settings,
    store: Arc<dyn GraphStore>,
    builder: KnowledgeGraphBuilder,
    summaries: SummaryGenerator,
    answerer: QuestionAnswerer,
    transcripts: Arc<dyn TranscriptSource>,
    video_locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl Pipeline {
    /// Create a pipeline from settings: OpenAI-compatible model with retries,
    /// the configured graph store, and YouTube subtitles as transcript source.
    pub fn new(settings: Settings) -> Result<Self> {
        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;

        let generator: Arc<dyn TextGenerator> = Arc::new(RetryingGenerator::new(
            Arc::new(OpenAIGenerator::new(&settings.llm)?),
            settings.llm.max_retries,
            Duration::from_millis(settings.llm.retry_base_delay_ms),
        ));

        let store = open_store(&settings)?;
        let transcripts = Arc::new(YoutubeTranscriptSource::new(&settings.youtube));

        info!(
            "Pipeline ready (store: {}, extraction: {}, summary: {})",
            settings.graph_store.provider, settings.extraction.model, settings.summary.model
        );

        Ok(Self::with_components(settings, prompts, store, generator, transcripts))
    }

    /// Create a pipeline with custom components.
    pub fn with_components(
        settings: Settings,
        prompts: Prompts,
        store: Arc<dyn GraphStore>,
        generator: Arc<dyn TextGenerator>,
        transcripts: Arc<dyn TranscriptSource>,
    ) -> Self {
        let extractor = TripleExtractor::new(generator.clone(), &settings.extraction)
            .with_prompts(prompts.clone());
        let builder = KnowledgeGraphBuilder::new(store.clone(), extractor);
        let summaries = SummaryGenerator::new(store.clone(), generator.clone(), &settings.summary)
            .with_prompts(prompts.clone());
        let answerer = QuestionAnswerer::new(store.clone(), generator, &settings.summary)
            .with_prompts(prompts);

        Self {
            settings,
            store,
            builder,
            summaries,
            answerer,
            transcripts,
            video_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Get the settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Get the graph store.
    pub fn store(&self) -> Arc<dyn GraphStore> {
        self.store.clone()
    }

    /// Ingest a video and summarize it.
    ///
    /// Any failure aborts the request; no partial summary is returned.
    #[instrument(skip(self, request), fields(video = %request.video))]
    pub async fn process_video(&self, request: &ProcessRequest) -> Result<ProcessResult> {
        let video_id = video_id_from_input(&request.video)?;
        let summary_request =
            SummaryRequest::new(&request.style, request.word_count, &request.language);
        if summary_request.word_count == 0 {
            return Err(VidgraphError::InvalidInput(
                "word count must be positive".to_string(),
            ));
        }

        self.with_video_lock(&video_id, || async {
            let transcript = self
                .resolve_transcript(&video_id, request.transcript.as_deref())
                .await?;
            let ingest = self.builder.ingest(&video_id, &transcript).await?;
            let summary = self.summaries.summarize(&video_id, &summary_request).await?;

            info!("Processed {}", video_id);
            Ok(ProcessResult {
                video_id: video_id.clone(),
                summary,
                ingest,
            })
        })
        .await
    }

    /// Ingest a video without summarizing it.
    #[instrument(skip(self, transcript))]
    pub async fn ingest_video(&self, video: &str, transcript: Option<&str>) -> Result<IngestReport> {
        let video_id = video_id_from_input(video)?;

        self.with_video_lock(&video_id, || async {
            let transcript = self.resolve_transcript(&video_id, transcript).await?;
            self.builder.ingest(&video_id, &transcript).await
        })
        .await
    }

    /// Summarize an already ingested video.
    #[instrument(skip(self, request))]
    pub async fn summarize(&self, video_id: &str, request: &SummaryRequest) -> Result<String> {
        self.with_video_lock(video_id, || self.summaries.summarize(video_id, request))
            .await
    }

    /// Answer a question about a video, ingesting it first when it is not yet
    /// stored or when a transcript is supplied.
    #[instrument(skip(self, transcript))]
    pub async fn ask_question(
        &self,
        video: &str,
        question: &str,
        language: &str,
        transcript: Option<&str>,
    ) -> Result<String> {
        let video_id = video_id_from_input(video)?;
        if question.trim().is_empty() {
            return Err(VidgraphError::InvalidInput("question is empty".to_string()));
        }
        let supplied = transcript.filter(|t| !t.trim().is_empty());

        self.with_video_lock(&video_id, || async {
            if supplied.is_some() || self.store.get_video(&video_id).await?.is_none() {
                let transcript = self.resolve_transcript(&video_id, supplied).await?;
                self.builder.ingest(&video_id, &transcript).await?;
            }
            self.answerer.ask(&video_id, question, language).await
        })
        .await
    }

    /// The entities and relationships of one video.
    pub async fn video_graph(&self, video_id: &str) -> Result<VideoGraph> {
        if self.store.get_video(video_id).await?.is_none() {
            return Err(VidgraphError::NotFound(video_id.to_string()));
        }

        Ok(VideoGraph {
            video_id: video_id.to_string(),
            entities: self.store.video_entities(video_id).await?,
            relationships: self.store.video_relationships(video_id).await?,
        })
    }

    /// List ingested videos, most recently updated first.
    pub async fn list_videos(&self) -> Result<Vec<VideoInfo>> {
        self.store.list_videos().await
    }

    /// Use the supplied transcript, or fetch one.
    async fn resolve_transcript(&self, video_id: &str, supplied: Option<&str>) -> Result<String> {
        if let Some(text) = supplied.filter(|t| !t.trim().is_empty()) {
            return Ok(text.to_string());
        }

        info!("Fetching transcript for {}", video_id);
        let text = self.transcripts.fetch_transcript(video_id).await.map_err(|e| match e {
            VidgraphError::TranscriptUnavailable(_) => e,
            other => VidgraphError::TranscriptUnavailable(other.to_string()),
        })?;

        if text.trim().is_empty() {
            return Err(VidgraphError::TranscriptUnavailable(format!(
                "transcript for {} is empty",
                video_id
            )));
        }

        Ok(text)
    }

    /// Run `f` while holding the lock for `video_id`.
    ///
    /// Requests for the same id run one at a time; other ids are unaffected.
    async fn with_video_lock<T, F, Fut>(&self, video_id: &str, f: F) -> Result<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let lock = {
            let mut locks = self.video_locks.lock().unwrap_or_else(|e| e.into_inner());
            locks.entry(video_id.to_string()).or_default().clone()
        };

        let result = {
            let _guard = lock.lock().await;
            f().await
        };

        let mut locks = self.video_locks.lock().unwrap_or_else(|e| e.into_inner());
        // Only the map and this request still hold it: nobody is waiting.
        if Arc::strong_count(&lock) == 2 {
            locks.remove(video_id);
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph_store::{GraphStats, MemoryGraphStore};
    use crate::llm::testing::ScriptedGenerator;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const TRANSCRIPT: &str = "Alice founded Acme. Acme makes widgets.";

    /// Serves transcripts from a fixed map and counts fetches.
    #[derive(Default)]
    struct StaticTranscripts {
        transcripts: HashMap<String, String>,
        fetches: AtomicUsize,
    }

    impl StaticTranscripts {
        fn with(video_id: &str, transcript: &str) -> Self {
            let mut transcripts = HashMap::new();
            transcripts.insert(video_id.to_string(), transcript.to_string());
            Self {
                transcripts,
                fetches: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl TranscriptSource for StaticTranscripts {
        async fn fetch_transcript(&self, video_id: &str) -> Result<String> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            self.transcripts.get(video_id).cloned().ok_or_else(|| {
                VidgraphError::TranscriptUnavailable(format!("no captions for {}", video_id))
            })
        }
    }

    fn pipeline(
        generator: ScriptedGenerator,
        transcripts: StaticTranscripts,
    ) -> (Pipeline, Arc<ScriptedGenerator>, Arc<StaticTranscripts>) {
        let generator = Arc::new(generator);
        let transcripts = Arc::new(transcripts);
        let pipeline = Pipeline::with_components(
            Settings::default(),
            Prompts::default(),
            Arc::new(MemoryGraphStore::new()),
            generator.clone(),
            transcripts.clone(),
        );
        (pipeline, generator, transcripts)
    }

    fn request(video: &str, transcript: Option<&str>) -> ProcessRequest {
        ProcessRequest {
            video: video.to_string(),
            style: "formal".to_string(),
            word_count: 50,
            language: "english".to_string(),
            transcript: transcript.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_process_video_with_supplied_transcript() {
        let (pipeline, generator, transcripts) = pipeline(
            ScriptedGenerator::new()
                .reply("Alice|founded|Acme\nAcme|makes|widgets")
                .reply("Acme, founded by Alice, makes widgets."),
            StaticTranscripts::default(),
        );

        let result = pipeline
            .process_video(&request("https://www.youtube.com/watch?v=vid1", Some(TRANSCRIPT)))
            .await
            .unwrap();

        assert_eq!(result.video_id, "vid1");
        assert_eq!(result.summary, "Acme, founded by Alice, makes widgets.");
        assert_eq!(result.ingest.triples_stored, 2);
        assert_eq!(transcripts.fetches.load(Ordering::SeqCst), 0);

        let prompts = generator.prompts();
        assert_eq!(prompts.len(), 2);
        assert!(prompts[1].contains("Alice founded Acme"));
        assert!(prompts[1].contains(TRANSCRIPT));
    }

    #[tokio::test]
    async fn test_process_video_fetches_transcript() {
        let (pipeline, _, transcripts) = pipeline(
            ScriptedGenerator::new().reply("Alice|founded|Acme").reply("Summary."),
            StaticTranscripts::with("vid1", TRANSCRIPT),
        );

        let result = pipeline.process_video(&request("vid1", Some("  "))).await.unwrap();
        assert_eq!(result.summary, "Summary.");
        assert_eq!(transcripts.fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_missing_transcript_is_unavailable() {
        let (pipeline, generator, _) =
            pipeline(ScriptedGenerator::new(), StaticTranscripts::default());

        let err = pipeline.process_video(&request("vid1", None)).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TranscriptUnavailable);
        assert!(generator.prompts().is_empty());
        assert!(pipeline.list_videos().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_fetched_transcript_is_unavailable() {
        let (pipeline, _, _) = pipeline(
            ScriptedGenerator::new(),
            StaticTranscripts::with("vid1", " \n"),
        );

        let err = pipeline.process_video(&request("vid1", None)).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TranscriptUnavailable);
    }

    #[tokio::test]
    async fn test_generation_failure_aborts_without_summary() {
        let (pipeline, _, _) = pipeline(
            ScriptedGenerator::new().reply("Alice|founded|Acme").fail("model overloaded"),
            StaticTranscripts::default(),
        );

        let response = ProcessResponse::from_result(
            pipeline.process_video(&request("vid1", Some(TRANSCRIPT))).await,
        );
        assert!(!response.success);
        assert!(response.summary.is_empty());
        assert_eq!(response.error_kind, Some(ErrorKind::GenerationFailure));
        assert!(response.message.unwrap().contains("model overloaded"));
    }

    #[tokio::test]
    async fn test_invalid_requests() {
        let (pipeline, _, _) = pipeline(ScriptedGenerator::new(), StaticTranscripts::default());

        let err = pipeline.process_video(&request("  ", Some(TRANSCRIPT))).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);

        let mut zero = request("vid1", Some(TRANSCRIPT));
        zero.word_count = 0;
        let err = pipeline.process_video(&zero).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[tokio::test]
    async fn test_summarize_never_ingested() {
        let (pipeline, _, _) = pipeline(ScriptedGenerator::new(), StaticTranscripts::default());
        let err = pipeline
            .summarize("ghost", &SummaryRequest::new("formal", 50, "english"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_ask_question_ingests_once() {
        let (pipeline, generator, transcripts) = pipeline(
            ScriptedGenerator::new()
                .reply("Alice|founded|Acme")
                .reply("Alice.")
                .reply("In the transcript."),
            StaticTranscripts::with("vid1", TRANSCRIPT),
        );

        let answer = pipeline
            .ask_question("vid1", "Who founded Acme?", "english", None)
            .await
            .unwrap();
        assert_eq!(answer, "Alice.");

        // already stored: no second fetch or extraction
        let answer = pipeline
            .ask_question("vid1", "Where is that said?", "english", None)
            .await
            .unwrap();
        assert_eq!(answer, "In the transcript.");
        assert_eq!(transcripts.fetches.load(Ordering::SeqCst), 1);
        assert_eq!(generator.prompts().len(), 3);
    }

    #[tokio::test]
    async fn test_blank_question_skips_fetch_and_extraction() {
        let (pipeline, generator, transcripts) = pipeline(
            ScriptedGenerator::new(),
            StaticTranscripts::with("vid1", TRANSCRIPT),
        );

        let err = pipeline
            .ask_question("vid1", "   ", "english", None)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert_eq!(transcripts.fetches.load(Ordering::SeqCst), 0);
        assert!(generator.prompts().is_empty());
        assert!(pipeline.store().get_video("vid1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_video_graph() {
        let (pipeline, _, _) = pipeline(
            ScriptedGenerator::new().reply("Alice|founded|Acme\nAcme|makes|widgets"),
            StaticTranscripts::default(),
        );

        let err = pipeline.video_graph("vid1").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        pipeline.ingest_video("vid1", Some(TRANSCRIPT)).await.unwrap();
        let graph = pipeline.video_graph("vid1").await.unwrap();
        assert_eq!(graph.entities, vec!["Acme", "Alice", "widgets"]);
        assert_eq!(graph.relationships.len(), 2);

        let videos = pipeline.list_videos().await.unwrap();
        assert_eq!(videos.len(), 1);
        assert_eq!(videos[0].relationship_count, 2);
    }

    #[tokio::test]
    async fn test_same_video_requests_are_serialized() {
        let (pipeline, _, _) = pipeline(
            ScriptedGenerator::new()
                .reply("Alice|founded|Acme")
                .reply("First summary.")
                .reply("Alice|founded|Acme")
                .reply("Second summary."),
            StaticTranscripts::default(),
        );

        let first = request("vid1", Some(TRANSCRIPT));
        let second = request("vid1", Some(TRANSCRIPT));
        let (a, b) = tokio::join!(pipeline.process_video(&first), pipeline.process_video(&second));

        let mut summaries = vec![a.unwrap().summary, b.unwrap().summary];
        summaries.sort();
        assert_eq!(summaries, vec!["First summary.", "Second summary."]);

        assert_eq!(
            pipeline.store().stats().await.unwrap(),
            GraphStats {
                videos: 1,
                entities: 2,
                relationships: 1,
                video_entity_links: 2,
            }
        );
        assert!(pipeline.video_locks.lock().unwrap().is_empty());
    }

    #[test]
    fn test_response_serialization() {
        let response = ProcessResponse {
            success: true,
            summary: "ok".to_string(),
            message: None,
            error_kind: None,
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json, serde_json::json!({"success": true, "summary": "ok", "message": null}));

        let response = ProcessResponse::from_result(Err(VidgraphError::NotFound("v".to_string())));
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["error_kind"], "not_found");
    }
}
