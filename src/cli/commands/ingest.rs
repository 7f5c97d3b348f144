//! Ingest command implementation.

use super::process::operation_for;
use super::{check_or_report, read_transcript};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Pipeline;
use anyhow::Result;

/// Run the ingest command.
pub async fn run_ingest(video: &str, transcript_file: Option<&str>, settings: Settings) -> Result<()> {
    let transcript = read_transcript(transcript_file)?;
    check_or_report(operation_for(transcript.is_some()), &settings)?;

    let pipeline = Pipeline::new(settings)?;

    let spinner = Output::spinner("Extracting relationships...");
    let result = pipeline.ingest_video(video, transcript.as_deref()).await;
    spinner.finish_and_clear();

    match result {
        Ok(report) => {
            Output::success(&format!("Ingested {}", report.video_id));
            Output::kv("Triples extracted", &report.triples_extracted.to_string());
            Output::kv("Triples stored", &report.triples_stored.to_string());
        }
        Err(e) => {
            Output::error(&format!("Failed to ingest {}: {}", video, e));
            return Err(e.into());
        }
    }

    Ok(())
}
