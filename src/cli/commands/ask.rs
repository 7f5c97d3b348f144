//! Ask command implementation.

use super::process::operation_for;
use super::{check_or_report, read_transcript};
use crate::cli::preflight::Operation;
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Pipeline;
use crate::transcript_source::video_id_from_input;
use anyhow::Result;

/// Run the ask command.
pub async fn run_ask(
    video: &str,
    question: &str,
    language: Option<String>,
    transcript_file: Option<&str>,
    settings: Settings,
) -> Result<()> {
    let transcript = read_transcript(transcript_file)?;
    let video_id = video_id_from_input(video)?;
    let language = language.unwrap_or_else(|| settings.summary.default_language.clone());
    let pipeline = Pipeline::new(settings)?;

    let operation = required_operation(&pipeline, &video_id, transcript.is_some()).await?;
    check_or_report(operation, pipeline.settings())?;

    let spinner = Output::spinner("Thinking...");
    let result = pipeline
        .ask_question(video, question, &language, transcript.as_deref())
        .await;
    spinner.finish_and_clear();

    match result {
        Ok(answer) => println!("\n{}\n", answer),
        Err(e) => {
            Output::error(&format!("Failed to generate answer: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}

/// A stored video is answered from its graph without fetching subtitles.
async fn required_operation(
    pipeline: &Pipeline,
    video_id: &str,
    has_transcript: bool,
) -> Result<Operation> {
    let stored = pipeline.store().get_video(video_id).await?.is_some();
    Ok(operation_for(has_transcript || stored))
}
