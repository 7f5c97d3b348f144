//! Process command implementation.

use super::{check_or_report, read_transcript};
use crate::cli::preflight::Operation;
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::{Pipeline, ProcessRequest, ProcessResponse};
use anyhow::Result;

/// Run the process command: ingest a video, then summarize it.
pub async fn run_process(
    video: &str,
    style: Option<String>,
    words: Option<u32>,
    language: Option<String>,
    transcript_file: Option<&str>,
    json: bool,
    settings: Settings,
) -> Result<()> {
    let transcript = read_transcript(transcript_file)?;
    check_or_report(operation_for(transcript.is_some()), &settings)?;

    let defaults = &settings.summary;
    let request = ProcessRequest {
        video: video.to_string(),
        style: style.unwrap_or_else(|| defaults.default_style.clone()),
        word_count: words.unwrap_or(defaults.default_word_count),
        language: language.unwrap_or_else(|| defaults.default_language.clone()),
        transcript,
    };

    let pipeline = Pipeline::new(settings)?;

    let spinner = Output::spinner("Building knowledge graph and writing summary...");
    let result = pipeline.process_video(&request).await;
    spinner.finish_and_clear();

    if json {
        let failed = result.is_err();
        let response = ProcessResponse::from_result(result);
        println!("{}", serde_json::to_string_pretty(&response)?);
        if failed {
            std::process::exit(1);
        }
        return Ok(());
    }

    match result {
        Ok(result) => {
            Output::success(&format!(
                "Ingested {} ({} relationships)",
                result.video_id, result.ingest.triples_stored
            ));
            println!("\n{}\n", result.summary);
        }
        Err(e) => {
            Output::error(&format!("Failed to process {}: {}", video, e));
            return Err(e.into());
        }
    }

    Ok(())
}

/// Fetching subtitles needs yt-dlp; a transcript already at hand does not.
pub(super) fn operation_for(has_transcript: bool) -> Operation {
    if has_transcript {
        Operation::Generate
    } else {
        Operation::FetchAndGenerate
    }
}
