//! Summarize command implementation.

use super::check_or_report;
use crate::cli::preflight::Operation;
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Pipeline;
use crate::summary::SummaryRequest;
use anyhow::Result;

/// Run the summarize command on an already ingested video.
pub async fn run_summarize(
    video_id: &str,
    style: Option<String>,
    words: Option<u32>,
    language: Option<String>,
    settings: Settings,
) -> Result<()> {
    check_or_report(Operation::Generate, &settings)?;

    let mut request = SummaryRequest::from(&settings.summary);
    if let Some(style) = style {
        request.style = style;
    }
    if let Some(words) = words {
        request.word_count = words;
    }
    if let Some(language) = language {
        request.language = language;
    }

    let pipeline = Pipeline::new(settings)?;

    let spinner = Output::spinner("Writing summary...");
    let result = pipeline.summarize(video_id, &request).await;
    spinner.finish_and_clear();

    match result {
        Ok(summary) => println!("\n{}\n", summary),
        Err(e) => {
            Output::error(&format!("Failed to summarize {}: {}", video_id, e));
            if e.kind() == crate::ErrorKind::NotFound {
                Output::info("Ingest it first with 'vidgraph ingest <video>'.");
            }
            return Err(e.into());
        }
    }

    Ok(())
}
