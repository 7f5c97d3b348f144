//! List command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Pipeline;
use anyhow::Result;

/// Run the list command.
pub async fn run_list(settings: Settings) -> Result<()> {
    let pipeline = Pipeline::new(settings)?;

    match pipeline.list_videos().await {
        Ok(videos) => {
            if videos.is_empty() {
                Output::info("No videos ingested yet. Use 'vidgraph process <video>' to add one.");
            } else {
                Output::header(&format!("Ingested Videos ({})", videos.len()));
                println!();

                for video in &videos {
                    Output::video_info(video);
                }

                let stats = pipeline.store().stats().await?;
                println!();
                Output::kv("Total videos", &stats.videos.to_string());
                Output::kv("Total entities", &stats.entities.to_string());
                Output::kv("Total relationships", &stats.relationships.to_string());
            }
        }
        Err(e) => {
            Output::error(&format!("Failed to list videos: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
