//! Graph command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Pipeline;
use anyhow::Result;

/// Print the entities and relationships of one video.
pub async fn run_graph(video_id: &str, json: bool, settings: Settings) -> Result<()> {
    let pipeline = Pipeline::new(settings)?;

    let graph = match pipeline.video_graph(video_id).await {
        Ok(graph) => graph,
        Err(e) => {
            Output::error(&format!("{}", e));
            return Err(e.into());
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&graph)?);
        return Ok(());
    }

    Output::header(&format!("Entities ({})", graph.entities.len()));
    for entity in &graph.entities {
        Output::list_item(entity);
    }

    Output::header(&format!("Relationships ({})", graph.relationships.len()));
    if graph.relationships.is_empty() {
        Output::info("No relationships were extracted for this video.");
    }
    for rel in &graph.relationships {
        Output::relationship(rel);
    }

    Ok(())
}
