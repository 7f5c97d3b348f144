//! CLI command implementations.

mod ask;
mod config;
mod doctor;
mod graph;
mod ingest;
mod list;
mod process;
mod serve;
mod speech;
mod summarize;

pub use ask::run_ask;
pub use config::run_config;
pub use doctor::run_doctor;
pub use graph::run_graph;
pub use ingest::run_ingest;
pub use list::run_list;
pub use process::run_process;
pub use serve::{router, run_serve, AppState};
pub use speech::{run_speak, run_transcribe_audio};
pub use summarize::run_summarize;

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use anyhow::{Context, Result};

/// Read a transcript file given on the command line.
fn read_transcript(path: Option<&str>) -> Result<Option<String>> {
    let Some(path) = path else {
        return Ok(None);
    };

    let path = shellexpand::tilde(path).to_string();
    let text = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read transcript file {}", path))?;
    Ok(Some(text))
}

/// Run pre-flight checks, pointing the user at `doctor` on failure.
fn check_or_report(operation: Operation, settings: &Settings) -> Result<()> {
    if let Err(e) = preflight::check(operation, settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'vidgraph doctor' for detailed diagnostics.");
        return Err(e.into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_read_transcript() {
        assert!(read_transcript(None).unwrap().is_none());

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "Alice founded Acme.").unwrap();
        let text = read_transcript(file.path().to_str()).unwrap();
        assert_eq!(text.as_deref(), Some("Alice founded Acme."));

        assert!(read_transcript(Some("/nonexistent/transcript.txt")).is_err());
    }
}
