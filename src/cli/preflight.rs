//! Pre-flight checks before expensive operations.
//!
//! Validates that required tools and configuration are available
//! before starting operations that would otherwise fail midway.

use crate::config::Settings;
use crate::error::{Result, VidgraphError};
use std::process::Command;

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Model calls on a transcript the user supplied.
    Generate,
    /// Model calls plus fetching subtitles with yt-dlp.
    FetchAndGenerate,
}

/// Run pre-flight checks for the given operation.
///
/// Returns Ok(()) if all checks pass, or an error describing what's missing.
pub fn check(operation: Operation, settings: &Settings) -> Result<()> {
    match operation {
        Operation::Generate => {
            check_api_key(settings)?;
        }
        Operation::FetchAndGenerate => {
            check_api_key(settings)?;
            check_tool(&settings.youtube.ytdlp_path)?;
        }
    }
    Ok(())
}

/// Check if the API key is configured.
///
/// Endpoints on a custom base URL (e.g. a local server) may not need one.
pub fn check_api_key(settings: &Settings) -> Result<()> {
    if settings.llm.api_base.is_some() || settings.llm.api_key().is_some() {
        return Ok(());
    }

    Err(VidgraphError::Config(format!(
        "{} not set. Set it with: export {}='sk-...'",
        settings.llm.api_key_env, settings.llm.api_key_env
    )))
}

/// Check if an external tool is available.
pub fn check_tool(name: &str) -> Result<()> {
    match Command::new(name).arg("--version").output() {
        Ok(output) if output.status.success() => Ok(()),
        Ok(_) => Err(VidgraphError::ToolNotFound(format!(
            "{} is installed but not working correctly",
            name
        ))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(VidgraphError::ToolNotFound(name.to_string()))
        }
        Err(e) => Err(VidgraphError::ToolNotFound(format!("{}: {}", name, e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_api_key() {
        let mut settings = Settings::default();
        settings.llm.api_key_env = "VIDGRAPH_TEST_KEY_THAT_IS_NOT_SET".to_string();
        let err = check(Operation::Generate, &settings).unwrap_err();
        assert!(err.to_string().contains("VIDGRAPH_TEST_KEY_THAT_IS_NOT_SET"));
    }

    #[test]
    fn test_custom_base_skips_key() {
        let mut settings = Settings::default();
        settings.llm.api_key_env = "VIDGRAPH_TEST_KEY_THAT_IS_NOT_SET".to_string();
        settings.llm.api_base = Some("http://localhost:8080/v1".to_string());
        assert!(check_api_key(&settings).is_ok());
    }

    #[test]
    fn test_missing_tool() {
        assert!(matches!(
            check_tool("/nonexistent/vidgraph-tool"),
            Err(VidgraphError::ToolNotFound(_))
        ));
    }
}
