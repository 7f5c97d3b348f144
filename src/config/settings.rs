//! Configuration settings for vidgraph.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub llm: LlmSettings,
    pub extraction: ExtractionSettings,
    pub summary: SummarySettings,
    pub graph_store: GraphStoreSettings,
    pub youtube: YoutubeSettings,
    pub speech: SpeechSettings,
    pub server: ServerSettings,
    pub prompts: PromptSettings,
}


/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Directory for storing application data.
    pub data_dir: String,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            data_dir: "~/.vidgraph".to_string(),
            log_level: "warn".to_string(),
        }
    }
}

/// Connection settings for the OpenAI-compatible model endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    /// Base URL of an OpenAI-compatible API (e.g. https://api.groq.com/openai/v1).
    /// None uses the OpenAI default.
    pub api_base: Option<String>,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Retries for failed generation calls (0 disables retrying).
    pub max_retries: u32,
    /// Delay before the first retry; doubles on each attempt.
    pub retry_base_delay_ms: u64,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            api_base: None,
            api_key_env: "OPENAI_API_KEY".to_string(),
            timeout_secs: 300,
            max_retries: 2,
            retry_base_delay_ms: 500,
        }
    }
}

impl LlmSettings {
    /// Read the API key from the configured environment variable.
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.is_empty())
    }
}

/// Triple extraction settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionSettings {
    /// Model used to extract relationship triples.
    pub model: String,
    /// Sampling temperature for extraction.
    pub temperature: f32,
}

impl Default for ExtractionSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            temperature: 0.5,
        }
    }
}

/// Summary and question-answering settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SummarySettings {
    /// Model used for summaries and answers.
    pub model: String,
    /// Sampling temperature. None leaves the provider default.
    pub temperature: Option<f32>,
    /// Style used when a request does not name one.
    pub default_style: String,
    /// Approximate word count used when a request does not name one.
    pub default_word_count: u32,
    /// Output language used when a request does not name one.
    pub default_language: String,
}

impl Default for SummarySettings {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            temperature: None,
            default_style: "formal".to_string(),
            default_word_count: 150,
            default_language: "english".to_string(),
        }
    }
}

/// Graph store backend.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum GraphStoreProvider {
    /// Durable SQLite database (default).
    #[default]
    Sqlite,
    /// In-process store, lost on exit.
    Memory,
}

impl std::fmt::Display for GraphStoreProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GraphStoreProvider::Sqlite => write!(f, "sqlite"),
            GraphStoreProvider::Memory => write!(f, "memory"),
        }
    }
}

/// Graph store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphStoreSettings {
    /// Backend (sqlite, memory).
    pub provider: GraphStoreProvider,
    /// Path to SQLite database (for sqlite provider).
    pub sqlite_path: String,
}

impl Default for GraphStoreSettings {
    fn default() -> Self {
        Self {
            provider: GraphStoreProvider::Sqlite,
            sqlite_path: "~/.vidgraph/graph.db".to_string(),
        }
    }
}

/// YouTube transcript fetching settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct YoutubeSettings {
    /// yt-dlp executable.
    pub ytdlp_path: String,
    /// Subtitle languages to request, in order of preference.
    pub subtitle_languages: Vec<String>,
}

impl Default for YoutubeSettings {
    fn default() -> Self {
        Self {
            ytdlp_path: "yt-dlp".to_string(),
            subtitle_languages: vec!["en".to_string()],
        }
    }
}

/// Speech-to-text and text-to-speech settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechSettings {
    /// Audio transcription model.
    pub transcription_model: String,
    /// Text-to-speech model.
    pub tts_model: String,
    /// Text-to-speech voice.
    pub voice: String,
}

impl Default for SpeechSettings {
    fn default() -> Self {
        Self {
            transcription_model: "whisper-1".to_string(),
            tts_model: "tts-1".to_string(),
            voice: "alloy".to_string(),
        }
    }
}

/// HTTP API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Host to bind to.
    pub host: String,
    /// Port to bind to.
    pub port: u16,
    /// Allowed CORS origins. Empty allows any origin.
    pub cors_origins: Vec<String>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            cors_origins: Vec::new(),
        }
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct PromptSettings {
    /// Directory for custom prompts (overrides defaults).
    pub custom_dir: Option<String>,
    /// Custom variables available in all prompts as {{variable_name}}.
    pub variables: std::collections::HashMap<String, String>,
}


impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::VidgraphError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("vidgraph")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded data directory path.
    pub fn data_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.data_dir)
    }

    /// Get the expanded SQLite database path.
    pub fn sqlite_path(&self) -> PathBuf {
        Self::expand_path(&self.graph_store.sqlite_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let settings: Settings = toml::from_str(
            r#"
            [llm]
            api_base = "https://api.groq.com/openai/v1"
            api_key_env = "GROQ_API_KEY"

            [extraction]
            model = "llama3-70b-8192"

            [graph_store]
            provider = "memory"
            "#,
        )
        .unwrap();

        assert_eq!(settings.llm.api_base.as_deref(), Some("https://api.groq.com/openai/v1"));
        assert_eq!(settings.llm.api_key_env, "GROQ_API_KEY");
        assert_eq!(settings.llm.max_retries, 2);
        assert_eq!(settings.extraction.model, "llama3-70b-8192");
        assert!((settings.extraction.temperature - 0.5).abs() < f32::EPSILON);
        assert_eq!(settings.graph_store.provider, GraphStoreProvider::Memory);
        assert_eq!(settings.summary.default_language, "english");
        assert_eq!(settings.server.port, 8000);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut settings = Settings::default();
        settings.summary.default_style = "casual".to_string();
        settings.server.cors_origins = vec!["https://example.com".to_string()];
        settings.save_to(&path).unwrap();

        let loaded = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(loaded.summary.default_style, "casual");
        assert_eq!(loaded.server.cors_origins, vec!["https://example.com".to_string()]);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load_from(Some(&dir.path().join("absent.toml"))).unwrap();
        assert_eq!(settings.graph_store.provider, GraphStoreProvider::Sqlite);
    }
}
