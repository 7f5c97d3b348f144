//! Configuration module for vidgraph.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{AnswerPrompts, ExtractionPrompts, Prompts, SummaryPrompts};
pub use settings::{
    ExtractionSettings, GeneralSettings, GraphStoreProvider, GraphStoreSettings, LlmSettings,
    PromptSettings, ServerSettings, Settings, SpeechSettings, SummarySettings, YoutubeSettings,
};
