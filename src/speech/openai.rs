//! OpenAI audio endpoints (Whisper transcription and TTS).

use super::{language_code, AudioTranscriber, SpeechSynthesizer};
use crate::config::{LlmSettings, SpeechSettings};
use crate::error::{Result, VidgraphError};
use crate::openai::create_client;
use async_openai::types::{
    AudioInput, CreateSpeechRequestArgs, CreateTranscriptionRequestArgs, SpeechModel,
    SpeechResponseFormat, Voice,
};
use async_trait::async_trait;
use tracing::{debug, instrument, warn};

/// Speech services on an OpenAI-compatible endpoint.
pub struct OpenAISpeech {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    transcription_model: String,
    tts_model: SpeechModel,
    voice: Voice,
}

impl OpenAISpeech {
    pub fn new(llm: &LlmSettings, settings: &SpeechSettings) -> Result<Self> {
        Ok(Self {
            client: create_client(llm)?,
            transcription_model: settings.transcription_model.clone(),
            tts_model: speech_model(&settings.tts_model),
            voice: voice(&settings.voice),
        })
    }
}

fn speech_model(name: &str) -> SpeechModel {
    match name {
        "tts-1" => SpeechModel::Tts1,
        "tts-1-hd" => SpeechModel::Tts1Hd,
        other => SpeechModel::Other(other.to_string()),
    }
}

fn voice(name: &str) -> Voice {
    match name.to_lowercase().as_str() {
        "alloy" => Voice::Alloy,
        "echo" => Voice::Echo,
        "fable" => Voice::Fable,
        "onyx" => Voice::Onyx,
        "nova" => Voice::Nova,
        "shimmer" => Voice::Shimmer,
        other => {
            warn!("Unknown voice '{}', using alloy", other);
            Voice::Alloy
        }
    }
}

#[async_trait]
impl AudioTranscriber for OpenAISpeech {
    #[instrument(skip(self, audio), fields(audio_len = audio.len()))]
    async fn transcribe_audio(
        &self,
        audio: &[u8],
        file_name: &str,
        language: &str,
    ) -> Result<String> {
        if audio.is_empty() {
            return Err(VidgraphError::InvalidInput("audio is empty".to_string()));
        }

        let mut request_builder = CreateTranscriptionRequestArgs::default();
        request_builder
            .file(AudioInput::from_vec_u8(file_name.to_string(), audio.to_vec()))
            .model(&self.transcription_model);

        if let Some(code) = language_code(language) {
            request_builder.language(code);
        }

        let request = request_builder
            .build()
            .map_err(|e| VidgraphError::Speech(format!("Failed to build request: {}", e)))?;

        let response = self
            .client
            .audio()
            .transcribe(request)
            .await
            .map_err(|e| VidgraphError::Speech(format!("Transcription failed: {}", e)))?;

        debug!("Transcribed {} characters", response.text.len());
        Ok(response.text)
    }
}

#[async_trait]
impl SpeechSynthesizer for OpenAISpeech {
    #[instrument(skip(self, text), fields(text_len = text.len()))]
    async fn synthesize_speech(&self, text: &str, language: &str) -> Result<Vec<u8>> {
        if text.trim().is_empty() {
            return Err(VidgraphError::InvalidInput("text is empty".to_string()));
        }

        // The TTS voices detect the language from the text itself.
        debug!("Synthesizing speech in {}", language);

        let request = CreateSpeechRequestArgs::default()
            .input(text)
            .model(self.tts_model.clone())
            .voice(self.voice.clone())
            .response_format(SpeechResponseFormat::Mp3)
            .build()
            .map_err(|e| VidgraphError::Speech(format!("Failed to build request: {}", e)))?;

        let response = self
            .client
            .audio()
            .speech(request)
            .await
            .map_err(|e| VidgraphError::Speech(format!("Speech synthesis failed: {}", e)))?;

        Ok(response.bytes.to_vec())
    }
}
