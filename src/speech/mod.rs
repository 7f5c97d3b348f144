//! Speech collaborators: audio transcription and text-to-speech.
//!
//! Both are thin wrappers around a hosted service; the pipeline never depends
//! on them.

mod openai;

pub use openai::OpenAISpeech;

use crate::error::{Result, VidgraphError};
use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};

/// Upload name used when nothing says what format the audio is in.
pub const DEFAULT_AUDIO_FILE_NAME: &str = "audio.wav";

/// Turns recorded audio into text.
#[async_trait]
pub trait AudioTranscriber: Send + Sync {
    /// Transcribe audio bytes. The extension of `file_name` tells the service
    /// the container format. `language` is a name ("english") or a code ("en").
    async fn transcribe_audio(&self, audio: &[u8], file_name: &str, language: &str)
        -> Result<String>;
}

/// Turns text into spoken audio.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Synthesize speech, returning MP3 bytes.
    async fn synthesize_speech(&self, text: &str, language: &str) -> Result<Vec<u8>>;
}

/// ISO-639-1 code for a language name or code, if known.
pub fn language_code(language: &str) -> Option<&'static str> {
    let code = match language.trim().to_lowercase().as_str() {
        "english" | "en" => "en",
        "spanish" | "español" | "espanol" | "es" => "es",
        "french" | "français" | "francais" | "fr" => "fr",
        "german" | "deutsch" | "de" => "de",
        "italian" | "it" => "it",
        "portuguese" | "pt" => "pt",
        "dutch" | "nl" => "nl",
        "russian" | "ru" => "ru",
        "chinese" | "mandarin" | "zh" => "zh",
        "japanese" | "ja" => "ja",
        "korean" | "ko" => "ko",
        "hindi" | "hi" => "hi",
        "arabic" | "ar" => "ar",
        "turkish" | "tr" => "tr",
        "polish" | "pl" => "pl",
        "swedish" | "sv" => "sv",
        _ => return None,
    };
    Some(code)
}

/// Decoded audio and the file name to upload it under.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioPayload {
    pub bytes: Vec<u8>,
    pub file_name: String,
}

/// Decode an audio payload sent as plain base64 or as a `data:` URL.
///
/// The MIME type of a data URL picks the upload name (`audio/m4a` gives
/// `audio.m4a`); plain base64 falls back to [`DEFAULT_AUDIO_FILE_NAME`].
pub fn decode_audio_data(payload: &str) -> Result<AudioPayload> {
    let payload = payload.trim();
    let (mime, encoded) = match payload.strip_prefix("data:") {
        Some(rest) => {
            let (meta, data) = rest
                .split_once(',')
                .ok_or_else(|| VidgraphError::InvalidInput("malformed data URL".to_string()))?;
            (meta.split(';').next(), data)
        }
        None => (None, payload),
    };

    if encoded.is_empty() {
        return Err(VidgraphError::InvalidInput("audio data is empty".to_string()));
    }

    let bytes = general_purpose::STANDARD
        .decode(encoded)
        .map_err(|e| VidgraphError::InvalidInput(format!("audio data is not valid base64: {}", e)))?;

    let file_name = mime
        .and_then(extension_for_mime)
        .map(|ext| format!("audio.{}", ext))
        .unwrap_or_else(|| DEFAULT_AUDIO_FILE_NAME.to_string());

    Ok(AudioPayload { bytes, file_name })
}

/// File extension the transcription service expects for a MIME type.
pub fn extension_for_mime(mime: &str) -> Option<&'static str> {
    let ext = match mime.trim().to_lowercase().as_str() {
        "audio/m4a" | "audio/x-m4a" | "audio/mp4" => "m4a",
        "audio/mpeg" | "audio/mp3" | "audio/mpga" => "mp3",
        "audio/wav" | "audio/x-wav" | "audio/wave" | "audio/vnd.wave" => "wav",
        "audio/webm" | "video/webm" => "webm",
        "audio/ogg" | "application/ogg" => "ogg",
        "audio/flac" | "audio/x-flac" => "flac",
        "video/mp4" => "mp4",
        _ => return None,
    };
    Some(ext)
}

/// Encode synthesized audio for a JSON response.
pub fn encode_audio_data(audio: &[u8]) -> String {
    general_purpose::STANDARD.encode(audio)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_code() {
        assert_eq!(language_code("English"), Some("en"));
        assert_eq!(language_code(" de "), Some("de"));
        assert_eq!(language_code("Klingon"), None);
    }

    #[test]
    fn test_decode_plain_base64() {
        let audio = decode_audio_data("aGVsbG8=").unwrap();
        assert_eq!(audio.bytes, b"hello");
        assert_eq!(audio.file_name, DEFAULT_AUDIO_FILE_NAME);
    }

    #[test]
    fn test_decode_data_url_keeps_format() {
        let audio = decode_audio_data("data:audio/m4a;base64,aGVsbG8=").unwrap();
        assert_eq!(audio.bytes, b"hello");
        assert_eq!(audio.file_name, "audio.m4a");

        let audio = decode_audio_data("data:audio/webm;codecs=opus;base64,aGVsbG8=").unwrap();
        assert_eq!(audio.file_name, "audio.webm");

        let audio = decode_audio_data("data:application/octet-stream;base64,aGVsbG8=").unwrap();
        assert_eq!(audio.file_name, DEFAULT_AUDIO_FILE_NAME);
    }

    #[test]
    fn test_extension_for_mime() {
        assert_eq!(extension_for_mime("audio/m4a"), Some("m4a"));
        assert_eq!(extension_for_mime("audio/x-m4a"), Some("m4a"));
        assert_eq!(extension_for_mime("Audio/MPEG"), Some("mp3"));
        assert_eq!(extension_for_mime("audio/wav"), Some("wav"));
        assert_eq!(extension_for_mime("text/plain"), None);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(
            decode_audio_data("not base64!"),
            Err(VidgraphError::InvalidInput(_))
        ));
        assert!(matches!(
            decode_audio_data("data:audio/wav;base64"),
            Err(VidgraphError::InvalidInput(_))
        ));
        assert!(matches!(decode_audio_data(""), Err(VidgraphError::InvalidInput(_))));
    }

    #[test]
    fn test_encode_audio() {
        assert_eq!(encode_audio_data(b"hello"), "aGVsbG8=");
    }
}
