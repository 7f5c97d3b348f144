//! Speech commands: transcribe an audio file, synthesize an MP3.

use super::check_or_report;
use crate::cli::preflight::Operation;
use crate::cli::Output;
use crate::config::Settings;
use crate::speech::{AudioTranscriber, OpenAISpeech, SpeechSynthesizer, DEFAULT_AUDIO_FILE_NAME};
use anyhow::{Context, Result};
use std::path::Path;

/// Run the transcribe-audio command.
pub async fn run_transcribe_audio(file: &str, language: &str, settings: Settings) -> Result<()> {
    check_or_report(Operation::Generate, &settings)?;

    let path = shellexpand::tilde(file).to_string();
    let audio = tokio::fs::read(&path)
        .await
        .with_context(|| format!("Failed to read audio file {}", path))?;

    let speech = OpenAISpeech::new(&settings.llm, &settings.speech)?;

    let spinner = Output::spinner("Transcribing...");
    let result = speech
        .transcribe_audio(&audio, &upload_name(&path), language)
        .await;
    spinner.finish_and_clear();

    println!("{}", result?);
    Ok(())
}

/// The audio file's own name, so the service sees its real extension.
fn upload_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .and_then(|name| name.to_str())
        .filter(|name| Path::new(name).extension().is_some())
        .unwrap_or(DEFAULT_AUDIO_FILE_NAME)
        .to_string()
}

/// Run the speak command.
pub async fn run_speak(text: &str, output: &str, language: &str, settings: Settings) -> Result<()> {
    check_or_report(Operation::Generate, &settings)?;

    let speech = OpenAISpeech::new(&settings.llm, &settings.speech)?;

    let spinner = Output::spinner("Synthesizing speech...");
    let result = speech.synthesize_speech(text, language).await;
    spinner.finish_and_clear();

    let audio = result?;
    let path = shellexpand::tilde(output).to_string();
    tokio::fs::write(&path, &audio)
        .await
        .with_context(|| format!("Failed to write {}", path))?;

    Output::success(&format!("Wrote {} bytes to {}", audio.len(), path));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_name_keeps_extension() {
        assert_eq!(upload_name("/home/me/recordings/memo.m4a"), "memo.m4a");
        assert_eq!(upload_name("talk.mp3"), "talk.mp3");
    }

    #[test]
    fn test_upload_name_without_extension() {
        assert_eq!(upload_name("/tmp/recording"), DEFAULT_AUDIO_FILE_NAME);
    }
}
