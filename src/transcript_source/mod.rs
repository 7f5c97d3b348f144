//! Where transcripts come from.
//!
//! A transcript source turns a video id into plain text. The pipeline only
//! needs the text; timing and speaker information are dropped.

mod youtube;

pub use youtube::{vtt_to_text, YoutubeTranscriptSource};

use crate::error::{Result, VidgraphError};
use async_trait::async_trait;
use url::Url;

/// Trait for transcript providers.
#[async_trait]
pub trait TranscriptSource: Send + Sync {
    /// Fetch the transcript of a video.
    ///
    /// Every failure, including an empty transcript, is reported as
    /// [`VidgraphError::TranscriptUnavailable`].
    async fn fetch_transcript(&self, video_id: &str) -> Result<String>;
}

/// Derive a video id from a URL or a raw id.
///
/// A URL with a `v` query parameter yields that parameter. Otherwise the text
/// after the last `v=` up to the first `&` or `#` is used, and failing that the
/// trimmed input is taken as the id.
pub fn video_id_from_input(input: &str) -> Result<String> {
    let input = input.trim();

    if let Ok(url) = Url::parse(input) {
        if let Some((_, v)) = url.query_pairs().find(|(key, _)| key == "v") {
            let v = v.trim();
            if !v.is_empty() {
                return Ok(v.to_string());
            }
        }
    }

    let id = match input.rfind("v=") {
        Some(pos) => {
            let rest = &input[pos + 2..];
            rest.find(|c: char| c == '&' || c == '#')
                .map_or(rest, |end| &rest[..end])
        }
        None => input,
    };

    let id = id.trim();
    if id.is_empty() {
        return Err(VidgraphError::InvalidInput(format!(
            "cannot derive a video id from '{}'",
            input
        )));
    }

    Ok(id.to_string())
}
