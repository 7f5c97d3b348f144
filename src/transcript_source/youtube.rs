//! YouTube subtitles via yt-dlp.

use super::TranscriptSource;
use crate::config::YoutubeSettings;
use crate::error::{Result, VidgraphError};
use async_trait::async_trait;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::OnceLock;
use tokio::process::Command;
use tracing::{debug, info, instrument};

/// Fetches manual or auto-generated YouTube subtitles with yt-dlp.
pub struct YoutubeTranscriptSource {
    ytdlp_path: String,
    languages: Vec<String>,
}

impl YoutubeTranscriptSource {
    pub fn new(settings: &YoutubeSettings) -> Self {
        Self {
            ytdlp_path: settings.ytdlp_path.clone(),
            languages: settings.subtitle_languages.clone(),
        }
    }

    /// Download the subtitle file for a video into `output_dir`.
    async fn download_subtitles(&self, video_id: &str, output_dir: &Path) -> Result<PathBuf> {
        let url = format!("https://www.youtube.com/watch?v={}", video_id);
        let template = output_dir.join("%(id)s.%(ext)s");
        let languages = if self.languages.is_empty() {
            "en".to_string()
        } else {
            self.languages.join(",")
        };

        debug!("Fetching {} subtitles for {}", languages, video_id);

        let result = Command::new(&self.ytdlp_path)
            .arg("--skip-download")
            .arg("--write-subs")
            .arg("--write-auto-subs")
            .arg("--sub-langs").arg(&languages)
            .arg("--sub-format").arg("vtt")
            .arg("--output").arg(&template)
            .arg("--no-playlist")
            .arg("--quiet")
            .arg("--no-warnings")
            .arg(&url)
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await;

        let output = match result {
            Ok(o) => o,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(VidgraphError::ToolNotFound(self.ytdlp_path.clone()));
            }
            Err(e) => {
                return Err(VidgraphError::TranscriptUnavailable(format!(
                    "yt-dlp execution failed: {e}"
                )));
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(VidgraphError::TranscriptUnavailable(format!(
                "yt-dlp failed for {video_id}: {}",
                stderr.trim()
            )));
        }

        self.find_subtitle_file(output_dir, video_id)
    }

    /// Locate the downloaded subtitle file, preferring the configured language order.
    fn find_subtitle_file(&self, dir: &Path, video_id: &str) -> Result<PathBuf> {
        for lang in &self.languages {
            let candidate = dir.join(format!("{}.{}.vtt", video_id, lang));
            if candidate.exists() {
                return Ok(candidate);
            }
        }

        let entries = std::fs::read_dir(dir)?;
        let mut found: Vec<PathBuf> = entries
            .flatten()
            .map(|e| e.path())
            .filter(|p| p.extension().is_some_and(|ext| ext == "vtt"))
            .collect();
        found.sort();

        found.into_iter().next().ok_or_else(|| {
            VidgraphError::TranscriptUnavailable(format!("no subtitles available for {}", video_id))
        })
    }
}

#[async_trait]
impl TranscriptSource for YoutubeTranscriptSource {
    #[instrument(skip(self))]
    async fn fetch_transcript(&self, video_id: &str) -> Result<String> {
        let dir = tempfile::tempdir()?;

        let path = match self.download_subtitles(video_id, dir.path()).await {
            Ok(path) => path,
            Err(VidgraphError::TranscriptUnavailable(msg)) => {
                return Err(VidgraphError::TranscriptUnavailable(msg))
            }
            Err(e) => return Err(VidgraphError::TranscriptUnavailable(e.to_string())),
        };

        let vtt = tokio::fs::read_to_string(&path).await.map_err(|e| {
            VidgraphError::TranscriptUnavailable(format!("cannot read subtitles: {}", e))
        })?;

        let text = vtt_to_text(&vtt);
        if text.is_empty() {
            return Err(VidgraphError::TranscriptUnavailable(format!(
                "subtitles for {} are empty",
                video_id
            )));
        }

        info!("Fetched transcript for {} ({} chars)", video_id, text.len());
        Ok(text)
    }
}

fn tag_regex() -> &'static Regex {
    static TAGS: OnceLock<Regex> = OnceLock::new();
    TAGS.get_or_init(|| Regex::new(r"<[^>]*>").expect("Invalid regex"))
}

/// Convert WebVTT subtitles into plain transcript text.
///
/// Drops the header, notes, cue ids, timings, and inline tags. Auto-generated
/// captions repeat each line across consecutive cues; repeats are collapsed.
pub fn vtt_to_text(vtt: &str) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut in_note = false;

    for raw in vtt.lines() {
        let line = raw.trim();

        if line.is_empty() {
            in_note = false;
            continue;
        }
        if in_note {
            continue;
        }
        if line.starts_with("WEBVTT")
            || line.starts_with("Kind:")
            || line.starts_with("Language:")
        {
            continue;
        }
        if line.starts_with("NOTE") || line.starts_with("STYLE") || line.starts_with("REGION") {
            in_note = true;
            continue;
        }
        if line.contains("-->") || line.chars().all(|c| c.is_ascii_digit()) {
            continue;
        }

        let text = tag_regex().replace_all(line, "");
        let text = text
            .replace("&amp;", "&")
            .replace("&lt;", "<")
            .replace("&gt;", ">")
            .replace("&nbsp;", " ");
        let text = text.split_whitespace().collect::<Vec<_>>().join(" ");

        if text.is_empty() || lines.last() == Some(&text) {
            continue;
        }
        lines.push(text);
    }

    lines.join(" ")
}
