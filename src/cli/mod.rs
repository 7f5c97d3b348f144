//! CLI module for vidgraph.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Parser, Subcommand};

/// vidgraph - Video Knowledge Graphs and Controlled Summaries
///
/// Builds a knowledge graph from a video transcript and writes summaries in
/// the style, length and language you ask for.
#[derive(Parser, Debug)]
#[command(name = "vidgraph")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check system requirements and configuration
    Doctor,

    /// Ingest a video and write a summary
    Process {
        /// YouTube URL or video ID
        video: String,

        /// Summary style (e.g. formal, casual, bullet points)
        #[arg(short, long)]
        style: Option<String>,

        /// Approximate summary length in words
        #[arg(short, long)]
        words: Option<u32>,

        /// Summary language
        #[arg(short, long)]
        language: Option<String>,

        /// Read the transcript from a file instead of fetching subtitles
        #[arg(short, long)]
        transcript: Option<String>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Build the knowledge graph for a video without summarizing
    Ingest {
        /// YouTube URL or video ID
        video: String,

        /// Read the transcript from a file instead of fetching subtitles
        #[arg(short, long)]
        transcript: Option<String>,
    },

    /// Summarize an already ingested video
    Summarize {
        /// Video ID
        video_id: String,

        /// Summary style
        #[arg(short, long)]
        style: Option<String>,

        /// Approximate summary length in words
        #[arg(short, long)]
        words: Option<u32>,

        /// Summary language
        #[arg(short, long)]
        language: Option<String>,
    },

    /// Ask a question about a video (ingests it if needed)
    Ask {
        /// YouTube URL or video ID
        video: String,

        /// The question to ask
        question: String,

        /// Answer language
        #[arg(short, long)]
        language: Option<String>,

        /// Read the transcript from a file instead of fetching subtitles
        #[arg(short, long)]
        transcript: Option<String>,
    },

    /// List ingested videos
    List,

    /// Show the knowledge graph of one video
    Graph {
        /// Video ID
        video_id: String,

        /// Print the graph as JSON
        #[arg(long)]
        json: bool,
    },

    /// Start HTTP API server
    Serve {
        /// Host to bind to (defaults to server.host)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to (defaults to server.port)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Transcribe an audio file to text
    TranscribeAudio {
        /// Path to the audio file
        file: String,

        /// Spoken language
        #[arg(short, long, default_value = "english")]
        language: String,
    },

    /// Synthesize speech from text into an MP3 file
    Speak {
        /// Text to speak
        text: String,

        /// Output file
        #[arg(short, long, default_value = "speech.mp3")]
        output: String,

        /// Spoken language
        #[arg(short, long, default_value = "english")]
        language: String,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Open configuration file in editor
    Edit,

    /// Show configuration file path
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_process() {
        let cli = Cli::parse_from([
            "vidgraph",
            "-v",
            "process",
            "https://www.youtube.com/watch?v=abc",
            "--style",
            "casual",
            "-w",
            "80",
        ]);
        assert_eq!(cli.verbose, 1);
        match cli.command {
            Commands::Process { video, style, words, language, transcript, json } => {
                assert_eq!(video, "https://www.youtube.com/watch?v=abc");
                assert_eq!(style.as_deref(), Some("casual"));
                assert_eq!(words, Some(80));
                assert!(language.is_none());
                assert!(transcript.is_none());
                assert!(!json);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_kebab_case_commands() {
        let cli = Cli::parse_from(["vidgraph", "transcribe-audio", "clip.wav"]);
        assert!(matches!(cli.command, Commands::TranscribeAudio { .. }));

        let cli = Cli::parse_from(["vidgraph", "config", "path"]);
        assert!(matches!(cli.command, Commands::Config { action: ConfigAction::Path }));
    }
}
