//! vidgraph CLI entry point.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use vidgraph::cli::{commands, Cli, Commands};
use vidgraph::config::Settings;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config_path = cli.config.as_ref().map(PathBuf::from);
    let settings = Settings::load_from(config_path.as_ref())?;

    // Initialize logging; -v flags override the configured level
    let log_level = match cli.verbose {
        0 => settings.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("vidgraph={}", log_level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    // Ensure data directories exist
    std::fs::create_dir_all(settings.data_dir())?;

    // Execute command
    match &cli.command {
        Commands::Doctor => {
            commands::run_doctor(&settings).await?;
        }

        Commands::Process { video, style, words, language, transcript, json } => {
            commands::run_process(
                video,
                style.clone(),
                *words,
                language.clone(),
                transcript.as_deref(),
                *json,
                settings,
            )
            .await?;
        }

        Commands::Ingest { video, transcript } => {
            commands::run_ingest(video, transcript.as_deref(), settings).await?;
        }

        Commands::Summarize { video_id, style, words, language } => {
            commands::run_summarize(video_id, style.clone(), *words, language.clone(), settings)
                .await?;
        }

        Commands::Ask { video, question, language, transcript } => {
            commands::run_ask(video, question, language.clone(), transcript.as_deref(), settings)
                .await?;
        }

        Commands::List => {
            commands::run_list(settings).await?;
        }

        Commands::Graph { video_id, json } => {
            commands::run_graph(video_id, *json, settings).await?;
        }

        Commands::Serve { host, port } => {
            commands::run_serve(host.clone(), *port, settings).await?;
        }

        Commands::TranscribeAudio { file, language } => {
            commands::run_transcribe_audio(file, language, settings).await?;
        }

        Commands::Speak { text, output, language } => {
            commands::run_speak(text, output, language, settings).await?;
        }

        Commands::Config { action } => {
            commands::run_config(action, config_path, settings)?;
        }
    }

    Ok(())
}
