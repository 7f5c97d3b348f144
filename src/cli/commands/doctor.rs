//! Doctor command - verify system requirements and configuration.

use crate::cli::Output;
use crate::config::{GraphStoreProvider, Settings};
use crate::graph_store::open_store;
use console::style;
use std::process::Command;

/// Check result for a single item.
#[derive(Debug)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum CheckStatus {
    Ok,
    Warning,
    Error,
}

impl CheckResult {
    fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Ok,
            message: message.to_string(),
            hint: None,
        }
    }

    fn warning(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Warning,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn error(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Error,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn print(&self) {
        let icon = match self.status {
            CheckStatus::Ok => style("✓").green(),
            CheckStatus::Warning => style("!").yellow(),
            CheckStatus::Error => style("✗").red(),
        };

        println!("  {} {} - {}", icon, style(&self.name).bold(), self.message);

        if let Some(hint) = &self.hint {
            println!("    {} {}", style("→").dim(), style(hint).dim());
        }
    }
}

/// Run all diagnostic checks.
pub async fn run_doctor(settings: &Settings) -> anyhow::Result<()> {
    Output::header("vidgraph Doctor");
    println!();
    println!("Checking system requirements and configuration...\n");

    let mut checks = Vec::new();

    println!("{}", style("External Tools").bold());
    let ytdlp = check_tool("yt-dlp", &settings.youtube.ytdlp_path, install_hint_ytdlp());
    ytdlp.print();
    checks.push(ytdlp);

    println!();

    println!("{}", style("Model Endpoint").bold());
    for check in check_llm(settings) {
        check.print();
        checks.push(check);
    }

    println!();

    println!("{}", style("Graph Store").bold());
    let store_check = check_graph_store(settings).await;
    store_check.print();
    checks.push(store_check);

    println!();

    println!("{}", style("Configuration").bold());
    let config_check = check_config_file();
    config_check.print();
    checks.push(config_check);

    println!();

    let errors = checks.iter().filter(|c| c.status == CheckStatus::Error).count();
    let warnings = checks.iter().filter(|c| c.status == CheckStatus::Warning).count();

    if errors > 0 {
        Output::error(&format!(
            "{} error(s) found. Please fix them before using vidgraph.",
            errors
        ));
        std::process::exit(1);
    } else if warnings > 0 {
        Output::warning(&format!("All checks passed with {} warning(s).", warnings));
    } else {
        Output::success("All checks passed! vidgraph is ready to use.");
    }

    Ok(())
}

/// Check if an external tool is available.
///
/// yt-dlp is only needed when no transcript is supplied, so a missing binary
/// is a warning.
fn check_tool(name: &str, path: &str, hint: &str) -> CheckResult {
    match Command::new(path).arg("--version").output() {
        Ok(output) if output.status.success() => {
            let version = String::from_utf8_lossy(&output.stdout)
                .lines()
                .next()
                .unwrap_or("installed")
                .trim()
                .to_string();
            CheckResult::ok(name, &truncate(&version, 50))
        }
        Ok(_) => CheckResult::error(name, "installed but not working", hint),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            CheckResult::warning(name, "not found (transcripts must be supplied)", hint)
        }
        Err(e) => CheckResult::error(name, &format!("error: {}", e), hint),
    }
}

/// Check the endpoint and API key the model calls will use.
fn check_llm(settings: &Settings) -> Vec<CheckResult> {
    let env = &settings.llm.api_key_env;
    let mut results = Vec::new();

    match &settings.llm.api_base {
        Some(base) => results.push(CheckResult::ok("Endpoint", base)),
        None => results.push(CheckResult::ok("Endpoint", "OpenAI (default)")),
    }

    let key_check = match settings.llm.api_key() {
        Some(key) if key.is_ascii() && key.len() > 12 => CheckResult::ok(
            env,
            &format!("configured ({}...{})", &key[..4], &key[key.len() - 4..]),
        ),
        Some(_) => CheckResult::warning(
            env,
            "set but looks too short",
            "Check that the full key was exported",
        ),
        None if settings.llm.api_base.is_some() => CheckResult::warning(
            env,
            "not set",
            "Fine for local endpoints; hosted ones need a key",
        ),
        None => CheckResult::error(env, "not set", &format!("Set with: export {}='sk-...'", env)),
    };
    results.push(key_check);

    results.push(CheckResult::ok(
        "Models",
        &format!(
            "extraction {}, summary {}",
            settings.extraction.model, settings.summary.model
        ),
    ));

    results
}

/// Open the configured store and report its contents.
async fn check_graph_store(settings: &Settings) -> CheckResult {
    let location = match settings.graph_store.provider {
        GraphStoreProvider::Sqlite => settings.sqlite_path().display().to_string(),
        GraphStoreProvider::Memory => "in-memory (nothing is persisted)".to_string(),
    };

    let store = match open_store(settings) {
        Ok(store) => store,
        Err(e) => {
            return CheckResult::error(
                "Graph store",
                &format!("{}: {}", location, e),
                "Check graph_store.sqlite_path and its permissions",
            )
        }
    };

    match store.stats().await {
        Ok(stats) => CheckResult::ok(
            "Graph store",
            &format!(
                "{} ({} videos, {} entities, {} relationships)",
                location, stats.videos, stats.entities, stats.relationships
            ),
        ),
        Err(e) => CheckResult::error(
            "Graph store",
            &format!("{}: {}", location, e),
            "The database may be corrupt; move it aside to start fresh",
        ),
    }
}

/// Check if config file exists.
fn check_config_file() -> CheckResult {
    let config_path = Settings::default_config_path();
    if config_path.exists() {
        CheckResult::ok("Config file", &format!("{}", config_path.display()))
    } else {
        CheckResult::warning(
            "Config file",
            "using defaults",
            "Create with: vidgraph config edit",
        )
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() > max_chars {
        format!("{}...", s.chars().take(max_chars).collect::<String>())
    } else {
        s.to_string()
    }
}

/// Platform-specific install hint for yt-dlp.
fn install_hint_ytdlp() -> &'static str {
    if cfg!(target_os = "macos") {
        "Install with: brew install yt-dlp"
    } else if cfg!(target_os = "linux") {
        "Install with: pip install yt-dlp (or your package manager)"
    } else {
        "Install from: https://github.com/yt-dlp/yt-dlp"
    }
}
