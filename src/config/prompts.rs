//! Prompt templates for vidgraph.
//!
//! Prompts can be customized by placing TOML files in the custom prompts directory.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Prompts {
    pub extraction: ExtractionPrompts,
    pub summary: SummaryPrompts,
    pub answer: AnswerPrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: HashMap<String, String>,
}


/// Prompt for relationship triple extraction.
///
/// Available variables: `{{transcript}}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionPrompts {
    pub user: String,
}

impl Default for ExtractionPrompts {
    fn default() -> Self {
        Self {
            user: r#"Analyze this transcript and list the relationships it states between entities (people, organizations, places, products, concepts).

Write one triple per line in exactly this form:
entity1|relationship|entity2

Rules:
- Use the entity names as they appear in the transcript
- Keep the relationship short (a verb or verb phrase)
- Do not number the lines and do not add any other text

Transcript:
{{transcript}}"#
                .to_string(),
        }
    }
}

/// Prompt for controlled summary generation.
///
/// Available variables: `{{style}}`, `{{word_count}}`, `{{language}}`,
/// `{{relationships}}`, `{{transcript}}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryPrompts {
    pub user: String,
}

impl Default for SummaryPrompts {
    fn default() -> Self {
        Self {
            user: r#"Write a {{style}} summary (~{{word_count}} words) of this transcript in {{language}}.
Use the relationships extracted from the transcript to keep the key facts straight.

Relationships:
{{relationships}}

Transcript:
{{transcript}}"#
                .to_string(),
        }
    }
}

/// Prompt for answering a question about one video.
///
/// Available variables: `{{question}}`, `{{language}}`, `{{relationships}}`,
/// `{{transcript}}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnswerPrompts {
    pub user: String,
}

impl Default for AnswerPrompts {
    fn default() -> Self {
        Self {
            user: r#"Answer the question about this video in {{language}}.
Use only the relationships and transcript below. If they do not contain the answer, say so.

Question: {{question}}

Relationships:
{{relationships}}

Transcript:
{{transcript}}"#
                .to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts from the default location, with optional custom directory and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&HashMap<String, String>>,
    ) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            let extraction_path = custom_path.join("extraction.toml");
            if extraction_path.exists() {
                let content = std::fs::read_to_string(&extraction_path)?;
                prompts.extraction = toml::from_str(&content)?;
            }

            let summary_path = custom_path.join("summary.toml");
            if summary_path.exists() {
                let content = std::fs::read_to_string(&summary_path)?;
                prompts.summary = toml::from_str(&content)?;
            }

            let answer_path = custom_path.join("answer.toml");
            if answer_path.exists() {
                let content = std::fs::read_to_string(&answer_path)?;
                prompts.answer = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    ///
    /// Placeholders are substituted in a single left-to-right pass, so text
    /// coming from a value (a transcript, say) is never expanded again.
    /// Unknown placeholders are left as written.
    pub fn render(template: &str, vars: &HashMap<String, String>) -> String {
        let mut result = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(start) = rest.find("{{") {
            result.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            match after.find("}}") {
                Some(end) => {
                    let key = &after[..end];
                    match vars.get(key) {
                        Some(value) => result.push_str(value),
                        None => {
                            result.push_str("{{");
                            result.push_str(key);
                            result.push_str("}}");
                        }
                    }
                    rest = &after[end + 2..];
                }
                None => {
                    result.push_str(&rest[start..]);
                    rest = "";
                }
            }
        }

        result.push_str(rest);
        result
    }

    /// Render a prompt template with both provided variables and custom config variables.
    /// Provided variables take precedence over custom config variables.
    pub fn render_with_custom(&self, template: &str, vars: &HashMap<String, String>) -> String {
        let mut merged = self.variables.clone();
        for (key, value) in vars {
            merged.insert(key.clone(), value.clone());
        }
        Self::render(template, &merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_prompts() {
        let prompts = Prompts::default();
        assert!(prompts.extraction.user.contains("entity1|relationship|entity2"));
        assert!(prompts.extraction.user.contains("{{transcript}}"));
        assert!(prompts.summary.user.contains("{{word_count}}"));
        assert!(prompts.answer.user.contains("{{question}}"));
    }

    #[test]
    fn test_render_template() {
        let template = "Hello {{name}}, you have {{count}} messages.";
        let mut vars = HashMap::new();
        vars.insert("name".to_string(), "Alice".to_string());
        vars.insert("count".to_string(), "5".to_string());

        let result = Prompts::render(template, &vars);
        assert_eq!(result, "Hello Alice, you have 5 messages.");
    }

    #[test]
    fn test_render_does_not_expand_values() {
        let mut vars = HashMap::new();
        vars.insert("transcript".to_string(), "say {{style}} twice".to_string());
        vars.insert("style".to_string(), "formal".to_string());

        let result = Prompts::render("{{style}}: {{transcript}}", &vars);
        assert_eq!(result, "formal: say {{style}} twice");
    }

    #[test]
    fn test_render_keeps_unknown_and_unclosed() {
        let vars = HashMap::new();
        assert_eq!(Prompts::render("a {{missing}} b", &vars), "a {{missing}} b");
        assert_eq!(Prompts::render("open {{ never closed", &vars), "open {{ never closed");
    }

    #[test]
    fn test_custom_variables_are_overridden() {
        let mut custom = HashMap::new();
        custom.insert("audience".to_string(), "students".to_string());
        custom.insert("language".to_string(), "hindi".to_string());
        let prompts = Prompts::load(None, Some(&custom)).unwrap();

        let mut vars = HashMap::new();
        vars.insert("language".to_string(), "english".to_string());

        let result = prompts.render_with_custom("{{language}} for {{audience}}", &vars);
        assert_eq!(result, "english for students");
    }

    #[test]
    fn test_load_custom_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("summary.toml"),
            "user = \"Summarize in {{language}}: {{transcript}}\"\n",
        )
        .unwrap();

        let prompts = Prompts::load(dir.path().to_str(), None).unwrap();
        assert_eq!(prompts.summary.user, "Summarize in {{language}}: {{transcript}}");
        assert!(prompts.extraction.user.contains("{{transcript}}"));
    }
}
