//! LLM-based relationship triple extraction.
//!
//! Asks the model for `entity1|relationship|entity2` lines and keeps whatever
//! parses. Malformed lines are dropped, never reported as errors.

mod parser;

pub use parser::{parse_line, parse_triples, ParseSkip, Triple};

use crate::config::{ExtractionSettings, Prompts};
use crate::error::Result;
use crate::llm::{GenerationRequest, TextGenerator};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Extracts relationship triples from a transcript.
pub struct TripleExtractor {
    generator: Arc<dyn TextGenerator>,
    model: String,
    temperature: f32,
    prompts: Prompts,
}

impl TripleExtractor {
    pub fn new(generator: Arc<dyn TextGenerator>, settings: &ExtractionSettings) -> Self {
        Self {
            generator,
            model: settings.model.clone(),
            temperature: settings.temperature,
            prompts: Prompts::default(),
        }
    }

    /// Set custom prompts (with user-defined variables).
    pub fn with_prompts(mut self, prompts: Prompts) -> Self {
        self.prompts = prompts;
        self
    }

    /// Build the extraction prompt for a transcript.
    pub fn build_prompt(&self, transcript: &str) -> String {
        let mut vars = HashMap::new();
        vars.insert("transcript".to_string(), transcript.to_string());
        self.prompts.render_with_custom(&self.prompts.extraction.user, &vars)
    }

    /// Extract triples from a transcript, in the order the model listed them.
    ///
    /// Fails only when the model call itself fails.
    #[instrument(skip(self, transcript), fields(transcript_len = transcript.len()))]
    pub async fn extract(&self, transcript: &str) -> Result<Vec<Triple>> {
        let request = GenerationRequest::new(&self.model, self.build_prompt(transcript))
            .with_temperature(Some(self.temperature));

        let output = self.generator.generate(&request).await?;

        let mut triples = Vec::new();
        let mut skipped = 0usize;
        for parsed in parse_triples(output.trim()) {
            match parsed {
                Ok(triple) => triples.push(triple),
                Err(ParseSkip::Blank { .. }) => {}
                Err(skip) => {
                    skipped += 1;
                    debug!("Skipping malformed extraction {}", skip);
                }
            }
        }

        info!("Extracted {} triples ({} lines skipped)", triples.len(), skipped);
        Ok(triples)
    }
}
