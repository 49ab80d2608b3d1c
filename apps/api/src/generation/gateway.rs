//! Palette generation gateway: walks the candidate models in priority order
//! and returns the first response that parses as a palette.
//!
//! Each request restarts from the top of the list. There is no backoff, no
//! circuit breaking and no parallel speculation: one model at a time.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::generation::prompts::palette_instruction;
use crate::llm_client::{extract_json_object, InlineImage, LlmError, PaletteModel};
use crate::models::palette::Color;

/// Candidate models, highest priority first.
pub const DEFAULT_MODELS: &[&str] = &[
    "gemini-2.5-flash",
    "gemini-2.0-flash",
    "gemini-1.5-flash",
    "gemini-2.0-flash-lite",
    "gemini-pro",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypographySuggestion {
    pub heading: Option<String>,
    pub body: Option<String>,
}

/// Structured palette returned by a model. Five colours are requested, not enforced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedPalette {
    pub name: String,
    pub colors: Vec<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub typography_suggestion: Option<TypographySuggestion>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vibe: Option<String>,
}

/// One failed model attempt.
#[derive(Debug)]
pub struct AttemptFailure {
    pub model: String,
    pub error: LlmError,
}

impl fmt::Display for AttemptFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.model, self.error)
    }
}

#[derive(Debug, Error)]
pub enum GenerationError {
    /// Every candidate failed. Attempts are in the order they were tried.
    #[error("generation failed: {}", last_failure(.attempts))]
    Exhausted { attempts: Vec<AttemptFailure> },
}

impl GenerationError {
    pub fn attempts(&self) -> &[AttemptFailure] {
        match self {
            GenerationError::Exhausted { attempts } => attempts,
        }
    }
}

fn last_failure(attempts: &[AttemptFailure]) -> String {
    attempts
        .last()
        .map(|a| a.error.to_string())
        .unwrap_or_else(|| "no models configured".to_string())
}

#[derive(Clone)]
pub struct PaletteGateway {
    models: Vec<String>,
    backend: Arc<dyn PaletteModel>,
}

impl PaletteGateway {
    pub fn new(models: Vec<String>, backend: Arc<dyn PaletteModel>) -> Self {
        Self { models, backend }
    }

    pub fn models(&self) -> &[String] {
        &self.models
    }

    /// Generates a palette for `prompt` and an optional `data:` URL or raw base64 image.
    pub async fn generate(
        &self,
        prompt: &str,
        image: Option<&str>,
    ) -> Result<GeneratedPalette, GenerationError> {
        let instruction = palette_instruction(prompt);
        let image = image.map(InlineImage::from_data_url);
        let mut attempts = Vec::new();

        for model in &self.models {
            info!(model = %model, has_image = image.is_some(), "Trying palette generation");
            match self.attempt(model, &instruction, image.as_ref()).await {
                Ok(palette) => {
                    info!(model = %model, name = %palette.name, "Palette generated");
                    return Ok(palette);
                }
                Err(error) => {
                    warn!(model = %model, error = %error, "Model attempt failed, falling back");
                    attempts.push(AttemptFailure {
                        model: model.clone(),
                        error,
                    });
                }
            }
        }

        let err = GenerationError::Exhausted { attempts };
        warn!(error = %err, "All generation models failed");
        Err(err)
    }

    async fn attempt(
        &self,
        model: &str,
        instruction: &str,
        image: Option<&InlineImage>,
    ) -> Result<GeneratedPalette, LlmError> {
        let raw = self.backend.generate(model, instruction, image).await?;
        let json = extract_json_object(&raw);
        Ok(serde_json::from_str(&json)?)
    }
}
