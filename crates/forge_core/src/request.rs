//! Inbound generation requests.

use serde::{Deserialize, Serialize};

/// Longest prompt accepted, in characters.
pub const MAX_PROMPT_CHARS: usize = 8_000;

/// Kind of document to produce.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum GenerationMode {
    /// A printable lesson plan
    Lesson,
    /// A slide deck; older clients call it `ppt`
    #[serde(alias = "ppt")]
    #[strum(to_string = "slides", serialize = "ppt")]
    Slides,
}

/// A content-generation request as received from the client.
///
/// Transient: consumed by the generation saga and never persisted as-is.
///
/// # Examples
///
/// ```
/// use forge_core::{GenerationMode, GenerationRequest};
///
/// let req: GenerationRequest =
///     serde_json::from_str(r#"{"prompt":"Past tense","mode":"ppt","includeImages":true}"#).unwrap();
/// assert_eq!(req.mode, GenerationMode::Slides);
/// assert!(req.include_images);
/// assert!(req.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    /// Free-form topic or instructions from the user
    pub prompt: String,
    /// Document kind to produce
    pub mode: GenerationMode,
    /// Whether slides should carry image cues
    #[serde(default)]
    pub include_images: bool,
}

impl GenerationRequest {
    /// Creates a request without images.
    pub fn new(prompt: impl Into<String>, mode: GenerationMode) -> Self {
        Self {
            prompt: prompt.into(),
            mode,
            include_images: false,
        }
    }

    /// Sets the image flag.
    pub fn with_images(mut self, include_images: bool) -> Self {
        self.include_images = include_images;
        self
    }

    /// Checks the prompt is present and bounded.
    ///
    /// # Errors
    ///
    /// Returns a human-readable reason when the prompt is blank or too long.
    pub fn validate(&self) -> Result<(), String> {
        let trimmed = self.prompt.trim();
        if trimmed.is_empty() {
            return Err("prompt must not be empty".to_string());
        }
        let chars = trimmed.chars().count();
        if chars > MAX_PROMPT_CHARS {
            return Err(format!(
                "prompt is {} characters, limit is {}",
                chars, MAX_PROMPT_CHARS
            ));
        }
        Ok(())
    }
}
