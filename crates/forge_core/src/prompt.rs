//! Provider prompt composition.

use crate::{GenerationMode, GenerationRequest};

const LESSON_INSTRUCTIONS: &str = "Write a lesson plan. Start with SUBJECT:, TOPIC: and LEVEL: lines. \
Use '## ' headings for each section and '- ' bullets for activities.";

const SLIDES_INSTRUCTIONS: &str = "Write a slide deck. Start every slide with a '## ' heading \
line holding the slide title, followed by short bullet lines.";

const IMAGE_INSTRUCTIONS: &str = "For every slide add one line starting with 'IMAGE:' \
describing a suitable illustration.";

/// Builds the text sent to the content provider for a request.
///
/// # Examples
///
/// ```
/// use forge_core::{compose_prompt, GenerationMode, GenerationRequest};
///
/// let req = GenerationRequest::new("Irregular verbs", GenerationMode::Slides).with_images(true);
/// let prompt = compose_prompt(&req);
/// assert!(prompt.contains("IMAGE:"));
/// assert!(prompt.ends_with("Irregular verbs"));
/// ```
pub fn compose_prompt(request: &GenerationRequest) -> String {
    let mut instructions = match request.mode {
        GenerationMode::Lesson => LESSON_INSTRUCTIONS.to_string(),
        GenerationMode::Slides => SLIDES_INSTRUCTIONS.to_string(),
    };
    if request.mode == GenerationMode::Slides && request.include_images {
        instructions.push(' ');
        instructions.push_str(IMAGE_INSTRUCTIONS);
    }
    format!("{}\n\nRequest: {}", instructions, request.prompt.trim())
}
