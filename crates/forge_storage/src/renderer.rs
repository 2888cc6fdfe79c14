//! Turning generated text into a downloadable document.

use crate::{Block, Outline};
use async_trait::async_trait;
use forge_core::{Artifact, GenerationMode};
use forge_error::{RenderError, RenderErrorKind};
use std::fmt::Write;
use tracing::{debug, instrument};

/// Converts generated content into document bytes.
///
/// A pure transformation: implementations hold no per-request state.
#[async_trait]
pub trait DocumentRenderer: Send + Sync {
    /// Renders `content` as a document of the given mode.
    async fn render(&self, mode: GenerationMode, content: &str) -> Result<Artifact, RenderError>;
}

/// Writes the outline back out as clean Markdown.
///
/// Lessons become a single document; slide decks become one `##` section per
/// slide separated by `---` rules, the format Markdown presentation tools read.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownRenderer;

const CONTENT_TYPE: &str = "text/markdown; charset=utf-8";

impl MarkdownRenderer {
    fn lesson(outline: &Outline) -> String {
        let mut doc = String::new();
        let _ = writeln!(doc, "# {}\n", outline.display_title("Lesson Plan"));
        write_metadata(&mut doc, outline);
        for section in outline.sections() {
            if !section.heading().is_empty() {
                let _ = writeln!(doc, "## {}\n", section.heading());
            }
            write_blocks(&mut doc, section.blocks());
        }
        doc
    }

    fn deck(outline: &Outline) -> String {
        let mut doc = String::new();
        let _ = writeln!(doc, "# {}\n", outline.display_title("Presentation"));
        write_metadata(&mut doc, outline);
        for (index, section) in outline.sections().iter().enumerate() {
            doc.push_str("---\n\n");
            let heading = if section.heading().is_empty() {
                format!("Slide {}", index + 1)
            } else {
                section.heading().clone()
            };
            let _ = writeln!(doc, "## {}\n", heading);
            write_blocks(&mut doc, section.blocks());
        }
        doc
    }
}

fn write_metadata(doc: &mut String, outline: &Outline) {
    let meta = outline.metadata();
    let fields = [
        ("Subject", meta.subject()),
        ("Topic", meta.topic()),
        ("Level", meta.level()),
    ];
    let mut wrote = false;
    for (label, value) in fields {
        if let Some(value) = value {
            let _ = writeln!(doc, "**{}:** {}  ", label, value);
            wrote = true;
        }
    }
    if wrote {
        doc.push('\n');
    }
}

fn write_blocks(doc: &mut String, blocks: &[Block]) {
    let mut in_list = false;
    for block in blocks {
        match block {
            Block::Bullet(text) => {
                let _ = writeln!(doc, "- {}", text);
                in_list = true;
                continue;
            }
            Block::Paragraph(text) => {
                if in_list {
                    doc.push('\n');
                }
                let _ = writeln!(doc, "{}\n", text);
            }
            Block::ImageCue(description) => {
                if in_list {
                    doc.push('\n');
                }
                let _ = writeln!(doc, "> Image: {}\n", description);
            }
        }
        in_list = false;
    }
    if in_list {
        doc.push('\n');
    }
}

#[async_trait]
impl DocumentRenderer for MarkdownRenderer {
    #[instrument(skip(self, content), fields(mode = %mode, chars = content.len()))]
    async fn render(&self, mode: GenerationMode, content: &str) -> Result<Artifact, RenderError> {
        let outline = Outline::parse(content);
        if outline.is_empty() {
            return Err(RenderError::new(RenderErrorKind::EmptyContent));
        }

        let body = match mode {
            GenerationMode::Lesson => Self::lesson(&outline),
            GenerationMode::Slides => Self::deck(&outline),
        };
        debug!(sections = outline.sections().len(), bytes = body.len(), "Rendered document");

        Ok(Artifact::new(
            body.into_bytes(),
            Artifact::unique_name(mode, "md"),
            CONTENT_TYPE,
        ))
    }
}
