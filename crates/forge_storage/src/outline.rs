//! Parsing generated Markdown into a document outline.

use derive_getters::Getters;

/// One piece of body content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    /// A `*` or `-` list item
    Bullet(String),
    /// Free text
    Paragraph(String),
    /// An `IMAGE:` cue describing a picture to place on a slide
    ImageCue(String),
}

/// A `##` section; on a slide deck, one slide.
#[derive(Debug, Clone, Default, PartialEq, Eq, Getters)]
pub struct Section {
    heading: String,
    blocks: Vec<Block>,
}

impl Section {
    fn titled(heading: impl Into<String>) -> Self {
        Self {
            heading: heading.into(),
            blocks: Vec::new(),
        }
    }

    fn is_empty(&self) -> bool {
        self.heading.is_empty() && self.blocks.is_empty()
    }
}

/// `SUBJECT:`, `TOPIC:` and `LEVEL:` header lines.
#[derive(Debug, Clone, Default, PartialEq, Eq, Getters)]
pub struct OutlineMetadata {
    subject: Option<String>,
    topic: Option<String>,
    level: Option<String>,
}

impl OutlineMetadata {
    fn is_empty(&self) -> bool {
        self.subject.is_none() && self.topic.is_none() && self.level.is_none()
    }
}

/// Structured view of model output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Getters)]
pub struct Outline {
    title: Option<String>,
    metadata: OutlineMetadata,
    sections: Vec<Section>,
}

impl Outline {
    /// Parses model output.
    ///
    /// ```
    /// use forge_storage::{Block, Outline};
    ///
    /// let outline = Outline::parse("TOPIC: Tides\n## Warm-up\n* Why does the sea move?\nDiscuss.");
    /// assert_eq!(outline.metadata().topic().as_deref(), Some("Tides"));
    /// assert_eq!(outline.sections()[0].heading(), "Warm-up");
    /// assert_eq!(
    ///     outline.sections()[0].blocks(),
    ///     &vec![Block::Bullet("Why does the sea move?".into()), Block::Paragraph("Discuss.".into())]
    /// );
    /// ```
    pub fn parse(content: &str) -> Self {
        let mut outline = Outline::default();
        let mut current = Section::default();

        for raw in content.lines() {
            let line = raw.trim();
            if line.is_empty() || line == "---" {
                continue;
            }

            if let Some(value) = metadata_value(line, "SUBJECT:") {
                outline.metadata.subject = Some(value);
            } else if let Some(value) = metadata_value(line, "TOPIC:") {
                outline.metadata.topic = Some(value);
            } else if let Some(value) = metadata_value(line, "LEVEL:") {
                outline.metadata.level = Some(value);
            } else if let Some(value) = metadata_value(line, "IMAGE:") {
                current.blocks.push(Block::ImageCue(value));
            } else if line.starts_with("##") {
                if !current.is_empty() {
                    outline.sections.push(std::mem::take(&mut current));
                }
                current = Section::titled(clean_inline(line.trim_start_matches('#')));
            } else if let Some(title) = line.strip_prefix("# ") {
                if outline.title.is_none() {
                    outline.title = Some(clean_inline(title));
                } else {
                    current.blocks.push(Block::Paragraph(clean_inline(title)));
                }
            } else if let Some(item) = line
                .strip_prefix("* ")
                .or_else(|| line.strip_prefix("- "))
            {
                current.blocks.push(Block::Bullet(clean_inline(item)));
            } else {
                current.blocks.push(Block::Paragraph(clean_inline(line)));
            }
        }

        if !current.is_empty() {
            outline.sections.push(current);
        }
        outline
    }

    /// True when nothing renderable was found.
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.metadata.is_empty() && self.sections.is_empty()
    }

    /// Best available document title.
    pub fn display_title(&self, fallback: &str) -> String {
        self.title
            .clone()
            .or_else(|| self.metadata.topic.clone())
            .unwrap_or_else(|| fallback.to_string())
    }
}

fn metadata_value(line: &str, key: &str) -> Option<String> {
    let head = line.get(..key.len())?;
    if !head.eq_ignore_ascii_case(key) {
        return None;
    }
    let value = clean_inline(&line[key.len()..]);
    (!value.is_empty()).then_some(value)
}

/// Strips bold markers and surrounding whitespace.
fn clean_inline(text: &str) -> String {
    text.replace("**", "").trim().to_string()
}
