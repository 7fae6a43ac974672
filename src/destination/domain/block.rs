//! Page-body block variants.

use serde::{Deserialize, Serialize};

/// One block of destination page body content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "text", rename_all = "snake_case")]
pub enum Block {
    /// Plain paragraph.
    Paragraph(String),
    /// Second-level heading.
    Heading(String),
}

impl Block {
    /// Returns the block text.
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Paragraph(text) | Self::Heading(text) => text,
        }
    }
}
