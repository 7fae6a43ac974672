//! Page-body assembly and truncation.

use crate::destination::domain::Block;
use crate::source::domain::SourceComment;

/// Marker appended to a block cut at the destination size limit.
pub const TRUNCATION_MARKER: &str = "… [truncated]";

/// Heading introducing the comment transcript.
pub const COMMENTS_HEADING: &str = "Comments";

/// Cuts `text` to at most `limit` characters, appending the truncation
/// marker when anything was removed. Returns the text and whether it was
/// cut.
#[must_use]
pub fn truncate_text(text: &str, limit: usize) -> (String, bool) {
    if text.chars().count() <= limit {
        return (text.to_owned(), false);
    }
    let kept: String = text
        .chars()
        .take(limit.saturating_sub(TRUNCATION_MARKER.chars().count()))
        .collect();
    (format!("{kept}{TRUNCATION_MARKER}"), true)
}

/// Builds the destination page body: the description paragraph followed by
/// the comment transcript. Returns the blocks and the number of truncated
/// blocks.
#[must_use]
pub fn build_body(
    description: &str,
    comments: &[SourceComment],
    block_char_limit: usize,
) -> (Vec<Block>, usize) {
    let mut blocks = Vec::new();
    let mut truncated = 0usize;

    if !description.is_empty() {
        let (text, cut) = truncate_text(description, block_char_limit);
        if cut {
            truncated += 1;
        }
        blocks.push(Block::Paragraph(text));
    }

    if !comments.is_empty() {
        blocks.push(Block::Heading(COMMENTS_HEADING.to_owned()));
        for comment in comments {
            let rendered = format!(
                "**{}** · {}\n\n{}",
                comment.author,
                comment.posted_at.to_rfc3339(),
                comment.text
            );
            let (text, cut) = truncate_text(&rendered, block_char_limit);
            if cut {
                truncated += 1;
            }
            blocks.push(Block::Paragraph(text));
        }
    }

    (blocks, truncated)
}
