//! Body assembly and truncation tests.

use crate::destination::domain::Block;
use crate::mapping::{TRUNCATION_MARKER, build_body, truncate_text};

#[test]
fn short_text_is_untouched() {
    let (text, cut) = truncate_text("hello", 2000);
    assert_eq!(text, "hello");
    assert!(!cut);
}

#[test]
fn oversized_text_is_cut_with_a_marker() {
    let long = "x".repeat(2100);
    let (text, cut) = truncate_text(&long, 2000);
    assert!(cut);
    assert!(text.ends_with(TRUNCATION_MARKER));
    assert_eq!(text.chars().count(), 2000);
}

#[test]
fn truncation_respects_multibyte_boundaries() {
    let long = "é".repeat(50);
    let (text, cut) = truncate_text(&long, 20);
    assert!(cut);
    assert!(text.ends_with(TRUNCATION_MARKER));
    assert_eq!(text.chars().count(), 20);
}

#[test]
fn empty_description_yields_no_leading_paragraph() {
    let (blocks, truncated) = build_body("", &[], 2000);
    assert!(blocks.is_empty());
    assert_eq!(truncated, 0);
}

#[test]
fn truncated_blocks_are_counted() {
    let long = "y".repeat(50);
    let (blocks, truncated) = build_body(&long, &[], 10);
    assert_eq!(truncated, 1);
    assert!(matches!(
        blocks.first(),
        Some(Block::Paragraph(text)) if text.ends_with(TRUNCATION_MARKER)
    ));
}
