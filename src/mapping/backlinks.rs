//! Backlink block formatting and recognition.
//!
//! On first sync the engine appends the destination task and project URLs
//! to the source description. That text is engine-owned: forward mapping
//! strips it again so the mirrored body never contains the links and the
//! payload hash stays stable across the append.

/// Separator line between the two backlink URLs.
pub const BACKLINK_SEPARATOR: &str = "---";

/// Renders the backlink block: task page URL, separator, project page URL.
#[must_use]
pub fn format_backlinks(task_url: &str, project_url: &str) -> String {
    format!("{task_url}\n{BACKLINK_SEPARATOR}\n{project_url}")
}

/// Appends the backlink block to a description.
#[must_use]
pub fn append_backlinks(description: &str, links: &str) -> String {
    if description.is_empty() {
        links.to_owned()
    } else {
        format!("{description}\n\n{links}")
    }
}

/// Removes a trailing backlink block from a description, if present.
#[must_use]
pub fn strip_backlinks(description: &str) -> String {
    let lines: Vec<&str> = description.lines().collect();
    let count = lines.len();
    if count >= 3 {
        let is_url = |line: Option<&&str>| line.is_some_and(|l| l.starts_with("https://"));
        let tail_is_backlink = is_url(lines.get(count - 3))
            && lines.get(count - 2).copied() == Some(BACKLINK_SEPARATOR)
            && is_url(lines.get(count - 1));
        if tail_is_backlink {
            let kept = lines
                .get(..count - 3)
                .unwrap_or_default()
                .join("\n");
            return kept.trim_end().to_owned();
        }
    }
    description.to_owned()
}
