//! Forward mapping from a source item to a destination task payload.

use crate::config::SyncConfig;
use crate::destination::domain::{DateValue, PagePayload, PropertyValue, properties};
use crate::source::domain::{Priority, ProjectId, SourceComment, SourceItem};

use super::backlinks::strip_backlinks;
use super::body::build_body;
use super::labels::partition_labels;

/// Title used when the source item title is empty.
pub const PLACEHOLDER_TITLE: &str = "(untitled task)";

/// Relation lookups the resolver must perform for a mapped item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationRequests {
    /// Owning source project to resolve (and materialize if absent).
    pub project_id: ProjectId,
    /// Canonical area names to look up; misses are dropped with a warning.
    pub areas: Vec<String>,
    /// Person names to fuzzy-match; ambiguity drops the relation.
    pub people: Vec<String>,
}

/// Result of the pure forward transformation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappedItem {
    /// Destination payload without relation properties; the engine adds
    /// those after resolution.
    pub payload: PagePayload,
    /// Relation resolutions still to perform.
    pub relations: RelationRequests,
    /// Number of body blocks cut at the destination size limit.
    pub truncated_blocks: usize,
    /// Whether the placeholder title was substituted for an empty title.
    pub used_placeholder_title: bool,
}

/// Maps a native 1–4 source priority onto the destination select, where
/// source 4 (most urgent) becomes `"P1"`.
#[must_use]
pub const fn priority_select(priority: Priority) -> &'static str {
    match priority.value() {
        4 => "P1",
        3 => "P2",
        2 => "P3",
        _ => "P4",
    }
}

/// Deterministically maps a source item and its comments onto a
/// destination payload plus relation requests.
#[must_use]
pub fn forward(item: &SourceItem, comments: &[SourceComment], config: &SyncConfig) -> MappedItem {
    let partition = partition_labels(&item.labels, config);

    let trimmed_title = item.title.trim();
    let used_placeholder_title = trimmed_title.is_empty();
    let title = if used_placeholder_title {
        PLACEHOLDER_TITLE.to_owned()
    } else {
        item.title.clone()
    };

    // The engine's own backlink block must not round-trip into the body.
    let description = strip_backlinks(&item.description);
    let (body, truncated_blocks) = build_body(&description, comments, config.block_char_limit);

    let mut payload = PagePayload::new()
        .with_property(properties::TITLE, PropertyValue::Title(title))
        .with_property(
            properties::PRIORITY,
            PropertyValue::Select(Some(priority_select(item.priority).to_owned())),
        )
        .with_property(
            properties::LABELS,
            PropertyValue::MultiSelect(partition.passthrough.clone()),
        )
        .with_property(
            properties::COMPLETED,
            PropertyValue::Checkbox(item.is_completed),
        )
        .with_property(
            properties::TASK_EXTERNAL_ID,
            PropertyValue::Text(item.id.as_str().to_owned()),
        )
        .with_property(properties::TASK_URL, PropertyValue::Url(item.app_url()));

    if let Some(due) = &item.due {
        let timezone = match (&due.time, &due.timezone) {
            (Some(_), None) => Some(config.default_timezone.clone()),
            (_, tz) => tz.clone(),
        };
        payload.set_property(
            properties::DUE,
            PropertyValue::Date(DateValue {
                date: due.date,
                time: due.time,
                timezone,
            }),
        );
    }

    payload.body = body;

    MappedItem {
        payload,
        relations: RelationRequests {
            project_id: item.project_id.clone(),
            areas: partition.areas,
            people: partition.people,
        },
        truncated_blocks,
        used_placeholder_title,
    }
}
