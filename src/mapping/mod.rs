//! Pure transformation between source items and destination payloads.
//!
//! Everything in this module is deterministic and side-effect free: the
//! same item, comments, and configuration always produce byte-identical
//! payloads, which is what makes payload hashing a sound idempotence basis.

mod backlinks;
mod body;
mod forward;
mod hash;
mod labels;
mod project;

pub use backlinks::{
    BACKLINK_SEPARATOR, append_backlinks, format_backlinks, strip_backlinks,
};
pub use body::{COMMENTS_HEADING, TRUNCATION_MARKER, build_body, truncate_text};
pub use forward::{MappedItem, PLACEHOLDER_TITLE, RelationRequests, forward, priority_select};
pub use hash::{digest_value, payload_hash};
pub use labels::{LabelPartition, canonical_area_name, partition_labels};
pub use project::{
    ProjectReverseEdit, project_payload, project_reverse_edits, project_status_payload,
};

#[cfg(test)]
mod tests;
