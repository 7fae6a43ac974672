//! Mirroring eligibility predicate.

use super::{SourceItem, SourceProject};
use crate::config::SyncConfig;

/// Returns `true` when the item qualifies for mirroring: it carries the
/// eligibility tag, is not recurring (when recurring items are skipped),
/// and does not live in the Inbox (when the Inbox is skipped).
#[must_use]
pub fn is_eligible(item: &SourceItem, project: &SourceProject, config: &SyncConfig) -> bool {
    if !item.has_label(&config.eligibility_tag) {
        return false;
    }
    if config.skip_recurring && item.is_recurring {
        return false;
    }
    if config.skip_inbox && project.is_inbox {
        return false;
    }
    true
}

/// Returns `true` when the item would qualify if the eligibility tag were
/// added: non-recurring, outside the Inbox, but missing the tag. The
/// auto-labeling pass targets exactly these items.
#[must_use]
pub fn qualifies_for_auto_label(
    item: &SourceItem,
    project: &SourceProject,
    config: &SyncConfig,
) -> bool {
    if item.has_label(&config.eligibility_tag) {
        return false;
    }
    if config.skip_recurring && item.is_recurring {
        return false;
    }
    if config.skip_inbox && project.is_inbox {
        return false;
    }
    true
}
