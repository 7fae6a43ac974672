//! Source project snapshot type.

use super::ProjectId;
use serde::{Deserialize, Serialize};

/// Read-only snapshot of a source project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceProject {
    /// Stable project identifier.
    pub id: ProjectId,
    /// Project display name.
    pub name: String,
    /// Source color name, if set.
    pub color: Option<String>,
    /// Whether this is the service's Inbox project.
    pub is_inbox: bool,
    /// Whether the project is archived at the source.
    pub is_archived: bool,
}

impl SourceProject {
    /// Creates a non-inbox, non-archived project snapshot.
    #[must_use]
    pub fn new(id: ProjectId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            color: None,
            is_inbox: false,
            is_archived: false,
        }
    }

    /// Marks the project as the service Inbox.
    #[must_use]
    pub const fn with_inbox(mut self, is_inbox: bool) -> Self {
        self.is_inbox = is_inbox;
        self
    }

    /// Sets the archived flag.
    #[must_use]
    pub const fn with_archived(mut self, is_archived: bool) -> Self {
        self.is_archived = is_archived;
        self
    }

    /// Sets the color name.
    #[must_use]
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    /// Canonical source-app URL for this project.
    #[must_use]
    pub fn app_url(&self) -> String {
        format!("https://app.todoist.com/app/project/{}", self.id)
    }
}
