//! Source item snapshot types.

use super::{ItemId, Priority, ProjectId, SourceProject};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// Structured due information, preserved verbatim from the source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceDue {
    /// Calendar date the item is due.
    pub date: NaiveDate,
    /// Optional time of day.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<NaiveTime>,
    /// Optional IANA timezone name qualifying `time`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
}

/// One comment attached to a source item, in posting order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceComment {
    /// Display name of the comment author.
    pub author: String,
    /// When the comment was posted.
    pub posted_at: DateTime<Utc>,
    /// Comment text.
    pub text: String,
}

/// Read-only snapshot of a source item.
///
/// The source service owns the lifecycle of these records; the engine only
/// observes them, so the fields are plain data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceItem {
    /// Stable item identifier.
    pub id: ItemId,
    /// Item title, mirrored verbatim.
    pub title: String,
    /// Free-form description body.
    pub description: String,
    /// Native 1–4 priority, 4 most urgent.
    pub priority: Priority,
    /// Structured due information, if any.
    pub due: Option<SourceDue>,
    /// Label multiset as reported by the source.
    pub labels: Vec<String>,
    /// Owning project identifier.
    pub project_id: ProjectId,
    /// Parent item for subtasks; carried but not nested.
    pub parent_id: Option<ItemId>,
    /// Section name within the project, if any.
    pub section: Option<String>,
    /// Whether the item is completed.
    pub is_completed: bool,
    /// Whether the item recurs; recurring items are never mirrored.
    pub is_recurring: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl SourceItem {
    /// Creates a minimal item snapshot; builder methods fill the rest.
    #[must_use]
    pub fn new(id: ItemId, title: impl Into<String>, project_id: ProjectId) -> Self {
        let epoch = DateTime::<Utc>::UNIX_EPOCH;
        Self {
            id,
            title: title.into(),
            description: String::new(),
            priority: Priority::default(),
            due: None,
            labels: Vec::new(),
            project_id,
            parent_id: None,
            section: None,
            is_completed: false,
            is_recurring: false,
            created_at: epoch,
            updated_at: epoch,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the labels.
    #[must_use]
    pub fn with_labels(mut self, labels: impl IntoIterator<Item = String>) -> Self {
        self.labels = labels.into_iter().collect();
        self
    }

    /// Sets the priority.
    #[must_use]
    pub const fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Sets the due information.
    #[must_use]
    pub fn with_due(mut self, due: SourceDue) -> Self {
        self.due = Some(due);
        self
    }

    /// Marks the item recurring.
    #[must_use]
    pub const fn with_recurring(mut self, is_recurring: bool) -> Self {
        self.is_recurring = is_recurring;
        self
    }

    /// Marks the item completed.
    #[must_use]
    pub const fn with_completed(mut self, is_completed: bool) -> Self {
        self.is_completed = is_completed;
        self
    }

    /// Returns `true` when the label multiset contains `label` exactly.
    #[must_use]
    pub fn has_label(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }

    /// Canonical source-app URL for this item.
    #[must_use]
    pub fn app_url(&self) -> String {
        format!("https://app.todoist.com/app/task/{}", self.id)
    }
}

/// A fetched item together with its project and comment transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemSnapshot {
    /// The item itself.
    pub item: SourceItem,
    /// The owning project record.
    pub project: SourceProject,
    /// Comments in posting order.
    pub comments: Vec<SourceComment>,
}
