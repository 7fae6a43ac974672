//! Typed page payloads.
//!
//! The destination's dynamic property dictionaries are modeled as explicit
//! tagged variants assembled through [`PagePayload`]. Property maps are
//! `BTreeMap`s and multi-valued properties are kept sorted, so serializing a
//! payload yields canonical bytes for hashing.

use super::{Block, PageId};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Property names shared by the mapper, reverse extractor, and adapters.
pub mod properties {
    /// Title property on both page kinds.
    pub const TITLE: &str = "Name";
    /// Priority select on task pages.
    pub const PRIORITY: &str = "Priority";
    /// Pass-through labels multi-select on task pages.
    pub const LABELS: &str = "Labels";
    /// Structured due date on task pages.
    pub const DUE: &str = "Due";
    /// Completion checkbox on task pages.
    pub const COMPLETED: &str = "Completed";
    /// Source item identifier on task pages.
    pub const TASK_EXTERNAL_ID: &str = "todoist_task_id";
    /// Source item URL on task pages.
    pub const TASK_URL: &str = "todoist_url";
    /// Project relation on task pages.
    pub const PROJECT: &str = "Project";
    /// Areas relation on task and project pages.
    pub const AREAS: &str = "Areas";
    /// People relation on task pages.
    pub const PEOPLE: &str = "People";
    /// Source project identifier on project pages.
    pub const PROJECT_EXTERNAL_ID: &str = "todoist_project_id";
    /// Color select on project pages.
    pub const COLOR: &str = "Color";
    /// Active/Archived status select on project pages.
    pub const STATUS: &str = "Status";

    /// Status select value for live projects.
    pub const STATUS_ACTIVE: &str = "Active";
    /// Status select value for archived projects.
    pub const STATUS_ARCHIVED: &str = "Archived";
}

/// Structured date value for a date property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateValue {
    /// Calendar date.
    pub date: NaiveDate,
    /// Optional time of day.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<NaiveTime>,
    /// Optional IANA timezone qualifying `time`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
}

/// One typed destination property value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum PropertyValue {
    /// Page title.
    Title(String),
    /// Single select; `None` clears the property.
    Select(Option<String>),
    /// Multi select; values kept sorted for canonical serialization.
    MultiSelect(Vec<String>),
    /// Structured date.
    Date(DateValue),
    /// Boolean checkbox.
    Checkbox(bool),
    /// Relation to other pages; ids kept sorted for canonical
    /// serialization.
    Relation(Vec<PageId>),
    /// Rich-text property.
    Text(String),
    /// URL property.
    Url(String),
}

/// Builder-assembled page payload: properties plus body blocks.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PagePayload {
    /// Property name to typed value, sorted by name.
    pub properties: BTreeMap<String, PropertyValue>,
    /// Body blocks in render order.
    pub body: Vec<Block>,
}

impl PagePayload {
    /// Creates an empty payload.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a property, replacing any previous value. Multi-valued
    /// properties are sorted so equal payloads serialize identically.
    #[must_use]
    pub fn with_property(mut self, name: impl Into<String>, value: PropertyValue) -> Self {
        self.set_property(name, value);
        self
    }

    /// Sets a property in place; same normalization as
    /// [`Self::with_property`].
    pub fn set_property(&mut self, name: impl Into<String>, value: PropertyValue) {
        let normalized = match value {
            PropertyValue::MultiSelect(mut values) => {
                values.sort();
                PropertyValue::MultiSelect(values)
            }
            PropertyValue::Relation(mut ids) => {
                ids.sort();
                PropertyValue::Relation(ids)
            }
            other => other,
        };
        self.properties.insert(name.into(), normalized);
    }

    /// Appends a body block.
    #[must_use]
    pub fn with_block(mut self, block: Block) -> Self {
        self.body.push(block);
        self
    }

    /// Returns a property value by name.
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&PropertyValue> {
        self.properties.get(name)
    }

    /// Returns the title text when the title property is set.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        match self.properties.get(properties::TITLE) {
            Some(PropertyValue::Title(text)) => Some(text.as_str()),
            _ => None,
        }
    }
}
