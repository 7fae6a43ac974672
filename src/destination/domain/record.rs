//! Destination page records as returned by the adapter.

use super::{Block, PageId, PageKind, PagePayload, PropertyValue};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A destination page as stored, including adapter-maintained metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRecord {
    /// Destination-issued page identifier.
    pub id: PageId,
    /// Which collection the page belongs to.
    pub kind: PageKind,
    /// Source identifier the page mirrors.
    pub external_id: String,
    /// Current property values.
    pub properties: BTreeMap<String, PropertyValue>,
    /// Current body blocks.
    pub body: Vec<Block>,
    /// Whether the page is archived.
    pub archived: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last edit timestamp, updated on every write from any editor.
    pub last_edited_at: DateTime<Utc>,
    /// Shareable page URL.
    pub url: String,
}

impl PageRecord {
    /// Returns the page title text, if the title property is set.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        match self.properties.get(super::properties::TITLE) {
            Some(PropertyValue::Title(text)) => Some(text.as_str()),
            _ => None,
        }
    }

    /// Returns the status select value, if set.
    #[must_use]
    pub fn status(&self) -> Option<&str> {
        match self.properties.get(super::properties::STATUS) {
            Some(PropertyValue::Select(Some(text))) => Some(text.as_str()),
            _ => None,
        }
    }

    /// Reconstructs the payload this page currently embodies; hashing it
    /// against a stored echo hash detects engine-originated writes.
    #[must_use]
    pub fn as_payload(&self) -> PagePayload {
        PagePayload {
            properties: self.properties.clone(),
            body: self.body.clone(),
        }
    }
}

/// A named relation target (area, person, or project page).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationTarget {
    /// Destination identifier of the target record.
    pub id: PageId,
    /// Display name of the target record.
    pub name: String,
}
