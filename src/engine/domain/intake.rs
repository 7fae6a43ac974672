//! Webhook event intake.
//!
//! The HTTP layer and signature verification live outside the engine; what
//! arrives here is one parsed JSON event body. Translation maps the source
//! event vocabulary onto a single [`SyncMessage`], attaching an inline
//! snapshot when the event carries enough item data.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::SyncMessage;
use crate::source::domain::{ItemId, Priority, ProjectId, SourceDomainError, SourceDue, SourceItem};
use crate::store::domain::SyncSource;

/// One webhook event body as delivered by the source service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookEvent {
    /// Event vocabulary entry, e.g. `item:updated`.
    pub event_name: String,
    /// Source-side user the event belongs to.
    #[serde(default)]
    pub user_id: Option<String>,
    /// Event payload; shape varies by event family.
    pub event_data: serde_json::Value,
}

/// Errors returned while translating webhook events.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IntakeError {
    /// The event vocabulary entry is not part of the sync mapping.
    #[error("unsupported event: {0}")]
    UnsupportedEvent(String),

    /// The event payload carries no usable item identifier.
    #[error("event payload missing item identifier")]
    MissingItemId,

    /// The carried identifier failed domain validation.
    #[error(transparent)]
    InvalidId(#[from] SourceDomainError),
}

/// Item fields the webhook payload may carry inline.
#[derive(Debug, Deserialize)]
struct WebhookItem {
    id: String,
    content: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    labels: Option<Vec<String>>,
    project_id: String,
    #[serde(default)]
    priority: Option<u8>,
    #[serde(default)]
    due: Option<WebhookDue>,
    #[serde(default)]
    parent_id: Option<String>,
    #[serde(default, alias = "checked")]
    is_completed: Option<bool>,
    #[serde(default)]
    added_at: Option<String>,
    #[serde(default)]
    updated_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WebhookDue {
    date: String,
    #[serde(default)]
    timezone: Option<String>,
    #[serde(default)]
    is_recurring: Option<bool>,
}

/// Translates one webhook event into a queue message.
///
/// Item events map to `UPSERT` (or `ARCHIVE` for deletions); note events
/// map to `UPSERT` of the commented item. Event families outside the
/// mapping are rejected so the intake can acknowledge and drop them.
///
/// # Errors
///
/// Returns [`IntakeError`] for unmapped events or unusable payloads.
pub fn translate_event(event: &WebhookEvent) -> Result<SyncMessage, IntakeError> {
    match event.event_name.as_str() {
        "item:added" | "item:updated" | "item:completed" | "item:uncompleted" => {
            let id = item_id_from(&event.event_data, "id")?;
            let mut message = SyncMessage::upsert(id, SyncSource::Webhook);
            if let Some(snapshot) = parse_snapshot(&event.event_data) {
                message = message.with_snapshot(snapshot);
            }
            Ok(message)
        }
        "note:added" | "note:updated" => {
            let id = item_id_from(&event.event_data, "item_id")?;
            Ok(SyncMessage::upsert(id, SyncSource::Webhook))
        }
        "item:deleted" => {
            let id = item_id_from(&event.event_data, "id")?;
            Ok(SyncMessage::archive(id, SyncSource::Webhook))
        }
        other => Err(IntakeError::UnsupportedEvent(other.to_owned())),
    }
}

fn item_id_from(data: &serde_json::Value, field: &str) -> Result<ItemId, IntakeError> {
    let raw = data
        .get(field)
        .and_then(serde_json::Value::as_str)
        .ok_or(IntakeError::MissingItemId)?;
    Ok(ItemId::new(raw)?)
}

/// Attempts to build a full item snapshot from the inline event payload;
/// a partial payload simply yields `None` and the worker re-fetches.
fn parse_snapshot(data: &serde_json::Value) -> Option<SourceItem> {
    let parsed: WebhookItem = serde_json::from_value(data.clone()).ok()?;
    let id = ItemId::new(parsed.id).ok()?;
    let project_id = ProjectId::new(parsed.project_id).ok()?;

    let mut item = SourceItem::new(id, parsed.content, project_id);
    item.description = parsed.description.unwrap_or_default();
    item.labels = parsed.labels.unwrap_or_default();
    item.is_completed = parsed.is_completed.unwrap_or(false);
    item.parent_id = parsed.parent_id.and_then(|p| ItemId::new(p).ok());
    if let Some(priority) = parsed.priority {
        item.priority = Priority::new(priority).ok()?;
    }
    if let Some(due) = parsed.due {
        item.is_recurring = due.is_recurring.unwrap_or(false);
        item.due = parse_due(&due);
    }
    if let Some(added_at) = parsed.added_at.as_deref().and_then(parse_timestamp) {
        item.created_at = added_at;
    }
    if let Some(updated_at) = parsed.updated_at.as_deref().and_then(parse_timestamp) {
        item.updated_at = updated_at;
    }
    Some(item)
}

fn parse_due(due: &WebhookDue) -> Option<SourceDue> {
    if let Ok(date) = NaiveDate::parse_from_str(&due.date, "%Y-%m-%d") {
        return Some(SourceDue {
            date,
            time: None,
            timezone: due.timezone.clone(),
        });
    }
    let datetime = NaiveDateTime::parse_from_str(&due.date, "%Y-%m-%dT%H:%M:%S").ok()?;
    Some(SourceDue {
        date: datetime.date(),
        time: Some(datetime.time()),
        timezone: due.timezone.clone(),
    })
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
