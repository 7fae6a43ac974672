//! Project page payloads and the narrow reverse extractor.

use crate::destination::domain::{PageId, PagePayload, PageRecord, PropertyValue, properties};
use crate::source::domain::SourceProject;

/// Builds the destination payload for a project page.
///
/// The areas relation is only meaningful at creation time; after that the
/// engine never rewrites it (status updates go through
/// [`project_status_payload`]).
#[must_use]
pub fn project_payload(project: &SourceProject, area_ids: &[PageId]) -> PagePayload {
    let status = if project.is_archived {
        properties::STATUS_ARCHIVED
    } else {
        properties::STATUS_ACTIVE
    };
    PagePayload::new()
        .with_property(
            properties::TITLE,
            PropertyValue::Title(project.name.clone()),
        )
        .with_property(
            properties::PROJECT_EXTERNAL_ID,
            PropertyValue::Text(project.id.as_str().to_owned()),
        )
        .with_property(properties::COLOR, PropertyValue::Select(project.color.clone()))
        .with_property(
            properties::STATUS,
            PropertyValue::Select(Some(status.to_owned())),
        )
        .with_property(properties::AREAS, PropertyValue::Relation(area_ids.to_vec()))
}

/// Builds the payload for a status-only project update, preserving every
/// other property the page currently carries (the frozen areas included).
#[must_use]
pub fn project_status_payload(page: &PageRecord, archived: bool) -> PagePayload {
    let status = if archived {
        properties::STATUS_ARCHIVED
    } else {
        properties::STATUS_ACTIVE
    };
    let mut payload = page.as_payload();
    payload.set_property(
        properties::STATUS,
        PropertyValue::Select(Some(status.to_owned())),
    );
    payload
}

/// Destination-side project edits eligible to flow back to the source.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProjectReverseEdit {
    /// New source project name, when the page title diverged.
    pub rename: Option<String>,
    /// New source archived flag, when the page status diverged.
    pub set_archived: Option<bool>,
}

impl ProjectReverseEdit {
    /// Returns `true` when no edit would flow back.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.rename.is_none() && self.set_archived.is_none()
    }
}

/// Extracts the narrow set of destination project edits that may flow back
/// to the source: title and Active/Archived status. Everything else is
/// forward-owned and will be overwritten on the next sync.
#[must_use]
pub fn project_reverse_edits(page: &PageRecord, source: &SourceProject) -> ProjectReverseEdit {
    let mut edit = ProjectReverseEdit::default();

    if let Some(title) = page.title()
        && !title.is_empty()
        && title != source.name
    {
        edit.rename = Some(title.to_owned());
    }

    if let Some(status) = page.status() {
        let page_archived = status == properties::STATUS_ARCHIVED;
        if page_archived != source.is_archived {
            edit.set_archived = Some(page_archived);
        }
    }

    edit
}
