//! Narrow façade over the source task service.

use crate::remote::RemoteResult;
use crate::source::domain::{ItemId, ItemSnapshot, ProjectId, SourceComment, SourceItem, SourceProject};
use async_trait::async_trait;

/// Read/write façade over the source task service.
///
/// Implementations hide wire protocols, pagination tokens, and rate-limit
/// throttling; every method returns typed domain records and classifies
/// failures through [`crate::remote::RemoteError`]. All mutating operations
/// are idempotent so the worker is safe under queue redelivery.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Fetches an item with its project and full comment transcript.
    ///
    /// # Errors
    ///
    /// Returns [`crate::remote::RemoteError::NotFound`] when the item does
    /// not exist at the source, which the engine treats as a deletion.
    async fn fetch_item(&self, id: &ItemId) -> RemoteResult<ItemSnapshot>;

    /// Fetches a single project record.
    ///
    /// # Errors
    ///
    /// Returns [`crate::remote::RemoteError::NotFound`] for unknown ids.
    async fn fetch_project(&self, id: &ProjectId) -> RemoteResult<SourceProject>;

    /// Lists the comments of an item in posting order.
    ///
    /// # Errors
    ///
    /// Returns [`crate::remote::RemoteError`] on wire failure.
    async fn list_comments(&self, id: &ItemId) -> RemoteResult<Vec<SourceComment>>;

    /// Lists every item carrying `tag`, including completed items.
    ///
    /// Pagination is consumed internally; the returned sequence is complete.
    ///
    /// # Errors
    ///
    /// Returns [`crate::remote::RemoteError`] on wire failure.
    async fn list_tagged(&self, tag: &str) -> RemoteResult<Vec<SourceItem>>;

    /// Attaches `tag` to an item; a no-op when already present.
    ///
    /// Returns the item's current label set.
    ///
    /// # Errors
    ///
    /// Returns [`crate::remote::RemoteError`] on wire failure.
    async fn add_tag(&self, id: &ItemId, tag: &str) -> RemoteResult<Vec<String>>;

    /// Detaches `tag` from an item; a no-op when absent.
    ///
    /// Returns the item's current label set.
    ///
    /// # Errors
    ///
    /// Returns [`crate::remote::RemoteError`] on wire failure.
    async fn remove_tag(&self, id: &ItemId, tag: &str) -> RemoteResult<Vec<String>>;

    /// Replaces an item's description.
    ///
    /// # Errors
    ///
    /// Returns [`crate::remote::RemoteError`] on wire failure.
    async fn set_description(&self, id: &ItemId, text: &str) -> RemoteResult<()>;

    /// Appends a comment to a project.
    ///
    /// # Errors
    ///
    /// Returns [`crate::remote::RemoteError`] on wire failure.
    async fn add_project_comment(&self, project_id: &ProjectId, text: &str) -> RemoteResult<()>;

    /// Renames a project at the source.
    ///
    /// # Errors
    ///
    /// Returns [`crate::remote::RemoteError`] on wire failure.
    async fn rename_project(&self, id: &ProjectId, name: &str) -> RemoteResult<()>;

    /// Archives or unarchives a project at the source.
    ///
    /// # Errors
    ///
    /// Returns [`crate::remote::RemoteError`] on wire failure.
    async fn set_project_archived(&self, id: &ProjectId, archived: bool) -> RemoteResult<()>;
}
