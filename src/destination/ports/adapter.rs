//! Narrow façade over the destination knowledge base.

use crate::destination::domain::{
    Block, PageId, PageKind, PagePayload, PageRecord, RelationKind, RelationTarget,
};
use crate::remote::RemoteResult;
use async_trait::async_trait;

/// Read/write façade over the destination knowledge base.
///
/// Implementations hide wire protocols and pagination; continuation tokens
/// never cross this boundary. Failures are classified through
/// [`crate::remote::RemoteError`].
#[async_trait]
pub trait DestinationAdapter: Send + Sync {
    /// Returns every live page mirroring the given source identifier,
    /// oldest first.
    ///
    /// Under normal operation the result holds at most one page; more than
    /// one signals a duplicate-page invariant violation the engine repairs.
    ///
    /// # Errors
    ///
    /// Returns [`crate::remote::RemoteError`] on wire failure.
    async fn find_by_external_id(
        &self,
        kind: PageKind,
        external_id: &str,
    ) -> RemoteResult<Vec<PageRecord>>;

    /// Fetches a single page by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`crate::remote::RemoteError::NotFound`] for unknown ids.
    async fn fetch_page(&self, id: &PageId) -> RemoteResult<PageRecord>;

    /// Creates a page mirroring `external_id`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::remote::RemoteError`] on wire failure or payload
    /// rejection.
    async fn create_page(
        &self,
        kind: PageKind,
        external_id: &str,
        payload: &PagePayload,
    ) -> RemoteResult<PageRecord>;

    /// Replaces the properties and body of an existing page.
    ///
    /// # Errors
    ///
    /// Returns [`crate::remote::RemoteError::NotFound`] for unknown ids and
    /// other [`crate::remote::RemoteError`] categories on wire failure.
    async fn update_page(&self, id: &PageId, payload: &PagePayload) -> RemoteResult<PageRecord>;

    /// Archives a page; a no-op when already archived.
    ///
    /// # Errors
    ///
    /// Returns [`crate::remote::RemoteError`] on wire failure.
    async fn archive_page(&self, id: &PageId) -> RemoteResult<()>;

    /// Unarchives a page; a no-op when not archived.
    ///
    /// # Errors
    ///
    /// Returns [`crate::remote::RemoteError`] on wire failure.
    async fn unarchive_page(&self, id: &PageId) -> RemoteResult<()>;

    /// Looks up a relation target record by exact name.
    ///
    /// # Errors
    ///
    /// Returns [`crate::remote::RemoteError`] on wire failure.
    async fn find_relation_by_name(
        &self,
        kind: RelationKind,
        name: &str,
    ) -> RemoteResult<Option<RelationTarget>>;

    /// Lists every target record of a relation family (used for fuzzy
    /// person matching).
    ///
    /// # Errors
    ///
    /// Returns [`crate::remote::RemoteError`] on wire failure.
    async fn list_relation_targets(&self, kind: RelationKind) -> RemoteResult<Vec<RelationTarget>>;

    /// Returns the target page ids of one relation property on a page.
    ///
    /// # Errors
    ///
    /// Returns [`crate::remote::RemoteError::NotFound`] for unknown pages.
    async fn query_relation_targets(
        &self,
        page_id: &PageId,
        property: &str,
    ) -> RemoteResult<Vec<PageId>>;

    /// Appends body blocks to an existing page.
    ///
    /// # Errors
    ///
    /// Returns [`crate::remote::RemoteError::NotFound`] for unknown pages.
    async fn append_blocks(&self, id: &PageId, blocks: &[Block]) -> RemoteResult<()>;
}
