//! In-memory source service used by tests and local runs.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::remote::{RemoteError, RemoteResult};
use crate::source::domain::{
    ItemId, ItemSnapshot, ProjectId, SourceComment, SourceItem, SourceProject,
};
use crate::source::ports::SourceAdapter;

/// Thread-safe in-memory implementation of [`SourceAdapter`].
///
/// Mutating port methods are applied to the stored snapshots so tests can
/// observe backlinks, tag changes, and project edits.
#[derive(Debug, Clone, Default)]
pub struct InMemorySourceAdapter {
    state: Arc<RwLock<InMemorySourceState>>,
}

#[derive(Debug, Default)]
struct InMemorySourceState {
    items: HashMap<ItemId, SourceItem>,
    projects: HashMap<ProjectId, SourceProject>,
    comments: HashMap<ItemId, Vec<SourceComment>>,
    project_comments: HashMap<ProjectId, Vec<String>>,
}

impl InMemorySourceAdapter {
    /// Creates an empty in-memory source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a project snapshot.
    pub fn put_project(&self, project: SourceProject) {
        if let Ok(mut state) = self.state.write() {
            state.projects.insert(project.id.clone(), project);
        }
    }

    /// Inserts or replaces an item snapshot.
    pub fn put_item(&self, item: SourceItem) {
        if let Ok(mut state) = self.state.write() {
            state.items.insert(item.id.clone(), item);
        }
    }

    /// Appends a comment to an item.
    pub fn put_comment(&self, id: &ItemId, comment: SourceComment) {
        if let Ok(mut state) = self.state.write() {
            state.comments.entry(id.clone()).or_default().push(comment);
        }
    }

    /// Removes an item, simulating a source-side deletion.
    pub fn remove_item(&self, id: &ItemId) {
        if let Ok(mut state) = self.state.write() {
            state.items.remove(id);
            state.comments.remove(id);
        }
    }

    /// Returns the current snapshot of an item, if present.
    #[must_use]
    pub fn item(&self, id: &ItemId) -> Option<SourceItem> {
        self.state
            .read()
            .ok()
            .and_then(|state| state.items.get(id).cloned())
    }

    /// Returns the current snapshot of a project, if present.
    #[must_use]
    pub fn project(&self, id: &ProjectId) -> Option<SourceProject> {
        self.state
            .read()
            .ok()
            .and_then(|state| state.projects.get(id).cloned())
    }

    /// Returns the comments posted to a project through the port.
    #[must_use]
    pub fn project_comments(&self, id: &ProjectId) -> Vec<String> {
        self.state
            .read()
            .ok()
            .and_then(|state| state.project_comments.get(id).cloned())
            .unwrap_or_default()
    }

    fn read(&self) -> RemoteResult<RwLockReadGuard<'_, InMemorySourceState>> {
        self.state
            .read()
            .map_err(|err| RemoteError::Permanent(err.to_string()))
    }

    fn write(&self) -> RemoteResult<RwLockWriteGuard<'_, InMemorySourceState>> {
        self.state
            .write()
            .map_err(|err| RemoteError::Permanent(err.to_string()))
    }
}

#[async_trait]
impl SourceAdapter for InMemorySourceAdapter {
    async fn fetch_item(&self, id: &ItemId) -> RemoteResult<ItemSnapshot> {
        let state = self.read()?;
        let item = state.items.get(id).cloned().ok_or(RemoteError::NotFound)?;
        let project = state
            .projects
            .get(&item.project_id)
            .cloned()
            .ok_or(RemoteError::NotFound)?;
        let comments = state.comments.get(id).cloned().unwrap_or_default();
        Ok(ItemSnapshot {
            item,
            project,
            comments,
        })
    }

    async fn fetch_project(&self, id: &ProjectId) -> RemoteResult<SourceProject> {
        self.read()?
            .projects
            .get(id)
            .cloned()
            .ok_or(RemoteError::NotFound)
    }

    async fn list_comments(&self, id: &ItemId) -> RemoteResult<Vec<SourceComment>> {
        Ok(self.read()?.comments.get(id).cloned().unwrap_or_default())
    }

    async fn list_tagged(&self, tag: &str) -> RemoteResult<Vec<SourceItem>> {
        let state = self.read()?;
        let mut items: Vec<SourceItem> = state
            .items
            .values()
            .filter(|item| item.has_label(tag))
            .cloned()
            .collect();
        items.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(items)
    }

    async fn add_tag(&self, id: &ItemId, tag: &str) -> RemoteResult<Vec<String>> {
        let mut state = self.write()?;
        let item = state.items.get_mut(id).ok_or(RemoteError::NotFound)?;
        if !item.has_label(tag) {
            item.labels.push(tag.to_owned());
        }
        Ok(item.labels.clone())
    }

    async fn remove_tag(&self, id: &ItemId, tag: &str) -> RemoteResult<Vec<String>> {
        let mut state = self.write()?;
        let item = state.items.get_mut(id).ok_or(RemoteError::NotFound)?;
        item.labels.retain(|label| label != tag);
        Ok(item.labels.clone())
    }

    async fn set_description(&self, id: &ItemId, text: &str) -> RemoteResult<()> {
        let mut state = self.write()?;
        let item = state.items.get_mut(id).ok_or(RemoteError::NotFound)?;
        item.description = text.to_owned();
        Ok(())
    }

    async fn add_project_comment(&self, project_id: &ProjectId, text: &str) -> RemoteResult<()> {
        let mut state = self.write()?;
        if !state.projects.contains_key(project_id) {
            return Err(RemoteError::NotFound);
        }
        state
            .project_comments
            .entry(project_id.clone())
            .or_default()
            .push(text.to_owned());
        Ok(())
    }

    async fn rename_project(&self, id: &ProjectId, name: &str) -> RemoteResult<()> {
        let mut state = self.write()?;
        let project = state.projects.get_mut(id).ok_or(RemoteError::NotFound)?;
        project.name = name.to_owned();
        Ok(())
    }

    async fn set_project_archived(&self, id: &ProjectId, archived: bool) -> RemoteResult<()> {
        let mut state = self.write()?;
        let project = state.projects.get_mut(id).ok_or(RemoteError::NotFound)?;
        project.is_archived = archived;
        Ok(())
    }
}
