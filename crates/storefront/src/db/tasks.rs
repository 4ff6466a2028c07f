//! Workshop task board repository.

use chrono::Utc;
use serde_json::Value;
use tracing::instrument;

use bozor_core::{Task, TaskDraft, TaskId, UserId};

use super::{
    RepositoryError, TASKS, from_document, from_documents, to_fields, touch, update_existing,
};
use crate::store::{DocumentStore, FieldFilter, Fields};

/// Repository for workshop tasks.
pub struct TaskRepository<'a> {
    store: &'a dyn DocumentStore,
}

impl<'a> TaskRepository<'a> {
    /// Create a new task repository.
    #[must_use]
    pub const fn new(store: &'a dyn DocumentStore) -> Self {
        Self { store }
    }

    /// Add an open task to `user`'s board.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Validation` for an incomplete form.
    #[instrument(skip(self, draft), fields(user = %user))]
    pub async fn create_task(&self, user: &UserId, draft: TaskDraft) -> Result<Task, RepositoryError> {
        let mut task = draft.into_task(user.clone(), Utc::now())?;
        let id = self.store.add(TASKS, to_fields(&task)?).await?;
        task.id = TaskId::new(id);
        Ok(task)
    }

    /// Every task on `user`'s board, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the query fails.
    #[instrument(skip(self), fields(user = %user))]
    pub async fn get_tasks(&self, user: &UserId) -> Result<Vec<Task>, RepositoryError> {
        let docs = self
            .store
            .query(TASKS, &[FieldFilter::eq("userId", user.as_str())])
            .await?;
        let mut tasks: Vec<Task> = from_documents(TASKS, docs);
        tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(tasks)
    }

    /// Fetch one task.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the read fails.
    pub async fn get_task(&self, id: &TaskId) -> Result<Option<Task>, RepositoryError> {
        self.store
            .get(TASKS, id.as_str())
            .await?
            .map(|doc| from_document(TASKS, doc))
            .transpose()
    }

    /// Tick or untick a task.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the task does not exist.
    #[instrument(skip(self), fields(task_id = %id))]
    pub async fn set_task_completed(&self, id: &TaskId, completed: bool) -> Result<(), RepositoryError> {
        let mut fields = Fields::new();
        fields.insert("completed".to_string(), Value::Bool(completed));
        update_existing(self.store, TASKS, id.as_str(), touch(fields)).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use bozor_core::{Price, TaskStatus, TaskTab};

    use super::*;
    use crate::store::InMemoryStore;

    fn draft(name: &str) -> TaskDraft {
        TaskDraft {
            name: name.to_string(),
            client: "Азиз".to_string(),
            price: Some(Price::new(150_000)),
            date: "2024-06-01".to_string(),
            status: TaskStatus::Active,
        }
    }

    #[tokio::test]
    async fn test_tasks_are_per_user() {
        let store = InMemoryStore::new();
        let repo = TaskRepository::new(&store);
        let (me, other) = (UserId::new("me"), UserId::new("other"));

        repo.create_task(&me, draft("Замена экрана")).await.unwrap();
        repo.create_task(&other, draft("Замена батареи")).await.unwrap();

        let mine = repo.get_tasks(&me).await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].name, "Замена экрана");
        assert!(!mine[0].completed);
    }

    #[tokio::test]
    async fn test_completed_task_leaves_active_tab() {
        let store = InMemoryStore::new();
        let repo = TaskRepository::new(&store);
        let me = UserId::new("me");
        let task = repo.create_task(&me, draft("Замена экрана")).await.unwrap();

        repo.set_task_completed(&task.id, true).await.unwrap();
        let stored = repo.get_task(&task.id).await.unwrap().unwrap();
        assert_eq!(stored.user_id, me);
        assert!(stored.completed);
        assert!(repo.get_task(&TaskId::new("gone")).await.unwrap().is_none());

        let tasks = repo.get_tasks(&me).await.unwrap();
        assert!(tasks[0].completed);
        assert!(TaskTab::Active.filter(&tasks).is_empty());
        assert_eq!(TaskTab::All.filter(&tasks).len(), 1);

        assert!(matches!(
            repo.set_task_completed(&TaskId::new("gone"), true).await,
            Err(RepositoryError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_incomplete_form_rejected() {
        let store = InMemoryStore::new();
        let repo = TaskRepository::new(&store);
        assert!(matches!(
            repo.create_task(&UserId::new("me"), TaskDraft::default()).await,
            Err(RepositoryError::Validation(_))
        ));
    }
}
