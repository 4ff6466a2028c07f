//! Workshop board: repair tasks grouped into tabs.

use bozor_core::{Task, TaskDraft, TaskId, TaskTab};

use super::signed_in;
use crate::db::TaskRepository;
use crate::error::{AppError, Result};
use crate::state::AppState;

/// The board as shown under one tab.
#[derive(Debug, Clone)]
pub struct WorkshopPage {
    /// Selected tab.
    pub tab: TaskTab,
    /// All tabs with the number of tasks under each.
    pub tabs: Vec<(TaskTab, usize)>,
    /// Tasks under the selected tab, newest first.
    pub tasks: Vec<Task>,
}

/// Load the board under `tab`.
///
/// # Errors
///
/// Returns `AppError::Unauthorized` when signed out.
pub async fn load(state: &AppState, tab: TaskTab) -> Result<WorkshopPage> {
    let user = signed_in(state)?;
    let all = TaskRepository::new(state.store()).get_tasks(&user.uid).await?;
    let tabs = TaskTab::all()
        .into_iter()
        .map(|t| {
            let count = t.filter(&all).len();
            (t, count)
        })
        .collect();
    let tasks = tab.filter(&all).into_iter().cloned().collect();
    Ok(WorkshopPage { tab, tabs, tasks })
}

/// Add a task from the new-task form.
///
/// # Errors
///
/// Returns a validation error for an incomplete form.
pub async fn add_task(state: &AppState, draft: TaskDraft) -> Result<Task> {
    let user = signed_in(state)?;
    Ok(TaskRepository::new(state.store())
        .create_task(&user.uid, draft)
        .await?)
}

/// Tick or untick a task.
///
/// # Errors
///
/// Returns `AppError::Unauthorized` when signed out, `AppError::NotFound`
/// for an unknown task, or `AppError::Forbidden` for another user's task.
pub async fn set_completed(state: &AppState, id: &TaskId, completed: bool) -> Result<()> {
    let user = signed_in(state)?;
    let repo = TaskRepository::new(state.store());
    let task = repo
        .get_task(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("task {id}")))?;
    if task.user_id != user.uid {
        return Err(AppError::Forbidden(format!("task {id} belongs to another user")));
    }
    Ok(repo.set_task_completed(id, completed).await?)
}
