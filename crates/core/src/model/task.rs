//! Workshop board tasks.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{ValidationError, lenient, require};
use crate::types::{Price, TaskId, TaskStatus, UserId};

/// Task document at `tasks/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Document key.
    #[serde(skip_serializing, default)]
    pub id: TaskId,
    /// Board owner.
    pub user_id: UserId,
    /// What needs doing.
    #[serde(default, deserialize_with = "lenient::text")]
    pub name: String,
    /// Who it is for.
    #[serde(default, deserialize_with = "lenient::text")]
    pub client: String,
    /// Agreed price.
    #[serde(default)]
    pub price: Price,
    /// Due date.
    #[serde(default, deserialize_with = "lenient::date")]
    pub date: Option<NaiveDate>,
    /// Board column.
    #[serde(default, deserialize_with = "lenient::label")]
    pub status: TaskStatus,
    /// Whether the task is finished.
    #[serde(default, deserialize_with = "lenient::flag")]
    pub completed: bool,
    /// When the task was created.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// When the task was last updated.
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Status label shown on the card. Tasks written without a status show
    /// "Готов" or "Активные" depending on the completion flag.
    #[must_use]
    pub fn display_status(&self) -> &str {
        match &self.status {
            TaskStatus::Other(label) if label.trim().is_empty() => {
                if self.completed {
                    TaskStatus::Done.as_str()
                } else {
                    TaskStatus::Active.as_str()
                }
            }
            status => status.as_str(),
        }
    }
}

/// New task form. Every field is required.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskDraft {
    /// What needs doing.
    pub name: String,
    /// Who it is for.
    pub client: String,
    /// Agreed price.
    pub price: Option<Price>,
    /// Due date as `YYYY-MM-DD`.
    pub date: String,
    /// Board column.
    pub status: TaskStatus,
}

impl TaskDraft {
    /// Validate the form and build an open task for `user_id`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingFields`] for blank fields or
    /// [`ValidationError::Date`] for a malformed date.
    pub fn into_task(self, user_id: UserId, now: DateTime<Utc>) -> Result<Task, ValidationError> {
        let name = self.name.trim();
        let client = self.client.trim();
        let date = self.date.trim();
        require(&[
            ("Название", !name.is_empty()),
            ("Клиент", !client.is_empty()),
            ("Цена", self.price.is_some()),
            ("Дата", !date.is_empty()),
        ])?;
        let parsed = NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .map_err(|_| ValidationError::Date(date.to_owned()))?;

        Ok(Task {
            id: TaskId::default(),
            user_id,
            name: name.to_owned(),
            client: client.to_owned(),
            price: self.price.unwrap_or_default(),
            date: Some(parsed),
            status: self.status,
            completed: false,
            created_at: Some(now),
            updated_at: Some(now),
        })
    }
}

/// A tab on the workshop board.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TaskTab {
    /// "Все задачи": everything.
    All,
    /// "Активные": tasks not yet completed.
    #[default]
    Active,
    /// A specific status column.
    Status(TaskStatus),
}

impl TaskTab {
    /// Tabs in board order.
    #[must_use]
    pub fn all() -> Vec<Self> {
        let mut tabs = vec![Self::All, Self::Active];
        tabs.extend(
            TaskStatus::ALL
                .into_iter()
                .filter(|s| *s != TaskStatus::Active)
                .map(Self::Status),
        );
        tabs
    }

    /// Tab for a label; unknown labels select that status column.
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        match label.trim() {
            "Все задачи" => Self::All,
            "Активные" => Self::Active,
            other => Self::Status(TaskStatus::from(other)),
        }
    }

    /// Tab label.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::All => "Все задачи",
            Self::Active => "Активные",
            Self::Status(status) => status.as_str(),
        }
    }

    /// Whether `task` shows under this tab.
    #[must_use]
    pub fn matches(&self, task: &Task) -> bool {
        match self {
            Self::All => true,
            Self::Active => !task.completed,
            Self::Status(status) => &task.status == status,
        }
    }

    /// Tasks under this tab, in input order.
    #[must_use]
    pub fn filter<'a>(&self, tasks: &'a [Task]) -> Vec<&'a Task> {
        tasks.iter().filter(|t| self.matches(t)).collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn draft() -> TaskDraft {
        TaskDraft {
            name: "Замена экрана".to_string(),
            client: "Азиз".to_string(),
            price: Some(Price::new(350_000)),
            date: "2024-06-01".to_string(),
            status: TaskStatus::Urgent,
        }
    }

    #[test]
    fn test_new_task_starts_open() {
        let task = draft().into_task(UserId::new("u1"), Utc::now()).unwrap();
        assert!(!task.completed);
        assert_eq!(task.date, NaiveDate::from_ymd_opt(2024, 6, 1));
        assert_eq!(task.status, TaskStatus::Urgent);
    }

    #[test]
    fn test_task_draft_requires_every_field() {
        let err = TaskDraft::default()
            .into_task(UserId::new("u1"), Utc::now())
            .unwrap_err();
        assert_eq!(
            err,
            ValidationError::MissingFields(vec!["Название", "Клиент", "Цена", "Дата"])
        );

        let err = TaskDraft {
            date: "01.06.2024".to_string(),
            ..draft()
        }
        .into_task(UserId::new("u1"), Utc::now())
        .unwrap_err();
        assert_eq!(err, ValidationError::Date("01.06.2024".to_string()));
    }

    #[test]
    fn test_tabs_filter_tasks() {
        let open_urgent = draft().into_task(UserId::new("u1"), Utc::now()).unwrap();
        let done_urgent = Task {
            completed: true,
            ..open_urgent.clone()
        };
        let in_progress = Task {
            status: TaskStatus::InProgress,
            ..open_urgent.clone()
        };
        let tasks = vec![open_urgent, done_urgent, in_progress];

        assert_eq!(TaskTab::All.filter(&tasks).len(), 3);
        assert_eq!(TaskTab::Active.filter(&tasks).len(), 2);
        assert_eq!(TaskTab::from_label("Срочные").filter(&tasks).len(), 2);
        assert_eq!(TaskTab::from_label("В работе").filter(&tasks).len(), 1);
    }

    #[test]
    fn test_tab_order_and_labels() {
        let labels: Vec<String> = TaskTab::all().iter().map(|t| t.label().to_owned()).collect();
        assert_eq!(
            labels,
            [
                "Все задачи",
                "Активные",
                "Срочные",
                "Готов",
                "Согласование",
                "Ждёт запчасть",
                "В работе"
            ]
        );
    }

    #[test]
    fn test_display_status_falls_back_on_completion() {
        let task: Task = serde_json::from_str(r#"{"userId": "u1", "status": "", "completed": true}"#)
            .unwrap();
        assert_eq!(task.display_status(), "Готов");
    }
}
