//! Status enums for listings and workshop tasks.
//!
//! Both are stored as the Russian labels the storefront shows, so documents
//! written by other clients read back unchanged. Labels outside the known set
//! are preserved in an `Other` variant rather than rejected.

use serde::{Deserialize, Serialize};

/// Where a product listing currently lives.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(from = "String", into = "String")]
pub enum ProductStatus {
    /// Visible in the shop window ("На витрине").
    #[default]
    OnDisplay,
    /// Held in the seller's warehouse, hidden from the shop ("На складе").
    InWarehouse,
    /// Available to order, not in stock ("Под заказ").
    PreOrder,
    /// Sold out ("Нет в наличии").
    OutOfStock,
    /// Any other label found in the store.
    Other(String),
}

impl ProductStatus {
    /// Store label for [`Self::OnDisplay`].
    pub const ON_DISPLAY: &'static str = "На витрине";
    /// Store label for [`Self::InWarehouse`].
    pub const IN_WAREHOUSE: &'static str = "На складе";
    /// Store label for [`Self::PreOrder`].
    pub const PRE_ORDER: &'static str = "Под заказ";
    /// Store label for [`Self::OutOfStock`].
    pub const OUT_OF_STOCK: &'static str = "Нет в наличии";

    /// The label written to the store.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::OnDisplay => Self::ON_DISPLAY,
            Self::InWarehouse => Self::IN_WAREHOUSE,
            Self::PreOrder => Self::PRE_ORDER,
            Self::OutOfStock => Self::OUT_OF_STOCK,
            Self::Other(label) => label,
        }
    }

    /// Whether the listing shows up in the public shop window.
    #[must_use]
    pub const fn is_public(&self) -> bool {
        matches!(self, Self::OnDisplay | Self::PreOrder)
    }
}

impl std::fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for ProductStatus {
    fn from(label: String) -> Self {
        match label.trim() {
            Self::ON_DISPLAY => Self::OnDisplay,
            Self::IN_WAREHOUSE => Self::InWarehouse,
            Self::PRE_ORDER => Self::PreOrder,
            Self::OUT_OF_STOCK => Self::OutOfStock,
            _ => Self::Other(label),
        }
    }
}

impl From<&str> for ProductStatus {
    fn from(label: &str) -> Self {
        Self::from(label.to_owned())
    }
}

impl From<ProductStatus> for String {
    fn from(status: ProductStatus) -> Self {
        match status {
            ProductStatus::Other(label) => label,
            known => known.as_str().to_owned(),
        }
    }
}

/// Workshop board status of a repair task.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(from = "String", into = "String")]
pub enum TaskStatus {
    /// "Активные"
    #[default]
    Active,
    /// "Срочные"
    Urgent,
    /// "Готов"
    Done,
    /// "Согласование"
    Approval,
    /// "Ждёт запчасть"
    AwaitingPart,
    /// "В работе"
    InProgress,
    /// Any other label found in the store.
    Other(String),
}

impl TaskStatus {
    /// Statuses a new task can be created with, in board order.
    pub const ALL: [Self; 6] = [
        Self::Active,
        Self::Urgent,
        Self::Done,
        Self::Approval,
        Self::AwaitingPart,
        Self::InProgress,
    ];

    /// The label written to the store.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Active => "Активные",
            Self::Urgent => "Срочные",
            Self::Done => "Готов",
            Self::Approval => "Согласование",
            Self::AwaitingPart => "Ждёт запчасть",
            Self::InProgress => "В работе",
            Self::Other(label) => label,
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for TaskStatus {
    fn from(label: String) -> Self {
        Self::ALL
            .into_iter()
            .find(|known| known.as_str() == label.trim())
            .unwrap_or(Self::Other(label))
    }
}

impl From<&str> for TaskStatus {
    fn from(label: &str) -> Self {
        Self::from(label.to_owned())
    }
}

impl From<TaskStatus> for String {
    fn from(status: TaskStatus) -> Self {
        match status {
            TaskStatus::Other(label) => label,
            known => known.as_str().to_owned(),
        }
    }
}
