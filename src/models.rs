use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const MAX_TITLE_CHARS: usize = 20;

// Todo row as stored in the `todos` table
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Todo {
    pub id: String,
    pub title: String,
    pub status: TodoStatus,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub due_period: Option<DuePeriod>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TodoStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
}

impl TodoStatus {
    /// Status after pressing the status badge.
    pub fn cycled(self) -> TodoStatus {
        match self {
            TodoStatus::Pending => TodoStatus::InProgress,
            TodoStatus::InProgress => TodoStatus::Pending,
            TodoStatus::Completed => TodoStatus::Pending,
        }
    }

    /// Status after toggling the checkbox.
    pub fn toggled_completion(self) -> TodoStatus {
        match self {
            TodoStatus::Completed => TodoStatus::Pending,
            _ => TodoStatus::Completed,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TodoStatus::Pending => "pending",
            TodoStatus::InProgress => "in progress",
            TodoStatus::Completed => "done",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuePeriod {
    #[default]
    Day,
    Week,
    Month,
    Year,
    Unspecified,
}

impl DuePeriod {
    pub const ALL: [DuePeriod; 5] = [
        DuePeriod::Day,
        DuePeriod::Week,
        DuePeriod::Month,
        DuePeriod::Year,
        DuePeriod::Unspecified,
    ];

    pub fn next(self) -> DuePeriod {
        let i = Self::ALL.iter().position(|p| *p == self).unwrap_or(0);
        Self::ALL[(i + 1) % Self::ALL.len()]
    }

    pub fn previous(self) -> DuePeriod {
        let i = Self::ALL.iter().position(|p| *p == self).unwrap_or(0);
        Self::ALL[(i + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    /// Input format hint shown next to the selection field.
    pub fn selection_hint(self) -> &'static str {
        match self {
            DuePeriod::Day => "YYYY-MM-DD",
            DuePeriod::Week => "any YYYY-MM-DD in the week",
            DuePeriod::Month => "YYYY-MM",
            DuePeriod::Year => "YYYY",
            DuePeriod::Unspecified => "no due date",
        }
    }
}

impl fmt::Display for DuePeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DuePeriod::Day => "day",
            DuePeriod::Week => "week",
            DuePeriod::Month => "month",
            DuePeriod::Year => "year",
            DuePeriod::Unspecified => "unspecified",
        };
        f.write_str(s)
    }
}

// Insert payload; unset fields are left to column defaults
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NewTodo {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_period: Option<DuePeriod>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
}

// Partial update payload
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct TodoPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TodoStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_period: Option<DuePeriod>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
}
