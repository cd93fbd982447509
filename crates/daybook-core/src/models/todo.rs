//! To-do model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{TodoId, UserId};

/// A to-do list item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub id: TodoId,
    pub user_id: UserId,
    pub task: String,
    pub deadline: Option<NaiveDate>,
    pub is_completed: bool,
    /// Creation timestamp (Unix ms)
    pub created_at: i64,
    /// Last update timestamp (Unix ms)
    pub updated_at: i64,
}

/// Where a deadline stands relative to today
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeadlineStatus {
    Overdue,
    DueToday,
}

impl Todo {
    /// Create a new pending item; `task` is expected to be trimmed already
    #[must_use]
    pub fn new(user_id: UserId, task: impl Into<String>, deadline: Option<NaiveDate>) -> Self {
        let now = crate::util::unix_millis_now();
        Self {
            id: TodoId::new(),
            user_id,
            task: task.into(),
            deadline,
            is_completed: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Deadline status as of `today`; `None` without a deadline or when it is still ahead
    #[must_use]
    pub fn deadline_status(&self, today: NaiveDate) -> Option<DeadlineStatus> {
        let deadline = self.deadline?;
        if deadline < today {
            Some(DeadlineStatus::Overdue)
        } else if deadline == today {
            Some(DeadlineStatus::DueToday)
        } else {
            None
        }
    }

    /// Pending and past its deadline
    #[must_use]
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        !self.is_completed && self.deadline_status(today) == Some(DeadlineStatus::Overdue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_deadline_status() {
        let user = UserId::new("u").unwrap();
        let today = date(2024, 3, 10);

        let none = Todo::new(user.clone(), "a", None);
        assert_eq!(none.deadline_status(today), None);

        let past = Todo::new(user.clone(), "b", Some(date(2024, 3, 9)));
        assert_eq!(past.deadline_status(today), Some(DeadlineStatus::Overdue));
        assert!(past.is_overdue(today));

        let due = Todo::new(user.clone(), "c", Some(today));
        assert_eq!(due.deadline_status(today), Some(DeadlineStatus::DueToday));

        let future = Todo::new(user, "d", Some(date(2024, 3, 11)));
        assert_eq!(future.deadline_status(today), None);
    }

    #[test]
    fn test_completed_is_never_overdue() {
        let mut todo = Todo::new(UserId::new("u").unwrap(), "x", Some(date(2020, 1, 1)));
        todo.is_completed = true;
        assert!(!todo.is_overdue(date(2024, 1, 1)));
    }
}
