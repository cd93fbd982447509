//! To-do progress counters

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::count_u32;
use crate::models::Todo;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoSummary {
    pub total: u32,
    pub completed: u32,
    pub pending: u32,
    /// Pending items whose deadline has passed
    pub overdue: u32,
    /// Completed share, rounded percent
    pub completion_rate: u32,
}

impl TodoSummary {
    #[must_use]
    pub fn from_todos(todos: &[Todo], today: NaiveDate) -> Self {
        let completed = todos.iter().filter(|todo| todo.is_completed).count();
        let overdue = todos.iter().filter(|todo| todo.is_overdue(today)).count();
        let total = todos.len();
        let completion_rate = if total == 0 {
            0
        } else {
            (completed * 200 + total) / (total * 2)
        };

        Self {
            total: count_u32(total),
            completed: count_u32(completed),
            pending: count_u32(total - completed),
            overdue: count_u32(overdue),
            completion_rate: count_u32(completion_rate),
        }
    }
}
