use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// A single task as stored in one file of a list directory.
///
/// The `filename` is the task's identity within its list. It is not part
/// of the serialized record (the file name itself carries it) and is
/// `None` until the store assigns one on first save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Todo {
    /// One-line task description
    pub summary: String,
    /// Optional due date
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due: Option<DateTime<Local>>,
    /// Whether the task is done
    #[serde(default)]
    pub completed: bool,
    /// When the task was completed; set together with `completed`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Local>>,
    /// File name within the owning list directory
    #[serde(skip)]
    pub filename: Option<String>,
}

impl Todo {
    /// Create a new, unsaved task
    pub fn new(summary: String, due: Option<DateTime<Local>>) -> Self {
        Todo {
            summary,
            due,
            completed: false,
            completed_at: None,
            filename: None,
        }
    }

    /// Mark the task done as of `now`. Keeps `completed` and
    /// `completed_at` in lockstep.
    pub fn set_complete(&mut self, now: DateTime<Local>) {
        self.completed = true;
        self.completed_at = Some(now);
    }
}
