use chrono::{Local, NaiveDate};

/// A single todo item.
///
/// Titles are stored in full and only truncated for display. The creation
/// date is set at construction; it is user-editable but nothing in the
/// normal flow requires touching it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    /// Completion state
    pub done: bool,
    /// Task title (non-empty)
    pub title: String,
    /// Free-text description, may span multiple lines, may be empty
    pub description: String,
    /// Date the task was created
    pub created_at: NaiveDate,
    /// Optional deadline. A task without one counts as "upcoming".
    pub deadline: Option<NaiveDate>,
}

impl Task {
    /// Create a new open task. An empty or whitespace-only title falls back
    /// to `"New Task"`.
    pub fn new(title: impl Into<String>) -> Self {
        let title = title.into();
        let title = if title.trim().is_empty() {
            "New Task".to_string()
        } else {
            title.trim().to_string()
        };
        Task {
            done: false,
            title,
            description: String::new(),
            created_at: Local::now().date_naive(),
            deadline: None,
        }
    }

    /// Convenience constructor used by demo seeding.
    pub fn with_details(
        title: impl Into<String>,
        description: impl Into<String>,
        deadline: Option<NaiveDate>,
    ) -> Self {
        let mut task = Task::new(title);
        task.description = description.into();
        task.deadline = deadline;
        task
    }

    /// Flip the completion state.
    pub fn toggle(&mut self) {
        self.done = !self.done;
    }

    /// True if the title contains `query`, ignoring case.
    pub fn title_matches(&self, query: &str) -> bool {
        self.title.to_lowercase().contains(&query.trim().to_lowercase())
    }
}
