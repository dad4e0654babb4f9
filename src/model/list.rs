use chrono::{Local, NaiveDate, NaiveDateTime};

use crate::io::store_io::{StoreError, current_user};
use crate::model::task::Task;

/// Store metadata carried in the persisted file's header block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreMeta {
    /// Date the store was first created
    pub created_on: NaiveDate,
    /// Account name of whoever created the store
    pub created_by: String,
    /// Timestamp of the last save
    pub updated_at: NaiveDateTime,
    /// Account name of whoever last saved the store
    pub updated_by: String,
}

impl StoreMeta {
    /// Fresh metadata for a brand-new (or header-less) store: current
    /// process identity and current date.
    pub fn now() -> Self {
        let user = current_user();
        StoreMeta {
            created_on: Local::now().date_naive(),
            created_by: user.clone(),
            updated_at: Local::now().naive_local(),
            updated_by: user,
        }
    }
}

/// The ordered task collection plus its header metadata.
///
/// Order is insertion order and is preserved across save/load. The list is
/// the sole owner of its tasks; query operations hand out indices into the
/// sequence rather than references, so callers can mutate through
/// [`TaskList::task_mut`] without borrow gymnastics.
#[derive(Debug, Clone)]
pub struct TaskList {
    pub meta: StoreMeta,
    tasks: Vec<Task>,
}

impl TaskList {
    pub fn new() -> Self {
        TaskList {
            meta: StoreMeta::now(),
            tasks: Vec::new(),
        }
    }

    pub fn with_meta(meta: StoreMeta) -> Self {
        TaskList {
            meta,
            tasks: Vec::new(),
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn task(&self, index: usize) -> Option<&Task> {
        self.tasks.get(index)
    }

    pub fn task_mut(&mut self, index: usize) -> Option<&mut Task> {
        self.tasks.get_mut(index)
    }

    /// Append a task to the end of the sequence and return a reference to it.
    pub fn add(&mut self, task: Task) -> &Task {
        self.tasks.push(task);
        self.tasks.last().unwrap()
    }

    /// Remove the first task equal to `task`. Fails if no such task exists.
    pub fn remove(&mut self, task: &Task) -> Result<Task, StoreError> {
        match self.tasks.iter().position(|t| t == task) {
            Some(idx) => Ok(self.tasks.remove(idx)),
            None => Err(StoreError::NotFound),
        }
    }

    /// Remove the task at `index`. Fails if the index is out of range.
    pub fn remove_at(&mut self, index: usize) -> Result<Task, StoreError> {
        if index < self.tasks.len() {
            Ok(self.tasks.remove(index))
        } else {
            Err(StoreError::NotFound)
        }
    }

    /// Replace the whole task sequence (used by load).
    pub fn replace_tasks(&mut self, tasks: Vec<Task>) {
        self.tasks = tasks;
    }

    /// Case-insensitive substring search against titles. Returns indices in
    /// list order. An empty query matches every task; an empty result is a
    /// valid outcome, not an error.
    pub fn find(&self, query: &str) -> Vec<usize> {
        self.tasks
            .iter()
            .enumerate()
            .filter(|(_, t)| t.title_matches(query))
            .map(|(i, _)| i)
            .collect()
    }

    /// Tasks whose deadline is set and falls on or before `date`.
    pub fn tasks_due_by(&self, date: NaiveDate) -> Vec<usize> {
        self.tasks
            .iter()
            .enumerate()
            .filter(|(_, t)| t.deadline.is_some_and(|d| d <= date))
            .map(|(i, _)| i)
            .collect()
    }

    /// Complement of [`TaskList::tasks_due_by`]: tasks with a later deadline
    /// or no deadline at all.
    pub fn tasks_upcoming(&self, date: NaiveDate) -> Vec<usize> {
        self.tasks
            .iter()
            .enumerate()
            .filter(|(_, t)| !t.deadline.is_some_and(|d| d <= date))
            .map(|(i, _)| i)
            .collect()
    }

    /// Tasks whose deadline is exactly `date`.
    pub fn tasks_on(&self, date: NaiveDate) -> Vec<usize> {
        self.tasks
            .iter()
            .enumerate()
            .filter(|(_, t)| t.deadline == Some(date))
            .map(|(i, _)| i)
            .collect()
    }
}

impl Default for TaskList {
    fn default() -> Self {
        TaskList::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample_list() -> TaskList {
        let mut list = TaskList::new();
        list.add(Task::with_details("Pay rent", "", Some(date(2026, 1, 1))));
        list.add(Task::with_details("File taxes", "", Some(date(2026, 4, 15))));
        list.add(Task::with_details("Read a book", "", None));
        list
    }

    #[test]
    fn test_add_preserves_order() {
        let list = sample_list();
        let titles: Vec<_> = list.tasks().iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["Pay rent", "File taxes", "Read a book"]);
    }

    #[test]
    fn test_remove_first_occurrence() {
        let mut list = sample_list();
        let target = list.task(1).unwrap().clone();
        let removed = list.remove(&target).unwrap();
        assert_eq!(removed.title, "File taxes");
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn test_remove_absent_task_fails() {
        let mut list = sample_list();
        let stranger = Task::new("Not in the list");
        assert!(matches!(list.remove(&stranger), Err(StoreError::NotFound)));
        assert_eq!(list.len(), 3);
    }

    #[test]
    fn test_remove_at_out_of_range() {
        let mut list = sample_list();
        assert!(matches!(list.remove_at(99), Err(StoreError::NotFound)));
    }

    #[test]
    fn test_find_case_insensitive() {
        let list = sample_list();
        assert_eq!(list.find("PAY"), vec![0]);
        assert_eq!(list.find("a"), vec![0, 1, 2]);
        assert!(list.find("zzz").is_empty());
    }

    #[test]
    fn test_find_empty_query_matches_all() {
        let list = sample_list();
        assert_eq!(list.find(""), vec![0, 1, 2]);
    }

    #[test]
    fn test_due_by_is_date_inclusive() {
        let list = sample_list();
        assert_eq!(list.tasks_due_by(date(2026, 1, 1)), vec![0]);
        assert_eq!(list.tasks_due_by(date(2026, 4, 15)), vec![0, 1]);
        assert!(list.tasks_due_by(date(2025, 12, 31)).is_empty());
    }

    #[test]
    fn test_due_by_and_upcoming_partition_the_list() {
        let list = sample_list();
        for d in [
            date(2025, 6, 1),
            date(2026, 1, 1),
            date(2026, 2, 1),
            date(2027, 1, 1),
        ] {
            let mut all = list.tasks_due_by(d);
            all.extend(list.tasks_upcoming(d));
            all.sort_unstable();
            assert_eq!(all, vec![0, 1, 2], "partition broken for {}", d);
        }
    }

    #[test]
    fn test_upcoming_includes_deadline_less_tasks() {
        let list = sample_list();
        let upcoming = list.tasks_upcoming(date(2099, 1, 1));
        assert_eq!(upcoming, vec![2]);
    }

    #[test]
    fn test_tasks_on_exact_match_only() {
        let list = sample_list();
        assert_eq!(list.tasks_on(date(2026, 4, 15)), vec![1]);
        assert!(list.tasks_on(date(2026, 4, 14)).is_empty());
    }
}
