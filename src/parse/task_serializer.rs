use indexmap::IndexMap;

use crate::model::list::StoreMeta;
use crate::model::task::Task;
use crate::parse::{DESC_MARGIN, TASKS_HEADING, fence_like};

/// Encode a single task as a record. No trailing newline.
pub fn encode_task(task: &Task) -> String {
    let mut out = String::new();
    out.push_str(if task.done { "- [X] " } else { "- [ ] " });
    out.push_str(&task.title);
    if let Some(deadline) = task.deadline {
        out.push_str(&format!(" - Deadline: `{}`", deadline.format("%Y-%m-%d")));
    }
    out.push_str(&format!(" - Created: `{}`", task.created_at.format("%Y-%m-%d")));

    if !task.description.is_empty() {
        out.push_str(&format!("\n{}```", DESC_MARGIN));
        for line in task.description.lines() {
            out.push('\n');
            // blank lines stay bare; fence-look-alikes get one extra space
            // so the closing fence stays unambiguous
            if line.is_empty() {
                continue;
            }
            out.push_str(DESC_MARGIN);
            if fence_like(line) {
                out.push(' ');
            }
            out.push_str(line);
        }
        out.push_str(&format!("\n{}```", DESC_MARGIN));
    }
    out
}

/// Serialize the whole store: header block, tasks heading, then one record
/// per task.
///
/// The record body is a title-keyed map: encoding two tasks with the same
/// title keeps only the last one. That collision is an accepted property of
/// the format, not an accident.
pub fn serialize_document(meta: &StoreMeta, tasks: &[Task]) -> String {
    let mut by_title: IndexMap<&str, &Task> = IndexMap::new();
    for task in tasks {
        by_title.insert(task.title.as_str(), task);
    }

    let mut out = String::new();
    out.push_str("---\n");
    out.push_str(&format!("Created: `{}`\n", meta.created_on.format("%Y-%m-%d")));
    out.push_str(&format!("Created by: {}\n", meta.created_by));
    out.push_str(&format!(
        "Last updated: {}\n",
        meta.updated_at.format("%Y-%m-%d %H:%M:%S")
    ));
    out.push_str(&format!("Last updated by: {}\n", meta.updated_by));
    out.push_str("Date format: `YYYY-MM-DD`\n");
    out.push_str("---\n\n");
    out.push_str(TASKS_HEADING);
    out.push_str("\n\n");

    for task in by_title.values() {
        out.push_str(&encode_task(task));
        out.push('\n');
    }
    out
}
