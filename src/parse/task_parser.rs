use std::sync::OnceLock;

use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;

use crate::io::store_io::StoreError;
use crate::model::task::Task;
use crate::parse::{DESC_MARGIN, fence_like};

/// Header metadata as found in the file. Every field is optional: the store
/// substitutes process identity and current date for anything missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderFields {
    pub created_on: Option<NaiveDate>,
    pub created_by: Option<String>,
    pub updated_at: Option<NaiveDateTime>,
    pub updated_by: Option<String>,
}

/// Result of parsing a whole store file.
#[derive(Debug, Clone)]
pub struct ParsedDocument {
    pub header: HeaderFields,
    pub tasks: Vec<Task>,
}

/// Anchored whole-record pattern: checkbox, title, optional deadline suffix,
/// required created suffix, optional trailing `\` continuation marker, then
/// an optional fenced description block.
fn record_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"\A- \[(X| )\] (.+?)(?: - Deadline: `(\d{4}-\d{2}-\d{2})`)? - Created: `(\d{4}-\d{2}-\d{2})`\\?(?:\n[ \t]*```((?s:.*?))```)?\z",
        )
        .unwrap()
    })
}

/// Parse an ISO `YYYY-MM-DD` date.
pub fn parse_iso_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()
}

fn require_date(s: &str) -> Result<NaiveDate, StoreError> {
    parse_iso_date(s).ok_or_else(|| StoreError::BadDate(s.to_string()))
}

/// Decode a single record. The match must cover the whole text.
pub fn decode_task(record: &str) -> Result<Task, StoreError> {
    let caps = record_re()
        .captures(record)
        .ok_or_else(|| StoreError::Malformed {
            line: 1,
            text: first_line(record),
        })?;

    let done = &caps[1] == "X";
    let title = caps[2].to_string();
    let deadline = match caps.get(3) {
        Some(m) => Some(require_date(m.as_str())?),
        None => None,
    };
    let created_at = require_date(&caps[4])?;
    let description = caps
        .get(5)
        .map(|m| decode_description(m.as_str()))
        .unwrap_or_default();

    Ok(Task {
        done,
        title,
        description,
        created_at,
        deadline,
    })
}

/// Recover the description text from the fence interior: drop the leading
/// newline and the closing-fence indent, strip the fixed margin from each
/// line, then undo the encoder's fence escaping.
fn decode_description(block: &str) -> String {
    let mut lines: Vec<&str> = block.split('\n').collect();
    if lines.first().is_some_and(|l| l.is_empty()) {
        lines.remove(0);
    }
    if lines.last().is_some_and(|l| l.trim().is_empty()) {
        lines.pop();
    }
    lines
        .iter()
        .map(|line| match line.strip_prefix(DESC_MARGIN) {
            Some(rest) => rest,
            None => line.trim_start(),
        })
        .map(|line| {
            if line.starts_with(' ') && fence_like(line) {
                &line[1..]
            } else {
                line
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn first_line(s: &str) -> String {
    s.lines().next().unwrap_or("").to_string()
}

/// Parse a complete store file: optional `---` header block, the required
/// tasks heading, then zero or more records.
///
/// Parsing is all-or-nothing: any malformed content fails the whole load so
/// the caller never sees a partially populated store.
pub fn parse_document(text: &str) -> Result<ParsedDocument, StoreError> {
    let lines: Vec<&str> = text.lines().collect();
    let mut idx = 0;

    let header = if lines.first().map(|l| l.trim()) == Some("---") {
        let (header, next) = parse_header(&lines, 1)?;
        idx = next;
        header
    } else {
        HeaderFields::default()
    };

    // Locate the tasks heading. Anything non-blank before it is not ours.
    loop {
        match lines.get(idx) {
            None => return Err(StoreError::MissingTasksSection),
            Some(l) if l.trim().is_empty() => idx += 1,
            Some(l) if l.starts_with("# ") => {
                idx += 1;
                break;
            }
            Some(l) if l.starts_with("- [") => return Err(StoreError::MissingTasksSection),
            Some(l) => {
                return Err(StoreError::Malformed {
                    line: idx + 1,
                    text: l.to_string(),
                });
            }
        }
    }

    let mut tasks = Vec::new();
    while idx < lines.len() {
        let line = lines[idx];
        if line.trim().is_empty() {
            idx += 1;
            continue;
        }
        if !line.starts_with("- [") {
            return Err(StoreError::Malformed {
                line: idx + 1,
                text: line.to_string(),
            });
        }
        let start = idx;
        let end = record_end(&lines, idx)?;
        let record = lines[start..end].join("\n");
        let task = decode_task(&record).map_err(|e| match e {
            StoreError::Malformed { text, .. } => StoreError::Malformed {
                line: start + 1,
                text,
            },
            other => other,
        })?;
        tasks.push(task);
        idx = end;
    }

    Ok(ParsedDocument { header, tasks })
}

/// A description fence line: bare, or at exactly the fixed margin. Deeper
/// indentation means escaped description content, not a fence.
fn is_fence(line: &str) -> bool {
    line == "```" || line.strip_prefix(DESC_MARGIN).is_some_and(|rest| rest == "```")
}

/// Find the exclusive end index of the record starting at `start`: the task
/// line itself, plus a fenced description block if one follows.
fn record_end(lines: &[&str], start: usize) -> Result<usize, StoreError> {
    let mut end = start + 1;
    if lines.get(end).is_some_and(|l| is_fence(l)) {
        end += 1;
        loop {
            match lines.get(end) {
                None => {
                    return Err(StoreError::Malformed {
                        line: start + 1,
                        text: "unterminated description block".to_string(),
                    });
                }
                Some(l) if is_fence(l) => {
                    end += 1;
                    break;
                }
                Some(_) => end += 1,
            }
        }
    }
    Ok(end)
}

/// Parse the `---` delimited header block starting after the opening marker.
/// Returns the fields and the index just past the closing marker. Unknown
/// keys are ignored; the header is lenient where the records are strict.
fn parse_header(lines: &[&str], start: usize) -> Result<(HeaderFields, usize), StoreError> {
    let mut header = HeaderFields::default();
    let mut idx = start;
    loop {
        let Some(line) = lines.get(idx) else {
            return Err(StoreError::Malformed {
                line: start,
                text: "unterminated header block".to_string(),
            });
        };
        if line.trim() == "---" {
            return Ok((header, idx + 1));
        }
        if let Some((key, value)) = line.split_once(':') {
            let value = value.trim();
            match key.trim() {
                "Created" => header.created_on = Some(require_date(value.trim_matches('`'))?),
                "Created by" => header.created_by = Some(value.to_string()),
                "Last updated" => {
                    let stamp = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S")
                        .map_err(|_| StoreError::BadDate(value.to_string()))?;
                    header.updated_at = Some(stamp);
                }
                "Last updated by" => header.updated_by = Some(value.to_string()),
                _ => {}
            }
        }
        idx += 1;
    }
}
