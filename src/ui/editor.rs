use std::io;
use std::time::Duration;

use chrono::{Days, Local, NaiveDate};
use crossterm::style::Color;

use crate::model::task::Task;
use crate::ui::term::{Term, VIEW_WIDTH, is_cancel};

/// The editable fields of a task, in cycling order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Title,
    Deadline,
    Created,
    Description,
}

impl Field {
    fn next(self) -> Field {
        match self {
            Field::Title => Field::Deadline,
            Field::Deadline => Field::Created,
            Field::Created => Field::Description,
            Field::Description => Field::Title,
        }
    }

    fn prev(self) -> Field {
        match self {
            Field::Title => Field::Description,
            Field::Deadline => Field::Title,
            Field::Created => Field::Deadline,
            Field::Description => Field::Created,
        }
    }
}

/// Render a task's full detail. When `selected` is set the view doubles as
/// the field-editor screen: every field is shown (even empty ones) and the
/// selected one is highlighted with arrow markers.
pub fn render_task(term: &mut Term, task: &Task, selected: Option<Field>) -> io::Result<()> {
    let g = term.config.glyphs();
    let marker = format!(" {0}{0}{0}", g.left_arrow);
    let editing = selected.is_some();

    term.rule(VIEW_WIDTH)?;
    let check = if task.done {
        format!("[{}]", g.check)
    } else {
        "[ ]".to_string()
    };
    let title_line = format!("{} {}", check, task.title);
    if selected == Some(Field::Title) {
        term.centered(&format!("{}{}", title_line, marker), VIEW_WIDTH, Some(Color::Green))?;
    } else {
        term.centered(&title_line, VIEW_WIDTH, Some(Color::Magenta))?;
    }
    term.rule(VIEW_WIDTH)?;

    if task.deadline.is_some() || editing {
        let value = match task.deadline {
            Some(d) => format!("`{}`", d.format("%Y-%m-%d")),
            None => "`None`".to_string(),
        };
        let line = format!(" - Deadline: {}", value);
        if selected == Some(Field::Deadline) {
            let line = format!("{}{}", line, marker);
            let line = term.paint(&line, Color::Green);
            term.line(&line)?;
        } else {
            term.line(&line)?;
        }
    }

    let created = format!(" - Created: `{}`", task.created_at.format("%Y-%m-%d"));
    if selected == Some(Field::Created) {
        let line = format!("{}{}", created, marker);
        let line = term.paint(&line, Color::Green);
        term.line(&line)?;
    } else {
        term.line(&created)?;
    }

    if !task.description.is_empty() || editing {
        term.rule(VIEW_WIDTH)?;
        let header_color = if selected == Some(Field::Description) {
            Color::Green
        } else {
            Color::Cyan
        };
        term.centered("Description:", VIEW_WIDTH, Some(header_color))?;
        if task.description.is_empty() && editing {
            let empty = term.paint("    EMPTY", Color::DarkGrey);
            term.line(&empty)?;
        }
        for line in task.description.lines() {
            let text = format!("    {}", line);
            if selected == Some(Field::Description) {
                let text = term.paint(&text, Color::Green);
                term.line(&text)?;
            } else {
                term.line(&text)?;
            }
        }
    }
    term.rule(VIEW_WIDTH)?;
    Ok(())
}

/// The field editor: cycle through fields, toggle completion, hand off to
/// the per-field editors. Returns when the user backs out.
pub fn edit_task(term: &mut Term, task: &mut Task) -> io::Result<()> {
    let mut field = Field::Title;
    loop {
        term.clear()?;
        render_task(term, task, Some(field))?;
        let hint = term.paint("Options: e t n p b", Color::Cyan);
        term.line(&hint)?;

        let Some(input) = term.read_line(": ")? else {
            return Ok(());
        };
        let input = input.trim().to_string();
        if input.is_empty() || is_cancel(&input) {
            return Ok(());
        }
        match input.chars().next().map(|c| c.to_ascii_lowercase()) {
            Some('b') | Some('q') => return Ok(()),
            Some('n') => field = field.next(),
            Some('p') => field = field.prev(),
            Some('t') => task.toggle(),
            Some('e') => edit_field(term, task, field)?,
            _ => {
                let msg = term.paint("Unknown option.", Color::Red);
                term.line(&msg)?;
                term.sleep(Duration::from_millis(500));
            }
        }
    }
}

fn edit_field(term: &mut Term, task: &mut Task, field: Field) -> io::Result<()> {
    match field {
        Field::Title => {
            if let Some(new) = edit_string(term, "Edit title:", &task.title)? {
                let new = new.trim();
                if !new.is_empty() {
                    task.title = new.to_string();
                }
            }
        }
        Field::Deadline => {
            if let Some(new) = edit_date(term, "Edit deadline:", task.deadline, true)? {
                task.deadline = new;
            }
        }
        Field::Created => {
            if let Some(Some(new)) = edit_date(term, "Edit creation date:", Some(task.created_at), false)? {
                task.created_at = new;
            }
        }
        Field::Description => {
            if let Some(new) = edit_multiline(term, "Edit description:", &task.description)? {
                task.description = new;
            }
        }
    }
    Ok(())
}

/// Single-line text prompt. `None` means the edit was cancelled and the
/// caller should keep the previous value.
pub fn edit_string(term: &mut Term, message: &str, current: &str) -> io::Result<Option<String>> {
    term.line(message)?;
    let cancel_hint = term.paint("(You may cancel by entering ctrl-x)", Color::DarkGrey);
    term.line(&format!("  {}", cancel_hint))?;
    let shown = term.paint(&format!("\"{}\"", current), Color::Green);
    term.line(&format!("  Current: {}", shown))?;
    let Some(input) = term.read_line("  New: ")? else {
        return Ok(None);
    };
    if is_cancel(&input) {
        let msg = term.paint("Edit canceled.", Color::Yellow);
        term.line(&msg)?;
        term.sleep(Duration::from_millis(500));
        return Ok(None);
    }
    Ok(Some(input))
}

/// What a single date-editor input means.
#[derive(Debug, Clone, PartialEq, Eq)]
enum DateInput {
    Set(NaiveDate),
    Clear,
    Help,
    Invalid(&'static str),
}

fn parse_date_input(input: &str, today: NaiveDate, allow_clear: bool) -> DateInput {
    let input = input.trim();
    let lower = input.to_lowercase();
    if lower == "?" {
        return DateInput::Help;
    }
    if lower == "t" {
        return DateInput::Set(today);
    }
    if allow_clear && lower == "n" {
        return DateInput::Clear;
    }
    if let Some(rest) = lower.strip_prefix("d+").or_else(|| lower.strip_prefix("d-")) {
        let Ok(days) = rest.parse::<u64>() else {
            return DateInput::Invalid("Invalid format. Use d+<DAYS> or d-<DAYS> where <DAYS> is a number.");
        };
        let shifted = if lower.starts_with("d+") {
            today.checked_add_days(Days::new(days))
        } else {
            today.checked_sub_days(Days::new(days))
        };
        return match shifted {
            Some(d) => DateInput::Set(d),
            None => DateInput::Invalid("Date out of range."),
        };
    }
    match crate::parse::parse_iso_date(input) {
        Some(d) => DateInput::Set(d),
        None => DateInput::Invalid("Invalid date format. Please use YYYY-MM-DD."),
    }
}

/// Date prompt used for both deadline and creation date.
///
/// Returns `None` on cancel, `Some(None)` when the date was cleared (only
/// offered when `allow_clear` is set), `Some(Some(date))` otherwise.
pub fn edit_date(
    term: &mut Term,
    message: &str,
    current: Option<NaiveDate>,
    allow_clear: bool,
) -> io::Result<Option<Option<NaiveDate>>> {
    let clear_opt = if allow_clear { " n" } else { "" };
    let shown = match current {
        Some(d) => d.format("%Y-%m-%d").to_string(),
        None => "None".to_string(),
    };

    term.line(message)?;
    let options = term.paint(
        &format!("(Options: ? YYYY-MM-DD d+<DAYS> d-<DAYS> t{})", clear_opt),
        Color::Cyan,
    );
    term.line(&format!("  {}", options))?;
    let cancel_hint = term.paint("(You may cancel by entering ctrl-x)", Color::DarkGrey);
    term.line(&format!("  {}", cancel_hint))?;

    loop {
        let current_line = term.paint(&shown, Color::Green);
        term.line(&format!("  Current: {}", current_line))?;
        let Some(input) = term.read_line("  New: ")? else {
            return Ok(None);
        };
        if is_cancel(&input) {
            let msg = term.paint("Edit canceled.", Color::Yellow);
            term.line(&msg)?;
            term.sleep(Duration::from_millis(500));
            return Ok(None);
        }
        let today = Local::now().date_naive();
        match parse_date_input(&input, today, allow_clear) {
            DateInput::Set(d) => return Ok(Some(Some(d))),
            DateInput::Clear => return Ok(Some(None)),
            DateInput::Help => {
                term.line("")?;
                let header = term.paint("Options:", Color::Cyan);
                term.line(&header)?;
                term.line("  YYYY-MM-DD: Set a specific date.")?;
                term.line("  d+<DAYS>: Set a date in the future, e.g., d+7 for 7 days from now.")?;
                term.line("  d-<DAYS>: Set a date in the past, e.g., d-7 for 7 days ago.")?;
                term.line("  t: Set to today's date.")?;
                if allow_clear {
                    term.line("  n: Set to None (empty date).")?;
                }
                term.line("  ctrl-x: Cancel the edit.")?;
                term.line("")?;
            }
            DateInput::Invalid(msg) => {
                let msg = term.paint(msg, Color::Red);
                term.line(&msg)?;
            }
        }
    }
}

/// Line-oriented multi-line editor with a movable insertion cursor.
///
/// Returns the committed text, or `None` when cancelled.
pub fn edit_multiline(term: &mut Term, message: &str, current: &str) -> io::Result<Option<String>> {
    let mut lines: Vec<String> = if current.is_empty() {
        Vec::new()
    } else {
        current.lines().map(|l| l.to_string()).collect()
    };
    let mut cursor = lines.len();

    loop {
        term.clear()?;
        term.rule(VIEW_WIDTH)?;
        term.centered(message, VIEW_WIDTH, Some(Color::Cyan))?;
        term.rule(VIEW_WIDTH)?;

        let arrow = term
            .paint(&term.config.glyphs().left_arrow.to_string(), Color::Green);
        let num_width = lines.len().to_string().len().max(1);
        for (i, line) in lines.iter().enumerate() {
            let mark = if i == cursor { arrow.as_str() } else { " " };
            term.line(&format!("{:>num_width$} {} {}", i + 1, mark, line))?;
        }
        if cursor >= lines.len() {
            term.line(&arrow)?;
        }

        term.rule(VIEW_WIDTH)?;
        let hint = term.paint(
            "Options: // /del /done /<LIN> /? /edit <NEW_LINE>",
            Color::Cyan,
        );
        term.line(&hint)?;
        term.rule(VIEW_WIDTH)?;

        let Some(cmd) = term.read_line(": ")? else {
            return Ok(None);
        };
        if is_cancel(&cmd) {
            return Ok(None);
        }

        match cmd.as_str() {
            "/done" => return Ok(Some(lines.join("\n"))),
            "/?" => {
                term.clear()?;
                term.rule(VIEW_WIDTH)?;
                let header = term.paint("Options:", Color::Cyan);
                term.line(&header)?;
                term.rule(VIEW_WIDTH)?;
                term.line("  //          move to the end of the text.")?;
                term.line("  /del        delete the current line.")?;
                term.line("  /done       finish editing and return the text.")?;
                term.line("  /<LIN>      go to line number <LIN> (e.g., /3 for line 3).")?;
                term.line("  /?          show this help message.")?;
                term.line("  /edit       edit the current line.")?;
                term.line("  <NEW_LINE>  add a new line at the current position.")?;
                term.rule(VIEW_WIDTH)?;
                term.pause("Press Enter to continue...")?;
            }
            "/del" => {
                if cursor < lines.len() {
                    lines.remove(cursor);
                    if cursor >= lines.len() {
                        cursor = lines.len().saturating_sub(1);
                    }
                }
            }
            "/edit" => {
                if cursor < lines.len() {
                    let prompt = format!("Change line {}:", cursor + 1);
                    if let Some(new) = edit_string(term, &prompt, &lines[cursor])? {
                        lines[cursor] = new;
                    }
                }
            }
            "//" => cursor = lines.len(),
            _ if cmd.starts_with('/') => match cmd[1..].parse::<usize>() {
                Ok(n) if (1..=lines.len() + 1).contains(&n) => cursor = n - 1,
                Ok(_) => {
                    let msg = term.paint("Line number out of range.", Color::Red);
                    term.line(&msg)?;
                    term.sleep(Duration::from_millis(500));
                }
                Err(_) => {
                    let msg = term.paint("Invalid command.", Color::Red);
                    term.line(&msg)?;
                    term.sleep(Duration::from_millis(500));
                }
            },
            _ => {
                if cursor < lines.len() {
                    lines.insert(cursor, cmd);
                } else {
                    lines.push(cmd);
                }
                cursor += 1;
            }
        }
    }
}
