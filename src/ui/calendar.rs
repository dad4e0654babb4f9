use std::io;
use std::time::Duration;

use chrono::{Datelike, Days, Local, Months, NaiveDate};
use crossterm::style::Color;

use crate::model::list::TaskList;
use crate::ui::term::{Align, Cell, Term, is_cancel};

/// Width of one day cell in terminal cells.
const CELL_WIDTH: usize = 5;

/// Total view width: seven cells plus eight border columns.
const GRID_WIDTH: usize = 8 + 7 * CELL_WIDTH;

/// Shift by whole months, clamping the day to the target month's length
/// (Jan 31 plus one month is Feb 28/29). Year boundaries normalize.
pub fn shift_months(date: NaiveDate, delta: i32) -> NaiveDate {
    let shifted = if delta >= 0 {
        date.checked_add_months(Months::new(delta as u32))
    } else {
        date.checked_sub_months(Months::new(delta.unsigned_abs()))
    };
    shifted.unwrap_or(date)
}

/// Shift by whole years (twelve-month steps, same clamping rules).
pub fn shift_years(date: NaiveDate, delta: i32) -> NaiveDate {
    shift_months(date, delta.saturating_mul(12))
}

fn shift_days(date: NaiveDate, delta: i64) -> NaiveDate {
    let shifted = if delta >= 0 {
        date.checked_add_days(Days::new(delta as u64))
    } else {
        date.checked_sub_days(Days::new(delta.unsigned_abs()))
    };
    shifted.unwrap_or(date)
}

/// One parsed calendar input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CalendarInput {
    Years(i32),
    MonthsShift(i32),
    DaysShift(i64),
    Today,
    MonthBack,
    MonthForward,
    Jump(NaiveDate),
    List,
    Help,
    Quit,
    Invalid,
}

fn parse_calendar_input(input: &str) -> CalendarInput {
    let input = input.trim();
    if input.is_empty() {
        return CalendarInput::Invalid;
    }
    if is_cancel(input) {
        return CalendarInput::Quit;
    }
    let lower = input.to_lowercase();
    match lower.as_str() {
        "t" => return CalendarInput::Today,
        "p" => return CalendarInput::MonthBack,
        "n" => return CalendarInput::MonthForward,
        "l" => return CalendarInput::List,
        "b" | "q" => return CalendarInput::Quit,
        "?" => return CalendarInput::Help,
        _ => {}
    }
    if let Some(rest) = lower.strip_prefix('y') {
        if let Ok(n) = rest.parse::<i32>() {
            return CalendarInput::Years(n);
        }
    }
    if let Some(rest) = lower.strip_prefix('m') {
        if let Ok(n) = rest.parse::<i32>() {
            return CalendarInput::MonthsShift(n);
        }
    }
    if let Some(rest) = lower.strip_prefix('d') {
        if let Ok(n) = rest.parse::<i64>() {
            return CalendarInput::DaysShift(n);
        }
    }
    if let Some(d) = crate::parse::parse_iso_date(input) {
        return CalendarInput::Jump(d);
    }
    CalendarInput::Invalid
}

/// The weeks (Monday-first) spanning the whole of `cursor`'s month.
fn month_grid(cursor: NaiveDate) -> Vec<[NaiveDate; 7]> {
    let first = cursor.with_day(1).unwrap_or(cursor);
    let last = shift_months(first, 1).pred_opt().unwrap_or(first);

    let mut day = shift_days(first, -(first.weekday().num_days_from_monday() as i64));
    let mut weeks = Vec::new();
    while day <= last {
        let mut week = [day; 7];
        for slot in week.iter_mut() {
            *slot = day;
            day = shift_days(day, 1);
        }
        weeks.push(week);
    }
    weeks
}

fn day_cell(
    term: &Term,
    list: &TaskList,
    day: NaiveDate,
    cursor: NaiveDate,
    today: NaiveDate,
) -> (Cell, Cell) {
    let g = term.config.glyphs();
    let in_month = day.month() == cursor.month() && day.year() == cursor.year();

    let mut text = day.day().to_string();
    if day == today {
        text = format!("*{}", text);
    }
    if day == cursor {
        text = format!("{}{}{}", g.left_arrow, text, g.right_arrow);
    }
    let color = if day == cursor {
        Some(Color::Green)
    } else if day == today {
        Some(Color::Yellow)
    } else if !in_month {
        Some(Color::DarkGrey)
    } else {
        None
    };
    let number = Cell {
        width: CELL_WIDTH,
        text,
        align: Align::Center,
        color,
    };

    let on_day = list.tasks_on(day);
    let done = on_day
        .iter()
        .filter(|&&i| list.task(i).is_some_and(|t| t.done))
        .count();
    let counts = if on_day.is_empty() {
        Cell {
            width: CELL_WIDTH,
            text: String::new(),
            align: Align::Center,
            color: None,
        }
    } else {
        Cell {
            width: CELL_WIDTH,
            text: format!("{}/{}", done, on_day.len()),
            align: Align::Center,
            color: Some(if done == on_day.len() {
                Color::Green
            } else {
                Color::Yellow
            }),
        }
    };
    (number, counts)
}

fn render(term: &mut Term, list: &TaskList, cursor: NaiveDate, today: NaiveDate) -> io::Result<()> {
    let g = term.config.glyphs();
    let widths = [CELL_WIDTH; 7];

    term.clear()?;
    term.rule(GRID_WIDTH)?;
    let title = format!("{} - {}", cursor.format("%B"), cursor.year());
    term.centered(&title, GRID_WIDTH, Some(Color::Magenta))?;

    term.border_row(&widths, g.top_left, g.horizontal, g.top_cross, g.top_right)?;
    let header: Vec<Cell> = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"]
        .iter()
        .map(|d| Cell {
            width: CELL_WIDTH,
            text: d.to_string(),
            align: Align::Center,
            color: Some(Color::Cyan),
        })
        .collect();
    term.table_row(&header)?;
    term.border_row(&widths, g.left_cross, g.double_horizontal, g.cross, g.right_cross)?;

    let weeks = month_grid(cursor);
    let week_count = weeks.len();
    for (w, week) in weeks.iter().enumerate() {
        let mut numbers = Vec::new();
        let mut counts = Vec::new();
        for day in week {
            let (n, c) = day_cell(term, list, *day, cursor, today);
            numbers.push(n);
            counts.push(c);
        }
        term.table_row(&numbers)?;
        term.table_row(&counts)?;
        if w + 1 < week_count {
            term.border_row(&widths, g.left_cross, g.horizontal, g.cross, g.right_cross)?;
        }
    }
    term.border_row(
        &widths,
        g.bottom_left,
        g.horizontal,
        g.bottom_cross,
        g.bottom_right,
    )?;

    let hint = term.paint("Options: y±N m±N d±N t p n l YYYY-MM-DD ? b", Color::Cyan);
    term.line(&hint)?;
    Ok(())
}

fn show_help(term: &mut Term) -> io::Result<()> {
    term.clear()?;
    term.rule(GRID_WIDTH)?;
    term.centered("CALENDAR HELP:", GRID_WIDTH, Some(Color::Cyan))?;
    term.rule(GRID_WIDTH)?;
    term.line("")?;
    term.line("  y+N / y-N    shift the cursor by N years")?;
    term.line("  m+N / m-N    shift the cursor by N months")?;
    term.line("  d+N / d-N    shift the cursor by N days")?;
    term.line("  t            jump to today")?;
    term.line("  p / n        previous / next month")?;
    term.line("  YYYY-MM-DD   jump to a specific date")?;
    term.line("  l            list the tasks on the cursor date")?;
    term.line("  b / q / ^X   back to the main menu")?;
    term.line("")?;
    term.rule(GRID_WIDTH)?;
    term.pause("Press Enter to return to the calendar...")
}

/// Run the calendar browser. Returns `Some(date)` when the user asked to
/// list the cursor date's tasks (the caller applies it as a date filter),
/// `None` when they simply backed out.
pub fn browse(term: &mut Term, list: &TaskList, start: NaiveDate) -> io::Result<Option<NaiveDate>> {
    let mut cursor = start;
    loop {
        let today = Local::now().date_naive();
        render(term, list, cursor, today)?;
        let Some(input) = term.read_line(": ")? else {
            return Ok(None);
        };
        match parse_calendar_input(&input) {
            CalendarInput::Years(n) => cursor = shift_years(cursor, n),
            CalendarInput::MonthsShift(n) => cursor = shift_months(cursor, n),
            CalendarInput::DaysShift(n) => cursor = shift_days(cursor, n),
            CalendarInput::Today => cursor = today,
            CalendarInput::MonthBack => cursor = shift_months(cursor, -1),
            CalendarInput::MonthForward => cursor = shift_months(cursor, 1),
            CalendarInput::Jump(d) => cursor = d,
            CalendarInput::List => return Ok(Some(cursor)),
            CalendarInput::Quit => return Ok(None),
            CalendarInput::Help => show_help(term)?,
            CalendarInput::Invalid => {
                let msg = term.paint("Unknown calendar command (try ?).", Color::Red);
                term.line(&msg)?;
                term.sleep(Duration::from_millis(500));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::task::Task;
    use crate::ui::term::RenderConfig;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_shift_months_across_year_boundaries() {
        assert_eq!(shift_months(date(2026, 12, 15), 1), date(2027, 1, 15));
        assert_eq!(shift_months(date(2026, 1, 15), -1), date(2025, 12, 15));
    }

    #[test]
    fn test_shift_months_clamps_day() {
        assert_eq!(shift_months(date(2026, 1, 31), 1), date(2026, 2, 28));
        assert_eq!(shift_months(date(2024, 1, 31), 1), date(2024, 2, 29));
    }

    #[test]
    fn test_shift_years() {
        assert_eq!(shift_years(date(2026, 6, 1), 2), date(2028, 6, 1));
        assert_eq!(shift_years(date(2024, 2, 29), 1), date(2025, 2, 28));
    }

    #[test]
    fn test_month_grid_covers_full_weeks() {
        // June 2026: the 1st is a Monday, the 30th a Tuesday
        let weeks = month_grid(date(2026, 6, 15));
        assert_eq!(weeks.first().unwrap()[0], date(2026, 6, 1));
        assert_eq!(weeks.last().unwrap()[6], date(2026, 7, 5));
        for week in &weeks {
            assert_eq!(week.len(), 7);
        }
    }

    #[test]
    fn test_parse_calendar_input_forms() {
        assert_eq!(parse_calendar_input("y+3"), CalendarInput::Years(3));
        assert_eq!(parse_calendar_input("m-2"), CalendarInput::MonthsShift(-2));
        assert_eq!(parse_calendar_input("d+10"), CalendarInput::DaysShift(10));
        assert_eq!(parse_calendar_input("t"), CalendarInput::Today);
        assert_eq!(parse_calendar_input("l"), CalendarInput::List);
        assert_eq!(parse_calendar_input("q"), CalendarInput::Quit);
        assert_eq!(
            parse_calendar_input("2026-02-01"),
            CalendarInput::Jump(date(2026, 2, 1))
        );
        assert_eq!(parse_calendar_input("x"), CalendarInput::Invalid);
        assert_eq!(parse_calendar_input("m+"), CalendarInput::Invalid);
    }

    #[test]
    fn test_browse_list_signal_carries_cursor() {
        let list = TaskList::new();
        let mut term = Term::scripted(&["m+1", "l"], RenderConfig::default());
        let out = browse(&mut term, &list, date(2026, 12, 15)).unwrap();
        assert_eq!(out, Some(date(2027, 1, 15)));
    }

    #[test]
    fn test_browse_back_returns_none() {
        let list = TaskList::new();
        let mut term = Term::scripted(&["b"], RenderConfig::default());
        let out = browse(&mut term, &list, date(2026, 1, 1)).unwrap();
        assert_eq!(out, None);
    }

    #[test]
    fn test_day_cell_counts_and_colors() {
        let mut list = TaskList::new();
        let d = date(2026, 5, 5);
        list.add(Task::with_details("One", "", Some(d)));
        let mut done = Task::with_details("Two", "", Some(d));
        done.done = true;
        list.add(done);

        let term = Term::scripted(&[], RenderConfig::default());
        let (_, counts) = day_cell(&term, &list, d, date(2026, 5, 1), date(2026, 5, 2));
        assert_eq!(counts.text, "1/2");
        assert_eq!(counts.color, Some(Color::Yellow));
    }
}
