use std::io;
use std::path::PathBuf;
use std::time::Duration;

use chrono::{Local, NaiveDate};
use crossterm::style::Color;

use crate::io::store_io::{StoreError, load_store, save_store};
use crate::model::list::TaskList;
use crate::model::task::Task;
use crate::ui::calendar;
use crate::ui::command::{Command, parse_command};
use crate::ui::editor::{edit_task, render_task};
use crate::ui::term::{Term, VIEW_WIDTH, is_cancel};

/// The main menu controller.
///
/// Owns the store, the file it lives in, and the selection state. Every
/// mutating command saves immediately; quitting never loses work.
pub struct App {
    list: TaskList,
    path: PathBuf,
    /// Index into the visible sequence (not into the list itself).
    selected: usize,
    /// When set, the view shows only tasks due exactly on this date.
    date_filter: Option<NaiveDate>,
}

/// One labeled group of list indices, in display order.
struct Group {
    label: String,
    indices: Vec<usize>,
}

impl App {
    /// Load (or start) the store at `path`.
    pub fn load(path: PathBuf) -> Result<Self, StoreError> {
        let list = load_store(&path)?;
        Ok(App {
            list,
            path,
            selected: 0,
            date_filter: None,
        })
    }

    /// Populate the list with sample tasks, for trying the app out.
    pub fn seed_demo(&mut self) {
        let today = Local::now().date_naive();
        let d = |m, day| NaiveDate::from_ymd_opt(2026, m, day);
        let samples = [
            ("D Task 1", "This is a demo\ntask description.", d(10, 15)),
            ("De Task 2", "This is another demo\ntask description.", d(10, 20)),
            ("Dem Task 3", "This is yet another\ndemo task description.", d(10, 25)),
            ("Demo Task 4", "This is a fourth demo\ntask description.", d(10, 30)),
            ("Demo Task 5.", "This is a fifth demo\ntask description.", Some(today)),
            ("Demo Task 6..", "This is a sixth demo\ntask description.", Some(today)),
            ("Demo Task 7...", "This is a seventh demo\ntask description.", None),
            ("Demo Task 8....", "This is an eighth\ndemo task description.", None),
        ];
        for (title, desc, deadline) in samples {
            self.list.add(Task::with_details(title, desc, deadline));
        }
    }

    /// The groups currently on screen: either the single date-filter group,
    /// or the due-today / upcoming split.
    fn groups(&self) -> Vec<Group> {
        match self.date_filter {
            Some(date) => vec![Group {
                label: format!("Date: {}", date.format("%Y-%m-%d")),
                indices: self.list.tasks_on(date),
            }],
            None => {
                let today = Local::now().date_naive();
                vec![
                    Group {
                        label: "Today:".to_string(),
                        indices: self.list.tasks_due_by(today),
                    },
                    Group {
                        label: "Upcoming:".to_string(),
                        indices: self.list.tasks_upcoming(today),
                    },
                ]
            }
        }
    }

    /// The visible list indices, in display order.
    fn visible(&self) -> Vec<usize> {
        self.groups().into_iter().flat_map(|g| g.indices).collect()
    }

    fn clamp_selection(&mut self) {
        let count = self.visible().len();
        if count == 0 {
            self.selected = 0;
        } else if self.selected >= count {
            self.selected = count - 1;
        }
    }

    /// Resolve a search argument against the visible tasks. An empty search
    /// means the current selection; a non-empty one means every visible
    /// match, with no fallback to the selection.
    fn resolve(&self, search: &str) -> Vec<usize> {
        let visible = self.visible();
        if search.is_empty() {
            return visible.get(self.selected).map(|&i| vec![i]).unwrap_or_default();
        }
        visible
            .into_iter()
            .filter(|&i| self.list.task(i).is_some_and(|t| t.title_matches(search)))
            .collect()
    }

    /// Persist the store. A failed save is the one unrecoverable error in
    /// the loop: report it, then let it reach the process boundary.
    fn save(&mut self, term: &mut Term) -> io::Result<()> {
        if let Err(e) = save_store(&self.path, &mut self.list) {
            let msg = term.paint(&format!("Could not save: {}", e), Color::Red);
            term.line(&msg)?;
            return Err(io::Error::other(e));
        }
        Ok(())
    }

    fn notice(&self, term: &mut Term, text: &str, color: Color) -> io::Result<()> {
        let msg = term.paint(text, color);
        term.line(&msg)?;
        term.sleep(Duration::from_millis(700));
        Ok(())
    }

    fn render_row(
        &self,
        term: &mut Term,
        position: usize,
        index: usize,
        title_width: usize,
    ) -> io::Result<()> {
        let Some(task) = self.list.task(index) else {
            return Ok(());
        };
        let g = term.config.glyphs();
        let check = if task.done {
            g.check.to_string()
        } else {
            " ".to_string()
        };
        let title = crate::util::unicode::truncate_to_width(&task.title, title_width);
        let title = crate::util::unicode::pad_to_width(&title, title_width);
        let deadline = match task.deadline {
            Some(d) => format!("  `{}`", d.format("%Y-%m-%d")),
            None => String::new(),
        };
        let body = format!("{:>3} [{}] {}{}", position + 1, check, title, deadline);
        if position == self.selected {
            let line = format!(" {} {}", g.left_arrow, body);
            let line = term.paint(&line, Color::Green);
            term.line(&line)
        } else {
            term.line(&format!("   {}", body))
        }
    }

    fn render(&self, term: &mut Term) -> io::Result<()> {
        term.clear()?;
        term.rule(VIEW_WIDTH)?;
        term.centered("TODOS:", VIEW_WIDTH, Some(Color::Magenta))?;
        term.rule(VIEW_WIDTH)?;

        let groups = self.groups();
        let title_width = groups
            .iter()
            .flat_map(|g| g.indices.iter())
            .filter_map(|&i| self.list.task(i))
            .map(|t| crate::util::unicode::display_width(&t.title))
            .max()
            .unwrap_or(0)
            .min(VIEW_WIDTH - 24);

        let mut position = 0;
        for group in &groups {
            let label = term.paint(&group.label, Color::Cyan);
            term.line(&label)?;
            if group.indices.is_empty() {
                let empty = term.paint("    (none)", Color::DarkGrey);
                term.line(&empty)?;
            }
            for &index in &group.indices {
                self.render_row(term, position, index, title_width)?;
                position += 1;
            }
            term.line("")?;
        }

        term.rule(VIEW_WIDTH)?;
        let mut hint = "Options: + - d e g t p n / ? q".to_string();
        if self.date_filter.is_some() {
            hint.push_str("   (/ clears the date filter)");
        }
        let hint = term.paint(&hint, Color::Cyan);
        term.line(&hint)
    }

    fn show_help(&self, term: &mut Term) -> io::Result<()> {
        term.clear()?;
        term.rule(VIEW_WIDTH)?;
        term.centered("HELP:", VIEW_WIDTH, Some(Color::Cyan))?;
        term.rule(VIEW_WIDTH)?;
        term.line("")?;
        term.line("  +[TITLE]        add a new task and edit it (default title when omitted)")?;
        term.line("  -[SEARCH]       remove the selected task, or every match")?;
        term.line("  d[SEARCH]       show the details of a task")?;
        term.line("  e[SEARCH]       edit a task's fields")?;
        term.line("  g<NUM|SEARCH>   move the selection to a row or a match")?;
        term.line("  t<SEARCH>       toggle every matching task")?;
        term.line("  p / n / t       previous / next / toggle; chains like `nnt` work")?;
        term.line("  /               advanced commands (see below)")?;
        term.line("  q / b / ctrl-x  save and quit")?;
        term.line("")?;
        term.line("  Advanced:")?;
        term.line("  / or /default   clear the date filter")?;
        term.line("  /calendar       browse the calendar; `l` there filters by date")?;
        term.line("  /YYYY-MM-DD     filter the view to one deadline date")?;
        term.line("  /ascii /unicode     switch the glyph set")?;
        term.line("  /colors /no-colors  switch colored output")?;
        term.line("")?;
        term.rule(VIEW_WIDTH)?;
        term.pause("Press Enter to return to the list...")
    }

    /// Append a new task and drop straight into the field editor on it.
    fn add(&mut self, term: &mut Term, title: &str) -> io::Result<()> {
        self.list.add(Task::new(title));
        let index = self.list.len() - 1;
        if let Some(task) = self.list.task_mut(index) {
            edit_task(term, task)?;
        }
        self.save(term)
    }

    fn remove(&mut self, term: &mut Term, search: &str) -> io::Result<()> {
        let targets = self.resolve(search);
        match targets.len() {
            0 => self.notice(term, "Nothing to remove.", Color::Yellow),
            1 => {
                let index = targets[0];
                let title = self
                    .list
                    .task(index)
                    .map(|t| t.title.clone())
                    .unwrap_or_default();
                self.notice(term, &format!("Removing \"{}\"...", title), Color::Yellow)?;
                term.sleep(Duration::from_secs(2));
                if self.list.remove_at(index).is_ok() {
                    self.save(term)?;
                }
                Ok(())
            }
            _ => {
                term.line("This will remove:")?;
                for &i in &targets {
                    if let Some(task) = self.list.task(i) {
                        term.line(&format!("  - {}", task.title))?;
                    }
                }
                let Some(answer) = term.read_line("Type `yes` to confirm: ")? else {
                    return Ok(());
                };
                if answer.eq_ignore_ascii_case("yes") {
                    // back to front so earlier removals do not shift later indices
                    let mut sorted = targets;
                    sorted.sort_unstable();
                    for &i in sorted.iter().rev() {
                        let _ = self.list.remove_at(i);
                    }
                    self.save(term)?;
                    self.notice(term, "Removed.", Color::Green)
                } else {
                    self.notice(term, "Removal canceled.", Color::Yellow)
                }
            }
        }
    }

    fn detail(&mut self, term: &mut Term, search: &str) -> io::Result<()> {
        let targets = self.resolve(search);
        let Some(&index) = targets.first() else {
            return self.notice(term, "No matching task.", Color::Yellow);
        };
        if let Some(task) = self.list.task(index) {
            term.clear()?;
            render_task(term, task, None)?;
            term.pause("Press Enter to return to the list...")?;
        }
        Ok(())
    }

    fn edit(&mut self, term: &mut Term, search: &str) -> io::Result<()> {
        let targets = self.resolve(search);
        let Some(&index) = targets.first() else {
            return self.notice(term, "No matching task.", Color::Yellow);
        };
        if let Some(task) = self.list.task_mut(index) {
            edit_task(term, task)?;
            self.save(term)?;
        }
        Ok(())
    }

    fn goto(&mut self, term: &mut Term, arg: &str) -> io::Result<()> {
        // the empty argument targets the selection itself, so there is
        // nowhere to move
        if arg.is_empty() {
            return Ok(());
        }
        let visible = self.visible();
        if let Ok(n) = arg.parse::<usize>() {
            if (1..=visible.len()).contains(&n) {
                self.selected = n - 1;
                return Ok(());
            }
            return self.notice(
                term,
                &format!("No row {} (1..{}).", n, visible.len()),
                Color::Red,
            );
        }
        match visible
            .iter()
            .position(|&i| self.list.task(i).is_some_and(|t| t.title_matches(arg)))
        {
            Some(pos) => {
                self.selected = pos;
                Ok(())
            }
            None => self.notice(term, "No matching task.", Color::Yellow),
        }
    }

    fn toggle_matches(&mut self, term: &mut Term, search: &str) -> io::Result<()> {
        let targets = self.resolve(search);
        if targets.is_empty() {
            return self.notice(term, "No matching task.", Color::Yellow);
        }
        for &i in &targets {
            if let Some(task) = self.list.task_mut(i) {
                task.toggle();
            }
        }
        self.save(term)
    }

    /// Apply a navigation sequence one character at a time. Saves once at
    /// the end if any `t` toggled a task.
    fn navigate(&mut self, term: &mut Term, sequence: &str) -> io::Result<()> {
        let mut toggled = false;
        for c in sequence.chars() {
            let count = self.visible().len();
            match c {
                'p' if count > 0 => {
                    self.selected = if self.selected == 0 {
                        count - 1
                    } else {
                        self.selected - 1
                    };
                }
                'n' if count > 0 => {
                    self.selected = (self.selected + 1) % count;
                }
                't' => {
                    if let Some(&index) = self.visible().get(self.selected) {
                        if let Some(task) = self.list.task_mut(index) {
                            task.toggle();
                            toggled = true;
                        }
                    }
                }
                _ => {}
            }
        }
        if toggled {
            self.save(term)?;
        }
        Ok(())
    }

    fn advanced(&mut self, term: &mut Term, sub: &str) -> io::Result<()> {
        match sub {
            "" | "default" => {
                self.date_filter = None;
                self.selected = 0;
                Ok(())
            }
            "calendar" | "c" => {
                let start = self.date_filter.unwrap_or_else(|| Local::now().date_naive());
                if let Some(date) = calendar::browse(term, &self.list, start)? {
                    self.date_filter = Some(date);
                    self.selected = 0;
                }
                Ok(())
            }
            "ascii" => {
                term.config.ascii = true;
                Ok(())
            }
            "unicode" => {
                term.config.ascii = false;
                Ok(())
            }
            "colors" => {
                term.config.colors = true;
                Ok(())
            }
            "no-colors" => {
                term.config.colors = false;
                Ok(())
            }
            "help" | "?" => self.show_help(term),
            other => match crate::parse::parse_iso_date(other) {
                Some(date) => {
                    self.date_filter = Some(date);
                    self.selected = 0;
                    Ok(())
                }
                None => self.notice(
                    term,
                    &format!("Unknown advanced command `{}` (try /help).", other),
                    Color::Red,
                ),
            },
        }
    }

    /// The interactive loop. Returns when the user quits or input ends.
    pub fn run(&mut self, term: &mut Term) -> io::Result<()> {
        loop {
            self.clamp_selection();
            self.render(term)?;
            let Some(input) = term.read_line(": ")? else {
                return Ok(());
            };
            if is_cancel(&input) {
                return Ok(());
            }
            match parse_command(&input) {
                Command::Add(title) => self.add(term, &title)?,
                Command::Remove(search) => self.remove(term, &search)?,
                Command::Detail(search) => self.detail(term, &search)?,
                Command::Edit(search) => self.edit(term, &search)?,
                Command::Goto(arg) => self.goto(term, &arg)?,
                Command::Toggle(search) => self.toggle_matches(term, &search)?,
                Command::Navigate(sequence) => self.navigate(term, &sequence)?,
                Command::Help => self.show_help(term)?,
                Command::Advanced(sub) => self.advanced(term, &sub)?,
                Command::Quit => return Ok(()),
                Command::Noop => {}
                Command::Unknown(text) => {
                    self.notice(
                        term,
                        &format!("Unknown command `{}` (try ?).", text),
                        Color::Red,
                    )?;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::term::RenderConfig;
    use tempfile::TempDir;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn app_in(tmp: &TempDir) -> App {
        App::load(tmp.path().join("todos.md")).unwrap()
    }

    fn scripted(lines: &[&str]) -> Term {
        Term::scripted(lines, RenderConfig::default())
    }

    #[test]
    fn test_add_saves_to_disk() {
        let tmp = TempDir::new().unwrap();
        let mut app = app_in(&tmp);
        // `+` opens the field editor on the new task; back out, then quit
        let mut term = scripted(&["+ Buy milk", "b", "q"]);
        app.run(&mut term).unwrap();

        let reloaded = app_in(&tmp);
        assert_eq!(reloaded.list.len(), 1);
        assert_eq!(reloaded.list.task(0).unwrap().title, "Buy milk");
    }

    #[test]
    fn test_add_without_title_uses_default() {
        let tmp = TempDir::new().unwrap();
        let mut app = app_in(&tmp);
        let mut term = scripted(&["+", "b", "q"]);
        app.run(&mut term).unwrap();
        assert_eq!(app.list.task(0).unwrap().title, "New Task");
    }

    #[test]
    fn test_add_can_set_deadline_in_editor() {
        let tmp = TempDir::new().unwrap();
        let mut app = app_in(&tmp);
        // in the editor: cycle to deadline, edit, enter a date, back out
        let mut term = scripted(&["+ Dated", "n", "e", "2026-03-04", "b", "q"]);
        app.run(&mut term).unwrap();
        assert_eq!(app.list.task(0).unwrap().deadline, Some(date(2026, 3, 4)));
    }

    #[test]
    fn test_single_remove_autoconfirms() {
        let tmp = TempDir::new().unwrap();
        let mut app = app_in(&tmp);
        app.list.add(Task::new("Only one"));
        let mut term = scripted(&["- only", "q"]);
        app.run(&mut term).unwrap();
        assert!(app.list.is_empty());
    }

    #[test]
    fn test_multi_remove_needs_confirmation() {
        let tmp = TempDir::new().unwrap();
        let mut app = app_in(&tmp);
        app.list.add(Task::new("Demo A"));
        app.list.add(Task::new("Demo B"));
        app.list.add(Task::new("Keep me"));

        let mut term = scripted(&["- demo", "no", "q"]);
        app.run(&mut term).unwrap();
        assert_eq!(app.list.len(), 3);

        let mut term = scripted(&["- demo", "yes", "q"]);
        app.run(&mut term).unwrap();
        assert_eq!(app.list.len(), 1);
        assert_eq!(app.list.task(0).unwrap().title, "Keep me");
    }

    #[test]
    fn test_remove_with_no_match_changes_nothing() {
        let tmp = TempDir::new().unwrap();
        let mut app = app_in(&tmp);
        app.list.add(Task::new("Stay"));
        let mut term = scripted(&["- zzz", "q"]);
        app.run(&mut term).unwrap();
        assert_eq!(app.list.len(), 1);
    }

    #[test]
    fn test_navigation_wraps_and_toggle_saves() {
        let tmp = TempDir::new().unwrap();
        let mut app = app_in(&tmp);
        app.list.add(Task::new("First"));
        app.list.add(Task::new("Second"));

        // p from row 0 wraps to the last row; t toggles it
        let mut term = scripted(&["pt", "q"]);
        app.run(&mut term).unwrap();
        assert!(app.list.task(1).unwrap().done);

        let reloaded = app_in(&tmp);
        assert!(reloaded.list.task(1).unwrap().done);
    }

    #[test]
    fn test_goto_by_number_and_by_search() {
        let tmp = TempDir::new().unwrap();
        let mut app = app_in(&tmp);
        app.list.add(Task::new("Alpha"));
        app.list.add(Task::new("Beta"));
        app.list.add(Task::new("Gamma"));

        let mut term = scripted(&["g3", "t", "q"]);
        app.run(&mut term).unwrap();
        assert!(app.list.task(2).unwrap().done);

        let mut term = scripted(&["g beta", "t", "q"]);
        app.run(&mut term).unwrap();
        assert!(app.list.task(1).unwrap().done);
    }

    #[test]
    fn test_goto_out_of_range_is_inline_error() {
        let tmp = TempDir::new().unwrap();
        let mut app = app_in(&tmp);
        app.list.add(Task::new("Solo"));
        let mut term = scripted(&["g9", "q"]);
        app.run(&mut term).unwrap();
        assert_eq!(app.selected, 0);
    }

    #[test]
    fn test_bare_goto_keeps_the_selection() {
        let tmp = TempDir::new().unwrap();
        let mut app = app_in(&tmp);
        app.list.add(Task::new("Alpha"));
        app.list.add(Task::new("Beta"));
        // move to row 2, then a bare `g` must not jump anywhere
        let mut term = scripted(&["g2", "g", "t", "q"]);
        app.run(&mut term).unwrap();
        assert!(app.list.task(1).unwrap().done);
        assert!(!app.list.task(0).unwrap().done);
    }

    #[test]
    fn test_failed_save_aborts_the_session() {
        let tmp = TempDir::new().unwrap();
        // parent directory does not exist, so every save fails
        let mut app = App::load(tmp.path().join("no-such-dir").join("todos.md")).unwrap();
        let mut term = scripted(&["+ Doomed", "b", "q"]);
        assert!(app.run(&mut term).is_err());
    }

    #[test]
    fn test_toggle_search_hits_every_match() {
        let tmp = TempDir::new().unwrap();
        let mut app = app_in(&tmp);
        app.list.add(Task::new("Demo A"));
        app.list.add(Task::new("Demo B"));
        app.list.add(Task::new("Other"));

        let mut term = scripted(&["t demo", "q"]);
        app.run(&mut term).unwrap();
        assert!(app.list.task(0).unwrap().done);
        assert!(app.list.task(1).unwrap().done);
        assert!(!app.list.task(2).unwrap().done);
    }

    #[test]
    fn test_date_filter_narrows_the_view() {
        let tmp = TempDir::new().unwrap();
        let mut app = app_in(&tmp);
        app.list
            .add(Task::with_details("On date", "", Some(date(2026, 5, 5))));
        app.list
            .add(Task::with_details("Off date", "", Some(date(2026, 6, 6))));

        let mut term = scripted(&["/2026-05-05", "t", "q"]);
        app.run(&mut term).unwrap();
        assert!(app.list.task(0).unwrap().done);
        assert!(!app.list.task(1).unwrap().done);
        assert_eq!(app.date_filter, Some(date(2026, 5, 5)));

        let mut term = scripted(&["/", "q"]);
        app.run(&mut term).unwrap();
        assert_eq!(app.date_filter, None);
    }

    #[test]
    fn test_default_subcommand_clears_the_filter() {
        let tmp = TempDir::new().unwrap();
        let mut app = app_in(&tmp);
        app.date_filter = Some(date(2026, 5, 5));
        let mut term = scripted(&["/default", "q"]);
        app.run(&mut term).unwrap();
        assert_eq!(app.date_filter, None);
        assert_eq!(app.selected, 0);
    }

    #[test]
    fn test_calendar_list_applies_filter() {
        let tmp = TempDir::new().unwrap();
        let mut app = app_in(&tmp);
        app.date_filter = Some(date(2026, 12, 15));
        // inside the calendar: next month, then list that date
        let mut term = scripted(&["/calendar", "m+1", "l", "q"]);
        app.run(&mut term).unwrap();
        assert_eq!(app.date_filter, Some(date(2027, 1, 15)));
        assert_eq!(app.selected, 0);
    }

    #[test]
    fn test_edit_through_menu_persists() {
        let tmp = TempDir::new().unwrap();
        let mut app = app_in(&tmp);
        app.list.add(Task::new("Old title"));

        // edit selected: edit title, type new one, back out of the editor
        let mut term = scripted(&["e", "e", "New title", "b", "q"]);
        app.run(&mut term).unwrap();
        assert_eq!(app.list.task(0).unwrap().title, "New title");

        let reloaded = app_in(&tmp);
        assert_eq!(reloaded.list.task(0).unwrap().title, "New title");
    }

    #[test]
    fn test_selection_clamps_after_removal() {
        let tmp = TempDir::new().unwrap();
        let mut app = app_in(&tmp);
        app.list.add(Task::new("A"));
        app.list.add(Task::new("B"));
        app.selected = 1;
        let mut term = scripted(&["- b", "q"]);
        app.run(&mut term).unwrap();
        assert_eq!(app.selected, 0);
    }

    #[test]
    fn test_seed_demo_adds_eight_tasks() {
        let tmp = TempDir::new().unwrap();
        let mut app = app_in(&tmp);
        app.seed_demo();
        assert_eq!(app.list.len(), 8);
        assert!(app.list.task(6).unwrap().deadline.is_none());
    }

    #[test]
    fn test_glyph_and_color_switches() {
        let tmp = TempDir::new().unwrap();
        let mut app = app_in(&tmp);
        let mut term = scripted(&["/ascii", "/no-colors", "q"]);
        app.run(&mut term).unwrap();
        assert!(term.config.ascii);
        assert!(!term.config.colors);

        let mut term = Term::scripted(
            &["/unicode", "/colors", "q"],
            RenderConfig {
                ascii: true,
                colors: false,
            },
        );
        app.run(&mut term).unwrap();
        assert!(!term.config.ascii);
        assert!(term.config.colors);
    }

    #[test]
    fn test_unknown_command_is_inline_error() {
        let tmp = TempDir::new().unwrap();
        let mut app = app_in(&tmp);
        let mut term = scripted(&["zzz", "q"]);
        app.run(&mut term).unwrap();
        assert!(app.list.is_empty());
    }
}
