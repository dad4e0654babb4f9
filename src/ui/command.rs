use crate::ui::term::is_cancel;

/// One parsed menu input line.
///
/// The first character selects the command; everything after it is the
/// argument. Parsing happens exactly once, here — the dispatch loop matches
/// on the variant and never looks at raw input again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `+[title]` — create a task (empty title falls back to the default)
    Add(String),
    /// `-[search]` — remove the resolved target set
    Remove(String),
    /// `d[search]` — show full detail of the resolved task
    Detail(String),
    /// `e[search]` — edit the resolved task
    Edit(String),
    /// `g<index|search>` — jump the selection
    Goto(String),
    /// `t<search>` — toggle every match
    Toggle(String),
    /// A sequence of `p`/`n`/`t` characters applied left-to-right
    Navigate(String),
    /// `?`
    Help,
    /// `/<subcommand>`
    Advanced(String),
    /// `q`, `b`, or the exit sequence
    Quit,
    /// Empty input
    Noop,
    /// Anything else, reported inline
    Unknown(String),
}

pub fn parse_command(input: &str) -> Command {
    let input = input.trim();
    if input.is_empty() {
        return Command::Noop;
    }
    if is_cancel(input) {
        return Command::Quit;
    }

    let head = input.chars().next().unwrap_or_default().to_ascii_lowercase();
    let rest = input[input.chars().next().map_or(0, |c| c.len_utf8())..]
        .trim()
        .to_string();

    match head {
        '+' => Command::Add(rest),
        '-' => Command::Remove(rest),
        'd' => Command::Detail(rest),
        'e' => Command::Edit(rest),
        'g' => Command::Goto(rest),
        '?' => Command::Help,
        '/' => Command::Advanced(rest),
        'q' => Command::Quit,
        'b' if rest.is_empty() => Command::Quit,
        't' if !rest.is_empty() && !is_nav_sequence(input) => Command::Toggle(rest),
        _ if is_nav_sequence(input) => Command::Navigate(input.to_lowercase()),
        _ => Command::Unknown(input.to_string()),
    }
}

/// True when the whole input is a run of navigation characters (`p`, `n`,
/// `t`), which the menu applies one at a time.
fn is_nav_sequence(input: &str) -> bool {
    !input.is_empty()
        && input
            .chars()
            .all(|c| matches!(c.to_ascii_lowercase(), 'p' | 'n' | 't'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_with_and_without_title() {
        assert_eq!(parse_command("+ Buy milk"), Command::Add("Buy milk".into()));
        assert_eq!(parse_command("+"), Command::Add(String::new()));
    }

    #[test]
    fn test_targeted_commands_carry_search() {
        assert_eq!(parse_command("- old"), Command::Remove("old".into()));
        assert_eq!(parse_command("d milk"), Command::Detail("milk".into()));
        assert_eq!(parse_command("e"), Command::Edit(String::new()));
        assert_eq!(parse_command("g 3"), Command::Goto("3".into()));
        assert_eq!(parse_command("t milk"), Command::Toggle("milk".into()));
    }

    #[test]
    fn test_case_insensitive_head() {
        assert_eq!(parse_command("D milk"), Command::Detail("milk".into()));
        assert_eq!(parse_command("Q"), Command::Quit);
    }

    #[test]
    fn test_navigation_sequences() {
        assert_eq!(parse_command("n"), Command::Navigate("n".into()));
        assert_eq!(parse_command("pp"), Command::Navigate("pp".into()));
        assert_eq!(parse_command("ntp"), Command::Navigate("ntp".into()));
        // bare `t` toggles the selected task via the navigation path
        assert_eq!(parse_command("t"), Command::Navigate("t".into()));
        // `tnt` is navigation, not a search for "nt"
        assert_eq!(parse_command("tnt"), Command::Navigate("tnt".into()));
    }

    #[test]
    fn test_quit_forms() {
        assert_eq!(parse_command("q"), Command::Quit);
        assert_eq!(parse_command("b"), Command::Quit);
        assert_eq!(parse_command("\u{18}"), Command::Quit);
        assert_eq!(parse_command("^X"), Command::Quit);
    }

    #[test]
    fn test_advanced_and_help() {
        assert_eq!(parse_command("/calendar"), Command::Advanced("calendar".into()));
        assert_eq!(parse_command("/2026-01-01"), Command::Advanced("2026-01-01".into()));
        assert_eq!(parse_command("/"), Command::Advanced(String::new()));
        assert_eq!(parse_command("?"), Command::Help);
    }

    #[test]
    fn test_empty_and_unknown() {
        assert_eq!(parse_command("  "), Command::Noop);
        assert_eq!(parse_command("zzz"), Command::Unknown("zzz".into()));
    }
}
