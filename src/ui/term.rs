use std::io::{self, BufRead, BufReader, Cursor, Write};
use std::time::Duration;

use crossterm::QueueableCommand;
use crossterm::cursor::MoveTo;
use crossterm::style::{Color, Stylize};
use crossterm::terminal::{Clear, ClearType};

use crate::util::unicode::display_width;

/// Default view width in terminal cells.
pub const VIEW_WIDTH: usize = 80;

/// The glyphs the UI draws with. Two fixed sets: the Unicode default and an
/// ASCII fallback for terminals without box-drawing support.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlyphSet {
    pub check: char,
    pub rule: char,
    pub left_arrow: char,
    pub right_arrow: char,
    pub top_left: char,
    pub top_right: char,
    pub bottom_left: char,
    pub bottom_right: char,
    pub left_cross: char,
    pub right_cross: char,
    pub top_cross: char,
    pub bottom_cross: char,
    pub horizontal: char,
    pub vertical: char,
    pub cross: char,
    pub double_horizontal: char,
}

impl GlyphSet {
    pub const fn unicode() -> Self {
        GlyphSet {
            check: '✔',
            rule: '─',
            left_arrow: '▶',
            right_arrow: '◀',
            top_left: '┌',
            top_right: '┐',
            bottom_left: '└',
            bottom_right: '┘',
            left_cross: '├',
            right_cross: '┤',
            top_cross: '┬',
            bottom_cross: '┴',
            horizontal: '─',
            vertical: '│',
            cross: '┼',
            double_horizontal: '═',
        }
    }

    pub const fn ascii() -> Self {
        GlyphSet {
            check: 'X',
            rule: '_',
            left_arrow: '>',
            right_arrow: '<',
            top_left: '+',
            top_right: '+',
            bottom_left: '+',
            bottom_right: '+',
            left_cross: '+',
            right_cross: '+',
            top_cross: '+',
            bottom_cross: '+',
            horizontal: '-',
            vertical: '|',
            cross: '+',
            double_horizontal: '=',
        }
    }
}

/// Explicit rendering mode, owned by the terminal value rather than living
/// in ambient global state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderConfig {
    pub ascii: bool,
    pub colors: bool,
}

impl RenderConfig {
    pub fn glyphs(&self) -> GlyphSet {
        if self.ascii {
            GlyphSet::ascii()
        } else {
            GlyphSet::unicode()
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        RenderConfig {
            ascii: false,
            colors: true,
        }
    }
}

/// Horizontal alignment for table cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
    Right,
}

/// One cell of a bordered table row.
pub struct Cell {
    pub width: usize,
    pub text: String,
    pub align: Align,
    pub color: Option<Color>,
}

/// The exit / cancel sequence: a literal ctrl-X byte, or the spelled-out
/// `^X` for terminals that do not pass control characters through.
pub fn is_cancel(input: &str) -> bool {
    matches!(input.trim(), "\u{18}" | "^X" | "^x")
}

/// The terminal boundary. All rendering and line input goes through here;
/// nothing else in the crate touches the terminal.
///
/// Input and output are injected so the interactive state machines can be
/// driven by scripted input in tests.
pub struct Term {
    input: Box<dyn BufRead>,
    output: Box<dyn Write>,
    interactive: bool,
    pub config: RenderConfig,
}

impl Term {
    /// A terminal wired to stdin/stdout.
    pub fn stdio(config: RenderConfig) -> Self {
        Term {
            input: Box::new(BufReader::new(io::stdin())),
            output: Box::new(io::stdout()),
            interactive: true,
            config,
        }
    }

    /// A terminal fed from a fixed input script, discarding output. Screen
    /// clearing and pauses are disabled.
    pub fn scripted(lines: &[&str], config: RenderConfig) -> Self {
        let script = lines.join("\n");
        Term {
            input: Box::new(Cursor::new(script)),
            output: Box::new(io::sink()),
            interactive: false,
            config,
        }
    }

    /// Wrap `text` in color escape codes when colors are enabled.
    pub fn paint(&self, text: &str, color: Color) -> String {
        if self.config.colors {
            text.with(color).to_string()
        } else {
            text.to_string()
        }
    }

    /// Clear the screen and home the cursor.
    pub fn clear(&mut self) -> io::Result<()> {
        if self.interactive {
            self.output.queue(Clear(ClearType::All))?;
            self.output.queue(MoveTo(0, 0))?;
            self.output.flush()?;
        }
        Ok(())
    }

    /// Print a line verbatim.
    pub fn line(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.output, "{}", text)
    }

    /// Print `text` centered in `width` cells, optionally colored.
    pub fn centered(&mut self, text: &str, width: usize, color: Option<Color>) -> io::Result<()> {
        let w = display_width(text);
        let pad = if w < width { (width - w) / 2 } else { 0 };
        let body = match color {
            Some(c) => self.paint(text, c),
            None => text.to_string(),
        };
        writeln!(self.output, "{}{}", " ".repeat(pad), body)
    }

    /// Print a horizontal rule of `width` cells.
    pub fn rule(&mut self, width: usize) -> io::Result<()> {
        let g = self.config.glyphs();
        writeln!(self.output, "{}", g.rule.to_string().repeat(width))
    }

    /// Print a table border line: `left`, then `horizontal` runs joined by
    /// `junction`, then `right`.
    pub fn border_row(
        &mut self,
        widths: &[usize],
        left: char,
        horizontal: char,
        junction: char,
        right: char,
    ) -> io::Result<()> {
        let mut out = String::new();
        out.push(left);
        for (i, w) in widths.iter().enumerate() {
            if i > 0 {
                out.push(junction);
            }
            out.push_str(&horizontal.to_string().repeat(*w));
        }
        out.push(right);
        writeln!(self.output, "{}", out)
    }

    /// Print a row of bordered table cells separated by the vertical glyph.
    pub fn table_row(&mut self, cells: &[Cell]) -> io::Result<()> {
        let v = self.config.glyphs().vertical;
        let mut out = String::new();
        out.push(v);
        for (i, cell) in cells.iter().enumerate() {
            if i > 0 {
                out.push(v);
            }
            let body = align_cell(&cell.text, cell.width, cell.align);
            match cell.color {
                Some(c) => out.push_str(&self.paint(&body, c)),
                None => out.push_str(&body),
            }
        }
        out.push(v);
        writeln!(self.output, "{}", out)
    }

    /// Prompt for one line of input. Returns `None` at end of input.
    pub fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        write!(self.output, "{}", prompt)?;
        self.output.flush()?;
        let mut buf = String::new();
        let n = self.input.read_line(&mut buf)?;
        if n == 0 {
            return Ok(None);
        }
        Ok(Some(buf.trim().to_string()))
    }

    /// Block until the user acknowledges with Enter.
    pub fn pause(&mut self, message: &str) -> io::Result<()> {
        self.read_line(message)?;
        Ok(())
    }

    /// Short delay for transient notices. No-op for scripted terminals.
    pub fn sleep(&self, duration: Duration) {
        if self.interactive {
            std::thread::sleep(duration);
        }
    }
}

/// Fit `text` into exactly `width` cells with the given alignment.
fn align_cell(text: &str, width: usize, align: Align) -> String {
    let w = display_width(text);
    if w >= width {
        return crate::util::unicode::truncate_to_width(text, width);
    }
    let space = width - w;
    match align {
        Align::Left => format!("{}{}", text, " ".repeat(space)),
        Align::Right => format!("{}{}", " ".repeat(space), text),
        Align::Center => {
            let before = space / 2;
            format!(
                "{}{}{}",
                " ".repeat(before),
                text,
                " ".repeat(space - before)
            )
        }
    }
}
