use std::path::{Path, PathBuf};

use clap::Parser;

#[derive(Parser)]
#[command(name = "td", about = concat!("[>] td v", env!("CARGO_PKG_VERSION"), " - your todos are plain text"), version)]
pub struct Cli {
    /// Draw with plain ASCII instead of box-drawing characters
    #[arg(short = 'a', long)]
    pub ascii: bool,

    /// Seed the list with demo tasks
    #[arg(short = 'd', long)]
    pub demo: bool,

    /// Disable colored output
    #[arg(long = "no-colors")]
    pub no_colors: bool,

    /// The todo file to open (default: ~/todos.md)
    pub file: Vec<String>,
}

/// Pick the store file from the positional arguments.
///
/// Naming two or more existing files is ambiguous and fails. A single
/// argument is used even when the file does not exist yet (it is created on
/// first save). With no argument the store lives in the home directory.
pub fn resolve_store_path(args: &[String]) -> Result<PathBuf, String> {
    let existing: Vec<&String> = args.iter().filter(|a| Path::new(a).exists()).collect();
    if existing.len() >= 2 {
        return Err(format!(
            "only one todo file may be given (found {})",
            existing
                .iter()
                .map(|s| s.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        ));
    }
    if let Some(found) = existing.first() {
        return Ok(PathBuf::from(found));
    }
    if let Some(first) = args.first() {
        return Ok(PathBuf::from(first));
    }
    dirs::home_dir()
        .map(|home| home.join("todos.md"))
        .ok_or_else(|| "could not determine the home directory".to_string())
}
