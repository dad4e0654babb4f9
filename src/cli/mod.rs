pub mod commands;

pub use commands::{Cli, resolve_store_path};
