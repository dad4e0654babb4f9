pub mod app;
pub mod calendar;
pub mod command;
pub mod editor;
pub mod term;

pub use app::App;
pub use term::{RenderConfig, Term};
