//! Ratatui front-end for the parent administration mode. It only drives the
//! library through [`crate::MusicBox`]; rendering state lives here and nothing
//! below this module knows about the terminal.

mod app;
mod forms;
mod helpers;
mod screens;
mod terminal;

pub use app::App;
pub use terminal::run_app;
