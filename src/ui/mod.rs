//! Terminal UI: a single game view over a running match.

mod app;
mod game_view;

pub use app::App;
