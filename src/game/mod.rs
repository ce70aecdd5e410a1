//! Core Connect Four game logic: board and gravity, four-in-a-row scanning,
//! players, notifications, and the turn controller.

mod board;
mod events;
mod player;
mod scan;
mod session;

pub use board::{Board, CELLS, COLS, ROWS};
pub use events::{BoardEvent, EventSink, GameEvent, GameOverEvent};
pub use player::{Owner, Player, Side};
pub use scan::{find_four, run_length, Direction, FourInRow, CONNECT};
pub use session::{Game, GameOutcome, DRAW_THRESHOLD, FIRST_MOVE};
