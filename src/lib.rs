//! # Peer Connect Four
//!
//! A Connect Four engine whose matches can be mirrored between two instances
//! by exchanging whole-game snapshots after every move, with a terminal UI
//! built with Ratatui.
//!
//! ## Modules
//!
//! - [`game`] — Core game logic: board, four-in-a-row scan, turn controller
//! - [`sync`] — Channels (in-memory, TCP), snapshot codec, synchronizer
//! - [`runner`] — Worker thread hosting a match for a front-end
//! - [`ui`] — Terminal UI: game view
//! - [`config`] — TOML configuration loading and validation
//! - [`logging`] — `tracing` subscriber setup
//! - [`error`] — Structured error types

pub mod config;
pub mod error;
pub mod game;
pub mod logging;
pub mod runner;
pub mod sync;
pub mod ui;
