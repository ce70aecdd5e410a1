//! Hosts a [`Game`] on its own thread so a front-end can keep drawing while a
//! networked game waits on the peer.
//!
//! The front-end sends [`MatchCommand`]s and drains [`MatchUpdate`]s; it
//! never touches the game directly, so a move can never overlap a pending
//! receive.

use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

use tracing::{info, warn};

use crate::error::SyncError;
use crate::game::{EventSink, Game, GameEvent, Side};
use crate::sync::{CancelToken, GameState};

/// Requests from the front-end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchCommand {
    Drop(usize),
    Rematch,
    Quit,
}

/// Everything the front-end needs to mirror the match.
#[derive(Debug, Clone, PartialEq)]
pub enum MatchUpdate {
    /// Full state after the worker finished handling a command.
    State(GameState),
    Event(GameEvent),
    /// The column could not be played right now.
    Rejected(usize),
    /// The match ended with an error and the worker stopped.
    Failed(String),
}

impl EventSink for Sender<MatchUpdate> {
    fn publish(&self, event: GameEvent) {
        let _ = self.send(MatchUpdate::Event(event));
    }
}

/// Fixed facts about a running match.
#[derive(Debug, Clone)]
pub struct MatchInfo {
    pub names: [String; 2],
    /// Side played here; `None` for hotseat.
    pub local: Option<Side>,
}

impl MatchInfo {
    pub fn name(&self, side: Side) -> &str {
        match side {
            Side::PlayerOne => &self.names[0],
            Side::PlayerTwo => &self.names[1],
        }
    }
}

/// Front-end side of a running match.
pub struct MatchHandle {
    info: MatchInfo,
    commands: Sender<MatchCommand>,
    updates: Receiver<MatchUpdate>,
    cancel: Option<CancelToken>,
    worker: Option<JoinHandle<Result<(), SyncError>>>,
}

impl MatchHandle {
    pub fn info(&self) -> &MatchInfo {
        &self.info
    }

    pub fn send(&self, command: MatchCommand) {
        let _ = self.commands.send(command);
    }

    /// Updates published since the last call
    pub fn drain(&self) -> Vec<MatchUpdate> {
        self.updates.try_iter().collect()
    }

    /// Blocking receive, for callers without a render loop
    pub fn recv(&self) -> Option<MatchUpdate> {
        self.updates.recv().ok()
    }

    /// Stop the worker, aborting any pending receive, and wait for it.
    pub fn shutdown(mut self) -> Result<(), SyncError> {
        self.stop()
    }

    fn stop(&mut self) -> Result<(), SyncError> {
        if let Some(cancel) = &self.cancel {
            cancel.cancel();
        }
        let _ = self.commands.send(MatchCommand::Quit);

        match self.worker.take().map(JoinHandle::join) {
            Some(Ok(result)) => result,
            Some(Err(_)) => {
                warn!("match worker panicked");
                Ok(())
            }
            None => Ok(()),
        }
    }
}

impl Drop for MatchHandle {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}

/// Start `game` on a worker thread.
pub fn spawn_match(game: Game) -> io::Result<MatchHandle> {
    let (command_tx, command_rx) = mpsc::channel::<MatchCommand>();
    let (update_tx, update_rx) = mpsc::channel::<MatchUpdate>();

    let info = MatchInfo {
        names: [
            game.player(Side::PlayerOne).name().to_string(),
            game.player(Side::PlayerTwo).name().to_string(),
        ],
        local: game.instance_id().side(),
    };
    let cancel = game.cancel_token();
    let game = game.with_events(update_tx.clone());

    let worker = thread::Builder::new()
        .name("match".to_string())
        .spawn(move || {
            let result = run_match(game, command_rx, &update_tx);
            match &result {
                Ok(()) => info!("match worker finished"),
                Err(SyncError::Channel(crate::error::ChannelError::Cancelled)) => {
                    info!("match worker cancelled")
                }
                Err(err) => {
                    warn!(error = %err, "match ended with an error");
                    let _ = update_tx.send(MatchUpdate::Failed(err.to_string()));
                }
            }
            result
        })?;

    Ok(MatchHandle {
        info,
        commands: command_tx,
        updates: update_rx,
        cancel,
        worker: Some(worker),
    })
}

fn run_match(
    mut game: Game,
    commands: Receiver<MatchCommand>,
    updates: &Sender<MatchUpdate>,
) -> Result<(), SyncError> {
    let _ = updates.send(MatchUpdate::State(game.snapshot()));
    game.start()?;
    let _ = updates.send(MatchUpdate::State(game.snapshot()));

    for command in commands {
        match command {
            MatchCommand::Drop(column) => {
                if !game.make_move(column)? {
                    let _ = updates.send(MatchUpdate::Rejected(column));
                }
            }
            MatchCommand::Rematch => {
                if game.is_over() {
                    game.setup_new_game();
                    let _ = updates.send(MatchUpdate::State(game.snapshot()));
                    game.start()?;
                }
            }
            MatchCommand::Quit => break,
        }
        let _ = updates.send(MatchUpdate::State(game.snapshot()));
    }

    Ok(())
}
