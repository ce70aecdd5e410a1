use std::sync::mpsc::Sender;

use super::Side;
use crate::sync::{GameState, SyncPhase};

/// Something changed on the board.
#[derive(Debug, Clone, PartialEq)]
pub enum BoardEvent {
    /// A token was dropped locally.
    Placed {
        player: String,
        side: Side,
        column: usize,
        row: usize,
    },
    /// The board was cleared for a rematch.
    Reset,
    /// A snapshot from the peer replaced local state.
    Synced(GameState),
}

/// How a match ended. Emitted once per match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameOverEvent {
    Win { player: String, side: Side },
    Draw,
}

/// Notification published by a [`Game`](super::Game).
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    Board(BoardEvent),
    GameOver(GameOverEvent),
    /// A networked game moved through its turn cycle.
    Phase(SyncPhase),
}

impl GameEvent {
    /// Human-readable line for status bars and logs
    pub fn describe(&self) -> String {
        match self {
            GameEvent::Board(BoardEvent::Placed { player, column, .. }) => {
                format!("{player} placed a token in column {}.", column + 1)
            }
            GameEvent::Board(BoardEvent::Reset) => "New game.".to_string(),
            GameEvent::Board(BoardEvent::Synced(_)) => "Received game state.".to_string(),
            GameEvent::GameOver(GameOverEvent::Win { player, .. }) => format!("{player} wins!"),
            GameEvent::GameOver(GameOverEvent::Draw) => "It's a draw!".to_string(),
            GameEvent::Phase(SyncPhase::WaitingForPeer) => "Waiting for the other player...".to_string(),
            GameEvent::Phase(SyncPhase::LocalTurn) => "Your turn.".to_string(),
            GameEvent::Phase(SyncPhase::SendingState) => "Sending move...".to_string(),
            GameEvent::Phase(SyncPhase::GameOver) => "Game over.".to_string(),
        }
    }
}

/// Receiver of [`GameEvent`]s. Publishing never fails the game: a consumer
/// that went away simply stops hearing about it.
pub trait EventSink: Send {
    fn publish(&self, event: GameEvent);
}

impl EventSink for Sender<GameEvent> {
    fn publish(&self, event: GameEvent) {
        let _ = self.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_placed() {
        let event = GameEvent::Board(BoardEvent::Placed {
            player: "alice".into(),
            side: Side::PlayerOne,
            column: 2,
            row: 0,
        });
        assert_eq!(event.describe(), "alice placed a token in column 3.");
    }

    #[test]
    fn test_describe_game_over() {
        let win = GameEvent::GameOver(GameOverEvent::Win {
            player: "bob".into(),
            side: Side::PlayerTwo,
        });
        assert_eq!(win.describe(), "bob wins!");
        assert_eq!(GameEvent::GameOver(GameOverEvent::Draw).describe(), "It's a draw!");
    }

    #[test]
    fn test_sender_sink_ignores_dropped_receiver() {
        let (tx, rx) = std::sync::mpsc::channel::<GameEvent>();
        tx.publish(GameEvent::Board(BoardEvent::Reset));
        assert_eq!(rx.try_recv().unwrap(), GameEvent::Board(BoardEvent::Reset));

        drop(rx);
        tx.publish(GameEvent::Board(BoardEvent::Reset));
    }
}
