use serde::{Deserialize, Serialize};

use crate::error::SnapshotError;
use crate::game::{find_four, Board, Owner, Side, DRAW_THRESHOLD, FIRST_MOVE};

/// Everything a peer needs to take over the match: turn, board, winner and
/// move counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    pub player_ones_turn: bool,
    pub board: Board,
    pub winner: Owner,
    pub move_counter: u8,
}

impl GameState {
    /// Snapshot of a fresh match with `first` to move
    pub fn initial(first: Side) -> Self {
        GameState {
            player_ones_turn: first == Side::PlayerOne,
            board: Board::new(),
            winner: Owner::None,
            move_counter: FIRST_MOVE,
        }
    }

    pub fn active_side(&self) -> Side {
        if self.player_ones_turn {
            Side::PlayerOne
        } else {
            Side::PlayerTwo
        }
    }

    /// True once the snapshot records a winner or a full board
    pub fn is_decided(&self) -> bool {
        !self.winner.is_none() || self.move_counter == DRAW_THRESHOLD
    }

    /// Check that the snapshot could have come out of a legal match.
    ///
    /// Grid dimensions are already enforced by decoding into [`Board`].
    pub fn validate(&self) -> Result<(), SnapshotError> {
        let malformed = |reason: String| Err(SnapshotError::Malformed(reason));

        if !(FIRST_MOVE..=DRAW_THRESHOLD).contains(&self.move_counter) {
            return malformed(format!("move counter {} out of range", self.move_counter));
        }

        let tokens = self.board.token_count();
        if tokens != usize::from(self.move_counter - FIRST_MOVE) {
            return malformed(format!(
                "{tokens} tokens on the board but move counter is {}",
                self.move_counter
            ));
        }

        if !self.board.respects_gravity() {
            return malformed("token floating above an empty slot".to_string());
        }

        let ones = self.board.count_for(Side::PlayerOne);
        let twos = self.board.count_for(Side::PlayerTwo);
        let expected_turn = match ones.cmp(&twos) {
            std::cmp::Ordering::Greater if ones - twos == 1 => Some(Side::PlayerTwo),
            std::cmp::Ordering::Less if twos - ones == 1 => Some(Side::PlayerOne),
            std::cmp::Ordering::Equal => None,
            _ => return malformed(format!("token counts {ones} and {twos} are unbalanced")),
        };
        if let Some(turn) = expected_turn {
            if turn != self.active_side() {
                return malformed(format!("{} cannot be on turn", self.active_side().label()));
            }
        }

        match self.winner.side() {
            Some(winner) => {
                if find_four(&self.board, winner).is_none() {
                    return malformed(format!("{} has no four in a row", winner.label()));
                }
                if winner == self.active_side() {
                    return malformed("winner is still on turn".to_string());
                }
            }
            None => {
                if let Some(four) = [Side::PlayerOne, Side::PlayerTwo]
                    .into_iter()
                    .find_map(|side| find_four(&self.board, side))
                {
                    return malformed(format!(
                        "{} has four in a row but no winner is set",
                        four.side.label()
                    ));
                }
            }
        }

        Ok(())
    }
}

/// Whether incoming snapshots are checked before they replace local state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapshotPolicy {
    /// Apply whatever the peer sends.
    #[default]
    Trusting,
    /// Reject snapshots that fail [`GameState::validate`].
    Strict,
}

/// Turns snapshots into channel payloads and back.
pub trait SnapshotCodec: Send {
    fn encode(&self, state: &GameState) -> Result<Vec<u8>, SnapshotError>;
    fn decode(&self, payload: &[u8]) -> Result<GameState, SnapshotError>;
}

/// JSON encoding via `serde_json`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl SnapshotCodec for JsonCodec {
    fn encode(&self, state: &GameState) -> Result<Vec<u8>, SnapshotError> {
        serde_json::to_vec(state).map_err(SnapshotError::Encode)
    }

    fn decode(&self, payload: &[u8]) -> Result<GameState, SnapshotError> {
        serde_json::from_slice(payload).map_err(SnapshotError::Decode)
    }
}
