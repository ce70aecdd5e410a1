use tracing::{debug, info};

use super::{find_four, Board, BoardEvent, EventSink, GameEvent, GameOverEvent, Owner, Player, Side, CELLS};
use crate::error::SyncError;
use crate::sync::{CancelToken, GameState, SyncPhase, Synchronizer};

/// Value of the move counter before the first token.
pub const FIRST_MOVE: u8 = 1;

/// Move counter once every slot is filled.
pub const DRAW_THRESHOLD: u8 = CELLS as u8 + FIRST_MOVE;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOutcome {
    Winner(Side),
    Draw,
}

/// One match between two players, optionally mirrored with a peer.
pub struct Game {
    board: Board,
    players: [Player; 2],
    active: Side,
    move_counter: u8,
    winner: Owner,
    instance_id: Owner,
    sync: Option<Synchronizer>,
    phase: Option<SyncPhase>,
    events: Option<Box<dyn EventSink>>,
}

impl Game {
    /// Hotseat match: both sides move through this instance, PlayerOne first.
    pub fn new(player_one: impl Into<String>, player_two: impl Into<String>) -> Self {
        Game {
            board: Board::new(),
            players: [
                Player::new(player_one, Side::PlayerOne),
                Player::new(player_two, Side::PlayerTwo),
            ],
            active: Side::PlayerOne,
            move_counter: FIRST_MOVE,
            winner: Owner::None,
            instance_id: Owner::None,
            sync: None,
            phase: None,
            events: None,
        }
    }

    /// Networked match where this instance plays `local` and the peer plays
    /// the other side.
    pub fn networked(
        player_one: impl Into<String>,
        player_two: impl Into<String>,
        local: Side,
        sync: Synchronizer,
    ) -> Self {
        let mut game = Self::new(player_one, player_two);
        game.instance_id = local.into();
        game.sync = Some(sync);
        game.phase = Some(if local == game.active {
            SyncPhase::LocalTurn
        } else {
            SyncPhase::WaitingForPeer
        });
        game
    }

    /// Publish notifications to `sink`
    pub fn with_events(mut self, sink: impl EventSink + 'static) -> Self {
        self.events = Some(Box::new(sink));
        self
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn active_side(&self) -> Side {
        self.active
    }

    pub fn active_player(&self) -> &Player {
        self.player(self.active)
    }

    pub fn player(&self, side: Side) -> &Player {
        match side {
            Side::PlayerOne => &self.players[0],
            Side::PlayerTwo => &self.players[1],
        }
    }

    pub fn move_counter(&self) -> u8 {
        self.move_counter
    }

    pub fn winner(&self) -> Owner {
        self.winner
    }

    /// Side this instance plays when networked, `Owner::None` for hotseat
    pub fn instance_id(&self) -> Owner {
        self.instance_id
    }

    pub fn is_networked(&self) -> bool {
        self.sync.is_some()
    }

    /// Turn-cycle position of a networked game
    pub fn phase(&self) -> Option<SyncPhase> {
        self.phase
    }

    /// Token that aborts a pending receive, when networked
    pub fn cancel_token(&self) -> Option<CancelToken> {
        self.sync.as_ref().map(Synchronizer::cancel_token)
    }

    pub fn outcome(&self) -> Option<GameOutcome> {
        match self.winner.side() {
            Some(side) => Some(GameOutcome::Winner(side)),
            None if self.move_counter == DRAW_THRESHOLD => Some(GameOutcome::Draw),
            None => None,
        }
    }

    pub fn is_over(&self) -> bool {
        self.outcome().is_some()
    }

    /// True when a column chosen here may be played now
    pub fn is_local_turn(&self) -> bool {
        match self.instance_id.side() {
            Some(local) => local == self.active,
            None => true,
        }
    }

    /// Snapshot of the current state as exchanged with the peer
    pub fn snapshot(&self) -> GameState {
        GameState {
            player_ones_turn: self.active == Side::PlayerOne,
            board: self.board,
            winner: self.winner,
            move_counter: self.move_counter,
        }
    }

    /// Drop a token for the active player into `column`.
    ///
    /// Returns `Ok(false)` without touching anything when the column is out of
    /// range or full, the match is over, or the peer is on turn. When
    /// networked, the new state is pushed and, unless the match just ended,
    /// the peer's reply is awaited before returning.
    pub fn make_move(&mut self, column: usize) -> Result<bool, SyncError> {
        if self.is_over() || !self.is_local_turn() {
            debug!(column, "move refused: not this instance's turn");
            return Ok(false);
        }
        let Some(row) = self.board.landing_row(column) else {
            debug!(column, "move refused: illegal column");
            return Ok(false);
        };

        let side = self.active;
        self.board.place(column, row, side);
        self.emit(GameEvent::Board(BoardEvent::Placed {
            player: self.player(side).name().to_string(),
            side,
            column,
            row,
        }));

        if let Some(four) = find_four(&self.board, side) {
            info!(side = side.label(), start = ?four.start, direction = ?four.direction, "four in a row");
            self.winner = side.into();
        }

        self.move_counter = self.move_counter.saturating_add(1);
        self.active = side.other();

        if let Some(outcome) = self.outcome() {
            self.announce(outcome);
        }

        self.synchronize()?;
        Ok(true)
    }

    /// Clear the board for a rematch. The loser of a decided match starts;
    /// after a draw the side on turn is kept.
    pub fn setup_new_game(&mut self) {
        self.board = Board::new();
        self.move_counter = FIRST_MOVE;
        if let Some(winner) = self.winner.side() {
            self.active = winner.other();
            self.winner = Owner::None;
        }
        info!(first = self.active.label(), "new game");
        self.emit(GameEvent::Board(BoardEvent::Reset));
        if self.is_networked() {
            self.set_phase(if self.is_local_turn() {
                SyncPhase::LocalTurn
            } else {
                SyncPhase::WaitingForPeer
            });
        }
    }

    /// Begin a networked match: when the peer moves first, wait for its
    /// snapshot before any local move is allowed.
    pub fn start(&mut self) -> Result<(), SyncError> {
        if !self.is_networked() || self.is_over() {
            return Ok(());
        }
        if self.is_local_turn() {
            self.set_phase(SyncPhase::LocalTurn);
            return Ok(());
        }
        self.receive_state()
    }

    fn synchronize(&mut self) -> Result<(), SyncError> {
        if !self.is_networked() {
            return Ok(());
        }

        self.set_phase(SyncPhase::SendingState);
        let snapshot = self.snapshot();
        if let Some(sync) = self.sync.as_mut() {
            sync.push(&snapshot)?;
        }

        if self.is_over() {
            self.set_phase(SyncPhase::GameOver);
            return Ok(());
        }
        self.receive_state()
    }

    fn receive_state(&mut self) -> Result<(), SyncError> {
        self.set_phase(SyncPhase::WaitingForPeer);
        let Some(sync) = self.sync.as_mut() else {
            return Ok(());
        };
        let state = sync.pull()?;
        self.apply_snapshot(state);
        Ok(())
    }

    /// Replace local state with the peer's snapshot, verbatim.
    fn apply_snapshot(&mut self, state: GameState) {
        self.board = state.board;
        self.active = state.active_side();
        self.winner = state.winner;
        self.move_counter = state.move_counter;
        self.emit(GameEvent::Board(BoardEvent::Synced(state)));

        if let Some(outcome) = self.outcome() {
            self.announce(outcome);
            self.set_phase(SyncPhase::GameOver);
        } else if self.is_local_turn() {
            self.set_phase(SyncPhase::LocalTurn);
        } else {
            self.set_phase(SyncPhase::WaitingForPeer);
        }
    }

    fn announce(&self, outcome: GameOutcome) {
        let event = match outcome {
            GameOutcome::Winner(side) => {
                let player = self.player(side).name().to_string();
                info!(%player, "game over: win");
                GameOverEvent::Win { player, side }
            }
            GameOutcome::Draw => {
                info!("game over: draw");
                GameOverEvent::Draw
            }
        };
        self.emit(GameEvent::GameOver(event));
    }

    fn set_phase(&mut self, phase: SyncPhase) {
        if self.phase != Some(phase) {
            debug!(?phase, "sync phase");
            self.phase = Some(phase);
            self.emit(GameEvent::Phase(phase));
        }
    }

    fn emit(&self, event: GameEvent) {
        if let Some(sink) = &self.events {
            sink.publish(event);
        }
    }
}
