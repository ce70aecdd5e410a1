use crate::game::{Board, BoardEvent, GameEvent, GameOverEvent, Owner, Side, COLS, FIRST_MOVE};
use crate::runner::{MatchCommand, MatchHandle, MatchUpdate};
use crate::sync::{GameState, SyncPhase};
use crossterm::event::{self, Event, KeyCode, KeyEvent};
use ratatui::{backend::Backend, Terminal};
use std::io;

pub struct App {
    handle: MatchHandle,
    state: GameState,
    selected_column: usize,
    should_quit: bool,
    waiting: bool,
    failed: bool,
    message: Option<String>,
}

impl App {
    pub fn new(handle: MatchHandle) -> Self {
        let waiting = handle.info().local == Some(Side::PlayerTwo);
        App {
            handle,
            state: GameState::initial(Side::PlayerOne),
            selected_column: COLS / 2, // Start in middle
            should_quit: false,
            waiting,
            failed: false,
            message: None,
        }
    }

    /// Main application loop
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            self.apply_updates();
            terminal.draw(|f| self.render(f))?;

            if self.should_quit {
                break;
            }

            self.handle_events()?;
        }
        Ok(())
    }

    /// Hand the match back for shutdown
    pub fn into_handle(self) -> MatchHandle {
        self.handle
    }

    /// Fold everything the match worker published into the local mirror
    fn apply_updates(&mut self) {
        for update in self.handle.drain() {
            match update {
                MatchUpdate::State(state) => self.state = state,
                MatchUpdate::Event(event) => self.apply_event(event),
                MatchUpdate::Rejected(column) => {
                    self.message = Some(if self.state.board.is_column_full(column) {
                        "Column is full!".to_string()
                    } else {
                        "Not your turn!".to_string()
                    });
                }
                MatchUpdate::Failed(reason) => {
                    self.failed = true;
                    self.waiting = false;
                    self.message = Some(format!("Connection lost: {reason}. Press 'q' to quit."));
                }
            }
        }
    }

    fn apply_event(&mut self, event: GameEvent) {
        match &event {
            GameEvent::Board(BoardEvent::Placed { side, column, row, .. }) => {
                self.state.board.place(*column, *row, *side);
                self.state.player_ones_turn = *side == Side::PlayerTwo;
                self.state.move_counter += 1;
            }
            GameEvent::Board(BoardEvent::Synced(state)) => self.state = *state,
            GameEvent::Board(BoardEvent::Reset) => {
                // Side on turn arrives with the next full state
                self.state.board = Board::new();
                self.state.winner = Owner::None;
                self.state.move_counter = FIRST_MOVE;
            }
            GameEvent::GameOver(over) => {
                self.message = Some(match over {
                    GameOverEvent::Win { player, .. } => {
                        format!("{player} wins! Press 'r' for a rematch.")
                    }
                    GameOverEvent::Draw => "It's a draw! Press 'r' for a rematch.".to_string(),
                });
                return;
            }
            GameEvent::Phase(phase) => {
                self.waiting = matches!(phase, SyncPhase::WaitingForPeer | SyncPhase::SendingState);
                return;
            }
        }
        if !self.state.is_decided() {
            self.message = Some(event.describe());
        }
    }

    /// Handle keyboard events
    fn handle_events(&mut self) -> io::Result<()> {
        if event::poll(std::time::Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                self.handle_key(key);
            }
        }
        Ok(())
    }

    /// Handle key press
    fn handle_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Left => {
                if self.selected_column > 0 {
                    self.selected_column -= 1;
                }
            }
            KeyCode::Right => {
                if self.selected_column < COLS - 1 {
                    self.selected_column += 1;
                }
            }
            KeyCode::Enter | KeyCode::Char(' ') => {
                self.drop_piece();
            }
            KeyCode::Char('r') => {
                if self.state.is_decided() && !self.failed {
                    self.handle.send(MatchCommand::Rematch);
                    self.selected_column = COLS / 2;
                    self.message = Some("New game started!".to_string());
                }
            }
            _ => {}
        }
    }

    /// Drop piece in selected column
    fn drop_piece(&mut self) {
        if self.failed {
            return;
        }
        if self.state.is_decided() {
            self.message = Some("Game over! Press 'r' for a rematch.".to_string());
            return;
        }
        if self.waiting {
            self.message = Some("Waiting for the other player...".to_string());
            return;
        }
        self.handle.send(MatchCommand::Drop(self.selected_column));
    }

    /// Render the UI
    fn render(&self, frame: &mut ratatui::Frame) {
        super::game_view::render(
            frame,
            &self.state,
            self.handle.info(),
            self.selected_column,
            self.waiting,
            &self.message,
        );
    }
}
