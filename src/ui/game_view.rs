use crate::game::{Board, Owner, Side, COLS, ROWS};
use crate::runner::MatchInfo;
use crate::sync::GameState;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

pub fn render(
    frame: &mut Frame,
    state: &GameState,
    info: &MatchInfo,
    selected_column: usize,
    waiting: bool,
    message: &Option<String>,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(11),   // Board
            Constraint::Length(3), // Message
            Constraint::Length(3), // Controls
        ])
        .split(frame.area());

    render_header(frame, state, info, waiting, chunks[0]);
    render_board(frame, &state.board, selected_column, chunks[1]);
    render_message(frame, message, chunks[2]);
    render_controls(frame, chunks[3]);
}

fn side_color(side: Side) -> Color {
    match side {
        Side::PlayerOne => Color::Red,
        Side::PlayerTwo => Color::Yellow,
    }
}

fn render_header(frame: &mut Frame, state: &GameState, info: &MatchInfo, waiting: bool, area: Rect) {
    let current = state.active_side();
    let mode = match info.local {
        Some(side) => format!("You: {} ({})", info.name(side), side.label()),
        None => "Hotseat".to_string(),
    };

    let status = if state.is_decided() {
        format!("Game Over  |  {mode}")
    } else if waiting {
        format!("Waiting for {}...  |  {mode}", info.name(current))
    } else {
        format!("Current Player: {}  |  {mode}", info.name(current))
    };

    let header = Paragraph::new(status)
        .style(Style::default().fg(side_color(current)).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title("Connect Four"));

    frame.render_widget(header, area);
}

fn render_board(frame: &mut Frame, board: &Board, selected_column: usize, area: Rect) {
    let mut lines = Vec::new();

    // Column numbers with selection indicator
    let mut col_line = vec![Span::raw("   ")]; // Padding (3 chars to match "  ║")
    for column in 0..COLS {
        if column == selected_column {
            col_line.push(Span::styled(
                format!(" {} ", column + 1),
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
            ));
        } else {
            col_line.push(Span::raw(format!(" {} ", column + 1)));
        }
    }
    col_line.push(Span::raw("  "));
    lines.push(Line::from(col_line));

    lines.push(Line::from("  ╔═════════════════════╗"));

    // Row 0 is the bottom of the board, so draw from the top row down
    for row in (0..ROWS).rev() {
        let mut row_spans = vec![Span::raw("  ║")];
        for column in 0..COLS {
            let (symbol, color) = match board.get(column, row) {
                Owner::None => (" . ", Color::DarkGray),
                Owner::PlayerOne => (" ● ", side_color(Side::PlayerOne)),
                Owner::PlayerTwo => (" ● ", side_color(Side::PlayerTwo)),
            };
            row_spans.push(Span::styled(symbol, Style::default().fg(color)));
        }
        row_spans.push(Span::raw("║"));
        lines.push(Line::from(row_spans));
    }

    lines.push(Line::from("  ╚═════════════════════╝"));

    let board_widget = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(board_widget, area);
}

fn render_message(frame: &mut Frame, message: &Option<String>, area: Rect) {
    let text = message.as_deref().unwrap_or("");
    let msg_widget = Paragraph::new(text)
        .style(Style::default().fg(Color::Yellow))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));

    frame.render_widget(msg_widget, area);
}

fn render_controls(frame: &mut Frame, area: Rect) {
    let controls = Paragraph::new("←/→: Move  |  Enter: Drop  |  R: Rematch  |  Q: Quit")
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title("Controls"));

    frame.render_widget(controls, area);
}
