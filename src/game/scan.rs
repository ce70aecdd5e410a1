//! Four-in-a-row detection by scanning the whole board.
//!
//! Every cell is tried as the start of a run in each direction, which is
//! cheap at 7x6 and keeps the detector independent of where the last token
//! landed.

use super::{Board, Owner, Side, COLS, ROWS};

/// Tokens in a row needed to win
pub const CONNECT: usize = 4;

/// Step vector of a run, as `(column delta, row delta)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Horizontal,
    Diagonal,
    Vertical,
    AntiDiagonal,
}

impl Direction {
    /// Scan order. The first hit wins, so fixtures depend on this order.
    pub const ALL: [Direction; 4] = [
        Direction::Horizontal,
        Direction::Diagonal,
        Direction::Vertical,
        Direction::AntiDiagonal,
    ];

    pub fn delta(self) -> (isize, isize) {
        match self {
            Direction::Horizontal => (1, 0),
            Direction::Diagonal => (1, 1),
            Direction::Vertical => (0, 1),
            Direction::AntiDiagonal => (-1, 1),
        }
    }
}

/// A winning run: where it starts and which way it goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FourInRow {
    pub side: Side,
    pub start: (usize, usize),
    pub direction: Direction,
}

/// Find the first run of [`CONNECT`] tokens owned by `side`.
pub fn find_four(board: &Board, side: Side) -> Option<FourInRow> {
    for direction in Direction::ALL {
        for row in 0..ROWS {
            for column in 0..COLS {
                if run_length(board, side, column, row, direction) == CONNECT {
                    return Some(FourInRow {
                        side,
                        start: (column, row),
                        direction,
                    });
                }
            }
        }
    }
    None
}

/// Length of the run of `side` tokens starting at `(column, row)`, capped at
/// [`CONNECT`].
pub fn run_length(board: &Board, side: Side, column: usize, row: usize, direction: Direction) -> usize {
    let owner = Owner::from(side);
    let (dc, dr) = direction.delta();
    let (mut c, mut r) = (column as isize, row as isize);
    let mut count = 0;

    while count < CONNECT && owned_by(board, owner, c, r) {
        count += 1;
        c += dc;
        r += dr;
    }
    count
}

fn owned_by(board: &Board, owner: Owner, column: isize, row: isize) -> bool {
    if column < 0 || row < 0 {
        return false;
    }
    board.try_get(column as usize, row as usize) == Some(owner)
}
