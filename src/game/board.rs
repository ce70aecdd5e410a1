use serde::{Deserialize, Serialize};

use super::{Owner, Side};

pub const ROWS: usize = 6;
pub const COLS: usize = 7;
pub const CELLS: usize = ROWS * COLS;

/// Fixed 7x6 grid addressed `(column, row)`, row 0 at the bottom.
///
/// Gravity is not a property of the type: the only writer that keeps it is
/// [`Board::place`] fed by [`Board::landing_row`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Board {
    slots: [[Owner; ROWS]; COLS],
}

impl Board {
    /// Create a new empty board
    pub fn new() -> Self {
        Board {
            slots: [[Owner::None; ROWS]; COLS],
        }
    }

    /// Get the slot at `(column, row)`, or `None` when out of range
    pub fn try_get(&self, column: usize, row: usize) -> Option<Owner> {
        self.slots.get(column)?.get(row).copied()
    }

    /// Get the slot at `(column, row)`.
    ///
    /// Panics when out of range; callers validate coordinates first.
    pub fn get(&self, column: usize, row: usize) -> Owner {
        self.slots[column][row]
    }

    /// Overwrite a single slot. Used by snapshot fixtures and the placer.
    pub fn set(&mut self, column: usize, row: usize, owner: Owner) {
        self.slots[column][row] = owner;
    }

    /// Row a token dropped into `column` would settle in, or `None` when the
    /// column is out of range or full
    pub fn landing_row(&self, column: usize) -> Option<usize> {
        let slots = self.slots.get(column)?;
        slots.iter().position(|owner| owner.is_none())
    }

    /// Write `side`'s token at `(column, row)` without any checks
    pub fn place(&mut self, column: usize, row: usize, side: Side) {
        self.set(column, row, side.into());
    }

    /// Check if a column is full (out-of-range columns count as full)
    pub fn is_column_full(&self, column: usize) -> bool {
        self.landing_row(column).is_none()
    }

    /// Check if the board is completely full
    pub fn is_full(&self) -> bool {
        (0..COLS).all(|column| self.is_column_full(column))
    }

    /// Number of occupied slots
    pub fn token_count(&self) -> usize {
        self.slots
            .iter()
            .flatten()
            .filter(|owner| !owner.is_none())
            .count()
    }

    /// Number of slots held by `side`
    pub fn count_for(&self, side: Side) -> usize {
        let owner = Owner::from(side);
        self.slots.iter().flatten().filter(|&&o| o == owner).count()
    }

    /// True when no occupied slot sits above an empty one in the same column
    pub fn respects_gravity(&self) -> bool {
        self.columns().all(|column| {
            let filled = column.iter().take_while(|owner| !owner.is_none()).count();
            column[filled..].iter().all(|owner| owner.is_none())
        })
    }

    /// Columns left to right, each listing its slots bottom to top
    pub fn columns(&self) -> impl Iterator<Item = &[Owner; ROWS]> {
        self.slots.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_board_is_empty() {
        let board = Board::new();
        for column in 0..COLS {
            for row in 0..ROWS {
                assert_eq!(board.get(column, row), Owner::None);
            }
        }
        assert_eq!(board.token_count(), 0);
    }

    #[test]
    fn test_try_get_out_of_range() {
        let board = Board::new();
        assert_eq!(board.try_get(COLS, 0), None);
        assert_eq!(board.try_get(0, ROWS), None);
        assert_eq!(board.try_get(6, 5), Some(Owner::None));
    }

    #[test]
    fn test_landing_row_follows_gravity() {
        let mut board = Board::new();
        assert_eq!(board.landing_row(3), Some(0));

        board.place(3, 0, Side::PlayerOne);
        assert_eq!(board.landing_row(3), Some(1));
        assert_eq!(board.get(3, 0), Owner::PlayerOne);

        board.place(3, 1, Side::PlayerTwo);
        assert_eq!(board.landing_row(3), Some(2));
        assert_eq!(board.get(3, 1), Owner::PlayerTwo);
    }

    #[test]
    fn test_column_full() {
        let mut board = Board::new();
        for row in 0..ROWS {
            board.place(0, row, Side::PlayerOne);
        }
        assert!(board.is_column_full(0));
        assert_eq!(board.landing_row(0), None);
        assert!(!board.is_column_full(1));
    }

    #[test]
    fn test_invalid_column() {
        let board = Board::new();
        assert_eq!(board.landing_row(COLS), None);
        assert!(board.is_column_full(COLS));
    }

    #[test]
    fn test_full_board() {
        let mut board = Board::new();
        for column in 0..COLS {
            for row in 0..ROWS {
                board.place(column, row, Side::PlayerTwo);
            }
        }
        assert!(board.is_full());
        assert_eq!(board.token_count(), CELLS);
        assert_eq!(board.count_for(Side::PlayerTwo), CELLS);
        assert_eq!(board.count_for(Side::PlayerOne), 0);
    }

    #[test]
    fn test_floating_token_breaks_gravity() {
        let mut board = Board::new();
        board.place(2, 0, Side::PlayerOne);
        assert!(board.respects_gravity());

        board.set(4, 3, Owner::PlayerTwo);
        assert!(!board.respects_gravity());
    }
}
