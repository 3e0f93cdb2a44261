use std::fmt;

use arrayvec::ArrayVec;
use super::piece::{FallingPiece, PieceKind};

/// Number of columns on the board.
pub const BOARD_WIDTH: usize = 10;
/// Number of visible rows on the board.
pub const BOARD_HEIGHT: usize = 20;

/// A single board cell: empty, or the kind of piece locked there.
pub type Cell = Option<PieceKind>;

/// One row of cells, left to right.
pub type Row = [Cell; BOARD_WIDTH];

/// Row indices removed by a line clear, top to bottom.
pub type ClearedRows = ArrayVec<usize, BOARD_HEIGHT>;

/// Fixed-size playfield of `BOARD_HEIGHT × BOARD_WIDTH` cells.
///
/// Row `0` is the top of the visible board and `x = 0` is the leftmost
/// column. Dimensions never change; every row always has `BOARD_WIDTH` cells.
///
/// Placement is pure: [`Board::place_piece`] returns a new board and leaves
/// `self` untouched.
///
/// # Example
///
/// ```
/// use tetrion_engine::{Board, FallingPiece, PieceKind};
///
/// let board = Board::EMPTY;
/// let piece = FallingPiece::spawn(PieceKind::I).drop_position(&board);
/// let placed = board.place_piece(&piece);
///
/// assert!(board.is_empty());
/// assert_eq!(placed.occupied_count(), 4);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Board {
    rows: [Row; BOARD_HEIGHT],
}

impl Default for Board {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl Board {
    pub const WIDTH: usize = BOARD_WIDTH;
    pub const HEIGHT: usize = BOARD_HEIGHT;

    pub const EMPTY: Self = Self {
        rows: [[None; BOARD_WIDTH]; BOARD_HEIGHT],
    };

    /// Returns an iterator over the rows, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &Row> {
        self.rows.iter()
    }

    /// Returns the cell at `(x, y)`, or `None` if it is empty or off the board.
    #[must_use]
    pub fn cell(&self, x: usize, y: usize) -> Cell {
        self.rows.get(y).and_then(|row| row.get(x).copied().flatten())
    }

    /// Sets a single cell. Coordinates outside the board are ignored.
    pub fn set_cell(&mut self, x: usize, y: usize, cell: Cell) {
        if let Some(slot) = self.rows.get_mut(y).and_then(|row| row.get_mut(x)) {
            *slot = cell;
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.iter().flatten().all(Option::is_none)
    }

    #[must_use]
    pub fn occupied_count(&self) -> usize {
        self.rows.iter().flatten().filter(|c| c.is_some()).count()
    }

    /// Returns `true` if the piece can occupy its position.
    ///
    /// Cells above the top row are allowed (pieces spawn and rotate partly
    /// above the visible board). Cells outside the columns, below the bottom
    /// row, or on an occupied cell are not. This is the collision check callers
    /// run before [`Board::place_piece`].
    #[must_use]
    pub fn fits(&self, piece: &FallingPiece) -> bool {
        piece.occupied_positions().all(|(x, y)| {
            let Ok(x) = usize::try_from(x) else {
                return false;
            };
            if x >= BOARD_WIDTH {
                return false;
            }
            let Ok(y) = usize::try_from(y) else {
                return true;
            };
            y < BOARD_HEIGHT && self.rows[y][x].is_none()
        })
    }

    /// Returns a new board with the piece written into it.
    ///
    /// Every filled cell of the piece's matrix is written as the piece's kind
    /// at `(position.x + dx, position.y + dy)`:
    ///
    /// - Cells that land above row `0` are discarded, so pieces can be placed
    ///   while partially above the visible board.
    /// - Existing cells under the piece are overwritten unconditionally;
    ///   collision must be checked with [`Board::fits`] beforehand.
    /// - Cells outside the columns or below the bottom row are discarded as
    ///   well. Placing there is a caller contract violation; it never panics.
    ///
    /// `self` is never modified.
    #[must_use]
    pub fn place_piece(&self, piece: &FallingPiece) -> Self {
        let mut board = self.clone();
        let kind = piece.kind();
        for (x, y) in piece.occupied_positions() {
            let (Ok(x), Ok(y)) = (usize::try_from(x), usize::try_from(y)) else {
                continue;
            };
            if let Some(slot) = board.rows.get_mut(y).and_then(|row| row.get_mut(x)) {
                *slot = Some(kind);
            }
        }
        board
    }

    /// Returns the indices of every completely filled row, top to bottom.
    #[must_use]
    pub fn full_rows(&self) -> ClearedRows {
        self.rows
            .iter()
            .enumerate()
            .filter(|(_, row)| row.iter().all(Option::is_some))
            .map(|(y, _)| y)
            .collect()
    }

    /// Clears filled rows and returns their indices (top to bottom).
    ///
    /// Cleared rows are removed, the rows above shift down keeping their
    /// relative order and column layout, and as many empty rows as were
    /// cleared are inserted at the top.
    pub fn clear_lines(&mut self) -> ClearedRows {
        let cleared = self.full_rows();
        if cleared.is_empty() {
            return cleared;
        }

        let mut write = BOARD_HEIGHT;
        for read in (0..BOARD_HEIGHT).rev() {
            if cleared.contains(&read) {
                continue;
            }
            write -= 1;
            if write != read {
                self.rows[write] = self.rows[read];
            }
        }
        self.rows[..write].fill([None; BOARD_WIDTH]);
        cleared
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.rows {
            for cell in row {
                let ch = cell.map_or('.', PieceKind::as_char);
                write!(f, "{ch}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Piece, Position, ShapeMatrix};

    /// Builds a board whose last rows are given as ASCII (piece letters or `.`).
    fn board_from_bottom(rows: &[&str]) -> Board {
        let mut board = Board::EMPTY;
        let top = BOARD_HEIGHT - rows.len();
        for (dy, row) in rows.iter().enumerate() {
            for (x, ch) in row.chars().enumerate() {
                board.set_cell(x, top + dy, PieceKind::from_char(ch));
            }
        }
        board
    }

    fn placed(kind: PieceKind, shape: &[&str], x: i32, y: i32) -> FallingPiece {
        FallingPiece::new(
            Piece::with_shape(kind, ShapeMatrix::from_ascii(shape)),
            Position::new(x, y),
        )
    }

    #[test]
    fn test_initial_board_is_empty() {
        let board = Board::EMPTY;
        assert!(board.is_empty());
        assert_eq!(board.rows().count(), BOARD_HEIGHT);
        assert!(board.rows().all(|row| row.len() == BOARD_WIDTH));
    }

    #[test]
    fn test_place_piece_writes_kind() {
        let board = Board::EMPTY;
        let piece = FallingPiece::new(Piece::new(PieceKind::T), Position::new(4, 10));
        let result = board.place_piece(&piece);

        assert_eq!(result.cell(5, 10), Some(PieceKind::T));
        assert_eq!(result.cell(4, 11), Some(PieceKind::T));
        assert_eq!(result.cell(5, 11), Some(PieceKind::T));
        assert_eq!(result.cell(6, 11), Some(PieceKind::T));
        assert_eq!(result.cell(4, 10), None);
        assert_eq!(result.occupied_count(), 4);
    }

    #[test]
    fn test_place_piece_leaves_input_untouched() {
        let board = board_from_bottom(&["OO........"]);
        let snapshot = board.clone();
        let piece = FallingPiece::new(Piece::new(PieceKind::I), Position::new(0, 0));

        let result = board.place_piece(&piece);

        assert_eq!(board, snapshot);
        assert_ne!(result, board);
        assert_eq!(result.cell(0, BOARD_HEIGHT - 1), Some(PieceKind::O));
    }

    #[test]
    fn test_place_piece_is_deterministic() {
        let board = board_from_bottom(&["JJJ......."]);
        let piece = FallingPiece::new(Piece::new(PieceKind::S), Position::new(3, 17));
        assert_eq!(board.place_piece(&piece), board.place_piece(&piece));
    }

    #[test]
    fn test_horizontal_piece_above_board_is_discarded() {
        let piece = placed(PieceKind::I, &["####"], 3, -1);
        let result = Board::EMPTY.place_piece(&piece);
        assert!(result.is_empty());
    }

    #[test]
    fn test_two_row_piece_partially_above_board() {
        let piece = placed(PieceKind::O, &["##", "##"], 3, -1);
        let result = Board::EMPTY.place_piece(&piece);

        assert_eq!(result.occupied_count(), 2);
        assert_eq!(result.cell(3, 0), Some(PieceKind::O));
        assert_eq!(result.cell(4, 0), Some(PieceKind::O));
    }

    #[test]
    fn test_place_piece_overwrites_footprint_only() {
        let board = board_from_bottom(&["ZZZZ......", "ZZZZ......"]);
        let piece = placed(PieceKind::L, &["##"], 1, BOARD_HEIGHT as i32 - 1);

        let result = board.place_piece(&piece);

        let bottom = BOARD_HEIGHT - 1;
        assert_eq!(result.cell(0, bottom), Some(PieceKind::Z));
        assert_eq!(result.cell(1, bottom), Some(PieceKind::L));
        assert_eq!(result.cell(2, bottom), Some(PieceKind::L));
        assert_eq!(result.cell(3, bottom), Some(PieceKind::Z));
        for x in 0..4 {
            assert_eq!(result.cell(x, bottom - 1), Some(PieceKind::Z));
        }
        assert_eq!(result.occupied_count(), board.occupied_count());
    }

    #[test]
    fn test_place_piece_truncates_out_of_range_cells() {
        let right_edge = placed(PieceKind::I, &["####"], 8, 5);
        let result = Board::EMPTY.place_piece(&right_edge);
        assert_eq!(result.occupied_count(), 2);
        assert_eq!(result.cell(8, 5), Some(PieceKind::I));
        assert_eq!(result.cell(9, 5), Some(PieceKind::I));

        let left_edge = placed(PieceKind::I, &["####"], -2, 5);
        assert_eq!(Board::EMPTY.place_piece(&left_edge).occupied_count(), 2);

        let below = placed(PieceKind::O, &["##", "##"], 0, BOARD_HEIGHT as i32 - 1);
        assert_eq!(Board::EMPTY.place_piece(&below).occupied_count(), 2);
    }

    #[test]
    fn test_fits_rules() {
        let board = board_from_bottom(&["T........."]);
        let bottom = BOARD_HEIGHT as i32 - 1;

        assert!(board.fits(&placed(PieceKind::I, &["####"], 0, -1)));
        assert!(board.fits(&placed(PieceKind::I, &["####"], 6, 0)));
        assert!(!board.fits(&placed(PieceKind::I, &["####"], 7, 0)));
        assert!(!board.fits(&placed(PieceKind::I, &["####"], -1, 0)));
        assert!(!board.fits(&placed(PieceKind::I, &["####"], 0, bottom)));
        assert!(board.fits(&placed(PieceKind::I, &["####"], 1, bottom)));
        assert!(!board.fits(&placed(PieceKind::O, &["##", "##"], 4, bottom)));
    }

    #[test]
    fn test_clear_lines_basic() {
        let mut board = board_from_bottom(&["IIIIIIIIII"]);
        let cleared = board.clear_lines();
        assert_eq!(cleared.as_slice(), &[BOARD_HEIGHT - 1]);
        assert!(board.is_empty());
    }

    #[test]
    fn test_clear_lines_with_partial_lines() {
        let mut board = board_from_bottom(&["IIIIIIIII."]);
        let before = board.clone();
        assert!(board.clear_lines().is_empty());
        assert_eq!(board, before);
    }

    #[test]
    fn test_clear_lines_shifts_rows_above() {
        let mut board = board_from_bottom(&[
            "S.........",
            "IIIIIIIIII",
            ".T.......J",
            "LLLLLLLLLL",
            "O.O.O.O.O.",
        ]);
        let cleared = board.clear_lines();

        assert_eq!(
            cleared.as_slice(),
            &[BOARD_HEIGHT - 4, BOARD_HEIGHT - 2]
        );
        let expected = board_from_bottom(&["S.........", ".T.......J", "O.O.O.O.O."]);
        assert_eq!(board, expected);
    }

    #[test]
    fn test_clear_lines_all_filled() {
        let mut board = Board::EMPTY;
        for y in 0..BOARD_HEIGHT {
            for x in 0..BOARD_WIDTH {
                board.set_cell(x, y, Some(PieceKind::Z));
            }
        }
        assert_eq!(board.clear_lines().len(), BOARD_HEIGHT);
        assert!(board.is_empty());
    }

    #[test]
    fn test_display_renders_letters() {
        let board = board_from_bottom(&["TT.......I"]);
        let text = board.to_string();
        let last = text.lines().last().unwrap();
        assert_eq!(last, "TT.......I");
        assert_eq!(text.lines().count(), BOARD_HEIGHT);
    }
}
