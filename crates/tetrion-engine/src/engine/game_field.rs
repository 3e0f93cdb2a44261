use crate::{
    CompletePieceDropError, PieceCollisionError,
    core::{
        board::{Board, ClearedRows},
        piece::{FallingPiece, PieceKind},
    },
};

use super::piece_buffer::{PieceBuffer, PieceSeed};

/// Single-turn game state: the locked board, the falling piece, and the queue.
#[derive(Debug, Clone)]
pub struct GameField {
    board: Board,
    falling_piece: FallingPiece,
    piece_buffer: PieceBuffer,
}

impl Default for GameField {
    fn default() -> Self {
        Self::new()
    }
}

impl GameField {
    #[must_use]
    pub fn new() -> Self {
        Self::from_buffer(PieceBuffer::new())
    }

    #[must_use]
    pub fn with_seed(seed: PieceSeed) -> Self {
        Self::from_buffer(PieceBuffer::with_seed(seed))
    }

    fn from_buffer(mut piece_buffer: PieceBuffer) -> Self {
        let falling_piece = FallingPiece::spawn(piece_buffer.pop_next());
        Self {
            board: Board::EMPTY,
            falling_piece,
            piece_buffer,
        }
    }

    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[must_use]
    pub fn falling_piece(&self) -> FallingPiece {
        self.falling_piece
    }

    pub fn set_falling_piece(&mut self, piece: FallingPiece) -> Result<(), PieceCollisionError> {
        if !self.board.fits(&piece) {
            return Err(PieceCollisionError);
        }
        self.falling_piece = piece;
        Ok(())
    }

    pub fn set_falling_piece_unchecked(&mut self, piece: FallingPiece) {
        self.falling_piece = piece;
    }

    pub fn next_pieces(&self) -> impl Iterator<Item = PieceKind> + '_ {
        self.piece_buffer.next_pieces()
    }

    #[must_use]
    pub fn drop_position(&self) -> FallingPiece {
        self.falling_piece.drop_position(&self.board)
    }

    /// Locks the falling piece, clears full rows and spawns the next piece.
    ///
    /// Returns the cleared row indices together with an error when the game
    /// cannot continue: the locked piece lay entirely above the visible board,
    /// or the next piece collides at its spawn position.
    pub fn complete_piece_drop(&mut self) -> (ClearedRows, Result<(), CompletePieceDropError>) {
        let locked = self.falling_piece;
        self.board = self.board.place_piece(&locked);
        let cleared_rows = self.board.clear_lines();

        if locked.occupied_positions().all(|(_, y)| y < 0) {
            return (cleared_rows, Err(CompletePieceDropError::LockOut));
        }

        self.falling_piece = FallingPiece::spawn(self.piece_buffer.pop_next());
        if !self.board.fits(&self.falling_piece) {
            return (cleared_rows, Err(CompletePieceDropError::NewPieceCollision));
        }

        (cleared_rows, Ok(()))
    }
}
