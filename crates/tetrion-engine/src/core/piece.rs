use rand::{Rng, distr::StandardUniform, prelude::Distribution};

use super::{
    board::{BOARD_WIDTH, Board},
    shape::ShapeMatrix,
};

/// Enum representing the type of piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum PieceKind {
    /// I-piece.
    I = 0,
    /// O-piece.
    O = 1,
    /// T-piece.
    T = 2,
    /// S-piece.
    S = 3,
    /// Z-piece.
    Z = 4,
    /// J-piece.
    J = 5,
    /// L-piece.
    L = 6,
}

impl Distribution<PieceKind> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> PieceKind {
        PieceKind::ALL[rng.random_range(0..PieceKind::LEN)]
    }
}

impl PieceKind {
    /// Number of piece types (7).
    pub const LEN: usize = 7;

    pub const ALL: [PieceKind; Self::LEN] = [
        PieceKind::I,
        PieceKind::O,
        PieceKind::T,
        PieceKind::S,
        PieceKind::Z,
        PieceKind::J,
        PieceKind::L,
    ];

    /// Returns the shape matrix of this piece in the given rotation.
    #[must_use]
    pub const fn shape(self, rotation: PieceRotation) -> ShapeMatrix {
        PIECE_SHAPES[self as usize][rotation.as_usize()]
    }

    /// Returns all four rotation matrices, clockwise from the spawn orientation.
    #[must_use]
    pub const fn rotations(self) -> [ShapeMatrix; 4] {
        PIECE_SHAPES[self as usize]
    }

    /// Returns the single character representation of this piece kind.
    ///
    /// # Examples
    ///
    /// ```
    /// use tetrion_engine::PieceKind;
    ///
    /// assert_eq!(PieceKind::I.as_char(), 'I');
    /// assert_eq!(PieceKind::T.as_char(), 'T');
    /// ```
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            PieceKind::I => 'I',
            PieceKind::O => 'O',
            PieceKind::T => 'T',
            PieceKind::S => 'S',
            PieceKind::Z => 'Z',
            PieceKind::J => 'J',
            PieceKind::L => 'L',
        }
    }

    /// Parses a piece kind from a single character.
    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            'I' => Some(PieceKind::I),
            'O' => Some(PieceKind::O),
            'T' => Some(PieceKind::T),
            'S' => Some(PieceKind::S),
            'Z' => Some(PieceKind::Z),
            'J' => Some(PieceKind::J),
            'L' => Some(PieceKind::L),
            _ => None,
        }
    }
}

const PIECE_SHAPES: [[ShapeMatrix; 4]; PieceKind::LEN] = [
    ShapeMatrix::from_ascii(&["####"]).rotations(),
    ShapeMatrix::from_ascii(&["##", "##"]).rotations(),
    ShapeMatrix::from_ascii(&[".#.", "###"]).rotations(),
    ShapeMatrix::from_ascii(&[".##", "##."]).rotations(),
    ShapeMatrix::from_ascii(&["##.", ".##"]).rotations(),
    ShapeMatrix::from_ascii(&["#..", "###"]).rotations(),
    ShapeMatrix::from_ascii(&["..#", "###"]).rotations(),
];

/// Rotation state of a piece.
///
/// - `0`: spawn orientation
/// - `1`: 90° clockwise
/// - `2`: 180°
/// - `3`: 270° clockwise (90° counterclockwise)
///
/// Rotation operations wrap around modulo 4.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PieceRotation(u8);

impl PieceRotation {
    #[must_use]
    pub fn rotated_right(self) -> Self {
        PieceRotation((self.0 + 1) % 4)
    }

    #[must_use]
    pub fn rotated_left(self) -> Self {
        PieceRotation((self.0 + 3) % 4)
    }

    #[must_use]
    pub const fn as_usize(self) -> usize {
        self.0 as usize
    }
}

/// A piece type paired with its current rotation matrix.
///
/// Pieces built with [`Piece::new`] use the canonical rotation table of their
/// kind. [`Piece::with_shape`] accepts any matrix, which is then rotated
/// geometrically; for canonical shapes both paths agree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    kind: PieceKind,
    rotation: PieceRotation,
    shape: ShapeMatrix,
}

impl Piece {
    #[must_use]
    pub const fn new(kind: PieceKind) -> Self {
        Self {
            kind,
            rotation: PieceRotation(0),
            shape: kind.shape(PieceRotation(0)),
        }
    }

    #[must_use]
    pub const fn with_shape(kind: PieceKind, shape: ShapeMatrix) -> Self {
        Self {
            kind,
            rotation: PieceRotation(0),
            shape,
        }
    }

    #[must_use]
    pub const fn kind(&self) -> PieceKind {
        self.kind
    }

    #[must_use]
    pub const fn rotation(&self) -> PieceRotation {
        self.rotation
    }

    #[must_use]
    pub const fn shape(&self) -> ShapeMatrix {
        self.shape
    }

    #[must_use]
    pub fn rotated_right(&self) -> Self {
        Self {
            kind: self.kind,
            rotation: self.rotation.rotated_right(),
            shape: self.shape.rotated_right(),
        }
    }

    #[must_use]
    pub fn rotated_left(&self) -> Self {
        Self {
            kind: self.kind,
            rotation: self.rotation.rotated_left(),
            shape: self.shape.rotated_left(),
        }
    }

    /// Position where this piece enters the board: horizontally centred, top row.
    #[must_use]
    pub fn spawn_position(&self) -> Position {
        let x = (BOARD_WIDTH - self.shape.width()) / 2;
        Position::new(i32::try_from(x).unwrap_or_default(), 0)
    }
}

/// Offset of a piece's matrix origin (its top-left cell) on the board.
///
/// `y` may be negative while a piece is partially above the visible board.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub const fn left(self) -> Self {
        Self::new(self.x - 1, self.y)
    }

    #[must_use]
    pub const fn right(self) -> Self {
        Self::new(self.x + 1, self.y)
    }

    #[must_use]
    pub const fn up(self) -> Self {
        Self::new(self.x, self.y - 1)
    }

    #[must_use]
    pub const fn down(self) -> Self {
        Self::new(self.x, self.y + 1)
    }
}

/// A piece together with its position on the board.
///
/// Movement and rotation return new values; the board is only consulted for
/// collision checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FallingPiece {
    piece: Piece,
    position: Position,
}

impl FallingPiece {
    /// Creates a falling piece at its spawn position.
    #[must_use]
    pub fn spawn(kind: PieceKind) -> Self {
        let piece = Piece::new(kind);
        Self {
            piece,
            position: piece.spawn_position(),
        }
    }

    #[must_use]
    pub const fn new(piece: Piece, position: Position) -> Self {
        Self { piece, position }
    }

    #[must_use]
    pub const fn piece(&self) -> Piece {
        self.piece
    }

    #[must_use]
    pub const fn position(&self) -> Position {
        self.position
    }

    #[must_use]
    pub const fn kind(&self) -> PieceKind {
        self.piece.kind()
    }

    /// Iterates the board coordinates covered by this piece.
    pub fn occupied_positions(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        let origin = self.position;
        self.piece.shape().cells().map(move |(dx, dy)| {
            (
                origin.x + i32::try_from(dx).unwrap_or_default(),
                origin.y + i32::try_from(dy).unwrap_or_default(),
            )
        })
    }

    #[must_use]
    pub fn left(&self) -> Self {
        Self::new(self.piece, self.position.left())
    }

    #[must_use]
    pub fn right(&self) -> Self {
        Self::new(self.piece, self.position.right())
    }

    #[must_use]
    pub fn up(&self) -> Self {
        Self::new(self.piece, self.position.up())
    }

    #[must_use]
    pub fn down(&self) -> Self {
        Self::new(self.piece, self.position.down())
    }

    #[must_use]
    pub fn rotated_right(&self) -> Self {
        Self::new(self.piece.rotated_right(), self.position)
    }

    #[must_use]
    pub fn rotated_left(&self) -> Self {
        Self::new(self.piece.rotated_left(), self.position)
    }

    #[must_use]
    pub fn super_rotated_left(&self, board: &Board) -> Option<Self> {
        let piece = self.rotated_left();
        if board.fits(&piece) {
            return Some(piece);
        }
        wall_kick(board, piece)
    }

    #[must_use]
    pub fn super_rotated_right(&self, board: &Board) -> Option<Self> {
        let piece = self.rotated_right();
        if board.fits(&piece) {
            return Some(piece);
        }
        wall_kick(board, piece)
    }

    /// Returns the lowest position this piece reaches by falling straight down.
    #[must_use]
    pub fn drop_position(&self, board: &Board) -> Self {
        let mut dropped = *self;
        loop {
            let next = dropped.down();
            if !board.fits(&next) {
                return dropped;
            }
            dropped = next;
        }
    }
}

/// Simplified wall kick after a failed rotation.
///
/// Tries 4 offsets in order: up, right, down, left. This is not the full
/// Super Rotation System; there are no per-piece kick tables.
fn wall_kick(board: &Board, piece: FallingPiece) -> Option<FallingPiece> {
    [piece.up(), piece.right(), piece.down(), piece.left()]
        .into_iter()
        .find(|candidate| board.fits(candidate))
}
