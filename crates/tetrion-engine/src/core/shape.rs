/// Largest side length a piece matrix may have.
pub const MAX_SHAPE_SIZE: usize = 4;

/// Tight boolean matrix describing one rotation state of a piece.
///
/// The matrix is stored row by row as bit masks (bit `x` of `rows[y]` is the
/// cell at column `x`, row `y`). Unlike a fixed 4×4 bounding box, the matrix
/// is exactly as wide and tall as the shape, so a horizontal I-piece is a
/// single row and its origin is the top-left filled row.
///
/// # Example
///
/// ```
/// use tetrion_engine::ShapeMatrix;
///
/// let t = ShapeMatrix::from_ascii(&[".#.", "###"]);
/// assert_eq!((t.width(), t.height()), (3, 2));
///
/// let right = t.rotated_right();
/// assert_eq!((right.width(), right.height()), (2, 3));
/// assert!(right.is_filled(0, 2));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShapeMatrix {
    width: u8,
    height: u8,
    rows: [u8; MAX_SHAPE_SIZE],
}

impl ShapeMatrix {
    /// Builds a matrix from ASCII rows, `#` for filled cells and `.` for empty ones.
    ///
    /// # Panics
    ///
    /// Panics if the rows are empty, ragged, larger than [`MAX_SHAPE_SIZE`],
    /// or contain other characters. Intended for constant tables.
    #[must_use]
    #[expect(clippy::cast_possible_truncation)]
    pub const fn from_ascii(rows: &[&str]) -> Self {
        assert!(!rows.is_empty() && rows.len() <= MAX_SHAPE_SIZE);
        let width = rows[0].len();
        assert!(width > 0 && width <= MAX_SHAPE_SIZE);

        let mut bits = [0; MAX_SHAPE_SIZE];
        let mut y = 0;
        while y < rows.len() {
            let row = rows[y].as_bytes();
            assert!(row.len() == width, "shape rows must have equal width");
            let mut x = 0;
            while x < width {
                match row[x] {
                    b'#' => bits[y] |= 1 << x,
                    b'.' => {}
                    _ => panic!("shape cells must be '#' or '.'"),
                }
                x += 1;
            }
            y += 1;
        }

        Self {
            width: width as u8,
            height: rows.len() as u8,
            rows: bits,
        }
    }

    /// Builds a matrix from boolean rows.
    ///
    /// Returns `None` when the rows are empty, ragged or exceed
    /// [`MAX_SHAPE_SIZE`] in either direction.
    #[must_use]
    pub fn from_rows(rows: &[&[bool]]) -> Option<Self> {
        let width = rows.first()?.len();
        if rows.len() > MAX_SHAPE_SIZE || width == 0 || width > MAX_SHAPE_SIZE {
            return None;
        }

        let mut bits = [0; MAX_SHAPE_SIZE];
        for (y, row) in rows.iter().enumerate() {
            if row.len() != width {
                return None;
            }
            for (x, &filled) in row.iter().enumerate() {
                if filled {
                    bits[y] |= 1 << x;
                }
            }
        }

        Some(Self {
            width: u8::try_from(width).ok()?,
            height: u8::try_from(rows.len()).ok()?,
            rows: bits,
        })
    }

    #[must_use]
    pub const fn width(self) -> usize {
        self.width as usize
    }

    #[must_use]
    pub const fn height(self) -> usize {
        self.height as usize
    }

    /// Returns `true` if the cell at local `(x, y)` is part of the shape.
    ///
    /// Coordinates outside the matrix are reported as empty.
    #[must_use]
    pub const fn is_filled(self, x: usize, y: usize) -> bool {
        x < self.width() && y < self.height() && (self.rows[y] & (1 << x)) != 0
    }

    /// Iterates the local `(x, y)` coordinates of every filled cell, row by row.
    pub fn cells(self) -> impl Iterator<Item = (usize, usize)> {
        (0..self.height()).flat_map(move |y| {
            (0..self.width())
                .filter(move |&x| self.is_filled(x, y))
                .map(move |x| (x, y))
        })
    }

    /// Returns the matrix rotated 90° clockwise.
    ///
    /// A `w × h` matrix becomes `h × w`; cell `(x, y)` of the result is cell
    /// `(y, h - 1 - x)` of the original.
    #[must_use]
    pub const fn rotated_right(self) -> Self {
        let width = self.width();
        let height = self.height();
        let mut rows = [0; MAX_SHAPE_SIZE];
        let mut y = 0;
        while y < width {
            let mut x = 0;
            while x < height {
                if (self.rows[height - 1 - x] & (1 << y)) != 0 {
                    rows[y] |= 1 << x;
                }
                x += 1;
            }
            y += 1;
        }
        Self {
            width: self.height,
            height: self.width,
            rows,
        }
    }

    /// Returns the matrix rotated 90° counter-clockwise.
    #[must_use]
    pub const fn rotated_left(self) -> Self {
        self.rotated_right().rotated_right().rotated_right()
    }

    /// All four clockwise rotation states, starting with `self`.
    #[must_use]
    pub const fn rotations(self) -> [Self; 4] {
        let r1 = self.rotated_right();
        let r2 = r1.rotated_right();
        let r3 = r2.rotated_right();
        [self, r1, r2, r3]
    }
}
