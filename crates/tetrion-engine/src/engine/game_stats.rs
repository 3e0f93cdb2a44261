use serde::{Deserialize, Serialize};

/// Base score values for line clears, indexed by the number of lines cleared.
///
/// The base value is multiplied by the current level.
const SCORE_TABLE: [u64; 5] = [0, 100, 300, 500, 800];

/// Bonus per combo step beyond the first clear, multiplied by the level.
const COMBO_BONUS: u64 = 50;

/// Points per row for soft and hard drops.
const SOFT_DROP_POINTS: u64 = 1;
const HARD_DROP_POINTS: u64 = 2;

const LINES_PER_LEVEL: u64 = 10;

/// Game statistics tracking score, level, lines cleared, and combos.
///
/// # Scoring
///
/// - Line clears: `[0, 100, 300, 500, 800][lines] × level`
/// - Combo: `50 × (combo - 1) × level` for consecutive clearing drops
/// - Soft drop: 1 point per row, hard drop: 2 points per row
///
/// The level starts at 1 and increases every 10 lines.
///
/// # Example
///
/// ```
/// use tetrion_engine::GameStats;
///
/// let mut stats = GameStats::new();
/// stats.complete_piece_drop(4); // Tetris (4 lines)
///
/// assert_eq!(stats.score(), 800);
/// assert_eq!(stats.total_cleared_lines(), 4);
/// assert_eq!(stats.tetrises(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStats {
    score: u64,
    completed_pieces: u64,
    total_cleared_lines: u64,
    line_cleared_counter: [u64; 5],
    combo: u32,
    max_combo: u32,
}

impl Default for GameStats {
    fn default() -> Self {
        Self::new()
    }
}

impl GameStats {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            score: 0,
            completed_pieces: 0,
            total_cleared_lines: 0,
            line_cleared_counter: [0; 5],
            combo: 0,
            max_combo: 0,
        }
    }

    #[must_use]
    pub const fn score(&self) -> u64 {
        self.score
    }

    /// Returns the current level: 1 plus one level per 10 lines cleared.
    #[must_use]
    pub const fn level(&self) -> u64 {
        1 + self.total_cleared_lines / LINES_PER_LEVEL
    }

    #[must_use]
    pub const fn completed_pieces(&self) -> u64 {
        self.completed_pieces
    }

    #[must_use]
    pub const fn total_cleared_lines(&self) -> u64 {
        self.total_cleared_lines
    }

    /// Returns a histogram of drops by number of lines cleared (`[0]` to `[4]`).
    #[must_use]
    pub const fn line_cleared_counter(&self) -> &[u64; 5] {
        &self.line_cleared_counter
    }

    /// Number of four-line clears.
    #[must_use]
    pub const fn tetrises(&self) -> u64 {
        self.line_cleared_counter[4]
    }

    /// Number of consecutive drops, up to the latest one, that cleared lines.
    #[must_use]
    pub const fn combo(&self) -> u32 {
        self.combo
    }

    #[must_use]
    pub const fn max_combo(&self) -> u32 {
        self.max_combo
    }

    /// Awards soft drop points for `rows` and returns them.
    pub const fn add_soft_drop(&mut self, rows: u64) -> u64 {
        let points = rows * SOFT_DROP_POINTS;
        self.score += points;
        points
    }

    /// Awards hard drop points for `rows` and returns them.
    pub const fn add_hard_drop(&mut self, rows: u64) -> u64 {
        let points = rows * HARD_DROP_POINTS;
        self.score += points;
        points
    }

    /// Updates statistics after a piece lock and returns the points awarded.
    ///
    /// The level used for scoring is the level before the lines are added.
    pub fn complete_piece_drop(&mut self, cleared_lines: usize) -> u64 {
        let level = self.level();
        let index = cleared_lines.min(SCORE_TABLE.len() - 1);

        self.completed_pieces += 1;
        self.line_cleared_counter[index] += 1;
        self.total_cleared_lines += cleared_lines as u64;

        if cleared_lines == 0 {
            self.combo = 0;
            return 0;
        }

        self.combo += 1;
        self.max_combo = self.max_combo.max(self.combo);
        let combo_bonus = COMBO_BONUS * u64::from(self.combo - 1);
        let points = (SCORE_TABLE[index] + combo_bonus) * level;
        self.score += points;
        points
    }
}
