use std::time::Duration;

use log::{debug, warn};

use crate::{
    PieceCollisionError,
    core::{
        board::Board,
        piece::{FallingPiece, PieceKind},
    },
};

use super::{GameStats, game_field::GameField, piece_buffer::PieceSeed};

#[derive(Debug, Clone, PartialEq, Eq, derive_more::IsVariant)]
pub enum SessionState {
    Playing,
    Paused,
    GameOver,
}

/// What happened when a piece locked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurnOutcome {
    /// Number of rows cleared by this lock.
    pub cleared_lines: usize,
    /// Points awarded by this lock, including drop points accumulated for the piece.
    pub score_delta: u64,
    /// Consecutive clearing locks, 0 when this lock cleared nothing.
    pub combo: u32,
    /// Level after the lock.
    pub level: u64,
    /// The game ended with this lock.
    pub game_over: bool,
}

/// Multi-turn, frame-driven game session with statistics tracking.
///
/// Gravity moves the falling piece down once per drop interval. The interval
/// is `max(100, 1000 - (level - 1) * 100)` milliseconds divided by the speed
/// multiplier, converted to frames at the session's frame rate.
#[derive(Debug, Clone)]
pub struct GameSession {
    field: GameField,
    stats: GameStats,
    session_state: SessionState,
    fps: u64,
    total_frames: u64,
    drop_frames: u64,
    speed_multiplier: f64,
    pending_drop_points: u64,
}

#[expect(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
fn drop_frames(level: u64, fps: u64, speed_multiplier: f64) -> u64 {
    let millis = 100 + u64::saturating_sub(900, level.saturating_sub(1) * 100);
    let scaled = (millis as f64 / speed_multiplier).round() as u64;
    (scaled.saturating_mul(fps) / 1000).max(1)
}

impl GameSession {
    /// Creates a session with a random piece sequence.
    ///
    /// # Panics
    ///
    /// Panics if `fps` is zero.
    #[must_use]
    pub fn new(fps: u64) -> Self {
        Self::from_field(fps, GameField::new())
    }

    #[must_use]
    pub fn with_seed(fps: u64, seed: PieceSeed) -> Self {
        Self::from_field(fps, GameField::with_seed(seed))
    }

    fn from_field(fps: u64, field: GameField) -> Self {
        assert!(fps > 0, "frame rate must be positive");
        Self {
            field,
            stats: GameStats::new(),
            session_state: SessionState::Playing,
            fps,
            total_frames: 0,
            drop_frames: drop_frames(1, fps, 1.0),
            speed_multiplier: 1.0,
            pending_drop_points: 0,
        }
    }

    #[must_use]
    pub fn field(&self) -> &GameField {
        &self.field
    }

    #[must_use]
    pub fn board(&self) -> &Board {
        self.field.board()
    }

    #[must_use]
    pub fn stats(&self) -> &GameStats {
        &self.stats
    }

    #[must_use]
    pub fn session_state(&self) -> &SessionState {
        &self.session_state
    }

    #[must_use]
    pub fn speed_multiplier(&self) -> f64 {
        self.speed_multiplier
    }

    /// Scales gravity by `multiplier`.
    ///
    /// Non-finite or non-positive values are ignored. Range limits are the
    /// business of the speed setting that supplies the value.
    pub fn set_speed_multiplier(&mut self, multiplier: f64) {
        if !multiplier.is_finite() || multiplier <= 0.0 {
            warn!("ignoring invalid speed multiplier {multiplier}");
            return;
        }
        self.speed_multiplier = multiplier;
        self.drop_frames = self.current_drop_interval();
    }

    /// Frames between two gravity steps at the current level and speed.
    #[must_use]
    pub fn current_drop_interval(&self) -> u64 {
        drop_frames(self.stats.level(), self.fps, self.speed_multiplier)
    }

    #[must_use]
    pub fn duration(&self) -> Duration {
        const NANOS_PER_SEC: u64 = 1_000_000_000;
        let secs = self.total_frames / self.fps;
        let nanos = u128::from(self.total_frames % self.fps) * u128::from(NANOS_PER_SEC)
            / u128::from(self.fps);
        Duration::from_secs(secs) + Duration::from_nanos(u64::try_from(nanos).unwrap_or(0))
    }

    /// Whole seconds of play so far.
    #[must_use]
    pub fn elapsed_seconds(&self) -> u64 {
        self.total_frames / self.fps
    }

    pub fn toggle_pause(&mut self) {
        self.session_state = match self.session_state {
            SessionState::Playing => SessionState::Paused,
            SessionState::Paused => SessionState::Playing,
            SessionState::GameOver => SessionState::GameOver,
        };
    }

    #[must_use]
    pub fn falling_piece(&self) -> FallingPiece {
        self.field.falling_piece()
    }

    pub fn next_pieces(&self) -> impl Iterator<Item = PieceKind> + '_ {
        self.field.next_pieces()
    }

    #[must_use]
    pub fn drop_position(&self) -> FallingPiece {
        self.field.drop_position()
    }

    /// Advances one frame. Returns the outcome when gravity locked the piece.
    ///
    /// Does nothing unless the session is playing.
    pub fn increment_frame(&mut self) -> Option<TurnOutcome> {
        if !self.session_state.is_playing() {
            return None;
        }
        self.total_frames += 1;
        self.drop_frames = self.drop_frames.saturating_sub(1);
        if self.drop_frames > 0 {
            return None;
        }
        self.drop_frames = self.current_drop_interval();
        if self.move_down().is_ok() {
            return None;
        }
        Some(self.complete_piece_drop())
    }

    pub fn try_move_left(&mut self) -> Result<(), PieceCollisionError> {
        let piece = self.field.falling_piece().left();
        self.field.set_falling_piece(piece)
    }

    pub fn try_move_right(&mut self) -> Result<(), PieceCollisionError> {
        let piece = self.field.falling_piece().right();
        self.field.set_falling_piece(piece)
    }

    /// Moves the piece one row down, awarding soft drop points.
    pub fn try_soft_drop(&mut self) -> Result<(), PieceCollisionError> {
        self.move_down()?;
        self.pending_drop_points += self.stats.add_soft_drop(1);
        Ok(())
    }

    pub fn try_rotate_left(&mut self) -> Result<(), PieceCollisionError> {
        let piece = self
            .field
            .falling_piece()
            .super_rotated_left(self.field.board())
            .ok_or(PieceCollisionError)?;
        self.field.set_falling_piece_unchecked(piece);
        Ok(())
    }

    pub fn try_rotate_right(&mut self) -> Result<(), PieceCollisionError> {
        let piece = self
            .field
            .falling_piece()
            .super_rotated_right(self.field.board())
            .ok_or(PieceCollisionError)?;
        self.field.set_falling_piece_unchecked(piece);
        Ok(())
    }

    /// Drops the piece to the floor and locks it.
    ///
    /// Returns `None` unless the session is playing.
    pub fn hard_drop_and_complete(&mut self) -> Option<TurnOutcome> {
        if !self.session_state.is_playing() {
            return None;
        }
        let mut rows = 0;
        while self.move_down().is_ok() {
            rows += 1;
        }
        self.pending_drop_points += self.stats.add_hard_drop(rows);
        Some(self.complete_piece_drop())
    }

    fn move_down(&mut self) -> Result<(), PieceCollisionError> {
        let piece = self.field.falling_piece().down();
        self.field.set_falling_piece(piece)
    }

    fn complete_piece_drop(&mut self) -> TurnOutcome {
        let (cleared_rows, result) = self.field.complete_piece_drop();
        let line_points = self.stats.complete_piece_drop(cleared_rows.len());
        let score_delta = line_points + std::mem::take(&mut self.pending_drop_points);

        let game_over = match result {
            Ok(()) => false,
            Err(e) => {
                debug!(
                    "game over after {} pieces: {e}",
                    self.stats.completed_pieces()
                );
                self.session_state = SessionState::GameOver;
                true
            }
        };

        TurnOutcome {
            cleared_lines: cleared_rows.len(),
            score_delta,
            combo: self.stats.combo(),
            level: self.stats.level(),
            game_over,
        }
    }
}
