//! Game engine logic and state management.
//!
//! This module orchestrates the core data structures into frame-driven play:
//!
//! - [`GameField`] - Single-turn game state (board, falling piece, next pieces)
//! - [`GameSession`] - Multi-turn session with gravity, speed and statistics
//! - [`GameStats`] - Score, level, lines, combos
//! - [`PieceBuffer`] - 7-bag piece generation
//! - [`PieceSeed`] - Seed for deterministic piece generation
//!
//! # Example
//!
//! ```
//! use tetrion_engine::GameSession;
//!
//! let mut session = GameSession::new(60);
//! session.try_move_left().ok();
//! session.try_rotate_right().ok();
//!
//! let outcome = session.hard_drop_and_complete().unwrap();
//! if outcome.game_over {
//!     println!("Game over!");
//! }
//! ```

pub use self::{game_field::*, game_session::*, game_stats::*, piece_buffer::*};

mod game_field;
mod game_session;
mod game_stats;
mod piece_buffer;
