//! Board engine for Tetrion.
//!
//! The [`core`] module holds the pure data structures: the fixed-size
//! [`Board`], the canonical [`PieceKind`] catalog with its rotation
//! matrices, and piece placement/line clearing. The [`engine`] module builds
//! frame-driven gameplay on top of them.

pub use self::{core::*, engine::*};

pub mod core;
pub mod engine;

#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("piece colliding when setting falling piece")]
pub struct PieceCollisionError;

#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::IsVariant)]
pub enum CompletePieceDropError {
    #[display("new piece collides at the spawn position")]
    NewPieceCollision,
    #[display("piece locked entirely above the visible board")]
    LockOut,
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("invalid piece seed `{input}`: expected 32 hexadecimal characters")]
pub struct SeedParseError {
    input: String,
}
