//! Error types for the arena, configuration and game session.

use thiserror::Error;

/// Errors raised by [`Arena`](crate::arena::Arena) operations.
///
/// Every one of these is fatal for a running session: capacities are sized
/// up front so that correct operation never produces them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArenaError {
    /// The request does not fit in the remaining capacity.
    #[error("arena out of memory: requested {requested} bytes with {used} of {capacity} used")]
    OutOfMemory {
        /// Bytes requested, including alignment padding.
        requested: usize,
        /// Bytes in use at the time of the request.
        used: usize,
        /// Total capacity of the arena.
        capacity: usize,
    },

    /// Alignment must be a non-zero power of two.
    #[error("invalid alignment: {0}")]
    InvalidAlignment(usize),

    /// The checkpoint was opened on a different arena.
    #[error("checkpoint belongs to arena #{expected}, not #{actual}")]
    ForeignCheckpoint {
        /// Id of the arena that opened the checkpoint.
        expected: u64,
        /// Id of the arena it was closed on.
        actual: u64,
    },

    /// The arena was already rolled back past this checkpoint.
    #[error("stale checkpoint: saved cursor {saved} is ahead of used {used}")]
    StaleCheckpoint {
        /// Cursor captured by the checkpoint.
        saved: usize,
        /// Current cursor of the arena.
        used: usize,
    },

    /// Closing the checkpoint would hand a carved sub-arena back to the parent.
    #[error("checkpoint at {saved} would roll back below carve boundary {floor}")]
    BelowCarveBoundary {
        /// Cursor captured by the checkpoint.
        saved: usize,
        /// Lowest cursor the arena may be rolled back to.
        floor: usize,
    },
}

/// Errors raised while loading or validating a [`GameConfig`](crate::config::GameConfig).
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration file is not valid TOML for this schema.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is out of its allowed range.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Errors surfaced by the game entry points.
#[derive(Error, Debug)]
pub enum GameError {
    /// Memory substrate failure. Halts the session.
    #[error(transparent)]
    Arena(#[from] ArenaError),

    /// Bad configuration at init time.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The drawing surface cannot hold a single grid cell.
    #[error("surface {width}x{height} is smaller than one {cell_size}px cell")]
    GridTooSmall {
        /// Surface width in pixels.
        width: u32,
        /// Surface height in pixels.
        height: u32,
        /// Configured cell size in pixels.
        cell_size: u32,
    },

    /// A previous fatal error stopped the session.
    #[error("session halted after a fatal error")]
    Halted,
}

/// Result type for arena operations.
pub type ArenaResult<T> = Result<T, ArenaError>;

/// Result type for game entry points.
pub type GameResult<T> = Result<T, GameError>;
