//! # snake_arena
//!
//! A tile-grid snake game built on a linear arena allocator.
//!
//! The chain is a sentinel-headed ring list whose records are accounted for
//! by a sub-arena carved out of the root arena. Records are never freed one
//! by one: a restart rolls the sub-arena back to a checkpoint and rebuilds
//! the chain from scratch.
//!
//! The host supplies a [`Platform`] for drawing and error reporting, and
//! drives a [`Game`] with key presses, elapsed time and render calls.

pub mod arena;
pub mod config;
pub mod error;
pub mod game;
pub mod platform;
pub mod ring;
pub mod snake;

pub use arena::{Arena, Block, Checkpoint};
pub use config::{GameConfig, Theme};
pub use error::{ArenaError, ConfigError, GameError};
pub use game::{Game, RunState};
pub use platform::{Alignment, Color, Key, Platform};
pub use ring::{NodeId, RingList, SENTINEL};
pub use snake::{Cell, Direction, Grid, MoveResult, Segment, Snake};
