#![warn(clippy::all)]
#![deny(rust_2018_idioms)]

pub mod board;
pub mod cli;
pub mod game;
pub mod players;
pub mod types;

pub use board::{Board, Location, Owner};
pub use game::{Game, GameConfig, GameOutcome, GameState};
pub use types::{ActionType, AssetId, PlayerId, ReturnCode};
