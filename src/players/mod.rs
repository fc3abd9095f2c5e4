pub mod base;
pub mod heuristic;
pub mod random;
pub mod scripted;

pub use base::{BasePlayer, NegativeCashResponse};
pub use heuristic::HeuristicPlayer;
pub use random::RandomPlayer;
pub use scripted::ScriptedPlayer;
