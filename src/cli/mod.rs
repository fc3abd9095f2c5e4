pub mod players;
pub mod stats;

pub use players::{create_player, print_player_help, CliPlayer, PlayerInstance, CLI_PLAYERS};
pub use stats::{GameStats, StatisticsAccumulator};
