use std::collections::BTreeMap;
use std::time::Duration;

use crate::game::game::{Game, GameOutcome};
use crate::types::PlayerId;

/// How a finished game ended, without the seat detail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum OutcomeKind {
    Winner,
    RunawayCash,
    TurnLimit,
}

impl From<GameOutcome> for OutcomeKind {
    fn from(outcome: GameOutcome) -> Self {
        match outcome {
            GameOutcome::Winner(_) => OutcomeKind::Winner,
            GameOutcome::RunawayCash { .. } => OutcomeKind::RunawayCash,
            GameOutcome::TurnLimit { .. } => OutcomeKind::TurnLimit,
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct GameStats {
    /// Outright wins plus turn-limit leads.
    pub wins: BTreeMap<PlayerId, u32>,
    pub net_worth_by_player: BTreeMap<PlayerId, Vec<i64>>,
    pub outcomes: BTreeMap<OutcomeKind, u32>,
    pub games: u32,
    pub total_turns: u64,
    pub total_actions: u64,
    pub total_duration: Duration,
}

impl GameStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_game(&mut self, game: &Game, duration: Duration) {
        self.games += 1;
        self.total_duration += duration;
        self.total_turns += game.state.turn as u64;
        self.total_actions += game.state.history.len() as u64;

        if let Some(outcome) = game.outcome() {
            *self.outcomes.entry(outcome.into()).or_insert(0) += 1;
            let credited = match outcome {
                GameOutcome::Winner(player) | GameOutcome::TurnLimit { leader: player } => {
                    Some(player)
                }
                GameOutcome::RunawayCash { .. } => None,
            };
            if let Some(player) = credited {
                *self.wins.entry(player).or_insert(0) += 1;
            }
        }

        for player in 0..game.state.players.len() {
            self.net_worth_by_player
                .entry(player)
                .or_default()
                .push(game.state.net_worth(player));
        }
    }

    pub fn wins_for(&self, player: PlayerId) -> u32 {
        self.wins.get(&player).copied().unwrap_or(0)
    }

    pub fn get_avg_net_worth(&self, player: PlayerId) -> f64 {
        match self.net_worth_by_player.get(&player) {
            Some(worths) if !worths.is_empty() => {
                worths.iter().sum::<i64>() as f64 / worths.len() as f64
            }
            _ => 0.0,
        }
    }

    pub fn get_avg_turns(&self) -> f64 {
        if self.games == 0 {
            return 0.0;
        }
        self.total_turns as f64 / self.games as f64
    }

    pub fn get_avg_actions(&self) -> f64 {
        if self.games == 0 {
            return 0.0;
        }
        self.total_actions as f64 / self.games as f64
    }

    pub fn get_avg_duration(&self) -> Duration {
        if self.games == 0 {
            return Duration::ZERO;
        }
        self.total_duration / self.games
    }
}

#[derive(Debug, Default)]
pub struct StatisticsAccumulator {
    pub stats: GameStats,
}

impl StatisticsAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn after(&mut self, game: &Game, duration: Duration) {
        self.stats.record_game(game, duration);
    }
}
