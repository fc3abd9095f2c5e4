use crate::game::action::GameAction;
use crate::game::allowable::AllowableMoves;
use crate::game::state::GameState;
use crate::players::{BasePlayer, HeuristicPlayer, NegativeCashResponse, RandomPlayer};
use crate::types::{AssetId, PlayerId, ReturnCode};

pub struct CliPlayer {
    pub code: &'static str,
    pub name: &'static str,
    pub description: &'static str,
}

pub const CLI_PLAYERS: &[CliPlayer] = &[
    CliPlayer {
        code: "R",
        name: "RandomPlayer",
        description: "Chooses among the allowable moves at random.",
    },
    CliPlayer {
        code: "H",
        name: "HeuristicPlayer",
        description: "Buys and builds while keeping a cash reserve. \
            First param is RESERVE (default 200).",
    },
];

#[derive(Debug, Clone)]
pub enum PlayerInstance {
    Random(RandomPlayer),
    Heuristic(HeuristicPlayer),
}

impl PlayerInstance {
    pub fn name(&self) -> &'static str {
        match self {
            PlayerInstance::Random(_) => "Random",
            PlayerInstance::Heuristic(_) => "Heuristic",
        }
    }

    fn inner(&mut self) -> &mut dyn BasePlayer {
        match self {
            PlayerInstance::Random(p) => p,
            PlayerInstance::Heuristic(p) => p,
        }
    }
}

impl BasePlayer for PlayerInstance {
    fn make_pre_roll_move(
        &mut self,
        player: PlayerId,
        state: &GameState,
        allowable: &AllowableMoves,
        last: Option<ReturnCode>,
    ) -> GameAction {
        self.inner().make_pre_roll_move(player, state, allowable, last)
    }

    fn make_out_of_turn_move(
        &mut self,
        player: PlayerId,
        state: &GameState,
        allowable: &AllowableMoves,
        last: Option<ReturnCode>,
    ) -> GameAction {
        self.inner().make_out_of_turn_move(player, state, allowable, last)
    }

    fn make_post_roll_move(
        &mut self,
        player: PlayerId,
        state: &GameState,
        allowable: &AllowableMoves,
        last: Option<ReturnCode>,
    ) -> GameAction {
        self.inner().make_post_roll_move(player, state, allowable, last)
    }

    fn make_buy_property_decision(
        &mut self,
        player: PlayerId,
        state: &GameState,
        asset: AssetId,
    ) -> bool {
        self.inner().make_buy_property_decision(player, state, asset)
    }

    fn make_bid(
        &mut self,
        player: PlayerId,
        state: &GameState,
        asset: AssetId,
        current_bid: i64,
    ) -> i64 {
        self.inner().make_bid(player, state, asset, current_bid)
    }

    fn handle_negative_cash_balance(
        &mut self,
        player: PlayerId,
        state: &GameState,
    ) -> NegativeCashResponse {
        self.inner().handle_negative_cash_balance(player, state)
    }
}

/// Builds the agent for a CLI code. `seed` feeds agents that draw random numbers.
pub fn create_player(code: &str, seed: u64, params: &[&str]) -> Option<PlayerInstance> {
    match code.to_uppercase().as_str() {
        "R" => Some(PlayerInstance::Random(RandomPlayer::new(seed))),
        "H" => {
            let player = match params.first().and_then(|s| s.parse::<i64>().ok()) {
                Some(reserve) => HeuristicPlayer::new(reserve),
                None => HeuristicPlayer::default(),
            };
            Some(PlayerInstance::Heuristic(player))
        }
        _ => None,
    }
}

pub fn print_player_help() {
    println!("Player Legend:");
    println!("{:<5} {:<25} {}", "CODE", "PLAYER", "DESCRIPTION");
    println!("{}", "-".repeat(80));
    for player in CLI_PLAYERS {
        println!("{:<5} {:<25} {}", player.code, player.name, player.description);
    }
}
