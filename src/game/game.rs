use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::board::Owner;
use crate::game::action::GameAction;
use crate::game::bankruptcy::{declare_bankruptcy, liquidate};
use crate::game::allowable::allowable_moves;
use crate::game::bridge::{execute_action, reject_action};
use crate::game::history::Function;
use crate::game::movement::roll_and_move;
use crate::game::phases::{is_admissible, run_out_of_turn, run_phase, settle_pending_auction};
use crate::game::state::{GameConfig, GameError, GameState};
use crate::players::{BasePlayer, NegativeCashResponse};
use crate::types::{ActionType, Phase, PlayerId, PlayerStatus, ReturnCode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameOutcome {
    Winner(PlayerId),
    /// Diagnostic abort: someone's cash ran past the configured threshold.
    RunawayCash { player: PlayerId },
    /// Turn limit reached; `leader` has the highest net worth.
    TurnLimit { leader: PlayerId },
}

pub struct Game {
    pub seed: u64,
    pub id: Uuid,
    pub state: GameState,
    outcome: Option<GameOutcome>,
}

impl Game {
    pub fn new(config: GameConfig) -> Result<Self, GameError> {
        Self::from_state(GameState::new(config)?)
    }

    /// Wraps a prepared state, e.g. one whose rule book was modified before play.
    pub fn from_state(state: GameState) -> Result<Self, GameError> {
        state.check_invariants()?;
        Ok(Self {
            seed: state.config.seed,
            id: Uuid::new_v4(),
            state,
            outcome: None,
        })
    }

    pub fn outcome(&self) -> Option<GameOutcome> {
        self.outcome
    }

    pub fn winner(&self) -> Option<PlayerId> {
        match self.outcome {
            Some(GameOutcome::Winner(player)) => Some(player),
            _ => None,
        }
    }

    pub fn play<P: BasePlayer>(&mut self, players: &mut [P]) -> Result<GameOutcome, GameError> {
        if players.len() != self.state.players.len() {
            return Err(GameError::AgentCountMismatch {
                expected: self.state.players.len(),
                actual: players.len(),
            });
        }
        info!(game = %self.id, seed = self.seed, players = players.len(), "game started");
        loop {
            if let Some(outcome) = self.outcome {
                return Ok(outcome);
            }
            if self.state.turn >= self.state.config.turns_limit {
                let leader = self.leader();
                info!(game = %self.id, leader, "turn limit reached");
                self.outcome = Some(GameOutcome::TurnLimit { leader });
                continue;
            }
            self.play_tick(players)?;
        }
    }

    /// Plays one full turn for the current player.
    pub fn play_tick<P: BasePlayer>(&mut self, players: &mut [P]) -> Result<(), GameError> {
        if self.outcome.is_some() {
            return Err(GameError::GameFinished);
        }
        let state = &mut self.state;
        let player = state.current_player;
        state.turn += 1;
        state.players[player].status = PlayerStatus::CurrentMove;
        state.players[player].option_to_buy = None;
        debug!(turn = state.turn, player, cash = state.players[player].cash, "turn started");

        (state.rules.on_pre_roll)(state, player);
        run_phase(state, players, player, Phase::PreRoll)?;
        run_out_of_turn(state, players, player)?;
        state.check_turn_invariants(player)?;

        roll_and_move(state, player);
        (state.rules.on_post_roll)(state, player);
        run_phase(state, players, player, Phase::PostRoll)?;
        offer_unclaimed_purchase(state, players, player)?;
        state.check_turn_invariants(player)?;

        if state.players[player].cash < 0 {
            resolve_negative_cash(state, players, player)?;
        }
        (state.rules.on_turn_end)(state, player);

        if state.players[player].status == PlayerStatus::CurrentMove {
            state.players[player].status = PlayerStatus::WaitingForMove;
        }
        state.check_invariants()?;
        self.update_outcome();
        if let Some(next) = self.state.next_active_after(player) {
            self.state.current_player = next;
        }
        Ok(())
    }

    fn update_outcome(&mut self) {
        let state = &mut self.state;
        let active: Vec<PlayerId> = state.active_player_ids().collect();
        if let [winner] = active[..] {
            state.players[winner].status = PlayerStatus::Won;
            info!(game = %self.id, winner, turns = state.turn, "game won");
            self.outcome = Some(GameOutcome::Winner(winner));
            return;
        }
        let threshold = state.config.runaway_cash_threshold;
        if let Some(player) = active.iter().copied().find(|p| state.players[*p].cash > threshold) {
            let cash = state.players[player].cash;
            warn!(game = %self.id, player, cash, "runaway cash, aborting game");
            self.outcome = Some(GameOutcome::RunawayCash { player });
        }
    }

    /// Highest net worth among remaining players; ties go to the lower seat.
    pub fn leader(&self) -> PlayerId {
        let mut best: Option<(i64, PlayerId)> = None;
        for player in self.state.active_player_ids() {
            let worth = self.state.net_worth(player);
            if best.is_none_or(|(top, _)| worth > top) {
                best = Some((worth, player));
            }
        }
        best.map(|(_, player)| player).unwrap_or(0)
    }
}

/// A bank-owned asset the player landed on but left unbought is either bought
/// on request or put up for auction.
fn offer_unclaimed_purchase<P: BasePlayer>(
    state: &mut GameState,
    players: &mut [P],
    player: PlayerId,
) -> Result<(), GameError> {
    let Some(asset) = state.players[player].option_to_buy.take() else {
        return Ok(());
    };
    if state.board.locations[asset].owned_by != Owner::Bank {
        return Ok(());
    }
    let wants = players[player].make_buy_property_decision(player, state, asset);
    state.record(
        Some(player),
        Function::BuyDecision,
        json!({ "asset": asset, "buy": wants }),
        ReturnCode::Success,
        None,
    );
    let bought = wants
        && execute_action(state, &GameAction::on_asset(player, ActionType::BuyProperty, asset))?
            == ReturnCode::Success;
    if !bought {
        state.pending_auction = Some(asset);
    }
    settle_pending_auction(state, players, player)
}

fn resolve_negative_cash<P: BasePlayer>(
    state: &mut GameState,
    players: &mut [P],
    player: PlayerId,
) -> Result<(), GameError> {
    let response = players[player].handle_negative_cash_balance(player, state);
    state.record(
        Some(player),
        Function::HandleNegativeCash,
        json!({ "cash": state.players[player].cash, "response": &response }),
        ReturnCode::Success,
        None,
    );
    match response {
        NegativeCashResponse::DeclareBankruptcy => return declare_bankruptcy(state, player),
        NegativeCashResponse::Moves(moves) => {
            for action in &moves {
                // The purchase option is gone by now, so no BuyProperty gets through.
                let allowable = allowable_moves(state, player, Phase::PostRoll, false);
                if !is_admissible(action, player, &allowable) {
                    reject_action(state, action);
                    continue;
                }
                execute_action(state, action)?;
                settle_pending_auction(state, players, player)?;
                if state.players[player].cash >= 0 {
                    break;
                }
            }
        }
        NegativeCashResponse::Liquidate => {}
    }
    if state.players[player].cash < 0 && !liquidate(state, player)? {
        declare_bankruptcy(state, player)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::actions::ActionError;
    use crate::game::state::InvariantViolation;
    use crate::players::{RandomPlayer, ScriptedPlayer};

    fn config() -> GameConfig {
        GameConfig {
            turns_limit: 200,
            ..GameConfig::default()
        }
    }

    #[test]
    fn agent_count_must_match() {
        let mut game = Game::new(config()).unwrap();
        let mut players = vec![ScriptedPlayer::new(); 3];
        assert!(matches!(
            game.play(&mut players),
            Err(GameError::AgentCountMismatch { expected: 4, actual: 3 })
        ));
    }

    #[test]
    fn random_game_finishes_with_consistent_ledger() {
        let mut game = Game::new(config()).unwrap();
        let mut players: Vec<_> = (0..4).map(RandomPlayer::new).collect();
        let outcome = game.play(&mut players).unwrap();
        assert_eq!(game.outcome(), Some(outcome));
        assert!(game.state.check_invariants().is_ok());
        assert!(matches!(game.play_tick(&mut players), Err(GameError::GameFinished)));
    }

    #[test]
    fn same_seed_same_history() {
        let run = || {
            let mut game = Game::new(GameConfig {
                turns_limit: 60,
                ..GameConfig::default()
            })
            .unwrap();
            let mut players: Vec<_> = (0..4).map(RandomPlayer::new).collect();
            game.play(&mut players).unwrap();
            game.state.history.to_json().unwrap()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn declined_purchase_goes_to_auction() {
        let mut game = Game::new(config()).unwrap();
        game.state.rules.roll_die = |_| (1, 2);
        let mut players: Vec<_> = (0..4)
            .map(|seat| ScriptedPlayer::new().with_bids([if seat == 2 { 40 } else { 0 }]))
            .collect();
        game.play_tick(&mut players).unwrap();
        let baltic = game.state.board.find("Baltic Avenue").unwrap();
        assert_eq!(game.state.board.locations[baltic].owned_by, Owner::Player(2));
        assert_eq!(game.state.players[2].cash, 1460);
        assert_eq!(game.state.current_player, 1);
    }

    #[test]
    fn failed_purchase_request_still_auctions() {
        let mut game = Game::new(config()).unwrap();
        game.state.rules.roll_die = |_| (1, 2);
        game.state.rules.set_action(ActionType::BuyProperty, |_, _, _| {
            Err(ActionError::NotAllowed(ActionType::BuyProperty))
        });
        let mut players: Vec<_> = (0..4)
            .map(|seat| {
                ScriptedPlayer::new()
                    .with_buy_decisions([seat == 0])
                    .with_bids([if seat == 2 { 40 } else { 0 }])
            })
            .collect();
        game.play_tick(&mut players).unwrap();
        let baltic = game.state.board.find("Baltic Avenue").unwrap();
        assert_eq!(game.state.board.locations[baltic].owned_by, Owner::Player(2));
        assert_eq!(game.state.players[0].cash, 1500);
    }

    #[test]
    fn turn_without_current_move_holder_aborts() {
        let mut game = Game::new(config()).unwrap();
        game.state.rules.on_pre_roll = |state, player| {
            state.players[player].status = PlayerStatus::WaitingForMove;
        };
        let mut players = vec![ScriptedPlayer::new(); 4];
        assert!(matches!(
            game.play_tick(&mut players),
            Err(GameError::InvariantViolation(InvariantViolation::CurrentMoveCount { count: 0 }))
        ));
    }

    #[test]
    fn last_player_standing_wins() {
        let mut game = Game::new(GameConfig {
            num_players: 2,
            ..config()
        })
        .unwrap();
        game.state.rules.roll_die = |_| (2, 2);
        game.state.players[0].cash = 100;
        let mut players = vec![
            ScriptedPlayer::new().declare_bankruptcy_when_broke(),
            ScriptedPlayer::new(),
        ];
        // Income tax on cell 4 puts player 0 below zero.
        let outcome = game.play(&mut players).unwrap();
        assert_eq!(outcome, GameOutcome::Winner(1));
        assert_eq!(game.state.players[0].status, PlayerStatus::Lost);
        assert_eq!(game.state.players[1].status, PlayerStatus::Won);
    }
}
