//! Per-player phase loop and the out-of-turn rotation.

use serde_json::json;
use tracing::{debug, warn};

use crate::game::action::GameAction;
use crate::game::allowable::{AllowableMoves, allowable_moves};
use crate::game::auction::run_auction;
use crate::game::bridge::{execute_action, reject_action};
use crate::game::history::Function;
use crate::game::state::{GameError, GameState};
use crate::players::BasePlayer;
use crate::types::{ActionType, Phase, PlayerId, ReturnCode};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseEnd {
    Skipped,
    Concluded,
    /// The action cap was hit; pending offers were rejected.
    ForceConcluded,
}

/// Auctions whatever a failed purchase left behind.
pub(crate) fn settle_pending_auction<P: BasePlayer>(
    state: &mut GameState,
    players: &mut [P],
    buyer: PlayerId,
) -> Result<(), GameError> {
    if let Some(asset) = state.pending_auction.take() {
        run_auction(state, players, asset, buyer)?;
        for ledger in state.players.iter_mut() {
            if ledger.option_to_buy == Some(asset) {
                ledger.option_to_buy = None;
            }
        }
    }
    Ok(())
}

/// Whether `action` is `player`'s own and inside the allowable set. A purchase
/// must name the asset the player holds the option on.
pub(crate) fn is_admissible(
    action: &GameAction,
    player: PlayerId,
    allowable: &AllowableMoves,
) -> bool {
    if action.player_index != player || !allowable.contains(action.action_type) {
        return false;
    }
    action.action_type != ActionType::BuyProperty || action.payload.asset() == allowable.buy_target
}

/// Asks `player` for moves until they skip or conclude, or the per-phase
/// action cap runs out.
pub fn run_phase<P: BasePlayer>(
    state: &mut GameState,
    players: &mut [P],
    player: PlayerId,
    phase: Phase,
) -> Result<PhaseEnd, GameError> {
    let mut last: Option<ReturnCode> = None;
    let mut first_action = true;

    for _ in 0..state.config.max_actions_per_phase {
        let allowable = allowable_moves(state, player, phase, first_action);
        let agent = &mut players[player];
        let action = match phase {
            Phase::PreRoll => agent.make_pre_roll_move(player, state, &allowable, last),
            Phase::OutOfTurn => agent.make_out_of_turn_move(player, state, &allowable, last),
            Phase::PostRoll => agent.make_post_roll_move(player, state, &allowable, last),
        };
        first_action = false;

        if !is_admissible(&action, player, &allowable) {
            reject_action(state, &action);
            last = Some(ReturnCode::Failure);
            continue;
        }

        let code = execute_action(state, &action)?;
        settle_pending_auction(state, players, player)?;
        match (action.action_type, code) {
            (ActionType::Skip, ReturnCode::Skip) => return Ok(PhaseEnd::Skipped),
            (ActionType::Conclude, ReturnCode::Success) => return Ok(PhaseEnd::Concluded),
            _ => last = Some(code),
        }
    }

    warn!(player, %phase, "action cap reached, forcing phase to conclude");
    let rejected = state.players[player].reject_pending_offers();
    state.record(
        Some(player),
        Function::PhaseTimeout,
        json!({ "phase": phase, "offers_rejected": rejected }),
        ReturnCode::Failure,
        None,
    );
    Ok(PhaseEnd::ForceConcluded)
}

/// Out-of-turn rotation, starting after `current` and ending with them.
///
/// Ends once as many consecutive players skip as there are players still in
/// the game, or when `max_out_of_turn_laps` laps have gone by. Returns the
/// number of laps run.
pub fn run_out_of_turn<P: BasePlayer>(
    state: &mut GameState,
    players: &mut [P],
    current: PlayerId,
) -> Result<u32, GameError> {
    let mut consecutive_skips = 0;
    for lap in 1..=state.config.max_out_of_turn_laps {
        for player in state.rotation_after(current) {
            if !state.players[player].is_active() {
                continue;
            }
            match run_phase(state, players, player, Phase::OutOfTurn)? {
                PhaseEnd::Skipped => consecutive_skips += 1,
                PhaseEnd::Concluded | PhaseEnd::ForceConcluded => consecutive_skips = 0,
            }
            if consecutive_skips >= state.num_active_players() {
                debug!(current, lap, "out-of-turn round settled");
                return Ok(lap);
            }
        }
    }
    warn!(current, laps = state.config.max_out_of_turn_laps, "out-of-turn lap cap reached");
    Ok(state.config.max_out_of_turn_laps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::state::GameConfig;
    use crate::players::ScriptedPlayer;

    fn state() -> GameState {
        GameState::new(GameConfig::default()).unwrap()
    }

    fn idle_table() -> Vec<ScriptedPlayer> {
        (0..4).map(|_| ScriptedPlayer::new()).collect()
    }

    #[test]
    fn skip_ends_phase() {
        let mut state = state();
        let mut players = idle_table();
        players[0].queue_move(GameAction::skip(0));
        let end = run_phase(&mut state, &mut players, 0, Phase::PreRoll).unwrap();
        assert_eq!(end, PhaseEnd::Skipped);
    }

    #[test]
    fn skip_after_another_action_is_rejected() {
        let mut state = state();
        let mut players = idle_table();
        players[0].queue_move(GameAction::on_asset(0, ActionType::MortgageProperty, 5));
        players[0].queue_move(GameAction::skip(0));
        players[0].queue_move(GameAction::conclude(0));
        let end = run_phase(&mut state, &mut players, 0, Phase::PreRoll).unwrap();
        assert_eq!(end, PhaseEnd::Concluded);
        assert_eq!(
            players[0].codes_seen(),
            &[None, Some(ReturnCode::Failure), Some(ReturnCode::Failure)]
        );
    }

    #[test]
    fn stubborn_player_is_cut_off_at_cap() {
        let mut state = state();
        let mut players = idle_table();
        crate::game::trade::make_trade_offer(
            &mut state,
            1,
            &crate::game::action::TradeOffer::new(1, 0).with_cash(10, 0),
        )
        .unwrap();
        for _ in 0..100 {
            players[0].queue_move(GameAction::on_asset(0, ActionType::BuyProperty, 1));
        }
        assert_eq!(
            run_phase(&mut state, &mut players, 0, Phase::PreRoll).unwrap(),
            PhaseEnd::ForceConcluded
        );
        assert_eq!(players[0].codes_seen().len(), 50);
        assert!(state.players[0].outstanding_trade_offer.is_none());
        assert_eq!(state.history.for_function(Function::PhaseTimeout).count(), 1);
    }

    #[test]
    fn out_of_turn_settles_after_everyone_skips() {
        let mut state = state();
        let mut players = idle_table();
        assert_eq!(run_out_of_turn(&mut state, &mut players, 0).unwrap(), 1);
        let order: Vec<_> = state
            .history
            .records()
            .iter()
            .filter_map(|record| record.player)
            .collect();
        assert_eq!(order, vec![1, 2, 3, 0]);
    }

    #[test]
    fn any_action_resets_skip_count() {
        let mut state = state();
        let mut players = idle_table();
        players[2].queue_move(GameAction::conclude(2));
        assert_eq!(run_out_of_turn(&mut state, &mut players, 0).unwrap(), 2);
    }

    #[test]
    fn lap_cap_bounds_rotation() {
        let mut state = state();
        state.config.max_out_of_turn_laps = 3;
        let mut players: Vec<_> = (0..4).map(|_| ScriptedPlayer::new().always_conclude()).collect();
        assert_eq!(run_out_of_turn(&mut state, &mut players, 0).unwrap(), 3);
    }
}
