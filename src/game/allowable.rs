//! Which moves a player may make right now.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::board::Owner;
use crate::game::actions;
use crate::game::state::GameState;
use crate::types::{ActionType, AssetId, Improvement, Phase, PlayerId};

/// The legal action types for a player in a phase, together with the
/// concrete targets each parameterised action can currently take.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllowableMoves {
    pub action_types: BTreeSet<ActionType>,
    pub buy_target: Option<AssetId>,
    pub mortgageable: Vec<AssetId>,
    pub unmortgageable: Vec<AssetId>,
    pub improvements: Vec<(AssetId, Improvement)>,
    pub sellable_improvements: Vec<(AssetId, Improvement)>,
    pub sellable_properties: Vec<AssetId>,
    /// Own assets that may go into a sell or trade offer.
    pub tradeable: Vec<AssetId>,
    /// Other players whose trade-offer slot is free.
    pub trade_partners: Vec<PlayerId>,
    /// Other players whose sell-offer slot is free.
    pub sale_partners: Vec<PlayerId>,
}

impl AllowableMoves {
    pub fn contains(&self, action_type: ActionType) -> bool {
        self.action_types.contains(&action_type)
    }

    pub fn len(&self) -> usize {
        self.action_types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.action_types.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = ActionType> + '_ {
        self.action_types.iter().copied()
    }
}

/// `first_action` is true until the player has attempted something in the
/// phase; `Skip` is only offered before that.
pub fn allowable_moves(
    state: &GameState,
    player: PlayerId,
    phase: Phase,
    first_action: bool,
) -> AllowableMoves {
    let mut moves = AllowableMoves::default();
    let Some(ledger) = state.players.get(player).filter(|p| p.is_active()) else {
        return moves;
    };

    for asset in &ledger.assets {
        let asset = *asset;
        if actions::validate_mortgage(state, player, asset).is_ok() {
            moves.mortgageable.push(asset);
        }
        if actions::validate_free_mortgage(state, player, asset).is_ok() {
            moves.unmortgageable.push(asset);
        }
        if actions::validate_property_sale(state, player, asset).is_ok() {
            moves.sellable_properties.push(asset);
        }
        if actions::ensure_tradeable(state, player, asset).is_ok() {
            moves.tradeable.push(asset);
        }
        for improvement in [Improvement::House, Improvement::Hotel] {
            if actions::validate_improvement(state, player, asset, improvement).is_ok() {
                moves.improvements.push((asset, improvement));
            }
            if actions::validate_improvement_sale(state, player, asset, improvement).is_ok() {
                moves.sellable_improvements.push((asset, improvement));
            }
        }
    }
    for other in state.active_player_ids().filter(|other| *other != player) {
        if state.players[other].outstanding_trade_offer.is_none() {
            moves.trade_partners.push(other);
        }
        if state.players[other].outstanding_sell_offer.is_none() {
            moves.sale_partners.push(other);
        }
    }

    let types = &mut moves.action_types;
    types.insert(ActionType::Conclude);
    if first_action && phase != Phase::PostRoll {
        types.insert(ActionType::Skip);
    }
    if !moves.mortgageable.is_empty() {
        types.insert(ActionType::MortgageProperty);
    }
    if !moves.unmortgageable.is_empty() {
        types.insert(ActionType::FreeMortgage);
    }
    if !moves.improvements.is_empty() {
        types.insert(ActionType::ImproveProperty);
    }
    if !moves.sellable_properties.is_empty() {
        types.insert(ActionType::SellProperty);
    }
    if !moves.sellable_improvements.is_empty() {
        types.insert(ActionType::SellHouseHotel);
    }
    if !moves.trade_partners.is_empty() && (!moves.tradeable.is_empty() || ledger.cash > 0) {
        types.insert(ActionType::MakeTradeOffer);
    }
    if !moves.sale_partners.is_empty() && !moves.tradeable.is_empty() {
        types.insert(ActionType::MakeSellPropertyOffer);
    }

    match phase {
        Phase::PreRoll | Phase::OutOfTurn => {
            if ledger.outstanding_sell_offer.is_some() {
                types.insert(ActionType::AcceptSellPropertyOffer);
                types.insert(ActionType::RejectSellPropertyOffer);
            }
            if ledger.outstanding_trade_offer.is_some() {
                types.insert(ActionType::AcceptTradeOffer);
                types.insert(ActionType::RejectTradeOffer);
            }
            if phase == Phase::PreRoll && ledger.currently_in_jail {
                if ledger.can_afford(state.bank.jail_fine) {
                    types.insert(ActionType::PayJailFine);
                }
                if ledger.has_jail_card() {
                    types.insert(ActionType::UseGetOutOfJailCard);
                }
            }
        }
        Phase::PostRoll => {
            if let Some(asset) = ledger.option_to_buy {
                let bank_owned = state
                    .board
                    .get(asset)
                    .map(|location| location.owned_by == Owner::Bank)
                    .unwrap_or(false);
                if bank_owned {
                    moves.buy_target = Some(asset);
                    types.insert(ActionType::BuyProperty);
                }
            }
        }
    }
    moves
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::action::TradeOffer;
    use crate::game::state::GameConfig;
    use crate::game::trade;
    use crate::types::ColorGroup;

    fn state() -> GameState {
        GameState::new(GameConfig::default()).unwrap()
    }

    #[test]
    fn skip_only_offered_first_and_never_post_roll() {
        let state = state();
        assert!(allowable_moves(&state, 0, Phase::PreRoll, true).contains(ActionType::Skip));
        assert!(!allowable_moves(&state, 0, Phase::PreRoll, false).contains(ActionType::Skip));
        assert!(allowable_moves(&state, 1, Phase::OutOfTurn, true).contains(ActionType::Skip));
        assert!(!allowable_moves(&state, 0, Phase::PostRoll, true).contains(ActionType::Skip));
        assert!(allowable_moves(&state, 0, Phase::PostRoll, true).contains(ActionType::Conclude));
    }

    #[test]
    fn actions_without_targets_are_pruned() {
        let state = state();
        let moves = allowable_moves(&state, 0, Phase::PreRoll, true);
        assert!(!moves.contains(ActionType::MortgageProperty));
        assert!(!moves.contains(ActionType::SellProperty));
        assert!(!moves.contains(ActionType::ImproveProperty));
        assert!(!moves.contains(ActionType::PayJailFine));
        assert!(!moves.contains(ActionType::AcceptTradeOffer));
    }

    #[test]
    fn monopoly_unlocks_improvements() {
        let mut state = state();
        for asset in state.board.color_group(ColorGroup::Blue).to_vec() {
            state.transfer_asset(asset, Owner::Player(0));
        }
        let moves = allowable_moves(&state, 0, Phase::PostRoll, false);
        assert!(moves.contains(ActionType::ImproveProperty));
        assert_eq!(moves.improvements.len(), 2);
        assert!(moves.improvements.iter().all(|(_, imp)| *imp == Improvement::House));
        assert_eq!(moves.mortgageable.len(), 2);
    }

    #[test]
    fn pending_offer_enables_responses_outside_post_roll() {
        let mut state = state();
        trade::make_trade_offer(&mut state, 0, &TradeOffer::new(0, 1).with_cash(10, 0)).unwrap();
        let moves = allowable_moves(&state, 1, Phase::OutOfTurn, true);
        assert!(moves.contains(ActionType::AcceptTradeOffer));
        assert!(moves.contains(ActionType::RejectTradeOffer));
        let moves = allowable_moves(&state, 1, Phase::PostRoll, true);
        assert!(!moves.contains(ActionType::AcceptTradeOffer));
        assert!(!allowable_moves(&state, 2, Phase::OutOfTurn, true).trade_partners.contains(&1));
    }

    #[test]
    fn buy_offered_only_with_open_option() {
        let mut state = state();
        let asset = state.board.find("Boardwalk").unwrap();
        state.players[0].option_to_buy = Some(asset);
        let moves = allowable_moves(&state, 0, Phase::PostRoll, false);
        assert_eq!(moves.buy_target, Some(asset));
        assert!(moves.contains(ActionType::BuyProperty));
        let moves = allowable_moves(&state, 0, Phase::PreRoll, false);
        assert!(!moves.contains(ActionType::BuyProperty));
    }

    #[test]
    fn jailed_player_sees_exit_options() {
        let mut state = state();
        state.players[0].send_to_jail(10);
        let moves = allowable_moves(&state, 0, Phase::PreRoll, true);
        assert!(moves.contains(ActionType::PayJailFine));
        assert!(!moves.contains(ActionType::UseGetOutOfJailCard));
        let moves = allowable_moves(&state, 0, Phase::OutOfTurn, true);
        assert!(!moves.contains(ActionType::PayJailFine));
    }
}
