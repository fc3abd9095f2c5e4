use crate::board::Owner;
use crate::game::action::{ActionPayload, GameAction, TradeOffer};
use crate::game::allowable::AllowableMoves;
use crate::game::state::GameState;
use crate::players::BasePlayer;
use crate::types::{ActionType, AssetId, Improvement, PlayerId, ReturnCode};

/// Buys and builds while it can keep a cash reserve, takes trades that gain
/// list-price value, and otherwise stays out of the way.
#[derive(Debug, Clone)]
pub struct HeuristicPlayer {
    pub reserve: i64,
}

impl Default for HeuristicPlayer {
    fn default() -> Self {
        Self { reserve: 200 }
    }
}

impl HeuristicPlayer {
    pub fn new(reserve: i64) -> Self {
        Self { reserve }
    }

    fn spare_cash(&self, state: &GameState, player: PlayerId) -> i64 {
        state.players[player].cash - self.reserve
    }

    /// List-price value of an asset, doubled when it would complete a color set for `player`.
    fn asset_value(state: &GameState, player: PlayerId, asset: AssetId, gaining: bool) -> i64 {
        let location = &state.board.locations[asset];
        let completes = location.color.is_some_and(|color| {
            state.board.color_group(color).iter().all(|sibling| {
                *sibling == asset
                    || state.board.locations[*sibling].owned_by == Owner::Player(player)
            })
        });
        if gaining && completes {
            location.price * 2
        } else {
            location.price
        }
    }

    fn trade_gain(state: &GameState, player: PlayerId, offer: &TradeOffer) -> i64 {
        let received: i64 = offer
            .property_set_offered
            .iter()
            .map(|asset| Self::asset_value(state, player, *asset, true))
            .sum();
        let given: i64 = offer
            .property_set_wanted
            .iter()
            .map(|asset| state.board.locations[*asset].price)
            .sum();
        received + offer.cash_offered - given - offer.cash_wanted
    }

    /// Accepts or rejects whatever offers are waiting.
    fn respond_to_offers(
        &self,
        player: PlayerId,
        state: &GameState,
        allowable: &AllowableMoves,
        last: Option<ReturnCode>,
    ) -> Option<GameAction> {
        let ledger = &state.players[player];
        let retry = last != Some(ReturnCode::Failure);
        if let Some(offer) = &ledger.outstanding_trade_offer {
            let good = Self::trade_gain(state, player, offer) > 0
                && offer.cash_wanted <= self.spare_cash(state, player);
            return Some(if good && retry && allowable.contains(ActionType::AcceptTradeOffer) {
                GameAction::new(player, ActionType::AcceptTradeOffer)
            } else {
                GameAction::new(player, ActionType::RejectTradeOffer)
            });
        }
        if let Some(offer) = &ledger.outstanding_sell_offer {
            let worth = Self::asset_value(state, player, offer.asset, true);
            let good = offer.price <= worth && offer.price <= self.spare_cash(state, player);
            let accept = good && retry;
            return Some(if accept && allowable.contains(ActionType::AcceptSellPropertyOffer) {
                GameAction::new(player, ActionType::AcceptSellPropertyOffer)
            } else {
                GameAction::new(player, ActionType::RejectSellPropertyOffer)
            });
        }
        None
    }

    fn build(
        &self,
        player: PlayerId,
        state: &GameState,
        allowable: &AllowableMoves,
    ) -> Option<GameAction> {
        let spare = self.spare_cash(state, player);
        if let Some(asset) = allowable
            .unmortgageable
            .iter()
            .copied()
            .find(|asset| {
                state.bank.mortgage_payoff(state.board.locations[*asset].mortgage) <= spare
            })
        {
            return Some(GameAction::on_asset(player, ActionType::FreeMortgage, asset));
        }
        allowable
            .improvements
            .iter()
            .copied()
            .filter(|(asset, _)| state.board.locations[*asset].price_per_house <= spare)
            .min_by_key(|(asset, improvement)| (*improvement == Improvement::Hotel, *asset))
            .map(|(asset, improvement)| {
                GameAction::new(player, ActionType::ImproveProperty)
                    .with_payload(ActionPayload::Improvement { asset, improvement })
            })
    }

    fn finish(player: PlayerId, allowable: &AllowableMoves) -> GameAction {
        if allowable.contains(ActionType::Skip) {
            GameAction::skip(player)
        } else {
            GameAction::conclude(player)
        }
    }
}

impl BasePlayer for HeuristicPlayer {
    fn make_pre_roll_move(
        &mut self,
        player: PlayerId,
        state: &GameState,
        allowable: &AllowableMoves,
        last: Option<ReturnCode>,
    ) -> GameAction {
        if let Some(action) = self.respond_to_offers(player, state, allowable, last) {
            return action;
        }
        if last == Some(ReturnCode::Failure) {
            return GameAction::conclude(player);
        }
        let ledger = &state.players[player];
        if ledger.currently_in_jail {
            if allowable.contains(ActionType::UseGetOutOfJailCard) {
                return GameAction::new(player, ActionType::UseGetOutOfJailCard);
            }
            if allowable.contains(ActionType::PayJailFine)
                && self.spare_cash(state, player) >= state.bank.jail_fine
            {
                return GameAction::new(player, ActionType::PayJailFine);
            }
        }
        self.build(player, state, allowable)
            .unwrap_or_else(|| Self::finish(player, allowable))
    }

    fn make_out_of_turn_move(
        &mut self,
        player: PlayerId,
        state: &GameState,
        allowable: &AllowableMoves,
        last: Option<ReturnCode>,
    ) -> GameAction {
        self.respond_to_offers(player, state, allowable, last)
            .unwrap_or_else(|| Self::finish(player, allowable))
    }

    fn make_post_roll_move(
        &mut self,
        player: PlayerId,
        state: &GameState,
        allowable: &AllowableMoves,
        last: Option<ReturnCode>,
    ) -> GameAction {
        if last == Some(ReturnCode::Failure) {
            return GameAction::conclude(player);
        }
        if let Some(asset) = allowable.buy_target {
            if state.board.locations[asset].price <= self.spare_cash(state, player) {
                return GameAction::on_asset(player, ActionType::BuyProperty, asset);
            }
        }
        self.build(player, state, allowable)
            .unwrap_or_else(|| GameAction::conclude(player))
    }

    fn make_buy_property_decision(
        &mut self,
        player: PlayerId,
        state: &GameState,
        asset: AssetId,
    ) -> bool {
        state.board.locations[asset].price <= self.spare_cash(state, player)
    }

    fn make_bid(
        &mut self,
        player: PlayerId,
        state: &GameState,
        asset: AssetId,
        current_bid: i64,
    ) -> i64 {
        let limit =
            Self::asset_value(state, player, asset, true).min(self.spare_cash(state, player));
        let bid = current_bid + 10;
        if bid <= limit { bid } else { 0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::allowable::allowable_moves;
    use crate::game::state::GameConfig;
    use crate::game::trade;
    use crate::types::{ColorGroup, Phase};

    fn state() -> GameState {
        GameState::new(GameConfig::default()).unwrap()
    }

    #[test]
    fn buys_when_reserve_allows() {
        let mut state = state();
        let boardwalk = state.board.find("Boardwalk").unwrap();
        state.players[0].option_to_buy = Some(boardwalk);
        let mut player = HeuristicPlayer::default();
        let allowable = allowable_moves(&state, 0, Phase::PostRoll, false);
        let action = player.make_post_roll_move(0, &state, &allowable, None);
        assert_eq!(action, GameAction::on_asset(0, ActionType::BuyProperty, boardwalk));

        state.players[0].cash = 500;
        assert!(!player.make_buy_property_decision(0, &state, boardwalk));
    }

    #[test]
    fn accepts_set_completing_trade() {
        let mut state = state();
        let brown = state.board.color_group(ColorGroup::Brown).to_vec();
        state.transfer_asset(brown[0], Owner::Player(1));
        state.transfer_asset(brown[1], Owner::Player(0));
        let offer = TradeOffer::new(0, 1).offering(brown[1]).with_cash(0, 80);
        trade::make_trade_offer(&mut state, 0, &offer).unwrap();
        let mut player = HeuristicPlayer::default();
        let allowable = allowable_moves(&state, 1, Phase::OutOfTurn, true);
        let action = player.make_out_of_turn_move(1, &state, &allowable, None);
        assert_eq!(action.action_type, ActionType::AcceptTradeOffer);
    }

    #[test]
    fn rejects_losing_trade() {
        let mut state = state();
        let boardwalk = state.board.find("Boardwalk").unwrap();
        state.transfer_asset(boardwalk, Owner::Player(1));
        let offer = TradeOffer::new(0, 1).wanting(boardwalk).with_cash(10, 0);
        trade::make_trade_offer(&mut state, 0, &offer).unwrap();
        let mut player = HeuristicPlayer::default();
        let allowable = allowable_moves(&state, 1, Phase::OutOfTurn, true);
        let action = player.make_out_of_turn_move(1, &state, &allowable, None);
        assert_eq!(action.action_type, ActionType::RejectTradeOffer);
    }

    #[test]
    fn bids_up_to_value() {
        let state = state();
        let reading = state.board.find("Reading Railroad").unwrap();
        let mut player = HeuristicPlayer::default();
        assert_eq!(player.make_bid(0, &state, reading, 100), 110);
        assert_eq!(player.make_bid(0, &state, reading, 195), 0);
    }
}
