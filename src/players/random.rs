use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::game::action::{ActionPayload, GameAction, TradeOffer};
use crate::game::actions::ensure_tradeable;
use crate::game::allowable::AllowableMoves;
use crate::game::state::GameState;
use crate::players::BasePlayer;
use crate::types::{ActionType, AssetId, PlayerId, ReturnCode};

/// Chance of skipping whenever skipping is on offer. Kept high so the
/// out-of-turn rotation settles.
const SKIP_PROBABILITY: f64 = 0.9;
const CONCLUDE_PROBABILITY: f64 = 0.4;

/// Picks uniformly among the allowable moves, with random but legal-looking parameters.
#[derive(Debug, Clone)]
pub struct RandomPlayer {
    rng: StdRng,
}

impl RandomPlayer {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    fn choose_move(
        &mut self,
        player: PlayerId,
        state: &GameState,
        allowable: &AllowableMoves,
    ) -> GameAction {
        if allowable.contains(ActionType::Skip) && self.rng.gen_bool(SKIP_PROBABILITY) {
            return GameAction::skip(player);
        }
        if self.rng.gen_bool(CONCLUDE_PROBABILITY) {
            return GameAction::conclude(player);
        }
        let candidates: Vec<ActionType> = allowable
            .iter()
            .filter(|action_type| *action_type != ActionType::Skip)
            .collect();
        let Some(action_type) = candidates.choose(&mut self.rng).copied() else {
            return GameAction::conclude(player);
        };
        match self.payload_for(player, state, allowable, action_type) {
            Some(payload) => GameAction::new(player, action_type).with_payload(payload),
            None => GameAction::conclude(player),
        }
    }

    fn payload_for(
        &mut self,
        player: PlayerId,
        state: &GameState,
        allowable: &AllowableMoves,
        action_type: ActionType,
    ) -> Option<ActionPayload> {
        let payload = match action_type {
            ActionType::BuyProperty => ActionPayload::Asset(allowable.buy_target?),
            ActionType::MortgageProperty => {
                ActionPayload::Asset(*allowable.mortgageable.choose(&mut self.rng)?)
            }
            ActionType::FreeMortgage => {
                ActionPayload::Asset(*allowable.unmortgageable.choose(&mut self.rng)?)
            }
            ActionType::SellProperty => {
                ActionPayload::Asset(*allowable.sellable_properties.choose(&mut self.rng)?)
            }
            ActionType::ImproveProperty => {
                let (asset, improvement) = *allowable.improvements.choose(&mut self.rng)?;
                ActionPayload::Improvement { asset, improvement }
            }
            ActionType::SellHouseHotel => {
                let (asset, improvement) = *allowable.sellable_improvements.choose(&mut self.rng)?;
                ActionPayload::Improvement { asset, improvement }
            }
            ActionType::MakeSellPropertyOffer => {
                let asset = *allowable.tradeable.choose(&mut self.rng)?;
                let to_player = *allowable.sale_partners.choose(&mut self.rng)?;
                let price = self.fuzzed_price(state, asset);
                ActionPayload::SellOffer {
                    asset,
                    to_player,
                    price,
                }
            }
            ActionType::MakeTradeOffer => {
                let partner = *allowable.trade_partners.choose(&mut self.rng)?;
                let offer = match allowable.tradeable.choose(&mut self.rng) {
                    Some(asset) => {
                        let price = self.fuzzed_price(state, *asset);
                        TradeOffer::new(player, partner).offering(*asset).with_cash(0, price)
                    }
                    None => {
                        let wanted: Vec<AssetId> = state.players[partner]
                            .assets
                            .iter()
                            .copied()
                            .filter(|asset| ensure_tradeable(state, partner, *asset).is_ok())
                            .collect();
                        let asset = *wanted.choose(&mut self.rng)?;
                        let price = self.fuzzed_price(state, asset).min(state.players[player].cash);
                        TradeOffer::new(player, partner).wanting(asset).with_cash(price, 0)
                    }
                };
                ActionPayload::Trade(offer)
            }
            _ => ActionPayload::None,
        };
        Some(payload)
    }

    fn fuzzed_price(&mut self, state: &GameState, asset: AssetId) -> i64 {
        let price = state.board.locations[asset].price;
        (price as f64 * self.rng.gen_range(0.5..1.5)).round() as i64
    }
}

impl BasePlayer for RandomPlayer {
    fn make_pre_roll_move(
        &mut self,
        player: PlayerId,
        state: &GameState,
        allowable: &AllowableMoves,
        _last: Option<ReturnCode>,
    ) -> GameAction {
        self.choose_move(player, state, allowable)
    }

    fn make_out_of_turn_move(
        &mut self,
        player: PlayerId,
        state: &GameState,
        allowable: &AllowableMoves,
        _last: Option<ReturnCode>,
    ) -> GameAction {
        self.choose_move(player, state, allowable)
    }

    fn make_post_roll_move(
        &mut self,
        player: PlayerId,
        state: &GameState,
        allowable: &AllowableMoves,
        _last: Option<ReturnCode>,
    ) -> GameAction {
        self.choose_move(player, state, allowable)
    }

    fn make_buy_property_decision(
        &mut self,
        player: PlayerId,
        state: &GameState,
        asset: AssetId,
    ) -> bool {
        state.players[player].can_afford(state.board.locations[asset].price)
            && self.rng.gen_bool(0.5)
    }

    fn make_bid(
        &mut self,
        player: PlayerId,
        state: &GameState,
        asset: AssetId,
        current_bid: i64,
    ) -> i64 {
        let ceiling = state.board.locations[asset]
            .price
            .min(state.players[player].cash);
        if current_bid >= ceiling || !self.rng.gen_bool(0.5) {
            return 0;
        }
        self.rng.gen_range(current_bid + 1..=ceiling)
    }
}
