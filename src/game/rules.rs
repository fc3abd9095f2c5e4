//! Substitutable game logic.
//!
//! Every behaviour a rule change may replace is an entry in [`RuleBook`].
//! The engine only ever calls through the table, so swapping an entry on a
//! fresh `GameState` before play starts changes the game without touching
//! any call site. Each state owns its own table; nothing is global.

use std::fmt;

use rand::Rng;

use crate::board::{HOTEL_LEVEL, Owner};
use crate::game::action::ActionPayload;
use crate::game::actions::{self, ActionError};
use crate::game::state::GameState;
use crate::game::trade;
use crate::types::{ActionType, AssetId, LocationClass, PlayerId};

pub type ActionFn = fn(&mut GameState, PlayerId, &ActionPayload) -> Result<(), ActionError>;
pub type DuesFn = fn(&GameState, AssetId, u8) -> i64;
pub type RollFn = fn(&mut GameState) -> (u8, u8);
pub type HookFn = fn(&mut GameState, PlayerId);

#[derive(Clone, Copy)]
pub struct RuleBook {
    actions: [ActionFn; ActionType::ALL.len()],
    pub real_estate_rent: DuesFn,
    pub railroad_dues: DuesFn,
    pub utility_dues: DuesFn,
    pub roll_die: RollFn,
    pub on_pre_roll: HookFn,
    pub on_post_roll: HookFn,
    pub on_turn_end: HookFn,
}

impl RuleBook {
    pub fn standard() -> Self {
        Self {
            actions: ActionType::ALL.map(standard_action),
            real_estate_rent: standard_real_estate_rent,
            railroad_dues: standard_railroad_dues,
            utility_dues: standard_utility_dues,
            roll_die: standard_roll_die,
            on_pre_roll: no_op,
            on_post_roll: no_op,
            on_turn_end: no_op,
        }
    }

    pub fn action(&self, action_type: ActionType) -> ActionFn {
        self.actions[action_type as usize]
    }

    pub fn set_action(&mut self, action_type: ActionType, function: ActionFn) {
        self.actions[action_type as usize] = function;
    }
}

impl Default for RuleBook {
    fn default() -> Self {
        Self::standard()
    }
}

impl fmt::Debug for RuleBook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleBook").finish_non_exhaustive()
    }
}

fn no_op(_: &mut GameState, _: PlayerId) {}

fn asset_of(payload: &ActionPayload, action_type: ActionType) -> Result<AssetId, ActionError> {
    match payload {
        ActionPayload::Asset(asset) => Ok(*asset),
        _ => Err(ActionError::PayloadMismatch(action_type)),
    }
}

fn skip(state: &mut GameState, player: PlayerId, _: &ActionPayload) -> Result<(), ActionError> {
    // Skipping declines whatever offers are waiting.
    state.player(player)?;
    state.players[player].reject_pending_offers();
    Ok(())
}

fn conclude(state: &mut GameState, player: PlayerId, _: &ActionPayload) -> Result<(), ActionError> {
    state.player(player)?;
    Ok(())
}

fn buy(
    state: &mut GameState,
    player: PlayerId,
    payload: &ActionPayload,
) -> Result<(), ActionError> {
    actions::buy_property(state, player, asset_of(payload, ActionType::BuyProperty)?)
}

fn mortgage(
    state: &mut GameState,
    player: PlayerId,
    payload: &ActionPayload,
) -> Result<(), ActionError> {
    actions::mortgage_property(state, player, asset_of(payload, ActionType::MortgageProperty)?)
}

fn unmortgage(
    state: &mut GameState,
    player: PlayerId,
    payload: &ActionPayload,
) -> Result<(), ActionError> {
    actions::free_mortgage(state, player, asset_of(payload, ActionType::FreeMortgage)?)
}

fn sell(
    state: &mut GameState,
    player: PlayerId,
    payload: &ActionPayload,
) -> Result<(), ActionError> {
    actions::sell_property(state, player, asset_of(payload, ActionType::SellProperty)?)
}

fn improve(
    state: &mut GameState,
    player: PlayerId,
    payload: &ActionPayload,
) -> Result<(), ActionError> {
    match payload {
        ActionPayload::Improvement { asset, improvement } => {
            actions::improve_property(state, player, *asset, *improvement)
        }
        _ => Err(ActionError::PayloadMismatch(ActionType::ImproveProperty)),
    }
}

fn sell_improvement(
    state: &mut GameState,
    player: PlayerId,
    payload: &ActionPayload,
) -> Result<(), ActionError> {
    match payload {
        ActionPayload::Improvement { asset, improvement } => {
            actions::sell_house_hotel(state, player, *asset, *improvement)
        }
        _ => Err(ActionError::PayloadMismatch(ActionType::SellHouseHotel)),
    }
}

fn offer_property(
    state: &mut GameState,
    player: PlayerId,
    payload: &ActionPayload,
) -> Result<(), ActionError> {
    match payload {
        ActionPayload::SellOffer {
            asset,
            to_player,
            price,
        } => actions::make_sell_property_offer(state, player, *asset, *to_player, *price),
        _ => Err(ActionError::PayloadMismatch(ActionType::MakeSellPropertyOffer)),
    }
}

fn offer_trade(
    state: &mut GameState,
    player: PlayerId,
    payload: &ActionPayload,
) -> Result<(), ActionError> {
    match payload {
        ActionPayload::Trade(offer) => trade::make_trade_offer(state, player, offer),
        _ => Err(ActionError::PayloadMismatch(ActionType::MakeTradeOffer)),
    }
}

fn standard_action(action_type: ActionType) -> ActionFn {
    match action_type {
        ActionType::Skip => skip,
        ActionType::Conclude => conclude,
        ActionType::BuyProperty => buy,
        ActionType::MortgageProperty => mortgage,
        ActionType::FreeMortgage => unmortgage,
        ActionType::ImproveProperty => improve,
        ActionType::SellProperty => sell,
        ActionType::SellHouseHotel => sell_improvement,
        ActionType::MakeSellPropertyOffer => offer_property,
        ActionType::AcceptSellPropertyOffer => {
            |state, player, _| actions::accept_sell_property_offer(state, player)
        }
        ActionType::RejectSellPropertyOffer => {
            |state, player, _| actions::reject_sell_property_offer(state, player)
        }
        ActionType::MakeTradeOffer => offer_trade,
        ActionType::AcceptTradeOffer => |state, player, _| trade::accept_trade_offer(state, player),
        ActionType::RejectTradeOffer => |state, player, _| trade::reject_trade_offer(state, player),
        ActionType::PayJailFine => |state, player, _| actions::pay_jail_fine(state, player),
        ActionType::UseGetOutOfJailCard => {
            |state, player, _| actions::use_get_out_of_jail_card(state, player)
        }
    }
}

fn dues_owner(state: &GameState, asset: AssetId) -> Option<PlayerId> {
    let location = state.board.get(asset)?;
    if location.is_mortgaged {
        return None;
    }
    match location.owned_by {
        Owner::Player(owner) => Some(owner),
        Owner::Bank => None,
    }
}

pub fn standard_real_estate_rent(state: &GameState, asset: AssetId, _die_total: u8) -> i64 {
    let Some(owner) = dues_owner(state, asset) else {
        return 0;
    };
    let location = &state.board.locations[asset];
    match location.improvement_level() {
        0 => {
            let monopoly = location
                .color
                .map(|color| state.players[owner].full_color_sets.contains(&color))
                .unwrap_or(false);
            if monopoly {
                location.rent[0] * state.bank.monopoly_rent_factor
            } else {
                location.rent[0]
            }
        }
        level => location.rent[level.min(HOTEL_LEVEL) as usize],
    }
}

pub fn standard_railroad_dues(state: &GameState, asset: AssetId, _die_total: u8) -> i64 {
    match dues_owner(state, asset) {
        Some(owner) => state
            .bank
            .railroad_dues_for(state.board.count_owned(owner, LocationClass::Railroad)),
        None => 0,
    }
}

pub fn standard_utility_dues(state: &GameState, asset: AssetId, die_total: u8) -> i64 {
    match dues_owner(state, asset) {
        Some(owner) => {
            let owned = state.board.count_owned(owner, LocationClass::Utility);
            die_total as i64 * state.bank.utility_multiplier_for(owned)
        }
        None => 0,
    }
}

pub fn standard_roll_die(state: &mut GameState) -> (u8, u8) {
    let rng = state.rng_mut();
    (rng.gen_range(1..=6), rng.gen_range(1..=6))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::state::GameConfig;
    use crate::types::ColorGroup;

    fn state() -> GameState {
        GameState::new(GameConfig::default()).unwrap()
    }

    #[test]
    fn railroad_dues_follow_owned_count() {
        let mut state = state();
        let names = ["Reading Railroad", "Pennsylvania Railroad", "B&O Railroad", "Short Line"];
        let railroads: Vec<_> = names
            .iter()
            .map(|name| state.board.find(name).unwrap())
            .collect();
        let mut dues = Vec::new();
        for asset in &railroads {
            state.transfer_asset(*asset, Owner::Player(1));
            dues.push(state.dues(railroads[0], 7));
        }
        assert_eq!(dues, vec![25, 50, 100, 200]);
    }

    #[test]
    fn monopoly_doubles_bare_rent() {
        let mut state = state();
        let brown = state.board.color_group(ColorGroup::Brown).to_vec();
        state.transfer_asset(brown[0], Owner::Player(0));
        assert_eq!(state.dues(brown[0], 5), 2);
        state.transfer_asset(brown[1], Owner::Player(0));
        assert_eq!(state.dues(brown[0], 5), 4);
        let house = crate::types::Improvement::House;
        actions::improve_property(&mut state, 0, brown[0], house).unwrap();
        assert_eq!(state.dues(brown[0], 5), 10);
    }

    #[test]
    fn mortgaged_assets_charge_nothing() {
        let mut state = state();
        let utility = state.board.find("Electric Company").unwrap();
        state.transfer_asset(utility, Owner::Player(0));
        assert_eq!(state.dues(utility, 8), 32);
        actions::mortgage_property(&mut state, 0, utility).unwrap();
        assert_eq!(state.dues(utility, 8), 0);
    }

    #[test]
    fn substituted_rent_is_used() {
        let mut state = state();
        let asset = state.board.find("Boardwalk").unwrap();
        state.transfer_asset(asset, Owner::Player(0));
        state.rules.real_estate_rent = |_, _, _| 999;
        assert_eq!(state.dues(asset, 2), 999);
    }

    #[test]
    fn substituted_action_is_dispatched() {
        let mut state = state();
        state.rules.set_action(ActionType::PayJailFine, |_, _, _| {
            Err(ActionError::InvalidOffer("disabled"))
        });
        state.players[0].send_to_jail(10);
        let pay = state.rules.action(ActionType::PayJailFine);
        assert!(pay(&mut state, 0, &ActionPayload::None).is_err());
        assert!(state.players[0].currently_in_jail);
    }

    #[test]
    fn dice_stay_in_range() {
        let mut state = state();
        for _ in 0..100 {
            let (a, b) = state.roll_dice();
            assert!((1..=6).contains(&a) && (1..=6).contains(&b));
        }
    }
}
