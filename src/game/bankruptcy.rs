//! Raising cash for a player in the red, and discharging them when that fails.

use itertools::Itertools;
use serde_json::json;
use tracing::{debug, info};

use crate::board::{HOTEL_LEVEL, Owner};
use crate::game::action::{ActionPayload, GameAction};
use crate::game::actions;
use crate::game::bridge::execute_action;
use crate::game::cards::Card;
use crate::game::history::Function;
use crate::game::state::{GameError, GameState};
use crate::types::{
    ActionType, AssetId, ColorGroup, Improvement, PlayerId, PlayerStatus, ReturnCode,
};

fn solvent(state: &GameState, player: PlayerId) -> bool {
    state.players[player].cash >= 0
}

fn owned_sorted_by(
    state: &GameState,
    player: PlayerId,
    key: impl Fn(AssetId) -> i64,
) -> Vec<AssetId> {
    state.players[player]
        .assets
        .iter()
        .copied()
        .sorted_by_key(|asset| (key(*asset), *asset))
        .collect()
}

fn in_full_set(state: &GameState, player: PlayerId, asset: AssetId) -> bool {
    state.board.locations[asset]
        .color
        .map(|color| state.players[player].full_color_sets.contains(&color))
        .unwrap_or(false)
}

/// Runs one asset action through the rule book; stops as soon as the player is solvent.
fn attempt(
    state: &mut GameState,
    player: PlayerId,
    action_type: ActionType,
    payload: ActionPayload,
) -> Result<bool, GameError> {
    if solvent(state, player) {
        return Ok(false);
    }
    let action = GameAction::new(player, action_type).with_payload(payload);
    Ok(execute_action(state, &action)? == ReturnCode::Success)
}

/// Mortgages bare, unmortgaged assets, cheapest mortgage first.
fn mortgage_pass(state: &mut GameState, player: PlayerId) -> Result<(), GameError> {
    let candidates = owned_sorted_by(state, player, |asset| state.board.locations[asset].mortgage);
    for asset in candidates {
        if actions::validate_mortgage(state, player, asset).is_ok() {
            attempt(state, player, ActionType::MortgageProperty, ActionPayload::Asset(asset))?;
        }
    }
    Ok(())
}

/// Sells bare assets outside completed color sets, cheapest first, skipping
/// sales that would not raise any cash.
fn sale_pass(state: &mut GameState, player: PlayerId) -> Result<(), GameError> {
    let candidates = owned_sorted_by(state, player, |asset| state.board.locations[asset].price);
    for asset in candidates {
        if !state.players[player].owns(asset) || in_full_set(state, player, asset) {
            continue;
        }
        if actions::property_sale_proceeds(state, asset) <= 0 {
            continue;
        }
        if actions::validate_property_sale(state, player, asset).is_ok() {
            attempt(state, player, ActionType::SellProperty, ActionPayload::Asset(asset))?;
        }
    }
    Ok(())
}

/// Sells improvements in `color` from the highest lot down, hotels first,
/// until the group is bare, the player is solvent, or a sale is refused.
fn strip_color_group(
    state: &mut GameState,
    player: PlayerId,
    color: ColorGroup,
) -> Result<(), GameError> {
    loop {
        if solvent(state, player) {
            return Ok(());
        }
        let top = state
            .board
            .color_group(color)
            .iter()
            .copied()
            .filter(|asset| state.board.locations[*asset].owned_by == Owner::Player(player))
            .max_by_key(|asset| (state.board.locations[*asset].improvement_level(), *asset));
        let Some(asset) = top else {
            return Ok(());
        };
        let level = state.board.locations[asset].improvement_level();
        if level == 0 {
            return Ok(());
        }
        let improvement = if level == HOTEL_LEVEL {
            Improvement::Hotel
        } else {
            Improvement::House
        };
        let payload = ActionPayload::Improvement { asset, improvement };
        if !attempt(state, player, ActionType::SellHouseHotel, payload)? {
            return Ok(());
        }
    }
}

/// Clears improvements from every completed color set, then sells the bare
/// lots cheapest first. Lots that would raise nothing, such as mortgaged
/// ones, are kept.
fn monopoly_pass(state: &mut GameState, player: PlayerId) -> Result<(), GameError> {
    let colors: Vec<ColorGroup> = state.players[player].full_color_sets.iter().copied().collect();
    for color in &colors {
        strip_color_group(state, player, *color)?;
    }
    for color in colors {
        if solvent(state, player) {
            return Ok(());
        }
        let lots = state
            .board
            .color_group(color)
            .iter()
            .copied()
            .sorted_by_key(|asset| (state.board.locations[*asset].price, *asset))
            .collect_vec();
        for asset in lots {
            if !state.players[player].owns(asset)
                || actions::property_sale_proceeds(state, asset) <= 0
            {
                continue;
            }
            if actions::validate_property_sale(state, player, asset).is_ok() {
                attempt(state, player, ActionType::SellProperty, ActionPayload::Asset(asset))?;
            }
        }
    }
    Ok(())
}

/// The six-step liquidation order. Every step goes through the rule book and
/// lands in the history log; it stops as soon as cash is non-negative.
pub fn liquidate(state: &mut GameState, player: PlayerId) -> Result<bool, GameError> {
    let start = state.players[player].cash;
    state.record(
        Some(player),
        Function::Liquidate,
        json!({ "cash": start }),
        ReturnCode::Success,
        None,
    );

    mortgage_pass(state, player)?;
    sale_pass(state, player)?;
    monopoly_pass(state, player)?;
    mortgage_pass(state, player)?;
    sale_pass(state, player)?;

    let colors: Vec<ColorGroup> = state.board.colors().collect();
    for color in colors {
        strip_color_group(state, player, color)?;
    }
    let remaining = owned_sorted_by(state, player, |asset| state.board.locations[asset].price);
    for asset in remaining {
        if state.players[player].owns(asset) {
            attempt(state, player, ActionType::SellProperty, ActionPayload::Asset(asset))?;
        }
    }

    let recovered = solvent(state, player);
    debug!(player, start, end = state.players[player].cash, recovered, "liquidation finished");
    Ok(recovered)
}

/// Removes a player from the game: holdings back to the bank, improvements
/// back to the pools, jail cards back to their decks, offers withdrawn.
pub fn declare_bankruptcy(state: &mut GameState, player: PlayerId) -> Result<(), GameError> {
    let cash = state.players[player].cash;
    let assets: Vec<AssetId> = state.players[player].assets.iter().copied().collect();
    for asset in &assets {
        let location = &mut state.board.locations[*asset];
        let (houses, hotels) = (location.num_houses as u32, location.num_hotels as u32);
        location.num_houses = 0;
        location.num_hotels = 0;
        state.bank.return_houses(houses);
        state.bank.return_hotels(hotels);
        state.transfer_asset(*asset, Owner::Bank);
    }

    let ledger = &mut state.players[player];
    let cards: Vec<_> = std::mem::take(&mut ledger.jail_cards).into_iter().collect();
    ledger.num_total_houses = 0;
    ledger.num_total_hotels = 0;
    ledger.cash = 0;
    ledger.status = PlayerStatus::Lost;
    ledger.option_to_buy = None;
    ledger.release_from_jail();
    ledger.reject_pending_offers();
    for pack in cards {
        state.decks.return_card(pack, Card::GetOutOfJailFree);
    }
    state.bank.absorb(cash);

    for other in state.players.iter_mut() {
        if other
            .outstanding_trade_offer
            .as_ref()
            .is_some_and(|offer| offer.from_player == player)
        {
            other.outstanding_trade_offer = None;
        }
        if other
            .outstanding_sell_offer
            .as_ref()
            .is_some_and(|offer| offer.from_player == player)
        {
            other.outstanding_sell_offer = None;
        }
    }

    info!(player, cash, assets = assets.len(), "player bankrupt");
    state.record(
        Some(player),
        Function::Bankruptcy,
        json!({ "cash": cash, "assets": assets }),
        ReturnCode::Success,
        None,
    );
    state.check_invariants()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::state::GameConfig;

    fn state() -> GameState {
        GameState::new(GameConfig::default()).unwrap()
    }

    fn give(state: &mut GameState, player: PlayerId, assets: &[AssetId]) {
        for asset in assets {
            state.transfer_asset(*asset, Owner::Player(player));
        }
    }

    #[test]
    fn mortgages_before_selling() {
        let mut state = state();
        let reading = state.board.find("Reading Railroad").unwrap();
        let boardwalk = state.board.find("Boardwalk").unwrap();
        give(&mut state, 0, &[reading, boardwalk]);
        state.players[0].cash = -150;

        assert!(liquidate(&mut state, 0).unwrap());
        // Reading (100) alone leaves -50, so Boardwalk (200) is mortgaged too.
        assert_eq!(state.players[0].cash, 150);
        assert!(state.players[0].owns(reading));
        assert!(state.players[0].owns(boardwalk));
        assert_eq!(state.players[0].mortgaged_assets.len(), 2);
    }

    #[test]
    fn houses_go_before_monopoly_lots() {
        let mut state = state();
        let brown = state.board.color_group(ColorGroup::Brown).to_vec();
        give(&mut state, 0, &brown);
        for asset in &brown {
            actions::improve_property(&mut state, 0, *asset, Improvement::House).unwrap();
        }
        state.players[0].cash = -20;

        assert!(liquidate(&mut state, 0).unwrap());
        // One house sells for 25; both lots stay owned.
        assert_eq!(state.players[0].cash, 5);
        assert_eq!(state.players[0].num_total_houses, 1);
        assert!(brown.iter().all(|asset| state.players[0].owns(*asset)));
        assert!(state.check_invariants().is_ok());
    }

    #[test]
    fn house_sales_come_before_giving_away_mortgaged_lots() {
        let mut state = state();
        let brown = state.board.color_group(ColorGroup::Brown).to_vec();
        let blue = state.board.color_group(ColorGroup::Blue).to_vec();
        give(&mut state, 0, &brown);
        give(&mut state, 0, &blue);
        for asset in &blue {
            actions::improve_property(&mut state, 0, *asset, Improvement::House).unwrap();
        }
        state.players[0].cash = -100;

        assert!(liquidate(&mut state, 0).unwrap());
        // Brown mortgages for 60, one Blue house sells for 100.
        assert_eq!(state.players[0].cash, 60);
        assert!(brown.iter().all(|asset| state.players[0].owns(*asset)));
        assert_eq!(state.players[0].num_total_houses, 1);
        let sales = Function::Action(ActionType::SellProperty);
        assert_eq!(state.history.for_function(sales).count(), 0);
    }

    #[test]
    fn hopeless_debt_sells_everything() {
        let mut state = state();
        let reading = state.board.find("Reading Railroad").unwrap();
        give(&mut state, 0, &[reading]);
        state.players[0].cash = -5000;
        assert!(!liquidate(&mut state, 0).unwrap());
        let mortgages = Function::Action(ActionType::MortgageProperty);
        assert!(state.history.for_function(mortgages).count() >= 1);
    }

    #[test]
    fn bankruptcy_discharges_everything_and_conserves_cash() {
        let mut state = state();
        let brown = state.board.color_group(ColorGroup::Brown).to_vec();
        give(&mut state, 0, &brown);
        actions::improve_property(&mut state, 0, brown[0], Improvement::House).unwrap();
        state.players[0].jail_cards.insert(crate::types::CardPack::Chance);
        state.players[0].cash = -300;
        let offer = crate::game::action::TradeOffer::new(0, 1).with_cash(5, 0);
        state.players[1].outstanding_trade_offer = Some(offer);
        let total = state.total_cash();
        let chance_cards = state.decks.len(crate::types::CardPack::Chance);

        declare_bankruptcy(&mut state, 0).unwrap();
        let ledger = &state.players[0];
        assert_eq!(ledger.status, PlayerStatus::Lost);
        assert_eq!(ledger.cash, 0);
        assert!(ledger.assets.is_empty());
        assert_eq!(state.bank.houses(), 32);
        assert_eq!(state.decks.len(crate::types::CardPack::Chance), chance_cards + 1);
        assert!(state.players[1].outstanding_trade_offer.is_none());
        assert_eq!(state.total_cash(), total);
        assert_eq!(state.num_active_players(), 3);
    }
}
