//! Cash and property bundle exchanges between players.

use tracing::info;

use crate::board::Owner;
use crate::game::action::TradeOffer;
use crate::game::actions::{ActionError, ensure_cash, ensure_tradeable};
use crate::game::state::GameState;
use crate::types::PlayerId;

/// Checks that both sides can still deliver what `offer` promises.
fn validate_bundle(state: &GameState, offer: &TradeOffer) -> Result<(), ActionError> {
    if offer.from_player == offer.to_player {
        return Err(ActionError::InvalidOffer("cannot trade with yourself"));
    }
    if offer.cash_offered < 0 || offer.cash_wanted < 0 {
        return Err(ActionError::InvalidOffer("negative cash amount"));
    }
    if offer.cash_offered == 0
        && offer.cash_wanted == 0
        && offer.property_set_offered.is_empty()
        && offer.property_set_wanted.is_empty()
    {
        return Err(ActionError::InvalidOffer("empty offer"));
    }
    if !offer.property_set_offered.is_disjoint(&offer.property_set_wanted) {
        return Err(ActionError::InvalidOffer("asset on both sides"));
    }
    state.active_player(offer.from_player)?;
    state.active_player(offer.to_player)?;
    for asset in &offer.property_set_offered {
        ensure_tradeable(state, offer.from_player, *asset)?;
    }
    for asset in &offer.property_set_wanted {
        ensure_tradeable(state, offer.to_player, *asset)?;
    }
    Ok(())
}

pub fn make_trade_offer(
    state: &mut GameState,
    player: PlayerId,
    offer: &TradeOffer,
) -> Result<(), ActionError> {
    if offer.from_player != player {
        return Err(ActionError::InvalidOffer("offer must come from the acting player"));
    }
    validate_bundle(state, offer)?;
    if state.players[offer.to_player].outstanding_trade_offer.is_some() {
        return Err(ActionError::OfferSlotOccupied(offer.to_player));
    }
    ensure_cash(state, player, offer.cash_offered)?;

    state.players[offer.to_player].outstanding_trade_offer = Some(offer.clone());
    Ok(())
}

/// Applies the pending offer all at once, or not at all.
pub fn accept_trade_offer(state: &mut GameState, player: PlayerId) -> Result<(), ActionError> {
    let offer = state
        .active_player(player)?
        .outstanding_trade_offer
        .clone()
        .ok_or(ActionError::NoPendingOffer(player))?;
    if offer.to_player != player {
        return Err(ActionError::InvalidOffer("offer addressed to another player"));
    }
    validate_bundle(state, &offer)?;
    let net = offer.cash_offered - offer.cash_wanted;
    if net > 0 {
        ensure_cash(state, offer.from_player, net)?;
    } else if net < 0 {
        ensure_cash(state, player, -net)?;
    }

    if net != 0 {
        state.pay_player(offer.from_player, player, net);
    }
    for asset in &offer.property_set_offered {
        state.transfer_asset(*asset, Owner::Player(player));
    }
    for asset in &offer.property_set_wanted {
        state.transfer_asset(*asset, Owner::Player(offer.from_player));
    }
    state.players[player].outstanding_trade_offer = None;
    info!(
        from = offer.from_player,
        to = player,
        net_cash = net,
        offered = offer.property_set_offered.len(),
        wanted = offer.property_set_wanted.len(),
        "trade accepted"
    );
    Ok(())
}

pub fn reject_trade_offer(state: &mut GameState, player: PlayerId) -> Result<(), ActionError> {
    if state.player(player)?.outstanding_trade_offer.is_none() {
        return Err(ActionError::NoPendingOffer(player));
    }
    state.players[player].outstanding_trade_offer = None;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::actions;
    use crate::game::state::GameConfig;
    use crate::types::{ColorGroup, Improvement};

    fn state() -> GameState {
        GameState::new(GameConfig::default()).unwrap()
    }

    #[test]
    fn accepted_trade_swaps_bundles_and_nets_cash() {
        let mut state = state();
        let reading = state.board.find("Reading Railroad").unwrap();
        let boardwalk = state.board.find("Boardwalk").unwrap();
        state.transfer_asset(reading, Owner::Player(0));
        state.transfer_asset(boardwalk, Owner::Player(1));
        let total = state.total_cash();

        let offer = TradeOffer::new(0, 1)
            .offering(reading)
            .wanting(boardwalk)
            .with_cash(150, 20);
        make_trade_offer(&mut state, 0, &offer).unwrap();
        accept_trade_offer(&mut state, 1).unwrap();

        assert!(state.players[1].owns(reading));
        assert!(state.players[0].owns(boardwalk));
        assert_eq!(state.players[0].cash, 1370);
        assert_eq!(state.players[1].cash, 1630);
        assert_eq!(state.total_cash(), total);
        assert!(state.players[1].outstanding_trade_offer.is_none());
        assert!(state.check_invariants().is_ok());
    }

    #[test]
    fn second_offer_to_same_recipient_fails() {
        let mut state = state();
        make_trade_offer(&mut state, 0, &TradeOffer::new(0, 2).with_cash(10, 0)).unwrap();
        assert_eq!(
            make_trade_offer(&mut state, 1, &TradeOffer::new(1, 2).with_cash(20, 0)),
            Err(ActionError::OfferSlotOccupied(2))
        );
        assert_eq!(state.players[2].outstanding_trade_offer.as_ref().unwrap().from_player, 0);

        reject_trade_offer(&mut state, 2).unwrap();
        make_trade_offer(&mut state, 1, &TradeOffer::new(1, 2).with_cash(20, 0)).unwrap();
    }

    #[test]
    fn mortgaged_asset_cannot_be_traded() {
        let mut state = state();
        let reading = state.board.find("Reading Railroad").unwrap();
        state.transfer_asset(reading, Owner::Player(0));
        actions::mortgage_property(&mut state, 0, reading).unwrap();
        assert_eq!(
            make_trade_offer(&mut state, 0, &TradeOffer::new(0, 1).offering(reading)),
            Err(ActionError::Mortgaged(reading))
        );
    }

    #[test]
    fn acceptance_rechecks_everything() {
        let mut state = state();
        let reading = state.board.find("Reading Railroad").unwrap();
        state.transfer_asset(reading, Owner::Player(0));
        make_trade_offer(&mut state, 0, &TradeOffer::new(0, 1).offering(reading).with_cash(0, 200))
            .unwrap();
        actions::mortgage_property(&mut state, 0, reading).unwrap();

        let before = (state.players.clone(), state.board.locations.clone());
        assert_eq!(accept_trade_offer(&mut state, 1), Err(ActionError::Mortgaged(reading)));
        assert_eq!((state.players.clone(), state.board.locations.clone()), before);
        assert!(state.players[1].outstanding_trade_offer.is_some());
    }

    #[test]
    fn insolvent_recipient_cannot_accept() {
        let mut state = state();
        let reading = state.board.find("Reading Railroad").unwrap();
        state.transfer_asset(reading, Owner::Player(0));
        make_trade_offer(&mut state, 0, &TradeOffer::new(0, 1).offering(reading).with_cash(0, 500))
            .unwrap();
        state.players[1].cash = 499;
        assert!(matches!(
            accept_trade_offer(&mut state, 1),
            Err(ActionError::InsufficientCash { required: 500, .. })
        ));
        assert!(state.players[0].owns(reading));
    }

    #[test]
    fn improved_group_blocks_trade() {
        let mut state = state();
        let brown = state.board.color_group(ColorGroup::Brown).to_vec();
        for asset in &brown {
            state.transfer_asset(*asset, Owner::Player(0));
        }
        actions::improve_property(&mut state, 0, brown[0], Improvement::House).unwrap();
        assert_eq!(
            make_trade_offer(&mut state, 0, &TradeOffer::new(0, 1).offering(brown[1])),
            Err(ActionError::GroupImproved(brown[1]))
        );
    }

    #[test]
    fn malformed_offers_are_rejected() {
        let mut state = state();
        assert!(make_trade_offer(&mut state, 0, &TradeOffer::new(0, 1)).is_err());
        assert!(make_trade_offer(&mut state, 0, &TradeOffer::new(0, 0).with_cash(5, 0)).is_err());
        assert!(make_trade_offer(&mut state, 0, &TradeOffer::new(1, 2).with_cash(5, 0)).is_err());
        assert!(make_trade_offer(&mut state, 0, &TradeOffer::new(0, 1).with_cash(-5, 0)).is_err());
        assert_eq!(reject_trade_offer(&mut state, 1), Err(ActionError::NoPendingOffer(1)));
    }
}
