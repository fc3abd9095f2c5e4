//! The action library.
//!
//! Every function validates all of its preconditions before touching the
//! ledger, so an `Err` return always leaves cash, ownership and
//! improvements exactly as they were.

use tracing::debug;

use crate::board::{HOUSE_LIMIT_BEFORE_HOTEL, Owner};
use crate::game::action::SellPropertyOffer;
use crate::game::bank::BankError;
use crate::game::cards::Card;
use crate::game::state::GameState;
use crate::types::{ActionType, AssetId, Improvement, LocationClass, PlayerId};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ActionError {
    #[error("invalid player index {0}")]
    InvalidPlayer(PlayerId),
    #[error("player {0} is no longer in the game")]
    InactivePlayer(PlayerId),
    #[error("unknown asset {0}")]
    UnknownAsset(AssetId),
    #[error("asset {0} cannot be owned")]
    NotPurchasable(AssetId),
    #[error("asset {0} is not owned by the bank")]
    NotBankOwned(AssetId),
    #[error("asset {asset} is not owned by player {player}")]
    NotOwner { player: PlayerId, asset: AssetId },
    #[error("asset {0} is not real estate")]
    NotRealEstate(AssetId),
    #[error("asset {0} is mortgaged")]
    Mortgaged(AssetId),
    #[error("asset {0} is not mortgaged")]
    NotMortgaged(AssetId),
    #[error("asset {0} carries improvements")]
    Improved(AssetId),
    #[error("color group of asset {0} carries improvements")]
    GroupImproved(AssetId),
    #[error("player {player} does not hold the full color set of asset {asset}")]
    IncompleteColorSet { player: PlayerId, asset: AssetId },
    #[error("improving or selling on asset {0} breaks the uniform-improvement rule")]
    UnevenImprovement(AssetId),
    #[error("asset {0} cannot take that improvement")]
    ImprovementLimit(AssetId),
    #[error("asset {0} has no such improvement to sell")]
    NothingToSell(AssetId),
    #[error("insufficient cash: have {available}, need {required}")]
    InsufficientCash { available: i64, required: i64 },
    #[error(transparent)]
    Bank(#[from] BankError),
    #[error("player {0} already has a pending offer of that kind")]
    OfferSlotOccupied(PlayerId),
    #[error("player {0} has no pending offer of that kind")]
    NoPendingOffer(PlayerId),
    #[error("invalid offer: {0}")]
    InvalidOffer(&'static str),
    #[error("player {0} is not in jail")]
    NotInJail(PlayerId),
    #[error("player {0} holds no get-out-of-jail card")]
    NoJailCard(PlayerId),
    #[error("payload does not fit {0}")]
    PayloadMismatch(ActionType),
    #[error("{0} is not allowed right now")]
    NotAllowed(ActionType),
}

pub(crate) fn ensure_cash(
    state: &GameState,
    player: PlayerId,
    required: i64,
) -> Result<(), ActionError> {
    let available = state.players[player].cash;
    if available < required {
        return Err(ActionError::InsufficientCash {
            available,
            required,
        });
    }
    Ok(())
}

/// Buys a bank-owned asset at list price.
///
/// When the buyer cannot pay, the asset is flagged for auction
/// (`GameState::pending_auction`) and the call fails.
pub fn buy_property(
    state: &mut GameState,
    player: PlayerId,
    asset: AssetId,
) -> Result<(), ActionError> {
    state.active_player(player)?;
    let location = state.location(asset)?;
    if !location.is_purchasable() {
        return Err(ActionError::NotPurchasable(asset));
    }
    if location.owned_by != Owner::Bank {
        return Err(ActionError::NotBankOwned(asset));
    }
    let price = location.price;
    if let Err(err) = ensure_cash(state, player, price) {
        debug!(player, asset, price, "cannot afford property, sending to auction");
        state.pending_auction = Some(asset);
        return Err(err);
    }

    state.pay_bank(player, price);
    state.transfer_asset(asset, Owner::Player(player));
    state.players[player].option_to_buy = None;
    Ok(())
}

pub fn validate_mortgage(
    state: &GameState,
    player: PlayerId,
    asset: AssetId,
) -> Result<i64, ActionError> {
    state.active_player(player)?;
    let location = state.owned_location(player, asset)?;
    if location.is_mortgaged {
        return Err(ActionError::Mortgaged(asset));
    }
    if location.is_improved() {
        return Err(ActionError::Improved(asset));
    }
    if !state.bank.can_dispense(location.mortgage) {
        return Err(BankError::InsufficientCash {
            available: state.bank.cash(),
            requested: location.mortgage,
        }
        .into());
    }
    Ok(location.mortgage)
}

pub fn mortgage_property(
    state: &mut GameState,
    player: PlayerId,
    asset: AssetId,
) -> Result<(), ActionError> {
    let amount = validate_mortgage(state, player, asset)?;

    state.bank_pays(player, amount)?;
    state.board.locations[asset].is_mortgaged = true;
    state.players[player].mortgaged_assets.insert(asset);
    Ok(())
}

/// Returns the payoff, mortgage plus interest.
pub fn validate_free_mortgage(
    state: &GameState,
    player: PlayerId,
    asset: AssetId,
) -> Result<i64, ActionError> {
    state.active_player(player)?;
    let location = state.owned_location(player, asset)?;
    if !location.is_mortgaged {
        return Err(ActionError::NotMortgaged(asset));
    }
    let payoff = state.bank.mortgage_payoff(location.mortgage);
    ensure_cash(state, player, payoff)?;
    Ok(payoff)
}

pub fn free_mortgage(
    state: &mut GameState,
    player: PlayerId,
    asset: AssetId,
) -> Result<(), ActionError> {
    let payoff = validate_free_mortgage(state, player, asset)?;

    state.pay_bank(player, payoff);
    state.board.locations[asset].is_mortgaged = false;
    state.players[player].mortgaged_assets.remove(&asset);
    Ok(())
}

/// Improvement levels of `asset`'s siblings.
fn sibling_levels(state: &GameState, asset: AssetId) -> Vec<u8> {
    state
        .board
        .siblings(asset)
        .into_iter()
        .map(|idx| state.board.locations[idx].improvement_level())
        .collect()
}

/// Checks an improvement purchase and returns its cost.
pub fn validate_improvement(
    state: &GameState,
    player: PlayerId,
    asset: AssetId,
    improvement: Improvement,
) -> Result<i64, ActionError> {
    state.active_player(player)?;
    let location = state.owned_location(player, asset)?;
    if location.class != LocationClass::RealEstate {
        return Err(ActionError::NotRealEstate(asset));
    }
    let has_set = location
        .color
        .map(|color| state.players[player].full_color_sets.contains(&color))
        .unwrap_or(false);
    if !has_set {
        return Err(ActionError::IncompleteColorSet { player, asset });
    }
    if location.is_mortgaged {
        return Err(ActionError::Mortgaged(asset));
    }
    let level = location.improvement_level();
    let siblings = sibling_levels(state, asset);

    match improvement {
        Improvement::House => {
            if location.num_hotels > 0 || location.num_houses >= HOUSE_LIMIT_BEFORE_HOTEL {
                return Err(ActionError::ImprovementLimit(asset));
            }
            if siblings.iter().any(|sibling| *sibling < level) {
                return Err(ActionError::UnevenImprovement(asset));
            }
            if state.bank.houses() == 0 {
                return Err(BankError::NoHouses.into());
            }
        }
        Improvement::Hotel => {
            if location.num_hotels > 0 || location.num_houses != HOUSE_LIMIT_BEFORE_HOTEL {
                return Err(ActionError::ImprovementLimit(asset));
            }
            if siblings.iter().any(|sibling| *sibling < HOUSE_LIMIT_BEFORE_HOTEL) {
                return Err(ActionError::UnevenImprovement(asset));
            }
            if state.bank.hotels() == 0 {
                return Err(BankError::NoHotels.into());
            }
        }
    }
    ensure_cash(state, player, location.price_per_house)?;
    Ok(location.price_per_house)
}

pub fn improve_property(
    state: &mut GameState,
    player: PlayerId,
    asset: AssetId,
    improvement: Improvement,
) -> Result<(), ActionError> {
    let cost = validate_improvement(state, player, asset, improvement)?;

    match improvement {
        Improvement::House => {
            state.bank.take_house()?;
            state.pay_bank(player, cost);
            state.board.locations[asset].num_houses += 1;
            state.players[player].num_total_houses += 1;
        }
        Improvement::Hotel => {
            state.bank.take_hotel()?;
            state.bank.return_houses(HOUSE_LIMIT_BEFORE_HOTEL as u32);
            state.pay_bank(player, cost);
            let location = &mut state.board.locations[asset];
            location.num_houses = 0;
            location.num_hotels = 1;
            let ledger = &mut state.players[player];
            ledger.num_total_houses -= HOUSE_LIMIT_BEFORE_HOTEL as u32;
            ledger.num_total_hotels += 1;
        }
    }
    Ok(())
}

/// Checks the sale of one house or hotel and returns the proceeds.
pub fn validate_improvement_sale(
    state: &GameState,
    player: PlayerId,
    asset: AssetId,
    improvement: Improvement,
) -> Result<i64, ActionError> {
    state.active_player(player)?;
    let location = state.owned_location(player, asset)?;
    if location.class != LocationClass::RealEstate {
        return Err(ActionError::NotRealEstate(asset));
    }
    let level = location.improvement_level();
    if sibling_levels(state, asset).iter().any(|sibling| *sibling > level) {
        return Err(ActionError::UnevenImprovement(asset));
    }
    let proceeds = match improvement {
        Improvement::House => {
            if location.num_hotels > 0 || location.num_houses == 0 {
                return Err(ActionError::NothingToSell(asset));
            }
            state.bank.house_sale_value(location.price_per_house)
        }
        Improvement::Hotel => {
            if location.num_hotels == 0 {
                return Err(ActionError::NothingToSell(asset));
            }
            if state.bank.houses() < HOUSE_LIMIT_BEFORE_HOTEL as u32 {
                return Err(BankError::NoHouses.into());
            }
            state.bank.hotel_sale_value(location.price_per_house)
        }
    };
    if !state.bank.can_dispense(proceeds) {
        return Err(BankError::InsufficientCash {
            available: state.bank.cash(),
            requested: proceeds,
        }
        .into());
    }
    Ok(proceeds)
}

/// Sells one house, or trades a hotel back down to four houses.
pub fn sell_house_hotel(
    state: &mut GameState,
    player: PlayerId,
    asset: AssetId,
    improvement: Improvement,
) -> Result<(), ActionError> {
    let proceeds = validate_improvement_sale(state, player, asset, improvement)?;

    match improvement {
        Improvement::House => {
            state.bank_pays(player, proceeds)?;
            state.bank.return_houses(1);
            state.board.locations[asset].num_houses -= 1;
            state.players[player].num_total_houses -= 1;
        }
        Improvement::Hotel => {
            state.bank.take_houses(HOUSE_LIMIT_BEFORE_HOTEL as u32)?;
            state.bank_pays(player, proceeds)?;
            state.bank.return_hotels(1);
            let location = &mut state.board.locations[asset];
            location.num_hotels = 0;
            location.num_houses = HOUSE_LIMIT_BEFORE_HOTEL;
            let ledger = &mut state.players[player];
            ledger.num_total_hotels -= 1;
            ledger.num_total_houses += HOUSE_LIMIT_BEFORE_HOTEL as u32;
        }
    }
    Ok(())
}

/// Cash the bank pays for `asset`; negative when the outstanding mortgage exceeds the sale value.
pub fn property_sale_proceeds(state: &GameState, asset: AssetId) -> i64 {
    let location = &state.board.locations[asset];
    let value = state.bank.property_sale_value(location.price);
    if location.is_mortgaged {
        value - location.mortgage
    } else {
        value
    }
}

pub fn validate_property_sale(
    state: &GameState,
    player: PlayerId,
    asset: AssetId,
) -> Result<i64, ActionError> {
    state.active_player(player)?;
    let location = state.owned_location(player, asset)?;
    if location.is_improved() {
        return Err(ActionError::Improved(asset));
    }
    if state.group_is_improved(asset) {
        return Err(ActionError::GroupImproved(asset));
    }
    let proceeds = property_sale_proceeds(state, asset);
    if proceeds >= 0 {
        if !state.bank.can_dispense(proceeds) {
            return Err(BankError::InsufficientCash {
                available: state.bank.cash(),
                requested: proceeds,
            }
            .into());
        }
    } else {
        ensure_cash(state, player, -proceeds)?;
    }
    Ok(proceeds)
}

/// Sells an asset back to the bank. Not allowed while anything in its color group is improved.
pub fn sell_property(
    state: &mut GameState,
    player: PlayerId,
    asset: AssetId,
) -> Result<(), ActionError> {
    let proceeds = validate_property_sale(state, player, asset)?;
    if proceeds >= 0 {
        state.bank_pays(player, proceeds)?;
    } else {
        state.pay_bank(player, -proceeds);
    }
    state.transfer_asset(asset, Owner::Bank);
    Ok(())
}

/// An asset may change hands between players only while it and its whole color group are bare.
pub fn ensure_tradeable(
    state: &GameState,
    owner: PlayerId,
    asset: AssetId,
) -> Result<(), ActionError> {
    let location = state.owned_location(owner, asset)?;
    if location.is_mortgaged {
        return Err(ActionError::Mortgaged(asset));
    }
    if location.is_improved() {
        return Err(ActionError::Improved(asset));
    }
    if state.group_is_improved(asset) {
        return Err(ActionError::GroupImproved(asset));
    }
    Ok(())
}

pub fn make_sell_property_offer(
    state: &mut GameState,
    player: PlayerId,
    asset: AssetId,
    to_player: PlayerId,
    price: i64,
) -> Result<(), ActionError> {
    state.active_player(player)?;
    if to_player == player {
        return Err(ActionError::InvalidOffer("cannot offer to yourself"));
    }
    if price < 0 {
        return Err(ActionError::InvalidOffer("negative price"));
    }
    let recipient = state.active_player(to_player)?;
    if recipient.outstanding_sell_offer.is_some() {
        return Err(ActionError::OfferSlotOccupied(to_player));
    }
    ensure_tradeable(state, player, asset)?;

    state.players[to_player].outstanding_sell_offer = Some(SellPropertyOffer {
        from_player: player,
        asset,
        price,
    });
    Ok(())
}

pub fn accept_sell_property_offer(
    state: &mut GameState,
    player: PlayerId,
) -> Result<(), ActionError> {
    let offer = state
        .active_player(player)?
        .outstanding_sell_offer
        .clone()
        .ok_or(ActionError::NoPendingOffer(player))?;
    state.active_player(offer.from_player)?;
    ensure_tradeable(state, offer.from_player, offer.asset)?;
    ensure_cash(state, player, offer.price)?;

    state.pay_player(player, offer.from_player, offer.price);
    state.transfer_asset(offer.asset, Owner::Player(player));
    state.players[player].outstanding_sell_offer = None;
    Ok(())
}

pub fn reject_sell_property_offer(
    state: &mut GameState,
    player: PlayerId,
) -> Result<(), ActionError> {
    if state.player(player)?.outstanding_sell_offer.is_none() {
        return Err(ActionError::NoPendingOffer(player));
    }
    state.players[player].outstanding_sell_offer = None;
    Ok(())
}

pub fn pay_jail_fine(state: &mut GameState, player: PlayerId) -> Result<(), ActionError> {
    if !state.active_player(player)?.currently_in_jail {
        return Err(ActionError::NotInJail(player));
    }
    let fine = state.bank.jail_fine;
    ensure_cash(state, player, fine)?;

    state.pay_bank(player, fine);
    state.players[player].release_from_jail();
    Ok(())
}

pub fn use_get_out_of_jail_card(
    state: &mut GameState,
    player: PlayerId,
) -> Result<(), ActionError> {
    let ledger = state.active_player(player)?;
    if !ledger.currently_in_jail {
        return Err(ActionError::NotInJail(player));
    }
    let pack = *ledger
        .jail_cards
        .iter()
        .next()
        .ok_or(ActionError::NoJailCard(player))?;

    let ledger = &mut state.players[player];
    ledger.jail_cards.remove(&pack);
    ledger.release_from_jail();
    state.decks.return_card(pack, Card::GetOutOfJailFree);
    Ok(())
}
