use serde::{Deserialize, Serialize};

use crate::game::action::GameAction;
use crate::game::allowable::AllowableMoves;
use crate::game::state::GameState;
use crate::types::{AssetId, PlayerId, ReturnCode};

/// How a player wants to cover a negative cash balance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum NegativeCashResponse {
    /// Let the engine run the standard liquidation cascade.
    #[default]
    Liquidate,
    /// Execute these actions first; the cascade covers any remaining deficit.
    Moves(Vec<GameAction>),
    DeclareBankruptcy,
}

/// A decision maker seated at the table.
///
/// The engine only ever hands out a shared view of the state; every change
/// goes through the actions a player returns. `last` is the return code of
/// the player's previous move in the same phase.
pub trait BasePlayer {
    fn make_pre_roll_move(
        &mut self,
        player: PlayerId,
        state: &GameState,
        allowable: &AllowableMoves,
        last: Option<ReturnCode>,
    ) -> GameAction;

    fn make_out_of_turn_move(
        &mut self,
        player: PlayerId,
        state: &GameState,
        allowable: &AllowableMoves,
        last: Option<ReturnCode>,
    ) -> GameAction;

    fn make_post_roll_move(
        &mut self,
        player: PlayerId,
        state: &GameState,
        allowable: &AllowableMoves,
        last: Option<ReturnCode>,
    ) -> GameAction;

    fn make_buy_property_decision(
        &mut self,
        player: PlayerId,
        state: &GameState,
        asset: AssetId,
    ) -> bool;

    /// A bid not above `current_bid` withdraws from the auction.
    fn make_bid(
        &mut self,
        player: PlayerId,
        state: &GameState,
        asset: AssetId,
        current_bid: i64,
    ) -> i64;

    fn handle_negative_cash_balance(
        &mut self,
        _player: PlayerId,
        _state: &GameState,
    ) -> NegativeCashResponse {
        NegativeCashResponse::Liquidate
    }
}

impl<P: BasePlayer + ?Sized> BasePlayer for Box<P> {
    fn make_pre_roll_move(
        &mut self,
        player: PlayerId,
        state: &GameState,
        allowable: &AllowableMoves,
        last: Option<ReturnCode>,
    ) -> GameAction {
        (**self).make_pre_roll_move(player, state, allowable, last)
    }

    fn make_out_of_turn_move(
        &mut self,
        player: PlayerId,
        state: &GameState,
        allowable: &AllowableMoves,
        last: Option<ReturnCode>,
    ) -> GameAction {
        (**self).make_out_of_turn_move(player, state, allowable, last)
    }

    fn make_post_roll_move(
        &mut self,
        player: PlayerId,
        state: &GameState,
        allowable: &AllowableMoves,
        last: Option<ReturnCode>,
    ) -> GameAction {
        (**self).make_post_roll_move(player, state, allowable, last)
    }

    fn make_buy_property_decision(
        &mut self,
        player: PlayerId,
        state: &GameState,
        asset: AssetId,
    ) -> bool {
        (**self).make_buy_property_decision(player, state, asset)
    }

    fn make_bid(
        &mut self,
        player: PlayerId,
        state: &GameState,
        asset: AssetId,
        current_bid: i64,
    ) -> i64 {
        (**self).make_bid(player, state, asset, current_bid)
    }

    fn handle_negative_cash_balance(
        &mut self,
        player: PlayerId,
        state: &GameState,
    ) -> NegativeCashResponse {
        (**self).handle_negative_cash_balance(player, state)
    }
}
