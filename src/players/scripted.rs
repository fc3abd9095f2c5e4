use std::collections::VecDeque;

use crate::game::action::GameAction;
use crate::game::allowable::AllowableMoves;
use crate::game::state::GameState;
use crate::players::{BasePlayer, NegativeCashResponse};
use crate::types::{ActionType, AssetId, PlayerId, ReturnCode};

/// Replays queued moves, bids and purchase decisions, for driving the engine
/// deterministically. With nothing queued it skips when it may and concludes
/// otherwise.
#[derive(Debug, Clone, Default)]
pub struct ScriptedPlayer {
    moves: VecDeque<GameAction>,
    bids: VecDeque<i64>,
    buy_decisions: VecDeque<bool>,
    negative_cash: NegativeCashResponse,
    always_conclude: bool,
    codes_seen: Vec<Option<ReturnCode>>,
    bids_seen: Vec<i64>,
}

impl ScriptedPlayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queue_move(&mut self, action: GameAction) {
        self.moves.push_back(action);
    }

    pub fn with_moves(mut self, moves: impl IntoIterator<Item = GameAction>) -> Self {
        self.moves.extend(moves);
        self
    }

    pub fn with_bids(mut self, bids: impl IntoIterator<Item = i64>) -> Self {
        self.bids.extend(bids);
        self
    }

    pub fn with_buy_decisions(mut self, decisions: impl IntoIterator<Item = bool>) -> Self {
        self.buy_decisions.extend(decisions);
        self
    }

    pub fn with_negative_cash_response(mut self, response: NegativeCashResponse) -> Self {
        self.negative_cash = response;
        self
    }

    pub fn declare_bankruptcy_when_broke(self) -> Self {
        self.with_negative_cash_response(NegativeCashResponse::DeclareBankruptcy)
    }

    /// Never skips, so every phase this player takes part in resets the out-of-turn count.
    pub fn always_conclude(mut self) -> Self {
        self.always_conclude = true;
        self
    }

    /// Return codes handed in with each move request, in order.
    pub fn codes_seen(&self) -> &[Option<ReturnCode>] {
        &self.codes_seen
    }

    /// Standing bid at each bid request, in order.
    pub fn bids_seen(&self) -> &[i64] {
        &self.bids_seen
    }

    fn next_move(
        &mut self,
        player: PlayerId,
        allowable: &AllowableMoves,
        last: Option<ReturnCode>,
    ) -> GameAction {
        self.codes_seen.push(last);
        if let Some(action) = self.moves.pop_front() {
            return action;
        }
        if !self.always_conclude && allowable.contains(ActionType::Skip) {
            GameAction::skip(player)
        } else {
            GameAction::conclude(player)
        }
    }
}

impl BasePlayer for ScriptedPlayer {
    fn make_pre_roll_move(
        &mut self,
        player: PlayerId,
        _state: &GameState,
        allowable: &AllowableMoves,
        last: Option<ReturnCode>,
    ) -> GameAction {
        self.next_move(player, allowable, last)
    }

    fn make_out_of_turn_move(
        &mut self,
        player: PlayerId,
        _state: &GameState,
        allowable: &AllowableMoves,
        last: Option<ReturnCode>,
    ) -> GameAction {
        self.next_move(player, allowable, last)
    }

    fn make_post_roll_move(
        &mut self,
        player: PlayerId,
        _state: &GameState,
        allowable: &AllowableMoves,
        last: Option<ReturnCode>,
    ) -> GameAction {
        self.next_move(player, allowable, last)
    }

    fn make_buy_property_decision(
        &mut self,
        _player: PlayerId,
        _state: &GameState,
        _asset: AssetId,
    ) -> bool {
        self.buy_decisions.pop_front().unwrap_or(false)
    }

    fn make_bid(
        &mut self,
        _player: PlayerId,
        _state: &GameState,
        _asset: AssetId,
        current_bid: i64,
    ) -> i64 {
        self.bids_seen.push(current_bid);
        self.bids.pop_front().unwrap_or(0)
    }

    fn handle_negative_cash_balance(
        &mut self,
        _player: PlayerId,
        _state: &GameState,
    ) -> NegativeCashResponse {
        self.negative_cash.clone()
    }
}
