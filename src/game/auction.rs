//! Ascending auction for bank-owned property nobody bought outright.

use std::collections::VecDeque;

use serde_json::json;
use tracing::info;

use crate::board::Owner;
use crate::game::history::Function;
use crate::game::state::{GameError, GameState};
use crate::players::BasePlayer;
use crate::types::{AssetId, PlayerId, ReturnCode};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuctionResult {
    pub winner: PlayerId,
    pub price: i64,
}

/// Auctions `asset`, starting with the next active player after `trigger`.
///
/// A bid must beat the standing bid and be covered by the bidder's cash;
/// anything else drops the bidder out for good. Returns `None` when nobody
/// bid and the asset stays with the bank.
pub fn run_auction<P: BasePlayer>(
    state: &mut GameState,
    players: &mut [P],
    asset: AssetId,
    trigger: PlayerId,
) -> Result<Option<AuctionResult>, GameError> {
    let mut bidders: VecDeque<PlayerId> = state.rotation_after(trigger).into();
    let mut current_bid = 0;
    let mut leader: Option<PlayerId> = None;

    while let Some(bidder) = bidders.pop_front() {
        if leader == Some(bidder) && bidders.is_empty() {
            break;
        }
        let bid = players[bidder].make_bid(bidder, state, asset, current_bid);
        if bid > current_bid && state.players[bidder].can_afford(bid) {
            current_bid = bid;
            leader = Some(bidder);
            bidders.push_back(bidder);
        }
    }

    let result = match leader {
        Some(winner) if current_bid > 0 => {
            state.pay_bank(winner, current_bid);
            state.transfer_asset(asset, Owner::Player(winner));
            info!(asset, winner, price = current_bid, "auction won");
            Some(AuctionResult {
                winner,
                price: current_bid,
            })
        }
        _ => {
            info!(asset, "auction closed without bids");
            None
        }
    };
    state.record(
        result.map(|r| r.winner),
        Function::Auction,
        json!({ "asset": asset, "trigger": trigger, "price": current_bid }),
        if result.is_some() {
            ReturnCode::Success
        } else {
            ReturnCode::Failure
        },
        None,
    );
    state.check_invariants()?;
    Ok(result)
}
