use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::game::action::{SellPropertyOffer, TradeOffer};
use crate::types::{AssetId, CardPack, ColorGroup, PlayerStatus};

/// Per-player ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    pub name: String,
    pub status: PlayerStatus,
    pub cash: i64,
    pub position: usize,
    pub assets: BTreeSet<AssetId>,
    pub mortgaged_assets: BTreeSet<AssetId>,
    pub full_color_sets: BTreeSet<ColorGroup>,
    pub num_total_houses: u32,
    pub num_total_hotels: u32,
    pub currently_in_jail: bool,
    pub jail_rolls: u8,
    pub jail_cards: BTreeSet<CardPack>,
    pub option_to_buy: Option<AssetId>,
    pub outstanding_sell_offer: Option<SellPropertyOffer>,
    pub outstanding_trade_offer: Option<TradeOffer>,
}

impl PlayerState {
    pub fn new(name: impl Into<String>, cash: i64) -> Self {
        Self {
            name: name.into(),
            status: PlayerStatus::WaitingForMove,
            cash,
            position: 0,
            assets: BTreeSet::new(),
            mortgaged_assets: BTreeSet::new(),
            full_color_sets: BTreeSet::new(),
            num_total_houses: 0,
            num_total_hotels: 0,
            currently_in_jail: false,
            jail_rolls: 0,
            jail_cards: BTreeSet::new(),
            option_to_buy: None,
            outstanding_sell_offer: None,
            outstanding_trade_offer: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status != PlayerStatus::Lost
    }

    pub fn owns(&self, asset: AssetId) -> bool {
        self.assets.contains(&asset)
    }

    pub fn can_afford(&self, amount: i64) -> bool {
        self.cash >= amount
    }

    pub fn has_jail_card(&self) -> bool {
        !self.jail_cards.is_empty()
    }

    pub fn has_pending_offer(&self) -> bool {
        self.outstanding_sell_offer.is_some() || self.outstanding_trade_offer.is_some()
    }

    /// Clears both incoming offer slots; returns whether anything was pending.
    pub fn reject_pending_offers(&mut self) -> bool {
        let had_offer = self.has_pending_offer();
        self.outstanding_sell_offer = None;
        self.outstanding_trade_offer = None;
        had_offer
    }

    pub fn send_to_jail(&mut self, jail_position: usize) {
        self.position = jail_position;
        self.currently_in_jail = true;
        self.jail_rolls = 0;
    }

    pub fn release_from_jail(&mut self) {
        self.currently_in_jail = false;
        self.jail_rolls = 0;
    }
}
