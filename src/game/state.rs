use std::collections::BTreeSet;
use std::path::Path;

use rand::{SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};

use crate::board::{Board, HOUSE_LIMIT_BEFORE_HOTEL, Location, Owner};
use crate::types::{
    AssetId, CardPack, ColorGroup, LocationClass, PlayerId, PlayerStatus, ReturnCode,
};

use super::{
    actions::ActionError,
    bank::{Bank, BankError},
    cards::{Card, CardDecks},
    history::{Function, History},
    players::PlayerState,
    rules::RuleBook,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub num_players: usize,
    pub seed: u64,
    pub starting_cash: i64,
    pub go_increment: i64,
    pub jail_fine: i64,
    pub bank_cash: i64,
    pub total_houses: u32,
    pub total_hotels: u32,
    pub mortgage_rate: f64,
    pub property_sell_percentage: f64,
    pub house_sell_percentage: f64,
    pub hotel_sell_percentage: f64,
    pub monopoly_rent_factor: i64,
    pub railroad_dues: [i64; 4],
    pub utility_multipliers: [i64; 2],
    pub max_actions_per_phase: u32,
    pub max_out_of_turn_laps: u32,
    pub runaway_cash_threshold: i64,
    pub turns_limit: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            num_players: 4,
            seed: 42,
            starting_cash: 1500,
            go_increment: 200,
            jail_fine: 50,
            bank_cash: 100_000,
            total_houses: 32,
            total_hotels: 12,
            mortgage_rate: 0.1,
            property_sell_percentage: 0.5,
            house_sell_percentage: 0.5,
            hotel_sell_percentage: 0.5,
            monopoly_rent_factor: 2,
            railroad_dues: [25, 50, 100, 200],
            utility_multipliers: [4, 10],
            max_actions_per_phase: 50,
            max_out_of_turn_laps: 200,
            runaway_cash_threshold: 300_000,
            turns_limit: 1000,
        }
    }
}

impl GameConfig {
    pub fn from_json_str(text: &str) -> Result<Self, GameError> {
        let config: GameConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, GameError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> Result<(), GameError> {
        if !(2..=8).contains(&self.num_players) {
            return Err(GameError::InvalidConfig(format!(
                "num_players must be 2..=8, got {}",
                self.num_players
            )));
        }
        if self.max_actions_per_phase == 0 {
            return Err(GameError::InvalidConfig(
                "max_actions_per_phase must be positive".into(),
            ));
        }
        if self.starting_cash < 0 || self.bank_cash < 0 {
            return Err(GameError::InvalidConfig("cash pools must be non-negative".into()));
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GameError {
    #[error("game already completed")]
    GameFinished,
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("expected {expected} agents, got {actual}")]
    AgentCountMismatch { expected: usize, actual: usize },
    #[error("ledger invariant violated: {0}")]
    InvariantViolation(#[from] InvariantViolation),
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse configuration: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvariantViolation {
    #[error("asset {asset} owned by {owner:?} but ledgers disagree")]
    OwnershipMismatch { asset: AssetId, owner: Owner },
    #[error("asset {asset} claimed by more than one player")]
    MultipleOwners { asset: AssetId },
    #[error("player {player} mortgage set out of sync for asset {asset}")]
    MortgageMismatch { player: PlayerId, asset: AssetId },
    #[error("asset {asset} carries illegal improvements")]
    IllegalImprovement { asset: AssetId },
    #[error("player {player} house/hotel aggregate does not match assets")]
    ImprovementTotals { player: PlayerId },
    #[error("{color} violates the uniform-improvement rule")]
    UnevenColorGroup { color: ColorGroup },
    #[error("player {player} full color set record is stale")]
    StaleColorSets { player: PlayerId },
    #[error("lost player {player} still holds cash or assets")]
    LostPlayerHoldings { player: PlayerId },
    #[error("{count} players hold the current move")]
    CurrentMoveCount { count: usize },
    #[error("player {player} holds the current move out of turn")]
    CurrentMoveHolder { player: PlayerId },
    #[error("houses or hotels were created or destroyed")]
    ImprovementSupply,
}

/// The shared game context handed to every action, query and agent.
#[derive(Debug, Clone)]
pub struct GameState {
    pub config: GameConfig,
    pub board: Board,
    pub players: Vec<PlayerState>,
    pub bank: Bank,
    pub decks: CardDecks,
    pub history: History,
    pub rules: RuleBook,
    pub turn: u32,
    pub current_player: PlayerId,
    pub last_roll: Option<(u8, u8)>,
    /// Set by `buy_property` when the buyer cannot pay; the engine auctions it next.
    pub pending_auction: Option<AssetId>,
    rng: StdRng,
}

impl GameState {
    pub fn new(config: GameConfig) -> Result<Self, GameError> {
        Self::with_board(config, Board::standard())
    }

    pub fn with_board(config: GameConfig, board: Board) -> Result<Self, GameError> {
        config.validate()?;
        let mut rng = StdRng::seed_from_u64(config.seed);
        let decks = CardDecks::standard(&mut rng);
        let players = (0..config.num_players)
            .map(|idx| PlayerState::new(format!("player_{}", idx + 1), config.starting_cash))
            .collect();
        Ok(Self {
            bank: Bank::from_config(&config),
            board,
            players,
            decks,
            history: History::new(),
            rules: RuleBook::standard(),
            turn: 0,
            current_player: 0,
            last_roll: None,
            pending_auction: None,
            rng,
            config,
        })
    }

    pub fn rng_mut(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    // --- lookups ---------------------------------------------------------

    pub fn player(&self, player: PlayerId) -> Result<&PlayerState, ActionError> {
        self.players
            .get(player)
            .ok_or(ActionError::InvalidPlayer(player))
    }

    pub fn active_player(&self, player: PlayerId) -> Result<&PlayerState, ActionError> {
        let state = self.player(player)?;
        if !state.is_active() {
            return Err(ActionError::InactivePlayer(player));
        }
        Ok(state)
    }

    pub fn location(&self, asset: AssetId) -> Result<&Location, ActionError> {
        self.board
            .locations
            .get(asset)
            .ok_or(ActionError::UnknownAsset(asset))
    }

    pub fn owned_location(
        &self,
        player: PlayerId,
        asset: AssetId,
    ) -> Result<&Location, ActionError> {
        let location = self.location(asset)?;
        if location.owned_by != Owner::Player(player) {
            return Err(ActionError::NotOwner { player, asset });
        }
        Ok(location)
    }

    pub fn num_active_players(&self) -> usize {
        self.players.iter().filter(|p| p.is_active()).count()
    }

    pub fn active_player_ids(&self) -> impl Iterator<Item = PlayerId> + '_ {
        self.players
            .iter()
            .enumerate()
            .filter(|(_, p)| p.is_active())
            .map(|(idx, _)| idx)
    }

    /// Next active player in seating order after `player`, wrapping around.
    pub fn next_active_after(&self, player: PlayerId) -> Option<PlayerId> {
        let n = self.players.len();
        (1..=n)
            .map(|offset| (player + offset) % n)
            .find(|idx| self.players[*idx].is_active())
    }

    /// Active players in rotation order starting right after `player`; `player` comes last.
    pub fn rotation_after(&self, player: PlayerId) -> Vec<PlayerId> {
        let n = self.players.len();
        (1..=n)
            .map(|offset| (player + offset) % n)
            .filter(|idx| self.players[*idx].is_active())
            .collect()
    }

    pub fn group_is_improved(&self, asset: AssetId) -> bool {
        match self.board.locations.get(asset).and_then(|l| l.color) {
            Some(color) => self
                .board
                .color_group(color)
                .iter()
                .any(|idx| self.board.locations[*idx].is_improved()),
            None => false,
        }
    }

    pub fn total_cash(&self) -> i64 {
        self.bank.cash() + self.players.iter().map(|p| p.cash).sum::<i64>()
    }

    pub fn net_worth(&self, player: PlayerId) -> i64 {
        let Some(state) = self.players.get(player) else {
            return 0;
        };
        let holdings: i64 = state
            .assets
            .iter()
            .filter_map(|asset| self.board.locations.get(*asset))
            .map(|location| {
                let equity = if location.is_mortgaged {
                    location.price - location.mortgage
                } else {
                    location.price
                };
                let improvements = location.num_houses as i64 * location.price_per_house
                    + location.num_hotels as i64
                        * location.price_per_house
                        * (HOUSE_LIMIT_BEFORE_HOTEL as i64 + 1);
                equity + improvements
            })
            .sum();
        state.cash + holdings
    }

    pub fn dues(&self, asset: AssetId, die_total: u8) -> i64 {
        let Some(location) = self.board.locations.get(asset) else {
            return 0;
        };
        match location.class {
            LocationClass::RealEstate => (self.rules.real_estate_rent)(self, asset, die_total),
            LocationClass::Railroad => (self.rules.railroad_dues)(self, asset, die_total),
            LocationClass::Utility => (self.rules.utility_dues)(self, asset, die_total),
            LocationClass::Tax => location.tax,
            LocationClass::Action | LocationClass::DoNothing => 0,
        }
    }

    // --- ledger primitives -----------------------------------------------

    /// Moves `asset` to `to`, keeping both owners' asset, mortgage and
    /// color-set records in step. Assets returning to the bank are
    /// unmortgaged.
    pub fn transfer_asset(&mut self, asset: AssetId, to: Owner) {
        let Some(location) = self.board.locations.get_mut(asset) else {
            return;
        };
        let from = location.owned_by;
        location.owned_by = to;
        if to == Owner::Bank {
            location.is_mortgaged = false;
        }
        let mortgaged = location.is_mortgaged;

        if let Owner::Player(idx) = from {
            let player = &mut self.players[idx];
            player.assets.remove(&asset);
            player.mortgaged_assets.remove(&asset);
            self.refresh_color_sets(idx);
        }
        if let Owner::Player(idx) = to {
            let player = &mut self.players[idx];
            player.assets.insert(asset);
            if mortgaged {
                player.mortgaged_assets.insert(asset);
            }
            self.refresh_color_sets(idx);
        }
    }

    pub fn full_color_sets_of(&self, player: PlayerId) -> BTreeSet<ColorGroup> {
        self.board
            .colors()
            .filter(|color| {
                self.board
                    .color_group(*color)
                    .iter()
                    .all(|idx| self.board.locations[*idx].owned_by == Owner::Player(player))
            })
            .collect()
    }

    pub fn refresh_color_sets(&mut self, player: PlayerId) {
        let sets = self.full_color_sets_of(player);
        self.players[player].full_color_sets = sets;
    }

    /// Player-to-bank payment; the player's cash may go negative.
    pub fn pay_bank(&mut self, player: PlayerId, amount: i64) {
        self.players[player].cash -= amount;
        self.bank.receive(amount);
    }

    /// Player-to-player payment; the payer's cash may go negative.
    pub fn pay_player(&mut self, from: PlayerId, to: PlayerId, amount: i64) {
        self.players[from].cash -= amount;
        self.players[to].cash += amount;
    }

    pub fn bank_pays(&mut self, player: PlayerId, amount: i64) -> Result<(), BankError> {
        self.bank.dispense(amount)?;
        self.players[player].cash += amount;
        Ok(())
    }

    pub fn roll_dice(&mut self) -> (u8, u8) {
        let roll = (self.rules.roll_die)(self);
        self.last_roll = Some(roll);
        roll
    }

    pub fn draw_card(&mut self, pack: CardPack) -> Option<Card> {
        self.decks.draw(pack)
    }

    pub fn record(
        &mut self,
        player: Option<PlayerId>,
        function: Function,
        params: serde_json::Value,
        result: ReturnCode,
        detail: Option<String>,
    ) {
        self.history
            .record(self.turn, player, function, params, result, detail);
    }

    // --- invariants ------------------------------------------------------

    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        let mut claimed: Vec<Option<PlayerId>> = vec![None; self.board.locations.len()];
        for (idx, player) in self.players.iter().enumerate() {
            for asset in &player.assets {
                let Some(location) = self.board.locations.get(*asset) else {
                    return Err(InvariantViolation::OwnershipMismatch {
                        asset: *asset,
                        owner: Owner::Player(idx),
                    });
                };
                if claimed[*asset].is_some() {
                    return Err(InvariantViolation::MultipleOwners { asset: *asset });
                }
                claimed[*asset] = Some(idx);
                if location.owned_by != Owner::Player(idx) {
                    return Err(InvariantViolation::OwnershipMismatch {
                        asset: *asset,
                        owner: location.owned_by,
                    });
                }
            }
            for asset in &player.mortgaged_assets {
                let mortgaged = self
                    .board
                    .locations
                    .get(*asset)
                    .map(|l| l.is_mortgaged)
                    .unwrap_or(false);
                if !player.assets.contains(asset) || !mortgaged {
                    return Err(InvariantViolation::MortgageMismatch { player: idx, asset: *asset });
                }
            }
            if player.full_color_sets != self.full_color_sets_of(idx) {
                return Err(InvariantViolation::StaleColorSets { player: idx });
            }
            let holds_anything = player.cash != 0 || !player.assets.is_empty();
            if player.status == PlayerStatus::Lost && holds_anything {
                return Err(InvariantViolation::LostPlayerHoldings { player: idx });
            }
        }

        let mut houses = vec![0u32; self.players.len()];
        let mut hotels = vec![0u32; self.players.len()];
        for (asset, location) in self.board.locations.iter().enumerate() {
            match location.owned_by {
                Owner::Bank => {
                    if claimed[asset].is_some() {
                        return Err(InvariantViolation::OwnershipMismatch {
                            asset,
                            owner: Owner::Bank,
                        });
                    }
                    if location.is_mortgaged || location.is_improved() {
                        return Err(InvariantViolation::IllegalImprovement { asset });
                    }
                }
                Owner::Player(idx) => {
                    if claimed[asset] != Some(idx) {
                        return Err(InvariantViolation::OwnershipMismatch {
                            asset,
                            owner: location.owned_by,
                        });
                    }
                    let recorded = self.players[idx].mortgaged_assets.contains(&asset);
                    if location.is_mortgaged != recorded {
                        return Err(InvariantViolation::MortgageMismatch { player: idx, asset });
                    }
                    houses[idx] += location.num_houses as u32;
                    hotels[idx] += location.num_hotels as u32;
                }
            }
            let illegal = location.is_improved()
                && (location.is_mortgaged
                    || location.class != LocationClass::RealEstate
                    || location.num_hotels > 1
                    || location.num_houses > HOUSE_LIMIT_BEFORE_HOTEL
                    || (location.num_hotels > 0 && location.num_houses > 0));
            if illegal {
                return Err(InvariantViolation::IllegalImprovement { asset });
            }
        }
        for (idx, player) in self.players.iter().enumerate() {
            if player.num_total_houses != houses[idx] || player.num_total_hotels != hotels[idx] {
                return Err(InvariantViolation::ImprovementTotals { player: idx });
            }
        }
        let houses_out: u32 = houses.iter().sum();
        let hotels_out: u32 = hotels.iter().sum();
        if houses_out + self.bank.houses() != self.config.total_houses
            || hotels_out + self.bank.hotels() != self.config.total_hotels
        {
            return Err(InvariantViolation::ImprovementSupply);
        }

        for color in self.board.colors() {
            let levels: Vec<u8> = self
                .board
                .color_group(color)
                .iter()
                .map(|idx| self.board.locations[*idx].improvement_level())
                .collect();
            let max = levels.iter().copied().max().unwrap_or(0);
            let min = levels.iter().copied().min().unwrap_or(0);
            if max > 0 && max - min > 1 {
                return Err(InvariantViolation::UnevenColorGroup { color });
            }
        }

        let current = self
            .players
            .iter()
            .filter(|p| p.status == PlayerStatus::CurrentMove)
            .count();
        if current > 1 {
            return Err(InvariantViolation::CurrentMoveCount { count: current });
        }
        Ok(())
    }

    /// While a turn is open, `player` and nobody else holds the current move.
    pub fn check_turn_invariants(&self, player: PlayerId) -> Result<(), InvariantViolation> {
        let holders: Vec<PlayerId> = self
            .players
            .iter()
            .enumerate()
            .filter(|(_, p)| p.status == PlayerStatus::CurrentMove)
            .map(|(idx, _)| idx)
            .collect();
        match holders[..] {
            [holder] if holder == player => {}
            [holder] => return Err(InvariantViolation::CurrentMoveHolder { player: holder }),
            _ => return Err(InvariantViolation::CurrentMoveCount { count: holders.len() }),
        }
        self.check_invariants()
    }
}
