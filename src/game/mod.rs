pub mod action;
pub mod actions;
pub mod allowable;
pub mod auction;
pub mod bank;
pub mod bankruptcy;
pub mod bridge;
pub mod cards;
pub mod game;
pub mod history;
pub mod movement;
pub mod phases;
pub mod players;
pub mod rules;
pub mod state;
pub mod trade;

pub use action::{ActionPayload, GameAction, SellPropertyOffer, TradeOffer};
pub use actions::ActionError;
pub use allowable::{AllowableMoves, allowable_moves};
pub use bank::{Bank, BankError};
pub use game::{Game, GameOutcome};
pub use history::{Function, History, HistoryRecord};
pub use players::PlayerState;
pub use rules::RuleBook;
pub use state::{GameConfig, GameError, GameState, InvariantViolation};
