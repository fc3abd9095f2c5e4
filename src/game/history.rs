//! Append-only audit trail of every state-mutating call.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::{ActionType, PlayerId, ReturnCode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Function {
    Action(ActionType),
    RollDie,
    MovePlayer,
    CollectGo,
    PayDues,
    PayTax,
    DrawCard,
    GoToJail,
    Auction,
    BuyDecision,
    HandleNegativeCash,
    Liquidate,
    Bankruptcy,
    PhaseTimeout,
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Function::Action(action_type) => return write!(f, "{action_type}"),
            Function::RollDie => "roll_die",
            Function::MovePlayer => "move_player",
            Function::CollectGo => "collect_go",
            Function::PayDues => "pay_dues",
            Function::PayTax => "pay_tax",
            Function::DrawCard => "draw_card",
            Function::GoToJail => "go_to_jail",
            Function::Auction => "auction",
            Function::BuyDecision => "make_buy_property_decision",
            Function::HandleNegativeCash => "handle_negative_cash_balance",
            Function::Liquidate => "liquidate",
            Function::Bankruptcy => "declare_bankruptcy",
            Function::PhaseTimeout => "phase_timeout",
        };
        write!(f, "{name}")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub sequence: u64,
    pub turn: u32,
    pub player: Option<PlayerId>,
    pub function: Function,
    pub params: serde_json::Value,
    pub result: ReturnCode,
    /// Failure reason, when the call was rejected.
    pub detail: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct History {
    records: Vec<HistoryRecord>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(
        &mut self,
        turn: u32,
        player: Option<PlayerId>,
        function: Function,
        params: serde_json::Value,
        result: ReturnCode,
        detail: Option<String>,
    ) {
        let sequence = self.records.len() as u64;
        self.records.push(HistoryRecord {
            sequence,
            turn,
            player,
            function,
            params,
            result,
            detail,
        });
    }

    pub fn records(&self) -> &[HistoryRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn last(&self) -> Option<&HistoryRecord> {
        self.records.last()
    }

    pub fn iter(&self) -> impl Iterator<Item = &HistoryRecord> {
        self.records.iter()
    }

    pub fn for_function(&self, function: Function) -> impl Iterator<Item = &HistoryRecord> {
        self.records.iter().filter(move |r| r.function == function)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.records)
    }
}
