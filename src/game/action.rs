use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::types::{ActionType, AssetId, Improvement, PlayerId};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct GameAction {
    pub player_index: PlayerId,
    pub action_type: ActionType,
    pub payload: ActionPayload,
}

impl GameAction {
    pub fn new(player_index: PlayerId, action_type: ActionType) -> Self {
        Self {
            player_index,
            action_type,
            payload: ActionPayload::None,
        }
    }

    pub fn with_payload(mut self, payload: ActionPayload) -> Self {
        self.payload = payload;
        self
    }

    pub fn skip(player_index: PlayerId) -> Self {
        Self::new(player_index, ActionType::Skip)
    }

    pub fn conclude(player_index: PlayerId) -> Self {
        Self::new(player_index, ActionType::Conclude)
    }

    pub fn on_asset(player_index: PlayerId, action_type: ActionType, asset: AssetId) -> Self {
        Self::new(player_index, action_type).with_payload(ActionPayload::Asset(asset))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ActionPayload {
    #[default]
    None,
    Asset(AssetId),
    Improvement {
        asset: AssetId,
        improvement: Improvement,
    },
    SellOffer {
        asset: AssetId,
        to_player: PlayerId,
        price: i64,
    },
    Trade(TradeOffer),
}

impl ActionPayload {
    pub fn asset(&self) -> Option<AssetId> {
        match self {
            ActionPayload::Asset(asset)
            | ActionPayload::Improvement { asset, .. }
            | ActionPayload::SellOffer { asset, .. } => Some(*asset),
            _ => None,
        }
    }
}

/// A cash + property bundle exchange proposed by `from_player` to `to_player`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct TradeOffer {
    pub from_player: PlayerId,
    pub to_player: PlayerId,
    pub cash_offered: i64,
    pub cash_wanted: i64,
    pub property_set_offered: BTreeSet<AssetId>,
    pub property_set_wanted: BTreeSet<AssetId>,
}

impl TradeOffer {
    pub fn new(from_player: PlayerId, to_player: PlayerId) -> Self {
        Self {
            from_player,
            to_player,
            ..Self::default()
        }
    }

    pub fn offering(mut self, asset: AssetId) -> Self {
        self.property_set_offered.insert(asset);
        self
    }

    pub fn wanting(mut self, asset: AssetId) -> Self {
        self.property_set_wanted.insert(asset);
        self
    }

    pub fn with_cash(mut self, offered: i64, wanted: i64) -> Self {
        self.cash_offered = offered;
        self.cash_wanted = wanted;
        self
    }

    /// Every asset that changes hands if the offer is accepted.
    pub fn assets(&self) -> impl Iterator<Item = AssetId> + '_ {
        self.property_set_offered
            .iter()
            .chain(self.property_set_wanted.iter())
            .copied()
    }
}

/// An offer to sell a single asset for cash.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct SellPropertyOffer {
    pub from_player: PlayerId,
    pub asset: AssetId,
    pub price: i64,
}

impl ActionType {
    /// Parameter validator: does `payload` have the shape this action takes?
    pub fn accepts(self, payload: &ActionPayload) -> bool {
        use ActionType::*;
        match self {
            Skip | Conclude | AcceptSellPropertyOffer | RejectSellPropertyOffer
            | AcceptTradeOffer | RejectTradeOffer | PayJailFine | UseGetOutOfJailCard => {
                matches!(payload, ActionPayload::None)
            }
            BuyProperty | MortgageProperty | FreeMortgage | SellProperty => {
                matches!(payload, ActionPayload::Asset(_))
            }
            ImproveProperty | SellHouseHotel => {
                matches!(payload, ActionPayload::Improvement { .. })
            }
            MakeSellPropertyOffer => matches!(payload, ActionPayload::SellOffer { .. }),
            MakeTradeOffer => matches!(payload, ActionPayload::Trade(_)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_shapes_are_validated_per_action() {
        assert!(ActionType::Skip.accepts(&ActionPayload::None));
        assert!(!ActionType::Skip.accepts(&ActionPayload::Asset(1)));
        assert!(ActionType::MortgageProperty.accepts(&ActionPayload::Asset(1)));
        assert!(!ActionType::MortgageProperty.accepts(&ActionPayload::None));
        assert!(ActionType::ImproveProperty.accepts(&ActionPayload::Improvement {
            asset: 1,
            improvement: Improvement::House,
        }));
        assert!(ActionType::MakeTradeOffer.accepts(&ActionPayload::Trade(TradeOffer::new(0, 1))));
        assert!(!ActionType::MakeTradeOffer.accepts(&ActionPayload::Asset(3)));
    }

    #[test]
    fn trade_offer_builder_collects_assets() {
        let offer = TradeOffer::new(0, 1).offering(3).wanting(5).with_cash(50, 0);
        let assets: Vec<_> = offer.assets().collect();
        assert_eq!(assets, vec![3, 5]);
        assert_eq!(offer.cash_offered, 50);
    }

    #[test]
    fn action_serializes_to_json() {
        let action = GameAction::on_asset(2, ActionType::BuyProperty, 39);
        let json = serde_json::to_string(&action).unwrap();
        let back: GameAction = serde_json::from_str(&json).unwrap();
        assert_eq!(action, back);
    }
}
