use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Index of a player in seating order.
pub type PlayerId = usize;

/// Index of a location on the board.
pub type AssetId = usize;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display, EnumIter,
)]
#[strum(serialize_all = "snake_case")]
pub enum LocationClass {
    RealEstate,
    Railroad,
    Utility,
    Tax,
    Action,
    DoNothing,
}

impl LocationClass {
    pub fn is_purchasable(self) -> bool {
        matches!(
            self,
            LocationClass::RealEstate | LocationClass::Railroad | LocationClass::Utility
        )
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    EnumString,
    Display,
    EnumIter,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ColorGroup {
    Brown,
    SkyBlue,
    Orchid,
    Orange,
    Red,
    Yellow,
    Green,
    Blue,
}

impl ColorGroup {
    pub const ALL: [ColorGroup; 8] = [
        ColorGroup::Brown,
        ColorGroup::SkyBlue,
        ColorGroup::Orchid,
        ColorGroup::Orange,
        ColorGroup::Red,
        ColorGroup::Yellow,
        ColorGroup::Green,
        ColorGroup::Blue,
    ];
}

/// Special behaviour of an action cell.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display, EnumIter,
)]
#[strum(serialize_all = "snake_case")]
pub enum ActionKind {
    Chance,
    CommunityChest,
    GoToJail,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    EnumString,
    Display,
    EnumIter,
)]
#[strum(serialize_all = "snake_case")]
pub enum CardPack {
    Chance,
    CommunityChest,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display, EnumIter,
)]
#[strum(serialize_all = "snake_case")]
pub enum PlayerStatus {
    WaitingForMove,
    CurrentMove,
    Won,
    Lost,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display, EnumIter,
)]
#[strum(serialize_all = "snake_case")]
pub enum Phase {
    PreRoll,
    OutOfTurn,
    PostRoll,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display, EnumIter,
)]
#[strum(serialize_all = "snake_case")]
pub enum Improvement {
    House,
    Hotel,
}

/// Return code reported back to an agent after each executed move.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display, EnumIter,
)]
#[strum(serialize_all = "snake_case")]
pub enum ReturnCode {
    Success,
    Failure,
    Skip,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    EnumString,
    Display,
    EnumIter,
)]
#[strum(serialize_all = "snake_case")]
pub enum ActionType {
    Skip,
    Conclude,
    BuyProperty,
    MortgageProperty,
    FreeMortgage,
    ImproveProperty,
    SellProperty,
    SellHouseHotel,
    MakeSellPropertyOffer,
    AcceptSellPropertyOffer,
    RejectSellPropertyOffer,
    MakeTradeOffer,
    AcceptTradeOffer,
    RejectTradeOffer,
    PayJailFine,
    UseGetOutOfJailCard,
}

impl ActionType {
    pub const ALL: [ActionType; 16] = [
        ActionType::Skip,
        ActionType::Conclude,
        ActionType::BuyProperty,
        ActionType::MortgageProperty,
        ActionType::FreeMortgage,
        ActionType::ImproveProperty,
        ActionType::SellProperty,
        ActionType::SellHouseHotel,
        ActionType::MakeSellPropertyOffer,
        ActionType::AcceptSellPropertyOffer,
        ActionType::RejectSellPropertyOffer,
        ActionType::MakeTradeOffer,
        ActionType::AcceptTradeOffer,
        ActionType::RejectTradeOffer,
        ActionType::PayJailFine,
        ActionType::UseGetOutOfJailCard,
    ];
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn action_type_names_are_snake_case() {
        assert_eq!(ActionType::MakeTradeOffer.to_string(), "make_trade_offer");
        assert_eq!(
            ActionType::from_str("sell_house_hotel").ok(),
            Some(ActionType::SellHouseHotel)
        );
    }

    #[test]
    fn only_asset_classes_are_purchasable() {
        assert!(LocationClass::Railroad.is_purchasable());
        assert!(!LocationClass::Tax.is_purchasable());
        assert!(!LocationClass::DoNothing.is_purchasable());
    }
}
