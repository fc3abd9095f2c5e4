use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::{ActionKind, AssetId, ColorGroup, LocationClass, PlayerId};

/// Maximum number of houses on a lot before it can take a hotel.
pub const HOUSE_LIMIT_BEFORE_HOTEL: u8 = 4;

/// Improvement level used when comparing lots; a hotel counts as one step past four houses.
pub const HOTEL_LEVEL: u8 = HOUSE_LIMIT_BEFORE_HOTEL + 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Owner {
    Bank,
    Player(PlayerId),
}

impl Owner {
    pub fn player(self) -> Option<PlayerId> {
        match self {
            Owner::Player(idx) => Some(idx),
            Owner::Bank => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    pub class: LocationClass,
    pub start_position: usize,
    pub end_position: usize,
    pub color: Option<ColorGroup>,
    pub action: Option<ActionKind>,
    pub price: i64,
    pub mortgage: i64,
    pub price_per_house: i64,
    /// `[base, 1 house, 2 houses, 3 houses, 4 houses, hotel]`
    pub rent: [i64; 6],
    pub tax: i64,
    pub is_mortgaged: bool,
    pub owned_by: Owner,
    pub num_houses: u8,
    pub num_hotels: u8,
}

impl Location {
    fn cell(name: &str, class: LocationClass, position: usize) -> Self {
        Self {
            name: name.to_string(),
            class,
            start_position: position,
            end_position: position + 1,
            color: None,
            action: None,
            price: 0,
            mortgage: 0,
            price_per_house: 0,
            rent: [0; 6],
            tax: 0,
            is_mortgaged: false,
            owned_by: Owner::Bank,
            num_houses: 0,
            num_hotels: 0,
        }
    }

    pub fn real_estate(
        name: &str,
        position: usize,
        color: ColorGroup,
        price: i64,
        price_per_house: i64,
        rent: [i64; 6],
    ) -> Self {
        Self {
            color: Some(color),
            price,
            mortgage: price / 2,
            price_per_house,
            rent,
            ..Self::cell(name, LocationClass::RealEstate, position)
        }
    }

    pub fn railroad(name: &str, position: usize) -> Self {
        Self {
            price: 200,
            mortgage: 100,
            ..Self::cell(name, LocationClass::Railroad, position)
        }
    }

    pub fn utility(name: &str, position: usize) -> Self {
        Self {
            price: 150,
            mortgage: 75,
            ..Self::cell(name, LocationClass::Utility, position)
        }
    }

    pub fn tax(name: &str, position: usize, amount: i64) -> Self {
        Self {
            tax: amount,
            ..Self::cell(name, LocationClass::Tax, position)
        }
    }

    pub fn action(name: &str, position: usize, kind: ActionKind) -> Self {
        Self {
            action: Some(kind),
            ..Self::cell(name, LocationClass::Action, position)
        }
    }

    pub fn do_nothing(name: &str, position: usize) -> Self {
        Self::cell(name, LocationClass::DoNothing, position)
    }

    pub fn is_purchasable(&self) -> bool {
        self.class.is_purchasable()
    }

    pub fn is_improved(&self) -> bool {
        self.num_houses > 0 || self.num_hotels > 0
    }

    /// Houses count, with a hotel reported as [`HOTEL_LEVEL`].
    pub fn improvement_level(&self) -> u8 {
        if self.num_hotels > 0 {
            HOTEL_LEVEL
        } else {
            self.num_houses
        }
    }

    pub fn contains(&self, position: usize) -> bool {
        (self.start_position..self.end_position).contains(&position)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Board {
    pub locations: Vec<Location>,
    pub go_position: usize,
    pub jail_position: usize,
    color_groups: BTreeMap<ColorGroup, Vec<AssetId>>,
}

impl Board {
    pub fn from_locations(
        locations: Vec<Location>,
        go_position: usize,
        jail_position: usize,
    ) -> Self {
        let mut color_groups: BTreeMap<ColorGroup, Vec<AssetId>> = BTreeMap::new();
        for (idx, location) in locations.iter().enumerate() {
            if let Some(color) = location.color {
                color_groups.entry(color).or_default().push(idx);
            }
        }
        Self {
            locations,
            go_position,
            jail_position,
            color_groups,
        }
    }

    /// The classic 40-cell board.
    pub fn standard() -> Self {
        use ActionKind::*;
        use ColorGroup::*;
        let lot = Location::real_estate;

        let locations = vec![
            Location::do_nothing("Go", 0),
            lot("Mediterranean Avenue", 1, Brown, 60, 50, [2, 10, 30, 90, 160, 250]),
            Location::action("Community Chest", 2, CommunityChest),
            lot("Baltic Avenue", 3, Brown, 60, 50, [4, 20, 60, 180, 320, 450]),
            Location::tax("Income Tax", 4, 200),
            Location::railroad("Reading Railroad", 5),
            lot("Oriental Avenue", 6, SkyBlue, 100, 50, [6, 30, 90, 270, 400, 550]),
            Location::action("Chance", 7, Chance),
            lot("Vermont Avenue", 8, SkyBlue, 100, 50, [6, 30, 90, 270, 400, 550]),
            lot("Connecticut Avenue", 9, SkyBlue, 120, 50, [8, 40, 100, 300, 450, 600]),
            Location::do_nothing("In Jail/Just Visiting", 10),
            lot("St. Charles Place", 11, Orchid, 140, 100, [10, 50, 150, 450, 625, 750]),
            Location::utility("Electric Company", 12),
            lot("States Avenue", 13, Orchid, 140, 100, [10, 50, 150, 450, 625, 750]),
            lot("Virginia Avenue", 14, Orchid, 160, 100, [12, 60, 180, 500, 700, 900]),
            Location::railroad("Pennsylvania Railroad", 15),
            lot("St. James Place", 16, Orange, 180, 100, [14, 70, 200, 550, 750, 950]),
            Location::action("Community Chest", 17, CommunityChest),
            lot("Tennessee Avenue", 18, Orange, 180, 100, [14, 70, 200, 550, 750, 950]),
            lot("New York Avenue", 19, Orange, 200, 100, [16, 80, 220, 600, 800, 1000]),
            Location::do_nothing("Free Parking", 20),
            lot("Kentucky Avenue", 21, Red, 220, 150, [18, 90, 250, 700, 875, 1050]),
            Location::action("Chance", 22, Chance),
            lot("Indiana Avenue", 23, Red, 220, 150, [18, 90, 250, 700, 875, 1050]),
            lot("Illinois Avenue", 24, Red, 240, 150, [20, 100, 300, 750, 925, 1100]),
            Location::railroad("B&O Railroad", 25),
            lot("Atlantic Avenue", 26, Yellow, 260, 150, [22, 110, 330, 800, 975, 1150]),
            lot("Ventnor Avenue", 27, Yellow, 260, 150, [22, 110, 330, 800, 975, 1150]),
            Location::utility("Water Works", 28),
            lot("Marvin Gardens", 29, Yellow, 280, 150, [24, 120, 360, 850, 1025, 1200]),
            Location::action("Go to Jail", 30, GoToJail),
            lot("Pacific Avenue", 31, Green, 300, 200, [26, 130, 390, 900, 1100, 1275]),
            lot("North Carolina Avenue", 32, Green, 300, 200, [26, 130, 390, 900, 1100, 1275]),
            Location::action("Community Chest", 33, CommunityChest),
            lot("Pennsylvania Avenue", 34, Green, 320, 200, [28, 150, 450, 1000, 1200, 1400]),
            Location::railroad("Short Line", 35),
            Location::action("Chance", 36, Chance),
            lot("Park Place", 37, Blue, 350, 200, [35, 175, 500, 1100, 1300, 1500]),
            Location::tax("Luxury Tax", 38, 100),
            lot("Boardwalk", 39, Blue, 400, 200, [50, 200, 600, 1400, 1700, 2000]),
        ];
        Self::from_locations(locations, 0, 10)
    }

    /// Number of cells a token walks through for one lap.
    pub fn len(&self) -> usize {
        self.locations
            .iter()
            .map(|location| location.end_position)
            .max()
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    pub fn get(&self, asset: AssetId) -> Option<&Location> {
        self.locations.get(asset)
    }

    pub fn location_at(&self, position: usize) -> Option<AssetId> {
        self.locations
            .iter()
            .position(|location| location.contains(position))
    }

    pub fn find(&self, name: &str) -> Option<AssetId> {
        self.locations.iter().position(|location| location.name == name)
    }

    pub fn color_group(&self, color: ColorGroup) -> &[AssetId] {
        self.color_groups
            .get(&color)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn colors(&self) -> impl Iterator<Item = ColorGroup> + '_ {
        self.color_groups.keys().copied()
    }

    /// Lots sharing `asset`'s color, excluding `asset` itself.
    pub fn siblings(&self, asset: AssetId) -> Vec<AssetId> {
        match self.locations.get(asset).and_then(|location| location.color) {
            Some(color) => self
                .color_group(color)
                .iter()
                .copied()
                .filter(|idx| *idx != asset)
                .collect(),
            None => Vec::new(),
        }
    }

    pub fn purchasable(&self) -> impl Iterator<Item = AssetId> + '_ {
        self.locations
            .iter()
            .enumerate()
            .filter(|(_, location)| location.is_purchasable())
            .map(|(idx, _)| idx)
    }

    pub fn count_owned(&self, owner: PlayerId, class: LocationClass) -> usize {
        self.locations
            .iter()
            .filter(|location| location.class == class && location.owned_by == Owner::Player(owner))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_board_layout() {
        let board = Board::standard();
        assert_eq!(board.len(), 40);
        assert_eq!(board.purchasable().count(), 28);
        assert_eq!(board.color_group(ColorGroup::Brown).len(), 2);
        assert_eq!(board.color_group(ColorGroup::Orange).len(), 3);
        assert_eq!(board.colors().count(), 8);
        assert_eq!(board.location_at(39), board.find("Boardwalk"));
    }

    #[test]
    fn siblings_exclude_self() {
        let board = Board::standard();
        let oriental = board.find("Oriental Avenue").unwrap();
        let siblings = board.siblings(oriental);
        assert_eq!(siblings.len(), 2);
        assert!(!siblings.contains(&oriental));
        assert!(board.siblings(board.find("Reading Railroad").unwrap()).is_empty());
    }

    #[test]
    fn hotel_counts_as_fifth_level() {
        let mut location = Location::real_estate("Lot", 1, ColorGroup::Brown, 60, 50, [2; 6]);
        location.num_houses = 3;
        assert_eq!(location.improvement_level(), 3);
        location.num_houses = 0;
        location.num_hotels = 1;
        assert_eq!(location.improvement_level(), HOTEL_LEVEL);
        assert!(location.is_improved());
    }
}
