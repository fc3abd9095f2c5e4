use std::collections::VecDeque;

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::types::CardPack;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Card {
    GetOutOfJailFree,
    Collect(i64),
    Pay(i64),
    AdvanceTo(usize),
    GoToJail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardDecks {
    chance: VecDeque<Card>,
    community_chest: VecDeque<Card>,
}

impl CardDecks {
    pub fn standard(rng: &mut impl Rng) -> Self {
        let mut chance = vec![
            Card::AdvanceTo(0),
            Card::AdvanceTo(24),
            Card::AdvanceTo(11),
            Card::AdvanceTo(39),
            Card::AdvanceTo(5),
            Card::Collect(50),
            Card::Collect(150),
            Card::Pay(15),
            Card::Pay(50),
            Card::GoToJail,
            Card::GetOutOfJailFree,
        ];
        let mut community_chest = vec![
            Card::AdvanceTo(0),
            Card::Collect(200),
            Card::Collect(100),
            Card::Collect(50),
            Card::Collect(25),
            Card::Collect(20),
            Card::Collect(10),
            Card::Pay(50),
            Card::Pay(100),
            Card::Pay(150),
            Card::GoToJail,
            Card::GetOutOfJailFree,
        ];
        chance.shuffle(rng);
        community_chest.shuffle(rng);
        Self {
            chance: chance.into(),
            community_chest: community_chest.into(),
        }
    }

    pub fn empty() -> Self {
        Self {
            chance: VecDeque::new(),
            community_chest: VecDeque::new(),
        }
    }

    fn deck_mut(&mut self, pack: CardPack) -> &mut VecDeque<Card> {
        match pack {
            CardPack::Chance => &mut self.chance,
            CardPack::CommunityChest => &mut self.community_chest,
        }
    }

    fn deck(&self, pack: CardPack) -> &VecDeque<Card> {
        match pack {
            CardPack::Chance => &self.chance,
            CardPack::CommunityChest => &self.community_chest,
        }
    }

    /// Takes the top card. Everything except a get-out-of-jail card goes straight
    /// back to the bottom; that one stays out until it is returned.
    pub fn draw(&mut self, pack: CardPack) -> Option<Card> {
        let deck = self.deck_mut(pack);
        let card = deck.pop_front()?;
        if card != Card::GetOutOfJailFree {
            deck.push_back(card);
        }
        Some(card)
    }

    pub fn return_card(&mut self, pack: CardPack, card: Card) {
        self.deck_mut(pack).push_back(card);
    }

    pub fn push_top(&mut self, pack: CardPack, card: Card) {
        self.deck_mut(pack).push_front(card);
    }

    pub fn len(&self, pack: CardPack) -> usize {
        self.deck(pack).len()
    }

    pub fn contains(&self, pack: CardPack, card: Card) -> bool {
        self.deck(pack).contains(&card)
    }
}
