use serde::{Deserialize, Serialize};

use crate::game::state::GameConfig;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bank {
    cash: i64,
    houses: u32,
    hotels: u32,
    pub mortgage_rate: f64,
    pub property_sell_percentage: f64,
    pub house_sell_percentage: f64,
    pub hotel_sell_percentage: f64,
    pub jail_fine: i64,
    pub go_increment: i64,
    pub monopoly_rent_factor: i64,
    pub railroad_dues: [i64; 4],
    pub utility_multipliers: [i64; 2],
}

impl Bank {
    pub fn from_config(config: &GameConfig) -> Self {
        Self {
            cash: config.bank_cash,
            houses: config.total_houses,
            hotels: config.total_hotels,
            mortgage_rate: config.mortgage_rate,
            property_sell_percentage: config.property_sell_percentage,
            house_sell_percentage: config.house_sell_percentage,
            hotel_sell_percentage: config.hotel_sell_percentage,
            jail_fine: config.jail_fine,
            go_increment: config.go_increment,
            monopoly_rent_factor: config.monopoly_rent_factor,
            railroad_dues: config.railroad_dues,
            utility_multipliers: config.utility_multipliers,
        }
    }

    pub fn cash(&self) -> i64 {
        self.cash
    }

    pub fn houses(&self) -> u32 {
        self.houses
    }

    pub fn hotels(&self) -> u32 {
        self.hotels
    }

    pub fn receive(&mut self, amount: i64) {
        self.cash += amount;
    }

    pub fn can_dispense(&self, amount: i64) -> bool {
        self.cash >= amount
    }

    pub fn dispense(&mut self, amount: i64) -> Result<(), BankError> {
        if !self.can_dispense(amount) {
            return Err(BankError::InsufficientCash {
                available: self.cash,
                requested: amount,
            });
        }
        self.cash -= amount;
        Ok(())
    }

    /// Settles a bankrupt player's deficit; the bank may go below zero here.
    pub(crate) fn absorb(&mut self, amount: i64) {
        self.cash += amount;
    }

    pub fn take_house(&mut self) -> Result<(), BankError> {
        if self.houses == 0 {
            return Err(BankError::NoHouses);
        }
        self.houses -= 1;
        Ok(())
    }

    pub fn take_houses(&mut self, count: u32) -> Result<(), BankError> {
        if self.houses < count {
            return Err(BankError::NoHouses);
        }
        self.houses -= count;
        Ok(())
    }

    pub fn take_hotel(&mut self) -> Result<(), BankError> {
        if self.hotels == 0 {
            return Err(BankError::NoHotels);
        }
        self.hotels -= 1;
        Ok(())
    }

    pub fn return_houses(&mut self, count: u32) {
        self.houses += count;
    }

    pub fn return_hotels(&mut self, count: u32) {
        self.hotels += count;
    }

    /// Amount needed to lift a mortgage, including interest.
    pub fn mortgage_payoff(&self, mortgage: i64) -> i64 {
        scale(mortgage, 1.0 + self.mortgage_rate)
    }

    pub fn property_sale_value(&self, price: i64) -> i64 {
        scale(price, self.property_sell_percentage)
    }

    pub fn house_sale_value(&self, price_per_house: i64) -> i64 {
        scale(price_per_house, self.house_sell_percentage)
    }

    pub fn hotel_sale_value(&self, price_per_house: i64) -> i64 {
        scale(price_per_house, self.hotel_sell_percentage)
    }

    pub fn railroad_dues_for(&self, owned: usize) -> i64 {
        match owned {
            0 => 0,
            n => self.railroad_dues[(n - 1).min(self.railroad_dues.len() - 1)],
        }
    }

    pub fn utility_multiplier_for(&self, owned: usize) -> i64 {
        match owned {
            0 => 0,
            n => self.utility_multipliers[(n - 1).min(self.utility_multipliers.len() - 1)],
        }
    }
}

/// Whole-dollar result of applying a rate, rounded to the nearest dollar.
pub fn scale(amount: i64, rate: f64) -> i64 {
    (amount as f64 * rate).round() as i64
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BankError {
    #[error("bank cash insufficient: have {available}, need {requested}")]
    InsufficientCash { available: i64, requested: i64 },
    #[error("bank has no houses left")]
    NoHouses,
    #[error("bank has no hotels left")]
    NoHotels,
}
