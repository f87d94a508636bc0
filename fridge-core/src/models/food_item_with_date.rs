use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::FoodItem;

/// Format of [`FoodItemWithDate::expiry_date`] (`dd/MM/yyyy`).
pub const EXPIRY_DATE_FORMAT: &str = "%d/%m/%Y";

/// A food item with its expiry date, as stored in the fridge and grocery
/// list collections.
///
/// The date is kept as the raw string because remote records may carry
/// values that do not parse; see [`FoodItemWithDate::expiry`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FoodItemWithDate {
    pub food_item: FoodItem,
    pub expiry_date: String,
}

impl FoodItemWithDate {
    pub fn new(food_item: FoodItem, expiry_date: impl Into<String>) -> Self {
        Self {
            food_item,
            expiry_date: expiry_date.into(),
        }
    }

    /// Creates an item whose expiry date is formatted from `date`.
    pub fn with_date(food_item: FoodItem, date: NaiveDate) -> Self {
        Self::new(food_item, date.format(EXPIRY_DATE_FORMAT).to_string())
    }

    /// Parses the expiry date. Returns `None` for malformed dates.
    pub fn expiry(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(self.expiry_date.trim(), EXPIRY_DATE_FORMAT).ok()
    }
}

impl fmt::Display for FoodItemWithDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:<24} expires {}", self.food_item.name, self.expiry_date)
    }
}
