use serde::{Deserialize, Serialize};
use std::fmt;

/// A food product as returned by the nutrition database.
///
/// The default value (empty strings, zero nutrients) stands in for an item
/// whose data has not arrived yet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct FoodItem {
    pub name: String,
    /// Food category, e.g. "Generic foods".
    #[serde(rename = "type")]
    pub food_type: String,
    /// Energy in kcal.
    pub energy: i32,
    /// Protein in grams.
    pub protein: i32,
}

impl FoodItem {
    pub fn new(name: impl Into<String>, food_type: impl Into<String>, energy: i32, protein: i32) -> Self {
        Self {
            name: name.into(),
            food_type: food_type.into(),
            energy,
            protein,
        }
    }

    /// Case-insensitive substring match of `query` against the name.
    pub fn matches_query(&self, query: &str) -> bool {
        self.name.to_lowercase().contains(&query.to_lowercase())
    }
}

impl fmt::Display for FoodItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}, {} kcal, {} g protein)",
            self.name, self.food_type, self.energy, self.protein
        )
    }
}
