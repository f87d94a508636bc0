//! Expiry classification.
//!
//! An item counts as expiring when its expiry date, taken at local midnight,
//! falls strictly before the reference instant. With the reference set to
//! "now" this selects items whose date is today or earlier once the day has
//! started; an item dated tomorrow is never selected. Items whose date does
//! not parse are left out.

use chrono::{NaiveDateTime, NaiveTime};

use crate::models::FoodItemWithDate;

/// Returns the items whose expiry date is strictly before `reference`.
///
/// `reference` is a local wall-clock time. Input order is kept and every
/// matching item appears once per occurrence in `items`.
pub fn classify(items: &[FoodItemWithDate], reference: NaiveDateTime) -> Vec<FoodItemWithDate> {
    items
        .iter()
        .filter(|item| is_expiring(item, reference))
        .cloned()
        .collect()
}

/// Whether a single item is expiring relative to `reference`.
pub fn is_expiring(item: &FoodItemWithDate, reference: NaiveDateTime) -> bool {
    match item.expiry() {
        Some(date) => date.and_time(NaiveTime::MIN) < reference,
        None => {
            tracing::debug!(
                "Skipping {} with unparseable expiry date {:?}",
                item.food_item.name,
                item.expiry_date
            );
            false
        }
    }
}
