mod food_item;
mod food_item_with_date;

pub use food_item::FoodItem;
pub use food_item_with_date::{FoodItemWithDate, EXPIRY_DATE_FORMAT};
