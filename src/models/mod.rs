//! Data models
//!
//! Rust structs representing database entities.

use std::str::FromStr;

use rusqlite::types::Type;
use rusqlite::Row;

use crate::nutrition::NutritionError;

mod food_entry;
mod food_item;
mod nutrition;
mod profile;

pub use food_entry::{FoodEntry, FoodEntryCreate, MealType};
pub use food_item::{FoodItem, FoodItemCreate};
pub use nutrition::NutritionFacts;
pub use profile::{ProfileUpdate, UserProfile, DEFAULT_CALORIE_GOAL};

/// Read a text column and parse it into one of the domain enums
fn parse_column<T>(row: &Row, column: &str) -> rusqlite::Result<T>
where
    T: FromStr<Err = NutritionError>,
{
    let text: String = row.get(column)?;
    parse_text(row, column, &text)
}

fn parse_optional_column<T>(row: &Row, column: &str) -> rusqlite::Result<Option<T>>
where
    T: FromStr<Err = NutritionError>,
{
    let text: Option<String> = row.get(column)?;
    text.map(|t| parse_text(row, column, &t)).transpose()
}

fn parse_text<T>(row: &Row, column: &str, text: &str) -> rusqlite::Result<T>
where
    T: FromStr<Err = NutritionError>,
{
    text.parse().map_err(|e| {
        let index = row.as_ref().column_index(column).unwrap_or(0);
        rusqlite::Error::FromSqlConversionFailure(index, Type::Text, Box::new(e))
    })
}
