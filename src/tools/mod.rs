//! CICO Tools module
//!
//! MCP tool implementations for the calorie tracker. Every tool returns
//! `Result<_, String>` with a message suitable for the caller.

use std::str::FromStr;

use chrono::NaiveDate;

use crate::nutrition::NutritionError;

pub mod convert;
pub mod dashboard;
pub mod entries;
pub mod food_items;
pub mod profile;
pub mod status;

/// Parse an ISO `YYYY-MM-DD` date
pub fn parse_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| format!("Invalid date '{}': expected YYYY-MM-DD", value))
}

/// Parse an optional enum parameter, reporting the bad value
pub fn parse_opt<T>(value: Option<&str>) -> Result<Option<T>, String>
where
    T: FromStr<Err = NutritionError>,
{
    value.map(|v| v.parse::<T>().map_err(|e| e.to_string())).transpose()
}

/// Today's date in the local time zone
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}
