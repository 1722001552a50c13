//! Food Item MCP Tools
//!
//! Tools for managing the food catalog.

use serde::Serialize;

use crate::db::Database;
use crate::models::{FoodEntry, FoodItem, FoodItemCreate, NutritionFacts};
use crate::nutrition::converter::{default_measurement_unit, is_likely_liquid, is_measurable};
use crate::nutrition::{NutritionScaler, ServingUnit};

/// Response for add_food_item
#[derive(Debug, Serialize)]
pub struct AddFoodItemResponse {
    pub id: i64,
    pub name: String,
    pub brand: Option<String>,
    pub serving_size: f64,
    pub serving_unit: ServingUnit,
}

/// Response for search_food_items
#[derive(Debug, Serialize)]
pub struct SearchFoodItemsResponse {
    pub items: Vec<FoodItemSummary>,
    pub total: usize,
}

/// Summary of a food item for search results
#[derive(Debug, Serialize)]
pub struct FoodItemSummary {
    pub id: i64,
    pub name: String,
    pub brand: Option<String>,
    pub serving_size: f64,
    pub serving_unit: ServingUnit,
    pub calories: f64,
}

impl From<&FoodItem> for FoodItemSummary {
    fn from(item: &FoodItem) -> Self {
        Self {
            id: item.id,
            name: item.name.clone(),
            brand: item.brand.clone(),
            serving_size: item.serving_size,
            serving_unit: item.serving_unit,
            calories: item.nutrition.calories,
        }
    }
}

/// Full food item detail response
#[derive(Debug, Serialize)]
pub struct FoodItemDetail {
    #[serde(flatten)]
    pub item: FoodItem,
    /// Nutrition restated per 100 g/ml; absent for countable items
    pub per_100: Option<NutritionFacts>,
    pub likely_liquid: bool,
    /// Unit an amount for this food is entered in by default
    pub default_unit: ServingUnit,
    pub times_logged: i64,
}

/// Add a new food item
pub fn add_food_item(db: &Database, data: FoodItemCreate) -> Result<AddFoodItemResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let item = FoodItem::create(&conn, &data)
        .map_err(|e| format!("Failed to create food item: {}", e))?;

    Ok(AddFoodItemResponse {
        id: item.id,
        name: item.name,
        brand: item.brand,
        serving_size: item.serving_size,
        serving_unit: item.serving_unit,
    })
}

/// Search food items by name or brand, or by exact barcode
pub fn search_food_items(db: &Database, query: &str, limit: i64) -> Result<SearchFoodItemsResponse, String> {
    let limit = limit.clamp(1, 100);
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    // A scanned barcode finds its item directly
    let trimmed = query.trim();
    let by_barcode = if !trimmed.is_empty() && trimmed.chars().all(|c| c.is_ascii_digit()) {
        FoodItem::get_by_barcode(&conn, trimmed)
            .map_err(|e| format!("Barcode lookup failed: {}", e))?
    } else {
        None
    };

    let items = match by_barcode {
        Some(item) => vec![item],
        None => FoodItem::search(&conn, query, limit)
            .map_err(|e| format!("Search failed: {}", e))?,
    };

    let summaries: Vec<FoodItemSummary> = items.iter().map(FoodItemSummary::from).collect();
    let total = summaries.len();

    Ok(SearchFoodItemsResponse {
        items: summaries,
        total,
    })
}

/// Get a food item by ID with unit hints and usage information
pub fn get_food_item(db: &Database, id: i64) -> Result<Option<FoodItemDetail>, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let item = FoodItem::get_by_id(&conn, id)
        .map_err(|e| format!("Failed to get food item: {}", e))?;

    match item {
        Some(item) => {
            let times_logged = FoodEntry::count_for_food_item(&conn, id)
                .map_err(|e| format!("Failed to get usage count: {}", e))?;
            let per_100 = if is_measurable(item.serving_unit) {
                let reference = NutritionScaler::default()
                    .per_reference(&item)
                    .map_err(|e| format!("Failed to scale food item: {}", e))?;
                Some(reference.rounded())
            } else {
                None
            };

            Ok(Some(FoodItemDetail {
                likely_liquid: is_likely_liquid(&item.name),
                default_unit: default_measurement_unit(&item.name, item.serving_unit),
                per_100,
                times_logged,
                item,
            }))
        }
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_database;

    fn cola() -> FoodItemCreate {
        FoodItemCreate {
            name: "Cola".to_string(),
            brand: None,
            serving_size: 12.0,
            serving_unit: ServingUnit::FlOz,
            nutrition: NutritionFacts::basic(140.0, 0.0, 39.0, 0.0),
            barcode: None,
            is_custom: true,
        }
    }

    #[test]
    fn test_add_and_get_with_hints() {
        let db = test_database();
        let added = add_food_item(&db, cola()).unwrap();
        let detail = get_food_item(&db, added.id).unwrap().unwrap();
        assert!(detail.likely_liquid);
        assert_eq!(detail.default_unit, ServingUnit::Ml);
        assert_eq!(detail.times_logged, 0);
        // 12 fl oz = 354.882 ml; 140 kcal -> 39.4 per 100 ml
        let per_100 = detail.per_100.unwrap();
        assert_eq!(per_100.calories, 39.0);
        assert_eq!(per_100.carbs, 11.0);

        assert!(get_food_item(&db, 999).unwrap().is_none());
    }

    #[test]
    fn test_add_rejects_bad_serving() {
        let db = test_database();
        let mut bad = cola();
        bad.serving_size = -1.0;
        let err = add_food_item(&db, bad).unwrap_err();
        assert!(err.starts_with("Failed to create food item"));
    }

    #[test]
    fn test_search_clamps_limit() {
        let db = test_database();
        add_food_item(&db, cola()).unwrap();
        let result = search_food_items(&db, "col", 0).unwrap();
        assert_eq!(result.total, 1);
        assert_eq!(result.items[0].calories, 140.0);
    }

    #[test]
    fn test_search_by_barcode() {
        let db = test_database();
        let mut scanned = cola();
        scanned.name = "Diet cola 2024".to_string();
        scanned.barcode = Some("049000028904".to_string());
        add_food_item(&db, cola()).unwrap();
        add_food_item(&db, scanned).unwrap();

        let result = search_food_items(&db, " 049000028904 ", 20).unwrap();
        assert_eq!(result.total, 1);
        assert_eq!(result.items[0].name, "Diet cola 2024");

        // Digits without a barcode match fall back to the name search
        assert_eq!(search_food_items(&db, "2024", 20).unwrap().total, 1);
        assert_eq!(search_food_items(&db, "cola", 20).unwrap().total, 2);
    }
}
