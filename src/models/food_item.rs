//! Food Item model
//!
//! A catalog food with nutrition for one serving of a stated size and unit.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use super::{parse_column, NutritionFacts};
use crate::db::{DbError, DbResult};
use crate::nutrition::error::{ensure_positive, NutritionError, NutritionResult};
use crate::nutrition::ServingUnit;

/// A food item with nutritional information
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodItem {
    pub id: i64,
    pub name: String,
    pub brand: Option<String>,
    pub serving_size: f64,
    pub serving_unit: ServingUnit,
    /// Nutrition for one `serving_size` of `serving_unit`
    pub nutrition: NutritionFacts,
    pub barcode: Option<String>,
    /// Entered by the user rather than imported from a database
    pub is_custom: bool,
}

/// Data for creating a new food item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoodItemCreate {
    pub name: String,
    pub brand: Option<String>,
    pub serving_size: f64,
    pub serving_unit: ServingUnit,
    #[serde(flatten)]
    pub nutrition: NutritionFacts,
    pub barcode: Option<String>,
    #[serde(default = "default_custom")]
    pub is_custom: bool,
}

fn default_custom() -> bool {
    true
}

impl FoodItemCreate {
    pub fn validate(&self) -> NutritionResult<()> {
        if self.name.trim().is_empty() {
            return Err(NutritionError::Missing("name"));
        }
        ensure_positive("serving_size", self.serving_size)?;
        self.nutrition.validate()
    }
}

impl FoodItem {
    pub fn validate(&self) -> NutritionResult<()> {
        ensure_positive("serving_size", self.serving_size)?;
        self.nutrition.validate()
    }

    /// Create a FoodItem from a database row
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            brand: row.get("brand")?,
            serving_size: row.get("serving_size")?,
            serving_unit: parse_column(row, "serving_unit")?,
            nutrition: NutritionFacts {
                calories: row.get("calories")?,
                protein: row.get("protein")?,
                carbs: row.get("carbs")?,
                fat: row.get("fat")?,
                fiber: row.get("fiber")?,
                sugar: row.get("sugar")?,
                sodium: row.get("sodium")?,
                cholesterol: row.get("cholesterol")?,
                saturated_fat: row.get("saturated_fat")?,
                trans_fat: row.get("trans_fat")?,
            },
            barcode: row.get("barcode")?,
            is_custom: row.get("is_custom")?,
        })
    }

    /// Insert a new food item into the database
    pub fn create(conn: &Connection, data: &FoodItemCreate) -> DbResult<Self> {
        data.validate()?;
        let n = &data.nutrition;
        conn.execute(
            r#"
            INSERT INTO food_items (
                name, brand, serving_size, serving_unit,
                calories, protein, carbs, fat, fiber, sugar, sodium, cholesterol,
                saturated_fat, trans_fat, barcode, is_custom
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)
            "#,
            params![
                data.name.trim(),
                data.brand,
                data.serving_size,
                data.serving_unit.as_str(),
                n.calories,
                n.protein,
                n.carbs,
                n.fat,
                n.fiber,
                n.sugar,
                n.sodium,
                n.cholesterol,
                n.saturated_fat,
                n.trans_fat,
                data.barcode,
                data.is_custom,
            ],
        )?;

        let id = conn.last_insert_rowid();
        tracing::info!(id, name = %data.name, "created food item");
        Self::get_by_id(conn, id)?.ok_or_else(|| DbError::NotFound(format!("Food item {}", id)))
    }

    /// Get a food item by ID
    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM food_items WHERE id = ?1")?;

        let result = stmt.query_row([id], Self::from_row);
        match result {
            Ok(item) => Ok(Some(item)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn get_by_barcode(conn: &Connection, barcode: &str) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM food_items WHERE barcode = ?1 LIMIT 1")?;

        let result = stmt.query_row([barcode], Self::from_row);
        match result {
            Ok(item) => Ok(Some(item)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Search food items by name or brand
    pub fn search(conn: &Connection, query: &str, limit: i64) -> DbResult<Vec<Self>> {
        let search_pattern = format!("%{}%", query.trim());
        let mut stmt = conn.prepare(
            r#"
            SELECT * FROM food_items
            WHERE name LIKE ?1 OR brand LIKE ?1
            ORDER BY name ASC
            LIMIT ?2
            "#,
        )?;

        let items = stmt
            .query_map(params![search_pattern, limit], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(items)
    }

    /// Count total food items
    pub fn count(conn: &Connection) -> DbResult<i64> {
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM food_items", [], |row| row.get(0))?;
        Ok(count)
    }
}
