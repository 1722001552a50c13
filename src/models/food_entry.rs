//! Food Entry model
//!
//! A logged consumption event. Each entry embeds its own copy of the food
//! item as it was logged, so editing an entry never touches the catalog.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use super::{parse_column, FoodItem, NutritionFacts};
use crate::db::{DbError, DbResult};
use crate::nutrition::error::{ensure_positive, NutritionError};

/// Meal type enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

impl MealType {
    pub const ALL: [MealType; 4] = [
        MealType::Breakfast,
        MealType::Lunch,
        MealType::Dinner,
        MealType::Snack,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MealType::Breakfast => "breakfast",
            MealType::Lunch => "lunch",
            MealType::Dinner => "dinner",
            MealType::Snack => "snack",
        }
    }
}

impl FromStr for MealType {
    type Err = NutritionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "breakfast" => Ok(MealType::Breakfast),
            "lunch" => Ok(MealType::Lunch),
            "dinner" => Ok(MealType::Dinner),
            "snack" | "snacks" => Ok(MealType::Snack),
            _ => Err(NutritionError::UnknownValue {
                kind: "meal type",
                value: s.to_string(),
            }),
        }
    }
}

/// A logged food entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodEntry {
    pub id: i64,
    /// Catalog item the entry was logged from, if it still exists
    pub food_item_id: Option<i64>,
    /// Snapshot owned by this entry
    pub food_item: FoodItem,
    pub servings: f64,
    pub meal_type: MealType,
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub notes: Option<String>,
}

/// Data for logging a new entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoodEntryCreate {
    pub food_item_id: Option<i64>,
    pub food_item: FoodItem,
    pub servings: f64,
    pub meal_type: MealType,
    pub date: NaiveDate,
    pub notes: Option<String>,
}

impl FoodEntry {
    /// Nutrition this entry contributes: snapshot nutrition times servings
    pub fn nutrition(&self) -> NutritionFacts {
        self.food_item.nutrition.scale(self.servings)
    }

    fn validate(food_item: &FoodItem, servings: f64) -> DbResult<()> {
        ensure_positive("servings", servings)?;
        food_item.validate()?;
        Ok(())
    }

    /// Create from a database row
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let snapshot: String = row.get("food_snapshot")?;
        let food_item = serde_json::from_str(&snapshot).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
        })?;

        Ok(Self {
            id: row.get("id")?,
            food_item_id: row.get("food_item_id")?,
            food_item,
            servings: row.get("servings")?,
            meal_type: parse_column(row, "meal_type")?,
            date: row.get("date")?,
            created_at: row.get("created_at")?,
            notes: row.get("notes")?,
        })
    }

    /// Insert a new entry
    pub fn create(conn: &Connection, data: &FoodEntryCreate) -> DbResult<Self> {
        Self::validate(&data.food_item, data.servings)?;
        let snapshot = serde_json::to_string(&data.food_item)?;

        conn.execute(
            r#"
            INSERT INTO food_entries (
                food_item_id, food_snapshot, servings, meal_type, date, notes, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                data.food_item_id,
                snapshot,
                data.servings,
                data.meal_type.as_str(),
                data.date,
                data.notes,
                Utc::now(),
            ],
        )?;

        let id = conn.last_insert_rowid();
        tracing::info!(
            id,
            date = %data.date,
            food = %data.food_item.name,
            servings = data.servings,
            "logged food entry"
        );
        Self::get_by_id(conn, id)?.ok_or_else(|| DbError::NotFound(format!("Entry {}", id)))
    }

    /// Get an entry by ID
    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM food_entries WHERE id = ?1")?;

        let result = stmt.query_row([id], Self::from_row);
        match result {
            Ok(entry) => Ok(Some(entry)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// All entries for one date, in logging order
    pub fn list_by_date(conn: &Connection, date: NaiveDate) -> DbResult<Vec<Self>> {
        Self::list_in_range(conn, date, date)
    }

    /// All entries from `start` to `end` inclusive, oldest first
    pub fn list_in_range(conn: &Connection, start: NaiveDate, end: NaiveDate) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare(
            r#"
            SELECT * FROM food_entries
            WHERE date BETWEEN ?1 AND ?2
            ORDER BY date ASC, created_at ASC, id ASC
            "#,
        )?;

        let entries = stmt
            .query_map(params![start, end], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(entries)
    }

    /// Persist an edited entry: snapshot, servings, meal, date, and notes
    pub fn save(conn: &Connection, entry: &FoodEntry) -> DbResult<Self> {
        Self::validate(&entry.food_item, entry.servings)?;
        let snapshot = serde_json::to_string(&entry.food_item)?;

        let rows = conn.execute(
            r#"
            UPDATE food_entries
            SET food_snapshot = ?1, servings = ?2, meal_type = ?3, date = ?4, notes = ?5
            WHERE id = ?6
            "#,
            params![
                snapshot,
                entry.servings,
                entry.meal_type.as_str(),
                entry.date,
                entry.notes,
                entry.id,
            ],
        )?;

        if rows == 0 {
            return Err(DbError::NotFound(format!("Entry {}", entry.id)));
        }

        tracing::info!(id = entry.id, servings = entry.servings, "updated food entry");
        Self::get_by_id(conn, entry.id)?
            .ok_or_else(|| DbError::NotFound(format!("Entry {}", entry.id)))
    }

    /// Delete an entry. Returns Ok(false) if it did not exist.
    pub fn delete(conn: &Connection, id: i64) -> DbResult<bool> {
        let rows = conn.execute("DELETE FROM food_entries WHERE id = ?1", [id])?;
        if rows > 0 {
            tracing::info!(id, "deleted food entry");
        }
        Ok(rows > 0)
    }

    /// Number of entries logged from a catalog item
    pub fn count_for_food_item(conn: &Connection, food_item_id: i64) -> DbResult<i64> {
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM food_entries WHERE food_item_id = ?1",
            [food_item_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    pub fn count(conn: &Connection) -> DbResult<i64> {
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM food_entries", [], |row| row.get(0))?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;
    use crate::models::FoodItemCreate;
    use crate::nutrition::ServingUnit;

    fn conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        conn
    }

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, day).unwrap()
    }

    fn banana(conn: &Connection) -> FoodItem {
        FoodItem::create(
            conn,
            &FoodItemCreate {
                name: "Banana".to_string(),
                brand: None,
                serving_size: 100.0,
                serving_unit: ServingUnit::G,
                nutrition: NutritionFacts::basic(89.0, 1.1, 22.8, 0.3),
                barcode: None,
                is_custom: true,
            },
        )
        .unwrap()
    }

    fn log(conn: &Connection, item: &FoodItem, date: NaiveDate, servings: f64) -> FoodEntry {
        FoodEntry::create(
            conn,
            &FoodEntryCreate {
                food_item_id: Some(item.id),
                food_item: item.clone(),
                servings,
                meal_type: MealType::Breakfast,
                date,
                notes: None,
            },
        )
        .unwrap()
    }

    #[test]
    fn test_meal_type_parse() {
        assert_eq!("Dinner".parse::<MealType>(), Ok(MealType::Dinner));
        assert!("brunch".parse::<MealType>().is_err());
    }

    #[test]
    fn test_create_and_list_by_date() {
        let conn = conn();
        let item = banana(&conn);
        let entry = log(&conn, &item, d(10), 1.5);
        log(&conn, &item, d(11), 1.0);

        assert_eq!(entry.food_item, item);
        assert_eq!(entry.date, d(10));
        assert!((entry.nutrition().calories - 133.5).abs() < 1e-9);

        let day = FoodEntry::list_by_date(&conn, d(10)).unwrap();
        assert_eq!(day.len(), 1);
        assert_eq!(day[0].id, entry.id);
        assert_eq!(FoodEntry::list_in_range(&conn, d(9), d(11)).unwrap().len(), 2);
        assert_eq!(FoodEntry::count_for_food_item(&conn, item.id).unwrap(), 2);
    }

    #[test]
    fn test_create_rejects_non_positive_servings() {
        let conn = conn();
        let item = banana(&conn);
        let result = FoodEntry::create(
            &conn,
            &FoodEntryCreate {
                food_item_id: Some(item.id),
                food_item: item,
                servings: 0.0,
                meal_type: MealType::Snack,
                date: d(10),
                notes: None,
            },
        );
        assert!(matches!(result, Err(DbError::Invalid(_))));
        assert_eq!(FoodEntry::count(&conn).unwrap(), 0);
    }

    #[test]
    fn test_save_changes_only_the_entry() {
        let conn = conn();
        let item = banana(&conn);
        let first = log(&conn, &item, d(10), 1.0);
        let second = log(&conn, &item, d(10), 1.0);

        let mut edited = first.clone();
        edited.food_item.nutrition.calories = 178.0;
        edited.food_item.serving_size = 200.0;
        edited.notes = Some("big one".to_string());
        let saved = FoodEntry::save(&conn, &edited).unwrap();
        assert_eq!(saved.food_item.nutrition.calories, 178.0);
        assert_eq!(saved.notes.as_deref(), Some("big one"));

        let untouched = FoodEntry::get_by_id(&conn, second.id).unwrap().unwrap();
        assert_eq!(untouched.food_item.nutrition.calories, 89.0);
        let catalog = FoodItem::get_by_id(&conn, item.id).unwrap().unwrap();
        assert_eq!(catalog.nutrition.calories, 89.0);
    }

    #[test]
    fn test_delete() {
        let conn = conn();
        let item = banana(&conn);
        let entry = log(&conn, &item, d(10), 1.0);
        assert!(FoodEntry::delete(&conn, entry.id).unwrap());
        assert!(!FoodEntry::delete(&conn, entry.id).unwrap());
        assert!(FoodEntry::get_by_id(&conn, entry.id).unwrap().is_none());

        let mut ghost = entry;
        ghost.id = 42;
        assert!(matches!(FoodEntry::save(&conn, &ghost), Err(DbError::NotFound(_))));
    }
}
