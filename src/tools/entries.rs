//! Food Entry MCP Tools
//!
//! Logging, editing, and reading daily food entries. Mutations for a date run
//! inside a single transaction.

use chrono::NaiveDate;
use serde::Serialize;

use crate::db::{Database, DbError};
use crate::models::{FoodEntry, FoodEntryCreate, FoodItem, MealType, NutritionFacts, UserProfile};
use crate::nutrition::aggregation::{is_goal_met, DailyLog, MealSubtotal};
use crate::nutrition::calculator::{macro_breakdown, MacroBreakdown};
use crate::nutrition::converter::default_measurement_unit;
use crate::nutrition::scaler::scale_by_servings;
use crate::nutrition::{NutritionScaler, RoundingMode, ServingEdit, ServingUnit};

/// Input for log_food
#[derive(Debug, Clone)]
pub struct LogFoodRequest {
    pub food_item_id: i64,
    pub date: NaiveDate,
    pub meal_type: MealType,
    pub servings: f64,
    /// Measured amount per serving; the item's own serving when absent
    pub amount: Option<f64>,
    pub unit: Option<ServingUnit>,
    pub notes: Option<String>,
}

/// Input for edit_entry; `None` leaves a field unchanged
#[derive(Debug, Clone, Default)]
pub struct EditEntryRequest {
    pub id: i64,
    pub amount: Option<f64>,
    pub unit: Option<ServingUnit>,
    pub servings: Option<f64>,
    pub meal_type: Option<MealType>,
    pub date: Option<NaiveDate>,
    pub notes: Option<String>,
}

/// One entry as shown in responses
#[derive(Debug, Serialize)]
pub struct EntrySummary {
    pub id: i64,
    pub food_item_id: Option<i64>,
    pub name: String,
    pub brand: Option<String>,
    pub meal_type: MealType,
    pub serving_size: f64,
    pub serving_unit: ServingUnit,
    pub servings: f64,
    /// Rounded nutrition for serving x servings
    pub nutrition: NutritionFacts,
    pub notes: Option<String>,
}

impl From<&FoodEntry> for EntrySummary {
    fn from(entry: &FoodEntry) -> Self {
        Self {
            id: entry.id,
            food_item_id: entry.food_item_id,
            name: entry.food_item.name.clone(),
            brand: entry.food_item.brand.clone(),
            meal_type: entry.meal_type,
            serving_size: entry.food_item.serving_size,
            serving_unit: entry.food_item.serving_unit,
            servings: entry.servings,
            nutrition: entry.nutrition().rounded(),
            notes: entry.notes.clone(),
        }
    }
}

/// Day totals returned after a mutation
#[derive(Debug, Serialize)]
pub struct DayTotals {
    pub date: NaiveDate,
    pub calories: f64,
    pub entry_count: usize,
}

impl From<&DailyLog> for DayTotals {
    fn from(log: &DailyLog) -> Self {
        Self {
            date: log.date,
            calories: log.rounded().calories,
            entry_count: log.entries.len(),
        }
    }
}

/// Response for log_food
#[derive(Debug, Serialize)]
pub struct LogFoodResponse {
    pub entry: EntrySummary,
    pub day: DayTotals,
}

/// Response for edit_entry
#[derive(Debug, Serialize)]
pub struct EditEntryResponse {
    pub entry: EntrySummary,
    /// True when the old nutrition had to be reverse-scaled from rounded values
    pub baseline_estimated: bool,
    /// True when the entry's stored serving was not a per-100 g/ml label but
    /// was rescaled as one; the new values may be off by that size ratio
    pub serving_mismatch: bool,
    pub day: DayTotals,
}

/// Response for delete_entry
#[derive(Debug, Serialize)]
pub struct DeleteEntryResponse {
    pub success: bool,
    pub deleted_id: i64,
    pub day: DayTotals,
}

/// Response for get_daily_log
#[derive(Debug, Serialize)]
pub struct DailyLogResponse {
    pub date: NaiveDate,
    pub entries: Vec<EntrySummary>,
    pub meals: Vec<MealSubtotal>,
    pub totals: NutritionFacts,
    pub calorie_goal: i32,
    pub remaining_calories: f64,
    pub is_goal_met: bool,
    pub macros: MacroBreakdown,
}

/// Response for preview_serving
#[derive(Debug, Serialize)]
pub struct PreviewServingResponse {
    pub food_item_id: i64,
    pub name: String,
    pub amount: f64,
    pub unit: ServingUnit,
    pub servings: f64,
    pub scale_factor: Option<f64>,
    pub per_serving: NutritionFacts,
    pub total: NutritionFacts,
}

fn load_food_item(conn: &rusqlite::Connection, id: i64) -> Result<FoodItem, DbError> {
    FoodItem::get_by_id(conn, id)?.ok_or_else(|| DbError::NotFound(format!("Food item {}", id)))
}

fn load_day(conn: &rusqlite::Connection, date: NaiveDate) -> Result<DailyLog, DbError> {
    Ok(DailyLog::new(date, FoodEntry::list_by_date(conn, date)?))
}

/// The entry snapshot for a catalog item at an optional measured amount
fn snapshot_for(
    item: &FoodItem,
    amount: Option<f64>,
    unit: Option<ServingUnit>,
    servings: f64,
) -> Result<FoodItem, DbError> {
    match (amount, unit) {
        (None, None) => Ok(item.clone()),
        (amount, unit) => {
            let unit = unit.unwrap_or_else(|| default_measurement_unit(&item.name, item.serving_unit));
            let amount = amount.unwrap_or(item.serving_size);
            let portion = NutritionScaler::default().portion(item, amount, unit, servings)?;
            Ok(portion.snapshot)
        }
    }
}

/// Log a catalog item for a date
pub fn log_food(db: &Database, request: LogFoodRequest) -> Result<LogFoodResponse, String> {
    db.with_transaction(|tx| {
        let item = load_food_item(tx, request.food_item_id)?;
        let snapshot = snapshot_for(&item, request.amount, request.unit, request.servings)?;

        let entry = FoodEntry::create(
            tx,
            &FoodEntryCreate {
                food_item_id: Some(item.id),
                food_item: snapshot,
                servings: request.servings,
                meal_type: request.meal_type,
                date: request.date,
                notes: request.notes.clone(),
            },
        )?;
        let day = load_day(tx, entry.date)?;

        Ok(LogFoodResponse {
            entry: EntrySummary::from(&entry),
            day: DayTotals::from(&day),
        })
    })
    .map_err(|e| format!("Failed to log food: {}", e))
}

/// Edit an entry's serving, meal, date, or notes
pub fn edit_entry(db: &Database, request: EditEntryRequest) -> Result<EditEntryResponse, String> {
    db.with_transaction(|tx| {
        let entry = FoodEntry::get_by_id(tx, request.id)?
            .ok_or_else(|| DbError::NotFound(format!("Entry {}", request.id)))?;

        let mut baseline_estimated = false;
        let mut serving_mismatch = false;
        let mut updated = if request.amount.is_some() || request.unit.is_some() {
            let edit = ServingEdit {
                amount: request.amount.unwrap_or(entry.food_item.serving_size),
                unit: request.unit.unwrap_or(entry.food_item.serving_unit),
                servings: request.servings.unwrap_or(entry.servings),
            };
            let rescaled = NutritionScaler::default().rescale_entry(&entry, &edit)?;
            baseline_estimated = rescaled.baseline_estimated;
            serving_mismatch = rescaled.serving_mismatch;
            rescaled.entry
        } else {
            let mut updated = entry.clone();
            if let Some(servings) = request.servings {
                updated.servings = servings;
            }
            updated
        };

        if let Some(meal_type) = request.meal_type {
            updated.meal_type = meal_type;
        }
        if let Some(date) = request.date {
            updated.date = date;
        }
        if let Some(notes) = &request.notes {
            updated.notes = Some(notes.clone()).filter(|n| !n.trim().is_empty());
        }

        let saved = FoodEntry::save(tx, &updated)?;
        let day = load_day(tx, saved.date)?;

        Ok(EditEntryResponse {
            entry: EntrySummary::from(&saved),
            baseline_estimated,
            serving_mismatch,
            day: DayTotals::from(&day),
        })
    })
    .map_err(|e| format!("Failed to edit entry: {}", e))
}

/// Delete an entry
pub fn delete_entry(db: &Database, id: i64) -> Result<DeleteEntryResponse, String> {
    db.with_transaction(|tx| {
        let entry = FoodEntry::get_by_id(tx, id)?
            .ok_or_else(|| DbError::NotFound(format!("Entry {}", id)))?;
        FoodEntry::delete(tx, id)?;
        let day = load_day(tx, entry.date)?;

        Ok(DeleteEntryResponse {
            success: true,
            deleted_id: id,
            day: DayTotals::from(&day),
        })
    })
    .map_err(|e| format!("Failed to delete entry: {}", e))
}

/// All entries for a date with totals against the calorie goal
pub fn get_daily_log(db: &Database, date: NaiveDate) -> Result<DailyLogResponse, String> {
    db.with_conn(|conn| {
        let log = load_day(conn, date)?;
        let profile = UserProfile::get_or_default(conn)?;
        let totals = log.rounded();

        Ok(DailyLogResponse {
            date,
            entries: log.entries.iter().map(EntrySummary::from).collect(),
            meals: log.meal_subtotals(),
            remaining_calories: f64::from(profile.daily_calorie_goal) - totals.calories,
            is_goal_met: is_goal_met(log.totals.calories, profile.daily_calorie_goal),
            calorie_goal: profile.daily_calorie_goal,
            macros: macro_breakdown(&totals),
            totals,
        })
    })
    .map_err(|e| format!("Failed to get daily log: {}", e))
}

/// Show what logging an amount of a food would add, without saving
pub fn preview_serving(
    db: &Database,
    food_item_id: i64,
    amount: Option<f64>,
    unit: Option<ServingUnit>,
    servings: f64,
    rounding: RoundingMode,
) -> Result<PreviewServingResponse, String> {
    let item = db
        .with_conn(|conn| load_food_item(conn, food_item_id))
        .map_err(|e| format!("Failed to preview serving: {}", e))?;

    if amount.is_none() && unit.is_none() {
        let total = scale_by_servings(&item.nutrition, servings)
            .map_err(|e| format!("Failed to preview serving: {}", e))?;
        return Ok(PreviewServingResponse {
            food_item_id,
            name: item.name,
            amount: item.serving_size,
            unit: item.serving_unit,
            servings,
            scale_factor: None,
            per_serving: item.nutrition.rounded(),
            total,
        });
    }

    let unit = unit.unwrap_or_else(|| default_measurement_unit(&item.name, item.serving_unit));
    let amount = amount.unwrap_or(item.serving_size);
    let portion = NutritionScaler::default()
        .with_rounding(rounding)
        .portion(&item, amount, unit, servings)
        .map_err(|e| format!("Failed to preview serving: {}", e))?;

    Ok(PreviewServingResponse {
        food_item_id,
        name: item.name,
        amount,
        unit,
        servings,
        scale_factor: Some(portion.scaled.scale_factor),
        per_serving: portion.scaled.per_serving,
        total: portion.scaled.total,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_database;
    use crate::models::FoodItemCreate;
    use crate::tools::food_items::add_food_item;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, day).unwrap()
    }

    fn add(db: &Database, name: &str, size: f64, unit: ServingUnit, nutrition: NutritionFacts) -> i64 {
        add_food_item(
            db,
            FoodItemCreate {
                name: name.to_string(),
                brand: None,
                serving_size: size,
                serving_unit: unit,
                nutrition,
                barcode: None,
                is_custom: true,
            },
        )
        .unwrap()
        .id
    }

    fn apple(db: &Database) -> i64 {
        add(db, "Apple", 100.0, ServingUnit::G, NutritionFacts::basic(52.0, 0.3, 14.0, 0.2))
    }

    fn log(db: &Database, id: i64, amount: Option<f64>, servings: f64) -> LogFoodResponse {
        log_food(
            db,
            LogFoodRequest {
                food_item_id: id,
                date: d(14),
                meal_type: MealType::Snack,
                servings,
                amount,
                unit: amount.map(|_| ServingUnit::G),
                notes: None,
            },
        )
        .unwrap()
    }

    #[test]
    fn test_log_measured_amount() {
        let db = test_database();
        let id = apple(&db);
        let logged = log(&db, id, Some(150.0), 1.0);
        assert_eq!(logged.entry.serving_size, 150.0);
        assert_eq!(logged.entry.nutrition.calories, 78.0);
        assert_eq!(logged.day.calories, 78.0);
        assert_eq!(logged.day.entry_count, 1);
    }

    #[test]
    fn test_log_unknown_item_fails() {
        let db = test_database();
        let err = log_food(
            &db,
            LogFoodRequest {
                food_item_id: 404,
                date: d(14),
                meal_type: MealType::Lunch,
                servings: 1.0,
                amount: None,
                unit: None,
                notes: None,
            },
        )
        .unwrap_err();
        assert!(err.contains("Food item 404 not found"));
    }

    #[test]
    fn test_edit_rescales_only_the_entry() {
        let db = test_database();
        let id = apple(&db);
        let first = log(&db, id, Some(200.0), 1.0);
        let second = log(&db, id, Some(200.0), 1.0);
        assert_eq!(first.entry.nutrition.calories, 104.0);

        let edited = edit_entry(
            &db,
            EditEntryRequest {
                id: first.entry.id,
                amount: Some(100.0),
                ..Default::default()
            },
        )
        .unwrap();
        assert!(edited.baseline_estimated);
        assert!(!edited.serving_mismatch);
        assert_eq!(edited.entry.nutrition.calories, 52.0);
        assert_eq!(edited.day.calories, 156.0);

        let log = get_daily_log(&db, d(14)).unwrap();
        let other = log.entries.iter().find(|e| e.id == second.entry.id).unwrap();
        assert_eq!(other.nutrition.calories, 104.0);

        let detail = crate::tools::food_items::get_food_item(&db, id).unwrap().unwrap();
        assert_eq!(detail.item.nutrition.calories, 52.0);
        assert_eq!(detail.item.serving_size, 100.0);
    }

    #[test]
    fn test_edit_flags_multi_serving_snapshot() {
        let db = test_database();
        let id = apple(&db);
        // 150 g twice: the snapshot holds 78 kcal for 150 g
        let logged = log(&db, id, Some(150.0), 2.0);
        assert_eq!(logged.entry.nutrition.calories, 156.0);

        let edited = edit_entry(
            &db,
            EditEntryRequest {
                id: logged.entry.id,
                amount: Some(150.0),
                ..Default::default()
            },
        )
        .unwrap();
        // The 150 g snapshot is read as a per-100 g label
        assert!(!edited.baseline_estimated);
        assert!(edited.serving_mismatch);
        assert_eq!(edited.entry.nutrition.calories, 234.0);
    }

    #[test]
    fn test_edit_servings_and_meal_without_rescaling() {
        let db = test_database();
        let bagel = add(&db, "Bagel", 1.0, ServingUnit::Piece, NutritionFacts::basic(250.0, 9.0, 48.0, 1.5));
        let logged = log(&db, bagel, None, 1.0);

        let edited = edit_entry(
            &db,
            EditEntryRequest {
                id: logged.entry.id,
                servings: Some(2.0),
                meal_type: Some(MealType::Breakfast),
                notes: Some("with cream cheese".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
        assert!(!edited.baseline_estimated);
        assert_eq!(edited.entry.nutrition.calories, 500.0);
        assert_eq!(edited.entry.meal_type, MealType::Breakfast);
        assert_eq!(edited.entry.notes.as_deref(), Some("with cream cheese"));

        // Count-based entries cannot take a measured amount
        let err = edit_entry(
            &db,
            EditEntryRequest {
                id: logged.entry.id,
                amount: Some(90.0),
                unit: Some(ServingUnit::G),
                ..Default::default()
            },
        )
        .unwrap_err();
        assert!(err.starts_with("Failed to edit entry"));
    }

    #[test]
    fn test_edit_moves_entry_between_days() {
        let db = test_database();
        let id = apple(&db);
        let logged = log(&db, id, None, 1.0);
        let moved = edit_entry(
            &db,
            EditEntryRequest {
                id: logged.entry.id,
                date: Some(d(13)),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(moved.day.date, d(13));
        assert_eq!(get_daily_log(&db, d(14)).unwrap().entries.len(), 0);
        assert_eq!(get_daily_log(&db, d(13)).unwrap().entries.len(), 1);
    }

    #[test]
    fn test_delete_entry() {
        let db = test_database();
        let id = apple(&db);
        let logged = log(&db, id, None, 2.0);
        let deleted = delete_entry(&db, logged.entry.id).unwrap();
        assert!(deleted.success);
        assert_eq!(deleted.day.calories, 0.0);
        assert!(delete_entry(&db, logged.entry.id).is_err());
    }

    #[test]
    fn test_daily_log_against_goal() {
        let db = test_database();
        let id = apple(&db);
        log(&db, id, Some(150.0), 1.0);
        log(&db, id, None, 2.0);

        let log = get_daily_log(&db, d(14)).unwrap();
        assert_eq!(log.entries.len(), 2);
        assert_eq!(log.totals.calories, 182.0);
        assert_eq!(log.calorie_goal, 2000);
        assert_eq!(log.remaining_calories, 1818.0);
        assert!(log.is_goal_met);
        assert_eq!(log.meals.len(), 1);

        let empty = get_daily_log(&db, d(1)).unwrap();
        assert!(!empty.is_goal_met);
        assert_eq!(empty.macros.protein.percentage, 0);
    }

    #[test]
    fn test_preview_serving() {
        let db = test_database();
        let id = apple(&db);
        let preview = preview_serving(&db, id, Some(150.0), Some(ServingUnit::G), 2.0, RoundingMode::PerStep).unwrap();
        assert_eq!(preview.scale_factor, Some(1.5));
        assert_eq!(preview.per_serving.calories, 78.0);
        assert_eq!(preview.total.calories, 156.0);

        let plain = preview_serving(&db, id, None, None, 1.5, RoundingMode::PerStep).unwrap();
        assert_eq!(plain.scale_factor, None);
        assert_eq!(plain.total.calories, 78.0);

        assert!(preview_serving(&db, 999, None, None, 1.0, RoundingMode::PerStep).is_err());
    }

    #[test]
    fn test_preview_serving_rounding_modes() {
        let db = test_database();
        let id = apple(&db);
        // 101 g: 52.52 per serving rounds to 53, so three servings are 159
        let per_step =
            preview_serving(&db, id, Some(101.0), Some(ServingUnit::G), 3.0, RoundingMode::PerStep)
                .unwrap();
        assert_eq!(per_step.per_serving.calories, 53.0);
        assert_eq!(per_step.total.calories, 159.0);

        // Rounded once: 157.56 -> 158
        let once =
            preview_serving(&db, id, Some(101.0), Some(ServingUnit::G), 3.0, RoundingMode::Final)
                .unwrap();
        assert_eq!(once.per_serving.calories, 53.0);
        assert_eq!(once.total.calories, 158.0);
    }
}
