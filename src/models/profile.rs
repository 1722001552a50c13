//! User profile model
//!
//! Single-row table holding biometrics, goals, and display preferences.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use super::{parse_column, parse_optional_column};
use crate::db::{DbError, DbResult};
use crate::nutrition::calculator::{
    recommended_macros, ActivityLevel, CalorieCalculatorResult, Gender, GoalType,
};
use crate::nutrition::error::{ensure_positive, NutritionError, NutritionResult};
use crate::nutrition::UnitSystem;

/// Daily calorie goal used until the user sets one
pub const DEFAULT_CALORIE_GOAL: i32 = 2000;

const MAX_AGE: u32 = 150;

/// The user's biometrics and goals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub age: Option<u32>,
    pub weight_kg: Option<f64>,
    pub height_cm: Option<f64>,
    pub gender: Option<Gender>,
    pub activity_level: ActivityLevel,
    pub goal_type: GoalType,
    pub daily_calorie_goal: i32,
    /// Grams per day
    pub protein_goal: Option<u32>,
    pub carbs_goal: Option<u32>,
    pub fat_goal: Option<u32>,
    pub unit_system: UnitSystem,
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            age: None,
            weight_kg: None,
            height_cm: None,
            gender: None,
            activity_level: ActivityLevel::default(),
            goal_type: GoalType::default(),
            daily_calorie_goal: DEFAULT_CALORIE_GOAL,
            protein_goal: None,
            carbs_goal: None,
            fat_goal: None,
            unit_system: UnitSystem::default(),
        }
    }
}

/// Partial update; `None` leaves a field unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub age: Option<u32>,
    pub weight_kg: Option<f64>,
    pub height_cm: Option<f64>,
    pub gender: Option<Gender>,
    pub activity_level: Option<ActivityLevel>,
    pub goal_type: Option<GoalType>,
    pub daily_calorie_goal: Option<i32>,
    pub protein_goal: Option<u32>,
    pub carbs_goal: Option<u32>,
    pub fat_goal: Option<u32>,
    pub unit_system: Option<UnitSystem>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.age.is_none()
            && self.weight_kg.is_none()
            && self.height_cm.is_none()
            && self.gender.is_none()
            && self.activity_level.is_none()
            && self.goal_type.is_none()
            && self.daily_calorie_goal.is_none()
            && self.protein_goal.is_none()
            && self.carbs_goal.is_none()
            && self.fat_goal.is_none()
            && self.unit_system.is_none()
    }

    /// Take the calorie target and matching macro split from a recommendation
    pub fn adopt_recommendation(mut self, result: &CalorieCalculatorResult, goal_type: GoalType) -> Self {
        let macros = recommended_macros(result.recommended_calories, goal_type);
        self.goal_type = Some(goal_type);
        self.daily_calorie_goal = Some(result.recommended_calories);
        self.protein_goal = Some(macros.protein);
        self.carbs_goal = Some(macros.carbs);
        self.fat_goal = Some(macros.fat);
        self
    }
}

impl UserProfile {
    pub fn validate(&self) -> NutritionResult<()> {
        if let Some(weight) = self.weight_kg {
            ensure_positive("weight_kg", weight)?;
        }
        if let Some(height) = self.height_cm {
            ensure_positive("height_cm", height)?;
        }
        if let Some(age) = self.age {
            if age == 0 || age > MAX_AGE {
                return Err(NutritionError::InvalidArgument {
                    name: "age",
                    value: f64::from(age),
                });
            }
        }
        if self.daily_calorie_goal <= 0 {
            return Err(NutritionError::NotPositive {
                name: "daily_calorie_goal",
                value: f64::from(self.daily_calorie_goal),
            });
        }
        Ok(())
    }

    /// Apply an update, returning the new profile without saving it
    pub fn apply(&self, update: &ProfileUpdate) -> NutritionResult<Self> {
        let updated = Self {
            age: update.age.or(self.age),
            weight_kg: update.weight_kg.or(self.weight_kg),
            height_cm: update.height_cm.or(self.height_cm),
            gender: update.gender.or(self.gender),
            activity_level: update.activity_level.unwrap_or(self.activity_level),
            goal_type: update.goal_type.unwrap_or(self.goal_type),
            daily_calorie_goal: update.daily_calorie_goal.unwrap_or(self.daily_calorie_goal),
            protein_goal: update.protein_goal.or(self.protein_goal),
            carbs_goal: update.carbs_goal.or(self.carbs_goal),
            fat_goal: update.fat_goal.or(self.fat_goal),
            unit_system: update.unit_system.unwrap_or(self.unit_system),
        };
        updated.validate()?;
        Ok(updated)
    }

    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            age: row.get("age")?,
            weight_kg: row.get("weight_kg")?,
            height_cm: row.get("height_cm")?,
            gender: parse_optional_column(row, "gender")?,
            activity_level: parse_column(row, "activity_level")?,
            goal_type: parse_column(row, "goal_type")?,
            daily_calorie_goal: row.get("daily_calorie_goal")?,
            protein_goal: row.get("protein_goal")?,
            carbs_goal: row.get("carbs_goal")?,
            fat_goal: row.get("fat_goal")?,
            unit_system: parse_column(row, "unit_system")?,
        })
    }

    /// Get the stored profile (single row table)
    pub fn get(conn: &Connection) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM user_profile WHERE id = 1")?;

        let result = stmt.query_row([], Self::from_row);
        match result {
            Ok(profile) => Ok(Some(profile)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Stored profile, or the defaults if none has been saved yet
    pub fn get_or_default(conn: &Connection) -> DbResult<Self> {
        Ok(Self::get(conn)?.unwrap_or_default())
    }

    /// Apply an update to the stored profile and save it (upsert)
    pub fn update(conn: &Connection, update: &ProfileUpdate) -> DbResult<Self> {
        let profile = Self::get_or_default(conn)?.apply(update)?;

        conn.execute(
            r#"
            INSERT INTO user_profile (
                id, age, weight_kg, height_cm, gender, activity_level, goal_type,
                daily_calorie_goal, protein_goal, carbs_goal, fat_goal, unit_system
            ) VALUES (1, ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            ON CONFLICT(id) DO UPDATE SET
                age = excluded.age,
                weight_kg = excluded.weight_kg,
                height_cm = excluded.height_cm,
                gender = excluded.gender,
                activity_level = excluded.activity_level,
                goal_type = excluded.goal_type,
                daily_calorie_goal = excluded.daily_calorie_goal,
                protein_goal = excluded.protein_goal,
                carbs_goal = excluded.carbs_goal,
                fat_goal = excluded.fat_goal,
                unit_system = excluded.unit_system,
                updated_at = datetime('now')
            "#,
            params![
                profile.age,
                profile.weight_kg,
                profile.height_cm,
                profile.gender.map(|g| g.as_str()),
                profile.activity_level.as_str(),
                profile.goal_type.as_str(),
                profile.daily_calorie_goal,
                profile.protein_goal,
                profile.carbs_goal,
                profile.fat_goal,
                profile.unit_system.as_str(),
            ],
        )?;

        tracing::info!(calorie_goal = profile.daily_calorie_goal, "updated user profile");
        Self::get(conn)?.ok_or_else(|| DbError::NotFound("User profile".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;
    use crate::nutrition::calculator::recommend_for_profile;

    fn conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        conn
    }

    #[test]
    fn test_defaults_before_first_save() {
        let conn = conn();
        assert!(UserProfile::get(&conn).unwrap().is_none());
        let profile = UserProfile::get_or_default(&conn).unwrap();
        assert_eq!(profile.daily_calorie_goal, 2000);
        assert_eq!(profile.activity_level, ActivityLevel::ModeratelyActive);
        assert_eq!(profile.goal_type, GoalType::MaintainWeight);
        assert_eq!(profile.unit_system, UnitSystem::Metric);
    }

    #[test]
    fn test_update_merges_fields() {
        let conn = conn();
        UserProfile::update(
            &conn,
            &ProfileUpdate {
                weight_kg: Some(70.0),
                height_cm: Some(175.0),
                ..Default::default()
            },
        )
        .unwrap();
        let profile = UserProfile::update(
            &conn,
            &ProfileUpdate {
                age: Some(30),
                gender: Some(Gender::Male),
                unit_system: Some(UnitSystem::Imperial),
                ..Default::default()
            },
        )
        .unwrap();

        assert_eq!(profile.weight_kg, Some(70.0));
        assert_eq!(profile.age, Some(30));
        assert_eq!(profile.gender, Some(Gender::Male));
        assert_eq!(profile.unit_system, UnitSystem::Imperial);
        assert_eq!(UserProfile::get(&conn).unwrap(), Some(profile));
    }

    #[test]
    fn test_update_rejects_invalid_values() {
        let conn = conn();
        let bad_goal = ProfileUpdate {
            daily_calorie_goal: Some(0),
            ..Default::default()
        };
        assert!(matches!(UserProfile::update(&conn, &bad_goal), Err(DbError::Invalid(_))));

        let bad_weight = ProfileUpdate {
            weight_kg: Some(-3.0),
            ..Default::default()
        };
        assert!(UserProfile::update(&conn, &bad_weight).is_err());
        assert!(UserProfile::get(&conn).unwrap().is_none());
    }

    #[test]
    fn test_adopt_recommendation() {
        let conn = conn();
        let profile = UserProfile::update(
            &conn,
            &ProfileUpdate {
                age: Some(30),
                weight_kg: Some(70.0),
                height_cm: Some(175.0),
                gender: Some(Gender::Male),
                ..Default::default()
            },
        )
        .unwrap();
        let result = recommend_for_profile(&profile).unwrap().unwrap();
        assert_eq!(result.recommended_calories, 2556);

        let adopted = UserProfile::update(
            &conn,
            &ProfileUpdate::default().adopt_recommendation(&result, GoalType::MaintainWeight),
        )
        .unwrap();
        assert_eq!(adopted.daily_calorie_goal, 2556);
        assert_eq!(adopted.protein_goal, Some(160));
        assert_eq!(adopted.carbs_goal, Some(288));
        assert_eq!(adopted.fat_goal, Some(85));
    }

    #[test]
    fn test_empty_update() {
        assert!(ProfileUpdate::default().is_empty());
        assert!(!ProfileUpdate {
            fat_goal: Some(60),
            ..Default::default()
        }
        .is_empty());
    }
}
