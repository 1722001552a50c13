//! Profile and calorie goal MCP Tools
//!
//! Reading and updating the user profile, and deriving calorie targets from
//! it with the Mifflin-St Jeor calculator.

use serde::Serialize;

use crate::db::Database;
use crate::models::{ProfileUpdate, UserProfile};
use crate::nutrition::calculator::{
    calculate_recommended_calories, format_breakdown, recommend_for_profile, recommended_macros,
    ActivityLevel, CalorieCalculatorInput, CalorieCalculatorResult, Gender, GoalType, MacroGoals,
};
use crate::nutrition::converter::{cm_to_feet_inches, feet_inches_to_cm, kg_to_pounds, pounds_to_kg};
use crate::nutrition::{round_tenth, FeetInches, UnitSystem};

/// Profile fields as supplied by a caller; body measurements may be imperial
#[derive(Debug, Clone, Default)]
pub struct ProfileInput {
    pub age: Option<u32>,
    pub weight_kg: Option<f64>,
    pub weight_lb: Option<f64>,
    pub height_cm: Option<f64>,
    pub height_ft: Option<f64>,
    pub height_in: Option<f64>,
    pub gender: Option<Gender>,
    pub activity_level: Option<ActivityLevel>,
    pub goal_type: Option<GoalType>,
    pub daily_calorie_goal: Option<i32>,
    pub protein_goal: Option<u32>,
    pub carbs_goal: Option<u32>,
    pub fat_goal: Option<u32>,
    pub unit_system: Option<UnitSystem>,
}

impl ProfileInput {
    /// Normalize to a metric profile update.
    ///
    /// Imperial body measurements are converted and rounded to 0.1.
    pub fn to_update(&self) -> Result<ProfileUpdate, String> {
        let weight_kg = match (self.weight_kg, self.weight_lb) {
            (Some(_), Some(_)) => return Err("Provide weight_kg or weight_lb, not both".to_string()),
            (Some(kg), None) => Some(kg),
            (None, Some(lb)) => Some(round_tenth(pounds_to_kg(lb).map_err(|e| e.to_string())?)),
            (None, None) => None,
        };

        let imperial_height = self.height_ft.is_some() || self.height_in.is_some();
        let height_cm = match (self.height_cm, imperial_height) {
            (Some(_), true) => {
                return Err("Provide height_cm or height_ft/height_in, not both".to_string())
            }
            (Some(cm), false) => Some(cm),
            (None, true) => {
                let cm = feet_inches_to_cm(self.height_ft.unwrap_or(0.0), self.height_in.unwrap_or(0.0))
                    .map_err(|e| e.to_string())?;
                Some(round_tenth(cm))
            }
            (None, false) => None,
        };

        Ok(ProfileUpdate {
            age: self.age,
            weight_kg,
            height_cm,
            gender: self.gender,
            activity_level: self.activity_level,
            goal_type: self.goal_type,
            daily_calorie_goal: self.daily_calorie_goal,
            protein_goal: self.protein_goal,
            carbs_goal: self.carbs_goal,
            fat_goal: self.fat_goal,
            unit_system: self.unit_system,
        })
    }
}

/// Body measurements in imperial units for display
#[derive(Debug, Serialize)]
pub struct ImperialDisplay {
    pub weight_lb: Option<f64>,
    pub height: Option<FeetInches>,
}

/// Response for get_profile and update_profile
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub profile: UserProfile,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub imperial: Option<ImperialDisplay>,
    /// Absent until age, weight, height, and gender are all set
    pub recommendation: Option<CalorieCalculatorResult>,
}

/// Response for calculate_calories
#[derive(Debug, Serialize)]
pub struct CalculateCaloriesResponse {
    pub input: Option<CalorieCalculatorInput>,
    pub result: Option<CalorieCalculatorResult>,
    pub breakdown: Option<String>,
    pub macros: Option<MacroGoals>,
    /// Fields still needed before a recommendation can be made
    pub missing: Vec<&'static str>,
    pub adopted: bool,
}

fn imperial_display(profile: &UserProfile) -> Result<Option<ImperialDisplay>, String> {
    if profile.unit_system != UnitSystem::Imperial {
        return Ok(None);
    }
    let weight_lb = profile
        .weight_kg
        .map(|kg| kg_to_pounds(kg).map(round_tenth))
        .transpose()
        .map_err(|e| e.to_string())?;
    let height = profile
        .height_cm
        .map(cm_to_feet_inches)
        .transpose()
        .map_err(|e| e.to_string())?;
    Ok(Some(ImperialDisplay { weight_lb, height }))
}

fn profile_response(profile: UserProfile) -> Result<ProfileResponse, String> {
    let recommendation = recommend_for_profile(&profile)
        .map_err(|e| format!("Failed to calculate recommendation: {}", e))?;
    Ok(ProfileResponse {
        imperial: imperial_display(&profile)?,
        recommendation,
        profile,
    })
}

fn missing_fields(profile: &UserProfile) -> Vec<&'static str> {
    let mut missing = Vec::new();
    if profile.age.is_none() {
        missing.push("age");
    }
    if profile.weight_kg.is_none() {
        missing.push("weight");
    }
    if profile.height_cm.is_none() {
        missing.push("height");
    }
    if profile.gender.is_none() {
        missing.push("gender");
    }
    missing
}

/// Get the stored profile with its recommendation
pub fn get_profile(db: &Database) -> Result<ProfileResponse, String> {
    let profile = db
        .with_conn(UserProfile::get_or_default)
        .map_err(|e| format!("Failed to get profile: {}", e))?;
    profile_response(profile)
}

/// Update profile fields
pub fn update_profile(db: &Database, input: &ProfileInput) -> Result<ProfileResponse, String> {
    let update = input.to_update()?;
    if update.is_empty() {
        return Err("No profile fields provided".to_string());
    }

    let profile = db
        .with_conn(|conn| UserProfile::update(conn, &update))
        .map_err(|e| format!("Failed to update profile: {}", e))?;
    profile_response(profile)
}

/// Calculate a calorie target from the profile, overridden by any supplied
/// fields. With `adopt`, the overrides, the target, and its macro split are
/// saved to the profile.
pub fn calculate_calories(
    db: &Database,
    input: &ProfileInput,
    adopt: bool,
) -> Result<CalculateCaloriesResponse, String> {
    let update = input.to_update()?;

    db.with_transaction(|tx| {
        let candidate = UserProfile::get_or_default(tx)?.apply(&update)?;

        let Some(calc_input) = CalorieCalculatorInput::from_profile(&candidate) else {
            return Ok(CalculateCaloriesResponse {
                input: None,
                result: None,
                breakdown: None,
                macros: None,
                missing: missing_fields(&candidate),
                adopted: false,
            });
        };

        let result = calculate_recommended_calories(&calc_input)?;
        let macros = recommended_macros(result.recommended_calories, calc_input.goal_type);

        if adopt {
            let adopted = update.clone().adopt_recommendation(&result, calc_input.goal_type);
            UserProfile::update(tx, &adopted)?;
        }

        Ok(CalculateCaloriesResponse {
            input: Some(calc_input),
            breakdown: Some(format_breakdown(&result)),
            result: Some(result),
            macros: Some(macros),
            missing: Vec::new(),
            adopted: adopt,
        })
    })
    .map_err(|e| format!("Failed to calculate calories: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_database;

    fn biometrics() -> ProfileInput {
        ProfileInput {
            age: Some(30),
            weight_kg: Some(70.0),
            height_cm: Some(175.0),
            gender: Some(Gender::Male),
            ..Default::default()
        }
    }

    #[test]
    fn test_imperial_input_is_normalized() {
        let input = ProfileInput {
            weight_lb: Some(154.0),
            height_ft: Some(5.0),
            height_in: Some(9.0),
            ..Default::default()
        };
        let update = input.to_update().unwrap();
        assert_eq!(update.weight_kg, Some(69.9));
        assert_eq!(update.height_cm, Some(175.3));

        let both = ProfileInput {
            weight_kg: Some(70.0),
            weight_lb: Some(154.0),
            ..Default::default()
        };
        assert!(both.to_update().is_err());
    }

    #[test]
    fn test_get_profile_without_data() {
        let db = test_database();
        let response = get_profile(&db).unwrap();
        assert_eq!(response.profile.daily_calorie_goal, 2000);
        assert!(response.recommendation.is_none());
        assert!(response.imperial.is_none());
    }

    #[test]
    fn test_update_profile_adds_recommendation() {
        let db = test_database();
        let mut input = biometrics();
        input.unit_system = Some(UnitSystem::Imperial);
        let response = update_profile(&db, &input).unwrap();
        assert_eq!(response.recommendation.unwrap().recommended_calories, 2556);

        let imperial = response.imperial.unwrap();
        assert_eq!(imperial.weight_lb, Some(154.3));
        assert_eq!(imperial.height, Some(FeetInches { feet: 5, inches: 9 }));

        assert!(update_profile(&db, &ProfileInput::default()).is_err());
    }

    #[test]
    fn test_calculate_reports_missing_fields() {
        let db = test_database();
        let response = calculate_calories(
            &db,
            &ProfileInput {
                age: Some(30),
                ..Default::default()
            },
            false,
        )
        .unwrap();
        assert!(response.result.is_none());
        assert_eq!(response.missing, vec!["weight", "height", "gender"]);
    }

    #[test]
    fn test_calculate_without_adopt_saves_nothing() {
        let db = test_database();
        let response = calculate_calories(&db, &biometrics(), false).unwrap();
        assert_eq!(response.result.unwrap().bmr, 1649);
        assert!(!response.adopted);
        let profile = get_profile(&db).unwrap().profile;
        assert_eq!(profile.weight_kg, None);
        assert_eq!(profile.daily_calorie_goal, 2000);
    }

    #[test]
    fn test_calculate_and_adopt() {
        let db = test_database();
        let mut input = biometrics();
        input.goal_type = Some(GoalType::LoseWeight);
        let response = calculate_calories(&db, &input, true).unwrap();
        assert!(response.adopted);
        assert_eq!(response.result.unwrap().recommended_calories, 2056);
        let breakdown = response.breakdown.unwrap();
        assert!(breakdown.contains("Adjustment: -500 cal"));

        let profile = get_profile(&db).unwrap().profile;
        assert_eq!(profile.daily_calorie_goal, 2056);
        assert_eq!(profile.goal_type, GoalType::LoseWeight);
        assert_eq!(profile.weight_kg, Some(70.0));
        // 2056 * 0.30 / 4 = 154.2
        assert_eq!(profile.protein_goal, Some(154));
    }
}
