//! Calorie target calculation
//!
//! Mifflin-St Jeor BMR, activity-adjusted TDEE, and a goal-adjusted daily
//! calorie recommendation with safety bounds. The steps always run in the
//! same order (BMR, TDEE, goal delta, clamp) and each intermediate value is
//! rounded before the next step uses it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::{ensure_positive, NutritionError, NutritionResult};
use crate::models::{NutritionFacts, UserProfile};

/// Minimum recommended intake for women
pub const MIN_CALORIES_FEMALE: i32 = 1200;
/// Minimum recommended intake for men and unspecified gender
pub const MIN_CALORIES_DEFAULT: i32 = 1500;
/// Maximum recommended intake
pub const MAX_CALORIES: i32 = 5000;

const KCAL_PER_G_PROTEIN: f64 = 4.0;
const KCAL_PER_G_CARBS: f64 = 4.0;
const KCAL_PER_G_FAT: f64 = 9.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    /// BMR uses the midpoint of the male and female offsets
    Other,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Other => "other",
        }
    }

    /// Constant added to the Mifflin-St Jeor base
    fn bmr_offset(&self) -> f64 {
        match self {
            Gender::Male => 5.0,
            Gender::Female => -161.0,
            Gender::Other => -78.0,
        }
    }

    pub fn minimum_calories(&self) -> i32 {
        match self {
            Gender::Female => MIN_CALORIES_FEMALE,
            Gender::Male | Gender::Other => MIN_CALORIES_DEFAULT,
        }
    }
}

impl FromStr for Gender {
    type Err = NutritionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "male" | "m" => Ok(Gender::Male),
            "female" | "f" => Ok(Gender::Female),
            "other" => Ok(Gender::Other),
            _ => Err(NutritionError::UnknownValue {
                kind: "gender",
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    /// Little or no exercise
    Sedentary,
    /// Exercise 1-3 days/week
    LightlyActive,
    /// Exercise 3-5 days/week
    #[default]
    ModeratelyActive,
    /// Exercise 6-7 days/week
    VeryActive,
    /// Very hard exercise daily or a physical job
    ExtraActive,
}

impl ActivityLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityLevel::Sedentary => "sedentary",
            ActivityLevel::LightlyActive => "lightly_active",
            ActivityLevel::ModeratelyActive => "moderately_active",
            ActivityLevel::VeryActive => "very_active",
            ActivityLevel::ExtraActive => "extra_active",
        }
    }

    pub fn multiplier(&self) -> f64 {
        match self {
            ActivityLevel::Sedentary => 1.2,
            ActivityLevel::LightlyActive => 1.375,
            ActivityLevel::ModeratelyActive => 1.55,
            ActivityLevel::VeryActive => 1.725,
            ActivityLevel::ExtraActive => 1.9,
        }
    }
}

impl FromStr for ActivityLevel {
    type Err = NutritionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace([' ', '-'], "_").as_str() {
            "sedentary" => Ok(ActivityLevel::Sedentary),
            "lightly_active" | "light" => Ok(ActivityLevel::LightlyActive),
            "moderately_active" | "moderate" => Ok(ActivityLevel::ModeratelyActive),
            "very_active" => Ok(ActivityLevel::VeryActive),
            "extra_active" => Ok(ActivityLevel::ExtraActive),
            _ => Err(NutritionError::UnknownValue {
                kind: "activity level",
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalType {
    LoseWeight,
    #[default]
    MaintainWeight,
    GainWeight,
}

impl GoalType {
    pub fn as_str(&self) -> &'static str {
        match self {
            GoalType::LoseWeight => "lose_weight",
            GoalType::MaintainWeight => "maintain_weight",
            GoalType::GainWeight => "gain_weight",
        }
    }

    /// Daily calorie delta applied to TDEE
    pub fn adjustment(&self) -> i32 {
        match self {
            GoalType::LoseWeight => -500,
            GoalType::MaintainWeight => 0,
            GoalType::GainWeight => 400,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            GoalType::LoseWeight => "Lose ~0.5 kg (1 lb) per week",
            GoalType::MaintainWeight => "Maintain current weight",
            GoalType::GainWeight => "Gain ~0.3-0.5 kg per week (lean)",
        }
    }

    /// Protein / carbs / fat shares of daily calories
    fn macro_ratios(&self) -> (f64, f64, f64) {
        match self {
            GoalType::LoseWeight => (0.30, 0.45, 0.25),
            GoalType::GainWeight => (0.25, 0.50, 0.25),
            GoalType::MaintainWeight => (0.25, 0.45, 0.30),
        }
    }
}

impl FromStr for GoalType {
    type Err = NutritionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace([' ', '-'], "_").as_str() {
            "lose_weight" | "lose" => Ok(GoalType::LoseWeight),
            "maintain_weight" | "maintain" => Ok(GoalType::MaintainWeight),
            "gain_weight" | "gain" => Ok(GoalType::GainWeight),
            _ => Err(NutritionError::UnknownValue {
                kind: "goal type",
                value: s.to_string(),
            }),
        }
    }
}

/// Biometric and preference inputs, in metric units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalorieCalculatorInput {
    pub weight_kg: f64,
    pub height_cm: f64,
    pub age: u32,
    pub gender: Gender,
    pub activity_level: ActivityLevel,
    pub goal_type: GoalType,
}

impl CalorieCalculatorInput {
    /// Build calculator input from a profile; `None` unless `can_calculate`
    pub fn from_profile(profile: &UserProfile) -> Option<Self> {
        if !can_calculate(profile) {
            return None;
        }
        Some(Self {
            weight_kg: profile.weight_kg?,
            height_cm: profile.height_cm?,
            age: profile.age?,
            gender: profile.gender?,
            activity_level: profile.activity_level,
            goal_type: profile.goal_type,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalorieCalculatorResult {
    /// Basal Metabolic Rate
    pub bmr: i32,
    /// Total Daily Energy Expenditure (maintenance)
    pub tdee: i32,
    pub recommended_calories: i32,
    /// Signed adjustment from TDEE for the goal
    pub deficit: i32,
    pub goal_description: String,
}

/// Daily macro targets in grams
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MacroGoals {
    pub protein: u32,
    pub carbs: u32,
    pub fat: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MacroShare {
    pub grams: f64,
    pub calories: f64,
    pub percentage: u32,
}

/// Calories contributed by each macro and its share of the macro total
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MacroBreakdown {
    pub protein: MacroShare,
    pub carbs: MacroShare,
    pub fat: MacroShare,
}

/// Mifflin-St Jeor basal metabolic rate, rounded to whole calories
pub fn calculate_bmr(weight_kg: f64, height_cm: f64, age: u32, gender: Gender) -> NutritionResult<i32> {
    let weight_kg = ensure_positive("weight_kg", weight_kg)?;
    let height_cm = ensure_positive("height_cm", height_cm)?;
    ensure_positive("age", f64::from(age))?;

    let base = 10.0 * weight_kg + 6.25 * height_cm - 5.0 * f64::from(age);
    Ok((base + gender.bmr_offset()).round() as i32)
}

pub fn calculate_tdee(bmr: i32, activity_level: ActivityLevel) -> i32 {
    (f64::from(bmr) * activity_level.multiplier()).round() as i32
}

/// Run the full BMR -> TDEE -> goal -> clamp pipeline
pub fn calculate_recommended_calories(
    input: &CalorieCalculatorInput,
) -> NutritionResult<CalorieCalculatorResult> {
    let bmr = calculate_bmr(input.weight_kg, input.height_cm, input.age, input.gender)?;
    let tdee = calculate_tdee(bmr, input.activity_level);

    let adjustment = input.goal_type.adjustment();
    let mut recommended = tdee + adjustment;

    let minimum = input.gender.minimum_calories();
    if recommended < minimum {
        recommended = minimum;
    }
    if recommended > MAX_CALORIES {
        recommended = MAX_CALORIES;
    }

    tracing::debug!(bmr, tdee, recommended, "calculated calorie recommendation");

    Ok(CalorieCalculatorResult {
        bmr,
        tdee,
        recommended_calories: recommended,
        deficit: adjustment,
        goal_description: input.goal_type.description().to_string(),
    })
}

/// Whether the profile has every field the recommendation needs
pub fn can_calculate(profile: &UserProfile) -> bool {
    let positive = |v: Option<f64>| v.is_some_and(|v| v.is_finite() && v > 0.0);
    positive(profile.weight_kg)
        && positive(profile.height_cm)
        && profile.age.is_some_and(|age| age > 0)
        && profile.gender.is_some()
}

/// Recommendation for a stored profile.
///
/// `Ok(None)` means the profile is missing required data; no recommendation
/// should be shown.
pub fn recommend_for_profile(profile: &UserProfile) -> NutritionResult<Option<CalorieCalculatorResult>> {
    CalorieCalculatorInput::from_profile(profile)
        .map(|input| calculate_recommended_calories(&input))
        .transpose()
}

/// Split a calorie target into gram targets for the goal
pub fn recommended_macros(calories: i32, goal_type: GoalType) -> MacroGoals {
    let (protein, carbs, fat) = goal_type.macro_ratios();
    let calories = f64::from(calories.max(0));
    MacroGoals {
        protein: (calories * protein / KCAL_PER_G_PROTEIN).round() as u32,
        carbs: (calories * carbs / KCAL_PER_G_CARBS).round() as u32,
        fat: (calories * fat / KCAL_PER_G_FAT).round() as u32,
    }
}

pub fn macro_breakdown(nutrition: &NutritionFacts) -> MacroBreakdown {
    let protein_cals = nutrition.protein * KCAL_PER_G_PROTEIN;
    let carbs_cals = nutrition.carbs * KCAL_PER_G_CARBS;
    let fat_cals = nutrition.fat * KCAL_PER_G_FAT;
    let total = protein_cals + carbs_cals + fat_cals;

    let share = |grams: f64, calories: f64| MacroShare {
        grams,
        calories,
        percentage: if total > 0.0 {
            (calories / total * 100.0).round() as u32
        } else {
            0
        },
    };

    MacroBreakdown {
        protein: share(nutrition.protein, protein_cals),
        carbs: share(nutrition.carbs, carbs_cals),
        fat: share(nutrition.fat, fat_cals),
    }
}

/// Group digits with commas: 12345 -> "12,345"
///
/// Only en-US grouping is ever shown, so no locale crate is pulled in for it.
fn with_thousands(value: i32) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

impl fmt::Display for CalorieCalculatorResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "BMR (Base Metabolism): {} cal", with_thousands(self.bmr))?;
        writeln!(f, "TDEE (Maintenance): {} cal", with_thousands(self.tdee))?;
        writeln!(f, "Goal: {}", self.goal_description)?;
        let sign = if self.deficit > 0 { "+" } else { "" };
        write!(f, "Adjustment: {}{} cal", sign, self.deficit)
    }
}

/// Multi-line breakdown of a recommendation for display
pub fn format_breakdown(result: &CalorieCalculatorResult) -> String {
    result.to_string()
}
