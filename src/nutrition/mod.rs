//! Nutrition core
//!
//! Pure unit conversion, serving scaling, calorie-target calculation, and
//! log aggregation. Nothing in here touches the database.

pub mod aggregation;
pub mod calculator;
pub mod converter;
pub mod dates;
pub mod error;
pub mod scaler;
pub mod units;

pub use aggregation::{
    calorie_trend, compute_streaks, daily_totals, dashboard_stats, is_goal_met,
    summarize_window, CalorieTrendPoint, DailyLog, DashboardStats, DaySummary, StreakInfo,
};
pub use calculator::{
    calculate_bmr, calculate_recommended_calories, calculate_tdee, can_calculate,
    format_breakdown, macro_breakdown, recommend_for_profile, recommended_macros,
    ActivityLevel, CalorieCalculatorInput, CalorieCalculatorResult, Gender, GoalType,
    MacroBreakdown, MacroGoals,
};
pub use converter::{to_grams, to_ml, FeetInches};
pub use error::{NutritionError, NutritionResult};
pub use scaler::{round_tenth, round_whole, NutritionScaler, RoundingMode, ServingEdit};
pub use units::{ServingUnit, UnitCategory, UnitSystem};
