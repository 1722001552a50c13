//! Daily and windowed nutrition summaries
//!
//! Everything here is derived from entry lists on demand. Totals are summed
//! in full precision and rounded once for display.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use super::dates::{date_range, window_start};
use super::scaler::{round_tenth, round_whole};
use crate::models::{FoodEntry, MealType, NutritionFacts};

/// Entries for one date and what they add up to
#[derive(Debug, Clone, Serialize)]
pub struct DailyLog {
    pub date: NaiveDate,
    pub entries: Vec<FoodEntry>,
    /// Full-precision sum of every entry's nutrition times its servings
    pub totals: NutritionFacts,
}

/// Per-meal subtotal within a day
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MealSubtotal {
    pub meal_type: MealType,
    pub entry_count: usize,
    pub calories: f64,
}

impl DailyLog {
    /// Build a log for `date` from entries; entries for other dates are ignored
    pub fn new(date: NaiveDate, entries: Vec<FoodEntry>) -> Self {
        let entries: Vec<FoodEntry> = entries.into_iter().filter(|e| e.date == date).collect();
        let totals = daily_totals(&entries);
        Self {
            date,
            entries,
            totals,
        }
    }

    /// Totals with display rounding applied once
    pub fn rounded(&self) -> NutritionFacts {
        self.totals.rounded()
    }

    pub fn meal_subtotals(&self) -> Vec<MealSubtotal> {
        MealType::ALL
            .iter()
            .filter_map(|meal_type| {
                let meals: Vec<&FoodEntry> = self
                    .entries
                    .iter()
                    .filter(|e| e.meal_type == *meal_type)
                    .collect();
                if meals.is_empty() {
                    return None;
                }
                let calories: f64 = meals.iter().map(|e| e.nutrition().calories).sum();
                Some(MealSubtotal {
                    meal_type: *meal_type,
                    entry_count: meals.len(),
                    calories: round_whole(calories),
                })
            })
            .collect()
    }
}

/// Sum of nutrition x servings over the given entries, unrounded
pub fn daily_totals(entries: &[FoodEntry]) -> NutritionFacts {
    entries.iter().map(FoodEntry::nutrition).sum()
}

/// One calendar day of a report window
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DaySummary {
    pub date: NaiveDate,
    pub total_calories: f64,
    /// Goal at the time the summary was built
    pub calorie_goal: i32,
    pub total_protein: f64,
    pub total_carbs: f64,
    pub total_fat: f64,
    /// Number of entries logged that day
    pub meals_logged: usize,
    pub is_goal_met: bool,
}

impl DaySummary {
    pub fn is_logged(&self) -> bool {
        self.meals_logged > 0
    }
}

/// A day meets its goal when something was eaten and the total stays at or
/// under the goal. Empty days never count.
pub fn is_goal_met(total_calories: f64, calorie_goal: i32) -> bool {
    total_calories > 0.0 && total_calories <= f64::from(calorie_goal)
}

/// One summary per calendar day in the `days`-long window ending on `end`,
/// oldest first. Days without entries get zero totals.
pub fn summarize_window(
    entries: &[FoodEntry],
    end: NaiveDate,
    days: u32,
    calorie_goal: i32,
) -> Vec<DaySummary> {
    if days == 0 {
        return Vec::new();
    }
    let start = window_start(end, days);

    let mut by_date: BTreeMap<NaiveDate, Vec<&FoodEntry>> = BTreeMap::new();
    for entry in entries.iter().filter(|e| e.date >= start && e.date <= end) {
        by_date.entry(entry.date).or_default().push(entry);
    }

    date_range(start, end)
        .into_iter()
        .map(|date| {
            let day_entries = by_date.get(&date).map(Vec::as_slice).unwrap_or(&[]);
            let totals: NutritionFacts = day_entries.iter().map(|e| e.nutrition()).sum();
            DaySummary {
                date,
                total_calories: round_whole(totals.calories),
                calorie_goal,
                total_protein: round_tenth(totals.protein),
                total_carbs: round_tenth(totals.carbs),
                total_fat: round_tenth(totals.fat),
                meals_logged: day_entries.len(),
                is_goal_met: is_goal_met(totals.calories, calorie_goal),
            }
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct StreakInfo {
    pub current_streak: u32,
    pub longest_streak: u32,
    pub total_days_logged: u32,
}

/// Streak statistics over a window ordered oldest to newest.
///
/// The current streak counts back from the newest day and is zero when the
/// newest day has nothing logged.
pub fn compute_streaks(days: &[DaySummary]) -> StreakInfo {
    let mut info = StreakInfo::default();
    let mut run = 0u32;
    let mut counting_current = true;

    for day in days.iter().rev() {
        if day.is_logged() {
            info.total_days_logged += 1;
            run += 1;
            info.longest_streak = info.longest_streak.max(run);
            if counting_current {
                info.current_streak += 1;
            }
        } else {
            run = 0;
            counting_current = false;
        }
    }

    info
}

/// Headline numbers for a report window
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardStats {
    pub days: usize,
    /// Average over every day in the window, empty days included
    pub average_calories: f64,
    pub days_on_goal: usize,
    pub average_protein_calories: f64,
    pub average_carbs_calories: f64,
    pub average_fat_calories: f64,
}

pub fn dashboard_stats(days: &[DaySummary]) -> DashboardStats {
    let count = days.len();
    let average = |f: &dyn Fn(&DaySummary) -> f64| {
        if count == 0 {
            0.0
        } else {
            round_whole(days.iter().map(f).sum::<f64>() / count as f64)
        }
    };

    DashboardStats {
        days: count,
        average_calories: average(&|d| d.total_calories),
        days_on_goal: days.iter().filter(|d| d.is_goal_met).count(),
        average_protein_calories: average(&|d| d.total_protein * 4.0),
        average_carbs_calories: average(&|d| d.total_carbs * 4.0),
        average_fat_calories: average(&|d| d.total_fat * 9.0),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalorieTrendPoint {
    pub date: NaiveDate,
    pub calories: f64,
    pub goal: i32,
    /// Calories minus goal; negative means under goal
    pub difference: f64,
}

pub fn calorie_trend(days: &[DaySummary]) -> Vec<CalorieTrendPoint> {
    days.iter()
        .map(|d| CalorieTrendPoint {
            date: d.date,
            calories: d.total_calories,
            goal: d.calorie_goal,
            difference: d.total_calories - f64::from(d.calorie_goal),
        })
        .collect()
}
