//! Dashboard MCP Tools
//!
//! Window summaries, streaks, and calorie trends built from logged entries.

use std::str::FromStr;

use chrono::NaiveDate;
use serde::Serialize;

use crate::db::Database;
use crate::models::{FoodEntry, UserProfile};
use crate::nutrition::aggregation::{
    calorie_trend, compute_streaks, dashboard_stats, summarize_window, CalorieTrendPoint,
    DashboardStats, DaySummary, StreakInfo,
};
use crate::nutrition::dates::{month_start, week_start, window_start};
use crate::nutrition::NutritionError;

/// Longest window a summary may cover
pub const MAX_SUMMARY_DAYS: u32 = 366;

/// Which days a summary covers, always ending on the reference date
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryPeriod {
    /// The last N days
    Days(u32),
    /// Monday of the reference week through the reference date
    ThisWeek,
    /// First of the month through the reference date
    ThisMonth,
}

impl Default for SummaryPeriod {
    fn default() -> Self {
        SummaryPeriod::Days(7)
    }
}

impl FromStr for SummaryPeriod {
    type Err = NutritionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace([' ', '-'], "_").as_str() {
            "week" | "last_7_days" => Ok(SummaryPeriod::Days(7)),
            "month" | "last_30_days" => Ok(SummaryPeriod::Days(30)),
            "this_week" => Ok(SummaryPeriod::ThisWeek),
            "this_month" => Ok(SummaryPeriod::ThisMonth),
            _ => Err(NutritionError::UnknownValue {
                kind: "summary period",
                value: s.to_string(),
            }),
        }
    }
}

impl SummaryPeriod {
    /// First date of the period ending on `end`
    pub fn start(&self, end: NaiveDate) -> NaiveDate {
        match self {
            SummaryPeriod::Days(days) => window_start(end, *days),
            SummaryPeriod::ThisWeek => week_start(end),
            SummaryPeriod::ThisMonth => month_start(end),
        }
    }
}

/// Response for get_summary
#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub calorie_goal: i32,
    pub days: Vec<DaySummary>,
    pub streaks: StreakInfo,
    pub stats: DashboardStats,
    pub trend: Vec<CalorieTrendPoint>,
}

/// Summarize the period ending on `end_date` against the current goal
pub fn get_summary(db: &Database, end_date: NaiveDate, period: SummaryPeriod) -> Result<SummaryResponse, String> {
    if let SummaryPeriod::Days(n) = period {
        if n == 0 || n > MAX_SUMMARY_DAYS {
            return Err(format!("Summary must cover 1 to {} days", MAX_SUMMARY_DAYS));
        }
    }
    let start_date = period.start(end_date);
    let days = u32::try_from((end_date - start_date).num_days() + 1)
        .map_err(|e| format!("Invalid summary window: {}", e))?;

    let (entries, profile) = db
        .with_conn(|conn| {
            Ok((
                FoodEntry::list_in_range(conn, start_date, end_date)?,
                UserProfile::get_or_default(conn)?,
            ))
        })
        .map_err(|e| format!("Failed to load entries: {}", e))?;

    let summaries = summarize_window(&entries, end_date, days, profile.daily_calorie_goal);
    tracing::debug!(%start_date, %end_date, entries = entries.len(), "built summary");

    Ok(SummaryResponse {
        start_date,
        end_date,
        calorie_goal: profile.daily_calorie_goal,
        streaks: compute_streaks(&summaries),
        stats: dashboard_stats(&summaries),
        trend: calorie_trend(&summaries),
        days: summaries,
    })
}
