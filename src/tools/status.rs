//! CICO Status Tool
//!
//! Provides runtime status information about the CICO service.

use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;
use sysinfo::{Pid, ProcessesToUpdate, System};

use crate::build_info::BuildInfo;
use crate::db::{migrations, Database};
use crate::models::{FoodEntry, FoodItem};

/// Food logging instructions for AI assistants
pub const LOGGING_INSTRUCTIONS: &str = r#"
# CICO Food Logging Instructions

## Dates

All dates are local calendar days in ISO format: YYYY-MM-DD. Ask the user
for the date rather than guessing it.

## Catalog items

Use `search_food_items` before `add_food_item` to avoid duplicates.

| Food kind  | serving_size | serving_unit | Nutrition entered as |
|------------|--------------|--------------|----------------------|
| Solids     | 100          | g            | per 100 grams        |
| Liquids    | 100          | ml           | per 100 milliliters  |
| Countables | 1            | piece        | per 1 item           |

Other units (oz, fl_oz, cup, tbsp, tsp, slice, serving) are accepted when a
label states them. Fluid ounces are stored as milliliters.

## Logging

`log_food` takes a `food_item_id`, a `date`, a `meal_type`
(breakfast, lunch, dinner, snack) and `servings`. To log a measured amount,
pass `amount` and `unit` as well: nutrition is scaled from the label to
that amount and multiplied by `servings`. Use `preview_serving` to show the
numbers before logging.

Each entry keeps its own copy of the food. `edit_entry` rescales that copy
only; the catalog item and other entries are never changed. Entries for
countable foods can only change servings, meal type, or notes.

## Goals

`calculate_calories` derives BMR, TDEE, and a daily target from the profile
or explicit values. Pass `adopt: true` to save the target and macro split to
the profile. Targets never go below 1200 (female) or 1500 (male/other) and
never above 5000.
"#;

/// Runtime status of the CICO service
#[derive(Debug, Clone, Serialize)]
pub struct CicoStatus {
    /// Build information
    pub build_number: u64,
    pub build_timestamp: &'static str,
    pub version: &'static str,

    /// Database information
    pub database_path: String,
    pub database_size_bytes: Option<u64>,
    pub schema_version: Option<i32>,
    pub migration_pending: Option<bool>,
    pub food_item_count: Option<i64>,
    pub entry_count: Option<i64>,

    /// Process information
    pub uptime_seconds: u64,
    pub process_id: u32,
    pub memory_usage_bytes: u64,
}

/// Status tracker for collecting runtime information
pub struct StatusTracker {
    start_time: Instant,
    database_path: PathBuf,
}

impl StatusTracker {
    /// Create a new status tracker
    pub fn new(database_path: PathBuf) -> Self {
        Self {
            start_time: Instant::now(),
            database_path,
        }
    }

    /// Get the current status
    pub fn get_status(&self, database: &Database) -> CicoStatus {
        let build_info = BuildInfo::current();

        // Get database size if it exists
        let database_size_bytes = std::fs::metadata(&self.database_path)
            .ok()
            .map(|m| m.len());

        let schema = database.with_conn(|conn| {
            Ok((
                migrations::get_schema_version(conn)?,
                migrations::needs_migration(conn)?,
            ))
        });
        let (schema_version, migration_pending) = match schema {
            Ok((version, pending)) => (Some(version), Some(pending)),
            Err(e) => {
                tracing::warn!(error = %e, "could not read schema version for status");
                (None, None)
            }
        };

        let counts = database
            .with_conn(|conn| Ok((FoodItem::count(conn)?, FoodEntry::count(conn)?)));
        let (food_item_count, entry_count) = match counts {
            Ok((items, entries)) => (Some(items), Some(entries)),
            Err(e) => {
                tracing::warn!(error = %e, "could not read database counts for status");
                (None, None)
            }
        };

        // Get process info
        let pid = std::process::id();
        let mut sys = System::new();
        sys.refresh_processes(ProcessesToUpdate::Some(&[Pid::from_u32(pid)]));

        let memory_usage_bytes = sys
            .process(Pid::from_u32(pid))
            .map(|p| p.memory())
            .unwrap_or(0);

        CicoStatus {
            build_number: build_info.build_number,
            build_timestamp: build_info.build_timestamp,
            version: build_info.version,
            database_path: self.database_path.display().to_string(),
            database_size_bytes,
            schema_version,
            migration_pending,
            food_item_count,
            entry_count,
            uptime_seconds: self.start_time.elapsed().as_secs(),
            process_id: pid,
            memory_usage_bytes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_database;

    #[test]
    fn test_status_reports_counts() {
        let db = test_database();
        let tracker = StatusTracker::new(PathBuf::from(":memory:"));
        let status = tracker.get_status(&db);
        assert_eq!(status.schema_version, Some(1));
        assert_eq!(status.migration_pending, Some(false));
        assert_eq!(status.food_item_count, Some(0));
        assert_eq!(status.entry_count, Some(0));
        assert_eq!(status.database_size_bytes, None);
        assert_eq!(status.process_id, std::process::id());
    }

    #[test]
    fn test_status_flags_unmigrated_database() {
        let db = Database::in_memory().unwrap();
        db.with_conn(|conn| {
            conn.execute_batch("CREATE TABLE schema_migrations (version INTEGER PRIMARY KEY)")?;
            Ok(())
        })
        .unwrap();
        let status = StatusTracker::new(PathBuf::from(":memory:")).get_status(&db);
        assert_eq!(status.schema_version, Some(0));
        assert_eq!(status.migration_pending, Some(true));
        // Tables are missing, so the counts cannot be read either
        assert_eq!(status.food_item_count, None);
    }
}
