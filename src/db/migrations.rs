//! Database migrations
//!
//! Schema creation and migration logic.

use rusqlite::Connection;

use super::connection::DbResult;

/// Current schema version
const SCHEMA_VERSION: i32 = 1;

/// Run all migrations to bring the database up to the current schema version
pub fn run_migrations(conn: &Connection) -> DbResult<()> {
    // Create migrations table if it doesn't exist
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
        [],
    )?;

    let current_version = get_schema_version(conn)?;

    if current_version < 1 {
        migrate_v1(conn)?;
        conn.execute("INSERT INTO schema_migrations (version) VALUES (1)", [])?;
        tracing::info!("applied schema migration v1");
    }

    Ok(())
}

/// Migration v1: Initial schema
fn migrate_v1(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(
        r#"
        -- ============================================
        -- FOOD ITEMS
        -- Catalog of foods with nutrition per serving
        -- ============================================
        CREATE TABLE food_items (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            brand TEXT,
            serving_size REAL NOT NULL CHECK(serving_size > 0),
            serving_unit TEXT NOT NULL,          -- "g", "ml", "oz", "cup", "piece", ...

            -- Nutrition for one serving_size of serving_unit
            calories REAL NOT NULL DEFAULT 0,
            protein REAL NOT NULL DEFAULT 0,     -- grams
            carbs REAL NOT NULL DEFAULT 0,       -- grams
            fat REAL NOT NULL DEFAULT 0,         -- grams
            fiber REAL,                          -- grams
            sugar REAL,                          -- grams
            sodium REAL,                         -- milligrams
            cholesterol REAL,                    -- milligrams
            saturated_fat REAL,                  -- grams
            trans_fat REAL,                      -- grams

            barcode TEXT,
            is_custom INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX idx_food_items_name ON food_items(name);
        CREATE INDEX idx_food_items_barcode ON food_items(barcode);

        -- ============================================
        -- FOOD ENTRIES
        -- Logged consumption; each row owns a JSON copy of the food as logged
        -- ============================================
        CREATE TABLE food_entries (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            food_item_id INTEGER REFERENCES food_items(id) ON DELETE SET NULL,
            food_snapshot TEXT NOT NULL,
            servings REAL NOT NULL CHECK(servings > 0),
            meal_type TEXT NOT NULL CHECK(meal_type IN ('breakfast', 'lunch', 'dinner', 'snack')),
            date TEXT NOT NULL,                  -- YYYY-MM-DD, local calendar day
            notes TEXT,
            created_at TEXT NOT NULL
        );

        CREATE INDEX idx_food_entries_date ON food_entries(date);
        CREATE INDEX idx_food_entries_food_item ON food_entries(food_item_id);

        -- ============================================
        -- USER PROFILE
        -- Single row holding biometrics and goals
        -- ============================================
        CREATE TABLE user_profile (
            id INTEGER PRIMARY KEY CHECK(id = 1),
            age INTEGER,
            weight_kg REAL,
            height_cm REAL,
            gender TEXT CHECK(gender IN ('male', 'female', 'other')),
            activity_level TEXT NOT NULL DEFAULT 'moderately_active',
            goal_type TEXT NOT NULL DEFAULT 'maintain_weight',
            daily_calorie_goal INTEGER NOT NULL DEFAULT 2000 CHECK(daily_calorie_goal > 0),
            protein_goal INTEGER,                -- grams
            carbs_goal INTEGER,                  -- grams
            fat_goal INTEGER,                    -- grams
            unit_system TEXT NOT NULL DEFAULT 'metric' CHECK(unit_system IN ('metric', 'imperial')),
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );
        "#,
    )?;

    Ok(())
}

/// Get the current schema version
pub fn get_schema_version(conn: &Connection) -> DbResult<i32> {
    let version: i32 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
        [],
        |row| row.get(0),
    )?;
    Ok(version)
}

/// Check if the database needs migration
pub fn needs_migration(conn: &Connection) -> DbResult<bool> {
    let current = get_schema_version(conn)?;
    Ok(current < SCHEMA_VERSION)
}
