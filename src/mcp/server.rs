//! CICO MCP Server Implementation
//!
//! Implements the MCP server with all CICO tools.

use std::path::PathBuf;
use std::sync::Arc;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::{schemars, tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::db::Database;
use crate::models::{FoodItemCreate, MealType, NutritionFacts};
use crate::nutrition::ServingUnit;
use crate::tools::dashboard::{self, SummaryPeriod};
use crate::tools::entries::{self, EditEntryRequest, LogFoodRequest};
use crate::tools::profile::{self, ProfileInput};
use crate::tools::status::StatusTracker;
use crate::tools::{convert, food_items, parse_date, parse_opt, today};

/// CICO MCP Service
#[derive(Clone)]
pub struct CicoService {
    status_tracker: Arc<Mutex<StatusTracker>>,
    database: Database,
    tool_router: ToolRouter<CicoService>,
}

impl CicoService {
    pub fn new(database_path: PathBuf, database: Database) -> Self {
        Self {
            status_tracker: Arc::new(Mutex::new(StatusTracker::new(database_path))),
            database,
            tool_router: Self::tool_router(),
        }
    }
}

/// Serialize a tool response as pretty JSON text content
fn json_result<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| McpError::internal_error(format!("Serialization error: {}", e), None))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

fn invalid(message: String) -> McpError {
    McpError::invalid_params(message, None)
}

fn date_or_today(date: Option<&str>) -> Result<chrono::NaiveDate, McpError> {
    date.map(parse_date).transpose().map_err(invalid).map(|d| d.unwrap_or_else(today))
}

// ============================================================================
// Food Item Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AddFoodItemParams {
    pub name: String,
    pub brand: Option<String>,
    /// Amount the nutrition values are for, e.g. 100
    pub serving_size: f64,
    /// g, ml, oz, fl_oz, cup, tbsp, tsp, piece, slice, or serving
    pub serving_unit: String,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub fiber: Option<f64>,
    pub sugar: Option<f64>,
    /// Milligrams
    pub sodium: Option<f64>,
    /// Milligrams
    pub cholesterol: Option<f64>,
    pub saturated_fat: Option<f64>,
    pub trans_fat: Option<f64>,
    pub barcode: Option<String>,
    #[serde(default = "default_true")]
    pub is_custom: bool,
}

fn default_true() -> bool { true }

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SearchFoodItemsParams {
    pub query: String,
    #[serde(default = "default_search_limit")]
    pub limit: i64,
}

fn default_search_limit() -> i64 { 20 }

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GetFoodItemParams {
    pub id: i64,
}

// ============================================================================
// Entry Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct LogFoodParams {
    pub food_item_id: i64,
    /// YYYY-MM-DD, defaults to today
    pub date: Option<String>,
    /// breakfast, lunch, dinner, or snack
    pub meal_type: String,
    #[serde(default = "default_servings")]
    pub servings: f64,
    /// Measured amount per serving, e.g. 150 (with unit "g")
    pub amount: Option<f64>,
    pub unit: Option<String>,
    pub notes: Option<String>,
}

fn default_servings() -> f64 { 1.0 }

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct EditEntryParams {
    pub id: i64,
    /// New measured amount per serving
    pub amount: Option<f64>,
    pub unit: Option<String>,
    pub servings: Option<f64>,
    pub meal_type: Option<String>,
    /// Move the entry to another date (YYYY-MM-DD)
    pub date: Option<String>,
    /// Empty string clears the note
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct DeleteEntryParams {
    pub id: i64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GetDailyLogParams {
    /// YYYY-MM-DD, defaults to today
    pub date: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GetSummaryParams {
    /// Last day of the summary (YYYY-MM-DD), defaults to today
    pub end_date: Option<String>,
    /// Number of days ending on end_date (default 7)
    pub days: Option<u32>,
    /// week, month, this_week, or this_month; overrides days
    pub period: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PreviewServingParams {
    pub food_item_id: i64,
    pub amount: Option<f64>,
    pub unit: Option<String>,
    #[serde(default = "default_servings")]
    pub servings: f64,
    /// per_step (default, rounds each serving then the total) or final (rounds once)
    pub rounding: Option<String>,
}

// ============================================================================
// Profile Parameter Structs
// ============================================================================

#[derive(Debug, Default, Deserialize, schemars::JsonSchema)]
pub struct ProfileParams {
    pub age: Option<u32>,
    pub weight_kg: Option<f64>,
    pub weight_lb: Option<f64>,
    pub height_cm: Option<f64>,
    pub height_ft: Option<f64>,
    pub height_in: Option<f64>,
    /// male, female, or other
    pub gender: Option<String>,
    /// sedentary, lightly_active, moderately_active, very_active, extra_active
    pub activity_level: Option<String>,
    /// lose_weight, maintain_weight, or gain_weight
    pub goal_type: Option<String>,
    pub daily_calorie_goal: Option<i32>,
    pub protein_goal: Option<u32>,
    pub carbs_goal: Option<u32>,
    pub fat_goal: Option<u32>,
    /// metric or imperial
    pub unit_system: Option<String>,
}

impl ProfileParams {
    fn into_input(self) -> Result<ProfileInput, McpError> {
        Ok(ProfileInput {
            age: self.age,
            weight_kg: self.weight_kg,
            weight_lb: self.weight_lb,
            height_cm: self.height_cm,
            height_ft: self.height_ft,
            height_in: self.height_in,
            gender: parse_opt(self.gender.as_deref()).map_err(invalid)?,
            activity_level: parse_opt(self.activity_level.as_deref()).map_err(invalid)?,
            goal_type: parse_opt(self.goal_type.as_deref()).map_err(invalid)?,
            daily_calorie_goal: self.daily_calorie_goal,
            protein_goal: self.protein_goal,
            carbs_goal: self.carbs_goal,
            fat_goal: self.fat_goal,
            unit_system: parse_opt(self.unit_system.as_deref()).map_err(invalid)?,
        })
    }
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CalculateCaloriesParams {
    #[serde(flatten)]
    pub profile: ProfileParams,
    /// Save the result as the daily calorie and macro goals
    #[serde(default)]
    pub adopt: bool,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ConvertUnitsParams {
    pub value: f64,
    /// g, oz, ml, fl_oz, cup, tbsp, tsp, kg, lb, cm, in
    pub from: String,
    /// Same units as from, plus ft_in for heights
    pub to: String,
}

// ============================================================================
// Tool Router
// ============================================================================

#[tool_router]
impl CicoService {
    // --- Status ---

    #[tool(description = "Get the current status of the CICO service including build info, database status, and process information")]
    async fn cico_status(&self) -> Result<CallToolResult, McpError> {
        let tracker = self.status_tracker.lock().await;
        let status = tracker.get_status(&self.database);
        json_result(&status)
    }

    #[tool(description = "Get instructions for logging food. Call this when starting a food logging session or when unsure how to use the tools.")]
    fn logging_instructions(&self) -> Result<CallToolResult, McpError> {
        use crate::tools::status::LOGGING_INSTRUCTIONS;
        Ok(CallToolResult::success(vec![Content::text(LOGGING_INSTRUCTIONS)]))
    }

    // --- Food Items ---

    #[tool(description = "Create a new food item with nutrition for one serving of the given size and unit")]
    fn add_food_item(&self, Parameters(p): Parameters<AddFoodItemParams>) -> Result<CallToolResult, McpError> {
        let serving_unit = p.serving_unit.parse::<ServingUnit>().map_err(|e| invalid(e.to_string()))?;
        let data = FoodItemCreate {
            name: p.name,
            brand: p.brand,
            serving_size: p.serving_size,
            serving_unit,
            nutrition: NutritionFacts {
                fiber: p.fiber,
                sugar: p.sugar,
                sodium: p.sodium,
                cholesterol: p.cholesterol,
                saturated_fat: p.saturated_fat,
                trans_fat: p.trans_fat,
                ..NutritionFacts::basic(p.calories, p.protein, p.carbs, p.fat)
            },
            barcode: p.barcode,
            is_custom: p.is_custom,
        };
        let result = food_items::add_food_item(&self.database, data).map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Search for food items by name or brand. A numeric query that matches a barcode returns that item.")]
    fn search_food_items(&self, Parameters(p): Parameters<SearchFoodItemsParams>) -> Result<CallToolResult, McpError> {
        let result = food_items::search_food_items(&self.database, &p.query, p.limit).map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Get full details for a food item, including nutrition per 100 g/ml and how often it was logged")]
    fn get_food_item(&self, Parameters(p): Parameters<GetFoodItemParams>) -> Result<CallToolResult, McpError> {
        let result = food_items::get_food_item(&self.database, p.id).map_err(|e| McpError::internal_error(e, None))?;
        match result {
            Some(item) => json_result(&item),
            None => Ok(CallToolResult::success(vec![Content::text(format!(
                r#"{{"error": "Food item not found", "id": {}}}"#,
                p.id
            ))])),
        }
    }

    // --- Entries ---

    #[tool(description = "Log a food item for a date and meal. Pass amount and unit to log a measured quantity; nutrition is scaled from the item's label.")]
    fn log_food(&self, Parameters(p): Parameters<LogFoodParams>) -> Result<CallToolResult, McpError> {
        let request = LogFoodRequest {
            food_item_id: p.food_item_id,
            date: date_or_today(p.date.as_deref())?,
            meal_type: p.meal_type.parse::<MealType>().map_err(|e| invalid(e.to_string()))?,
            servings: p.servings,
            amount: p.amount,
            unit: parse_opt(p.unit.as_deref()).map_err(invalid)?,
            notes: p.notes,
        };
        let result = entries::log_food(&self.database, request).map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Edit a logged entry's amount, unit, servings, meal type, date, or notes. Only the entry's own copy of the food is rescaled. baseline_estimated means old values were reverse-scaled from rounded numbers; serving_mismatch means the entry was logged as a measured amount with several servings and its stored serving was rescaled as a per-100 g/ml label, so check the result.")]
    fn edit_entry(&self, Parameters(p): Parameters<EditEntryParams>) -> Result<CallToolResult, McpError> {
        let request = EditEntryRequest {
            id: p.id,
            amount: p.amount,
            unit: parse_opt(p.unit.as_deref()).map_err(invalid)?,
            servings: p.servings,
            meal_type: parse_opt(p.meal_type.as_deref()).map_err(invalid)?,
            date: p.date.as_deref().map(parse_date).transpose().map_err(invalid)?,
            notes: p.notes,
        };
        let result = entries::edit_entry(&self.database, request).map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Delete a logged entry")]
    fn delete_entry(&self, Parameters(p): Parameters<DeleteEntryParams>) -> Result<CallToolResult, McpError> {
        let result = entries::delete_entry(&self.database, p.id).map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Get all entries for a date with meal subtotals, nutrition totals, and progress against the calorie goal")]
    fn get_daily_log(&self, Parameters(p): Parameters<GetDailyLogParams>) -> Result<CallToolResult, McpError> {
        let date = date_or_today(p.date.as_deref())?;
        let result = entries::get_daily_log(&self.database, date).map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Preview the nutrition of an amount of a food item without logging it")]
    fn preview_serving(&self, Parameters(p): Parameters<PreviewServingParams>) -> Result<CallToolResult, McpError> {
        let unit = parse_opt(p.unit.as_deref()).map_err(invalid)?;
        let rounding = parse_opt(p.rounding.as_deref()).map_err(invalid)?.unwrap_or_default();
        let result = entries::preview_serving(&self.database, p.food_item_id, p.amount, unit, p.servings, rounding)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    // --- Dashboard ---

    #[tool(description = "Summarize a window of days ending on end_date: per-day totals, goal-met flags, streaks, averages, and calorie trend")]
    fn get_summary(&self, Parameters(p): Parameters<GetSummaryParams>) -> Result<CallToolResult, McpError> {
        let end_date = date_or_today(p.end_date.as_deref())?;
        let period = match (p.period.as_deref(), p.days) {
            (Some(period), _) => period.parse::<SummaryPeriod>().map_err(|e| invalid(e.to_string()))?,
            (None, Some(days)) => SummaryPeriod::Days(days),
            (None, None) => SummaryPeriod::default(),
        };
        let result = dashboard::get_summary(&self.database, end_date, period).map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    // --- Profile ---

    #[tool(description = "Get the user profile and, when biometrics are complete, the calorie recommendation")]
    fn get_profile(&self) -> Result<CallToolResult, McpError> {
        let result = profile::get_profile(&self.database).map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Update profile fields. Weight and height may be given in kg/cm or lb/ft+in.")]
    fn update_profile(&self, Parameters(p): Parameters<ProfileParams>) -> Result<CallToolResult, McpError> {
        let input = p.into_input()?;
        let result = profile::update_profile(&self.database, &input).map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Calculate BMR, TDEE, and a daily calorie target from the profile, overridden by any fields given. Set adopt=true to save the target and macro goals.")]
    fn calculate_calories(&self, Parameters(p): Parameters<CalculateCaloriesParams>) -> Result<CallToolResult, McpError> {
        let adopt = p.adopt;
        let input = p.profile.into_input()?;
        let result = profile::calculate_calories(&self.database, &input, adopt).map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    // --- Conversion ---

    #[tool(description = "Convert between food units (g, oz, ml, fl_oz, cup, tbsp, tsp) or body units (kg, lb, cm, in, ft_in)")]
    fn convert_units(&self, Parameters(p): Parameters<ConvertUnitsParams>) -> Result<CallToolResult, McpError> {
        let result = convert::convert_units(p.value, &p.from, &p.to).map_err(invalid)?;
        json_result(&result)
    }
}

// ============================================================================
// Server Handler
// ============================================================================

#[tool_handler]
impl ServerHandler for CicoService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "cico".into(),
                version: crate::build_info::VERSION.into(),
                title: Some("CICO Calorie Tracker".into()),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "CICO - calorie tracking against daily nutrition goals. \
                 Call logging_instructions when starting a logging session. \
                 Food: add_food_item/search_food_items/get_food_item. \
                 Entries: log_food/edit_entry/delete_entry/get_daily_log, preview_serving. \
                 Dashboard: get_summary (window totals, streaks, trend). \
                 Profile: get_profile/update_profile, calculate_calories (adopt=true saves goals). \
                 Utilities: convert_units, cico_status. Dates are YYYY-MM-DD."
                    .into(),
            ),
        }
    }
}
