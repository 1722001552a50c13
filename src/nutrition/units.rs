//! Unit types and conversion constants
//!
//! Provides types for representing measurement units and standard conversion factors.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::NutritionError;

/// Category of a serving unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitCategory {
    /// Weight/mass units (g, oz)
    Weight,
    /// Volume units (ml, fl oz, cup, tbsp, tsp)
    Volume,
    /// Count/discrete units (piece, slice, serving)
    Count,
}

/// Unit a food item's serving is declared in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServingUnit {
    G,
    Ml,
    Oz,
    FlOz,
    Cup,
    Tbsp,
    Tsp,
    Piece,
    Slice,
    Serving,
}

impl ServingUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServingUnit::G => "g",
            ServingUnit::Ml => "ml",
            ServingUnit::Oz => "oz",
            ServingUnit::FlOz => "fl_oz",
            ServingUnit::Cup => "cup",
            ServingUnit::Tbsp => "tbsp",
            ServingUnit::Tsp => "tsp",
            ServingUnit::Piece => "piece",
            ServingUnit::Slice => "slice",
            ServingUnit::Serving => "serving",
        }
    }

    pub fn category(&self) -> UnitCategory {
        match self {
            ServingUnit::G | ServingUnit::Oz => UnitCategory::Weight,
            ServingUnit::Ml
            | ServingUnit::FlOz
            | ServingUnit::Cup
            | ServingUnit::Tbsp
            | ServingUnit::Tsp => UnitCategory::Volume,
            ServingUnit::Piece | ServingUnit::Slice | ServingUnit::Serving => UnitCategory::Count,
        }
    }

    /// Conversion factor to grams for weight units
    pub fn grams_per_unit(&self) -> Option<f64> {
        match self {
            ServingUnit::G => Some(1.0),
            ServingUnit::Oz => Some(G_PER_OZ),
            _ => None,
        }
    }

    /// Conversion factor to milliliters for volume units
    pub fn ml_per_unit(&self) -> Option<f64> {
        match self {
            ServingUnit::Ml => Some(1.0),
            ServingUnit::FlOz => Some(ML_PER_FL_OZ),
            ServingUnit::Cup => Some(ML_PER_CUP),
            ServingUnit::Tbsp => Some(ML_PER_TBSP),
            ServingUnit::Tsp => Some(ML_PER_TSP),
            _ => None,
        }
    }
}

impl fmt::Display for ServingUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServingUnit {
    type Err = NutritionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        let unit = match lower.as_str() {
            "g" | "gram" | "grams" => ServingUnit::G,
            "ml" | "milliliter" | "milliliters" | "millilitre" | "millilitres" => ServingUnit::Ml,
            "oz" | "ounce" | "ounces" => ServingUnit::Oz,
            "fl oz" | "fl_oz" | "floz" | "fluid ounce" | "fluid ounces" => ServingUnit::FlOz,
            "cup" | "cups" => ServingUnit::Cup,
            "tbsp" | "tablespoon" | "tablespoons" => ServingUnit::Tbsp,
            "tsp" | "teaspoon" | "teaspoons" => ServingUnit::Tsp,
            "piece" | "pieces" | "each" | "count" => ServingUnit::Piece,
            "slice" | "slices" => ServingUnit::Slice,
            "serving" | "servings" => ServingUnit::Serving,
            _ => {
                return Err(NutritionError::UnknownValue {
                    kind: "serving unit",
                    value: s.to_string(),
                })
            }
        };
        Ok(unit)
    }
}

/// Preferred system for displaying body measurements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    #[default]
    Metric,
    Imperial,
}

impl UnitSystem {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitSystem::Metric => "metric",
            UnitSystem::Imperial => "imperial",
        }
    }
}

impl FromStr for UnitSystem {
    type Err = NutritionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "metric" => Ok(UnitSystem::Metric),
            "imperial" => Ok(UnitSystem::Imperial),
            _ => Err(NutritionError::UnknownValue {
                kind: "unit system",
                value: s.to_string(),
            }),
        }
    }
}

// ============================================================================
// Volume Conversion Constants (to milliliters)
// ============================================================================

/// Milliliters per teaspoon
pub const ML_PER_TSP: f64 = 4.92892;
/// Milliliters per tablespoon
pub const ML_PER_TBSP: f64 = 14.7868;
/// Milliliters per fluid ounce
pub const ML_PER_FL_OZ: f64 = 29.5735;
/// Milliliters per cup (US)
pub const ML_PER_CUP: f64 = 236.588;

// ============================================================================
// Weight Conversion Constants
// ============================================================================

/// Grams per ounce
pub const G_PER_OZ: f64 = 28.3495;
/// Kilograms per pound
pub const KG_PER_LB: f64 = 0.453592;

/// Grams per milliliter when bridging volume to mass.
///
/// Water density. Close enough for most beverages, not exact for oils,
/// syrups, or dense liquids.
pub const G_PER_ML_ASSUMED: f64 = 1.0;

// ============================================================================
// Length Conversion Constants
// ============================================================================

/// Centimeters per inch
pub const CM_PER_INCH: f64 = 2.54;
/// Inches per foot
pub const INCHES_PER_FOOT: f64 = 12.0;

/// Reference amount nutrition labels are normalized to (per 100 g / 100 ml)
pub const REFERENCE_AMOUNT: f64 = 100.0;
