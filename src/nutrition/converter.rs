//! Unit conversion functions
//!
//! Mass, volume, and body-measurement conversions. Every converter rejects
//! negative or non-finite input instead of clamping it.

use serde::{Deserialize, Serialize};

use super::error::{ensure_non_negative, NutritionError, NutritionResult};
use super::units::{
    ServingUnit, UnitCategory, CM_PER_INCH, G_PER_ML_ASSUMED, G_PER_OZ, INCHES_PER_FOOT,
    KG_PER_LB, ML_PER_FL_OZ,
};

/// Height split into whole feet and inches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeetInches {
    pub feet: u32,
    pub inches: u32,
}

pub fn ounces_to_grams(oz: f64) -> NutritionResult<f64> {
    Ok(ensure_non_negative("ounces", oz)? * G_PER_OZ)
}

pub fn grams_to_ounces(grams: f64) -> NutritionResult<f64> {
    Ok(ensure_non_negative("grams", grams)? / G_PER_OZ)
}

pub fn fl_oz_to_ml(fl_oz: f64) -> NutritionResult<f64> {
    Ok(ensure_non_negative("fluid ounces", fl_oz)? * ML_PER_FL_OZ)
}

pub fn ml_to_fl_oz(ml: f64) -> NutritionResult<f64> {
    Ok(ensure_non_negative("milliliters", ml)? / ML_PER_FL_OZ)
}

pub fn pounds_to_kg(lb: f64) -> NutritionResult<f64> {
    Ok(ensure_non_negative("pounds", lb)? * KG_PER_LB)
}

pub fn kg_to_pounds(kg: f64) -> NutritionResult<f64> {
    Ok(ensure_non_negative("kilograms", kg)? / KG_PER_LB)
}

pub fn feet_inches_to_cm(feet: f64, inches: f64) -> NutritionResult<f64> {
    let feet = ensure_non_negative("feet", feet)?;
    let inches = ensure_non_negative("inches", inches)?;
    Ok((feet * INCHES_PER_FOOT + inches) * CM_PER_INCH)
}

/// Convert centimeters to whole feet and rounded inches.
///
/// Rounding the remainder can land on 12 inches (e.g. 182.8 cm is 5 ft 11.97 in);
/// that result rolls over to the next foot.
pub fn cm_to_feet_inches(cm: f64) -> NutritionResult<FeetInches> {
    let total_inches = ensure_non_negative("centimeters", cm)? / CM_PER_INCH;
    let mut feet = (total_inches / INCHES_PER_FOOT).floor() as u32;
    let mut inches = (total_inches % INCHES_PER_FOOT).round() as u32;
    if inches >= INCHES_PER_FOOT as u32 {
        feet += 1;
        inches = 0;
    }
    Ok(FeetInches { feet, inches })
}

/// Convert an amount of a weight or volume unit to grams.
///
/// Volume is bridged with an assumed density of 1 g/ml. Count units have no
/// gram weight and are rejected.
pub fn to_grams(amount: f64, unit: ServingUnit) -> NutritionResult<f64> {
    let amount = ensure_non_negative("amount", amount)?;
    if let Some(factor) = unit.grams_per_unit() {
        return Ok(amount * factor);
    }
    if let Some(factor) = unit.ml_per_unit() {
        return Ok(amount * factor * G_PER_ML_ASSUMED);
    }
    Err(NutritionError::UnsupportedUnit(unit.to_string()))
}

/// Convert an amount of a volume unit to milliliters
pub fn to_ml(amount: f64, unit: ServingUnit) -> NutritionResult<f64> {
    let amount = ensure_non_negative("amount", amount)?;
    unit.ml_per_unit()
        .map(|factor| amount * factor)
        .ok_or_else(|| NutritionError::UnsupportedUnit(unit.to_string()))
}

/// Convert an amount between two weight or volume units.
///
/// Volume to volume goes through milliliters. Anything involving a weight
/// unit goes through grams, bridging volume at 1 g/ml.
pub fn convert_amount(amount: f64, from: ServingUnit, to: ServingUnit) -> NutritionResult<f64> {
    if from.category() == UnitCategory::Volume && to.category() == UnitCategory::Volume {
        let ml = to_ml(amount, from)?;
        return to
            .ml_per_unit()
            .map(|factor| ml / factor)
            .ok_or_else(|| NutritionError::UnsupportedUnit(to.to_string()));
    }

    let grams = to_grams(amount, from)?;
    to.grams_per_unit()
        .or_else(|| to.ml_per_unit().map(|factor| factor * G_PER_ML_ASSUMED))
        .map(|factor| grams / factor)
        .ok_or_else(|| NutritionError::UnsupportedUnit(to.to_string()))
}

/// Unit and amount a serving is persisted in.
///
/// Fluid ounces are stored as milliliters; every other unit is kept as entered.
pub fn storage_amount(amount: f64, unit: ServingUnit) -> NutritionResult<(f64, ServingUnit)> {
    match unit {
        ServingUnit::FlOz => Ok((fl_oz_to_ml(amount)?, ServingUnit::Ml)),
        other => Ok((ensure_non_negative("amount", amount)?, other)),
    }
}

const LIQUID_KEYWORDS: &[&str] = &[
    "beer", "soda", "juice", "water", "milk", "coffee", "tea", "wine", "drink", "beverage",
    "smoothie", "shake", "cola", "sprite", "pepsi", "coke", "lemonade",
];

/// Guess from a food's name whether it is a beverage
pub fn is_likely_liquid(name: &str) -> bool {
    let lower = name.to_lowercase();
    LIQUID_KEYWORDS.iter().any(|kw| lower.contains(kw))
}

/// Pick the measurement unit an entry edit starts in.
///
/// Only g, oz, ml, and fl oz are offered for editing.
pub fn default_measurement_unit(name: &str, stored_unit: ServingUnit) -> ServingUnit {
    let liquid = is_likely_liquid(name);
    match stored_unit {
        ServingUnit::Ml => ServingUnit::Ml,
        ServingUnit::Oz if liquid => ServingUnit::FlOz,
        ServingUnit::Oz => ServingUnit::Oz,
        _ if liquid => ServingUnit::Ml,
        _ => ServingUnit::G,
    }
}

/// Whether a unit can be used to enter a measured amount when editing
pub fn is_measurable(unit: ServingUnit) -> bool {
    unit.category() != UnitCategory::Count
}
