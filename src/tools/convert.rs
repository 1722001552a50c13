//! Unit conversion MCP Tool
//!
//! Converts food amounts between weight and volume units, and body
//! measurements between metric and imperial.

use serde::Serialize;

use crate::nutrition::converter::{
    cm_to_feet_inches, convert_amount, feet_inches_to_cm, kg_to_pounds, pounds_to_kg,
};
use crate::nutrition::error::ensure_non_negative;
use crate::nutrition::units::CM_PER_INCH;
use crate::nutrition::{FeetInches, NutritionError, ServingUnit};

/// Response for convert_units
#[derive(Debug, Serialize)]
pub struct ConvertResponse {
    pub value: f64,
    pub from: String,
    pub to: String,
    pub result: f64,
    /// Set when converting to feet and inches
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feet_inches: Option<FeetInches>,
    /// Set when a weight/volume conversion assumed 1 g/ml
    pub assumed_density: bool,
}

/// Body measurement units handled outside the food unit table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BodyUnit {
    Kg,
    Lb,
    Cm,
    Inch,
    FeetInches,
}

fn parse_body_unit(unit: &str) -> Option<BodyUnit> {
    match unit.trim().to_lowercase().as_str() {
        "kg" | "kilogram" | "kilograms" => Some(BodyUnit::Kg),
        "lb" | "lbs" | "pound" | "pounds" => Some(BodyUnit::Lb),
        "cm" | "centimeter" | "centimeters" => Some(BodyUnit::Cm),
        "in" | "inch" | "inches" => Some(BodyUnit::Inch),
        "ft_in" | "ft" | "feet" => Some(BodyUnit::FeetInches),
        _ => None,
    }
}

fn convert_body(value: f64, from: BodyUnit, to: BodyUnit) -> Result<(f64, Option<FeetInches>), String> {
    let err = |e: NutritionError| e.to_string();
    match (from, to) {
        (BodyUnit::Kg, BodyUnit::Lb) => Ok((kg_to_pounds(value).map_err(err)?, None)),
        (BodyUnit::Lb, BodyUnit::Kg) => Ok((pounds_to_kg(value).map_err(err)?, None)),
        (BodyUnit::Inch, BodyUnit::Cm) => Ok((feet_inches_to_cm(0.0, value).map_err(err)?, None)),
        (BodyUnit::Cm, BodyUnit::Inch) => {
            let cm = ensure_non_negative("centimeters", value).map_err(err)?;
            Ok((cm / CM_PER_INCH, None))
        }
        (BodyUnit::Cm, BodyUnit::FeetInches) => {
            let split = cm_to_feet_inches(value).map_err(err)?;
            Ok((value, Some(split)))
        }
        // feet given as a decimal, e.g. 5.75 ft
        (BodyUnit::FeetInches, BodyUnit::Cm) => Ok((feet_inches_to_cm(value, 0.0).map_err(err)?, None)),
        (a, b) if a == b => Ok((value, None)),
        _ => Err(format!("Cannot convert {:?} to {:?}", from, to)),
    }
}

/// Convert `value` from one unit to another
pub fn convert_units(value: f64, from: &str, to: &str) -> Result<ConvertResponse, String> {
    let (result, feet_inches, assumed_density) =
        match (parse_body_unit(from), parse_body_unit(to)) {
            (Some(f), Some(t)) => {
                let (result, split) = convert_body(value, f, t)?;
                (result, split, false)
            }
            (None, None) => {
                let f = from.parse::<ServingUnit>().map_err(|e| e.to_string())?;
                let t = to.parse::<ServingUnit>().map_err(|e| e.to_string())?;
                let result = convert_amount(value, f, t).map_err(|e| e.to_string())?;
                (result, None, f.category() != t.category())
            }
            _ => return Err(format!("Cannot convert '{}' to '{}'", from, to)),
        };

    Ok(ConvertResponse {
        value,
        from: from.to_string(),
        to: to.to_string(),
        result,
        feet_inches,
        assumed_density,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_food_units() {
        let cups = convert_units(2.0, "cups", "ml").unwrap();
        assert!((cups.result - 473.176).abs() < 1e-9);
        assert!(!cups.assumed_density);

        let oz = convert_units(100.0, "g", "oz").unwrap();
        assert!((oz.result - 3.5274).abs() < 1e-4);

        let bridged = convert_units(1.0, "cup", "g").unwrap();
        assert!(bridged.assumed_density);
    }

    #[test]
    fn test_body_units() {
        let lb = convert_units(70.0, "kg", "lb").unwrap();
        assert!((lb.result - 154.3236).abs() < 1e-3);

        let height = convert_units(182.8, "cm", "ft_in").unwrap();
        assert_eq!(height.feet_inches, Some(FeetInches { feet: 6, inches: 0 }));

        let cm = convert_units(69.0, "in", "cm").unwrap();
        assert!((cm.result - 175.26).abs() < 1e-9);
    }

    #[test]
    fn test_rejects_mismatched_units() {
        assert!(convert_units(1.0, "kg", "ml").is_err());
        assert!(convert_units(1.0, "slice", "g").is_err());
        assert!(convert_units(-1.0, "g", "oz").is_err());
        assert!(convert_units(1.0, "kg", "cm").is_err());
        assert!(convert_units(1.0, "furlong", "g").is_err());
    }
}
