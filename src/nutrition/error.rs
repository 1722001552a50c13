//! Error type shared by the nutrition core

use thiserror::Error;

/// Errors raised by the pure conversion, scaling, and calculation functions
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NutritionError {
    #[error("Invalid value for {name}: {value} (must be finite and non-negative)")]
    InvalidArgument { name: &'static str, value: f64 },

    #[error("Invalid value for {name}: {value} (must be greater than zero)")]
    NotPositive { name: &'static str, value: f64 },

    #[error("Reference amount must be greater than zero")]
    ZeroReferenceAmount,

    #[error("Cannot convert '{0}' to grams")]
    UnsupportedUnit(String),

    #[error("Unknown {kind}: '{value}'")]
    UnknownValue { kind: &'static str, value: String },

    #[error("{0} is required")]
    Missing(&'static str),
}

/// Result type for nutrition core operations
pub type NutritionResult<T> = Result<T, NutritionError>;

/// Reject negative or non-finite input
pub fn ensure_non_negative(name: &'static str, value: f64) -> NutritionResult<f64> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(NutritionError::InvalidArgument { name, value })
    }
}

/// Reject zero, negative, or non-finite input
pub fn ensure_positive(name: &'static str, value: f64) -> NutritionResult<f64> {
    let value = ensure_non_negative(name, value)?;
    if value > 0.0 {
        Ok(value)
    } else {
        Err(NutritionError::NotPositive { name, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_non_negative() {
        assert_eq!(ensure_non_negative("grams", 0.0), Ok(0.0));
        assert!(ensure_non_negative("grams", -1.0).is_err());
        assert!(ensure_non_negative("grams", f64::NAN).is_err());
        assert!(ensure_non_negative("grams", f64::INFINITY).is_err());
    }

    #[test]
    fn test_ensure_positive() {
        assert_eq!(ensure_positive("servings", 1.5), Ok(1.5));
        assert_eq!(
            ensure_positive("servings", 0.0),
            Err(NutritionError::NotPositive { name: "servings", value: 0.0 })
        );
    }
}
