//! Shared nutrition data structure
//!
//! Used by food items, logged entries, and daily totals.

use serde::{Deserialize, Serialize};

use crate::nutrition::error::{ensure_non_negative, NutritionResult};
use crate::nutrition::scaler::{round_tenth, round_whole};

/// Nutrition facts for one reference serving
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NutritionFacts {
    pub calories: f64,
    pub protein: f64, // grams
    pub carbs: f64,   // grams
    pub fat: f64,     // grams
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fiber: Option<f64>, // grams
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sugar: Option<f64>, // grams
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sodium: Option<f64>, // milligrams
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cholesterol: Option<f64>, // milligrams
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saturated_fat: Option<f64>, // grams
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trans_fat: Option<f64>, // grams
}

fn add_opt(a: Option<f64>, b: Option<f64>) -> Option<f64> {
    match (a, b) {
        (None, None) => None,
        (a, b) => Some(a.unwrap_or(0.0) + b.unwrap_or(0.0)),
    }
}

impl NutritionFacts {
    /// Create a new NutritionFacts with all zeros
    pub fn zero() -> Self {
        Self::default()
    }

    /// Calories and the three macros; every optional field left unset
    pub fn basic(calories: f64, protein: f64, carbs: f64, fat: f64) -> Self {
        Self {
            calories,
            protein,
            carbs,
            fat,
            ..Self::default()
        }
    }

    /// Check that every value is finite and non-negative
    pub fn validate(&self) -> NutritionResult<()> {
        ensure_non_negative("calories", self.calories)?;
        ensure_non_negative("protein", self.protein)?;
        ensure_non_negative("carbs", self.carbs)?;
        ensure_non_negative("fat", self.fat)?;
        let optional = [
            ("fiber", self.fiber),
            ("sugar", self.sugar),
            ("sodium", self.sodium),
            ("cholesterol", self.cholesterol),
            ("saturated_fat", self.saturated_fat),
            ("trans_fat", self.trans_fat),
        ];
        for (name, value) in optional {
            if let Some(v) = value {
                ensure_non_negative(name, v)?;
            }
        }
        Ok(())
    }

    /// Scale every value by a multiplier, in full precision
    pub fn scale(&self, multiplier: f64) -> Self {
        let m = |v: f64| v * multiplier;
        Self {
            calories: m(self.calories),
            protein: m(self.protein),
            carbs: m(self.carbs),
            fat: m(self.fat),
            fiber: self.fiber.map(m),
            sugar: self.sugar.map(m),
            sodium: self.sodium.map(m),
            cholesterol: self.cholesterol.map(m),
            saturated_fat: self.saturated_fat.map(m),
            trans_fat: self.trans_fat.map(m),
        }
    }

    /// Round for storage and display: whole calories and milligrams, gram
    /// values to one decimal
    pub fn rounded(&self) -> Self {
        Self {
            calories: round_whole(self.calories),
            protein: round_tenth(self.protein),
            carbs: round_tenth(self.carbs),
            fat: round_tenth(self.fat),
            fiber: self.fiber.map(round_tenth),
            sugar: self.sugar.map(round_tenth),
            sodium: self.sodium.map(round_whole),
            cholesterol: self.cholesterol.map(round_whole),
            saturated_fat: self.saturated_fat.map(round_tenth),
            trans_fat: self.trans_fat.map(round_tenth),
        }
    }

    /// Add another nutrition to this one
    pub fn add(&self, other: &NutritionFacts) -> Self {
        Self {
            calories: self.calories + other.calories,
            protein: self.protein + other.protein,
            carbs: self.carbs + other.carbs,
            fat: self.fat + other.fat,
            fiber: add_opt(self.fiber, other.fiber),
            sugar: add_opt(self.sugar, other.sugar),
            sodium: add_opt(self.sodium, other.sodium),
            cholesterol: add_opt(self.cholesterol, other.cholesterol),
            saturated_fat: add_opt(self.saturated_fat, other.saturated_fat),
            trans_fat: add_opt(self.trans_fat, other.trans_fat),
        }
    }
}

impl std::ops::Add for NutritionFacts {
    type Output = NutritionFacts;

    fn add(self, other: NutritionFacts) -> NutritionFacts {
        NutritionFacts::add(&self, &other)
    }
}

impl std::ops::Mul<f64> for NutritionFacts {
    type Output = NutritionFacts;

    fn mul(self, multiplier: f64) -> NutritionFacts {
        self.scale(multiplier)
    }
}

impl std::iter::Sum for NutritionFacts {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(NutritionFacts::zero(), |acc, n| acc + n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rejects_negative_and_nan() {
        assert!(NutritionFacts::basic(100.0, 1.0, 2.0, 3.0).validate().is_ok());
        assert!(NutritionFacts::basic(-1.0, 1.0, 2.0, 3.0).validate().is_err());
        let facts = NutritionFacts {
            sodium: Some(f64::NAN),
            ..NutritionFacts::basic(100.0, 1.0, 2.0, 3.0)
        };
        assert!(facts.validate().is_err());
    }

    #[test]
    fn test_sum_keeps_unset_fields_unset() {
        let a = NutritionFacts {
            fiber: Some(2.0),
            ..NutritionFacts::basic(100.0, 5.0, 10.0, 1.0)
        };
        let b = NutritionFacts::basic(50.0, 1.0, 2.0, 0.5);
        let total: NutritionFacts = vec![a, b].into_iter().sum();
        assert_eq!(total.calories, 150.0);
        assert_eq!(total.fiber, Some(2.0));
        assert_eq!(total.sodium, None);
    }

    #[test]
    fn test_rounded() {
        let facts = NutritionFacts {
            sodium: Some(12.6),
            ..NutritionFacts::basic(99.6, 1.26, 0.04, 3.0)
        };
        let r = facts.rounded();
        assert_eq!(r.calories, 100.0);
        assert_eq!(r.protein, 1.3);
        assert_eq!(r.carbs, 0.0);
        assert_eq!(r.sodium, Some(13.0));
    }
}
