//! Nutrition scaling
//!
//! Derives the nutrition of an actually-logged quantity from a per-reference
//! nutrition label, and reverses that scaling when an entry is edited.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::converter::{is_measurable, storage_amount, to_grams};
use super::error::{ensure_non_negative, ensure_positive, NutritionError, NutritionResult};
use super::units::{ServingUnit, REFERENCE_AMOUNT};
use crate::models::{FoodEntry, FoodItem, NutritionFacts};

/// Round to the nearest whole number (calories, milligrams)
pub fn round_whole(value: f64) -> f64 {
    value.round()
}

/// Round to the nearest 0.1 (gram values)
pub fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// When rounding is applied while scaling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundingMode {
    /// Round the per-serving values, then round again after multiplying by
    /// the servings count. Matches previously stored entries bit for bit.
    #[default]
    PerStep,
    /// Round once, after multiplying by the servings count
    Final,
}

impl FromStr for RoundingMode {
    type Err = NutritionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "per_step" | "double" => Ok(RoundingMode::PerStep),
            "final" | "once" => Ok(RoundingMode::Final),
            _ => Err(NutritionError::UnknownValue {
                kind: "rounding mode",
                value: s.to_string(),
            }),
        }
    }
}

/// Result of scaling a reference label to a logged quantity
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScaledNutrition {
    pub scale_factor: f64,
    pub per_serving: NutritionFacts,
    pub total: NutritionFacts,
}

/// Approximate per-reference nutrition recovered from a stored entry
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BaselineEstimate {
    pub nutrition: NutritionFacts,
    /// True when the stored values were reverse-scaled; precision is then
    /// limited by the rounding already applied to them
    pub estimated: bool,
    /// True when the snapshot is not sized at the reference amount yet was
    /// kept as a per-reference label, as for an amount logged with several
    /// servings. Values derived from it may be off by that size ratio.
    pub serving_mismatch: bool,
}

/// New serving for an entry being edited
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ServingEdit {
    pub amount: f64,
    pub unit: ServingUnit,
    pub servings: f64,
}

/// Entry produced by an edit, with the totals it now contributes
#[derive(Debug, Clone, Serialize)]
pub struct RescaledEntry {
    pub entry: FoodEntry,
    pub total: NutritionFacts,
    pub baseline_estimated: bool,
    pub serving_mismatch: bool,
}

/// A catalog item re-portioned to a logged amount
#[derive(Debug, Clone, Serialize)]
pub struct Portion {
    /// Copy of the item whose serving is the logged amount
    pub snapshot: FoodItem,
    pub scaled: ScaledNutrition,
}

/// Scales nutrition labels declared for a fixed reference amount
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NutritionScaler {
    reference_amount: f64,
    rounding: RoundingMode,
}

impl Default for NutritionScaler {
    fn default() -> Self {
        Self {
            reference_amount: REFERENCE_AMOUNT,
            rounding: RoundingMode::PerStep,
        }
    }
}

impl NutritionScaler {
    /// Scaler for labels declared per `reference_amount` grams/milliliters
    pub fn new(reference_amount: f64) -> NutritionResult<Self> {
        let reference_amount = ensure_non_negative("reference amount", reference_amount)?;
        if reference_amount == 0.0 {
            return Err(NutritionError::ZeroReferenceAmount);
        }
        Ok(Self {
            reference_amount,
            rounding: RoundingMode::PerStep,
        })
    }

    pub fn with_rounding(mut self, rounding: RoundingMode) -> Self {
        self.rounding = rounding;
        self
    }

    pub fn scale_factor(&self, target_amount: f64) -> NutritionResult<f64> {
        Ok(ensure_non_negative("target amount", target_amount)? / self.reference_amount)
    }

    /// Scale a reference label to `target_amount`, then by `servings`
    pub fn scale(
        &self,
        reference: &NutritionFacts,
        target_amount: f64,
        servings: f64,
    ) -> NutritionResult<ScaledNutrition> {
        reference.validate()?;
        let scale_factor = self.scale_factor(target_amount)?;
        let servings = ensure_non_negative("servings", servings)?;

        let per_serving = reference.scale(scale_factor).rounded();
        let total = match self.rounding {
            RoundingMode::PerStep => per_serving.scale(servings).rounded(),
            RoundingMode::Final => reference.scale(scale_factor * servings).rounded(),
        };

        tracing::debug!(
            scale_factor,
            servings,
            calories = total.calories,
            "scaled nutrition"
        );

        Ok(ScaledNutrition {
            scale_factor,
            per_serving,
            total,
        })
    }

    /// Reverse the scaling baked into an entry's food snapshot.
    ///
    /// An entry logged with exactly one serving whose snapshot is not 100 g
    /// is assumed to carry nutrition already scaled to that serving, and is
    /// brought back to the reference amount. Anything else is returned as
    /// stored. Count-based snapshots have no gram weight and are never
    /// reverse-scaled.
    pub fn recover_baseline(
        &self,
        item: &FoodItem,
        servings: f64,
    ) -> NutritionResult<BaselineEstimate> {
        let stored = item.nutrition.clone();
        if !is_measurable(item.serving_unit) {
            return Ok(BaselineEstimate {
                nutrition: stored,
                estimated: false,
                serving_mismatch: false,
            });
        }

        let original_grams = to_grams(item.serving_size, item.serving_unit)?;
        let off_reference = original_grams != self.reference_amount;

        if off_reference && servings == 1.0 && original_grams > 0.0 {
            tracing::warn!(
                food = %item.name,
                original_grams,
                "reverse-scaling stored nutrition; result is an estimate"
            );
            return Ok(BaselineEstimate {
                nutrition: stored.scale(self.reference_amount / original_grams),
                estimated: true,
                serving_mismatch: false,
            });
        }

        if off_reference {
            tracing::warn!(
                food = %item.name,
                original_grams,
                servings,
                "snapshot is not a per-reference label; rescaled values may be off"
            );
        }

        Ok(BaselineEstimate {
            nutrition: stored,
            estimated: false,
            serving_mismatch: off_reference,
        })
    }

    /// Apply a new serving amount and count to an entry.
    ///
    /// The returned entry owns an updated copy of its food snapshot: serving
    /// size and unit become the edited amount (fluid ounces stored as ml) and
    /// the nutrition becomes the rounded per-serving values. The catalog item
    /// the entry was logged from is not involved.
    pub fn rescale_entry(
        &self,
        entry: &FoodEntry,
        edit: &ServingEdit,
    ) -> NutritionResult<RescaledEntry> {
        let amount = ensure_positive("serving amount", edit.amount)?;
        let servings = ensure_positive("servings", edit.servings)?;
        if !is_measurable(edit.unit) {
            return Err(NutritionError::UnsupportedUnit(edit.unit.to_string()));
        }
        if !is_measurable(entry.food_item.serving_unit) {
            return Err(NutritionError::UnsupportedUnit(
                entry.food_item.serving_unit.to_string(),
            ));
        }

        let baseline = self.recover_baseline(&entry.food_item, entry.servings)?;
        let grams = to_grams(amount, edit.unit)?;
        let scaled = self.scale(&baseline.nutrition, grams, servings)?;
        let (stored_amount, stored_unit) = storage_amount(amount, edit.unit)?;

        let mut updated = entry.clone();
        updated.food_item.serving_size = stored_amount;
        updated.food_item.serving_unit = stored_unit;
        updated.food_item.nutrition = scaled.per_serving;
        updated.servings = servings;

        Ok(RescaledEntry {
            entry: updated,
            total: scaled.total,
            baseline_estimated: baseline.estimated,
            serving_mismatch: baseline.serving_mismatch,
        })
    }

    /// Item nutrition restated per reference amount, unrounded
    pub fn per_reference(&self, item: &FoodItem) -> NutritionResult<NutritionFacts> {
        item.validate()?;
        let grams = to_grams(item.serving_size, item.serving_unit)?;
        Ok(item.nutrition.scale(self.reference_amount / grams))
    }

    /// Portion a catalog item to `amount` of `unit`, eaten `servings` times.
    ///
    /// The returned snapshot carries the rounded per-serving nutrition for the
    /// new amount, ready to be embedded in an entry.
    pub fn portion(
        &self,
        item: &FoodItem,
        amount: f64,
        unit: ServingUnit,
        servings: f64,
    ) -> NutritionResult<Portion> {
        let amount = ensure_positive("serving amount", amount)?;
        let servings = ensure_positive("servings", servings)?;
        let reference = self.per_reference(item)?;
        let grams = to_grams(amount, unit)?;
        let scaled = self.scale(&reference, grams, servings)?;
        let (serving_size, serving_unit) = storage_amount(amount, unit)?;

        let mut snapshot = item.clone();
        snapshot.serving_size = serving_size;
        snapshot.serving_unit = serving_unit;
        snapshot.nutrition = scaled.per_serving.clone();

        Ok(Portion { snapshot, scaled })
    }
}

/// Multiply a per-serving label by a servings count, rounding each field
pub fn scale_by_servings(facts: &NutritionFacts, servings: f64) -> NutritionResult<NutritionFacts> {
    facts.validate()?;
    let servings = ensure_non_negative("servings", servings)?;
    Ok(facts.scale(servings).rounded())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MealType;
    use chrono::{NaiveDate, TimeZone, Utc};

    fn apple() -> NutritionFacts {
        NutritionFacts::basic(52.0, 0.3, 14.0, 0.2)
    }

    fn item(serving_size: f64, serving_unit: ServingUnit, nutrition: NutritionFacts) -> FoodItem {
        FoodItem {
            id: 1,
            name: "Apple".to_string(),
            brand: None,
            serving_size,
            serving_unit,
            nutrition,
            barcode: None,
            is_custom: false,
        }
    }

    fn entry(food_item: FoodItem, servings: f64) -> FoodEntry {
        FoodEntry {
            id: 7,
            food_item_id: Some(food_item.id),
            food_item,
            servings,
            meal_type: MealType::Snack,
            date: NaiveDate::from_ymd_opt(2025, 3, 14).unwrap(),
            created_at: Utc.with_ymd_and_hms(2025, 3, 14, 9, 30, 0).unwrap(),
            notes: None,
        }
    }

    #[test]
    fn test_apple_150g() {
        let scaled = NutritionScaler::default().scale(&apple(), 150.0, 1.0).unwrap();
        assert_eq!(scaled.scale_factor, 1.5);
        assert_eq!(scaled.total.calories, 78.0);
        assert_eq!(scaled.total.carbs, 21.0);
    }

    #[test]
    fn test_unit_scale_factor_returns_rounded_input() {
        let facts = NutritionFacts {
            sodium: Some(140.4),
            fiber: Some(2.46),
            ..NutritionFacts::basic(95.4, 3.24, 20.0, 1.05)
        };
        let scaled = NutritionScaler::default().scale(&facts, 100.0, 1.0).unwrap();
        assert_eq!(scaled.per_serving, facts.rounded());
        assert_eq!(scaled.total, facts.rounded());
    }

    #[test]
    fn test_double_rounding_is_preserved() {
        let facts = NutritionFacts::basic(45.0, 0.0, 0.0, 0.0);
        // 45 * 0.5 = 22.5 -> 23 per serving, * 3 servings = 69
        let per_step = NutritionScaler::default().scale(&facts, 50.0, 3.0).unwrap();
        assert_eq!(per_step.per_serving.calories, 23.0);
        assert_eq!(per_step.total.calories, 69.0);

        // Single rounding: 45 * 1.5 = 67.5 -> 68
        let final_only = NutritionScaler::default()
            .with_rounding(RoundingMode::Final)
            .scale(&facts, 50.0, 3.0)
            .unwrap();
        assert_eq!(final_only.total.calories, 68.0);
    }

    #[test]
    fn test_two_servings_matches_nested_round() {
        let facts = NutritionFacts::basic(123.0, 4.0, 5.0, 6.0);
        let factor: f64 = 37.0 / 100.0;
        let scaled = NutritionScaler::default().scale(&facts, 37.0, 2.0).unwrap();
        let expected = ((123.0 * factor).round() * 2.0).round();
        assert_eq!(scaled.total.calories, expected);
    }

    #[test]
    fn test_zero_target_gives_zero_nutrition() {
        let scaled = NutritionScaler::default().scale(&apple(), 0.0, 2.0).unwrap();
        assert_eq!(scaled.total.calories, 0.0);
        assert_eq!(scaled.total.protein, 0.0);
        assert_eq!(scaled.total.fat, 0.0);
    }

    #[test]
    fn test_invalid_inputs_are_rejected() {
        assert_eq!(NutritionScaler::new(0.0), Err(NutritionError::ZeroReferenceAmount));
        assert!(NutritionScaler::new(-100.0).is_err());
        let scaler = NutritionScaler::default();
        assert!(scaler.scale(&apple(), -5.0, 1.0).is_err());
        assert!(scaler.scale(&apple(), 100.0, f64::NAN).is_err());
        let bad = NutritionFacts::basic(f64::INFINITY, 0.0, 0.0, 0.0);
        assert!(scaler.scale(&bad, 100.0, 1.0).is_err());
    }

    #[test]
    fn test_recover_baseline_reverses_single_serving() {
        // 200 g logged once: stored nutrition is already for 200 g
        let snapshot = item(200.0, ServingUnit::G, NutritionFacts::basic(104.0, 0.6, 28.0, 0.4));
        let baseline = NutritionScaler::default().recover_baseline(&snapshot, 1.0).unwrap();
        assert!(baseline.estimated);
        assert!((baseline.nutrition.calories - 52.0).abs() < 1e-9);
        assert!((baseline.nutrition.carbs - 14.0).abs() < 1e-9);
    }

    #[test]
    fn test_recover_baseline_converts_ounces() {
        let snapshot = item(4.0, ServingUnit::Oz, NutritionFacts::basic(113.4, 0.0, 0.0, 0.0));
        let baseline = NutritionScaler::default().recover_baseline(&snapshot, 1.0).unwrap();
        assert!(baseline.estimated);
        assert!((baseline.nutrition.calories - 100.0).abs() < 0.01);
    }

    #[test]
    fn test_recover_baseline_leaves_other_entries_alone() {
        let scaler = NutritionScaler::default();
        let per_100 = item(100.0, ServingUnit::G, apple());
        let b = scaler.recover_baseline(&per_100, 1.0).unwrap();
        assert!(!b.estimated);
        assert_eq!(b.nutrition, apple());

        assert!(!b.serving_mismatch);

        let multi = item(150.0, ServingUnit::G, apple());
        let kept = scaler.recover_baseline(&multi, 2.0).unwrap();
        assert!(!kept.estimated);
        assert!(kept.serving_mismatch);
        assert_eq!(kept.nutrition, apple());

        let slice = item(1.0, ServingUnit::Slice, apple());
        let counted = scaler.recover_baseline(&slice, 1.0).unwrap();
        assert!(!counted.estimated);
        assert!(!counted.serving_mismatch);
    }

    #[test]
    fn test_rescale_entry_updates_snapshot_only() {
        let original = entry(item(100.0, ServingUnit::G, apple()), 1.0);
        let edit = ServingEdit {
            amount: 150.0,
            unit: ServingUnit::G,
            servings: 2.0,
        };
        let rescaled = NutritionScaler::default().rescale_entry(&original, &edit).unwrap();

        assert!(!rescaled.baseline_estimated);
        assert!(!rescaled.serving_mismatch);
        assert_eq!(rescaled.entry.food_item.serving_size, 150.0);
        assert_eq!(rescaled.entry.food_item.nutrition.calories, 78.0);
        assert_eq!(rescaled.entry.servings, 2.0);
        assert_eq!(rescaled.total.calories, 156.0);
        // the source entry is unchanged
        assert_eq!(original.food_item.nutrition, apple());
        assert_eq!(original.food_item.serving_size, 100.0);
    }

    #[test]
    fn test_rescale_entry_round_trips_through_baseline() {
        // Logged 200 g once, then edited back to 100 g
        let logged = entry(
            item(200.0, ServingUnit::G, NutritionFacts::basic(104.0, 0.6, 28.0, 0.4)),
            1.0,
        );
        let edit = ServingEdit {
            amount: 100.0,
            unit: ServingUnit::G,
            servings: 1.0,
        };
        let rescaled = NutritionScaler::default().rescale_entry(&logged, &edit).unwrap();
        assert!(rescaled.baseline_estimated);
        assert_eq!(rescaled.entry.food_item.nutrition.calories, 52.0);
        assert_eq!(rescaled.entry.food_item.nutrition.carbs, 14.0);
    }

    #[test]
    fn test_rescale_entry_stores_fl_oz_as_ml() {
        let juice = entry(
            item(100.0, ServingUnit::Ml, NutritionFacts::basic(45.0, 0.7, 10.4, 0.2)),
            2.0,
        );
        let edit = ServingEdit {
            amount: 8.0,
            unit: ServingUnit::FlOz,
            servings: 1.0,
        };
        let rescaled = NutritionScaler::default().rescale_entry(&juice, &edit).unwrap();
        assert_eq!(rescaled.entry.food_item.serving_unit, ServingUnit::Ml);
        assert!((rescaled.entry.food_item.serving_size - 236.588).abs() < 1e-9);
        // 45 * 2.36588 = 106.46 -> 106
        assert_eq!(rescaled.total.calories, 106.0);
    }

    #[test]
    fn test_rescale_entry_rejects_bad_edits() {
        let scaler = NutritionScaler::default();
        let original = entry(item(100.0, ServingUnit::G, apple()), 1.0);
        let zero = ServingEdit { amount: 0.0, unit: ServingUnit::G, servings: 1.0 };
        assert!(scaler.rescale_entry(&original, &zero).is_err());
        let no_servings = ServingEdit { amount: 100.0, unit: ServingUnit::G, servings: 0.0 };
        assert!(scaler.rescale_entry(&original, &no_servings).is_err());
        let pieces = ServingEdit { amount: 2.0, unit: ServingUnit::Piece, servings: 1.0 };
        assert!(scaler.rescale_entry(&original, &pieces).is_err());
    }

    #[test]
    fn test_portion_from_non_reference_serving() {
        // Label declared per 40 g serving; logging 60 g twice
        let oats = item(40.0, ServingUnit::G, NutritionFacts::basic(150.0, 5.0, 27.0, 3.0));
        let portion = NutritionScaler::default()
            .portion(&oats, 60.0, ServingUnit::G, 2.0)
            .unwrap();
        assert_eq!(portion.snapshot.serving_size, 60.0);
        assert_eq!(portion.snapshot.nutrition.calories, 225.0);
        assert_eq!(portion.scaled.total.calories, 450.0);
        assert_eq!(portion.scaled.total.carbs, 81.0);
        assert_eq!(oats.nutrition.calories, 150.0);
    }

    #[test]
    fn test_portion_rejects_count_items() {
        let bagel = item(1.0, ServingUnit::Piece, NutritionFacts::basic(250.0, 9.0, 48.0, 1.5));
        let scaler = NutritionScaler::default();
        assert!(matches!(
            scaler.portion(&bagel, 100.0, ServingUnit::G, 1.0),
            Err(NutritionError::UnsupportedUnit(_))
        ));
        let apple_item = item(100.0, ServingUnit::G, apple());
        assert!(scaler.portion(&apple_item, 2.0, ServingUnit::Slice, 1.0).is_err());
    }

    #[test]
    fn test_scale_by_servings() {
        let facts = NutritionFacts {
            sodium: Some(1.0),
            ..NutritionFacts::basic(95.0, 0.5, 25.1, 0.3)
        };
        let scaled = scale_by_servings(&facts, 1.5).unwrap();
        assert_eq!(scaled.calories, 143.0);
        assert_eq!(scaled.sodium, Some(2.0));
        assert!(scale_by_servings(&facts, -1.0).is_err());
    }

    #[test]
    fn test_rounding_mode_parse() {
        assert_eq!("final".parse::<RoundingMode>(), Ok(RoundingMode::Final));
        assert_eq!("Per-Step".parse::<RoundingMode>(), Ok(RoundingMode::PerStep));
        assert!("sometimes".parse::<RoundingMode>().is_err());
    }
}
