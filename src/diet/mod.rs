//! Diet plan generation.
//!
//! Two generators share the `PlanGenerator` seam: the deterministic
//! BMI-bucket templates and the random food-table sampler. Both are pure
//! with respect to storage; the store persists whatever they return.

pub mod bmi;
pub mod calories;
pub mod food_table;
pub mod template;

pub use bmi::*;
pub use calories::*;
pub use food_table::*;
pub use template::*;

use serde::Serialize;

use crate::models::{BmiCategory, MealPlan, MealSlot, Patient};

/// Body measurements and conditions a plan is generated from.
#[derive(Debug, Clone, PartialEq)]
pub struct BodyProfile {
    pub weight_kg: f64,
    pub height_cm: f64,
    pub diseases: String,
}

impl From<&Patient> for BodyProfile {
    fn from(patient: &Patient) -> Self {
        Self {
            weight_kg: patient.weight_kg,
            height_cm: patient.height_cm,
            diseases: patient.diseases.clone(),
        }
    }
}

/// Result of a generator run.
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedPlan {
    pub meals: MealPlan,
    pub bmi: f64,
    pub category: BmiCategory,
    /// Slots where no row passed the safety filter and the whole category
    /// was used instead.
    pub filter_bypassed: Vec<MealSlot>,
}

pub trait PlanGenerator: Send + Sync {
    fn name(&self) -> &'static str;
    fn generate(&self, profile: &BodyProfile) -> GeneratedPlan;
}
