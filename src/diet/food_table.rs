//! Random plan generation from a food table.
//!
//! The table is a JSON array of foods, each tagged with the meal slot it
//! belongs to and the conditions it is safe for:
//!
//! ```json
//! [{ "name": "Moong dal chilla", "slot": "breakfast", "calories": 250,
//!    "safe_for": ["diabetes", "bp"] }]
//! ```
//!
//! Fallback policy, per slot:
//! 1. rows of the slot whose `safe_for` tags occur in the diseases text;
//! 2. if none match, every row of the slot, and the slot is reported as
//!    bypassed (with a warning);
//! 3. if the slot has no rows at all, the BMI template meal.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{Meal, MealPlan, MealSlot};

use super::{bmi, bmi_category, template_meal, BodyProfile, GeneratedPlan, PlanGenerator};

#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("Food table not found: {0}")]
    Missing(PathBuf),

    #[error("Cannot read food table: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid food table: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodItem {
    pub name: String,
    pub slot: MealSlot,
    #[serde(default)]
    pub calories: Option<u32>,
    #[serde(default)]
    pub safe_for: Vec<String>,
}

impl FoodItem {
    fn is_safe_for(&self, diseases_lower: &str) -> bool {
        self.safe_for
            .iter()
            .any(|tag| !tag.is_empty() && diseases_lower.contains(&tag.to_lowercase()))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FoodTable {
    items: Vec<FoodItem>,
}

impl FoodTable {
    pub fn new(items: Vec<FoodItem>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[FoodItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Read a JSON food table from disk.
    pub fn load(path: &Path) -> Result<Self, DatasetError> {
        if !path.exists() {
            return Err(DatasetError::Missing(path.to_path_buf()));
        }
        let bytes = std::fs::read(path)?;
        let table: FoodTable = serde_json::from_slice(&bytes)?;
        tracing::info!(path = %path.display(), foods = table.len(), "Food table loaded");
        Ok(table)
    }

    /// Load the configured table, or fall back to the built-in one.
    ///
    /// A missing or unreadable file is not fatal.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        match path {
            None => Self::builtin(),
            Some(p) => match Self::load(p) {
                Ok(table) => table,
                Err(e) => {
                    tracing::warn!(error = %e, "Using built-in food table");
                    Self::builtin()
                }
            },
        }
    }

    /// Small default table shipped with the binary.
    pub fn builtin() -> Self {
        let item = |name: &str, slot: MealSlot, calories: u32, safe_for: &[&str]| FoodItem {
            name: name.to_string(),
            slot,
            calories: Some(calories),
            safe_for: safe_for.iter().map(|s| s.to_string()).collect(),
        };

        Self::new(vec![
            item("Warm oats with almonds and dates", MealSlot::Breakfast, 350, &["bp"]),
            item("Moong dal chilla with mint chutney", MealSlot::Breakfast, 250, &["diabetes", "bp"]),
            item("Vegetable poha with peanuts", MealSlot::Breakfast, 300, &[]),
            item("Ragi porridge with cinnamon", MealSlot::Breakfast, 280, &["diabetes"]),
            item("Quinoa bowl with seasonal vegetables", MealSlot::Lunch, 450, &["diabetes", "bp"]),
            item("Rice with toor dal and ghee", MealSlot::Lunch, 550, &[]),
            item("Brown rice with bitter gourd sabzi", MealSlot::Lunch, 420, &["diabetes"]),
            item("Millet roti with lauki curry", MealSlot::Lunch, 400, &["bp", "diabetes"]),
            item("Light khichdi with vegetables", MealSlot::Dinner, 320, &["bp"]),
            item("Methi roti with dal", MealSlot::Dinner, 330, &["diabetes"]),
            item("Clear vegetable soup with greens", MealSlot::Dinner, 240, &["diabetes", "bp"]),
            item("Paneer bhurji with roti", MealSlot::Dinner, 480, &[]),
        ])
    }

    fn slot_items(&self, slot: MealSlot) -> Vec<&FoodItem> {
        self.items.iter().filter(|f| f.slot == slot).collect()
    }
}

/// Outcome of picking one slot.
#[derive(Debug, Clone, PartialEq)]
pub enum SlotPick {
    /// Picked from rows safe for the stated conditions (or no conditions given).
    Filtered(FoodItem),
    /// No safe row; picked from the whole slot.
    Bypassed(FoodItem),
    /// The table has no rows for this slot.
    Empty,
}

/// Pick one food for a slot following the fallback policy.
pub fn pick_for_slot<R: rand::Rng + ?Sized>(
    table: &FoodTable,
    slot: MealSlot,
    diseases: &str,
    rng: &mut R,
) -> SlotPick {
    let candidates = table.slot_items(slot);
    if candidates.is_empty() {
        return SlotPick::Empty;
    }

    let lower = diseases.trim().to_lowercase();
    if lower.is_empty() {
        return candidates
            .choose(&mut *rng)
            .map(|f| SlotPick::Filtered((*f).clone()))
            .unwrap_or(SlotPick::Empty);
    }

    let safe: Vec<&FoodItem> = candidates
        .iter()
        .copied()
        .filter(|f| f.is_safe_for(&lower))
        .collect();

    match safe.choose(&mut *rng) {
        Some(f) => SlotPick::Filtered((*f).clone()),
        None => candidates
            .choose(&mut *rng)
            .map(|f| SlotPick::Bypassed((*f).clone()))
            .unwrap_or(SlotPick::Empty),
    }
}

/// `PlanGenerator` that samples uniformly from a food table.
pub struct FoodTableGenerator {
    table: FoodTable,
    rng: Mutex<StdRng>,
}

impl FoodTableGenerator {
    pub fn new(table: FoodTable) -> Self {
        Self {
            table,
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Deterministic sampling, for tests and reproducible runs.
    pub fn with_seed(table: FoodTable, seed: u64) -> Self {
        Self {
            table,
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    pub fn table(&self) -> &FoodTable {
        &self.table
    }
}

impl PlanGenerator for FoodTableGenerator {
    fn name(&self) -> &'static str {
        "food_table"
    }

    fn generate(&self, profile: &BodyProfile) -> GeneratedPlan {
        let value = bmi(profile.weight_kg, profile.height_cm);
        let category = bmi_category(value);

        let mut meals = MealPlan::from_descriptions("", "", "");
        let mut filter_bypassed = Vec::new();

        // A poisoned lock still holds a usable RNG.
        let mut rng = match self.rng.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        for slot in MealSlot::ALL {
            let meal = match pick_for_slot(&self.table, slot, &profile.diseases, &mut *rng) {
                SlotPick::Filtered(food) => Meal::new(food.name, food.calories),
                SlotPick::Bypassed(food) => {
                    tracing::warn!(
                        slot = slot.as_str(),
                        "No food matched the safety filter; picked from the whole slot"
                    );
                    filter_bypassed.push(slot);
                    Meal::new(food.name, food.calories)
                }
                SlotPick::Empty => {
                    tracing::warn!(slot = slot.as_str(), "Food table has no rows for slot; using template");
                    template_meal(category, slot)
                }
            };
            meals.set_meal(slot, meal);
        }

        GeneratedPlan {
            meals,
            bmi: value,
            category,
            filter_bypassed,
        }
    }
}
