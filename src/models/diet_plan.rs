use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::{MealSlot, PlanSource};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meal {
    pub description: String,
    #[serde(default)]
    pub calories: Option<u32>,
}

impl Meal {
    pub fn new(description: impl Into<String>, calories: Option<u32>) -> Self {
        Self {
            description: description.into(),
            calories,
        }
    }
}

/// The three meals of one day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealPlan {
    pub breakfast: Meal,
    pub lunch: Meal,
    pub dinner: Meal,
}

impl MealPlan {
    /// Build a plan from bare descriptions, as a doctor assigns them.
    pub fn from_descriptions(
        breakfast: impl Into<String>,
        lunch: impl Into<String>,
        dinner: impl Into<String>,
    ) -> Self {
        Self {
            breakfast: Meal::new(breakfast, None),
            lunch: Meal::new(lunch, None),
            dinner: Meal::new(dinner, None),
        }
    }

    pub fn meal(&self, slot: MealSlot) -> &Meal {
        match slot {
            MealSlot::Breakfast => &self.breakfast,
            MealSlot::Lunch => &self.lunch,
            MealSlot::Dinner => &self.dinner,
        }
    }

    pub fn set_meal(&mut self, slot: MealSlot, meal: Meal) {
        match slot {
            MealSlot::Breakfast => self.breakfast = meal,
            MealSlot::Lunch => self.lunch = meal,
            MealSlot::Dinner => self.dinner = meal,
        }
    }

    /// Sum of known calories; `None` when no meal carries a figure.
    pub fn total_calories(&self) -> Option<u32> {
        let known: Vec<u32> = MealSlot::ALL
            .iter()
            .filter_map(|slot| self.meal(*slot).calories)
            .collect();
        if known.is_empty() {
            None
        } else {
            Some(known.iter().sum())
        }
    }

    /// True when any description is blank.
    pub fn has_blank_meal(&self) -> bool {
        MealSlot::ALL
            .iter()
            .any(|slot| self.meal(*slot).description.trim().is_empty())
    }
}

/// A stored plan row. At most one per patient.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DietPlan {
    pub id: i64,
    pub patient_id: i64,
    #[serde(flatten)]
    pub meals: MealPlan,
    pub source: PlanSource,
    pub assigned_by: Option<i64>,
    pub updated_at: NaiveDateTime,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_calories_skips_unknown() {
        let mut plan = MealPlan::from_descriptions("Oats", "Dal rice", "Khichdi");
        assert_eq!(plan.total_calories(), None);

        plan.set_meal(MealSlot::Lunch, Meal::new("Dal rice", Some(450)));
        plan.set_meal(MealSlot::Dinner, Meal::new("Khichdi", Some(320)));
        assert_eq!(plan.total_calories(), Some(770));
    }

    #[test]
    fn blank_meal_detected() {
        let plan = MealPlan::from_descriptions("Oats", "  ", "Khichdi");
        assert!(plan.has_blank_meal());
    }
}
