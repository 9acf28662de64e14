use serde::Serialize;

use crate::diet::{bmi, bmi_category, daily_calorie_target};
use crate::models::{BmiCategory, DietPlan, MealSlot, Patient, PatientSummary, PlanSource};
use crate::store::{PlanCounts, Store, StoreError};

pub const WELLNESS_TIPS: [&str; 7] = [
    "Morning Routine: Start your day with warm water and lemon to kindle digestive fire",
    "Mindful Eating: Eat in a calm environment, chew slowly, and avoid distractions",
    "Meal Timing: Eat your largest meal at lunch when digestive fire is strongest",
    "Herbal Tea: Sip ginger tea after meals to aid digestion",
    "Stress Management: Practice deep breathing before meals to enhance digestion",
    "Hydration: Drink room temperature or warm water throughout the day",
    "Evening Routine: Have a light dinner 3 hours before bedtime",
];

#[derive(Debug, Clone, Serialize)]
pub struct DoctorDashboardView {
    pub doctor_id: i64,
    pub doctor_name: String,
    pub patients: Vec<PatientSummary>,
    pub counts: PlanCounts,
}

pub fn doctor_dashboard(store: &Store, doctor_id: i64, name: &str) -> Result<DoctorDashboardView, StoreError> {
    Ok(DoctorDashboardView {
        doctor_id,
        doctor_name: name.to_string(),
        patients: store.list_patients()?,
        counts: store.plan_counts()?,
    })
}

#[derive(Debug, Clone, Serialize)]
pub struct PatientProfile {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub height_cm: f64,
    pub weight_kg: f64,
    pub working_days: u8,
    pub diseases: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct MealEntry {
    pub slot: MealSlot,
    pub serving_time: &'static str,
    pub description: String,
    pub calories: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PatientDashboardView {
    pub greeting: String,
    pub profile: PatientProfile,
    /// Rounded to one decimal.
    pub bmi: f64,
    pub bmi_category: BmiCategory,
    pub daily_calorie_target: u32,
    /// Empty when no plan exists yet.
    pub meals: Vec<MealEntry>,
    pub plan_source: Option<PlanSource>,
    pub plan_calories: Option<u32>,
    pub tips: [&'static str; 7],
}

pub fn patient_dashboard(patient: &Patient, plan: Option<&DietPlan>) -> PatientDashboardView {
    let value = bmi(patient.weight_kg, patient.height_cm);

    let meals = plan
        .map(|plan| {
            MealSlot::ALL
                .iter()
                .map(|slot| {
                    let meal = plan.meals.meal(*slot);
                    MealEntry {
                        slot: *slot,
                        serving_time: slot.serving_time(),
                        description: meal.description.clone(),
                        calories: meal.calories,
                    }
                })
                .collect()
        })
        .unwrap_or_default();

    PatientDashboardView {
        greeting: format!("Welcome back, {}", patient.full_name),
        profile: PatientProfile {
            full_name: patient.full_name.clone(),
            email: patient.email.clone(),
            phone: patient.phone.clone(),
            height_cm: patient.height_cm,
            weight_kg: patient.weight_kg,
            working_days: patient.working_days,
            diseases: patient.diseases.clone(),
        },
        bmi: (value * 10.0).round() / 10.0,
        bmi_category: bmi_category(value),
        daily_calorie_target: daily_calorie_target(patient.weight_kg, patient.working_days),
        meals,
        plan_source: plan.map(|p| p.source),
        plan_calories: plan.and_then(|p| p.meals.total_calories()),
        tips: WELLNESS_TIPS,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MealPlan;
    use chrono::NaiveDate;

    fn patient() -> Patient {
        Patient {
            id: 7,
            full_name: "Priya Sharma".into(),
            phone: "9876543210".into(),
            email: "priya@example.com".into(),
            password: String::new(),
            height_cm: 160.0,
            weight_kg: 50.0,
            working_days: 7,
            diseases: String::new(),
            created_at: NaiveDate::from_ymd_opt(2024, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
        }
    }

    #[test]
    fn dashboard_without_plan_has_no_meals() {
        let view = patient_dashboard(&patient(), None);
        assert_eq!(view.greeting, "Welcome back, Priya Sharma");
        assert!(view.meals.is_empty());
        assert!(view.plan_source.is_none());
        assert_eq!(view.bmi, 19.5);
        assert_eq!(view.bmi_category, BmiCategory::Normal);
        assert_eq!(view.daily_calorie_target, 1750);
    }

    #[test]
    fn dashboard_lists_meals_with_serving_times() {
        let plan = DietPlan {
            id: 1,
            patient_id: 7,
            meals: MealPlan::from_descriptions("Poha", "Dal rice", "Khichdi"),
            source: PlanSource::Assigned,
            assigned_by: Some(1),
            updated_at: patient().created_at,
        };
        let view = patient_dashboard(&patient(), Some(&plan));
        assert_eq!(view.meals.len(), 3);
        assert_eq!(view.meals[0].serving_time, "8:00 AM");
        assert_eq!(view.meals[2].description, "Khichdi");
        assert_eq!(view.plan_source, Some(PlanSource::Assigned));
        assert!(view.plan_calories.is_none());
        assert_eq!(view.tips.len(), 7);
    }
}
