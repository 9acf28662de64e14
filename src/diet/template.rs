use crate::models::{BmiCategory, Meal, MealPlan, MealSlot};

use super::{bmi, bmi_category, BodyProfile, GeneratedPlan, PlanGenerator};

struct TemplateMeal {
    slot: MealSlot,
    description: &'static str,
    calories: u32,
}

const fn meal(slot: MealSlot, description: &'static str, calories: u32) -> TemplateMeal {
    TemplateMeal {
        slot,
        description,
        calories,
    }
}

static UNDERWEIGHT: [TemplateMeal; 3] = [
    meal(
        MealSlot::Breakfast,
        "Banana shake with soaked almonds, dates and a spoon of ghee",
        520,
    ),
    meal(
        MealSlot::Lunch,
        "Rice with toor dal, paneer curry and ghee-tempered vegetables",
        720,
    ),
    meal(
        MealSlot::Dinner,
        "Whole wheat roti with vegetable korma and warm turmeric milk",
        600,
    ),
];

static NORMAL: [TemplateMeal; 3] = [
    meal(
        MealSlot::Breakfast,
        "Warm oats with almonds and dates, pinch of cinnamon",
        350,
    ),
    meal(
        MealSlot::Lunch,
        "Quinoa bowl with seasonal vegetables, ghee and mint chutney",
        450,
    ),
    meal(
        MealSlot::Dinner,
        "Light khichdi of rice and moong dal with ginger and turmeric",
        320,
    ),
];

static OVERWEIGHT: [TemplateMeal; 3] = [
    meal(
        MealSlot::Breakfast,
        "Warm lemon water followed by moong dal chilla",
        250,
    ),
    meal(
        MealSlot::Lunch,
        "Millet roti with steamed vegetables and spiced buttermilk",
        400,
    ),
    meal(
        MealSlot::Dinner,
        "Clear vegetable soup with sauteed greens",
        240,
    ),
];

/// Applied for "diabetes": replaces every meal.
static DIABETES: [TemplateMeal; 3] = [
    meal(
        MealSlot::Breakfast,
        "Broken wheat vegetable upma, no added sugar",
        300,
    ),
    meal(
        MealSlot::Lunch,
        "Brown rice with bitter gourd sabzi and moong dal",
        420,
    ),
    meal(
        MealSlot::Dinner,
        "Methi roti with bottle gourd curry",
        310,
    ),
];

/// Applied for blood pressure after the diabetes override: lunch and dinner.
static LOW_SODIUM: [TemplateMeal; 2] = [
    meal(
        MealSlot::Lunch,
        "Low-salt barley khichdi with steamed vegetables and cucumber raita",
        410,
    ),
    meal(
        MealSlot::Dinner,
        "Unsalted vegetable stew with a millet roti",
        300,
    ),
];

const DIABETES_KEYWORDS: [&str; 1] = ["diabetes"];
const BLOOD_PRESSURE_KEYWORDS: [&str; 3] = ["bp", "blood pressure", "hypertension"];

fn template_for(category: BmiCategory) -> &'static [TemplateMeal; 3] {
    match category {
        BmiCategory::Underweight => &UNDERWEIGHT,
        BmiCategory::Normal => &NORMAL,
        BmiCategory::Overweight => &OVERWEIGHT,
    }
}

fn apply(plan: &mut MealPlan, meals: &[TemplateMeal]) {
    for m in meals {
        plan.set_meal(m.slot, Meal::new(m.description, Some(m.calories)));
    }
}

fn mentions_any(diseases_lower: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| diseases_lower.contains(*k))
}

/// The fixed template meal for one slot of a bucket.
pub fn template_meal(category: BmiCategory, slot: MealSlot) -> Meal {
    template_for(category)
        .iter()
        .find(|m| m.slot == slot)
        .map(|m| Meal::new(m.description, Some(m.calories)))
        .unwrap_or_else(|| Meal::new("", None))
}

/// Deterministic plan from BMI bucket plus disease keyword overrides.
///
/// Keywords are matched as case-insensitive substrings of `diseases`.
pub fn generate_plan(weight_kg: f64, height_cm: f64, diseases: &str) -> MealPlan {
    let category = bmi_category(bmi(weight_kg, height_cm));
    let template = template_for(category);

    let mut plan = MealPlan::from_descriptions("", "", "");
    apply(&mut plan, template);

    let lower = diseases.to_lowercase();
    if mentions_any(&lower, &DIABETES_KEYWORDS) {
        apply(&mut plan, &DIABETES);
    }
    if mentions_any(&lower, &BLOOD_PRESSURE_KEYWORDS) {
        apply(&mut plan, &LOW_SODIUM);
    }

    plan
}

/// `PlanGenerator` over the fixed BMI templates.
#[derive(Debug, Default, Clone)]
pub struct BmiTemplateGenerator;

impl PlanGenerator for BmiTemplateGenerator {
    fn name(&self) -> &'static str {
        "bmi_template"
    }

    fn generate(&self, profile: &BodyProfile) -> GeneratedPlan {
        let value = bmi(profile.weight_kg, profile.height_cm);
        GeneratedPlan {
            meals: generate_plan(profile.weight_kg, profile.height_cm, &profile.diseases),
            bmi: value,
            category: bmi_category(value),
            filter_bypassed: Vec::new(),
        }
    }
}
