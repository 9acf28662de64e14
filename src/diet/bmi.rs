use crate::models::BmiCategory;

pub const UNDERWEIGHT_BELOW: f64 = 18.5;
pub const OVERWEIGHT_FROM: f64 = 24.9;

/// Body-mass index from kilograms and centimetres.
///
/// Non-positive height yields 0.0, which buckets as underweight.
pub fn bmi(weight_kg: f64, height_cm: f64) -> f64 {
    let height_m = height_cm / 100.0;
    if height_m <= 0.0 {
        return 0.0;
    }
    weight_kg / (height_m * height_m)
}

/// Bucket a BMI: `< 18.5` underweight, `[18.5, 24.9)` normal, `>= 24.9` overweight.
pub fn bmi_category(bmi: f64) -> BmiCategory {
    if bmi < UNDERWEIGHT_BELOW {
        BmiCategory::Underweight
    } else if bmi < OVERWEIGHT_FROM {
        BmiCategory::Normal
    } else {
        BmiCategory::Overweight
    }
}
