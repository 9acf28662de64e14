/// Daily calorie target from body weight and working days per week.
///
/// kcal per kg: 25 for 1–3 working days, 30 for 4–5, 35 for 6–7.
pub fn daily_calorie_target(weight_kg: f64, working_days: u8) -> u32 {
    let per_kg = match working_days {
        0..=3 => 25.0,
        4..=5 => 30.0,
        _ => 35.0,
    };
    (weight_kg.max(0.0) * per_kg).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn activity_levels() {
        assert_eq!(daily_calorie_target(60.0, 2), 1500);
        assert_eq!(daily_calorie_target(60.0, 5), 1800);
        assert_eq!(daily_calorie_target(60.0, 7), 2100);
    }

    #[test]
    fn rounds_to_whole_kcal() {
        assert_eq!(daily_calorie_target(68.5, 4), 2055);
    }
}
