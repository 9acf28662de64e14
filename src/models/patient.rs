use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::PlanSource;

pub const MIN_NAME_CHARS: usize = 2;
pub const PHONE_DIGITS: usize = 10;
pub const MAX_HEIGHT_CM: f64 = 300.0;
pub const MAX_WEIGHT_KG: f64 = 500.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Patient {
    pub id: i64,
    pub full_name: String,
    pub phone: String,
    pub email: String,
    /// Stored credential string, never sent to clients.
    #[serde(skip_serializing, default)]
    pub password: String,
    pub height_cm: f64,
    pub weight_kg: f64,
    pub working_days: u8,
    pub diseases: String,
    pub created_at: NaiveDateTime,
}

/// One row of the doctor's patient list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientSummary {
    pub id: i64,
    pub full_name: String,
    pub phone: String,
    pub email: String,
    pub working_days: u8,
    pub plan_status: Option<PlanSource>,
}

/// Registration form as submitted by a new patient.
///
/// Also kept on the session as the in-progress draft so the registration
/// page can be re-rendered with what the patient already typed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Registration {
    pub full_name: String,
    pub phone: String,
    pub email: String,
    #[serde(default, skip_serializing)]
    pub password: String,
    pub height_cm: f64,
    pub weight_kg: f64,
    pub working_days: u8,
    #[serde(default)]
    pub diseases: String,
}

impl Registration {
    /// Check every field and collect all problems at once.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.full_name.trim().chars().count() < MIN_NAME_CHARS {
            errors.push(format!(
                "Full name must be at least {MIN_NAME_CHARS} characters"
            ));
        }
        if self.phone.len() != PHONE_DIGITS || !self.phone.chars().all(|c| c.is_ascii_digit()) {
            errors.push(format!("Phone number must be exactly {PHONE_DIGITS} digits"));
        }
        if !self.email.contains('@') {
            errors.push("Please enter a valid email address".to_string());
        }
        if self.password.is_empty() {
            errors.push("Password is required".to_string());
        }
        if !(self.height_cm > 0.0 && self.height_cm <= MAX_HEIGHT_CM) {
            errors.push("Height must be a positive number".to_string());
        }
        if !(self.weight_kg > 0.0 && self.weight_kg <= MAX_WEIGHT_KG) {
            errors.push("Weight must be a positive number".to_string());
        }
        if !(1..=7).contains(&self.working_days) {
            errors.push("Working days must be between 1 and 7".to_string());
        }

        errors
    }

    /// Copy without the password, for keeping on the session.
    pub fn draft(&self) -> Registration {
        Registration {
            password: String::new(),
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> Registration {
        Registration {
            full_name: "Priya Sharma".into(),
            phone: "9876543210".into(),
            email: "priya@example.com".into(),
            password: "secret".into(),
            height_cm: 160.0,
            weight_kg: 50.0,
            working_days: 5,
            diseases: String::new(),
        }
    }

    #[test]
    fn valid_registration_has_no_errors() {
        assert!(valid().validate().is_empty());
    }

    #[test]
    fn all_errors_reported_together() {
        let reg = Registration {
            full_name: "P".into(),
            phone: "12345".into(),
            email: "nope".into(),
            password: String::new(),
            height_cm: 0.0,
            weight_kg: -1.0,
            working_days: 0,
            diseases: String::new(),
        };
        assert_eq!(reg.validate().len(), 7);
    }

    #[test]
    fn phone_must_be_digits_only() {
        let reg = Registration {
            phone: "98765-4321".into(),
            ..valid()
        };
        let errors = reg.validate();
        assert_eq!(errors, vec!["Phone number must be exactly 10 digits".to_string()]);
    }

    #[test]
    fn working_days_upper_bound() {
        let reg = Registration {
            working_days: 8,
            ..valid()
        };
        assert_eq!(reg.validate().len(), 1);
    }

    #[test]
    fn draft_drops_password() {
        let draft = valid().draft();
        assert!(draft.password.is_empty());
        assert_eq!(draft.email, "priya@example.com");
    }
}
