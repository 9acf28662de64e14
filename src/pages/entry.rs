use serde::Serialize;

use crate::config;
use crate::models::patient::{MAX_HEIGHT_CM, MAX_WEIGHT_KG, MIN_NAME_CHARS, PHONE_DIGITS};
use crate::models::{Registration, Role};

// ═══════════════════════════════════════════════════════════
// Role selection
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize)]
pub struct Portal {
    pub role: Role,
    pub title: &'static str,
    pub summary: &'static str,
    pub highlights: [&'static str; 3],
}

#[derive(Debug, Clone, Serialize)]
pub struct FeatureCard {
    pub title: &'static str,
    pub description: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct RoleSelectionView {
    pub title: &'static str,
    pub tagline: &'static str,
    pub portals: [Portal; 2],
    pub features: [FeatureCard; 3],
}

pub fn role_selection_view() -> RoleSelectionView {
    RoleSelectionView {
        title: config::APP_NAME,
        tagline: "Harmonizing ancient Ayurvedic wisdom with modern nutrition science for personalized wellness",
        portals: [
            Portal {
                role: Role::Doctor,
                title: "Doctor Portal",
                summary: "Manage patient diet charts with Ayurvedic principles",
                highlights: [
                    "Create personalized diet plans",
                    "Track patient progress",
                    "Apply Ayurvedic food properties",
                ],
            },
            Portal {
                role: Role::Patient,
                title: "Patient Portal",
                summary: "Access your personalized Ayurvedic diet plan",
                highlights: [
                    "View your diet chart",
                    "Track food intake",
                    "Monitor wellness progress",
                ],
            },
        ],
        features: [
            FeatureCard {
                title: "Six Tastes (Rasa)",
                description: "Balance sweet, sour, salty, bitter, pungent, and astringent",
            },
            FeatureCard {
                title: "Food Properties",
                description: "Hot/Cold nature and digestibility analysis",
            },
            FeatureCard {
                title: "Modern Metrics",
                description: "Caloric values with traditional wisdom",
            },
        ],
    }
}

// ═══════════════════════════════════════════════════════════
// Login
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize)]
pub struct LoginView {
    pub role: Option<Role>,
    pub heading: String,
    pub identifier_label: &'static str,
    /// Patients can switch to the registration form.
    pub can_register: bool,
    pub error: Option<String>,
}

pub fn login_view(role: Option<Role>, errors: &[String]) -> LoginView {
    let (heading, identifier_label) = match role {
        Some(Role::Doctor) => ("Doctor Login".to_string(), "Doctor ID / Email"),
        Some(Role::Patient) => ("Patient Login".to_string(), "Email Address"),
        None => ("Login".to_string(), "Email Address"),
    };
    LoginView {
        role,
        heading,
        identifier_label,
        can_register: role == Some(Role::Patient),
        error: errors.first().cloned(),
    }
}

// ═══════════════════════════════════════════════════════════
// Registration
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize)]
pub struct FormField {
    pub name: &'static str,
    pub label: &'static str,
    pub required: bool,
    pub constraint: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegistrationView {
    pub heading: &'static str,
    pub fields: Vec<FormField>,
    pub draft: Registration,
    pub errors: Vec<String>,
}

fn field(name: &'static str, label: &'static str, required: bool, constraint: String) -> FormField {
    FormField {
        name,
        label,
        required,
        constraint,
    }
}

pub fn registration_view(draft: &Registration, errors: &[String]) -> RegistrationView {
    RegistrationView {
        heading: "Patient Registration",
        fields: vec![
            field("full_name", "Full Name", true, format!("at least {MIN_NAME_CHARS} characters")),
            field("phone", "Phone Number", true, format!("exactly {PHONE_DIGITS} digits")),
            field("email", "Email Address", true, "must contain @".to_string()),
            field("password", "Password", true, "must not be empty".to_string()),
            field("height_cm", "Height (cm)", true, format!("greater than 0, at most {MAX_HEIGHT_CM}")),
            field("weight_kg", "Weight (kg)", true, format!("greater than 0, at most {MAX_WEIGHT_KG}")),
            field("working_days", "Working Days per Week", true, "1 to 7".to_string()),
            field("diseases", "Existing Conditions", false, "free text, optional".to_string()),
        ],
        draft: draft.draft(),
        errors: errors.to_vec(),
    }
}
