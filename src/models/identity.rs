use serde::{Deserialize, Serialize};

use super::{Doctor, Patient, Role};

/// Who a session is logged in as, with profile fields cached for display.
///
/// References the stored row by id; the row itself stays in the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum Identity {
    Doctor {
        id: i64,
        name: String,
        email: String,
    },
    Patient {
        id: i64,
        full_name: String,
        email: String,
        phone: String,
        height_cm: f64,
        weight_kg: f64,
        working_days: u8,
        diseases: String,
    },
}

impl Identity {
    pub fn role(&self) -> Role {
        match self {
            Identity::Doctor { .. } => Role::Doctor,
            Identity::Patient { .. } => Role::Patient,
        }
    }

    pub fn id(&self) -> i64 {
        match self {
            Identity::Doctor { id, .. } | Identity::Patient { id, .. } => *id,
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            Identity::Doctor { name, .. } => name,
            Identity::Patient { full_name, .. } => full_name,
        }
    }
}

impl From<&Doctor> for Identity {
    fn from(doctor: &Doctor) -> Self {
        Identity::Doctor {
            id: doctor.id,
            name: doctor.name.clone(),
            email: doctor.email.clone(),
        }
    }
}

impl From<&Patient> for Identity {
    fn from(patient: &Patient) -> Self {
        Identity::Patient {
            id: patient.id,
            full_name: patient.full_name.clone(),
            email: patient.email.clone(),
            phone: patient.phone.clone(),
            height_cm: patient.height_cm,
            weight_kg: patient.weight_kg,
            working_days: patient.working_days,
            diseases: patient.diseases.clone(),
        }
    }
}
