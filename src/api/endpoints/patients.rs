//! Doctor endpoints.
//!
//! - `GET /api/patients`: patient list with plan status
//! - `GET /api/patients/:id/plan`: a patient's current plan
//! - `PUT /api/patients/:id/plan`: assign a plan
//! - `POST /api/patients/:id/plan/generate`: generate and store a plan

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::types::{require_doctor, ApiContext, SessionContext};
use crate::diet::{BodyProfile, GeneratedPlan};
use crate::models::{DietPlan, Meal, MealPlan, MealSlot, PatientSummary};
use crate::store::PlanCounts;

#[derive(Serialize)]
pub struct PatientsResponse {
    pub patients: Vec<PatientSummary>,
    pub counts: PlanCounts,
}

/// `GET /api/patients`
pub async fn list(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<SessionContext>,
) -> Result<Json<PatientsResponse>, ApiError> {
    require_doctor(&*session.lock()?)?;

    Ok(Json(PatientsResponse {
        patients: ctx.store.list_patients()?,
        counts: ctx.store.plan_counts()?,
    }))
}

#[derive(Serialize)]
pub struct PlanResponse {
    pub patient_id: i64,
    /// `None` when the patient has no plan yet.
    pub plan: Option<DietPlan>,
}

/// `GET /api/patients/:id/plan`
pub async fn get_plan(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<SessionContext>,
    Path(patient_id): Path<i64>,
) -> Result<Json<PlanResponse>, ApiError> {
    require_doctor(&*session.lock()?)?;

    if ctx.store.get_patient(patient_id)?.is_none() {
        return Err(ApiError::NotFound(format!("patient {patient_id}")));
    }
    Ok(Json(PlanResponse {
        patient_id,
        plan: ctx.store.fetch_plan(patient_id)?,
    }))
}

#[derive(Deserialize)]
pub struct MealInput {
    pub description: String,
    #[serde(default)]
    pub calories: Option<u32>,
}

impl From<MealInput> for Meal {
    fn from(input: MealInput) -> Self {
        Meal::new(input.description.trim(), input.calories)
    }
}

#[derive(Deserialize)]
pub struct AssignPlanRequest {
    pub breakfast: MealInput,
    pub lunch: MealInput,
    pub dinner: MealInput,
}

/// `PUT /api/patients/:id/plan`: replace the patient's plan.
pub async fn assign_plan(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<SessionContext>,
    Path(patient_id): Path<i64>,
    payload: Result<Json<AssignPlanRequest>, JsonRejection>,
) -> Result<Json<PlanResponse>, ApiError> {
    let Json(req) = payload?;
    let doctor_id = require_doctor(&*session.lock()?)?;

    let mut meals = MealPlan::from_descriptions("", "", "");
    meals.set_meal(MealSlot::Breakfast, req.breakfast.into());
    meals.set_meal(MealSlot::Lunch, req.lunch.into());
    meals.set_meal(MealSlot::Dinner, req.dinner.into());

    let plan = ctx.store.assign_plan(patient_id, &meals, Some(doctor_id))?;
    tracing::info!(patient_id, doctor_id, "Plan assigned");
    Ok(Json(PlanResponse {
        patient_id,
        plan: Some(plan),
    }))
}

#[derive(Serialize)]
pub struct GenerateResponse {
    pub plan: DietPlan,
    pub generator: &'static str,
    #[serde(flatten)]
    pub details: GeneratedPlan,
}

/// `POST /api/patients/:id/plan/generate`: generate from the patient's
/// profile and replace whatever plan they had.
pub async fn generate_plan(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<SessionContext>,
    Path(patient_id): Path<i64>,
) -> Result<Json<GenerateResponse>, ApiError> {
    require_doctor(&*session.lock()?)?;

    let patient = ctx
        .store
        .get_patient(patient_id)?
        .ok_or_else(|| ApiError::NotFound(format!("patient {patient_id}")))?;

    let details = ctx.generator.generate(&BodyProfile::from(&patient));
    let plan = ctx.store.save_generated_plan(patient_id, &details.meals)?;

    Ok(Json(GenerateResponse {
        plan,
        generator: ctx.generator.name(),
        details,
    }))
}
