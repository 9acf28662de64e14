//! Patient endpoint: `GET /api/plan`: the logged-in patient's own plan.

use axum::extract::State;
use axum::{Extension, Json};

use crate::api::endpoints::patients::PlanResponse;
use crate::api::error::ApiError;
use crate::api::types::{require_patient, ApiContext, SessionContext};

pub async fn own_plan(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<SessionContext>,
) -> Result<Json<PlanResponse>, ApiError> {
    let patient_id = require_patient(&*session.lock()?)?;

    Ok(Json(PlanResponse {
        patient_id,
        plan: ctx.store.fetch_plan(patient_id)?,
    }))
}
