//! Page views.
//!
//! Each page renders to a serializable view holding what the screen shows.
//! Rendering reads from the store but never changes session state.

pub mod dashboard;
pub mod entry;

pub use dashboard::*;
pub use entry::*;

use serde::Serialize;

use crate::models::Identity;
use crate::session::{Page, SessionState};
use crate::store::{Store, StoreError};

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum PageView {
    RoleSelection(RoleSelectionView),
    Login(LoginView),
    Registration(RegistrationView),
    DoctorDashboard(DoctorDashboardView),
    PatientDashboard(PatientDashboardView),
}

/// What the session sees right now.
#[derive(Debug, Clone, Serialize)]
pub struct Rendered {
    pub page: Page,
    pub logged_in: bool,
    #[serde(flatten)]
    pub view: PageView,
}

/// Render the session's current page.
pub fn render(state: &SessionState, store: &Store) -> Result<Rendered, StoreError> {
    let view = match state.page() {
        Page::RoleSelection => PageView::RoleSelection(role_selection_view()),
        Page::Login => PageView::Login(login_view(state.role(), state.errors())),
        Page::Registration => PageView::Registration(registration_view(
            state.registration_draft(),
            state.errors(),
        )),
        Page::Dashboard => match state.identity() {
            Some(Identity::Doctor { id, name, .. }) => {
                PageView::DoctorDashboard(doctor_dashboard(store, *id, name)?)
            }
            Some(Identity::Patient { id, .. }) => {
                let patient = store
                    .get_patient(*id)?
                    .ok_or(StoreError::PatientNotFound(*id))?;
                let plan = store.fetch_plan(*id)?;
                PageView::PatientDashboard(patient_dashboard(&patient, plan.as_ref()))
            }
            // Dashboard is only entered through require_auth.
            None => PageView::Login(login_view(state.role(), state.errors())),
        },
    };

    Ok(Rendered {
        page: state.page(),
        logged_in: state.logged_in(),
        view,
    })
}
