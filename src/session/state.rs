use crate::diet::PlanGenerator;
use crate::models::{Identity, Registration, Role};
use crate::store::{Store, StoreError};

use super::{Page, SessionError, TransitionError};

pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid credentials";

/// Per-session router state.
///
/// `logged_in` is derived from `identity`, so a logged-in session without an
/// identity cannot be represented.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    page: Page,
    role: Option<Role>,
    identity: Option<Identity>,
    registration_draft: Registration,
    errors: Vec<String>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(&self) -> Page {
        self.page
    }

    pub fn role(&self) -> Option<Role> {
        self.role
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn logged_in(&self) -> bool {
        self.identity.is_some()
    }

    pub fn registration_draft(&self) -> &Registration {
        &self.registration_draft
    }

    /// Messages from the last failed action, shown on the current page.
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    // ── Transitions ──────────────────────────────────────

    /// Move to `target` if the transitions table and guards allow it.
    ///
    /// Returns the page actually landed on: `Dashboard` while logged out
    /// lands on `Login`.
    pub fn navigate(&mut self, target: Page) -> Result<Page, TransitionError> {
        if !self.page.can_transition_to(target) {
            return Err(TransitionError::NotAllowed {
                from: self.page,
                to: target,
            });
        }

        let landed = match target {
            Page::RoleSelection => Page::RoleSelection,
            Page::Login => {
                self.role.ok_or(TransitionError::RoleRequired)?;
                Page::Login
            }
            Page::Registration => match self.role {
                Some(Role::Patient) => Page::Registration,
                Some(Role::Doctor) => return Err(TransitionError::PatientOnly),
                None => return Err(TransitionError::RoleRequired),
            },
            Page::Dashboard => self.require_auth(),
        };

        if landed != self.page {
            self.errors.clear();
        }
        tracing::debug!(from = %self.page, to = %landed, "Page transition");
        self.page = landed;
        Ok(landed)
    }

    /// Gate for the dashboard: the page to show given the login state.
    pub fn require_auth(&self) -> Page {
        if self.logged_in() {
            Page::Dashboard
        } else {
            Page::Login
        }
    }

    /// Choose the portal and go to its login page.
    ///
    /// Logged-in sessions must log out before switching role.
    pub fn select_role(&mut self, role: Role) -> Result<Page, TransitionError> {
        if !self.page.can_transition_to(Page::Login) || self.logged_in() {
            return Err(TransitionError::NotAllowed {
                from: self.page,
                to: Page::Login,
            });
        }
        self.role = Some(role);
        self.navigate(Page::Login)
    }

    /// Reset everything, back to role selection.
    pub fn logout(&mut self) -> Page {
        *self = Self::default();
        self.page
    }

    // ── Actions backed by the store ──────────────────────

    /// Check credentials for the chosen role.
    ///
    /// On success the session moves to the dashboard; a patient without a plan
    /// gets one generated. On failure the session stays on the login page with
    /// a generic message. Returns whether the login succeeded.
    pub fn login(
        &mut self,
        store: &Store,
        generator: &dyn PlanGenerator,
        identifier: &str,
        password: &str,
    ) -> Result<bool, SessionError> {
        if self.page != Page::Login {
            return Err(TransitionError::NotAllowed {
                from: self.page,
                to: Page::Dashboard,
            }
            .into());
        }
        let role = self.role.ok_or(TransitionError::RoleRequired)?;

        match store.authenticate(role, identifier, password)? {
            Some(identity) => {
                if let Identity::Patient { id, .. } = &identity {
                    store.ensure_plan(*id, generator)?;
                }
                self.identity = Some(identity);
                self.navigate(Page::Dashboard)?;
                Ok(true)
            }
            None => {
                self.errors = vec![INVALID_CREDENTIALS_MESSAGE.to_string()];
                Ok(false)
            }
        }
    }

    /// Submit the registration form.
    ///
    /// Success stores the patient, generates their first plan, logs them in and
    /// opens the dashboard. Once the patient row exists the session is logged
    /// in even if plan generation fails; the next login retries it. Validation and duplicate failures keep the session
    /// on the registration page with the draft (minus password) and messages,
    /// and are also returned to the caller.
    pub fn register(
        &mut self,
        store: &Store,
        generator: &dyn PlanGenerator,
        registration: &Registration,
    ) -> Result<i64, SessionError> {
        if self.page != Page::Registration {
            return Err(TransitionError::NotAllowed {
                from: self.page,
                to: Page::Registration,
            }
            .into());
        }

        self.registration_draft = registration.draft();
        let patient_id = match store.register_patient(registration) {
            Ok(id) => id,
            Err(err) => {
                self.errors = match &err {
                    StoreError::Validation(messages) => messages.clone(),
                    StoreError::AlreadyRegistered { field } => {
                        vec![format!("This {field} is already registered")]
                    }
                    _ => Vec::new(),
                };
                return Err(err.into());
            }
        };

        if let Err(e) = store.ensure_plan(patient_id, generator) {
            tracing::warn!(patient_id, error = %e, "First plan not stored, continuing login");
        }
        let patient = store
            .get_patient(patient_id)?
            .ok_or(StoreError::PatientNotFound(patient_id))?;

        self.identity = Some(Identity::from(&patient));
        self.registration_draft = Registration::default();
        self.navigate(Page::Dashboard)?;
        Ok(patient_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config;
    use crate::diet::BmiTemplateGenerator;
    use crate::models::PlanSource;
    use crate::store::tests::{registration, test_store};

    #[test]
    fn starts_on_role_selection() {
        let state = SessionState::new();
        assert_eq!(state.page(), Page::RoleSelection);
        assert!(!state.logged_in());
        assert!(state.role().is_none());
    }

    #[test]
    fn login_requires_role() {
        let mut state = SessionState::new();
        assert_eq!(state.navigate(Page::Login), Err(TransitionError::RoleRequired));
        assert_eq!(state.page(), Page::RoleSelection);
    }

    #[test]
    fn select_role_moves_to_login() {
        let mut state = SessionState::new();
        assert_eq!(state.select_role(Role::Doctor), Ok(Page::Login));
        assert_eq!(state.role(), Some(Role::Doctor));
    }

    #[test]
    fn disallowed_transition_rejected() {
        let mut state = SessionState::new();
        assert_eq!(
            state.navigate(Page::Registration),
            Err(TransitionError::NotAllowed {
                from: Page::RoleSelection,
                to: Page::Registration
            })
        );
    }

    #[test]
    fn dashboard_while_logged_out_redirects_to_login() {
        let mut state = SessionState::new();
        state.select_role(Role::Patient).unwrap();
        assert_eq!(state.navigate(Page::Dashboard), Ok(Page::Login));
        assert_eq!(state.page(), Page::Login);
    }

    #[test]
    fn doctors_cannot_open_registration() {
        let mut state = SessionState::new();
        state.select_role(Role::Doctor).unwrap();
        assert_eq!(state.navigate(Page::Registration), Err(TransitionError::PatientOnly));
        assert_eq!(state.page(), Page::Login);
    }

    #[test]
    fn failed_login_stays_on_login() {
        let (store, _dir) = test_store();
        let mut state = SessionState::new();
        state.select_role(Role::Doctor).unwrap();

        let ok = state
            .login(&store, &BmiTemplateGenerator, config::SEED_DOCTOR_EMAIL, "wrong")
            .unwrap();
        assert!(!ok);
        assert!(!state.logged_in());
        assert_eq!(state.page(), Page::Login);
        assert_eq!(state.errors(), [INVALID_CREDENTIALS_MESSAGE.to_string()]);
    }

    #[test]
    fn doctor_login_reaches_dashboard_and_logout_resets() {
        let (store, _dir) = test_store();
        let mut state = SessionState::new();
        state.select_role(Role::Doctor).unwrap();

        assert!(state
            .login(&store, &BmiTemplateGenerator, config::SEED_DOCTOR_EMAIL, config::SEED_DOCTOR_PASSWORD)
            .unwrap());
        assert_eq!(state.page(), Page::Dashboard);
        assert_eq!(state.identity().map(|i| i.role()), Some(Role::Doctor));

        assert_eq!(state.logout(), Page::RoleSelection);
        assert_eq!(state, SessionState::default());
    }

    #[test]
    fn logged_in_session_cannot_switch_role() {
        let (store, _dir) = test_store();
        let mut state = SessionState::new();
        state.select_role(Role::Doctor).unwrap();
        state
            .login(&store, &BmiTemplateGenerator, config::SEED_DOCTOR_EMAIL, config::SEED_DOCTOR_PASSWORD)
            .unwrap();
        state.navigate(Page::RoleSelection).unwrap();

        assert!(state.select_role(Role::Patient).is_err());
        assert_eq!(state.role(), Some(Role::Doctor));
    }

    #[test]
    fn patient_login_generates_missing_plan() {
        let (store, _dir) = test_store();
        let id = store.register_patient(&registration("a@x.in", "9111111111")).unwrap();
        assert!(store.fetch_plan(id).unwrap().is_none());

        let mut state = SessionState::new();
        state.select_role(Role::Patient).unwrap();
        assert!(state.login(&store, &BmiTemplateGenerator, "9111111111", "sunita-pw").unwrap());

        let plan = store.fetch_plan(id).unwrap().unwrap();
        assert_eq!(plan.source, PlanSource::Generated);
    }

    #[test]
    fn registration_logs_in_with_generated_plan() {
        let (store, _dir) = test_store();
        let mut state = SessionState::new();
        state.select_role(Role::Patient).unwrap();
        state.navigate(Page::Registration).unwrap();

        let id = state
            .register(&store, &BmiTemplateGenerator, &registration("a@x.in", "9111111111"))
            .unwrap();
        assert_eq!(state.page(), Page::Dashboard);
        assert_eq!(state.identity().map(|i| i.id()), Some(id));
        assert!(store.fetch_plan(id).unwrap().is_some());
    }

    #[test]
    fn failed_registration_keeps_draft_without_password() {
        let (store, _dir) = test_store();
        store.register_patient(&registration("a@x.in", "9111111111")).unwrap();

        let mut state = SessionState::new();
        state.select_role(Role::Patient).unwrap();
        state.navigate(Page::Registration).unwrap();

        let err = state
            .register(&store, &BmiTemplateGenerator, &registration("a@x.in", "9222222222"))
            .unwrap_err();
        assert!(matches!(err, SessionError::Store(StoreError::AlreadyRegistered { .. })));
        assert_eq!(state.page(), Page::Registration);
        assert_eq!(state.registration_draft().email, "a@x.in");
        assert!(state.registration_draft().password.is_empty());
        assert_eq!(state.errors(), ["This email is already registered".to_string()]);
    }

    #[test]
    fn registration_logs_in_even_if_plan_cannot_be_stored() {
        let (store, _dir) = test_store();
        let conn = crate::db::connect(store.db_path()).unwrap();
        conn.execute_batch("DROP TABLE diet_plans;").unwrap();

        let mut state = SessionState::new();
        state.select_role(Role::Patient).unwrap();
        state.navigate(Page::Registration).unwrap();

        let id = state
            .register(&store, &BmiTemplateGenerator, &registration("a@x.in", "9111111111"))
            .unwrap();
        assert_eq!(state.page(), Page::Dashboard);
        assert_eq!(state.identity().map(|i| i.id()), Some(id));
        assert!(state.errors().is_empty());
    }
}
