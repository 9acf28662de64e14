use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The pages a session can be on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Page {
    #[default]
    RoleSelection,
    Login,
    Registration,
    Dashboard,
}

/// Every (from, to) pair a session may take. Staying put is always allowed.
const ALLOWED_TRANSITIONS: &[(Page, Page)] = &[
    (Page::RoleSelection, Page::Login),
    (Page::Login, Page::RoleSelection),
    (Page::Login, Page::Registration),
    (Page::Login, Page::Dashboard),
    (Page::Registration, Page::Login),
    (Page::Registration, Page::Dashboard),
    (Page::Dashboard, Page::RoleSelection),
];

impl Page {
    pub const ALL: [Page; 4] = [
        Page::RoleSelection,
        Page::Login,
        Page::Registration,
        Page::Dashboard,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Page::RoleSelection => "role_selection",
            Page::Login => "login",
            Page::Registration => "registration",
            Page::Dashboard => "dashboard",
        }
    }

    pub fn can_transition_to(self, to: Page) -> bool {
        self == to || ALLOWED_TRANSITIONS.contains(&(self, to))
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Page {
    type Err = TransitionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Page::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| TransitionError::UnknownPage(s.to_string()))
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransitionError {
    #[error("Unknown page: {0}")]
    UnknownPage(String),

    #[error("Cannot go from {from} to {to}")]
    NotAllowed { from: Page, to: Page },

    #[error("Choose a role first")]
    RoleRequired,

    #[error("Only patients can register")]
    PatientOnly,
}
