//! Session router.
//!
//! Each browser session has its own `SessionState` (page, role, identity,
//! registration draft), held in a `SessionStore` keyed by an opaque id.
//! Pages move along the table in `page.rs`; anything else is rejected.

pub mod page;
pub mod state;
pub mod store;

pub use page::*;
pub use state::*;
pub use store::*;

use thiserror::Error;

use crate::store::StoreError;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Transition(#[from] TransitionError),

    #[error(transparent)]
    Store(#[from] StoreError),
}
