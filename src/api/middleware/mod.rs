//! API middleware stack.
//!
//! Execution order (outermost → innermost):
//! 1. Session lookup: resolve the session id, inject `SessionContext`
//! 2. Access log: runs after the session is known

pub mod audit;
pub mod session;
