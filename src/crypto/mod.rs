pub mod password;

pub use password::*;

use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CryptoError {
    #[error("Malformed stored credential")]
    MalformedCredential,

    #[error("Unsupported credential scheme: {0}")]
    UnsupportedScheme(String),
}
