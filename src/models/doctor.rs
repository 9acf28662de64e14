use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Doctor {
    pub id: i64,
    pub name: String,
    pub email: String,
    /// Stored credential string, never sent to clients.
    #[serde(skip_serializing, default)]
    pub password: String,
    pub created_at: NaiveDateTime,
}
