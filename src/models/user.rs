use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: String,
    pub phone_number: String,
    pub full_name: Option<String>,
    pub created_at: NaiveDateTime,
}
