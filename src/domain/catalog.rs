//! Site settings and showrooms managed from the admin panel.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::errors::DomainError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SiteSetting {
    pub key: String,
    pub value: String,
    pub description: Option<String>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Showroom {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub city: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub working_hours: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Showroom fields as written by the admin, after working hours have been
/// resolved to text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShowroomDraft {
    pub name: String,
    pub address: String,
    pub city: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub working_hours: String,
    pub is_active: bool,
}

impl ShowroomDraft {
    pub fn validate(&self) -> Result<(), DomainError> {
        let missing: Vec<&str> = [
            ("name", &self.name),
            ("address", &self.address),
            ("city", &self.city),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| field)
        .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(DomainError::InvalidInput(format!(
                "Câmpuri obligatorii lipsă: {}",
                missing.join(", ")
            )))
        }
    }
}

pub fn validate_setting_key(key: &str) -> Result<(), DomainError> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '.');
    if valid {
        Ok(())
    } else {
        Err(DomainError::InvalidInput(format!(
            "Cheie de setare invalidă: '{key}'"
        )))
    }
}
