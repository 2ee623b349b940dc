use std::sync::Arc;

use log::info;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::catalog::{validate_setting_key, Showroom, ShowroomDraft, SiteSetting};
use crate::domain::errors::DomainError;
use crate::domain::ports::{SettingsRepository, ShowroomRepository};
use crate::domain::working_hours::{self, WeeklySchedule};

/// Showroom as submitted by the admin form. Opening hours come either as
/// the structured `schedule` from the hours editor or as free `working_hours`
/// text; the schedule wins when both are present.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ShowroomInput {
    pub name: String,
    pub address: String,
    pub city: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub working_hours: Option<String>,
    pub schedule: Option<WeeklySchedule>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl ShowroomInput {
    fn into_draft(self) -> ShowroomDraft {
        let working_hours = match (self.schedule, self.working_hours) {
            (Some(schedule), _) => working_hours::encode(&schedule),
            (None, Some(text)) if !text.trim().is_empty() => text.trim().to_string(),
            (None, _) => working_hours::encode(&WeeklySchedule::default()),
        };
        let optional = |value: Option<String>| {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        ShowroomDraft {
            name: self.name.trim().to_string(),
            address: self.address.trim().to_string(),
            city: self.city.trim().to_string(),
            phone: optional(self.phone),
            email: optional(self.email),
            working_hours,
            is_active: self.is_active,
        }
    }
}

/// Showroom with its opening hours decoded for the hours editor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ShowroomView {
    #[serde(flatten)]
    pub showroom: Showroom,
    pub schedule: WeeklySchedule,
}

impl From<Showroom> for ShowroomView {
    fn from(showroom: Showroom) -> Self {
        let schedule = working_hours::decode(&showroom.working_hours);
        Self { showroom, schedule }
    }
}

#[derive(Clone)]
pub struct CatalogService {
    settings: Arc<dyn SettingsRepository>,
    showrooms: Arc<dyn ShowroomRepository>,
}

impl CatalogService {
    pub fn new(
        settings: Arc<dyn SettingsRepository>,
        showrooms: Arc<dyn ShowroomRepository>,
    ) -> Self {
        Self {
            settings,
            showrooms,
        }
    }

    // ── Site settings ────────────────────────────────────────────────────────

    pub async fn list_settings(&self) -> Result<Vec<SiteSetting>, DomainError> {
        self.settings.list().await
    }

    pub async fn get_setting(&self, key: &str) -> Result<SiteSetting, DomainError> {
        self.settings.get(key).await?.ok_or(DomainError::NotFound)
    }

    pub async fn update_setting(
        &self,
        key: &str,
        value: &str,
        description: Option<&str>,
    ) -> Result<SiteSetting, DomainError> {
        validate_setting_key(key)?;
        let setting = self.settings.upsert(key, value, description).await?;
        info!("Site setting '{}' saved", key);
        Ok(setting)
    }

    pub async fn delete_setting(&self, key: &str) -> Result<(), DomainError> {
        if self.settings.delete(key).await? {
            info!("Site setting '{}' deleted", key);
            Ok(())
        } else {
            Err(DomainError::NotFound)
        }
    }

    // ── Showrooms ────────────────────────────────────────────────────────────

    pub async fn list_showrooms(
        &self,
        active_only: bool,
    ) -> Result<Vec<ShowroomView>, DomainError> {
        let rows = self.showrooms.list(active_only).await?;
        Ok(rows.into_iter().map(ShowroomView::from).collect())
    }

    pub async fn get_showroom(&self, id: Uuid) -> Result<ShowroomView, DomainError> {
        self.showrooms
            .get(id)
            .await?
            .map(ShowroomView::from)
            .ok_or(DomainError::NotFound)
    }

    pub async fn create_showroom(&self, input: ShowroomInput) -> Result<ShowroomView, DomainError> {
        let draft = input.into_draft();
        draft.validate()?;
        let showroom = self.showrooms.create(draft).await?;
        info!("Showroom {} '{}' created", showroom.id, showroom.name);
        Ok(showroom.into())
    }

    pub async fn update_showroom(
        &self,
        id: Uuid,
        input: ShowroomInput,
    ) -> Result<ShowroomView, DomainError> {
        let draft = input.into_draft();
        draft.validate()?;
        let showroom = self
            .showrooms
            .update(id, draft)
            .await?
            .ok_or(DomainError::NotFound)?;
        info!("Showroom {} updated", id);
        Ok(showroom.into())
    }

    pub async fn delete_showroom(&self, id: Uuid) -> Result<(), DomainError> {
        if self.showrooms.delete(id).await? {
            info!("Showroom {} deleted", id);
            Ok(())
        } else {
            Err(DomainError::NotFound)
        }
    }
}
