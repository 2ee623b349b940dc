use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use serde_json::json;
use uuid::Uuid;

use crate::db::{run_blocking, DbPool};
use crate::domain::catalog::{Showroom, ShowroomDraft, SiteSetting};
use crate::domain::errors::DomainError;
use crate::domain::events::{EventAction, EventEntity, PendingEvent};
use crate::domain::ports::{SettingsRepository, ShowroomRepository};
use crate::schema::{showrooms, site_settings};

use super::event_log::append_event;
use super::models::{ShowroomChange, ShowroomRow, SiteSettingChange, SiteSettingRow};

// ── Site settings ────────────────────────────────────────────────────────────

pub struct DieselSettingsRepository {
    pool: DbPool,
}

impl DieselSettingsRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SettingsRepository for DieselSettingsRepository {
    async fn list(&self) -> Result<Vec<SiteSetting>, DomainError> {
        run_blocking(&self.pool, |conn| {
            let rows = site_settings::table
                .order(site_settings::key.asc())
                .select(SiteSettingRow::as_select())
                .load(conn)?;
            Ok(rows.into_iter().map(SiteSetting::from).collect())
        })
        .await
    }

    async fn get(&self, key: &str) -> Result<Option<SiteSetting>, DomainError> {
        let key = key.to_string();
        run_blocking(&self.pool, move |conn| {
            let row = site_settings::table
                .find(key)
                .select(SiteSettingRow::as_select())
                .first(conn)
                .optional()?;
            Ok(row.map(SiteSetting::from))
        })
        .await
    }

    async fn upsert(
        &self,
        key: &str,
        value: &str,
        description: Option<&str>,
    ) -> Result<SiteSetting, DomainError> {
        let (key, value) = (key.to_string(), value.to_string());
        let description = description.map(str::to_string);
        run_blocking(&self.pool, move |conn| {
            conn.transaction::<_, DomainError, _>(|conn| {
                let existed = site_settings::table
                    .find(key.as_str())
                    .count()
                    .get_result::<i64>(conn)?
                    > 0;
                let change = SiteSettingChange {
                    key: &key,
                    value: &value,
                    description: description.as_deref(),
                    updated_at: Utc::now(),
                };
                let stored = diesel::insert_into(site_settings::table)
                    .values(&change)
                    .on_conflict(site_settings::key)
                    .do_update()
                    .set(&change)
                    .returning(SiteSettingRow::as_returning())
                    .get_result(conn)?;
                let action = if existed {
                    EventAction::Updated
                } else {
                    EventAction::Created
                };
                append_event(
                    conn,
                    PendingEvent::new(
                        EventEntity::SiteSettings,
                        action,
                        json!({"key": key, "value": value}),
                    ),
                )?;
                Ok(SiteSetting::from(stored))
            })
        })
        .await
    }

    async fn delete(&self, key: &str) -> Result<bool, DomainError> {
        let key = key.to_string();
        run_blocking(&self.pool, move |conn| {
            conn.transaction::<_, DomainError, _>(|conn| {
                let removed =
                    diesel::delete(site_settings::table.find(key.as_str())).execute(conn)?;
                if removed == 0 {
                    return Ok(false);
                }
                append_event(
                    conn,
                    PendingEvent::new(
                        EventEntity::SiteSettings,
                        EventAction::Deleted,
                        json!({"key": key}),
                    ),
                )?;
                Ok(true)
            })
        })
        .await
    }
}

// ── Showrooms ────────────────────────────────────────────────────────────────

pub struct DieselShowroomRepository {
    pool: DbPool,
}

impl DieselShowroomRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl From<ShowroomDraft> for ShowroomChange {
    fn from(draft: ShowroomDraft) -> Self {
        ShowroomChange {
            name: draft.name,
            address: draft.address,
            city: draft.city,
            phone: draft.phone,
            email: draft.email,
            working_hours: draft.working_hours,
            is_active: draft.is_active,
            updated_at: Utc::now(),
        }
    }
}

fn showroom_event(action: EventAction, showroom: &Showroom) -> PendingEvent {
    PendingEvent::new(
        EventEntity::Showrooms,
        action,
        json!({
            "id": showroom.id,
            "name": showroom.name,
            "is_active": showroom.is_active,
        }),
    )
}

#[async_trait]
impl ShowroomRepository for DieselShowroomRepository {
    async fn list(&self, active_only: bool) -> Result<Vec<Showroom>, DomainError> {
        run_blocking(&self.pool, move |conn| {
            let mut query = showrooms::table
                .select(ShowroomRow::as_select())
                .order(showrooms::name.asc())
                .into_boxed();
            if active_only {
                query = query.filter(showrooms::is_active.eq(true));
            }
            Ok(query.load(conn)?.into_iter().map(Showroom::from).collect())
        })
        .await
    }

    async fn get(&self, id: Uuid) -> Result<Option<Showroom>, DomainError> {
        run_blocking(&self.pool, move |conn| {
            let row = showrooms::table
                .find(id)
                .select(ShowroomRow::as_select())
                .first(conn)
                .optional()?;
            Ok(row.map(Showroom::from))
        })
        .await
    }

    async fn create(&self, draft: ShowroomDraft) -> Result<Showroom, DomainError> {
        let change = ShowroomChange::from(draft);
        run_blocking(&self.pool, move |conn| {
            conn.transaction::<_, DomainError, _>(|conn| {
                let stored = diesel::insert_into(showrooms::table)
                    .values((showrooms::id.eq(Uuid::new_v4()), &change))
                    .returning(ShowroomRow::as_returning())
                    .get_result(conn)?;
                let showroom = Showroom::from(stored);
                append_event(conn, showroom_event(EventAction::Created, &showroom))?;
                Ok(showroom)
            })
        })
        .await
    }

    async fn update(
        &self,
        id: Uuid,
        draft: ShowroomDraft,
    ) -> Result<Option<Showroom>, DomainError> {
        let change = ShowroomChange::from(draft);
        run_blocking(&self.pool, move |conn| {
            conn.transaction::<_, DomainError, _>(|conn| {
                let stored = diesel::update(showrooms::table.find(id))
                    .set(&change)
                    .returning(ShowroomRow::as_returning())
                    .get_result(conn)
                    .optional()?;
                let Some(stored) = stored else {
                    return Ok(None);
                };
                let showroom = Showroom::from(stored);
                append_event(conn, showroom_event(EventAction::Updated, &showroom))?;
                Ok(Some(showroom))
            })
        })
        .await
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        run_blocking(&self.pool, move |conn| {
            conn.transaction::<_, DomainError, _>(|conn| {
                let removed = diesel::delete(showrooms::table.find(id)).execute(conn)?;
                if removed == 0 {
                    return Ok(false);
                }
                append_event(
                    conn,
                    PendingEvent::new(
                        EventEntity::Showrooms,
                        EventAction::Deleted,
                        json!({"id": id}),
                    ),
                )?;
                Ok(true)
            })
        })
        .await
    }
}
