use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::json;
use uuid::Uuid;

use crate::db::{run_blocking, DbPool};
use crate::domain::errors::DomainError;
use crate::domain::events::{EventAction, EventEntity, PendingEvent};
use crate::domain::newsletter::{Subscription, SubscriptionStats, SubscriptionStatus};
use crate::domain::ports::NewsletterRepository;
use crate::schema::newsletter_subscriptions as subs;

use super::event_log::append_event;
use super::models::{NewSubscriptionRow, SubscriptionRow};

pub struct DieselNewsletterRepository {
    pool: DbPool,
}

impl DieselNewsletterRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn subscription_event(action: EventAction, sub: &Subscription) -> PendingEvent {
    PendingEvent::new(
        EventEntity::NewsletterSubscriptions,
        action,
        json!({"id": sub.id, "status": sub.status}),
    )
}

#[async_trait]
impl NewsletterRepository for DieselNewsletterRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<Subscription>, DomainError> {
        let email = email.to_string();
        run_blocking(&self.pool, move |conn| {
            subs::table
                .filter(subs::email.eq(email))
                .select(SubscriptionRow::as_select())
                .first(conn)
                .optional()?
                .map(Subscription::try_from)
                .transpose()
        })
        .await
    }

    async fn insert(&self, email: &str, source: &str) -> Result<Subscription, DomainError> {
        let row = NewSubscriptionRow {
            id: Uuid::new_v4(),
            email: email.to_string(),
            status: SubscriptionStatus::Active.as_str().to_string(),
            source: source.to_string(),
        };
        run_blocking(&self.pool, move |conn| {
            conn.transaction::<_, DomainError, _>(|conn| {
                let stored = diesel::insert_into(subs::table)
                    .values(&row)
                    .returning(SubscriptionRow::as_returning())
                    .get_result(conn)?;
                let sub = Subscription::try_from(stored)?;
                append_event(conn, subscription_event(EventAction::Created, &sub))?;
                Ok(sub)
            })
        })
        .await
    }

    async fn set_status(
        &self,
        email: &str,
        status: SubscriptionStatus,
        at: DateTime<Utc>,
    ) -> Result<Subscription, DomainError> {
        let email = email.to_string();
        run_blocking(&self.pool, move |conn| {
            conn.transaction::<_, DomainError, _>(|conn| {
                let target = subs::table.filter(subs::email.eq(email.as_str()));
                let stored = match status {
                    SubscriptionStatus::Active => diesel::update(target)
                        .set((
                            subs::status.eq(status.as_str()),
                            subs::subscribed_at.eq(at),
                            subs::unsubscribed_at.eq(None::<DateTime<Utc>>),
                            subs::updated_at.eq(at),
                        ))
                        .returning(SubscriptionRow::as_returning())
                        .get_result(conn),
                    SubscriptionStatus::Unsubscribed => diesel::update(target)
                        .set((
                            subs::status.eq(status.as_str()),
                            subs::unsubscribed_at.eq(Some(at)),
                            subs::updated_at.eq(at),
                        ))
                        .returning(SubscriptionRow::as_returning())
                        .get_result(conn),
                    SubscriptionStatus::Bounced => diesel::update(target)
                        .set((subs::status.eq(status.as_str()), subs::updated_at.eq(at)))
                        .returning(SubscriptionRow::as_returning())
                        .get_result(conn),
                }?;
                let sub = Subscription::try_from(stored)?;
                append_event(conn, subscription_event(EventAction::Updated, &sub))?;
                Ok(sub)
            })
        })
        .await
    }

    async fn list(
        &self,
        status: Option<SubscriptionStatus>,
        page: i64,
        limit: i64,
    ) -> Result<(Vec<Subscription>, i64), DomainError> {
        let offset = (page - 1) * limit;
        run_blocking(&self.pool, move |conn| {
            conn.transaction::<_, DomainError, _>(|conn| {
                let mut count = subs::table.count().into_boxed();
                let mut query = subs::table
                    .select(SubscriptionRow::as_select())
                    .order(subs::subscribed_at.desc())
                    .limit(limit)
                    .offset(offset)
                    .into_boxed();
                if let Some(status) = status {
                    count = count.filter(subs::status.eq(status.as_str()));
                    query = query.filter(subs::status.eq(status.as_str()));
                }
                let total: i64 = count.get_result(conn)?;
                let items = query
                    .load(conn)?
                    .into_iter()
                    .map(Subscription::try_from)
                    .collect::<Result<_, _>>()?;
                Ok((items, total))
            })
        })
        .await
    }

    async fn stats(&self) -> Result<SubscriptionStats, DomainError> {
        run_blocking(&self.pool, |conn| {
            let counts: Vec<(String, i64)> = subs::table
                .group_by(subs::status)
                .select((subs::status, diesel::dsl::count_star()))
                .load(conn)?;
            let mut stats = SubscriptionStats::default();
            for (status, n) in counts {
                match SubscriptionStatus::parse(&status) {
                    Some(SubscriptionStatus::Active) => stats.active = n,
                    Some(SubscriptionStatus::Unsubscribed) => stats.unsubscribed = n,
                    Some(SubscriptionStatus::Bounced) => stats.bounced = n,
                    None => log::warn!("Ignoring unknown subscription status '{}'", status),
                }
            }
            Ok(stats)
        })
        .await
    }
}
