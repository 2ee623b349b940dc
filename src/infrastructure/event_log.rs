use async_trait::async_trait;
use diesel::dsl::max;
use diesel::prelude::*;
use diesel::sql_types::BigInt;

use crate::db::{run_blocking, DbPool};
use crate::domain::errors::DomainError;
use crate::domain::events::{PendingEvent, RealtimeEvent};
use crate::domain::ports::EventLog;
use crate::schema::realtime_events;

use super::models::{NewRealtimeEventRow, RealtimeEventRow};

/// Advisory lock key serialising appends to `realtime_events`.
const APPEND_LOCK_KEY: i64 = 0x7265_616c_7469_6d65;

/// Record `event` on `conn`. Call inside the transaction that performs the
/// change so the row commits or rolls back with it.
///
/// The transaction-scoped lock is held until commit, so sequence numbers
/// become visible in the order they were handed out and a reader advancing
/// its cursor never steps over a row that commits later.
pub fn append_event(conn: &mut PgConnection, event: PendingEvent) -> Result<i64, DomainError> {
    diesel::sql_query("SELECT pg_advisory_xact_lock($1)")
        .bind::<BigInt, _>(APPEND_LOCK_KEY)
        .execute(conn)?;
    let sequence = diesel::insert_into(realtime_events::table)
        .values(&NewRealtimeEventRow {
            entity: event.entity.as_str().to_string(),
            action: event.action.as_str().to_string(),
            data: event.data,
        })
        .returning(realtime_events::sequence)
        .get_result(conn)?;
    Ok(sequence)
}

pub struct DieselEventLog {
    pool: DbPool,
}

impl DieselEventLog {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EventLog for DieselEventLog {
    async fn latest_sequence(&self) -> Result<i64, DomainError> {
        run_blocking(&self.pool, |conn| {
            let latest: Option<i64> = realtime_events::table
                .select(max(realtime_events::sequence))
                .first(conn)?;
            Ok(latest.unwrap_or(0))
        })
        .await
    }

    async fn read_after(&self, after: i64, limit: i64) -> Result<Vec<RealtimeEvent>, DomainError> {
        run_blocking(&self.pool, move |conn| {
            realtime_events::table
                .filter(realtime_events::sequence.gt(after))
                .order(realtime_events::sequence.asc())
                .limit(limit)
                .select(RealtimeEventRow::as_select())
                .load(conn)?
                .into_iter()
                .map(RealtimeEvent::try_from)
                .collect()
        })
        .await
    }
}
