use async_trait::async_trait;
use diesel::prelude::*;
use uuid::Uuid;

use crate::db::{run_blocking, DbPool};
use crate::domain::checkout::Profile;
use crate::domain::errors::DomainError;
use crate::domain::ports::ProfileRepository;
use crate::schema::profiles;

use super::models::ProfileRow;

pub struct DieselProfileRepository {
    pool: DbPool,
}

impl DieselProfileRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileRepository for DieselProfileRepository {
    async fn find(&self, user_id: Uuid) -> Result<Option<Profile>, DomainError> {
        run_blocking(&self.pool, move |conn| {
            let row = profiles::table
                .find(user_id)
                .select(ProfileRow::as_select())
                .first(conn)
                .optional()?;
            Ok(row.map(Profile::from))
        })
        .await
    }
}
