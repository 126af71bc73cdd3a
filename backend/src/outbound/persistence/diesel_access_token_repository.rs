//! PostgreSQL-backed `AccessTokenRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{AccessTokenPersistenceError, AccessTokenRepository, IssuedToken};
use crate::domain::{TokenDigest, UserId};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{AccessTokenRow, NewAccessTokenRow};
use super::pool::{DbPool, PoolError};
use super::schema::access_tokens;

/// Diesel-backed implementation of the `AccessTokenRepository` port.
#[derive(Clone)]
pub struct DieselAccessTokenRepository {
    pool: DbPool,
}

impl DieselAccessTokenRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> AccessTokenPersistenceError {
    map_basic_pool_error(error, AccessTokenPersistenceError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> AccessTokenPersistenceError {
    map_basic_diesel_error(
        error,
        AccessTokenPersistenceError::query,
        AccessTokenPersistenceError::connection,
    )
}

#[async_trait]
impl AccessTokenRepository for DieselAccessTokenRepository {
    async fn issue(
        &self,
        digest: &TokenDigest,
        user_id: &UserId,
        issued_at: DateTime<Utc>,
    ) -> Result<(), AccessTokenPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = NewAccessTokenRow {
            token_digest: digest.as_ref(),
            user_id: *user_id.as_uuid(),
            created_at: issued_at,
        };

        diesel::insert_into(access_tokens::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn resolve(
        &self,
        digest: &TokenDigest,
        used_at: DateTime<Utc>,
    ) -> Result<Option<IssuedToken>, AccessTokenPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<AccessTokenRow> = diesel::update(
            access_tokens::table.filter(access_tokens::token_digest.eq(digest.as_ref())),
        )
        .set(access_tokens::last_used_at.eq(Some(used_at)))
        .returning(AccessTokenRow::as_returning())
        .get_result(&mut conn)
        .await
        .optional()
        .map_err(map_diesel_error)?;

        Ok(row.map(|row| IssuedToken {
            user_id: UserId::from_uuid(row.user_id),
            created_at: row.created_at,
        }))
    }

    async fn revoke(&self, digest: &TokenDigest) -> Result<bool, AccessTokenPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let affected = diesel::delete(
            access_tokens::table.filter(access_tokens::token_digest.eq(digest.as_ref())),
        )
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(affected > 0)
    }
}
