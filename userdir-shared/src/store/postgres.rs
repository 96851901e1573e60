/// PostgreSQL-backed directory store
///
/// Thin adapter from the [`UserStore`] trait onto the model queries in
/// `models::user` and `models::organization`. Uniqueness is enforced by the schema's
/// UNIQUE constraints; violations surface as [`StoreError::Conflict`].

use async_trait::async_trait;
use sqlx::PgPool;

use super::{StoreResult, UserStore};
use crate::db::pool::health_check;
use crate::models::{NewOrganization, NewUser, Organization, Role, User};

/// Directory store over a sqlx connection pool
#[derive(Debug, Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn ping(&self) -> StoreResult<()> {
        health_check(&self.pool).await?;
        Ok(())
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        Ok(User::list(&self.pool).await?)
    }

    async fn list_users_by_org(&self, org_id: i64) -> StoreResult<Vec<User>> {
        Ok(User::list_by_org(&self.pool, org_id).await?)
    }

    async fn count_users(&self) -> StoreResult<i64> {
        Ok(User::count(&self.pool).await?)
    }

    async fn find_user_by_id(&self, id: i64) -> StoreResult<Option<User>> {
        Ok(User::find_by_id(&self.pool, id).await?)
    }

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        Ok(User::find_by_username(&self.pool, username).await?)
    }

    async fn find_user_by_api_key_hash(&self, api_key_hash: &str) -> StoreResult<Option<User>> {
        Ok(User::find_by_api_key_hash(&self.pool, api_key_hash).await?)
    }

    async fn insert_user(&self, data: NewUser) -> StoreResult<User> {
        Ok(User::create(&self.pool, data).await?)
    }

    async fn update_user_role(&self, id: i64, role: Role) -> StoreResult<bool> {
        Ok(User::update_role(&self.pool, id, role).await?)
    }

    async fn delete_user(&self, id: i64) -> StoreResult<bool> {
        Ok(User::delete(&self.pool, id).await?)
    }

    async fn find_organization(&self, id: i64) -> StoreResult<Option<Organization>> {
        Ok(Organization::find_by_id(&self.pool, id).await?)
    }

    async fn insert_organization(&self, data: NewOrganization) -> StoreResult<Organization> {
        Ok(Organization::create(&self.pool, data).await?)
    }
}
