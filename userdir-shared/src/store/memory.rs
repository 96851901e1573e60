//! In-memory directory store
//!
//! Keeps users and organizations in ordered maps behind a tokio `RwLock`. Used by
//! the test suites and by `STORE=memory` local runs. Uniqueness of email, username
//! and API key hash is checked on insert, mirroring the PostgreSQL constraints.
//!
//! Writes can be switched to fail with [`MemoryUserStore::set_fail_writes`], which
//! exercises the store-failure paths of the mutation operations.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::{StoreError, StoreResult, UserStore};
use crate::models::{NewOrganization, NewUser, Organization, Role, User};

#[derive(Default)]
struct Tables {
    users: BTreeMap<i64, User>,
    organizations: BTreeMap<i64, Organization>,
    last_user_id: i64,
    last_org_id: i64,
}

/// In-memory storage for development and testing
#[derive(Default)]
pub struct MemoryUserStore {
    tables: RwLock<Tables>,
    fail_writes: AtomicBool,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent insert, update and delete fail with `Unavailable`
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check_writable(&self) -> StoreResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("writes are disabled".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().cloned().collect())
    }

    async fn list_users_by_org(&self, org_id: i64) -> StoreResult<Vec<User>> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .filter(|user| user.org_id == org_id)
            .cloned()
            .collect())
    }

    async fn count_users(&self) -> StoreResult<i64> {
        let tables = self.tables.read().await;
        Ok(tables.users.len() as i64)
    }

    async fn find_user_by_id(&self, id: i64) -> StoreResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.get(&id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|user| user.username == username)
            .cloned())
    }

    async fn find_user_by_api_key_hash(&self, api_key_hash: &str) -> StoreResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|user| user.api_key_hash == api_key_hash)
            .cloned())
    }

    async fn insert_user(&self, data: NewUser) -> StoreResult<User> {
        self.check_writable()?;
        let mut tables = self.tables.write().await;

        for existing in tables.users.values() {
            if existing.email == data.email {
                return Err(StoreError::Conflict("email".to_string()));
            }
            if existing.username == data.username {
                return Err(StoreError::Conflict("username".to_string()));
            }
            if existing.api_key_hash == data.api_key_hash {
                return Err(StoreError::Conflict("api_key".to_string()));
            }
        }

        tables.last_user_id += 1;
        let now = Utc::now();
        let user = User {
            id: tables.last_user_id,
            email: data.email,
            username: data.username,
            password_hash: data.password_hash,
            api_key_hash: data.api_key_hash,
            org_id: data.org_id,
            role: data.role,
            created_at: now,
            updated_at: now,
        };
        tables.users.insert(user.id, user.clone());

        Ok(user)
    }

    async fn update_user_role(&self, id: i64, role: Role) -> StoreResult<bool> {
        self.check_writable()?;
        let mut tables = self.tables.write().await;

        match tables.users.get_mut(&id) {
            Some(user) => {
                user.role = role;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_user(&self, id: i64) -> StoreResult<bool> {
        self.check_writable()?;
        let mut tables = self.tables.write().await;
        Ok(tables.users.remove(&id).is_some())
    }

    async fn find_organization(&self, id: i64) -> StoreResult<Option<Organization>> {
        let tables = self.tables.read().await;
        Ok(tables.organizations.get(&id).cloned())
    }

    async fn insert_organization(&self, data: NewOrganization) -> StoreResult<Organization> {
        self.check_writable()?;
        let mut tables = self.tables.write().await;

        tables.last_org_id += 1;
        let now = Utc::now();
        let organization = Organization {
            id: tables.last_org_id,
            name: data.name,
            created_at: now,
            updated_at: now,
        };
        tables
            .organizations
            .insert(organization.id, organization.clone());

        Ok(organization)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(name: &str, org_id: i64) -> NewUser {
        NewUser {
            email: format!("{name}@example.com"),
            username: name.to_string(),
            password_hash: "hash".to_string(),
            api_key_hash: format!("{name}-key-hash"),
            org_id,
            role: Role::Readonly,
        }
    }

    #[tokio::test]
    async fn test_insert_assigns_sequential_ids() {
        let store = MemoryUserStore::new();

        let first = store.insert_user(new_user("ada", 1)).await.unwrap();
        let second = store.insert_user(new_user("grace", 1)).await.unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(first.created_at, first.updated_at);
        assert_eq!(store.count_users().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_insert_rejects_duplicate_email() {
        let store = MemoryUserStore::new();
        store.insert_user(new_user("ada", 1)).await.unwrap();

        let mut duplicate = new_user("ada2", 1);
        duplicate.email = "ada@example.com".to_string();

        let err = store.insert_user(duplicate).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(field) if field == "email"));
        assert_eq!(store.count_users().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_insert_rejects_duplicate_username_and_api_key() {
        let store = MemoryUserStore::new();
        store.insert_user(new_user("ada", 1)).await.unwrap();

        let mut same_username = new_user("other", 1);
        same_username.username = "ada".to_string();
        let err = store.insert_user(same_username).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(field) if field == "username"));

        let mut same_key = new_user("third", 1);
        same_key.api_key_hash = "ada-key-hash".to_string();
        let err = store.insert_user(same_key).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(field) if field == "api_key"));
    }

    #[tokio::test]
    async fn test_list_by_org_filters() {
        let store = MemoryUserStore::new();
        store.insert_user(new_user("ada", 1)).await.unwrap();
        store.insert_user(new_user("grace", 2)).await.unwrap();
        store.insert_user(new_user("linus", 1)).await.unwrap();

        let org_one = store.list_users_by_org(1).await.unwrap();
        let names: Vec<_> = org_one.iter().map(|u| u.username.as_str()).collect();
        assert_eq!(names, vec!["ada", "linus"]);

        assert!(store.list_users_by_org(7).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_role_leaves_timestamps() {
        let store = MemoryUserStore::new();
        let user = store.insert_user(new_user("ada", 1)).await.unwrap();

        assert!(store.update_user_role(user.id, Role::Readwrite).await.unwrap());
        assert!(!store.update_user_role(99, Role::Readwrite).await.unwrap());

        let updated = store.find_user_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(updated.role, Role::Readwrite);
        assert_eq!(updated.updated_at, user.updated_at);
    }

    #[tokio::test]
    async fn test_delete_user() {
        let store = MemoryUserStore::new();
        let user = store.insert_user(new_user("ada", 1)).await.unwrap();

        assert!(store.delete_user(user.id).await.unwrap());
        assert!(!store.delete_user(user.id).await.unwrap());
        assert!(store.find_user_by_username("ada").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_fail_writes_blocks_mutations_only() {
        let store = MemoryUserStore::new();
        let user = store.insert_user(new_user("ada", 1)).await.unwrap();

        store.set_fail_writes(true);

        assert!(matches!(
            store.update_user_role(user.id, Role::Admin).await,
            Err(StoreError::Unavailable(_))
        ));
        assert!(matches!(
            store.delete_user(user.id).await,
            Err(StoreError::Unavailable(_))
        ));
        assert!(store.find_user_by_id(user.id).await.unwrap().is_some());

        store.set_fail_writes(false);
        assert!(store.delete_user(user.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_organizations() {
        let store = MemoryUserStore::new();
        let org = store
            .insert_organization(NewOrganization {
                name: "Acme".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(org.id, 1);
        assert_eq!(store.find_organization(1).await.unwrap(), Some(org));
        assert_eq!(store.find_organization(2).await.unwrap(), None);
    }
}
