use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::store::{StoreError, User, UserStore};

/// In-memory user store, used in place of Postgres by tests.
/// Email matching is case-sensitive, same as the unique index.
#[derive(Default)]
pub struct MemoryStore {
    users: Mutex<HashMap<Uuid, User>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn insert(
        &self,
        email: &str,
        password_hash: &str,
        name: Option<&str>,
    ) -> Result<User, StoreError> {
        let mut users = self.users.lock().unwrap();
        if users.values().any(|u| u.email == email) {
            return Err(StoreError::DuplicateEmail);
        }
        let user = User {
            id: Uuid::new_v4(),
            name: name.map(str::to_owned),
            email: email.to_owned(),
            password_hash: password_hash.to_owned(),
            created_at: OffsetDateTime::now_utc(),
        };
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let users = self.users.lock().unwrap();
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let users = self.users.lock().unwrap();
        Ok(users.get(&id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn insert_and_find_back() {
        let store = MemoryStore::new();
        let user = store
            .insert("a@x.com", "hash", Some("Ada"))
            .await
            .expect("insert");

        let by_email = store.find_by_email("a@x.com").await.unwrap().unwrap();
        assert_eq!(by_email.id, user.id);

        let by_id = store.find_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(by_id.email, "a@x.com");
        assert_eq!(by_id.name.as_deref(), Some("Ada"));
    }

    #[tokio::test]
    async fn duplicate_email_rejected_regardless_of_password() {
        let store = MemoryStore::new();
        store.insert("a@x.com", "hash1", None).await.expect("insert");

        let err = store.insert("a@x.com", "hash2", None).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateEmail));
    }

    #[tokio::test]
    async fn email_match_is_case_sensitive() {
        let store = MemoryStore::new();
        store.insert("a@x.com", "hash", None).await.expect("insert");

        assert!(store.find_by_email("A@X.com").await.unwrap().is_none());
        assert!(store.insert("A@x.com", "hash", None).await.is_ok());
    }

    #[tokio::test]
    async fn unknown_lookups_return_none() {
        let store = MemoryStore::new();
        assert!(store.find_by_email("nobody@x.com").await.unwrap().is_none());
        assert!(store.find_by_id(Uuid::new_v4()).await.unwrap().is_none());
    }
}
