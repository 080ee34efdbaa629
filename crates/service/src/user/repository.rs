use async_trait::async_trait;

use super::domain::{User, UserFields};
use crate::errors::ServiceError;

/// Persistence gateway for users.
///
/// `update` and `delete` report `NotFound` when no row matched. Implementations
/// backed by a store with unique indexes report violations as `DuplicateEntry`.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn insert(&self, fields: UserFields) -> Result<User, ServiceError>;
    async fn find_all(&self) -> Result<Vec<User>, ServiceError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, ServiceError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, ServiceError>;
    async fn find_by_phone(&self, phone_number: &str) -> Result<Option<User>, ServiceError>;
    async fn update(&self, id: i64, fields: UserFields) -> Result<(), ServiceError>;
    async fn delete(&self, id: i64) -> Result<(), ServiceError>;
    async fn exists_by_email(&self, email: &str) -> Result<bool, ServiceError>;
    async fn exists_by_phone(&self, phone_number: &str) -> Result<bool, ServiceError>;
}

/// Simple in-memory mock repository for tests and doc examples
pub mod mock {
    use super::*;
    use std::collections::BTreeMap;

    use chrono::Utc;
    use tokio::sync::Mutex;

    #[derive(Default)]
    struct Table {
        rows: BTreeMap<i64, User>, // key: id, iteration order = id order
        last_id: i64,
    }

    impl Table {
        // Mirrors the unique indexes on email and phone_number.
        fn check_unique(&self, fields: &UserFields, except: Option<i64>) -> Result<(), ServiceError> {
            let others = self.rows.values().filter(|u| Some(u.id) != except);
            for u in others {
                if u.email == fields.email {
                    return Err(ServiceError::duplicate("email", fields.email.clone()));
                }
                if u.phone_number == fields.phone_number {
                    return Err(ServiceError::duplicate("phone number", fields.phone_number.clone()));
                }
            }
            Ok(())
        }
    }

    #[derive(Default)]
    pub struct MockUserRepository {
        table: Mutex<Table>,
    }

    impl MockUserRepository {
        pub async fn len(&self) -> usize {
            self.table.lock().await.rows.len()
        }

        pub async fn is_empty(&self) -> bool {
            self.len().await == 0
        }
    }

    #[async_trait]
    impl UserRepository for MockUserRepository {
        async fn insert(&self, fields: UserFields) -> Result<User, ServiceError> {
            let mut table = self.table.lock().await;
            table.check_unique(&fields, None)?;
            table.last_id += 1;
            let now = Utc::now();
            let user = User {
                id: table.last_id,
                email: fields.email,
                password_hash: fields.password_hash,
                name: fields.name,
                phone_number: fields.phone_number,
                created_at: now,
                updated_at: now,
            };
            table.rows.insert(user.id, user.clone());
            Ok(user)
        }

        async fn find_all(&self) -> Result<Vec<User>, ServiceError> {
            Ok(self.table.lock().await.rows.values().cloned().collect())
        }

        async fn find_by_id(&self, id: i64) -> Result<Option<User>, ServiceError> {
            Ok(self.table.lock().await.rows.get(&id).cloned())
        }

        async fn find_by_email(&self, email: &str) -> Result<Option<User>, ServiceError> {
            let table = self.table.lock().await;
            Ok(table.rows.values().find(|u| u.email == email).cloned())
        }

        async fn find_by_phone(&self, phone_number: &str) -> Result<Option<User>, ServiceError> {
            let table = self.table.lock().await;
            Ok(table.rows.values().find(|u| u.phone_number == phone_number).cloned())
        }

        async fn update(&self, id: i64, fields: UserFields) -> Result<(), ServiceError> {
            let mut table = self.table.lock().await;
            table.check_unique(&fields, Some(id))?;
            let row = table.rows.get_mut(&id).ok_or(ServiceError::NotFound(id))?;
            row.email = fields.email;
            row.password_hash = fields.password_hash;
            row.name = fields.name;
            row.phone_number = fields.phone_number;
            row.updated_at = Utc::now();
            Ok(())
        }

        async fn delete(&self, id: i64) -> Result<(), ServiceError> {
            let mut table = self.table.lock().await;
            table.rows.remove(&id).map(|_| ()).ok_or(ServiceError::NotFound(id))
        }

        async fn exists_by_email(&self, email: &str) -> Result<bool, ServiceError> {
            Ok(self.find_by_email(email).await?.is_some())
        }

        async fn exists_by_phone(&self, phone_number: &str) -> Result<bool, ServiceError> {
            Ok(self.find_by_phone(phone_number).await?.is_some())
        }
    }

}
