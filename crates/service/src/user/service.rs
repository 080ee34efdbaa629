use std::sync::Arc;

use tracing::{debug, info, instrument};

use super::domain::{UserFields, UserInput, UserResponse};
use super::password::PasswordEncoder;
use super::repository::UserRepository;
use crate::errors::ServiceError;

/// User business service independent of web framework
pub struct UserService {
    repo: Arc<dyn UserRepository>,
    encoder: Arc<dyn PasswordEncoder>,
}

impl UserService {
    pub fn new(repo: Arc<dyn UserRepository>, encoder: Arc<dyn PasswordEncoder>) -> Self {
        Self { repo, encoder }
    }

    /// Create a user after checking that neither the email nor the phone
    /// number is taken. The password is stored hashed and never returned.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use service::user::{UserService, domain::UserInput, password::Argon2PasswordEncoder, repository::mock::MockUserRepository};
    /// let svc = UserService::new(
    ///     Arc::new(MockUserRepository::default()),
    ///     Arc::new(Argon2PasswordEncoder::new(8, 1, 1).unwrap()),
    /// );
    /// let input = UserInput { email: "user@example.com".into(), password: "Secret123".into(), name: "Test".into(), phone_number: "010-1234-5678".into() };
    /// let user = tokio_test::block_on(svc.create(input)).unwrap();
    /// assert_eq!(user.email, "user@example.com");
    /// assert_eq!(user.id, 1);
    /// ```
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn create(&self, input: UserInput) -> Result<UserResponse, ServiceError> {
        if self.repo.exists_by_email(&input.email).await? {
            debug!("email already registered");
            return Err(ServiceError::duplicate("email", input.email));
        }
        if self.repo.exists_by_phone(&input.phone_number).await? {
            debug!("phone number already registered");
            return Err(ServiceError::duplicate("phone number", input.phone_number));
        }

        let fields = self.to_fields(input).await?;
        let user = self.repo.insert(fields).await?;
        info!(user_id = user.id, "user_created");
        Ok(user.into())
    }

    /// All users in id order.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<UserResponse>, ServiceError> {
        let users = self.repo.find_all().await?;
        debug!(count = users.len(), "users fetched");
        Ok(users.into_iter().map(UserResponse::from).collect())
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: i64) -> Result<UserResponse, ServiceError> {
        let user = self.repo.find_by_id(id).await?.ok_or(ServiceError::NotFound(id))?;
        Ok(user.into())
    }

    /// Overwrite every field of an existing user.
    ///
    /// Email and phone number may stay as they are; they only conflict when
    /// another user owns them. The password is re-hashed on every call.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use service::user::{UserService, domain::UserInput, password::Argon2PasswordEncoder, repository::mock::MockUserRepository};
    /// let svc = UserService::new(
    ///     Arc::new(MockUserRepository::default()),
    ///     Arc::new(Argon2PasswordEncoder::new(8, 1, 1).unwrap()),
    /// );
    /// let input = UserInput { email: "u@e.com".into(), password: "pw".into(), name: "Old".into(), phone_number: "010-1111-2222".into() };
    /// let created = tokio_test::block_on(svc.create(input.clone())).unwrap();
    /// let renamed = UserInput { name: "New".into(), ..input };
    /// let updated = tokio_test::block_on(svc.update(created.id, renamed)).unwrap();
    /// assert_eq!(updated.name, "New");
    /// assert_eq!(updated.email, "u@e.com");
    /// ```
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn update(&self, id: i64, input: UserInput) -> Result<UserResponse, ServiceError> {
        if self.repo.find_by_id(id).await?.is_none() {
            return Err(ServiceError::NotFound(id));
        }

        if let Some(owner) = self.repo.find_by_email(&input.email).await? {
            if owner.id != id {
                debug!(owner_id = owner.id, "email owned by another user");
                return Err(ServiceError::duplicate("email", input.email));
            }
        }
        if let Some(owner) = self.repo.find_by_phone(&input.phone_number).await? {
            if owner.id != id {
                debug!(owner_id = owner.id, "phone number owned by another user");
                return Err(ServiceError::duplicate("phone number", input.phone_number));
            }
        }

        let fields = self.to_fields(input).await?;
        self.repo.update(id, fields).await?;

        let updated = self.repo.find_by_id(id).await?.ok_or(ServiceError::NotFound(id))?;
        info!(user_id = id, "user_updated");
        Ok(updated.into())
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: i64) -> Result<(), ServiceError> {
        if self.repo.find_by_id(id).await?.is_none() {
            return Err(ServiceError::NotFound(id));
        }
        self.repo.delete(id).await?;
        info!(user_id = id, "user_deleted");
        Ok(())
    }

    // Argon2 is CPU and memory bound; keep it off the async workers.
    async fn to_fields(&self, input: UserInput) -> Result<UserFields, ServiceError> {
        let UserInput { email, password, name, phone_number } = input;
        let encoder = Arc::clone(&self.encoder);
        let password_hash = tokio::task::spawn_blocking(move || encoder.encode(&password))
            .await
            .map_err(|e| ServiceError::Hash(format!("hashing task failed: {e}")))??;
        Ok(UserFields { email, password_hash, name, phone_number })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::user::password::Argon2PasswordEncoder;
    use crate::user::repository::mock::MockUserRepository;

    struct Fixture {
        repo: Arc<MockUserRepository>,
        encoder: Arc<Argon2PasswordEncoder>,
        svc: UserService,
    }

    fn fixture() -> Fixture {
        let repo = Arc::new(MockUserRepository::default());
        let encoder = Arc::new(Argon2PasswordEncoder::new(8, 1, 1).unwrap());
        let svc = UserService::new(repo.clone(), encoder.clone());
        Fixture { repo, encoder, svc }
    }

    fn input(email: &str, phone: &str) -> UserInput {
        UserInput {
            email: email.into(),
            password: "S3curePass!".into(),
            name: "Hong".into(),
            phone_number: phone.into(),
        }
    }

    #[tokio::test]
    async fn create_stores_hash_and_returns_no_password() {
        let f = fixture();
        let created = f.svc.create(input("a@example.com", "010-1111-1111")).await.unwrap();

        let json = serde_json::to_value(&created).unwrap();
        assert!(json.get("password").is_none());

        let stored = f.repo.find_by_id(created.id).await.unwrap().unwrap();
        assert_ne!(stored.password_hash, "S3curePass!");
        assert!(f.encoder.matches("S3curePass!", &stored.password_hash).unwrap());
    }

    #[tokio::test]
    async fn create_rejects_used_email_whatever_the_phone() {
        let f = fixture();
        f.svc.create(input("a@example.com", "010-1111-1111")).await.unwrap();

        let err = f.svc.create(input("a@example.com", "010-9999-9999")).await.unwrap_err();
        assert!(matches!(err, ServiceError::DuplicateEntry { field: "email", ref value } if value == "a@example.com"));
        assert_eq!(f.repo.len().await, 1);
    }

    #[tokio::test]
    async fn create_rejects_used_phone_whatever_the_email() {
        let f = fixture();
        f.svc.create(input("a@example.com", "010-1111-1111")).await.unwrap();

        let err = f.svc.create(input("b@example.com", "010-1111-1111")).await.unwrap_err();
        assert!(matches!(err, ServiceError::DuplicateEntry { field: "phone number", .. }));
        assert_eq!(f.repo.len().await, 1);
    }

    #[tokio::test]
    async fn email_is_checked_before_phone() {
        let f = fixture();
        f.svc.create(input("a@example.com", "010-1111-1111")).await.unwrap();
        let err = f.svc.create(input("a@example.com", "010-1111-1111")).await.unwrap_err();
        assert!(matches!(err, ServiceError::DuplicateEntry { field: "email", .. }));
    }

    #[tokio::test]
    async fn get_missing_is_not_found() {
        let f = fixture();
        assert!(matches!(f.svc.get(42).await, Err(ServiceError::NotFound(42))));
    }

    #[tokio::test]
    async fn update_to_own_email_and_phone_succeeds() {
        let f = fixture();
        let created = f.svc.create(input("a@example.com", "010-1111-1111")).await.unwrap();

        let same = UserInput { name: "Renamed".into(), ..input("a@example.com", "010-1111-1111") };
        let updated = f.svc.update(created.id, same).await.unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.name, "Renamed");
        assert_eq!(updated.created_at, created.created_at);
    }

    #[tokio::test]
    async fn update_to_other_users_email_is_duplicate() {
        let f = fixture();
        f.svc.create(input("a@example.com", "010-1111-1111")).await.unwrap();
        let b = f.svc.create(input("b@example.com", "010-2222-2222")).await.unwrap();

        let err = f.svc.update(b.id, input("a@example.com", "010-2222-2222")).await.unwrap_err();
        assert!(matches!(err, ServiceError::DuplicateEntry { field: "email", .. }));
        assert_eq!(f.svc.get(b.id).await.unwrap().email, "b@example.com");
    }

    #[tokio::test]
    async fn update_to_other_users_phone_is_duplicate() {
        let f = fixture();
        f.svc.create(input("a@example.com", "010-1111-1111")).await.unwrap();
        let b = f.svc.create(input("b@example.com", "010-2222-2222")).await.unwrap();

        let err = f.svc.update(b.id, input("b@example.com", "010-1111-1111")).await.unwrap_err();
        assert!(matches!(err, ServiceError::DuplicateEntry { field: "phone number", .. }));
    }

    #[tokio::test]
    async fn update_missing_is_not_found() {
        let f = fixture();
        let err = f.svc.update(5, input("a@example.com", "010-1111-1111")).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(5)));
    }

    #[tokio::test]
    async fn update_rehashes_password_every_time() {
        let f = fixture();
        let created = f.svc.create(input("a@example.com", "010-1111-1111")).await.unwrap();
        let before = f.repo.find_by_id(created.id).await.unwrap().unwrap().password_hash;

        let changed = UserInput { password: "An0therPass".into(), ..input("a@example.com", "010-1111-1111") };
        f.svc.update(created.id, changed).await.unwrap();
        let after = f.repo.find_by_id(created.id).await.unwrap().unwrap().password_hash;

        assert_ne!(before, after);
        assert!(f.encoder.matches("An0therPass", &after).unwrap());
        assert!(!f.encoder.matches("S3curePass!", &after).unwrap());
    }

    #[tokio::test]
    async fn delete_then_get_is_not_found() {
        let f = fixture();
        let created = f.svc.create(input("a@example.com", "010-1111-1111")).await.unwrap();
        f.svc.delete(created.id).await.unwrap();
        assert!(matches!(f.svc.get(created.id).await, Err(ServiceError::NotFound(_))));
        assert!(matches!(f.svc.delete(created.id).await, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn list_returns_every_user_without_passwords() {
        let f = fixture();
        for i in 0..5 {
            f.svc
                .create(input(&format!("u{i}@example.com"), &format!("010-0000-000{i}")))
                .await
                .unwrap();
        }
        let users = f.svc.list().await.unwrap();
        assert_eq!(users.len(), 5);
        let json = serde_json::to_value(&users).unwrap();
        for u in json.as_array().unwrap() {
            assert!(u.get("password").is_none());
        }
        let ids: Vec<i64> = users.iter().map(|u| u.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    }

    /// Delegates to the mock but loses the row after the first lookup, as if
    /// a concurrent delete landed between the write and the re-read.
    struct VanishingRepository {
        inner: MockUserRepository,
        lookups: std::sync::atomic::AtomicUsize,
    }

    #[async_trait::async_trait]
    impl UserRepository for VanishingRepository {
        async fn insert(&self, fields: UserFields) -> Result<crate::user::domain::User, ServiceError> {
            self.inner.insert(fields).await
        }
        async fn find_all(&self) -> Result<Vec<crate::user::domain::User>, ServiceError> {
            self.inner.find_all().await
        }
        async fn find_by_id(&self, id: i64) -> Result<Option<crate::user::domain::User>, ServiceError> {
            let n = self.lookups.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            if n == 0 { self.inner.find_by_id(id).await } else { Ok(None) }
        }
        async fn find_by_email(&self, email: &str) -> Result<Option<crate::user::domain::User>, ServiceError> {
            self.inner.find_by_email(email).await
        }
        async fn find_by_phone(&self, phone_number: &str) -> Result<Option<crate::user::domain::User>, ServiceError> {
            self.inner.find_by_phone(phone_number).await
        }
        async fn update(&self, id: i64, fields: UserFields) -> Result<(), ServiceError> {
            self.inner.update(id, fields).await
        }
        async fn delete(&self, id: i64) -> Result<(), ServiceError> {
            self.inner.delete(id).await
        }
        async fn exists_by_email(&self, email: &str) -> Result<bool, ServiceError> {
            self.inner.exists_by_email(email).await
        }
        async fn exists_by_phone(&self, phone_number: &str) -> Result<bool, ServiceError> {
            self.inner.exists_by_phone(phone_number).await
        }
    }

    #[tokio::test]
    async fn update_reports_not_found_when_row_vanishes_before_reread() {
        let inner = MockUserRepository::default();
        let existing = inner
            .insert(UserFields {
                email: "a@example.com".into(),
                password_hash: "hash".into(),
                name: "Hong".into(),
                phone_number: "010-1111-1111".into(),
            })
            .await
            .unwrap();
        let repo = Arc::new(VanishingRepository { inner, lookups: Default::default() });
        let svc = UserService::new(repo.clone(), Arc::new(Argon2PasswordEncoder::new(8, 1, 1).unwrap()));

        let err = svc.update(existing.id, input("a@example.com", "010-1111-1111")).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(id) if id == existing.id));
        assert_eq!(repo.lookups.load(std::sync::atomic::Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn works_end_to_end_on_seaorm_repository() -> Result<(), anyhow::Error> {
        use crate::test_support::get_db;
        use crate::user::repo::seaorm::SeaOrmUserRepository;

        let repo = Arc::new(SeaOrmUserRepository::new(get_db().await?));
        let svc = UserService::new(repo, Arc::new(Argon2PasswordEncoder::new(8, 1, 1)?));

        let a = svc.create(input("a@example.com", "010-1111-1111")).await?;
        let b = svc.create(input("b@example.com", "010-2222-2222")).await?;
        assert!(matches!(
            svc.create(input("a@example.com", "010-3333-3333")).await,
            Err(ServiceError::DuplicateEntry { field: "email", .. })
        ));
        assert!(matches!(
            svc.update(b.id, input("b@example.com", "010-1111-1111")).await,
            Err(ServiceError::DuplicateEntry { field: "phone number", .. })
        ));
        let same = svc.update(a.id, input("a@example.com", "010-1111-1111")).await?;
        assert_eq!(same.id, a.id);

        svc.delete(a.id).await?;
        assert_eq!(svc.list().await?.len(), 1);
        assert!(matches!(svc.get(a.id).await, Err(ServiceError::NotFound(_))));
        Ok(())
    }
}
