use chrono::Utc;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    NotSet, PaginatorTrait, QueryFilter, QueryOrder, Set, SqlErr,
};
use tracing::warn;

use models::user;

use crate::errors::ServiceError;
use crate::user::domain::{User, UserFields};
use crate::user::repository::UserRepository;

pub struct SeaOrmUserRepository {
    pub db: DatabaseConnection,
}

impl SeaOrmUserRepository {
    pub fn new(db: DatabaseConnection) -> Self { Self { db } }
}

impl From<user::Model> for User {
    fn from(m: user::Model) -> Self {
        Self {
            id: m.id,
            email: m.email,
            password_hash: m.password,
            name: m.name,
            phone_number: m.phone_number,
            created_at: m.created_at.with_timezone(&Utc),
            updated_at: m.updated_at.with_timezone(&Utc),
        }
    }
}

/// Unique index hits become `DuplicateEntry`; the index name (postgres) or
/// column (sqlite) in the message tells which rule was broken.
fn map_write_err(e: DbErr, fields: &UserFields) -> ServiceError {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(msg)) => {
            warn!(error = %msg, "unique constraint rejected user write");
            if msg.contains("phone") {
                ServiceError::duplicate("phone number", fields.phone_number.clone())
            } else {
                ServiceError::duplicate("email", fields.email.clone())
            }
        }
        _ => ServiceError::Db(e.to_string()),
    }
}

#[async_trait::async_trait]
impl UserRepository for SeaOrmUserRepository {
    async fn insert(&self, fields: UserFields) -> Result<User, ServiceError> {
        let now = Utc::now().into();
        let am = user::ActiveModel {
            id: NotSet,
            email: Set(fields.email.clone()),
            password: Set(fields.password_hash.clone()),
            name: Set(fields.name.clone()),
            phone_number: Set(fields.phone_number.clone()),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let created = am.insert(&self.db).await.map_err(|e| map_write_err(e, &fields))?;
        Ok(created.into())
    }

    async fn find_all(&self) -> Result<Vec<User>, ServiceError> {
        let rows = user::Entity::find()
            .order_by_asc(user::Column::Id)
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(User::from).collect())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, ServiceError> {
        let res = user::Entity::find_by_id(id).one(&self.db).await?;
        Ok(res.map(User::from))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, ServiceError> {
        let res = user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await?;
        Ok(res.map(User::from))
    }

    async fn find_by_phone(&self, phone_number: &str) -> Result<Option<User>, ServiceError> {
        let res = user::Entity::find()
            .filter(user::Column::PhoneNumber.eq(phone_number))
            .one(&self.db)
            .await?;
        Ok(res.map(User::from))
    }

    async fn update(&self, id: i64, fields: UserFields) -> Result<(), ServiceError> {
        let now: sea_orm::prelude::DateTimeWithTimeZone = Utc::now().into();
        let res = user::Entity::update_many()
            .col_expr(user::Column::Email, Expr::value(fields.email.clone()))
            .col_expr(user::Column::Password, Expr::value(fields.password_hash.clone()))
            .col_expr(user::Column::Name, Expr::value(fields.name.clone()))
            .col_expr(user::Column::PhoneNumber, Expr::value(fields.phone_number.clone()))
            .col_expr(user::Column::UpdatedAt, Expr::value(now))
            .filter(user::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(|e| map_write_err(e, &fields))?;
        if res.rows_affected == 0 {
            return Err(ServiceError::NotFound(id));
        }
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<(), ServiceError> {
        let res = user::Entity::delete_by_id(id).exec(&self.db).await?;
        if res.rows_affected == 0 {
            return Err(ServiceError::NotFound(id));
        }
        Ok(())
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool, ServiceError> {
        let n = user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .count(&self.db)
            .await?;
        Ok(n > 0)
    }

    async fn exists_by_phone(&self, phone_number: &str) -> Result<bool, ServiceError> {
        let n = user::Entity::find()
            .filter(user::Column::PhoneNumber.eq(phone_number))
            .count(&self.db)
            .await?;
        Ok(n > 0)
    }
}
