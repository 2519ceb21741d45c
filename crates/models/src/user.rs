use sea_orm::{entity::prelude::*, sea_query::Expr, DatabaseConnection, QueryFilter, Set};
use uuid::Uuid;
use chrono::{NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

pub const ROLE: &str = "user";
pub const STATUS_PENDING: &str = "pending";
pub const STATUS_APPROVED: &str = "approved";
pub const STATUS_REJECTED: &str = "rejected";

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    #[sea_orm(unique)]
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub plate_number: String,
    pub preferred_entry_time: Time,
    pub preferred_exit_time: Time,
    pub status: String,
    pub is_email_verified: bool,
    pub role: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Columns required to insert a user; the password must already be hashed.
#[derive(Debug, Clone)]
pub struct NewUser<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub plate_number: &'a str,
    pub preferred_entry_time: NaiveTime,
    pub preferred_exit_time: NaiveTime,
}

pub async fn create(db: &DatabaseConnection, new: NewUser<'_>) -> Result<Model, ModelError> {
    if !new.email.contains('@') { return Err(ModelError::Validation("invalid email".into())); }
    if new.name.trim().is_empty() { return Err(ModelError::Validation("name required".into())); }
    if new.password_hash.trim().is_empty() { return Err(ModelError::Validation("password hash required".into())); }
    let now = Utc::now().into();
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(new.name.to_string()),
        email: Set(new.email.to_string()),
        password: Set(new.password_hash.to_string()),
        plate_number: Set(new.plate_number.to_string()),
        preferred_entry_time: Set(new.preferred_entry_time),
        preferred_exit_time: Set(new.preferred_exit_time),
        status: Set(STATUS_PENDING.into()),
        is_email_verified: Set(false),
        role: Set(ROLE.into()),
        created_at: Set(now),
        updated_at: Set(now),
    };
    am.insert(db).await.map_err(ModelError::from_write)
}

pub async fn find_by_id(db: &DatabaseConnection, id: Uuid) -> Result<Option<Model>, ModelError> {
    Ok(Entity::find_by_id(id).one(db).await?)
}

pub async fn find_by_email(db: &DatabaseConnection, email: &str) -> Result<Option<Model>, ModelError> {
    let found = Entity::find()
        .filter(Column::Email.eq(email))
        .filter(Column::Role.eq(ROLE))
        .one(db)
        .await?;
    Ok(found)
}

/// True when another user (not `exclude_id`) already owns `email`.
pub async fn email_taken_by_other(db: &DatabaseConnection, email: &str, exclude_id: Uuid) -> Result<bool, ModelError> {
    let count = Entity::find()
        .filter(Column::Email.eq(email))
        .filter(Column::Id.ne(exclude_id))
        .count(db)
        .await?;
    Ok(count > 0)
}

pub async fn mark_email_verified(db: &DatabaseConnection, id: Uuid) -> Result<(), ModelError> {
    update_columns(db, id, Column::IsEmailVerified, Expr::value(true)).await
}

pub async fn set_password(db: &DatabaseConnection, id: Uuid, password_hash: &str) -> Result<(), ModelError> {
    if password_hash.trim().is_empty() { return Err(ModelError::Validation("password hash required".into())); }
    update_columns(db, id, Column::Password, Expr::value(password_hash)).await
}

pub async fn set_status(db: &DatabaseConnection, id: Uuid, status: &str) -> Result<(), ModelError> {
    update_columns(db, id, Column::Status, Expr::value(status)).await
}

pub async fn update_profile(db: &DatabaseConnection, id: Uuid, name: &str, email: &str) -> Result<Model, ModelError> {
    if name.trim().is_empty() { return Err(ModelError::Validation("name required".into())); }
    let mut am: ActiveModel = Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ModelError::NotFound("user".into()))?
        .into();
    am.name = Set(name.to_string());
    am.email = Set(email.to_string());
    am.updated_at = Set(Utc::now().into());
    am.update(db).await.map_err(ModelError::from_write)
}

async fn update_columns(db: &DatabaseConnection, id: Uuid, col: Column, value: sea_orm::sea_query::SimpleExpr) -> Result<(), ModelError> {
    let res = Entity::update_many()
        .col_expr(col, value)
        .col_expr(Column::UpdatedAt, Expr::value(DateTimeWithTimeZone::from(Utc::now())))
        .filter(Column::Id.eq(id))
        .exec(db)
        .await?;
    if res.rows_affected == 0 {
        return Err(ModelError::NotFound("user".into()));
    }
    Ok(())
}
