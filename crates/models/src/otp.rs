use sea_orm::{entity::prelude::*, sea_query::Expr, DatabaseConnection, QueryFilter, QueryOrder, Set};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

pub const KIND_VERIFICATION: &str = "verification";
pub const KIND_RESET: &str = "reset";

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "otps")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub email: String,
    pub code: String,
    #[sea_orm(column_name = "type")]
    pub kind: String,
    pub role: String,
    pub is_used: bool,
    pub expires_at: DateTimeWithTimeZone,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

pub async fn create(
    db: &DatabaseConnection,
    email: &str,
    code: &str,
    kind: &str,
    role: &str,
    expires_at: DateTime<Utc>,
) -> Result<Model, ModelError> {
    if code.trim().is_empty() { return Err(ModelError::Validation("code required".into())); }
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        email: Set(email.to_string()),
        code: Set(code.to_string()),
        kind: Set(kind.to_string()),
        role: Set(role.to_string()),
        is_used: Set(false),
        expires_at: Set(expires_at.into()),
        created_at: Set(Utc::now().into()),
    };
    am.insert(db).await.map_err(ModelError::from_write)
}

/// Newest unused code matching every key whose expiry is still after `now`.
pub async fn find_valid(
    db: &DatabaseConnection,
    email: &str,
    code: &str,
    kind: &str,
    role: &str,
    now: DateTime<Utc>,
) -> Result<Option<Model>, ModelError> {
    let now: DateTimeWithTimeZone = now.into();
    let found = Entity::find()
        .filter(Column::Email.eq(email))
        .filter(Column::Code.eq(code))
        .filter(Column::Kind.eq(kind))
        .filter(Column::Role.eq(role))
        .filter(Column::IsUsed.eq(false))
        .filter(Column::ExpiresAt.gt(now))
        .order_by_desc(Column::CreatedAt)
        .one(db)
        .await?;
    Ok(found)
}

pub async fn mark_used(db: &DatabaseConnection, id: Uuid) -> Result<(), ModelError> {
    let res = Entity::update_many()
        .col_expr(Column::IsUsed, Expr::value(true))
        .filter(Column::Id.eq(id))
        .exec(db)
        .await?;
    if res.rows_affected == 0 { return Err(ModelError::NotFound("otp".into())); }
    Ok(())
}
