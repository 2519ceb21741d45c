use chrono::{DateTime, Utc};
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use models::{admin, otp, user};

use crate::auth::domain::{Account, AdminRecord, CodeKind, NewAdmin, NewOneTimeCode, NewUser, OneTimeCode, Role, UserRecord, UserStatus};
use crate::auth::errors::AuthError;
use crate::auth::repository::AuthRepository;

pub struct SeaOrmAuthRepository {
    pub db: DatabaseConnection,
}

fn user_record(m: user::Model) -> UserRecord {
    UserRecord {
        id: m.id,
        name: m.name,
        email: m.email,
        password_hash: m.password,
        plate_number: m.plate_number,
        preferred_entry_time: m.preferred_entry_time,
        preferred_exit_time: m.preferred_exit_time,
        status: UserStatus::parse(&m.status),
        is_email_verified: m.is_email_verified,
    }
}

fn admin_record(m: admin::Model) -> AdminRecord {
    AdminRecord { id: m.id, name: m.name, email: m.email, password_hash: m.password, is_email_verified: m.is_email_verified }
}

fn code_record(m: otp::Model) -> Result<OneTimeCode, AuthError> {
    let kind = m.kind.parse::<CodeKind>().map_err(|_| AuthError::Repository(format!("unknown otp type {:?}", m.kind)))?;
    let role = m.role.parse::<Role>().map_err(|_| AuthError::Repository(format!("unknown otp role {:?}", m.role)))?;
    Ok(OneTimeCode {
        id: m.id,
        email: m.email,
        code: m.code,
        kind,
        role,
        is_used: m.is_used,
        expires_at: m.expires_at.with_timezone(&Utc),
        created_at: m.created_at.with_timezone(&Utc),
    })
}

#[async_trait::async_trait]
impl AuthRepository for SeaOrmAuthRepository {
    async fn find_account_by_email(&self, role: Role, email: &str) -> Result<Option<Account>, AuthError> {
        let found = match role {
            Role::User => user::find_by_email(&self.db, email).await?.map(|m| Account::User(user_record(m))),
            Role::Admin => admin::find_by_email(&self.db, email).await?.map(|m| Account::Admin(admin_record(m))),
        };
        Ok(found)
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, AuthError> {
        Ok(user::find_by_id(&self.db, id).await?.map(user_record))
    }

    async fn user_email_taken_by_other(&self, email: &str, exclude_id: Uuid) -> Result<bool, AuthError> {
        Ok(user::email_taken_by_other(&self.db, email, exclude_id).await?)
    }

    async fn create_user(&self, new: NewUser) -> Result<UserRecord, AuthError> {
        let created = user::create(&self.db, user::NewUser {
            name: &new.name,
            email: &new.email,
            password_hash: &new.password_hash,
            plate_number: &new.plate_number,
            preferred_entry_time: new.preferred_entry_time,
            preferred_exit_time: new.preferred_exit_time,
        })
        .await?;
        Ok(user_record(created))
    }

    async fn create_admin(&self, new: NewAdmin) -> Result<AdminRecord, AuthError> {
        let created = admin::create(&self.db, &new.name, &new.email, &new.password_hash).await?;
        Ok(admin_record(created))
    }

    async fn mark_email_verified(&self, role: Role, id: Uuid) -> Result<(), AuthError> {
        match role {
            Role::User => user::mark_email_verified(&self.db, id).await?,
            Role::Admin => admin::mark_email_verified(&self.db, id).await?,
        }
        Ok(())
    }

    async fn update_password(&self, role: Role, id: Uuid, password_hash: &str) -> Result<(), AuthError> {
        match role {
            Role::User => user::set_password(&self.db, id, password_hash).await?,
            Role::Admin => admin::set_password(&self.db, id, password_hash).await?,
        }
        Ok(())
    }

    async fn update_user_profile(&self, id: Uuid, name: &str, email: &str) -> Result<UserRecord, AuthError> {
        Ok(user_record(user::update_profile(&self.db, id, name, email).await?))
    }

    async fn insert_code(&self, new: NewOneTimeCode) -> Result<OneTimeCode, AuthError> {
        let row = otp::create(&self.db, &new.email, &new.code, new.kind.as_str(), new.role.as_str(), new.expires_at).await?;
        code_record(row)
    }

    async fn find_valid_code(
        &self,
        email: &str,
        code: &str,
        kind: CodeKind,
        role: Role,
        now: DateTime<Utc>,
    ) -> Result<Option<OneTimeCode>, AuthError> {
        otp::find_valid(&self.db, email, code, kind.as_str(), role.as_str(), now)
            .await?
            .map(code_record)
            .transpose()
    }

    async fn mark_code_used(&self, id: Uuid) -> Result<(), AuthError> {
        Ok(otp::mark_used(&self.db, id).await?)
    }
}
