use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::domain::{Account, AdminRecord, CodeKind, NewAdmin, NewOneTimeCode, NewUser, OneTimeCode, Role, UserRecord};
use super::errors::AuthError;

/// Repository abstraction for auth-related persistence.
///
/// Methods taking a [`Role`] resolve the identity table from the enum; no
/// implementation may splice caller input into table names.
#[async_trait]
pub trait AuthRepository: Send + Sync {
    async fn find_account_by_email(&self, role: Role, email: &str) -> Result<Option<Account>, AuthError>;
    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, AuthError>;
    async fn user_email_taken_by_other(&self, email: &str, exclude_id: Uuid) -> Result<bool, AuthError>;

    async fn create_user(&self, new: NewUser) -> Result<UserRecord, AuthError>;
    async fn create_admin(&self, new: NewAdmin) -> Result<AdminRecord, AuthError>;

    async fn mark_email_verified(&self, role: Role, id: Uuid) -> Result<(), AuthError>;
    async fn update_password(&self, role: Role, id: Uuid, password_hash: &str) -> Result<(), AuthError>;
    async fn update_user_profile(&self, id: Uuid, name: &str, email: &str) -> Result<UserRecord, AuthError>;

    async fn insert_code(&self, new: NewOneTimeCode) -> Result<OneTimeCode, AuthError>;
    /// Newest unused code matching all keys with `expires_at > now`.
    async fn find_valid_code(
        &self,
        email: &str,
        code: &str,
        kind: CodeKind,
        role: Role,
        now: DateTime<Utc>,
    ) -> Result<Option<OneTimeCode>, AuthError>;
    async fn mark_code_used(&self, id: Uuid) -> Result<(), AuthError>;
}

/// Simple in-memory mock repository for tests and doc examples
pub mod mock {
    use super::*;
    use std::sync::Mutex;

    use crate::auth::domain::UserStatus;

    #[derive(Default)]
    pub struct MockAuthRepository {
        users: Mutex<Vec<UserRecord>>,
        admins: Mutex<Vec<AdminRecord>>,
        codes: Mutex<Vec<OneTimeCode>>,
    }

    impl MockAuthRepository {
        /// Stand-in for the out-of-band admin approval step.
        pub fn set_user_status(&self, email: &str, status: UserStatus) {
            let mut users = self.users.lock().unwrap();
            if let Some(u) = users.iter_mut().find(|u| u.email == email) {
                u.status = status;
            }
        }

        pub fn user_by_email(&self, email: &str) -> Option<UserRecord> {
            self.users.lock().unwrap().iter().find(|u| u.email == email).cloned()
        }

        pub fn admin_by_email(&self, email: &str) -> Option<AdminRecord> {
            self.admins.lock().unwrap().iter().find(|a| a.email == email).cloned()
        }

        pub fn user_count(&self) -> usize {
            self.users.lock().unwrap().len()
        }

        pub fn admin_count(&self) -> usize {
            self.admins.lock().unwrap().len()
        }

        pub fn codes_for(&self, email: &str) -> Vec<OneTimeCode> {
            self.codes.lock().unwrap().iter().filter(|c| c.email == email).cloned().collect()
        }

        /// Insert a code row as-is (e.g. already expired).
        pub fn push_code(&self, code: OneTimeCode) {
            self.codes.lock().unwrap().push(code);
        }
    }

    #[async_trait]
    impl AuthRepository for MockAuthRepository {
        async fn find_account_by_email(&self, role: Role, email: &str) -> Result<Option<Account>, AuthError> {
            Ok(match role {
                Role::User => self.user_by_email(email).map(Account::User),
                Role::Admin => self.admin_by_email(email).map(Account::Admin),
            })
        }

        async fn find_user_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, AuthError> {
            Ok(self.users.lock().unwrap().iter().find(|u| u.id == id).cloned())
        }

        async fn user_email_taken_by_other(&self, email: &str, exclude_id: Uuid) -> Result<bool, AuthError> {
            Ok(self.users.lock().unwrap().iter().any(|u| u.email == email && u.id != exclude_id))
        }

        async fn create_user(&self, new: NewUser) -> Result<UserRecord, AuthError> {
            let mut users = self.users.lock().unwrap();
            if users.iter().any(|u| u.email == new.email) {
                return Err(AuthError::Conflict("Email already registered".into()));
            }
            let user = UserRecord {
                id: Uuid::new_v4(),
                name: new.name,
                email: new.email,
                password_hash: new.password_hash,
                plate_number: new.plate_number,
                preferred_entry_time: new.preferred_entry_time,
                preferred_exit_time: new.preferred_exit_time,
                status: UserStatus::Pending,
                is_email_verified: false,
            };
            users.push(user.clone());
            Ok(user)
        }

        async fn create_admin(&self, new: NewAdmin) -> Result<AdminRecord, AuthError> {
            let mut admins = self.admins.lock().unwrap();
            if admins.iter().any(|a| a.email == new.email) {
                return Err(AuthError::Conflict("Email already registered".into()));
            }
            let admin = AdminRecord {
                id: Uuid::new_v4(),
                name: new.name,
                email: new.email,
                password_hash: new.password_hash,
                is_email_verified: false,
            };
            admins.push(admin.clone());
            Ok(admin)
        }

        async fn mark_email_verified(&self, role: Role, id: Uuid) -> Result<(), AuthError> {
            match role {
                Role::User => {
                    let mut users = self.users.lock().unwrap();
                    let u = users.iter_mut().find(|u| u.id == id).ok_or_else(|| AuthError::not_found("user not found"))?;
                    u.is_email_verified = true;
                }
                Role::Admin => {
                    let mut admins = self.admins.lock().unwrap();
                    let a = admins.iter_mut().find(|a| a.id == id).ok_or_else(|| AuthError::not_found("admin not found"))?;
                    a.is_email_verified = true;
                }
            }
            Ok(())
        }

        async fn update_password(&self, role: Role, id: Uuid, password_hash: &str) -> Result<(), AuthError> {
            match role {
                Role::User => {
                    let mut users = self.users.lock().unwrap();
                    let u = users.iter_mut().find(|u| u.id == id).ok_or_else(|| AuthError::not_found("user not found"))?;
                    u.password_hash = password_hash.to_string();
                }
                Role::Admin => {
                    let mut admins = self.admins.lock().unwrap();
                    let a = admins.iter_mut().find(|a| a.id == id).ok_or_else(|| AuthError::not_found("admin not found"))?;
                    a.password_hash = password_hash.to_string();
                }
            }
            Ok(())
        }

        async fn update_user_profile(&self, id: Uuid, name: &str, email: &str) -> Result<UserRecord, AuthError> {
            let mut users = self.users.lock().unwrap();
            if users.iter().any(|u| u.email == email && u.id != id) {
                return Err(AuthError::Conflict("Email already registered".into()));
            }
            let u = users.iter_mut().find(|u| u.id == id).ok_or_else(|| AuthError::not_found("user not found"))?;
            u.name = name.to_string();
            u.email = email.to_string();
            Ok(u.clone())
        }

        async fn insert_code(&self, new: NewOneTimeCode) -> Result<OneTimeCode, AuthError> {
            let code = OneTimeCode {
                id: Uuid::new_v4(),
                email: new.email,
                code: new.code,
                kind: new.kind,
                role: new.role,
                is_used: false,
                expires_at: new.expires_at,
                created_at: Utc::now(),
            };
            self.codes.lock().unwrap().push(code.clone());
            Ok(code)
        }

        async fn find_valid_code(
            &self,
            email: &str,
            code: &str,
            kind: CodeKind,
            role: Role,
            now: DateTime<Utc>,
        ) -> Result<Option<OneTimeCode>, AuthError> {
            let codes = self.codes.lock().unwrap();
            // max_by_key keeps the last maximum, so equal timestamps resolve to the latest insert
            Ok(codes
                .iter()
                .filter(|c| c.email == email && c.code == code && c.kind == kind && c.role == role && c.is_valid_at(now))
                .max_by_key(|c| c.created_at)
                .cloned())
        }

        async fn mark_code_used(&self, id: Uuid) -> Result<(), AuthError> {
            let mut codes = self.codes.lock().unwrap();
            let c = codes.iter_mut().find(|c| c.id == id).ok_or_else(|| AuthError::not_found("otp not found"))?;
            c.is_used = true;
            Ok(())
        }
    }
}
