use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize, Serializer};
use uuid::Uuid;

/// Which identity table an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            _ => Err(()),
        }
    }
}

/// Purpose of a one-time code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodeKind {
    Verification,
    Reset,
}

impl CodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CodeKind::Verification => "verification",
            CodeKind::Reset => "reset",
        }
    }
}

impl FromStr for CodeKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "verification" => Ok(CodeKind::Verification),
            "reset" => Ok(CodeKind::Reset),
            _ => Err(()),
        }
    }
}

/// Approval state of a user. Anything other than `Approved` blocks login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserStatus {
    Pending,
    Approved,
    Rejected,
    Other(String),
}

impl UserStatus {
    pub fn as_str(&self) -> &str {
        match self {
            UserStatus::Pending => "pending",
            UserStatus::Approved => "approved",
            UserStatus::Rejected => "rejected",
            UserStatus::Other(s) => s.as_str(),
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "pending" => UserStatus::Pending,
            "approved" => UserStatus::Approved,
            "rejected" => UserStatus::Rejected,
            other => UserStatus::Other(other.to_string()),
        }
    }
}

impl Serialize for UserStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Stored user row (includes the password hash; never serialize this).
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub plate_number: String,
    pub preferred_entry_time: NaiveTime,
    pub preferred_exit_time: NaiveTime,
    pub status: UserStatus,
    pub is_email_verified: bool,
}

/// Stored admin row.
#[derive(Debug, Clone)]
pub struct AdminRecord {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub is_email_verified: bool,
}

#[derive(Debug, Clone)]
pub enum Account {
    User(UserRecord),
    Admin(AdminRecord),
}

impl Account {
    pub fn id(&self) -> Uuid {
        match self {
            Account::User(u) => u.id,
            Account::Admin(a) => a.id,
        }
    }

    pub fn email(&self) -> &str {
        match self {
            Account::User(u) => &u.email,
            Account::Admin(a) => &a.email,
        }
    }

    pub fn role(&self) -> Role {
        match self {
            Account::User(_) => Role::User,
            Account::Admin(_) => Role::Admin,
        }
    }

    pub fn password_hash(&self) -> &str {
        match self {
            Account::User(u) => &u.password_hash,
            Account::Admin(a) => &a.password_hash,
        }
    }

    pub fn is_email_verified(&self) -> bool {
        match self {
            Account::User(u) => u.is_email_verified,
            Account::Admin(a) => a.is_email_verified,
        }
    }

    pub fn to_public(&self) -> PublicAccount {
        match self {
            Account::User(u) => PublicAccount::User(PublicUser::from(u)),
            Account::Admin(a) => PublicAccount::Admin(PublicAdmin::from(a)),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub plate_number: String,
    pub preferred_entry_time: NaiveTime,
    pub preferred_exit_time: NaiveTime,
    pub status: UserStatus,
    pub is_email_verified: bool,
}

impl From<&UserRecord> for PublicUser {
    fn from(u: &UserRecord) -> Self {
        Self {
            id: u.id,
            name: u.name.clone(),
            email: u.email.clone(),
            role: Role::User,
            plate_number: u.plate_number.clone(),
            preferred_entry_time: u.preferred_entry_time,
            preferred_exit_time: u.preferred_exit_time,
            status: u.status.clone(),
            is_email_verified: u.is_email_verified,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicAdmin {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub is_email_verified: bool,
}

impl From<&AdminRecord> for PublicAdmin {
    fn from(a: &AdminRecord) -> Self {
        Self { id: a.id, name: a.name.clone(), email: a.email.clone(), role: Role::Admin, is_email_verified: a.is_email_verified }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum PublicAccount {
    User(PublicUser),
    Admin(PublicAdmin),
}

/// Profile view returned to an authenticated user.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub plate_number: String,
    pub status: UserStatus,
}

impl From<&UserRecord> for UserProfile {
    fn from(u: &UserRecord) -> Self {
        Self {
            id: u.id,
            name: u.name.clone(),
            email: u.email.clone(),
            role: Role::User,
            plate_number: u.plate_number.clone(),
            status: u.status.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OneTimeCode {
    pub id: Uuid,
    pub email: String,
    pub code: String,
    pub kind: CodeKind,
    pub role: Role,
    pub is_used: bool,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl OneTimeCode {
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        !self.is_used && self.expires_at > now
    }
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub plate_number: String,
    pub preferred_entry_time: NaiveTime,
    pub preferred_exit_time: NaiveTime,
}

#[derive(Debug, Clone)]
pub struct NewAdmin {
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

#[derive(Debug, Clone)]
pub struct NewOneTimeCode {
    pub email: String,
    pub code: String,
    pub kind: CodeKind,
    pub role: Role,
    pub expires_at: DateTime<Utc>,
}

/// User registration input. Fields are optional so missing ones are
/// reported as validation errors instead of deserialization failures.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RegisterUserInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub plate_number: Option<String>,
    pub preferred_entry_time: Option<String>,
    pub preferred_exit_time: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RegisterAdminInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LoginInput {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VerifyEmailInput {
    pub email: Option<String>,
    pub code: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ForgotPasswordInput {
    pub email: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ResetPasswordInput {
    pub email: Option<String>,
    pub code: Option<String>,
    pub new_password: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UpdateProfileInput {
    pub name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChangePasswordInput {
    pub current_password: Option<String>,
    pub new_password: Option<String>,
}

/// Login result (session)
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub token: String,
    pub account: PublicAccount,
}
