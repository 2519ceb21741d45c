use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::domain::{
    Account, AuthSession, CodeKind, ForgotPasswordInput, LoginInput, NewAdmin, NewOneTimeCode, NewUser,
    RegisterAdminInput, RegisterUserInput, ResetPasswordInput, Role, UserStatus, VerifyEmailInput,
};
use super::errors::AuthError;
use super::otp::{CodeGenerator, NumericCodeGenerator};
use super::password::{hash_password, verify_password};
use super::repository::AuthRepository;
use super::token::TokenIssuer;
use super::validation::{
    normalize_email, parse_time_of_day, required, required_secret, validate_email, validate_new_password,
};
use crate::email::{templates, EmailMessage, EmailSender};

pub const INVALID_CREDENTIALS: &str = "Invalid credentials";
pub const EMAIL_NOT_VERIFIED: &str = "Please verify your email before logging in";
pub const ACCOUNT_PENDING: &str = "Your account is pending approval";
pub const ACCOUNT_REJECTED: &str = "Your account has been rejected";
pub const EMAIL_TAKEN: &str = "Email already registered";

/// Auth service configuration
#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl: Duration,
    pub otp_ttl: Duration,
    pub otp_digits: u32,
}

impl AuthConfig {
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self { jwt_secret: jwt_secret.into(), token_ttl: Duration::hours(24), otp_ttl: Duration::minutes(10), otp_digits: 6 }
    }
}

/// Auth business service independent of web framework
pub struct AuthService {
    pub(super) repo: Arc<dyn AuthRepository>,
    mailer: Arc<dyn EmailSender>,
    codes: Arc<dyn CodeGenerator>,
    tokens: TokenIssuer,
    cfg: AuthConfig,
}

impl AuthService {
    pub fn new(repo: Arc<dyn AuthRepository>, mailer: Arc<dyn EmailSender>, cfg: AuthConfig) -> Self {
        let codes = Arc::new(NumericCodeGenerator::new(cfg.otp_digits));
        let tokens = TokenIssuer::new(&cfg.jwt_secret, cfg.token_ttl);
        Self { repo, mailer, codes, tokens, cfg }
    }

    pub fn with_code_generator(mut self, codes: Arc<dyn CodeGenerator>) -> Self {
        self.codes = codes;
        self
    }

    /// Issuer used to verify bearer tokens on protected routes.
    pub fn tokens(&self) -> &TokenIssuer {
        &self.tokens
    }

    /// Register a driver account and email a verification code.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{service::{AuthService, AuthConfig}, repository::mock::MockAuthRepository};
    /// use service::auth::domain::RegisterUserInput;
    /// use service::email::memory::MemoryEmailSender;
    /// use std::sync::Arc;
    /// let mailer = Arc::new(MemoryEmailSender::default());
    /// let svc = AuthService::new(Arc::new(MockAuthRepository::default()), mailer.clone(), AuthConfig::new("secret"));
    /// let input = RegisterUserInput {
    ///     name: Some("Ann".into()),
    ///     email: Some("ann@example.com".into()),
    ///     password: Some("Secret123".into()),
    ///     plate_number: Some("KDA 001A".into()),
    ///     preferred_entry_time: Some("08:00".into()),
    ///     preferred_exit_time: Some("17:00".into()),
    /// };
    /// let _id = tokio_test::block_on(svc.register_user(input)).unwrap();
    /// assert_eq!(mailer.sent_to("ann@example.com").len(), 1);
    /// ```
    #[instrument(skip(self, input), fields(email = ?input.email))]
    pub async fn register_user(&self, input: RegisterUserInput) -> Result<Uuid, AuthError> {
        let name = required(&input.name)?;
        let email = required(&input.email)?;
        let password = required_secret(&input.password)?;
        let plate_number = required(&input.plate_number)?;
        let entry_raw = required(&input.preferred_entry_time)?;
        let exit_raw = required(&input.preferred_exit_time)?;

        let email = normalize_email(email);
        validate_email(&email)?;
        let entry = parse_time_of_day(entry_raw, "preferredEntryTime")?;
        let exit = parse_time_of_day(exit_raw, "preferredExitTime")?;
        if exit <= entry {
            return Err(AuthError::validation("Preferred exit time must be after entry time"));
        }

        if self.repo.find_account_by_email(Role::User, &email).await?.is_some() {
            debug!(%email, "user exists");
            return Err(AuthError::Conflict(EMAIL_TAKEN.into()));
        }

        let password_hash = hash_password(password)?;
        let user = self
            .repo
            .create_user(NewUser {
                name: name.to_string(),
                email: email.clone(),
                password_hash,
                plate_number: plate_number.to_string(),
                preferred_entry_time: entry,
                preferred_exit_time: exit,
            })
            .await?;
        info!(user_id = %user.id, email = %user.email, "user_registered");

        let code = self.issue_code(&email, CodeKind::Verification, Role::User).await?;
        self.deliver(templates::verification(&email, &code, self.cfg.otp_ttl.num_minutes())).await?;
        Ok(user.id)
    }

    #[instrument(skip(self, input), fields(email = ?input.email))]
    pub async fn register_admin(&self, input: RegisterAdminInput) -> Result<Uuid, AuthError> {
        let name = required(&input.name)?;
        let email = required(&input.email)?;
        let password = required_secret(&input.password)?;

        let email = normalize_email(email);
        validate_email(&email)?;

        if self.repo.find_account_by_email(Role::Admin, &email).await?.is_some() {
            debug!(%email, "admin exists");
            return Err(AuthError::Conflict(EMAIL_TAKEN.into()));
        }

        let password_hash = hash_password(password)?;
        let admin = self
            .repo
            .create_admin(NewAdmin { name: name.to_string(), email: email.clone(), password_hash })
            .await?;
        info!(admin_id = %admin.id, email = %admin.email, "admin_registered");

        let code = self.issue_code(&email, CodeKind::Verification, Role::Admin).await?;
        self.deliver(templates::verification(&email, &code, self.cfg.otp_ttl.num_minutes())).await?;
        Ok(admin.id)
    }

    /// Authenticate a user or admin and issue a token.
    ///
    /// The password is checked before account state, so the "not verified"
    /// and "pending approval" messages are only shown to callers who already
    /// know the password.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{service::{AuthService, AuthConfig}, repository::mock::MockAuthRepository};
    /// use service::auth::domain::{LoginInput, Role};
    /// use service::auth::errors::AuthError;
    /// use service::email::LogEmailSender;
    /// use std::sync::Arc;
    /// let svc = AuthService::new(Arc::new(MockAuthRepository::default()), Arc::new(LogEmailSender), AuthConfig::new("secret"));
    /// let input = LoginInput { email: Some("nobody@example.com".into()), password: Some("whatever1".into()) };
    /// let err = tokio_test::block_on(svc.login(Role::User, input)).unwrap_err();
    /// assert!(matches!(err, AuthError::Unauthorized(m) if m == "Invalid credentials"));
    /// ```
    #[instrument(skip(self, input), fields(email = ?input.email, role = %role))]
    pub async fn login(&self, role: Role, input: LoginInput) -> Result<AuthSession, AuthError> {
        let email = normalize_email(required(&input.email)?);
        let password = required_secret(&input.password)?;

        let account = self
            .repo
            .find_account_by_email(role, &email)
            .await?
            .ok_or_else(|| AuthError::unauthorized(INVALID_CREDENTIALS))?;

        if !verify_password(password, account.password_hash())? {
            debug!(account_id = %account.id(), "password mismatch");
            return Err(AuthError::unauthorized(INVALID_CREDENTIALS));
        }
        if !account.is_email_verified() {
            return Err(AuthError::unauthorized(EMAIL_NOT_VERIFIED));
        }
        if let Account::User(user) = &account {
            match &user.status {
                UserStatus::Approved => {}
                UserStatus::Rejected => return Err(AuthError::unauthorized(ACCOUNT_REJECTED)),
                UserStatus::Pending | UserStatus::Other(_) => return Err(AuthError::unauthorized(ACCOUNT_PENDING)),
            }
        }

        let token = self.tokens.issue(account.id(), account.email(), role)?;
        info!(account_id = %account.id(), "login_succeeded");
        Ok(AuthSession { token, account: account.to_public() })
    }

    pub async fn login_user(&self, input: LoginInput) -> Result<AuthSession, AuthError> {
        self.login(Role::User, input).await
    }

    pub async fn login_admin(&self, input: LoginInput) -> Result<AuthSession, AuthError> {
        self.login(Role::Admin, input).await
    }

    /// Consume a verification code and flag the account as verified.
    #[instrument(skip(self, input), fields(email = ?input.email, role = %role))]
    pub async fn verify_email(&self, role: Role, input: VerifyEmailInput) -> Result<(), AuthError> {
        let email = normalize_email(required(&input.email)?);
        let code = required(&input.code)?;

        let otp = self
            .repo
            .find_valid_code(&email, code, CodeKind::Verification, role, Utc::now())
            .await?
            .ok_or_else(|| AuthError::InvalidCode("Invalid or expired verification code".into()))?;

        let account = self
            .repo
            .find_account_by_email(role, &email)
            .await?
            .ok_or_else(|| AuthError::not_found(account_not_found(role)))?;

        // two writes, executed in order; no transaction spans them
        self.repo.mark_email_verified(role, account.id()).await?;
        self.repo.mark_code_used(otp.id).await?;
        info!(account_id = %account.id(), "email_verified");
        Ok(())
    }

    pub async fn verify_user_email(&self, input: VerifyEmailInput) -> Result<(), AuthError> {
        self.verify_email(Role::User, input).await
    }

    pub async fn verify_admin_email(&self, input: VerifyEmailInput) -> Result<(), AuthError> {
        self.verify_email(Role::Admin, input).await
    }

    /// Email a password reset code to a verified account.
    #[instrument(skip(self, input), fields(email = ?input.email, role = ?input.role))]
    pub async fn forgot_password(&self, input: ForgotPasswordInput) -> Result<(), AuthError> {
        let email = normalize_email(required(&input.email)?);
        let role = parse_role(required(&input.role)?)?;

        let account = self
            .repo
            .find_account_by_email(role, &email)
            .await?
            .ok_or_else(|| AuthError::not_found("No account found with this email"))?;
        if !account.is_email_verified() {
            return Err(AuthError::unauthorized("Please verify your email first"));
        }

        let code = self.issue_code(&email, CodeKind::Reset, role).await?;
        self.deliver(templates::password_reset(&email, &code, self.cfg.otp_ttl.num_minutes())).await?;
        info!(account_id = %account.id(), "password_reset_requested");
        Ok(())
    }

    /// Replace the password using a reset code.
    #[instrument(skip(self, input), fields(email = ?input.email, role = ?input.role))]
    pub async fn reset_password(&self, input: ResetPasswordInput) -> Result<(), AuthError> {
        let email = normalize_email(required(&input.email)?);
        let code = required(&input.code)?;
        let new_password = required_secret(&input.new_password)?;
        let role = parse_role(required(&input.role)?)?;
        validate_new_password(new_password)?;

        let otp = self
            .repo
            .find_valid_code(&email, code, CodeKind::Reset, role, Utc::now())
            .await?
            .ok_or_else(|| AuthError::InvalidCode("Invalid or expired reset code".into()))?;

        let account = self
            .repo
            .find_account_by_email(role, &email)
            .await?
            .ok_or_else(|| AuthError::not_found(account_not_found(role)))?;

        let password_hash = hash_password(new_password)?;
        self.repo.update_password(role, account.id(), &password_hash).await?;
        self.repo.mark_code_used(otp.id).await?;
        info!(account_id = %account.id(), "password_reset");

        // the password is already replaced; a failed notice is still reported
        self.deliver(templates::password_changed(&email)).await
    }

    async fn issue_code(&self, email: &str, kind: CodeKind, role: Role) -> Result<String, AuthError> {
        let code = self.codes.generate();
        let row = self
            .repo
            .insert_code(NewOneTimeCode {
                email: email.to_string(),
                code: code.clone(),
                kind,
                role,
                expires_at: Utc::now() + self.cfg.otp_ttl,
            })
            .await?;
        debug!(otp_id = %row.id, kind = kind.as_str(), expires_at = %row.expires_at, "otp_issued");
        Ok(code)
    }

    pub(super) async fn deliver(&self, message: EmailMessage) -> Result<(), AuthError> {
        self.mailer.send(&message).await.map_err(|e| {
            warn!(to_email = %message.to, subject = %message.subject, error = %e, "email delivery failed");
            AuthError::Email(format!("{e:#}"))
        })
    }
}

fn parse_role(raw: &str) -> Result<Role, AuthError> {
    raw.parse::<Role>().map_err(|_| AuthError::validation("Role must be either 'user' or 'admin'"))
}

fn account_not_found(role: Role) -> &'static str {
    match role {
        Role::User => "User not found",
        Role::Admin => "Admin not found",
    }
}
