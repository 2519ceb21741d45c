//! Self-service profile operations for authenticated users.

use tracing::{info, instrument};
use uuid::Uuid;

use super::domain::{ChangePasswordInput, Role, UpdateProfileInput, UserProfile};
use super::errors::AuthError;
use super::password::{hash_password, verify_password};
use super::service::{AuthService, EMAIL_TAKEN};
use super::validation::{normalize_email, required_secret, validate_email};

impl AuthService {
    #[instrument(skip(self))]
    pub async fn get_profile(&self, user_id: Uuid) -> Result<UserProfile, AuthError> {
        let user = self
            .repo
            .find_user_by_id(user_id)
            .await?
            .ok_or_else(|| AuthError::not_found("User not found"))?;
        Ok(UserProfile::from(&user))
    }

    /// Update name and/or email; omitted or blank fields keep their value.
    #[instrument(skip(self, input))]
    pub async fn update_profile(&self, user_id: Uuid, input: UpdateProfileInput) -> Result<UserProfile, AuthError> {
        let current = self
            .repo
            .find_user_by_id(user_id)
            .await?
            .ok_or_else(|| AuthError::not_found("User not found"))?;

        let name = match input.name.as_deref().map(str::trim) {
            Some(n) if !n.is_empty() => n.to_string(),
            _ => current.name.clone(),
        };
        let email = match input.email.as_deref().map(str::trim) {
            Some(e) if !e.is_empty() => normalize_email(e),
            _ => current.email.clone(),
        };

        if email != current.email {
            validate_email(&email)?;
            if self.repo.user_email_taken_by_other(&email, user_id).await? {
                return Err(AuthError::Conflict(EMAIL_TAKEN.into()));
            }
        }

        let updated = self.repo.update_user_profile(user_id, &name, &email).await?;
        info!(user_id = %updated.id, "profile_updated");
        Ok(UserProfile::from(&updated))
    }

    /// Replace the password after checking the current one. No strength
    /// policy is applied here.
    #[instrument(skip(self, input))]
    pub async fn change_password(&self, user_id: Uuid, input: ChangePasswordInput) -> Result<(), AuthError> {
        let current_password = required_secret(&input.current_password)?;
        let new_password = required_secret(&input.new_password)?;

        let user = self
            .repo
            .find_user_by_id(user_id)
            .await?
            .ok_or_else(|| AuthError::not_found("User not found"))?;
        if !verify_password(current_password, &user.password_hash)? {
            return Err(AuthError::unauthorized("Current password is incorrect"));
        }

        let password_hash = hash_password(new_password)?;
        self.repo.update_password(Role::User, user.id, &password_hash).await?;
        info!(user_id = %user.id, "password_changed");
        Ok(())
    }
}
