use std::sync::Arc;

use chrono::{Duration, Utc};
use uuid::Uuid;

use super::domain::*;
use super::errors::AuthError;
use super::otp::CodeGenerator;
use super::password::verify_password;
use super::repository::mock::MockAuthRepository;
use super::repository::AuthRepository;
use super::service::{AuthConfig, AuthService, ACCOUNT_PENDING, ACCOUNT_REJECTED, EMAIL_NOT_VERIFIED, INVALID_CREDENTIALS};
use crate::email::memory::MemoryEmailSender;

const CODE: &str = "424242";
const PASSWORD: &str = "Passw0rd!";

struct FixedCode;

impl CodeGenerator for FixedCode {
    fn generate(&self) -> String { CODE.to_string() }
}

struct Harness {
    repo: Arc<MockAuthRepository>,
    mailer: Arc<MemoryEmailSender>,
    svc: AuthService,
}

fn harness() -> Harness {
    let repo = Arc::new(MockAuthRepository::default());
    let mailer = Arc::new(MemoryEmailSender::default());
    let svc = AuthService::new(repo.clone(), mailer.clone(), AuthConfig::new("test-secret"))
        .with_code_generator(Arc::new(FixedCode));
    Harness { repo, mailer, svc }
}

fn user_input(email: &str) -> RegisterUserInput {
    RegisterUserInput {
        name: Some("Ann Driver".into()),
        email: Some(email.into()),
        password: Some(PASSWORD.into()),
        plate_number: Some("KDA 001A".into()),
        preferred_entry_time: Some("08:00".into()),
        preferred_exit_time: Some("17:30".into()),
    }
}

fn admin_input(email: &str) -> RegisterAdminInput {
    RegisterAdminInput { name: Some("Ops".into()), email: Some(email.into()), password: Some(PASSWORD.into()) }
}

fn login(email: &str, password: &str) -> LoginInput {
    LoginInput { email: Some(email.into()), password: Some(password.into()) }
}

fn verify(email: &str, code: &str) -> VerifyEmailInput {
    VerifyEmailInput { email: Some(email.into()), code: Some(code.into()) }
}

/// Registered, verified and approved user.
async fn active_user(h: &Harness, email: &str) -> Uuid {
    let id = h.svc.register_user(user_input(email)).await.unwrap();
    h.svc.verify_user_email(verify(email, CODE)).await.unwrap();
    h.repo.set_user_status(email, UserStatus::Approved);
    id
}

#[tokio::test]
async fn register_user_creates_pending_unverified_row_and_sends_code() {
    let h = harness();
    let id = h.svc.register_user(user_input("a@x.com")).await.unwrap();

    let stored = h.repo.user_by_email("a@x.com").unwrap();
    assert_eq!(stored.id, id);
    assert_eq!(stored.status, UserStatus::Pending);
    assert!(!stored.is_email_verified);
    assert_ne!(stored.password_hash, PASSWORD);
    assert!(verify_password(PASSWORD, &stored.password_hash).unwrap());

    let codes = h.repo.codes_for("a@x.com");
    assert_eq!(codes.len(), 1);
    assert_eq!(codes[0].kind, CodeKind::Verification);
    assert_eq!(codes[0].role, Role::User);
    let ttl = codes[0].expires_at - codes[0].created_at;
    assert!(ttl > Duration::minutes(9) && ttl <= Duration::minutes(10));

    let mail = h.mailer.sent_to("a@x.com");
    assert_eq!(mail.len(), 1);
    assert!(mail[0].body.contains(CODE));
}

#[tokio::test]
async fn register_user_missing_any_field_is_rejected_without_row() {
    let h = harness();
    for field in 0..6 {
        let mut input = user_input("a@x.com");
        match field {
            0 => input.name = None,
            1 => input.email = None,
            2 => input.password = None,
            3 => input.plate_number = Some("  ".into()),
            4 => input.preferred_entry_time = None,
            _ => input.preferred_exit_time = None,
        }
        let err = h.svc.register_user(input).await.unwrap_err();
        assert!(matches!(err, AuthError::Validation(ref m) if m == "All fields are required"), "{err:?}");
    }
    assert_eq!(h.repo.user_count(), 0);
    assert!(h.mailer.sent().is_empty());
}

#[tokio::test]
async fn register_user_rejects_bad_email_and_times() {
    let h = harness();
    let err = h.svc.register_user(user_input("not-an-email")).await.unwrap_err();
    assert!(matches!(err, AuthError::Validation(ref m) if m == "Invalid email format"));

    let mut same = user_input("a@x.com");
    same.preferred_exit_time = Some("08:00".into());
    assert!(matches!(h.svc.register_user(same).await, Err(AuthError::Validation(_))));

    let mut earlier = user_input("a@x.com");
    earlier.preferred_exit_time = Some("07:59".into());
    assert!(matches!(h.svc.register_user(earlier).await, Err(AuthError::Validation(_))));

    let mut garbage = user_input("a@x.com");
    garbage.preferred_entry_time = Some("morning".into());
    assert!(matches!(h.svc.register_user(garbage).await, Err(AuthError::Validation(_))));

    assert_eq!(h.repo.user_count(), 0);
}

#[tokio::test]
async fn duplicate_email_conflicts_and_keeps_one_row() {
    let h = harness();
    h.svc.register_user(user_input("a@x.com")).await.unwrap();
    let err = h.svc.register_user(user_input("A@X.com ")).await.unwrap_err();
    assert!(matches!(err, AuthError::Conflict(ref m) if m == "Email already registered"));
    assert_eq!(h.repo.user_count(), 1);
}

#[tokio::test]
async fn admin_and_user_emails_are_independent() {
    let h = harness();
    h.svc.register_user(user_input("shared@x.com")).await.unwrap();
    h.svc.register_admin(admin_input("shared@x.com")).await.unwrap();
    assert_eq!(h.repo.user_count(), 1);
    assert_eq!(h.repo.admin_count(), 1);

    let err = h.svc.register_admin(admin_input("shared@x.com")).await.unwrap_err();
    assert!(matches!(err, AuthError::Conflict(_)));
    assert_eq!(h.repo.admin_count(), 1);
}

#[tokio::test]
async fn register_email_failure_surfaces_after_insert() {
    let h = harness();
    h.mailer.set_failing(true);
    let err = h.svc.register_user(user_input("a@x.com")).await.unwrap_err();
    assert!(matches!(err, AuthError::Email(_)));
    assert!(err.is_internal());
    // no compensation: the unverified row stays behind
    assert_eq!(h.repo.user_count(), 1);
}

#[tokio::test]
async fn verify_email_rejects_wrong_code_then_accepts_right_one() {
    let h = harness();
    h.svc.register_user(user_input("a@x.com")).await.unwrap();

    let err = h.svc.verify_user_email(verify("a@x.com", "000000")).await.unwrap_err();
    assert!(matches!(err, AuthError::InvalidCode(_)));
    assert!(!h.repo.user_by_email("a@x.com").unwrap().is_email_verified);

    h.svc.verify_user_email(verify("a@x.com", CODE)).await.unwrap();
    assert!(h.repo.user_by_email("a@x.com").unwrap().is_email_verified);
    assert!(h.repo.codes_for("a@x.com").iter().all(|c| c.is_used));
}

#[tokio::test]
async fn used_code_cannot_be_replayed() {
    let h = harness();
    h.svc.register_user(user_input("a@x.com")).await.unwrap();
    h.svc.verify_user_email(verify("a@x.com", CODE)).await.unwrap();
    let err = h.svc.verify_user_email(verify("a@x.com", CODE)).await.unwrap_err();
    assert!(matches!(err, AuthError::InvalidCode(_)));
}

#[tokio::test]
async fn duplicate_codes_resolve_to_newest() {
    let h = harness();
    h.svc.register_user(user_input("a@x.com")).await.unwrap();
    let issued = h.repo.codes_for("a@x.com")[0].clone();

    let newer = OneTimeCode { id: Uuid::new_v4(), created_at: issued.created_at + Duration::seconds(30), ..issued.clone() };
    let older = OneTimeCode { id: Uuid::new_v4(), created_at: issued.created_at - Duration::seconds(30), ..issued.clone() };
    h.repo.push_code(newer.clone());
    // inserted last but oldest, so insertion order cannot decide
    h.repo.push_code(older.clone());

    let found = h
        .repo
        .find_valid_code("a@x.com", CODE, CodeKind::Verification, Role::User, Utc::now())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.id, newer.id);

    h.svc.verify_user_email(verify("a@x.com", CODE)).await.unwrap();
    let used: Vec<Uuid> = h.repo.codes_for("a@x.com").into_iter().filter(|c| c.is_used).map(|c| c.id).collect();
    assert_eq!(used, vec![newer.id]);
}

#[tokio::test]
async fn expired_code_never_verifies() {
    let h = harness();
    h.svc.register_user(user_input("a@x.com")).await.unwrap();
    // burn the issued code, then plant an expired but unused one
    h.svc.verify_user_email(verify("a@x.com", CODE)).await.unwrap();
    let now = Utc::now();
    h.repo.push_code(OneTimeCode {
        id: Uuid::new_v4(),
        email: "a@x.com".into(),
        code: "999999".into(),
        kind: CodeKind::Verification,
        role: Role::User,
        is_used: false,
        expires_at: now - Duration::seconds(1),
        created_at: now - Duration::minutes(11),
    });
    let err = h.svc.verify_user_email(verify("a@x.com", "999999")).await.unwrap_err();
    assert!(matches!(err, AuthError::InvalidCode(_)));
}

#[tokio::test]
async fn verification_code_is_bound_to_role_and_kind() {
    let h = harness();
    h.svc.register_user(user_input("a@x.com")).await.unwrap();
    let err = h.svc.verify_admin_email(verify("a@x.com", CODE)).await.unwrap_err();
    assert!(matches!(err, AuthError::InvalidCode(_)));

    // a reset code must not verify an email either
    h.repo
        .insert_code(NewOneTimeCode {
            email: "a@x.com".into(),
            code: "777777".into(),
            kind: CodeKind::Reset,
            role: Role::User,
            expires_at: Utc::now() + Duration::minutes(10),
        })
        .await
        .unwrap();
    let err = h.svc.verify_user_email(verify("a@x.com", "777777")).await.unwrap_err();
    assert!(matches!(err, AuthError::InvalidCode(_)));
}

#[tokio::test]
async fn verify_with_valid_code_but_no_account_is_not_found() {
    let h = harness();
    h.repo
        .insert_code(NewOneTimeCode {
            email: "ghost@x.com".into(),
            code: CODE.into(),
            kind: CodeKind::Verification,
            role: Role::Admin,
            expires_at: Utc::now() + Duration::minutes(10),
        })
        .await
        .unwrap();
    let err = h.svc.verify_admin_email(verify("ghost@x.com", CODE)).await.unwrap_err();
    assert!(matches!(err, AuthError::NotFound(_)));
}

#[tokio::test]
async fn login_gates_in_order() {
    let h = harness();
    h.svc.register_user(user_input("a@x.com")).await.unwrap();

    let err = h.svc.login_user(login("nobody@x.com", PASSWORD)).await.unwrap_err();
    assert!(matches!(err, AuthError::Unauthorized(ref m) if m == INVALID_CREDENTIALS));

    let err = h.svc.login_user(login("a@x.com", "wrong-password")).await.unwrap_err();
    assert!(matches!(err, AuthError::Unauthorized(ref m) if m == INVALID_CREDENTIALS));

    let err = h.svc.login_user(login("a@x.com", PASSWORD)).await.unwrap_err();
    assert!(matches!(err, AuthError::Unauthorized(ref m) if m == EMAIL_NOT_VERIFIED));
    assert_ne!(EMAIL_NOT_VERIFIED, INVALID_CREDENTIALS);

    h.svc.verify_user_email(verify("a@x.com", CODE)).await.unwrap();
    let err = h.svc.login_user(login("a@x.com", PASSWORD)).await.unwrap_err();
    assert!(matches!(err, AuthError::Unauthorized(ref m) if m == ACCOUNT_PENDING));

    h.repo.set_user_status("a@x.com", UserStatus::Rejected);
    let err = h.svc.login_user(login("a@x.com", PASSWORD)).await.unwrap_err();
    assert!(matches!(err, AuthError::Unauthorized(ref m) if m == ACCOUNT_REJECTED));

    h.repo.set_user_status("a@x.com", UserStatus::Approved);
    let session = h.svc.login_user(login("a@x.com", PASSWORD)).await.unwrap();
    let claims = h.svc.tokens().verify(&session.token).unwrap();
    assert_eq!(claims.email, "a@x.com");
    assert_eq!(claims.role, Role::User);
    match session.account {
        PublicAccount::User(u) => assert_eq!(u.status, UserStatus::Approved),
        other => panic!("expected user projection, got {other:?}"),
    }
}

#[tokio::test]
async fn admin_login_needs_verification_but_no_approval() {
    let h = harness();
    let id = h.svc.register_admin(admin_input("ops@x.com")).await.unwrap();
    let err = h.svc.login_admin(login("ops@x.com", PASSWORD)).await.unwrap_err();
    assert!(matches!(err, AuthError::Unauthorized(ref m) if m == EMAIL_NOT_VERIFIED));

    h.svc.verify_admin_email(verify("ops@x.com", CODE)).await.unwrap();
    assert!(h.repo.admin_by_email("ops@x.com").unwrap().is_email_verified);
    let session = h.svc.login_admin(login("ops@x.com", PASSWORD)).await.unwrap();
    let claims = h.svc.tokens().verify(&session.token).unwrap();
    assert_eq!(claims.id, id);
    assert_eq!(claims.role, Role::Admin);

    // an admin account is not a user account
    let err = h.svc.login_user(login("ops@x.com", PASSWORD)).await.unwrap_err();
    assert!(matches!(err, AuthError::Unauthorized(ref m) if m == INVALID_CREDENTIALS));
}

#[tokio::test]
async fn forgot_password_checks_role_existence_and_verification() {
    let h = harness();
    let bad_role = ForgotPasswordInput { email: Some("a@x.com".into()), role: Some("root".into()) };
    assert!(matches!(h.svc.forgot_password(bad_role).await, Err(AuthError::Validation(_))));

    let unknown = ForgotPasswordInput { email: Some("a@x.com".into()), role: Some("user".into()) };
    assert!(matches!(h.svc.forgot_password(unknown).await, Err(AuthError::NotFound(_))));

    h.svc.register_user(user_input("a@x.com")).await.unwrap();
    let unverified = ForgotPasswordInput { email: Some("a@x.com".into()), role: Some("user".into()) };
    assert!(matches!(h.svc.forgot_password(unverified).await, Err(AuthError::Unauthorized(_))));

    h.svc.verify_user_email(verify("a@x.com", CODE)).await.unwrap();
    let ok = ForgotPasswordInput { email: Some("a@x.com".into()), role: Some("user".into()) };
    h.svc.forgot_password(ok).await.unwrap();
    let resets: Vec<_> = h.repo.codes_for("a@x.com").into_iter().filter(|c| c.kind == CodeKind::Reset).collect();
    assert_eq!(resets.len(), 1);
    assert!(!resets[0].is_used);
    assert_eq!(h.mailer.sent_to("a@x.com").len(), 2);
}

#[tokio::test]
async fn reset_password_swaps_credentials() {
    let h = harness();
    active_user(&h, "a@x.com").await;
    h.svc
        .forgot_password(ForgotPasswordInput { email: Some("a@x.com".into()), role: Some("user".into()) })
        .await
        .unwrap();

    let reset = ResetPasswordInput {
        email: Some("a@x.com".into()),
        code: Some(CODE.into()),
        new_password: Some("BrandNew123".into()),
        role: Some("user".into()),
    };
    h.svc.reset_password(reset.clone()).await.unwrap();

    let err = h.svc.login_user(login("a@x.com", PASSWORD)).await.unwrap_err();
    assert!(matches!(err, AuthError::Unauthorized(ref m) if m == INVALID_CREDENTIALS));
    assert!(h.svc.login_user(login("a@x.com", "BrandNew123")).await.is_ok());

    let last = h.mailer.sent_to("a@x.com").pop().unwrap();
    assert_eq!(last.subject, "Your password was changed");

    // the reset code is spent
    assert!(matches!(h.svc.reset_password(reset).await, Err(AuthError::InvalidCode(_))));
}

#[tokio::test]
async fn reset_password_validates_length_and_code() {
    let h = harness();
    active_user(&h, "a@x.com").await;

    let short = ResetPasswordInput {
        email: Some("a@x.com".into()),
        code: Some(CODE.into()),
        new_password: Some("short".into()),
        role: Some("user".into()),
    };
    assert!(matches!(h.svc.reset_password(short).await, Err(AuthError::Validation(_))));

    // the verification code (already used, wrong kind) cannot reset
    let wrong_kind = ResetPasswordInput {
        email: Some("a@x.com".into()),
        code: Some(CODE.into()),
        new_password: Some("LongEnough1".into()),
        role: Some("user".into()),
    };
    assert!(matches!(h.svc.reset_password(wrong_kind).await, Err(AuthError::InvalidCode(_))));
    assert!(h.svc.login_user(login("a@x.com", PASSWORD)).await.is_ok());
}

#[tokio::test]
async fn reset_confirmation_failure_keeps_new_password() {
    let h = harness();
    active_user(&h, "a@x.com").await;
    h.svc
        .forgot_password(ForgotPasswordInput { email: Some("a@x.com".into()), role: Some("user".into()) })
        .await
        .unwrap();

    h.mailer.set_failing(true);
    let reset = ResetPasswordInput {
        email: Some("a@x.com".into()),
        code: Some(CODE.into()),
        new_password: Some("BrandNew123".into()),
        role: Some("user".into()),
    };
    assert!(matches!(h.svc.reset_password(reset).await, Err(AuthError::Email(_))));
    assert!(h.svc.login_user(login("a@x.com", "BrandNew123")).await.is_ok());
}

#[tokio::test]
async fn profile_projection_and_updates() {
    let h = harness();
    let id = active_user(&h, "a@x.com").await;
    h.svc.register_user(user_input("b@x.com")).await.unwrap();

    let profile = h.svc.get_profile(id).await.unwrap();
    assert_eq!(profile.email, "a@x.com");
    assert_eq!(profile.plate_number, "KDA 001A");
    assert_eq!(profile.status, UserStatus::Approved);
    assert!(serde_json::to_value(&profile).unwrap().get("password").is_none());

    let taken = UpdateProfileInput { name: None, email: Some("b@x.com".into()) };
    assert!(matches!(h.svc.update_profile(id, taken).await, Err(AuthError::Conflict(_))));

    let bad = UpdateProfileInput { name: None, email: Some("b@".into()) };
    assert!(matches!(h.svc.update_profile(id, bad).await, Err(AuthError::Validation(_))));

    // unchanged email is not a conflict with itself
    let rename = UpdateProfileInput { name: Some("Ann B.".into()), email: Some("a@x.com".into()) };
    let updated = h.svc.update_profile(id, rename).await.unwrap();
    assert_eq!(updated.name, "Ann B.");

    let move_email = UpdateProfileInput { name: None, email: Some("c@x.com".into()) };
    let updated = h.svc.update_profile(id, move_email).await.unwrap();
    assert_eq!(updated.email, "c@x.com");
    assert_eq!(updated.name, "Ann B.");

    assert!(matches!(h.svc.get_profile(Uuid::new_v4()).await, Err(AuthError::NotFound(_))));
}

#[tokio::test]
async fn change_password_requires_current_password() {
    let h = harness();
    let id = active_user(&h, "a@x.com").await;
    let before = h.repo.user_by_email("a@x.com").unwrap().password_hash;

    let wrong = ChangePasswordInput { current_password: Some("nope-nope".into()), new_password: Some("Another1".into()) };
    let err = h.svc.change_password(id, wrong).await.unwrap_err();
    assert!(matches!(err, AuthError::Unauthorized(ref m) if m == "Current password is incorrect"));
    assert_eq!(h.repo.user_by_email("a@x.com").unwrap().password_hash, before);

    // no minimum length on this path
    let ok = ChangePasswordInput { current_password: Some(PASSWORD.into()), new_password: Some("tiny".into()) };
    h.svc.change_password(id, ok).await.unwrap();
    assert!(h.svc.login_user(login("a@x.com", "tiny")).await.is_ok());
}
