use super::EmailMessage;

pub fn verification(to: &str, code: &str, ttl_minutes: i64) -> EmailMessage {
    EmailMessage {
        to: to.to_string(),
        subject: "Verify your email".into(),
        body: format!(
            "Your verification code is {code}.\n\nIt expires in {ttl_minutes} minutes. \
             If you did not create an account, ignore this email."
        ),
    }
}

pub fn password_reset(to: &str, code: &str, ttl_minutes: i64) -> EmailMessage {
    EmailMessage {
        to: to.to_string(),
        subject: "Password reset code".into(),
        body: format!(
            "Your password reset code is {code}.\n\nIt expires in {ttl_minutes} minutes. \
             If you did not request a reset, you can ignore this email."
        ),
    }
}

pub fn password_changed(to: &str) -> EmailMessage {
    EmailMessage {
        to: to.to_string(),
        subject: "Your password was changed".into(),
        body: "Your password has been reset successfully. \
               If this was not you, contact the parking office immediately."
            .into(),
    }
}
