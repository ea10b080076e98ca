//! One-time password lifecycle: issue and validate single-use, time-boxed
//! numeric codes bound to a user and a purpose.

use rand::Rng;
use sqlx::PgPool;
use time::{Duration, OffsetDateTime};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::auth::repo_types::User;
use crate::error::AuthError;

/// Codes stop being valid five minutes after issuance.
pub const OTP_TTL: Duration = Duration::minutes(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtpPurpose {
    /// Email ownership proof; a successful validation marks the account verified.
    Verify,
    /// Password reset authorization.
    Reset,
}

/// Uniformly distributed 6-digit code, 100000..=999999.
pub fn generate_code() -> String {
    rand::thread_rng().gen_range(100_000..=999_999).to_string()
}

/// Generate a fresh code for `purpose`, stamp it on the user row with its
/// expiry and return it for delivery. Any previously outstanding code for the
/// same purpose is overwritten.
pub async fn issue(db: &PgPool, user_id: Uuid, purpose: OtpPurpose) -> Result<String, AuthError> {
    let code = generate_code();
    let expires_at = OffsetDateTime::now_utc() + OTP_TTL;

    let query = match purpose {
        OtpPurpose::Verify => {
            "UPDATE users SET verify_otp = $2, verify_otp_expires_at = $3 WHERE id = $1"
        }
        OtpPurpose::Reset => {
            "UPDATE users SET reset_otp = $2, reset_otp_expires_at = $3 WHERE id = $1"
        }
    };
    let result = sqlx::query(query)
        .bind(user_id)
        .bind(&code)
        .bind(expires_at)
        .execute(db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AuthError::NotFound);
    }
    debug!(user_id = %user_id, purpose = ?purpose, "otp issued");
    Ok(code)
}

/// Classify a submitted code against the stored one. Exact string match, no
/// normalization; an empty stored code means nothing is outstanding (or the
/// code was already used). A code is rejected at the expiry instant itself.
fn check(
    stored: &str,
    expires_at: Option<OffsetDateTime>,
    submitted: &str,
    now: OffsetDateTime,
) -> Result<(), AuthError> {
    if stored.is_empty() || stored != submitted {
        return Err(AuthError::InvalidCode);
    }
    match expires_at {
        Some(exp) if now < exp => Ok(()),
        _ => Err(AuthError::Expired),
    }
}

/// Validate `submitted` for `purpose` and consume it.
///
/// The consumption is a compare-and-clear UPDATE keyed on the code itself, so
/// two concurrent validations of the same code cannot both succeed: whichever
/// UPDATE matches zero rows lost the race and reports `InvalidCode`. A
/// successful `Verify` validation also marks the account verified, which is
/// never undone afterwards.
pub async fn validate(
    db: &PgPool,
    user_id: Uuid,
    purpose: OtpPurpose,
    submitted: &str,
) -> Result<(), AuthError> {
    let user = User::find_by_id(db, user_id)
        .await?
        .ok_or(AuthError::NotFound)?;

    let (stored, expires_at) = match purpose {
        OtpPurpose::Verify => (user.verify_otp.as_str(), user.verify_otp_expires_at),
        OtpPurpose::Reset => (user.reset_otp.as_str(), user.reset_otp_expires_at),
    };
    check(stored, expires_at, submitted, OffsetDateTime::now_utc())?;

    let query = match purpose {
        OtpPurpose::Verify => {
            "UPDATE users
             SET verify_otp = '', verify_otp_expires_at = NULL, is_account_verified = TRUE
             WHERE id = $1 AND verify_otp = $2"
        }
        OtpPurpose::Reset => {
            "UPDATE users
             SET reset_otp = '', reset_otp_expires_at = NULL
             WHERE id = $1 AND reset_otp = $2"
        }
    };
    let result = sqlx::query(query)
        .bind(user_id)
        .bind(submitted)
        .execute(db)
        .await?;

    if result.rows_affected() == 0 {
        // A concurrent validation consumed the code between our read and this write.
        warn!(user_id = %user_id, purpose = ?purpose, "otp consumed concurrently");
        return Err(AuthError::InvalidCode);
    }
    debug!(user_id = %user_id, purpose = ?purpose, "otp validated and cleared");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn generated_codes_are_six_digit_numbers() {
        for _ in 0..1000 {
            let code = generate_code();
            assert_eq!(code.len(), 6);
            let n: u32 = code.parse().expect("numeric code");
            assert!((100_000..=999_999).contains(&n));
        }
    }

    #[test]
    fn check_accepts_matching_code_before_expiry() {
        let issued = datetime!(2024-01-01 12:00 UTC);
        let expires = issued + OTP_TTL;
        // one second before the cutoff
        let now = expires - Duration::seconds(1);
        assert!(check("123456", Some(expires), "123456", now).is_ok());
    }

    #[test]
    fn check_rejects_at_exact_expiry_instant() {
        let issued = datetime!(2024-01-01 12:00 UTC);
        let expires = issued + OTP_TTL;
        let err = check("123456", Some(expires), "123456", expires).unwrap_err();
        assert!(matches!(err, AuthError::Expired));
    }

    #[test]
    fn check_rejects_after_expiry() {
        let expires = datetime!(2024-01-01 12:05 UTC);
        let now = expires + Duration::minutes(10);
        let err = check("123456", Some(expires), "123456", now).unwrap_err();
        assert!(matches!(err, AuthError::Expired));
    }

    #[test]
    fn check_rejects_wrong_code() {
        let expires = datetime!(2024-01-01 12:05 UTC);
        let now = datetime!(2024-01-01 12:00 UTC);
        let err = check("123456", Some(expires), "654321", now).unwrap_err();
        assert!(matches!(err, AuthError::InvalidCode));
    }

    #[test]
    fn check_rejects_cleared_code_as_invalid_not_expired() {
        // After a successful validation the stored code is empty; re-submitting
        // the same code must come back as InvalidCode.
        let now = datetime!(2024-01-01 12:00 UTC);
        let err = check("", None, "123456", now).unwrap_err();
        assert!(matches!(err, AuthError::InvalidCode));
    }

    #[test]
    fn check_mismatch_wins_over_expiry() {
        let expires = datetime!(2024-01-01 12:05 UTC);
        let now = expires + Duration::minutes(1);
        let err = check("123456", Some(expires), "000000", now).unwrap_err();
        assert!(matches!(err, AuthError::InvalidCode));
    }
}
