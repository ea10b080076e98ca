use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// User record in the database.
///
/// An OTP column and its expiry column are always written together: an empty
/// code means no outstanding OTP and a NULL expiry, a non-empty code carries
/// the instant at which it stops being valid.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String, // Argon2 hash, not exposed in JSON
    pub is_account_verified: bool,
    pub verify_otp: String,
    pub verify_otp_expires_at: Option<OffsetDateTime>,
    pub reset_otp: String,
    pub reset_otp_expires_at: Option<OffsetDateTime>,
    pub created_at: OffsetDateTime,
}
