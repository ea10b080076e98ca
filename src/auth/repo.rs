use crate::auth::repo_types::User;
use sqlx::PgPool;

impl User {
    /// Find a user by email.
    pub async fn find_by_email(db: &PgPool, email: &str) -> sqlx::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash, is_account_verified,
                   verify_otp, verify_otp_expires_at, reset_otp, reset_otp_expires_at,
                   created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Find a user by id.
    pub async fn find_by_id(db: &PgPool, id: uuid::Uuid) -> sqlx::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash, is_account_verified,
                   verify_otp, verify_otp_expires_at, reset_otp, reset_otp_expires_at,
                   created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Create a new user with hashed password.
    pub async fn create(
        db: &PgPool,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> sqlx::Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, name, email, password_hash, is_account_verified,
                      verify_otp, verify_otp_expires_at, reset_otp, reset_otp_expires_at,
                      created_at
            "#,
        )
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .fetch_one(db)
        .await?;
        Ok(user)
    }

    /// Persist the whole record. Last write wins; there is no optimistic
    /// locking on user rows.
    pub async fn save(&self, db: &PgPool) -> sqlx::Result<()> {
        sqlx::query(
            r#"
            UPDATE users
            SET name = $2,
                email = $3,
                password_hash = $4,
                is_account_verified = $5,
                verify_otp = $6,
                verify_otp_expires_at = $7,
                reset_otp = $8,
                reset_otp_expires_at = $9
            WHERE id = $1
            "#,
        )
        .bind(self.id)
        .bind(&self.name)
        .bind(&self.email)
        .bind(&self.password_hash)
        .bind(self.is_account_verified)
        .bind(&self.verify_otp)
        .bind(self.verify_otp_expires_at)
        .bind(&self.reset_otp)
        .bind(self.reset_otp_expires_at)
        .execute(db)
        .await?;
        Ok(())
    }
}
