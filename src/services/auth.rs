//! Authentication service: password verification and JWT token pairs

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;
use std::sync::Arc;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::user::{TokenType, User, UserClaims},
    store::Store,
};

/// Access + refresh token pair issued on login
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn Store>,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(store: Arc<dyn Store>, config: AuthConfig) -> Self {
        Self { store, config }
    }

    /// Authenticate by username/password and issue a token pair
    pub async fn issue_tokens(&self, username: &str, password: &str) -> AppResult<TokenPair> {
        let user = self
            .store
            .users_get_by_username(username)
            .await?
            .ok_or_else(|| {
                AppError::Authentication("Invalid username or password.".to_string())
            })?;

        if !self.verify_password(&user, password)? {
            return Err(AppError::Authentication(
                "Invalid username or password.".to_string(),
            ));
        }

        Ok(TokenPair {
            access: self.create_token(&user.username, user.id, TokenType::Access)?,
            refresh: self.create_token(&user.username, user.id, TokenType::Refresh)?,
        })
    }

    /// Exchange a valid refresh token for a fresh access token
    pub fn refresh_access_token(&self, refresh_token: &str) -> AppResult<String> {
        let claims = UserClaims::from_token(refresh_token, &self.config.jwt_secret)
            .map_err(|e| AppError::Authentication(format!("Invalid refresh token: {}", e)))?;

        if claims.token_type != TokenType::Refresh {
            return Err(AppError::Authentication(
                "Refresh token required.".to_string(),
            ));
        }

        self.create_token(&claims.sub, claims.user_id, TokenType::Access)
    }

    /// Create the bootstrap user when the users table is empty, so the API
    /// is reachable on a fresh deployment.
    pub async fn ensure_bootstrap_user(&self) -> AppResult<()> {
        if self.store.users_count().await? > 0 {
            return Ok(());
        }
        let hash = self.hash_password(&self.config.bootstrap_password)?;
        let user = self
            .store
            .users_create(&self.config.bootstrap_username, &hash)
            .await?;
        tracing::info!(username = %user.username, "bootstrap user created");
        Ok(())
    }

    fn create_token(
        &self,
        username: &str,
        user_id: i32,
        token_type: TokenType,
    ) -> AppResult<String> {
        let now = Utc::now().timestamp();
        let lifetime_secs = match token_type {
            TokenType::Access => self.config.access_token_minutes * 60,
            TokenType::Refresh => self.config.refresh_token_days * 86400,
        };

        let claims = UserClaims {
            sub: username.to_string(),
            user_id,
            token_type,
            exp: now + lifetime_secs,
            iat: now,
        };

        claims
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))
    }

    fn hash_password(&self, password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
    }

    fn verify_password(&self, user: &User, password: &str) -> AppResult<bool> {
        let parsed = PasswordHash::new(&user.password_hash)
            .map_err(|e| AppError::Internal(format!("Invalid stored password hash: {}", e)))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn config() -> AuthConfig {
        AuthConfig {
            jwt_secret: "test-secret".to_string(),
            access_token_minutes: 30,
            refresh_token_days: 7,
            bootstrap_username: "admin".to_string(),
            bootstrap_password: "admin".to_string(),
        }
    }

    fn service() -> AuthService {
        AuthService::new(Arc::new(MemoryStore::new()), config())
    }

    #[tokio::test]
    async fn bootstrap_then_login_issues_valid_pair() {
        let service = service();
        service.ensure_bootstrap_user().await.unwrap();

        let pair = service.issue_tokens("admin", "admin").await.unwrap();

        let access = UserClaims::from_token(&pair.access, "test-secret").unwrap();
        assert_eq!(access.sub, "admin");
        assert_eq!(access.token_type, TokenType::Access);
        let refresh = UserClaims::from_token(&pair.refresh, "test-secret").unwrap();
        assert_eq!(refresh.token_type, TokenType::Refresh);
        assert!(refresh.exp > access.exp);
    }

    #[tokio::test]
    async fn bootstrap_is_idempotent() {
        let service = service();
        service.ensure_bootstrap_user().await.unwrap();
        service.ensure_bootstrap_user().await.unwrap();
    }

    #[tokio::test]
    async fn wrong_password_is_rejected() {
        let service = service();
        service.ensure_bootstrap_user().await.unwrap();

        let err = service.issue_tokens("admin", "nope").await.unwrap_err();
        assert!(matches!(err, AppError::Authentication(_)));
    }

    #[tokio::test]
    async fn unknown_user_is_rejected() {
        let err = service().issue_tokens("ghost", "pw").await.unwrap_err();
        assert!(matches!(err, AppError::Authentication(_)));
    }

    #[tokio::test]
    async fn refresh_requires_a_refresh_token() {
        let service = service();
        service.ensure_bootstrap_user().await.unwrap();
        let pair = service.issue_tokens("admin", "admin").await.unwrap();

        // An access token must not be usable for refresh.
        let err = service.refresh_access_token(&pair.access).unwrap_err();
        assert!(matches!(err, AppError::Authentication(_)));

        let access = service.refresh_access_token(&pair.refresh).unwrap();
        let claims = UserClaims::from_token(&access, "test-secret").unwrap();
        assert_eq!(claims.token_type, TokenType::Access);
        assert_eq!(claims.sub, "admin");
    }
}
