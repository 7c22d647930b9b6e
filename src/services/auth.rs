//! Password hashing and bearer tokens.
//!
//! Tokens are HS256 JWTs. Access tokens carry the user's role, refresh
//! tokens only the subject; both are stateless, so logging out is a client
//! concern.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::{ServiceError, ServiceResult};
use crate::config::AppConfig;
use crate::db::FullRepository;
use crate::models::{User, UserId};

crate::define_text_enum! {
    pub enum TokenKind {
        Access => "access",
        Refresh => "refresh",
    }
}

/// JWT payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// User id as a decimal string
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(rename = "type")]
    pub kind: TokenKind,
    pub exp: i64,
    pub iat: i64,
    /// Unique token id, so two tokens issued in the same second still differ
    pub jti: String,
}

impl Claims {
    pub fn user_id(&self) -> ServiceResult<UserId> {
        self.sub
            .parse::<i64>()
            .map(UserId::new)
            .map_err(|_| ServiceError::unauthorized("Invalid token subject"))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: &'static str,
}

/// Signing keys and token lifetimes.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    pub fn new(secret: &str, access_ttl: Duration, refresh_ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            access_ttl,
            refresh_ttl,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            &config.secret_key,
            Duration::minutes(config.access_token_expire_minutes),
            Duration::days(config.refresh_token_expire_days),
        )
    }

    fn issue(&self, user: &User, kind: TokenKind) -> ServiceResult<String> {
        let now = Utc::now();
        let ttl = match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        };
        let claims = Claims {
            sub: user.id.to_string(),
            role: (kind == TokenKind::Access).then(|| user.role.as_str().to_string()),
            kind,
            exp: (now + ttl).timestamp(),
            iat: now.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| ServiceError::internal(format!("Failed to sign token: {}", e)))
    }

    /// Issue a fresh access/refresh pair for a user.
    pub fn issue_pair(&self, user: &User) -> ServiceResult<TokenPair> {
        Ok(TokenPair {
            access_token: self.issue(user, TokenKind::Access)?,
            refresh_token: self.issue(user, TokenKind::Refresh)?,
            token_type: "bearer",
        })
    }

    /// Verify signature and expiry, and check the token kind.
    pub fn decode(&self, token: &str, expected: TokenKind) -> ServiceResult<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let claims = decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    ServiceError::unauthorized("Token has expired")
                }
                _ => ServiceError::unauthorized("Invalid or expired token"),
            })?;

        if claims.kind != expected {
            return Err(ServiceError::unauthorized("Invalid or expired token"));
        }
        Ok(claims)
    }
}

/// Hash a password into an argon2 PHC string.
pub fn hash_password(password: &str) -> ServiceResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ServiceError::internal(format!("Failed to hash password: {}", e)))
}

/// Check a password against a stored PHC string; malformed hashes never verify.
pub fn verify_password(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

/// Normalized form of an email used for storage and lookup.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Look up an active user by credentials.
pub async fn authenticate(
    repo: &dyn FullRepository,
    email: &str,
    password: &str,
) -> ServiceResult<Option<User>> {
    let Some(user) = repo.get_user_by_email(&normalize_email(email)).await? else {
        return Ok(None);
    };
    if !user.is_active || !verify_password(password, &user.password_hash) {
        return Ok(None);
    }
    Ok(Some(user))
}

pub async fn login(
    repo: &dyn FullRepository,
    tokens: &TokenService,
    email: &str,
    password: &str,
) -> ServiceResult<(User, TokenPair)> {
    let user = authenticate(repo, email, password)
        .await?
        .ok_or_else(|| ServiceError::unauthorized("Incorrect email or password"))?;
    let pair = tokens.issue_pair(&user)?;
    log::info!("User {} logged in", user.id);
    Ok((user, pair))
}

/// Exchange a refresh token for a new pair; the user must still be active.
pub async fn refresh(
    repo: &dyn FullRepository,
    tokens: &TokenService,
    refresh_token: &str,
) -> ServiceResult<TokenPair> {
    let invalid = || ServiceError::unauthorized("Invalid or expired refresh token");
    let claims = tokens
        .decode(refresh_token, TokenKind::Refresh)
        .map_err(|_| invalid())?;
    let user = repo
        .get_user(claims.user_id()?)
        .await?
        .filter(|u| u.is_active)
        .ok_or_else(invalid)?;
    tokens.issue_pair(&user)
}

/// Resolve the active user behind an access token.
pub async fn user_from_access_token(
    repo: &dyn FullRepository,
    tokens: &TokenService,
    access_token: &str,
) -> ServiceResult<User> {
    let claims = tokens.decode(access_token, TokenKind::Access)?;
    repo.get_user(claims.user_id()?)
        .await?
        .filter(|u| u.is_active)
        .ok_or_else(|| ServiceError::unauthorized("Invalid or expired token"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserRole;

    fn user(role: UserRole) -> User {
        let now = Utc::now();
        User {
            id: UserId::new(12),
            email: "anna@example.lv".into(),
            password_hash: String::new(),
            role,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    fn service() -> TokenService {
        TokenService::new("test-secret", Duration::minutes(5), Duration::days(1))
    }

    #[test]
    fn test_access_token_round_trip() {
        let tokens = service();
        let pair = tokens.issue_pair(&user(UserRole::Admin)).unwrap();
        assert_eq!(pair.token_type, "bearer");

        let claims = tokens.decode(&pair.access_token, TokenKind::Access).unwrap();
        assert_eq!(claims.user_id().unwrap(), UserId::new(12));
        assert_eq!(claims.role.as_deref(), Some("admin"));

        let refresh = tokens.decode(&pair.refresh_token, TokenKind::Refresh).unwrap();
        assert!(refresh.role.is_none());
        assert_ne!(claims.jti, refresh.jti);
    }

    #[test]
    fn test_token_kind_is_enforced() {
        let tokens = service();
        let pair = tokens.issue_pair(&user(UserRole::Employee)).unwrap();
        assert!(tokens.decode(&pair.refresh_token, TokenKind::Access).is_err());
        assert!(tokens.decode(&pair.access_token, TokenKind::Refresh).is_err());
    }

    #[test]
    fn test_foreign_signature_rejected() {
        let pair = service().issue_pair(&user(UserRole::Employee)).unwrap();
        let other = TokenService::new("other", Duration::minutes(5), Duration::days(1));
        assert!(matches!(
            other.decode(&pair.access_token, TokenKind::Access),
            Err(ServiceError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_expired_token_rejected() {
        let tokens = TokenService::new("s", Duration::minutes(-5), Duration::days(1));
        let pair = tokens.issue_pair(&user(UserRole::Employee)).unwrap();
        let err = tokens.decode(&pair.access_token, TokenKind::Access).unwrap_err();
        assert_eq!(err.to_string(), "Token has expired");
    }

    #[test]
    fn test_password_hash_verifies() {
        let hash = hash_password("hunter22").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("hunter22", &hash));
        assert!(!verify_password("hunter23", &hash));
        assert!(!verify_password("hunter22", "not-a-hash"));
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Anna@Example.LV "), "anna@example.lv");
    }
}
