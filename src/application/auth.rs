//! Credentials, session tokens and login lockout.
//!
//! Passwords are stored as argon2 PHC strings in the login collection.
//! Sessions are HS256 JWTs carrying the user id. Logging out records the
//! token's digest in the cache for the remainder of the token lifetime.
//! Failed logins are counted per email; reaching the threshold locks the
//! account for the lock window.

use std::time::Duration;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::OffsetDateTime;
use tracing::{info, warn};
use uuid::Uuid;

use crate::application::context::Backends;
use crate::application::error::ServiceError;
use crate::application::repos::Filter;
use crate::application::users::{NewUser, UserService};
use crate::cache::{CacheError, CacheKey};
use crate::domain::entities::{LoginDraft, LoginRecord, UserRecord};
use crate::domain::outcome::{Outcome, Rejection};
use crate::domain::types::Field;

const REVOKED_MARKER: &str = "revoked";
const LOCKED_MARKER: &str = "locked";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("missing token")]
    MissingToken,
    #[error("invalid token")]
    InvalidToken,
    #[error("password hashing failed: {0}")]
    Hash(String),
    #[error("token signing failed: {0}")]
    Signing(String),
    #[error(transparent)]
    Service(#[from] ServiceError),
}

impl From<CacheError> for AuthError {
    fn from(error: CacheError) -> Self {
        Self::Service(error.into())
    }
}

#[derive(Debug, Clone)]
pub struct AuthPolicy {
    pub jwt_secret: String,
    pub token_ttl: Duration,
    /// Failed logins within `lock_duration` that lock the account.
    pub attempt_threshold: u32,
    pub lock_duration: Duration,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    pub id: Uuid,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Clone)]
pub struct Session {
    pub user: UserRecord,
    pub access_token: String,
}

#[derive(Debug, Clone)]
pub struct Signup {
    pub email: String,
    pub password: String,
    pub user_name: String,
}

#[derive(Clone)]
pub struct AuthService {
    backends: Backends,
    users: UserService,
    policy: AuthPolicy,
}

impl AuthService {
    pub fn new(backends: Backends, users: UserService, policy: AuthPolicy) -> Self {
        Self {
            backends,
            users,
            policy,
        }
    }

    pub fn token_ttl(&self) -> Duration {
        self.policy.token_ttl
    }

    pub async fn signup(&self, signup: Signup) -> Result<Outcome<UserRecord>, AuthError> {
        let email = signup.email.trim();
        if email.is_empty() || signup.password.is_empty() || signup.user_name.trim().is_empty() {
            return Ok(Outcome::Rejected(Rejection::InvalidInput));
        }

        if self.find_login(email).await?.is_some() {
            return Ok(Outcome::Rejected(Rejection::EmailTaken));
        }
        let password = hash_password(&signup.password)?;

        let user = match self
            .users
            .create(NewUser {
                user_name: signup.user_name,
                email: email.to_string(),
            })
            .await?
        {
            Outcome::Done(user) => user,
            Outcome::Rejected(rejection) => return Ok(Outcome::Rejected(rejection)),
        };

        let _: LoginRecord = self
            .backends
            .documents
            .insert(&LoginDraft {
                email: email.to_string(),
                password,
            })
            .await
            .map_err(ServiceError::from)?;
        info!(target = "snapshare::auth", user_id = %user.id, "Account registered");
        Ok(Outcome::Done(user))
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<Outcome<Session>, AuthError> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Ok(Outcome::Rejected(Rejection::InvalidInput));
        }

        let locked_key = CacheKey::LoginLocked(email.to_string());
        if self.backends.cache.get_text(&locked_key).await?.is_some() {
            return Ok(Outcome::Rejected(Rejection::AccountLocked));
        }

        let verified = match self.find_login(email).await? {
            Some(login) => verify_password(password, &login.password),
            None => false,
        };
        if !verified {
            return self.record_failure(email).await;
        }

        let Some(user) = self.users.find_by_email(email).await? else {
            return Ok(Outcome::Rejected(Rejection::InvalidCredentials));
        };
        self.backends
            .cache
            .delete(&CacheKey::LoginAttempts(email.to_string()))
            .await?;

        let access_token = self.issue_token(user.id)?;
        info!(target = "snapshare::auth", user_id = %user.id, "Session issued");
        Ok(Outcome::Done(Session { user, access_token }))
    }

    pub async fn logout(&self, token: &str) -> Result<(), AuthError> {
        self.backends
            .cache
            .set_text(
                &CacheKey::revoked_token(token),
                REVOKED_MARKER,
                self.policy.token_ttl,
            )
            .await?;
        Ok(())
    }

    /// Validates a session token, rejecting revoked ones.
    pub async fn authenticate(&self, token: &str) -> Result<Claims, AuthError> {
        if token.is_empty() {
            return Err(AuthError::MissingToken);
        }
        if self
            .backends
            .cache
            .get_text(&CacheKey::revoked_token(token))
            .await?
            .is_some()
        {
            return Err(AuthError::InvalidToken);
        }

        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.policy.jwt_secret.as_bytes()),
            &Validation::new(Algorithm::HS256),
        )
        .map(|data| data.claims)
        .map_err(|_| AuthError::InvalidToken)
    }

    pub fn issue_token(&self, user_id: Uuid) -> Result<String, AuthError> {
        let now = OffsetDateTime::now_utc().unix_timestamp();
        let claims = Claims {
            id: user_id,
            iat: now,
            exp: now + self.policy.token_ttl.as_secs() as i64,
        };
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.policy.jwt_secret.as_bytes()),
        )
        .map_err(|err| AuthError::Signing(err.to_string()))
    }

    async fn find_login(&self, email: &str) -> Result<Option<LoginRecord>, AuthError> {
        Ok(self
            .backends
            .documents
            .find_one(&Filter::eq(Field::Email, email))
            .await
            .map_err(ServiceError::from)?)
    }

    async fn record_failure(&self, email: &str) -> Result<Outcome<Session>, AuthError> {
        let attempts_key = CacheKey::LoginAttempts(email.to_string());
        let attempts = self
            .backends
            .cache
            .get_text(&attempts_key)
            .await?
            .and_then(|raw| raw.parse::<u32>().ok())
            .unwrap_or(0)
            + 1;

        if attempts >= self.policy.attempt_threshold {
            self.backends
                .cache
                .set_text(
                    &CacheKey::LoginLocked(email.to_string()),
                    LOCKED_MARKER,
                    self.policy.lock_duration,
                )
                .await?;
            self.backends.cache.delete(&attempts_key).await?;
            warn!(target = "snapshare::auth", attempts, "Account locked after failed logins");
            return Ok(Outcome::Rejected(Rejection::AccountLocked));
        }

        self.backends
            .cache
            .set_text(
                &attempts_key,
                &attempts.to_string(),
                self.policy.lock_duration,
            )
            .await?;
        Ok(Outcome::Rejected(Rejection::InvalidCredentials))
    }
}

fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| AuthError::Hash(err.to_string()))
}

fn verify_password(password: &str, stored: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}
