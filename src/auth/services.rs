use std::sync::Arc;

use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{AuthResponse, LoginRequest, PublicUser, RegisterRequest},
        jwt::JwtKeys,
        password::{hash_password, verify_password},
    },
    error::AuthError,
    users::UserStore,
};

const MIN_FULL_NAME_LEN: usize = 2;
const MIN_PASSWORD_LEN: usize = 6;

lazy_static! {
    static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    /// Verified against on unknown emails so a miss costs the same Argon2 work
    /// as a wrong password.
    static ref DUMMY_HASH: Option<String> = hash_password("not-a-real-account").ok();
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

fn check_email_and_password(email: &str, password: &str) -> Result<(), AuthError> {
    if !is_valid_email(email) {
        return Err(AuthError::InvalidInput("Invalid email format".into()));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AuthError::InvalidInput(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

/// Registration and login on top of an injected user store.
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    keys: JwtKeys,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserStore>, keys: JwtKeys) -> Self {
        Self { users, keys }
    }

    pub fn keys(&self) -> &JwtKeys {
        &self.keys
    }

    #[instrument(skip(self, req))]
    pub async fn register(&self, req: RegisterRequest) -> Result<AuthResponse, AuthError> {
        let full_name = req.full_name.trim();
        let email = req.email.trim();

        if full_name.is_empty() || email.is_empty() || req.password.is_empty() {
            return Err(AuthError::InvalidInput("All fields are required".into()));
        }
        if full_name.chars().count() < MIN_FULL_NAME_LEN {
            return Err(AuthError::InvalidInput(format!(
                "Full name must be at least {MIN_FULL_NAME_LEN} characters"
            )));
        }
        check_email_and_password(email, &req.password)?;

        // Cheap pre-check; the unique index still decides under concurrent inserts.
        if self.users.find_by_email(email).await?.is_some() {
            warn!(email, "email already registered");
            return Err(AuthError::Conflict);
        }

        let hash = hash_blocking(req.password).await?;

        let user = match self.users.create(full_name, email, &hash).await {
            Ok(u) => u,
            Err(e) => {
                warn!(error = %e, email, "create user failed");
                return Err(e.into());
            }
        };

        let token = self.keys.issue(user.id).map_err(AuthError::internal)?;

        info!(user_id = user.id, "user registered");
        Ok(AuthResponse {
            token,
            user: user.into(),
            message: "User registered successfully".into(),
        })
    }

    #[instrument(skip(self, req))]
    pub async fn login(&self, req: LoginRequest) -> Result<AuthResponse, AuthError> {
        let email = req.email.trim();

        if email.is_empty() || req.password.is_empty() {
            return Err(AuthError::InvalidInput(
                "Email and password are required".into(),
            ));
        }
        check_email_and_password(email, &req.password)?;

        let user = match self.users.find_by_email(email).await? {
            Some(u) => u,
            None => {
                if let Some(dummy) = DUMMY_HASH.as_ref() {
                    let _ = verify_blocking(dummy.clone(), req.password).await;
                }
                warn!(email, "login unknown email");
                return Err(AuthError::InvalidCredentials);
            }
        };

        let ok = verify_blocking(user.password_hash.clone(), req.password).await?;
        if !ok {
            warn!(user_id = user.id, "login invalid password");
            return Err(AuthError::InvalidCredentials);
        }

        let token = self.keys.issue(user.id).map_err(AuthError::internal)?;

        info!(user_id = user.id, "user logged in");
        Ok(AuthResponse {
            token,
            user: user.into(),
            message: "User logged in successfully".into(),
        })
    }

    /// Active user behind a verified token.
    #[instrument(skip(self))]
    pub async fn current_user(&self, user_id: i64) -> Result<PublicUser, AuthError> {
        match self.users.find_by_id(user_id).await? {
            Some(user) => Ok(user.into()),
            None => {
                warn!(user_id, "token subject not found");
                Err(AuthError::Unauthorized)
            }
        }
    }
}

// Argon2 is deliberately slow; keep it off the async workers.
async fn hash_blocking(password: String) -> Result<String, AuthError> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(AuthError::internal)?
        .map_err(AuthError::Internal)
}

async fn verify_blocking(hash: String, password: String) -> Result<bool, AuthError> {
    tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(AuthError::internal)?
        .map_err(AuthError::Internal)
}
