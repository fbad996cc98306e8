use std::sync::Arc;

use axum::extract::FromRef;
use time::Duration;

use crate::{
    auth::{jwt::JwtKeys, services::AuthService},
    config::AppConfig,
    users::UserStore,
};

#[derive(Clone)]
pub struct AppState {
    pub auth: AuthService,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(config: AppConfig, users: Arc<dyn UserStore>) -> anyhow::Result<Self> {
        let keys = JwtKeys::new(
            &config.jwt.secret,
            Duration::minutes(config.jwt.ttl_minutes),
        )?;
        Ok(Self {
            auth: AuthService::new(users, keys),
            config: Arc::new(config),
        })
    }

    #[cfg(test)]
    pub fn fake(users: Arc<dyn UserStore>) -> Self {
        let config = AppConfig::from_lookup(|key| {
            let v = match key {
                "DB_USER" => "test",
                "DB_PASSWORD" => "test",
                "DB_NAME" => "test",
                "JWT_SECRET" => "test-secret",
                _ => return None,
            };
            Some(v.to_string())
        })
        .expect("test config");
        Self::new(config, users).expect("test state")
    }
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        state.auth.keys().clone()
    }
}
