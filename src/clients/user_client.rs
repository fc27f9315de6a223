use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{info, instrument, warn};

use crate::actor_framework::ResourceClient;
use crate::domain::{normalize_email, ProviderProfile, PublicUser, Role, User, UserCreate, UserPatch};
use crate::error::{MarketError, Result};
use crate::ports::{PasswordHasher, ProviderDirectory};

const MIN_PASSWORD_LEN: usize = 8;

/// Identity service: registration, login and provider profiles.
#[derive(Clone)]
pub struct UserClient {
    inner: ResourceClient<User>,
    hasher: Arc<dyn PasswordHasher>,
    clock: Arc<dyn Clock>,
}

impl_client_methods!(UserClient, User, user);

impl UserClient {
    pub fn new(
        inner: ResourceClient<User>,
        hasher: Arc<dyn PasswordHasher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            inner,
            hasher,
            clock,
        }
    }

    /// Registers a new account.
    ///
    /// # Errors
    /// `Validation` for a blank name, an email without `@`, a password shorter
    /// than eight characters or an unknown role; `EmailTaken` when the
    /// normalized email is already registered.
    #[instrument(skip(self, name, password))]
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
        role: &str,
    ) -> Result<PublicUser> {
        if name.trim().is_empty() {
            return Err(MarketError::Validation("name is required".to_string()));
        }
        if !email.contains('@') {
            return Err(MarketError::Validation("email is invalid".to_string()));
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(MarketError::Validation(format!(
                "password must have at least {MIN_PASSWORD_LEN} characters"
            )));
        }
        let role: Role = role.parse()?;

        let params = UserCreate {
            name: name.to_string(),
            email: email.to_string(),
            password_hash: self.hasher.hash(password)?,
            role,
            at: self.clock.utc(),
        };
        let id = self.inner.create(params).await.map_err(|e| match e {
            MarketError::AlreadyExists(_) => MarketError::EmailTaken,
            other => other,
        })?;

        info!(user_id = %id, %role, "User registered");
        self.fetch_user(&id).await.map(PublicUser::from)
    }

    /// Checks credentials. Unknown email and wrong password fail the same way.
    #[instrument(skip(self, email, password))]
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<PublicUser> {
        let user = self.inner.find_by_key(normalize_email(email)).await?;
        match user {
            Some(user) if self.hasher.compare(&user.password_hash, password) => {
                info!(user_id = %user.id, "User authenticated");
                Ok(user.into())
            }
            _ => {
                warn!("Authentication failed");
                Err(MarketError::Unauthorized)
            }
        }
    }

    /// Replaces the provider profile of `user_id`.
    #[instrument(skip(self, profile))]
    pub async fn update_provider_profile(
        &self,
        user_id: &str,
        profile: ProviderProfile,
    ) -> Result<PublicUser> {
        let patch = UserPatch {
            provider: profile,
            at: self.clock.utc(),
        };
        let user = self.inner.update(user_id.to_string(), patch).await?;
        info!("Provider profile updated");
        Ok(user.into())
    }

    pub async fn get_user(&self, user_id: &str) -> Result<PublicUser> {
        self.fetch_user(user_id).await.map(PublicUser::from)
    }
}

#[async_trait]
impl ProviderDirectory for UserClient {
    async fn name_by_id(&self, provider_id: &str) -> Result<String> {
        self.fetch_user(provider_id).await.map(|user| user.name)
    }
}
