use crate::actor_framework::Entity;
use crate::domain::{normalize_email, Role, User, UserCreate, UserPatch};
use crate::error::MarketError;

impl Entity for User {
    type Id = String;
    type CreateParams = UserCreate;
    type Patch = UserPatch;
    type Action = ();
    type ActionResult = ();
    type Error = MarketError;

    fn id(&self) -> &String {
        &self.id
    }

    /// Creates a new User from creation parameters.
    ///
    /// # Notes
    /// The email is stored normalized so the unique index ignores case and padding.
    fn from_create_params(id: String, params: UserCreate) -> Result<Self, MarketError> {
        Ok(Self {
            id,
            name: params.name.trim().to_string(),
            email: normalize_email(&params.email),
            password_hash: params.password_hash,
            role: params.role,
            provider: None,
            created_at: params.at,
            updated_at: params.at,
        })
    }

    fn unique_key(&self) -> Option<String> {
        Some(self.email.clone())
    }

    /// Replaces the provider profile.
    ///
    /// # Errors
    /// `Unauthorized` for customers, `Validation` when phone, city or district is blank.
    fn on_update(&mut self, patch: UserPatch) -> Result<(), MarketError> {
        if self.role != Role::Provider {
            return Err(MarketError::Unauthorized);
        }
        self.provider = Some(patch.provider.normalized()?);
        self.updated_at = patch.at;
        Ok(())
    }

    /// Users have no commands; profile changes go through `on_update`.
    fn handle_action(&mut self, _action: ()) -> Result<(), MarketError> {
        Ok(())
    }
}
