use crate::actor_framework::Entity;
use crate::domain::{checked_stars, Review, ReviewCreate, ReviewPatch};
use crate::error::MarketError;

fn check_stars(stars: i64) -> Result<u8, MarketError> {
    checked_stars(stars).ok_or_else(|| {
        MarketError::InvalidFields(format!("stars must be between 1 and 5, got {stars}"))
    })
}

impl Entity for Review {
    type Id = String;
    type CreateParams = ReviewCreate;
    type Patch = ReviewPatch;
    type Action = ();
    type ActionResult = ();
    type Error = MarketError;

    fn id(&self) -> &String {
        &self.order_id
    }

    /// Reviews are keyed by their order, so a second review for the same order
    /// is rejected by the store.
    fn natural_id(params: &ReviewCreate) -> Option<String> {
        Some(params.order_id.clone())
    }

    fn from_create_params(id: String, params: ReviewCreate) -> Result<Self, MarketError> {
        Ok(Self {
            order_id: id,
            client_id: params.client_id,
            provider_id: params.provider_id,
            stars: check_stars(params.stars)?,
            comment: params.comment.trim().to_string(),
            created_at: params.at,
            updated_at: params.at,
        })
    }

    /// Rewrites stars and comment.
    ///
    /// # Errors
    /// In this order: `Forbidden` for anyone but the author, `EditWindowOver` once
    /// `created_at + edit_window` has passed (the edge itself is still editable),
    /// `InvalidFields` for stars outside 1..=5.
    fn on_update(&mut self, patch: ReviewPatch) -> Result<(), MarketError> {
        if patch.client_id != self.client_id {
            return Err(MarketError::Forbidden(format!(
                "review {} belongs to another client",
                self.order_id
            )));
        }
        // A window reaching past the calendar never closes.
        let deadline = self.created_at.checked_add_signed(patch.edit_window);
        if deadline.is_some_and(|deadline| patch.at > deadline) {
            return Err(MarketError::EditWindowOver);
        }
        self.stars = check_stars(patch.stars)?;
        self.comment = patch.comment.trim().to_string();
        self.updated_at = patch.at;
        Ok(())
    }

    /// Reviews have no commands beyond create and edit.
    fn handle_action(&mut self, _action: ()) -> Result<(), MarketError> {
        Ok(())
    }
}
