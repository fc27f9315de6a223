use crate::actor_framework::Entity;
use crate::domain::{Posting, PostingAction, PostingCreate, PostingFields, PostingPatch};
use crate::error::MarketError;

fn required(value: &str, field: &str) -> Result<String, MarketError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(MarketError::InvalidFields(format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}

fn positive_price(price: i64) -> Result<i64, MarketError> {
    if price <= 0 {
        return Err(MarketError::InvalidFields("price must be > 0".to_string()));
    }
    Ok(price)
}

impl Posting {
    fn ensure_owner(&self, provider_id: &str) -> Result<(), MarketError> {
        if self.provider_id != provider_id {
            return Err(MarketError::Forbidden(format!(
                "posting {} belongs to another provider",
                self.id
            )));
        }
        Ok(())
    }

    fn apply(&mut self, fields: PostingFields) -> Result<(), MarketError> {
        let PostingFields {
            title,
            description,
            price,
            category,
            city,
            district,
        } = fields;

        // Validate everything first so a bad field rejects the whole patch.
        let title = title.as_deref().map(|v| required(v, "title")).transpose()?;
        let description = description
            .as_deref()
            .map(|v| required(v, "description"))
            .transpose()?;
        let category = category.as_deref().map(|v| required(v, "category")).transpose()?;
        let city = city.as_deref().map(|v| required(v, "city")).transpose()?;
        let district = district.as_deref().map(|v| required(v, "district")).transpose()?;
        let price = price.map(positive_price).transpose()?;

        if let Some(title) = title {
            self.title = title;
        }
        if let Some(description) = description {
            self.description = description;
        }
        if let Some(category) = category {
            self.category = category;
        }
        if let Some(city) = city {
            self.city = city;
        }
        if let Some(district) = district {
            self.district = district;
        }
        if let Some(price) = price {
            self.price = price;
        }
        Ok(())
    }
}

impl Entity for Posting {
    type Id = String;
    type CreateParams = PostingCreate;
    type Patch = PostingPatch;
    type Action = PostingAction;
    type ActionResult = Posting;
    type Error = MarketError;

    fn id(&self) -> &String {
        &self.id
    }

    fn from_create_params(id: String, params: PostingCreate) -> Result<Self, MarketError> {
        Ok(Self {
            id,
            provider_id: params.provider_id,
            provider_name: params.provider_name,
            title: required(&params.title, "title")?,
            description: required(&params.description, "description")?,
            price: positive_price(params.price)?,
            category: required(&params.category, "category")?,
            city: required(&params.city, "city")?,
            district: required(&params.district, "district")?,
            archived: false,
            created_at: params.at,
            updated_at: params.at,
            provider_avg: None,
        })
    }

    /// Applies a partial update on behalf of the owning provider.
    fn on_update(&mut self, patch: PostingPatch) -> Result<(), MarketError> {
        self.ensure_owner(&patch.provider_id)?;
        self.apply(patch.fields)?;
        self.updated_at = patch.at;
        Ok(())
    }

    fn handle_action(&mut self, action: PostingAction) -> Result<Posting, MarketError> {
        match action {
            PostingAction::Archive { provider_id, at } => {
                self.ensure_owner(&provider_id)?;
                self.archived = true;
                self.updated_at = at;
                Ok(self.clone())
            }
        }
    }
}
