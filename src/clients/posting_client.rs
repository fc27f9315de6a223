use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{debug, info, instrument, warn};

use crate::actor_framework::ResourceClient;
use crate::domain::{
    Posting, PostingAction, PostingCreate, PostingFields, PostingPatch, SearchPage, SearchParams,
};
use crate::error::{MarketError, Result};
use crate::posting_actor::search;
use crate::ports::{PostingCatalog, ProviderDirectory, Ratings};

/// Everything a provider supplies to publish a posting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewPosting {
    pub title: String,
    pub description: String,
    pub price: i64,
    pub category: String,
    pub city: String,
    pub district: String,
}

/// Posting service: publishing, ownership-checked edits, public reads and search.
#[derive(Clone)]
pub struct PostingClient {
    inner: ResourceClient<Posting>,
    directory: Arc<dyn ProviderDirectory>,
    ratings: Arc<dyn Ratings>,
    clock: Arc<dyn Clock>,
}

impl_client_methods!(PostingClient, Posting, posting);

impl PostingClient {
    pub fn new(
        inner: ResourceClient<Posting>,
        directory: Arc<dyn ProviderDirectory>,
        ratings: Arc<dyn Ratings>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            inner,
            directory,
            ratings,
            clock,
        }
    }

    /// Publishes a posting for `provider_id`.
    ///
    /// An unknown provider cannot publish, so a failed directory lookup is
    /// reported as `InvalidFields` like any other bad input.
    #[instrument(skip(self, posting), fields(title = %posting.title, price = posting.price))]
    pub async fn create(&self, provider_id: &str, posting: NewPosting) -> Result<Posting> {
        let provider_name = self.directory.name_by_id(provider_id).await.map_err(|e| {
            warn!(error = %e, "Provider lookup failed");
            MarketError::InvalidFields(format!("unknown provider {provider_id}"))
        })?;

        let params = PostingCreate {
            provider_id: provider_id.to_string(),
            provider_name,
            title: posting.title,
            description: posting.description,
            price: posting.price,
            category: posting.category,
            city: posting.city,
            district: posting.district,
            at: self.clock.utc(),
        };
        let id = self.inner.create(params).await?;
        info!(posting_id = %id, "Posting created");
        self.fetch_posting(&id).await
    }

    /// Applies the fields present in `fields`; only the owner may do so.
    #[instrument(skip(self, fields))]
    pub async fn update(
        &self,
        provider_id: &str,
        posting_id: &str,
        fields: PostingFields,
    ) -> Result<Posting> {
        let patch = PostingPatch {
            provider_id: provider_id.to_string(),
            fields,
            at: self.clock.utc(),
        };
        let posting = self.inner.update(posting_id.to_string(), patch).await?;
        info!("Posting updated");
        Ok(posting)
    }

    #[instrument(skip(self))]
    pub async fn archive(&self, provider_id: &str, posting_id: &str) -> Result<()> {
        let action = PostingAction::Archive {
            provider_id: provider_id.to_string(),
            at: self.clock.utc(),
        };
        self.inner
            .perform_action(posting_id.to_string(), action)
            .await?;
        info!("Posting archived");
        Ok(())
    }

    /// Archived postings are invisible here and report `NotFound`.
    #[instrument(skip(self))]
    pub async fn get_public(&self, posting_id: &str) -> Result<Posting> {
        let posting = self.fetch_posting(posting_id).await?;
        if posting.archived {
            return Err(MarketError::NotFound(format!("posting {posting_id}")));
        }
        let mut enriched = vec![posting];
        self.enrich(&mut enriched).await;
        enriched
            .pop()
            .ok_or_else(|| MarketError::NotFound(format!("posting {posting_id}")))
    }

    /// Every posting owned by `provider_id`, archived ones included.
    #[instrument(skip(self))]
    pub async fn list_mine(&self, provider_id: &str) -> Result<Vec<Posting>> {
        let owner = provider_id.to_string();
        let mut postings = self
            .inner
            .list(move |p: &Posting| p.provider_id == owner)
            .await?;
        self.enrich(&mut postings).await;
        Ok(postings)
    }

    #[instrument(skip(self))]
    pub async fn list_public(&self) -> Result<Vec<Posting>> {
        let mut postings = self.inner.list(|p: &Posting| !p.archived).await?;
        self.enrich(&mut postings).await;
        Ok(postings)
    }

    /// Filters, ranks and pages the live postings; only the page is enriched.
    #[instrument(skip(self, params), fields(query = %params.query, sort = %params.sort))]
    pub async fn search(&self, params: &SearchParams) -> Result<SearchPage> {
        let live = self.inner.list(|p: &Posting| !p.archived).await?;
        let mut page = search::rank(live, params);
        self.enrich(&mut page.items).await;
        debug!(
            returned = page.items.len(),
            next_offset = ?page.next_offset,
            "Search complete"
        );
        Ok(page)
    }

    /// Attaches each provider's current average when it is positive.
    ///
    /// A failing ratings lookup leaves the posting unenriched.
    async fn enrich(&self, postings: &mut [Posting]) {
        let mut averages: HashMap<String, Option<f64>> = HashMap::new();
        for posting in postings.iter_mut() {
            if !averages.contains_key(&posting.provider_id) {
                let average = match self.ratings.avg_for_provider(&posting.provider_id).await {
                    Ok(rating) if rating.average > 0.0 => Some(rating.average),
                    Ok(_) => None,
                    Err(e) => {
                        warn!(provider_id = %posting.provider_id, error = %e, "Ratings lookup failed");
                        None
                    }
                };
                averages.insert(posting.provider_id.clone(), average);
            }
            posting.provider_avg = averages.get(&posting.provider_id).copied().flatten();
        }
    }
}

#[async_trait]
impl PostingCatalog for PostingClient {
    async fn is_offered_by(&self, posting_id: &str, provider_id: &str) -> Result<bool> {
        let posting = self.inner.get(posting_id.to_string()).await?;
        Ok(posting.is_some_and(|p| !p.archived && p.provider_id == provider_id))
    }
}
