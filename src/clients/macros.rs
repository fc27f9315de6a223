/// Generates the lookup every client shares: fetch a snapshot by id, turning a
/// missing entity into `MarketError::NotFound`.
macro_rules! impl_client_methods {
    ($client_name:ident, $entity:ty, $entity_name_snake:ident) => {
        paste::paste! {
            impl $client_name {
                #[tracing::instrument(skip(self))]
                async fn [<fetch_ $entity_name_snake>](&self, id: &str) -> $crate::error::Result<$entity> {
                    tracing::debug!("Sending request");
                    self.inner.get(id.to_string()).await?.ok_or_else(|| {
                        $crate::error::MarketError::NotFound(format!(
                            "{} {}",
                            stringify!($entity_name_snake),
                            id
                        ))
                    })
                }
            }
        }
    };
}
