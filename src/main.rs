use chrono::{Duration, Utc};
use tracing::{error, info, Instrument};

use service_market::clients::NewPosting;
use service_market::domain::{ProviderProfile, SearchParams};
use service_market::{setup_tracing, MarketConfig, MarketError, MarketSystem};

#[tokio::main]
async fn main() -> Result<(), MarketError> {
    let config = MarketConfig::from_env();
    setup_tracing(&config);

    info!("Starting marketplace demo");
    let system = MarketSystem::new(&config);

    let mut events = system.subscribe();
    let watcher = tokio::spawn(async move {
        while let Ok(order) = events.recv().await {
            info!(order_id = %order.id, status = %order.status, "Lifecycle event");
        }
    });

    let span = tracing::info_span!("registration");
    let (provider, customer) = async {
        let provider = system
            .users
            .register("Paula", "paula@example.com", "s3cret-pass", "provider")
            .await?;
        system
            .users
            .update_provider_profile(
                &provider.id,
                ProviderProfile {
                    bio: "Ten years cleaning homes".into(),
                    phone: "+55 81 5555 0000".into(),
                    expertise: "deep cleaning".into(),
                    city: "Recife".into(),
                    district: "Boa Viagem".into(),
                },
            )
            .await?;
        let customer = system
            .users
            .register("Carla", "carla@example.com", "another-pass", "customer")
            .await?;
        Ok::<_, MarketError>((provider, customer))
    }
    .instrument(span)
    .await?;

    let posting = system
        .postings
        .create(
            &provider.id,
            NewPosting {
                title: "Deep cleaning".into(),
                description: "Kitchen, bathrooms and windows".into(),
                price: 2500,
                category: "cleaning".into(),
                city: "Recife".into(),
                district: "Boa Viagem".into(),
            },
        )
        .await?;

    let span = tracing::info_span!("order_lifecycle", posting_id = %posting.id);
    let lifecycle = async {
        let order = system
            .orders
            .request(&customer.id, &posting.id, &provider.id)
            .await?;
        system
            .orders
            .accept(&provider.id, &order.id, Utc::now() + Duration::days(2))
            .await?;
        system.orders.start(&provider.id, &order.id).await?;
        system.orders.complete(&provider.id, &order.id).await?;
        system
            .reviews
            .create(&customer.id, &order.id, 5, "Spotless, on time")
            .await?;

        // A second review for the same order is refused.
        if let Err(e) = system
            .reviews
            .create(&customer.id, &order.id, 4, "again")
            .await
        {
            info!(error = %e, "Duplicate review rejected");
        }
        Ok::<_, MarketError>(order.id)
    }
    .instrument(span)
    .await;

    match lifecycle {
        Ok(order_id) => info!(order_id = %order_id, "Order lifecycle completed"),
        Err(e) => error!(error = %e, "Order lifecycle failed"),
    }

    let rating = system.reviews.avg_for_provider(&provider.id).await?;
    info!(average = rating.average, count = rating.count, "Provider rating");

    let page = system
        .postings
        .search(&SearchParams {
            query: "deep+cleaning".into(),
            limit: Some(10),
            ..SearchParams::default()
        })
        .await?;
    for item in &page.items {
        info!(title = %item.title, price = item.price, avg = ?item.provider_avg, "Search hit");
    }

    system.shutdown().await?;
    watcher.abort();

    info!("Application completed successfully");
    Ok(())
}
