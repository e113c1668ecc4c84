use kroma_mock::backend::FileStorage;
use kroma_mock::features::{NewMessage, NewReport, PriceRange, SortKey};
use kroma_mock::notify::{report, TracingNotifier};
use kroma_mock::{
    AuthState, Bucket, Catalog, ConnectionStatus, Favorites, ListingKind, ListingRef, Messages,
    MockClient, MockConfig, Notice, Notifier, Operation, Reports,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("🛒 Kroma - local mock backend");
    info!("==========================================");

    let config = MockConfig::from_env();
    let client = MockClient::new(&config);
    let notifier = TracingNotifier;

    let mut connection = ConnectionStatus::new(client.latency());
    let ready = connection.initialize_database().await;
    report(&notifier, Operation::InitializeDatabase, ready)?;

    let mut auth = AuthState::new(client.clone(), &config);
    if let Some(user) = auth.initialize().await? {
        notifier.notify(Notice::info(format!(
            "Sesión demo: {} ({:?})",
            user.full_name, user.badge
        )));
    }

    // Browse products
    let mut products = Catalog::products(client.clone());
    let loaded = products.load().await.map(|l| l.len());
    report(&notifier, Operation::LoadListings(ListingKind::Product), loaded)?;
    products.set_sort(SortKey::PriceAsc);
    products.set_price_range(Some(PriceRange::Between {
        min: 1_000_000,
        max: 5_000_000,
    }));

    let filtered = products.filtered();
    info!("\n✅ {} products between 1M and 5M\n", filtered.len());
    for (i, product) in filtered.iter().enumerate() {
        println!("{}. {} ({} COP)", i + 1, product.title, product.price);
        println!("   {} · {}", product.category(), product.location);
        println!("   ID: {}  Views: {}", product.id, product.views);
        println!();
    }

    if let Some(first) = filtered.first() {
        let views = products.record_view(&first.id).await?;
        info!("👀 {} now has {} views", first.title, views);

        let url = client
            .storage()
            .upload(Bucket::ProductImages, &format!("{}/cover.jpg", first.id), b"demo")
            .await;
        report(&notifier, Operation::UploadFile, url)?;

        let mut favorites = Favorites::new(client.clone());
        let saved = favorites.add(ListingRef::product(&first.id)).await;
        report(&notifier, Operation::AddFavorite, saved)?;

        let mut reports = Reports::new(client.clone());
        let filed = reports
            .create(NewReport {
                listing: Some(ListingRef::product(&first.id)),
                reason: "precio sospechoso".to_string(),
                ..NewReport::default()
            })
            .await;
        report(&notifier, Operation::CreateReport, filed)?;
        info!("🚩 {} pending reports", reports.pending().len());
    }

    // Messaging
    let mut messages = Messages::new(client.clone());
    let empty = messages
        .send(NewMessage {
            recipient_id: "2".to_string(),
            content: "   ".to_string(),
            ..NewMessage::default()
        })
        .await;
    // Expected to be rejected; the notice shows why.
    let _ = report(&notifier, Operation::SendMessage, empty);

    let sent = messages
        .send(NewMessage {
            recipient_id: "2".to_string(),
            content: "Hola, ¿sigue disponible?".to_string(),
            listing: Some(ListingRef::product("1")),
            ..NewMessage::default()
        })
        .await;
    report(&notifier, Operation::SendMessage, sent)?;
    info!(
        "📬 {} sent, {} unread in inbox",
        messages.sent().len(),
        messages.unread_count()
    );

    let snapshot = serde_json::to_string_pretty(&products.filtered())?;
    println!("{snapshot}");

    report(&notifier, Operation::SignOut, auth.sign_out().await)?;

    Ok(())
}
