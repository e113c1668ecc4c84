//! Product, property and service listings with client-side search and sort.

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{info, warn};

use super::types::{ListingFilter, PriceRange, SortKey};
use crate::backend::{to_patch, Delay, MockClient, Query};
use crate::error::{BackendError, BackendResult};
use crate::models::{Listing, ListingDetails, ListingKind, ListingStatus};

pub const PRODUCT_CATEGORIES: [&str; 6] = [
    "Electrónicos",
    "Hogar y Jardín",
    "Moda y Belleza",
    "Deportes",
    "Libros y Música",
    "Otros",
];

/// Fields supplied by the seller when publishing.
#[derive(Debug, Clone, PartialEq)]
pub struct NewListing {
    pub title: String,
    pub description: String,
    pub price: u64,
    pub images: Vec<String>,
    pub location: String,
    pub featured: bool,
    pub details: ListingDetails,
}

/// Partial update; `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ListingPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ListingStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub featured: Option<bool>,
    /// Replaces every kind-specific field at once.
    #[serde(skip)]
    pub details: Option<ListingDetails>,
}

impl ListingPatch {
    fn fields(&self) -> BackendResult<Map<String, Value>> {
        let mut fields = to_patch(self)?;
        if let Some(details) = &self.details {
            fields.extend(to_patch(details)?);
        }
        Ok(fields)
    }
}

/// Apply search, category, price bucket and ordering to `listings`.
pub fn filter_listings(listings: &[Listing], filter: &ListingFilter) -> Vec<Listing> {
    let needle = filter.search.trim().to_lowercase();

    let mut filtered: Vec<Listing> = listings
        .iter()
        .filter(|l| {
            needle.is_empty()
                || l.title.to_lowercase().contains(&needle)
                || l.description.to_lowercase().contains(&needle)
                || l.location.to_lowercase().contains(&needle)
        })
        .filter(|l| match &filter.category {
            Some(category) => l.category() == category,
            None => true,
        })
        .filter(|l| match &filter.price_range {
            Some(range) => range.contains(l.price),
            None => true,
        })
        .cloned()
        .collect();

    match filter.sort {
        SortKey::PriceAsc => filtered.sort_by(|a, b| a.price.cmp(&b.price)),
        SortKey::PriceDesc => filtered.sort_by(|a, b| b.price.cmp(&a.price)),
        SortKey::CreatedAt => filtered.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
    }
    filtered
}

/// One listing table plus the view state the UI filters it with.
pub struct Catalog {
    client: MockClient,
    kind: ListingKind,
    listings: Vec<Listing>,
    filter: ListingFilter,
}

impl Catalog {
    pub fn new(client: MockClient, kind: ListingKind) -> Self {
        Self {
            client,
            kind,
            listings: Vec::new(),
            filter: ListingFilter::default(),
        }
    }

    pub fn products(client: MockClient) -> Self {
        Self::new(client, ListingKind::Product)
    }

    pub fn properties(client: MockClient) -> Self {
        Self::new(client, ListingKind::Property)
    }

    pub fn services(client: MockClient) -> Self {
        Self::new(client, ListingKind::Service)
    }

    pub fn kind(&self) -> ListingKind {
        self.kind
    }

    /// Everything loaded, in store order.
    pub fn listings(&self) -> &[Listing] {
        &self.listings
    }

    pub fn filter(&self) -> &ListingFilter {
        &self.filter
    }

    /// Recomputed on every call from the loaded listings.
    pub fn filtered(&self) -> Vec<Listing> {
        filter_listings(&self.listings, &self.filter)
    }

    /// Product categories are fixed; other kinds list what is loaded.
    pub fn categories(&self) -> Vec<String> {
        if self.kind == ListingKind::Product {
            return PRODUCT_CATEGORIES.iter().map(|c| c.to_string()).collect();
        }
        let mut seen: Vec<String> = self
            .listings
            .iter()
            .map(|l| l.category().to_string())
            .collect();
        seen.sort();
        seen.dedup();
        seen
    }

    pub fn search(&mut self, query: &str) {
        self.filter.search = query.to_string();
    }

    /// An empty category clears the filter.
    pub fn filter_by_category(&mut self, category: &str) {
        self.filter.category = (!category.is_empty()).then(|| category.to_string());
    }

    pub fn set_sort(&mut self, sort: SortKey) {
        self.filter.sort = sort;
    }

    pub fn set_price_range(&mut self, range: Option<PriceRange>) {
        self.filter.price_range = range;
    }

    pub async fn load(&mut self) -> BackendResult<&[Listing]> {
        self.client.latency().pause(Delay::LoadListings).await;
        let listings: Vec<Listing> = self
            .client
            .select(&Query::table(self.kind.table()))
            .await
            .into_result()?;
        info!("Loaded {} {:?} listings", listings.len(), self.kind);
        self.listings = listings;
        Ok(self.listings.as_slice())
    }

    pub async fn get(&self, id: &str) -> BackendResult<Listing> {
        self.client.latency().pause(Delay::Fetch).await;
        self.client
            .single(&Query::by_id(self.kind.table(), id))
            .await
            .into_result()
    }

    /// Publish as the signed-in user; starts active with no views.
    pub async fn create(&mut self, new: NewListing) -> BackendResult<Listing> {
        if new.details.kind() != self.kind {
            return Err(BackendError::Validation(format!(
                "Se esperaba un anuncio de tipo {:?}",
                self.kind
            )));
        }
        if new.title.trim().is_empty() {
            return Err(BackendError::Validation(
                "El título es obligatorio".to_string(),
            ));
        }
        let user_id = self.client.session_user_id()?;

        self.client.latency().pause(Delay::Create).await;
        let now = self.client.now();
        let draft = Listing {
            id: String::new(),
            title: new.title.trim().to_string(),
            description: new.description,
            price: new.price,
            images: new.images,
            location: new.location,
            user_id,
            status: ListingStatus::Active,
            featured: new.featured,
            views: 0,
            created_at: now,
            updated_at: now,
            details: new.details,
        };
        let listing = self
            .client
            .insert(self.kind.table(), draft)
            .await
            .into_result()?;
        info!("Published {:?} {} ({})", self.kind, listing.id, listing.title);
        self.listings.insert(0, listing.clone());
        Ok(listing)
    }

    pub async fn update(&mut self, id: &str, patch: ListingPatch) -> BackendResult<Listing> {
        if let Some(details) = &patch.details {
            if details.kind() != self.kind {
                return Err(BackendError::Validation(format!(
                    "Se esperaba un anuncio de tipo {:?}",
                    self.kind
                )));
            }
        }
        let fields = patch.fields()?;

        self.client.latency().pause(Delay::Update).await;
        let listing: Listing = self
            .client
            .update(&Query::by_id(self.kind.table(), id), &fields)
            .await
            .into_result()?;
        self.replace_cached(&listing);
        Ok(listing)
    }

    pub async fn delete(&mut self, id: &str) -> BackendResult<()> {
        self.client.latency().pause(Delay::Delete).await;
        let removed = self
            .client
            .delete::<Listing>(&Query::by_id(self.kind.table(), id))
            .await
            .into_result();
        match removed {
            Ok(_) => {
                self.listings.retain(|l| l.id != id);
                Ok(())
            }
            Err(e) => {
                warn!("Could not delete {:?} {}: {}", self.kind, id, e);
                Err(e)
            }
        }
    }

    /// Count one view of a listing; returns the new total.
    pub async fn record_view(&mut self, id: &str) -> BackendResult<u64> {
        let views = self
            .client
            .increment_views(self.kind.table(), id)
            .await
            .into_result()?;
        if let Some(cached) = self.listings.iter_mut().find(|l| l.id == id) {
            cached.views = views;
        }
        Ok(views)
    }

    fn replace_cached(&mut self, listing: &Listing) {
        match self.listings.iter_mut().find(|l| l.id == listing.id) {
            Some(cached) => *cached = listing.clone(),
            None => self.listings.insert(0, listing.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{ManualClock, Table};
    use crate::config::MockConfig;
    use crate::models::seed::DEMO_EMAIL;
    use crate::models::Condition;
    use chrono::Duration;
    use std::sync::Arc;

    async fn signed_in() -> (MockClient, ManualClock) {
        let clock = ManualClock::default();
        let client = MockClient::with_clock(&MockConfig::for_tests(), Arc::new(clock.clone()));
        client.auth().sign_in_with_password(DEMO_EMAIL, "x").await;
        (client, clock)
    }

    fn product(title: &str, price: u64) -> NewListing {
        NewListing {
            title: title.to_string(),
            description: "Descripción".to_string(),
            price,
            images: vec![],
            location: "Bogotá".to_string(),
            featured: false,
            details: ListingDetails::Product {
                category: "Deportes".to_string(),
                condition: Condition::Usado,
            },
        }
    }

    #[tokio::test]
    async fn test_load_reads_the_kind_table() {
        let (client, _) = signed_in().await;
        let mut products = Catalog::products(client.clone());
        let mut services = Catalog::services(client);
        assert_eq!(products.load().await.unwrap().len(), 3);
        assert_eq!(services.load().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_create_sets_owner_status_and_views() {
        let (client, _) = signed_in().await;
        let mut catalog = Catalog::products(client);
        let listing = catalog.create(product("Bicicleta", 900_000)).await.unwrap();

        assert_eq!(listing.user_id, "1");
        assert_eq!(listing.status, ListingStatus::Active);
        assert_eq!(listing.views, 0);
        assert_eq!(catalog.listings()[0].id, listing.id);
    }

    #[tokio::test]
    async fn test_create_rejects_wrong_kind() {
        let (client, _) = signed_in().await;
        let mut catalog = Catalog::services(client.clone());
        let result = catalog.create(product("Bicicleta", 1)).await;
        assert!(matches!(result, Err(BackendError::Validation(_))));
        assert_eq!(client.snapshot().await.len(Table::Services), 1);
    }

    #[tokio::test]
    async fn test_create_requires_session() {
        let client = MockClient::new(&MockConfig::for_tests());
        let mut catalog = Catalog::products(client);
        let result = catalog.create(product("Bicicleta", 1)).await;
        assert!(matches!(result, Err(BackendError::NotAuthenticated)));
    }

    #[tokio::test]
    async fn test_newest_first_by_default() {
        let (client, clock) = signed_in().await;
        let mut catalog = Catalog::products(client);
        catalog.load().await.unwrap();
        clock.advance(Duration::seconds(1));
        let newest = catalog.create(product("Balón", 80_000)).await.unwrap();

        assert_eq!(catalog.filtered()[0].id, newest.id);
    }

    #[tokio::test]
    async fn test_search_and_category_filter() {
        let (client, _) = signed_in().await;
        let mut catalog = Catalog::products(client);
        catalog.load().await.unwrap();

        catalog.search("MEDELLÍN");
        let hits = catalog.filtered();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "MacBook Air M2 2022");

        catalog.search("");
        catalog.filter_by_category("Deportes");
        assert!(catalog.filtered().is_empty());
        catalog.filter_by_category("");
        assert_eq!(catalog.filtered().len(), 3);
    }

    #[tokio::test]
    async fn test_update_patches_details() {
        let (client, _) = signed_in().await;
        let mut catalog = Catalog::products(client);
        let patch = ListingPatch {
            details: Some(ListingDetails::Product {
                category: "Otros".to_string(),
                condition: Condition::Reacondicionado,
            }),
            ..ListingPatch::default()
        };
        let listing = catalog.update("1", patch).await.unwrap();
        assert_eq!(listing.category(), "Otros");
        assert_eq!(listing.price, 4_500_000);
    }

    #[tokio::test]
    async fn test_delete_missing_is_not_found() {
        let (client, _) = signed_in().await;
        let mut catalog = Catalog::properties(client);
        assert!(catalog.delete("1").await.is_ok());
        assert!(matches!(
            catalog.delete("1").await,
            Err(BackendError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_record_view_updates_cache() {
        let (client, _) = signed_in().await;
        let mut catalog = Catalog::products(client);
        catalog.load().await.unwrap();
        assert_eq!(catalog.record_view("2").await.unwrap(), 90);
        assert_eq!(catalog.listings()[1].views, 90);
    }

    #[tokio::test(start_paused = true)]
    async fn test_listing_load_waits_half_a_second() {
        let clock = Arc::new(ManualClock::default());
        let client = MockClient::with_clock(&MockConfig::default(), clock);
        let mut catalog = Catalog::products(client);
        let start = tokio::time::Instant::now();
        catalog.load().await.unwrap();
        assert!(start.elapsed() >= std::time::Duration::from_millis(500));
    }

    #[tokio::test]
    async fn test_property_categories_come_from_listings() {
        let (client, _) = signed_in().await;
        let mut catalog = Catalog::properties(client);
        catalog.load().await.unwrap();
        assert_eq!(catalog.categories(), vec!["apartamento".to_string()]);
    }
}
