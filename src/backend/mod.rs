//! In-memory stand-in for the hosted backend.
//!
//! [`MockClient`] owns one [`RecordStore`] and one session slot. Every call
//! answers with a [`Response`] pair, the same shape the hosted query API
//! returns, so feature code does not care which one it talks to.

pub mod auth;
pub mod clock;
pub mod latency;
pub mod query;
pub mod storage;
pub mod store;

pub use auth::{Auth, AuthData, Session};
pub use clock::{Clock, ManualClock, SystemClock};
pub use latency::{Delay, Latency, MAX_SCALE};
pub use query::{Filter, OrderBy, Query};
pub use storage::{Bucket, FileStorage, MockStorage};
pub use store::{to_patch, Record, RecordStore, Table};

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{watch, RwLock};
use tracing::{debug, info};

use crate::config::MockConfig;
use crate::error::{BackendError, BackendResult, Response};

/// Handle to the mock backend. Clones share the same store and session.
#[derive(Clone)]
pub struct MockClient {
    store: Arc<RwLock<RecordStore>>,
    session: Arc<watch::Sender<Option<Session>>>,
    clock: Arc<dyn Clock>,
    latency: Latency,
    storage: MockStorage,
}

impl MockClient {
    pub fn new(config: &MockConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: &MockConfig, clock: Arc<dyn Clock>) -> Self {
        let store = if config.seed_demo_data {
            RecordStore::seeded(clock.now())
        } else {
            RecordStore::new()
        };
        info!(
            "Mock backend ready ({} products, {} properties, {} services)",
            store.len(Table::Products),
            store.len(Table::Properties),
            store.len(Table::Services)
        );
        let latency = config.latency();
        Self::from_parts(
            store,
            clock,
            latency,
            MockStorage::new(config.storage_base_url.clone(), latency),
        )
    }

    pub fn from_parts(
        store: RecordStore,
        clock: Arc<dyn Clock>,
        latency: Latency,
        storage: MockStorage,
    ) -> Self {
        let (session, _) = watch::channel(None);
        Self {
            store: Arc::new(RwLock::new(store)),
            session: Arc::new(session),
            clock,
            latency,
            storage,
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn latency(&self) -> Latency {
        self.latency
    }

    pub fn storage(&self) -> &MockStorage {
        &self.storage
    }

    pub fn auth(&self) -> Auth<'_> {
        Auth::new(self)
    }

    /// Copy of the current tables.
    pub async fn snapshot(&self) -> RecordStore {
        self.store.read().await.clone()
    }

    pub async fn select<T: Record>(&self, query: &Query) -> Response<Vec<T>> {
        Response::from_result(self.store.read().await.select(query))
    }

    pub async fn single<T: Record>(&self, query: &Query) -> Response<T> {
        Response::from_result(self.store.read().await.single(query))
    }

    pub async fn insert<T: Record>(&self, table: Table, record: T) -> Response<T> {
        let now = self.now();
        Response::from_result(self.store.write().await.insert(table, record, now))
    }

    pub async fn update<T: Record, P: Serialize>(&self, query: &Query, patch: &P) -> Response<T> {
        let now = self.now();
        let result = match to_patch(patch) {
            Ok(fields) => self.store.write().await.update(query, &fields, now),
            Err(e) => Err(e),
        };
        Response::from_result(result)
    }

    /// Number of rows removed.
    pub async fn delete<T: Record>(&self, query: &Query) -> Response<usize> {
        Response::from_result(self.store.write().await.delete::<T>(query))
    }

    pub async fn increment_views(&self, table: Table, id: &str) -> Response<u64> {
        info!("Incrementing views for {}:{}", table, id);
        Response::from_result(self.store.write().await.increment_views(table, id))
    }

    /// Stored procedures do not exist here; every call succeeds with no data.
    pub async fn rpc<P: Serialize>(&self, function: &str, params: &P) -> Response<()> {
        match serde_json::to_value(params) {
            Ok(params) => {
                debug!("rpc {}({}) ignored", function, params);
                Response::ok(())
            }
            Err(e) => Response::from_result(Err(e.into())),
        }
    }

    /// Privileged handle. The mock has no row-level rules, so this shares
    /// everything with `self`.
    pub fn admin(&self) -> MockClient {
        self.clone()
    }

    /// Id of the signed-in user.
    pub fn session_user_id(&self) -> BackendResult<String> {
        self.session
            .borrow()
            .as_ref()
            .map(|s| s.user.id.clone())
            .ok_or(BackendError::NotAuthenticated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Listing, ListingStatus};
    use serde_json::json;

    fn client() -> MockClient {
        MockClient::with_clock(&MockConfig::for_tests(), Arc::new(ManualClock::default()))
    }

    #[tokio::test]
    async fn test_clones_share_the_store() {
        let a = client();
        let b = a.clone();
        let response = a
            .delete::<Listing>(&Query::by_id(Table::Products, "1"))
            .await;
        assert_eq!(response.data, Some(1));

        let after = b.single::<Listing>(&Query::by_id(Table::Products, "1")).await;
        assert!(after.data.is_none());
        assert!(after.error.is_some());
    }

    #[tokio::test]
    async fn test_update_accepts_any_serializable_patch() {
        let client = client();
        let response: Response<Listing> = client
            .update(&Query::by_id(Table::Products, "2"), &json!({ "status": "sold" }))
            .await;
        assert_eq!(response.data.map(|l| l.status), Some(ListingStatus::Sold));
    }

    #[tokio::test]
    async fn test_non_object_patch_is_rejected() {
        let client = client();
        let response: Response<Listing> = client
            .update(&Query::by_id(Table::Products, "2"), &json!(["status"]))
            .await;
        assert!(response.error.is_some());
    }

    #[tokio::test]
    async fn test_unseeded_client_is_empty() {
        let config = MockConfig {
            seed_demo_data: false,
            ..MockConfig::for_tests()
        };
        let client = MockClient::new(&config);
        let snapshot = client.snapshot().await;
        assert!(snapshot.is_empty(Table::Products));
        assert!(snapshot.is_empty(Table::Profiles));
    }

    #[tokio::test]
    async fn test_rpc_is_a_silent_success() {
        let client = client();
        let response = client
            .rpc("increment_views", &json!({ "table": "products", "id": "1" }))
            .await;
        assert!(response.is_ok());

        let product = client
            .single::<Listing>(&Query::by_id(Table::Products, "1"))
            .await
            .into_result()
            .unwrap();
        assert_eq!(product.views, 125);
    }

    #[tokio::test]
    async fn test_admin_handle_sees_the_same_rows() {
        let client = client();
        client
            .delete::<Listing>(&Query::by_id(Table::Products, "3"))
            .await
            .into_result()
            .unwrap();
        let missing = client
            .admin()
            .single::<Listing>(&Query::by_id(Table::Products, "3"))
            .await;
        assert!(missing.error.is_some());
    }

    #[tokio::test]
    async fn test_no_session_means_not_authenticated() {
        assert!(matches!(
            client().session_user_id(),
            Err(BackendError::NotAuthenticated)
        ));
    }
}
