//! Saved listings of the signed-in user.
//!
//! Adding the same listing twice stores two favorites; membership checks
//! only ask whether any exists.

use tracing::info;

use crate::backend::{Delay, MockClient, Query, Table};
use crate::error::{BackendError, BackendResult};
use crate::models::{Favorite, ListingKind, ListingRef};

pub struct Favorites {
    client: MockClient,
    favorites: Vec<Favorite>,
}

impl Favorites {
    pub fn new(client: MockClient) -> Self {
        Self {
            client,
            favorites: Vec::new(),
        }
    }

    pub fn favorites(&self) -> &[Favorite] {
        &self.favorites
    }

    pub async fn load(&mut self) -> BackendResult<&[Favorite]> {
        let user_id = self.client.session_user_id()?;
        self.client.latency().pause(Delay::Load).await;
        self.favorites = self
            .client
            .select(&Query::table(Table::Favorites).eq("user_id", user_id))
            .await
            .into_result()?;
        Ok(self.favorites.as_slice())
    }

    pub async fn add(&mut self, target: ListingRef) -> BackendResult<Favorite> {
        let user_id = self.client.session_user_id()?;
        let draft = Favorite {
            id: String::new(),
            user_id,
            target,
            created_at: self.client.now(),
        };
        let favorite = self
            .client
            .insert(Table::Favorites, draft)
            .await
            .into_result()?;
        info!("Favorite {} added for {:?}", favorite.id, favorite.target);
        self.favorites.insert(0, favorite.clone());
        Ok(favorite)
    }

    /// Only the owner's favorites can be removed.
    pub async fn remove(&mut self, favorite_id: &str) -> BackendResult<()> {
        let user_id = self.client.session_user_id()?;
        let query = Query::by_id(Table::Favorites, favorite_id).eq("user_id", user_id);
        self.client
            .delete::<Favorite>(&query)
            .await
            .into_result()
            .map_err(|e| match e {
                BackendError::NotFound(_) => {
                    BackendError::NotFound("Favorito no encontrado".to_string())
                }
                other => other,
            })?;
        self.favorites.retain(|f| f.id != favorite_id);
        Ok(())
    }

    /// Asks the store, not the loaded list. False when signed out.
    pub async fn is_favorite(&self, kind: ListingKind, id: &str) -> BackendResult<bool> {
        let Ok(user_id) = self.client.session_user_id() else {
            return Ok(false);
        };
        let target = serde_json::to_value(ListingRef {
            kind,
            id: id.to_string(),
        })?;
        let query = Query::table(Table::Favorites)
            .eq("user_id", user_id)
            .eq("target", target)
            .limit(1);
        let hits: Vec<Favorite> = self.client.select(&query).await.into_result()?;
        Ok(!hits.is_empty())
    }
}
