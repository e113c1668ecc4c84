//! In-memory tables and the operations the query shim runs against them.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use tracing::debug;

use super::query::{resolve, Query};
use crate::error::{BackendError, BackendResult};
use crate::models::seed;
use crate::models::{Favorite, Listing, Message, Report, User};

/// Named tables of the mock backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Table {
    Profiles,
    Products,
    Properties,
    Services,
    Favorites,
    Messages,
    Reports,
}

impl Table {
    pub const fn as_str(self) -> &'static str {
        match self {
            Table::Profiles => "profiles",
            Table::Products => "products",
            Table::Properties => "properties",
            Table::Services => "services",
            Table::Favorites => "favorites",
            Table::Messages => "messages",
            Table::Reports => "reports",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A row type that lives in one or more tables of [`RecordStore`].
pub trait Record: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    const NAME: &'static str;

    fn id(&self) -> &str;

    /// Assign the generated id and creation timestamps before insert.
    fn stamp(&mut self, id: String, now: DateTime<Utc>);

    /// Refresh the update timestamp, for records that carry one.
    fn touch(&mut self, _now: DateTime<Utc>) {}

    /// Whether this particular row may be stored in `table`.
    fn fits(&self, _table: Table) -> bool {
        true
    }

    fn rows(store: &RecordStore, table: Table) -> Option<&Vec<Self>>;

    fn rows_mut(store: &mut RecordStore, table: Table) -> Option<&mut Vec<Self>>;
}

impl Record for User {
    const NAME: &'static str = "profile";

    fn id(&self) -> &str {
        &self.id
    }

    fn stamp(&mut self, id: String, now: DateTime<Utc>) {
        self.id = id;
        self.created_at = now;
        self.updated_at = now;
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }

    fn rows(store: &RecordStore, table: Table) -> Option<&Vec<Self>> {
        (table == Table::Profiles).then_some(&store.profiles)
    }

    fn rows_mut(store: &mut RecordStore, table: Table) -> Option<&mut Vec<Self>> {
        (table == Table::Profiles).then_some(&mut store.profiles)
    }
}

impl Record for Listing {
    const NAME: &'static str = "listing";

    fn id(&self) -> &str {
        &self.id
    }

    fn stamp(&mut self, id: String, now: DateTime<Utc>) {
        self.id = id;
        self.created_at = now;
        self.updated_at = now;
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }

    fn fits(&self, table: Table) -> bool {
        self.kind().table() == table
    }

    fn rows(store: &RecordStore, table: Table) -> Option<&Vec<Self>> {
        match table {
            Table::Products => Some(&store.products),
            Table::Properties => Some(&store.properties),
            Table::Services => Some(&store.services),
            _ => None,
        }
    }

    fn rows_mut(store: &mut RecordStore, table: Table) -> Option<&mut Vec<Self>> {
        match table {
            Table::Products => Some(&mut store.products),
            Table::Properties => Some(&mut store.properties),
            Table::Services => Some(&mut store.services),
            _ => None,
        }
    }
}

impl Record for Message {
    const NAME: &'static str = "message";

    fn id(&self) -> &str {
        &self.id
    }

    fn stamp(&mut self, id: String, now: DateTime<Utc>) {
        self.id = id;
        self.created_at = now;
    }

    fn rows(store: &RecordStore, table: Table) -> Option<&Vec<Self>> {
        (table == Table::Messages).then_some(&store.messages)
    }

    fn rows_mut(store: &mut RecordStore, table: Table) -> Option<&mut Vec<Self>> {
        (table == Table::Messages).then_some(&mut store.messages)
    }
}

impl Record for Favorite {
    const NAME: &'static str = "favorite";

    fn id(&self) -> &str {
        &self.id
    }

    fn stamp(&mut self, id: String, now: DateTime<Utc>) {
        self.id = id;
        self.created_at = now;
    }

    fn rows(store: &RecordStore, table: Table) -> Option<&Vec<Self>> {
        (table == Table::Favorites).then_some(&store.favorites)
    }

    fn rows_mut(store: &mut RecordStore, table: Table) -> Option<&mut Vec<Self>> {
        (table == Table::Favorites).then_some(&mut store.favorites)
    }
}

impl Record for Report {
    const NAME: &'static str = "report";

    fn id(&self) -> &str {
        &self.id
    }

    fn stamp(&mut self, id: String, now: DateTime<Utc>) {
        self.id = id;
        self.created_at = now;
    }

    fn rows(store: &RecordStore, table: Table) -> Option<&Vec<Self>> {
        (table == Table::Reports).then_some(&store.reports)
    }

    fn rows_mut(store: &mut RecordStore, table: Table) -> Option<&mut Vec<Self>> {
        (table == Table::Reports).then_some(&mut store.reports)
    }
}

/// Hands out millisecond-timestamp ids, bumping past the last one on collision.
#[derive(Debug, Clone, Default)]
struct IdGenerator {
    last: i64,
}

impl IdGenerator {
    fn next(&mut self, now: DateTime<Utc>) -> String {
        let millis = now.timestamp_millis();
        self.last = if millis > self.last { millis } else { self.last + 1 };
        self.last.to_string()
    }
}

/// Every table of the mock backend, owned by whoever constructs it.
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    profiles: Vec<User>,
    products: Vec<Listing>,
    properties: Vec<Listing>,
    services: Vec<Listing>,
    favorites: Vec<Favorite>,
    messages: Vec<Message>,
    reports: Vec<Report>,
    ids: IdGenerator,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-filled with the demo profile and listings.
    ///
    /// Generated ids always land above the seeded ones.
    pub fn seeded(now: DateTime<Utc>) -> Self {
        let mut store = Self {
            profiles: vec![seed::demo_user(now)],
            products: seed::demo_products(now),
            properties: seed::demo_properties(now),
            services: seed::demo_services(now),
            ..Self::default()
        };
        store.ids.last = store.highest_numeric_id();
        store
    }

    fn highest_numeric_id(&self) -> i64 {
        let listings = self.products.iter().chain(&self.properties).chain(&self.services);
        self.profiles
            .iter()
            .map(|u| u.id.as_str())
            .chain(listings.map(|l| l.id.as_str()))
            .filter_map(|id| id.parse::<i64>().ok())
            .max()
            .unwrap_or(0)
    }

    pub fn len(&self, table: Table) -> usize {
        match table {
            Table::Profiles => self.profiles.len(),
            Table::Products => self.products.len(),
            Table::Properties => self.properties.len(),
            Table::Services => self.services.len(),
            Table::Favorites => self.favorites.len(),
            Table::Messages => self.messages.len(),
            Table::Reports => self.reports.len(),
        }
    }

    pub fn is_empty(&self, table: Table) -> bool {
        self.len(table) == 0
    }

    pub fn rows<T: Record>(&self, table: Table) -> BackendResult<&[T]> {
        T::rows(self, table)
            .map(Vec::as_slice)
            .ok_or(BackendError::TableMismatch {
                table,
                record: T::NAME,
            })
    }

    fn rows_mut<T: Record>(&mut self, table: Table) -> BackendResult<&mut Vec<T>> {
        T::rows_mut(self, table).ok_or(BackendError::TableMismatch {
            table,
            record: T::NAME,
        })
    }

    pub fn select<T: Record>(&self, query: &Query) -> BackendResult<Vec<T>> {
        let rows = self.rows::<T>(query.table)?;
        let hits = resolve(rows, query)?;
        Ok(hits.into_iter().map(|i| rows[i].clone()).collect())
    }

    /// First row matching `query`, or not-found.
    pub fn single<T: Record>(&self, query: &Query) -> BackendResult<T> {
        self.select::<T>(&query.clone().limit(1))?
            .into_iter()
            .next()
            .ok_or_else(|| not_found(query))
    }

    /// Prepend `record` with a fresh id and timestamps.
    pub fn insert<T: Record>(
        &mut self,
        table: Table,
        mut record: T,
        now: DateTime<Utc>,
    ) -> BackendResult<T> {
        if !record.fits(table) {
            return Err(BackendError::TableMismatch {
                table,
                record: T::NAME,
            });
        }
        let id = self.ids.next(now);
        record.stamp(id, now);
        self.rows_mut::<T>(table)?.insert(0, record.clone());
        debug!("Inserted {} {} into {}", T::NAME, record.id(), table);
        Ok(record)
    }

    /// Like [`insert`](Self::insert) but at the end of the table.
    pub fn append<T: Record>(
        &mut self,
        table: Table,
        mut record: T,
        now: DateTime<Utc>,
    ) -> BackendResult<T> {
        if !record.fits(table) {
            return Err(BackendError::TableMismatch {
                table,
                record: T::NAME,
            });
        }
        let id = self.ids.next(now);
        record.stamp(id, now);
        self.rows_mut::<T>(table)?.push(record.clone());
        Ok(record)
    }

    /// Merge `patch` into the first row matching `query`.
    ///
    /// Keys absent from the patch keep their values. The row id cannot be
    /// patched.
    pub fn update<T: Record>(
        &mut self,
        query: &Query,
        patch: &Map<String, Value>,
        now: DateTime<Utc>,
    ) -> BackendResult<T> {
        let table = query.table;
        let index = {
            let rows = self.rows::<T>(table)?;
            resolve(rows, &query.clone().limit(1))?
                .into_iter()
                .next()
                .ok_or_else(|| not_found(query))?
        };

        let rows = self.rows_mut::<T>(table)?;
        let mut value = serde_json::to_value(&rows[index])?;
        if let Value::Object(fields) = &mut value {
            for (key, patched) in patch {
                if key != "id" {
                    fields.insert(key.clone(), patched.clone());
                }
            }
        }

        let mut updated: T = serde_json::from_value(value)?;
        if !updated.fits(table) {
            return Err(BackendError::Validation(format!(
                "el registro ya no pertenece a {table}"
            )));
        }
        updated.touch(now);
        rows[index] = updated.clone();
        debug!("Updated {} {} in {}", T::NAME, updated.id(), table);
        Ok(updated)
    }

    /// Remove every row matching `query`; not-found if none did.
    pub fn delete<T: Record>(&mut self, query: &Query) -> BackendResult<usize> {
        let mut hits = resolve(self.rows::<T>(query.table)?, query)?;
        if hits.is_empty() {
            return Err(not_found(query));
        }
        hits.sort_unstable_by(|a, b| b.cmp(a));
        let rows = self.rows_mut::<T>(query.table)?;
        for index in &hits {
            rows.remove(*index);
        }
        debug!("Deleted {} rows from {}", hits.len(), query.table);
        Ok(hits.len())
    }

    /// Bump the view counter of one listing.
    pub fn increment_views(&mut self, table: Table, id: &str) -> BackendResult<u64> {
        let listing = self
            .rows_mut::<Listing>(table)?
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or_else(|| BackendError::NotFound(format!("{table} {id}")))?;
        listing.views += 1;
        Ok(listing.views)
    }
}

fn not_found(query: &Query) -> BackendError {
    BackendError::NotFound(format!("no {} row matches", query.table))
}

/// Serialize a typed patch into the object form [`RecordStore::update`] merges.
///
/// Patch types skip `None` fields so only the set ones are merged.
pub fn to_patch<P: Serialize>(patch: &P) -> BackendResult<Map<String, Value>> {
    match serde_json::to_value(patch)? {
        Value::Object(fields) => Ok(fields),
        other => Err(BackendError::Validation(format!(
            "patch must be an object, got {other}"
        ))),
    }
}
