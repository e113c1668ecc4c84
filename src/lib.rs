//! Local stand-in for the Kroma classifieds backend.
//!
//! A [`MockClient`] owns the in-memory tables and the session slot. The
//! feature modules in [`features`] sit on top of it and return structured
//! results; [`notify`] turns those results into banners for the UI.

pub mod backend;
pub mod config;
pub mod error;
pub mod features;
pub mod models;
pub mod notify;

pub use backend::{
    Bucket, Clock, FileStorage, ManualClock, MockClient, MockStorage, Query, RecordStore,
    SystemClock, Table,
};
pub use config::MockConfig;
pub use error::{BackendError, BackendResult, ErrorBody, ErrorCode, Response};
pub use features::{AuthState, Catalog, ConnectionStatus, Favorites, Messages, Reports};
pub use models::{
    Badge, Favorite, Listing, ListingDetails, ListingKind, ListingRef, ListingStatus, Message,
    Report, ReportStatus, User,
};
pub use notify::{Notice, NoticeLevel, Notifier, Operation};
