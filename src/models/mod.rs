pub mod seed;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::backend::Table;

/// User tier shown next to a profile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Badge {
    #[default]
    None,
    Destacado,
    Colaborador,
    Vip,
    Moderador,
    Admin,
}

impl Badge {
    pub fn is_admin(self) -> bool {
        self == Badge::Admin
    }

    /// Admins moderate too.
    pub fn is_moderator(self) -> bool {
        matches!(self, Badge::Moderador | Badge::Admin)
    }

    pub fn is_vip(self) -> bool {
        self == Badge::Vip
    }

    pub fn is_colaborador(self) -> bool {
        self == Badge::Colaborador
    }

    pub fn is_destacado(self) -> bool {
        self == Badge::Destacado
    }
}

/// Profile record (`profiles` table)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub full_name: String,
    pub avatar_url: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    #[serde(default)]
    pub badge: Badge,
    pub bio: Option<String>,
    pub website: Option<String>,
    pub verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Fresh unverified profile, as created by sign-up.
    pub fn new(email: impl Into<String>, full_name: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            email: email.into(),
            full_name: full_name.into(),
            avatar_url: None,
            phone: None,
            location: None,
            badge: Badge::None,
            bio: None,
            website: None,
            verified: false,
            created_at: DateTime::default(),
            updated_at: DateTime::default(),
        }
    }
}

/// Which of the three listing tables a record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingKind {
    Product,
    Property,
    Service,
}

impl ListingKind {
    pub fn table(self) -> Table {
        match self {
            ListingKind::Product => Table::Products,
            ListingKind::Property => Table::Properties,
            ListingKind::Service => Table::Services,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingStatus {
    #[default]
    Active,
    Sold,
    Inactive,
    Pending,
}

/// Condition of a second-hand product
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Condition {
    Nuevo,
    Usado,
    Reacondicionado,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Venta,
    Arriendo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceType {
    Fixed,
    Hourly,
    Negotiable,
}

/// Fields that only exist on one kind of listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ListingDetails {
    Product {
        category: String,
        condition: Condition,
    },
    Property {
        property_type: String,
        transaction_type: TransactionType,
        bedrooms: u32,
        bathrooms: u32,
        /// Square meters
        area: u32,
        address: String,
        amenities: Vec<String>,
        parking_spaces: u32,
        stratum: u8,
    },
    Service {
        category: String,
        /// Upper bound; the listing's `price` is the starting price.
        price_to: Option<u64>,
        price_type: PriceType,
        rating: f64,
        reviews_count: u32,
        availability: Vec<String>,
        response_time: String,
    },
}

impl ListingDetails {
    pub fn kind(&self) -> ListingKind {
        match self {
            ListingDetails::Product { .. } => ListingKind::Product,
            ListingDetails::Property { .. } => ListingKind::Property,
            ListingDetails::Service { .. } => ListingKind::Service,
        }
    }

    /// The field the catalog's category filter compares against.
    pub fn category(&self) -> &str {
        match self {
            ListingDetails::Product { category, .. } => category,
            ListingDetails::Property { property_type, .. } => property_type,
            ListingDetails::Service { category, .. } => category,
        }
    }
}

/// A product, property or service listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub id: String,
    pub title: String,
    pub description: String,
    pub price: u64,
    pub images: Vec<String>,
    pub location: String,
    pub user_id: String,
    pub status: ListingStatus,
    pub featured: bool,
    pub views: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub details: ListingDetails,
}

impl Listing {
    pub fn kind(&self) -> ListingKind {
        self.details.kind()
    }

    pub fn category(&self) -> &str {
        self.details.category()
    }
}

/// Pointer from a favorite, message or report to one listing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ListingRef {
    pub kind: ListingKind,
    pub id: String,
}

impl ListingRef {
    pub fn product(id: impl Into<String>) -> Self {
        Self {
            kind: ListingKind::Product,
            id: id.into(),
        }
    }

    pub fn property(id: impl Into<String>) -> Self {
        Self {
            kind: ListingKind::Property,
            id: id.into(),
        }
    }

    pub fn service(id: impl Into<String>) -> Self {
        Self {
            kind: ListingKind::Service,
            id: id.into(),
        }
    }
}

/// Direct message between two users.
///
/// Each side hides the message independently; a message deleted by its
/// recipient stays in the sender's outbox.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub sender_id: String,
    pub recipient_id: String,
    pub subject: Option<String>,
    pub content: String,
    pub read: bool,
    pub deleted_by_sender: bool,
    pub deleted_by_recipient: bool,
    pub listing: Option<ListingRef>,
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn visible_to_sender(&self, user_id: &str) -> bool {
        self.sender_id == user_id && !self.deleted_by_sender
    }

    pub fn visible_to_recipient(&self, user_id: &str) -> bool {
        self.recipient_id == user_id && !self.deleted_by_recipient
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Favorite {
    pub id: String,
    pub user_id: String,
    pub target: ListingRef,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    #[default]
    Pending,
    Reviewed,
    Resolved,
    Dismissed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub id: String,
    pub reporter_id: String,
    pub reported_user_id: Option<String>,
    pub listing: Option<ListingRef>,
    pub reason: String,
    pub description: String,
    pub status: ReportStatus,
    pub reviewed_by: Option<String>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_badge_flags() {
        assert!(Badge::Admin.is_admin());
        assert!(Badge::Admin.is_moderator());
        assert!(Badge::Moderador.is_moderator());
        assert!(!Badge::Moderador.is_admin());
        assert!(!Badge::Vip.is_moderator());
        assert!(Badge::Vip.is_vip());
    }

    #[test]
    fn test_listing_details_flatten_into_record() {
        let listing = Listing {
            id: "1".into(),
            title: "Bicicleta".into(),
            description: "Rin 29".into(),
            price: 900_000,
            images: vec![],
            location: "Cali".into(),
            user_id: "1".into(),
            status: ListingStatus::Active,
            featured: false,
            views: 0,
            created_at: DateTime::default(),
            updated_at: DateTime::default(),
            details: ListingDetails::Product {
                category: "Deportes".into(),
                condition: Condition::Usado,
            },
        };

        let value = serde_json::to_value(&listing).unwrap();
        assert_eq!(value["kind"], json!("product"));
        assert_eq!(value["category"], json!("Deportes"));
        assert_eq!(value["condition"], json!("usado"));

        let back: Listing = serde_json::from_value(value).unwrap();
        assert_eq!(back, listing);
    }

    #[test]
    fn test_badge_serializes_lowercase() {
        assert_eq!(serde_json::to_value(Badge::Moderador).unwrap(), json!("moderador"));
        assert_eq!(serde_json::to_value(Badge::None).unwrap(), json!("none"));
    }
}
