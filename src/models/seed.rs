//! Demo records loaded into a fresh store.

use chrono::{DateTime, Utc};
use tracing::info;

use super::{
    Badge, Condition, Listing, ListingDetails, ListingStatus, PriceType, TransactionType, User,
};

pub const DEMO_USER_ID: &str = "1";
pub const DEMO_EMAIL: &str = "usuario@ejemplo.com";

/// The account used by demo auto-login.
pub fn demo_user(now: DateTime<Utc>) -> User {
    User {
        id: DEMO_USER_ID.to_string(),
        email: DEMO_EMAIL.to_string(),
        full_name: "Usuario Demo".to_string(),
        avatar_url: None,
        phone: Some("+57 300 123 4567".to_string()),
        location: Some("Bogotá".to_string()),
        badge: Badge::Vip,
        bio: None,
        website: None,
        verified: true,
        created_at: now,
        updated_at: now,
    }
}

#[allow(clippy::too_many_arguments)]
fn listing(
    id: &str,
    title: &str,
    description: &str,
    price: u64,
    image: &str,
    location: &str,
    views: u64,
    featured: bool,
    details: ListingDetails,
    now: DateTime<Utc>,
) -> Listing {
    Listing {
        id: id.to_string(),
        title: title.to_string(),
        description: description.to_string(),
        price,
        images: vec![image.to_string()],
        location: location.to_string(),
        user_id: DEMO_USER_ID.to_string(),
        status: ListingStatus::Active,
        featured,
        views,
        created_at: now,
        updated_at: now,
        details,
    }
}

pub fn demo_products(now: DateTime<Utc>) -> Vec<Listing> {
    info!("📋 Generating demo products");

    vec![
        listing(
            "1",
            "iPhone 14 Pro Max 256GB",
            "iPhone en excelente estado, poco uso, incluye cargador original y caja.",
            4_500_000,
            "https://images.pexels.com/photos/788946/pexels-photo-788946.jpeg",
            "Bogotá",
            125,
            true,
            ListingDetails::Product {
                category: "Electrónicos".to_string(),
                condition: Condition::Usado,
            },
            now,
        ),
        listing(
            "2",
            "MacBook Air M2 2022",
            "Laptop en perfecto estado, ideal para trabajo y estudio.",
            6_800_000,
            "https://images.pexels.com/photos/205421/pexels-photo-205421.jpeg",
            "Medellín",
            89,
            false,
            ListingDetails::Product {
                category: "Electrónicos".to_string(),
                condition: Condition::Nuevo,
            },
            now,
        ),
        listing(
            "3",
            "Samsung Galaxy S23 Ultra",
            "Teléfono nuevo en caja, nunca usado, con todos los accesorios.",
            3_200_000,
            "https://images.pexels.com/photos/1092644/pexels-photo-1092644.jpeg",
            "Cali",
            56,
            false,
            ListingDetails::Product {
                category: "Electrónicos".to_string(),
                condition: Condition::Nuevo,
            },
            now,
        ),
    ]
}

pub fn demo_properties(now: DateTime<Utc>) -> Vec<Listing> {
    vec![listing(
        "1",
        "Apartamento 3 habitaciones en Chapinero",
        "Hermoso apartamento con vista panorámica, cerca al transporte público.",
        450_000_000,
        "https://images.pexels.com/photos/1396122/pexels-photo-1396122.jpeg",
        "Bogotá",
        67,
        false,
        ListingDetails::Property {
            property_type: "apartamento".to_string(),
            transaction_type: TransactionType::Venta,
            bedrooms: 3,
            bathrooms: 2,
            area: 85,
            address: "Carrera 13 #63-45".to_string(),
            amenities: vec![
                "Gimnasio".to_string(),
                "Piscina".to_string(),
                "Portería 24h".to_string(),
            ],
            parking_spaces: 1,
            stratum: 4,
        },
        now,
    )]
}

pub fn demo_services(now: DateTime<Utc>) -> Vec<Listing> {
    vec![listing(
        "1",
        "Reparación de electrodomésticos",
        "Servicio técnico especializado en reparación de neveras, lavadoras y más.",
        50_000,
        "https://images.pexels.com/photos/4792509/pexels-photo-4792509.jpeg",
        "Bogotá",
        34,
        false,
        ListingDetails::Service {
            category: "Reparaciones y Mantenimiento".to_string(),
            price_to: Some(200_000),
            price_type: PriceType::Fixed,
            rating: 4.8,
            reviews_count: 15,
            availability: ["Lunes", "Martes", "Miércoles", "Jueves", "Viernes"]
                .iter()
                .map(|d| d.to_string())
                .collect(),
            response_time: "24h".to_string(),
        },
        now,
    )]
}
