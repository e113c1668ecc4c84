use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::BackendError;

/// Inclusive price bucket, written `"min-max"` or `"min+"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PriceRange {
    Between { min: u64, max: u64 },
    AtLeast(u64),
}

impl PriceRange {
    pub fn contains(&self, price: u64) -> bool {
        match *self {
            PriceRange::Between { min, max } => price >= min && price <= max,
            PriceRange::AtLeast(min) => price >= min,
        }
    }
}

impl FromStr for PriceRange {
    type Err = BackendError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = || BackendError::Validation(format!("Rango de precio inválido: {s}"));
        let number = |part: &str| part.trim().parse::<u64>().map_err(|_| invalid());

        if let Some(min) = s.strip_suffix('+') {
            return Ok(PriceRange::AtLeast(number(min)?));
        }
        let (min, max) = s.split_once('-').ok_or_else(invalid)?;
        let (min, max) = (number(min)?, number(max)?);
        if min > max {
            return Err(invalid());
        }
        Ok(PriceRange::Between { min, max })
    }
}

impl fmt::Display for PriceRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PriceRange::Between { min, max } => write!(f, "{min}-{max}"),
            PriceRange::AtLeast(min) => write!(f, "{min}+"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortKey {
    PriceAsc,
    PriceDesc,
    /// Newest first
    #[default]
    CreatedAt,
}

impl FromStr for SortKey {
    type Err = BackendError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "price_asc" => Ok(SortKey::PriceAsc),
            "price_desc" => Ok(SortKey::PriceDesc),
            "created_at" => Ok(SortKey::CreatedAt),
            other => Err(BackendError::Validation(format!(
                "Orden desconocido: {other}"
            ))),
        }
    }
}

/// Search parameters for a catalog view
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListingFilter {
    /// Case-insensitive substring of title, description or location
    pub search: String,
    /// Exact category (property type for properties)
    pub category: Option<String>,
    pub price_range: Option<PriceRange>,
    pub sort: SortKey,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bucket_bounds_are_inclusive() {
        let range: PriceRange = "1000000-2000000".parse().unwrap();
        assert!(range.contains(1_000_000));
        assert!(range.contains(2_000_000));
        assert!(!range.contains(999_999));
        assert!(!range.contains(2_000_001));
    }

    #[test]
    fn test_open_ended_bucket() {
        let range: PriceRange = "5000000+".parse().unwrap();
        assert_eq!(range, PriceRange::AtLeast(5_000_000));
        assert!(range.contains(5_000_000));
        assert!(!range.contains(4_999_999));
    }

    #[test]
    fn test_malformed_ranges() {
        assert!("abc".parse::<PriceRange>().is_err());
        assert!("5-1".parse::<PriceRange>().is_err());
        assert!("-".parse::<PriceRange>().is_err());
    }

    #[test]
    fn test_sort_keys() {
        assert_eq!("price_desc".parse::<SortKey>().unwrap(), SortKey::PriceDesc);
        assert_eq!(SortKey::default(), SortKey::CreatedAt);
        assert!("views".parse::<SortKey>().is_err());
    }
}
