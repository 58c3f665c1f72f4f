//! Asset domain models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::image::check_image_payload;
use crate::constants::{MIN_ASSET_NAME_LEN, PROVISIONAL_ID_PREFIX};
use crate::errors::{Result, ValidationError};

/// Domain model representing a tracked collectible.
///
/// The `roi` field is advisory and display-only. Valuation always recomputes
/// returns from prices and never reads it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Asset {
    pub id: String,
    pub name: String,
    pub image_url: String,
    pub acquisition_date: DateTime<Utc>,
    pub purchase_price: Decimal,
    pub current_value: Decimal,
    #[serde(default)]
    pub roi: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grade: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    pub is_sold: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sold_price: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sold_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input model for creating a new asset.
///
/// The store assigns `id`, `created_at` and `updated_at`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewAsset {
    pub name: String,
    pub image_url: String,
    pub acquisition_date: DateTime<Utc>,
    pub purchase_price: Decimal,
    pub current_value: Decimal,
    #[serde(default)]
    pub roi: Decimal,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub grade: Option<String>,
    #[serde(default)]
    pub mint: Option<String>,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub is_sold: bool,
    #[serde(default)]
    pub sold_price: Option<Decimal>,
    #[serde(default)]
    pub sold_date: Option<DateTime<Utc>>,
}

/// Which slice of the portfolio a listing should return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetFilter {
    #[default]
    All,
    Active,
    Sold,
}

impl AssetFilter {
    pub fn matches(&self, asset: &Asset) -> bool {
        match self {
            AssetFilter::All => true,
            AssetFilter::Active => !asset.is_sold,
            AssetFilter::Sold => asset.is_sold,
        }
    }
}

impl Asset {
    pub fn is_active(&self) -> bool {
        !self.is_sold
    }

    /// True for entries added optimistically that the store has not yet assigned an id to.
    pub fn is_provisional(&self) -> bool {
        self.id.starts_with(PROVISIONAL_ID_PREFIX)
    }

    /// Unrealized return in percent, based on the current market value.
    pub fn unrealized_roi(&self) -> Decimal {
        if self.purchase_price.is_zero() {
            return Decimal::ZERO;
        }
        (self.current_value - self.purchase_price) / self.purchase_price * Decimal::ONE_HUNDRED
    }

    /// Profit locked in by the sale, if the asset was sold with a price.
    pub fn realized_profit(&self) -> Option<Decimal> {
        if !self.is_sold {
            return None;
        }
        self.sold_price.map(|price| price - self.purchase_price)
    }

    pub fn realized_profit_percent(&self) -> Option<Decimal> {
        let profit = self.realized_profit()?;
        if self.purchase_price.is_zero() {
            return Some(Decimal::ZERO);
        }
        Some(profit / self.purchase_price * Decimal::ONE_HUNDRED)
    }

    /// Returns a copy flagged as sold at the given price and date.
    pub fn with_sale(&self, sold_price: Decimal, sold_date: DateTime<Utc>) -> Asset {
        Asset {
            is_sold: true,
            sold_price: Some(sold_price),
            sold_date: Some(sold_date),
            ..self.clone()
        }
    }

    /// Returns a copy with the sale undone.
    pub fn without_sale(&self) -> Asset {
        Asset {
            is_sold: false,
            sold_price: None,
            sold_date: None,
            ..self.clone()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(ValidationError::MissingField("id".to_string()).into());
        }
        validate_fields(&AssetFields {
            name: &self.name,
            image_url: &self.image_url,
            acquisition_date: self.acquisition_date,
            purchase_price: self.purchase_price,
            current_value: self.current_value,
            is_sold: self.is_sold,
            sold_price: self.sold_price,
            sold_date: self.sold_date,
        })
    }
}

impl NewAsset {
    pub fn validate(&self) -> Result<()> {
        validate_fields(&AssetFields {
            name: &self.name,
            image_url: &self.image_url,
            acquisition_date: self.acquisition_date,
            purchase_price: self.purchase_price,
            current_value: self.current_value,
            is_sold: self.is_sold,
            sold_price: self.sold_price,
            sold_date: self.sold_date,
        })
    }

    /// Materializes the draft with store-assigned identity and timestamps.
    pub fn into_asset(self, id: String, now: DateTime<Utc>) -> Asset {
        Asset {
            id,
            name: self.name,
            image_url: self.image_url,
            acquisition_date: self.acquisition_date,
            purchase_price: self.purchase_price,
            current_value: self.current_value,
            roi: self.roi,
            description: self.description,
            grade: self.grade,
            mint: self.mint,
            year: self.year,
            is_sold: self.is_sold,
            sold_price: self.sold_price,
            sold_date: self.sold_date,
            created_at: now,
            updated_at: now,
        }
    }
}

struct AssetFields<'a> {
    name: &'a str,
    image_url: &'a str,
    acquisition_date: DateTime<Utc>,
    purchase_price: Decimal,
    current_value: Decimal,
    is_sold: bool,
    sold_price: Option<Decimal>,
    sold_date: Option<DateTime<Utc>>,
}

fn validate_fields(fields: &AssetFields<'_>) -> Result<()> {
    if fields.name.trim().chars().count() < MIN_ASSET_NAME_LEN {
        return Err(ValidationError::InvalidInput(format!(
            "Name must be at least {} characters",
            MIN_ASSET_NAME_LEN
        ))
        .into());
    }
    if fields.purchase_price <= Decimal::ZERO {
        return Err(ValidationError::NonPositiveAmount {
            field: "purchase_price".to_string(),
        }
        .into());
    }
    if fields.current_value <= Decimal::ZERO {
        return Err(ValidationError::NonPositiveAmount {
            field: "current_value".to_string(),
        }
        .into());
    }
    check_image_payload(fields.image_url)?;

    if fields.is_sold {
        let sold_price = fields
            .sold_price
            .ok_or_else(|| ValidationError::MissingField("sold_price".to_string()))?;
        if sold_price <= Decimal::ZERO {
            return Err(ValidationError::NonPositiveAmount {
                field: "sold_price".to_string(),
            }
            .into());
        }
        let sold_date = fields
            .sold_date
            .ok_or_else(|| ValidationError::MissingField("sold_date".to_string()))?;
        if sold_date < fields.acquisition_date {
            return Err(ValidationError::InvalidInput(
                "Sold date cannot precede the acquisition date".to_string(),
            )
            .into());
        }
    } else if fields.sold_price.is_some() || fields.sold_date.is_some() {
        return Err(ValidationError::InvalidInput(
            "Unsold assets cannot carry a sold price or sold date".to_string(),
        )
        .into());
    }
    Ok(())
}
