//! Database models for assets.

use std::str::FromStr;

use apex_core::Asset;
use chrono::{NaiveDateTime, TimeZone, Utc};
use diesel::prelude::*;
use rust_decimal::Decimal;

use crate::errors::StorageError;

/// Database model for assets.
///
/// Money is stored as decimal text so no precision is lost; instants are
/// stored as naive UTC timestamps.
#[derive(
    Queryable,
    Identifiable,
    Insertable,
    AsChangeset,
    Selectable,
    PartialEq,
    Debug,
    Clone,
)]
#[diesel(table_name = crate::schema::assets)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[diesel(treat_none_as_null = true)]
pub struct AssetDB {
    pub id: String,
    pub name: String,
    pub image_url: String,
    pub acquisition_date: NaiveDateTime,
    pub purchase_price: String,
    pub current_value: String,
    pub roi: String,
    pub description: Option<String>,
    pub grade: Option<String>,
    pub mint: Option<String>,
    pub year: Option<i32>,
    pub is_sold: bool,
    pub sold_price: Option<String>,
    pub sold_date: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<Asset> for AssetDB {
    fn from(asset: Asset) -> Self {
        Self {
            id: asset.id,
            name: asset.name,
            image_url: asset.image_url,
            acquisition_date: asset.acquisition_date.naive_utc(),
            purchase_price: asset.purchase_price.to_string(),
            current_value: asset.current_value.to_string(),
            roi: asset.roi.to_string(),
            description: asset.description,
            grade: asset.grade,
            mint: asset.mint,
            year: asset.year,
            is_sold: asset.is_sold,
            sold_price: asset.sold_price.map(|p| p.to_string()),
            sold_date: asset.sold_date.map(|d| d.naive_utc()),
            created_at: asset.created_at.naive_utc(),
            updated_at: asset.updated_at.naive_utc(),
        }
    }
}

impl TryFrom<AssetDB> for Asset {
    type Error = StorageError;

    fn try_from(db: AssetDB) -> Result<Self, Self::Error> {
        let sold_price = db
            .sold_price
            .as_deref()
            .map(|raw| parse_decimal("sold_price", &db.id, raw))
            .transpose()?;
        Ok(Self {
            purchase_price: parse_decimal("purchase_price", &db.id, &db.purchase_price)?,
            current_value: parse_decimal("current_value", &db.id, &db.current_value)?,
            roi: parse_decimal("roi", &db.id, &db.roi)?,
            sold_price,
            acquisition_date: Utc.from_utc_datetime(&db.acquisition_date),
            sold_date: db.sold_date.map(|d| Utc.from_utc_datetime(&d)),
            created_at: Utc.from_utc_datetime(&db.created_at),
            updated_at: Utc.from_utc_datetime(&db.updated_at),
            id: db.id,
            name: db.name,
            image_url: db.image_url,
            description: db.description,
            grade: db.grade,
            mint: db.mint,
            year: db.year,
            is_sold: db.is_sold,
        })
    }
}

fn parse_decimal(field: &str, asset_id: &str, raw: &str) -> Result<Decimal, StorageError> {
    Decimal::from_str(raw).map_err(|e| {
        StorageError::SerializationError(format!(
            "Invalid {} '{}' on asset {}: {}",
            field, raw, asset_id, e
        ))
    })
}
