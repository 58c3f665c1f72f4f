//! Tests for asset domain models.

#[cfg(test)]
mod tests {
    use crate::assets::{Asset, AssetFilter, NewAsset};
    use crate::errors::{Error, ValidationError};
    use chrono::{Duration, TimeZone, Utc};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn draft() -> NewAsset {
        NewAsset {
            name: "1893-S Morgan Dollar".to_string(),
            image_url: "https://cdn.example.com/morgan.png".to_string(),
            acquisition_date: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
            purchase_price: dec!(1000),
            current_value: dec!(1200),
            roi: Decimal::ZERO,
            description: Some("Key date".to_string()),
            grade: Some("MS-63".to_string()),
            mint: Some("San Francisco".to_string()),
            year: Some(1893),
            is_sold: false,
            sold_price: None,
            sold_date: None,
        }
    }

    fn asset() -> Asset {
        draft().into_asset("a-1".to_string(), Utc.with_ymd_and_hms(2024, 3, 2, 0, 0, 0).unwrap())
    }

    fn validation_error(result: crate::errors::Result<()>) -> ValidationError {
        match result {
            Err(Error::Validation(e)) => e,
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_valid_draft_passes() {
        assert!(draft().validate().is_ok());
        assert!(asset().validate().is_ok());
    }

    #[test]
    fn test_into_asset_assigns_identity_and_timestamps() {
        let now = Utc::now();
        let a = draft().into_asset("id-9".to_string(), now);
        assert_eq!(a.id, "id-9");
        assert_eq!(a.created_at, now);
        assert_eq!(a.updated_at, now);
        assert_eq!(a.purchase_price, dec!(1000));
    }

    #[test]
    fn test_short_name_rejected() {
        let mut d = draft();
        d.name = " X ".to_string();
        assert!(matches!(
            validation_error(d.validate()),
            ValidationError::InvalidInput(_)
        ));
    }

    #[test]
    fn test_prices_must_be_positive() {
        let mut d = draft();
        d.purchase_price = Decimal::ZERO;
        assert_eq!(
            validation_error(d.validate()),
            ValidationError::NonPositiveAmount {
                field: "purchase_price".to_string()
            }
        );

        let mut d = draft();
        d.current_value = dec!(-5);
        assert_eq!(
            validation_error(d.validate()),
            ValidationError::NonPositiveAmount {
                field: "current_value".to_string()
            }
        );
    }

    #[test]
    fn test_sold_requires_price_and_date() {
        let mut a = asset();
        a.is_sold = true;
        assert_eq!(
            validation_error(a.validate()),
            ValidationError::MissingField("sold_price".to_string())
        );

        a.sold_price = Some(dec!(1500));
        assert_eq!(
            validation_error(a.validate()),
            ValidationError::MissingField("sold_date".to_string())
        );
    }

    #[test]
    fn test_sold_date_cannot_precede_acquisition() {
        let a = asset();
        let sold = a.with_sale(dec!(1500), a.acquisition_date - Duration::days(1));
        assert!(matches!(
            validation_error(sold.validate()),
            ValidationError::InvalidInput(_)
        ));

        let same_day = a.with_sale(dec!(1500), a.acquisition_date);
        assert!(same_day.validate().is_ok());
    }

    #[test]
    fn test_unsold_cannot_carry_sale_fields() {
        let mut a = asset();
        a.sold_price = Some(dec!(10));
        assert!(matches!(
            validation_error(a.validate()),
            ValidationError::InvalidInput(_)
        ));
    }

    #[test]
    fn test_sale_helpers_toggle_fields() {
        let a = asset();
        let date = a.acquisition_date + Duration::days(30);
        let sold = a.with_sale(dec!(1400), date);
        assert!(sold.is_sold);
        assert_eq!(sold.sold_price, Some(dec!(1400)));
        assert_eq!(sold.sold_date, Some(date));
        assert_eq!(sold.created_at, a.created_at);

        let back = sold.without_sale();
        assert!(!back.is_sold);
        assert_eq!(back.sold_price, None);
        assert_eq!(back.sold_date, None);
    }

    #[test]
    fn test_return_helpers() {
        let a = asset();
        assert_eq!(a.unrealized_roi(), dec!(20));
        assert_eq!(a.realized_profit(), None);

        let sold = a.with_sale(dec!(700), a.acquisition_date);
        assert_eq!(sold.realized_profit(), Some(dec!(-300)));
        assert_eq!(sold.realized_profit_percent(), Some(dec!(-30)));
    }

    #[test]
    fn test_filter_matches_sold_flag() {
        let active = asset();
        let sold = active.with_sale(dec!(1300), active.acquisition_date);
        assert!(AssetFilter::All.matches(&active) && AssetFilter::All.matches(&sold));
        assert!(AssetFilter::Active.matches(&active));
        assert!(!AssetFilter::Active.matches(&sold));
        assert!(AssetFilter::Sold.matches(&sold));
        assert!(!AssetFilter::Sold.matches(&active));
    }

    #[test]
    fn test_serialization_omits_absent_optionals() {
        let mut a = asset();
        a.description = None;
        let json = serde_json::to_value(&a).unwrap();
        assert!(json.get("description").is_none());
        assert!(json.get("sold_price").is_none());
        assert_eq!(json["is_sold"], serde_json::json!(false));

        let back: Asset = serde_json::from_value(json).unwrap();
        assert_eq!(back, a);
    }

    #[test]
    fn test_filter_deserializes_lowercase() {
        let f: AssetFilter = serde_json::from_str("\"sold\"").unwrap();
        assert_eq!(f, AssetFilter::Sold);
    }
}
