use apex_core::sync::{PortfolioState, SyncSummary};
use apex_core::{Asset, AssetFilter};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Deserialize)]
pub struct AssetsQuery {
    #[serde(default)]
    pub status: AssetFilter,
}

#[derive(Debug, Deserialize)]
pub struct SaleRequest {
    pub sold_price: Decimal,
    #[serde(default)]
    pub sold_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct CashParameterRequest {
    pub amount: Decimal,
}

/// Payload of one `portfolio:state` server-sent event.
#[derive(Debug, Serialize)]
pub struct StateEvent {
    #[serde(flatten)]
    pub summary: SyncSummary,
    pub assets: Vec<Asset>,
}

impl From<&PortfolioState> for StateEvent {
    fn from(state: &PortfolioState) -> Self {
        Self {
            summary: SyncSummary::from(state),
            assets: state.assets.clone(),
        }
    }
}
