//! Valuation domain models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_BASELINE_CAPITAL, DEFAULT_CASH_PARAMETER};
use crate::errors::{Result, ValidationError};

/// External capital figures anchoring the valuation.
///
/// `capital` is the fixed starting cash behind the reserve computation.
/// `cash_parameter` is the editable cash amount used by the monthly window.
/// It is independent of the capital and starts out at
/// [`DEFAULT_CASH_PARAMETER`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PortfolioBaseline {
    pub capital: Decimal,
    pub cash_parameter: Decimal,
}

impl PortfolioBaseline {
    pub fn new(capital: Decimal) -> Self {
        Self {
            capital,
            cash_parameter: DEFAULT_CASH_PARAMETER,
        }
    }

    pub fn with_cash_parameter(self, cash_parameter: Decimal) -> Result<Self> {
        if cash_parameter < Decimal::ZERO {
            return Err(ValidationError::InvalidInput(
                "Cash reserves cannot be negative".to_string(),
            )
            .into());
        }
        Ok(Self {
            cash_parameter,
            ..self
        })
    }
}

impl Default for PortfolioBaseline {
    fn default() -> Self {
        Self::new(DEFAULT_BASELINE_CAPITAL)
    }
}

/// Derived portfolio aggregates for one asset list at one instant.
///
/// Percent figures (`realized_roi`, `monthly_performance`) are expressed in
/// percent, not as fractions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioValuation {
    pub active_purchase_sum: Decimal,
    pub active_market_sum: Decimal,
    pub sold_purchase_sum: Decimal,
    pub sold_profit_sum: Decimal,
    pub cash_reserves: Decimal,
    pub total_portfolio_value: Decimal,
    pub realized_roi: Decimal,
    pub recent_sold_profit: Decimal,
    pub previous_month_value: Decimal,
    pub current_month_value: Decimal,
    pub monthly_performance: Decimal,
    pub active_count: usize,
    pub sold_count: usize,
    pub window_start: DateTime<Utc>,
    pub calculated_at: DateTime<Utc>,
}
