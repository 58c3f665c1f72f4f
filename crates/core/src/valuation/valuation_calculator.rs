use chrono::{DateTime, Duration, Months, Utc};
use log::debug;
use rust_decimal::Decimal;

use super::valuation_model::{PortfolioBaseline, PortfolioValuation};
use crate::assets::Asset;
use crate::constants::MONTHLY_LOOKBACK_MONTHS;

/// Calculates the portfolio aggregates for `assets` as of `now`.
///
/// Pure: no I/O and no state carried between calls.
///
/// `total_portfolio_value` adds the sold profit both through `cash_reserves`
/// and through its own term. The formula is kept exactly as the dashboard
/// has always reported it.
///
/// # Arguments
///
/// * `assets` - The full asset list, sold and unsold.
/// * `baseline` - Starting capital and the cash parameter of the monthly window.
/// * `now` - End of the monthly performance window.
pub fn calculate_valuation(
    assets: &[Asset],
    baseline: &PortfolioBaseline,
    now: DateTime<Utc>,
) -> PortfolioValuation {
    let window_start = monthly_window_start(now);

    let mut active_purchase_sum = Decimal::ZERO;
    let mut active_market_sum = Decimal::ZERO;
    let mut sold_purchase_sum = Decimal::ZERO;
    let mut sold_profit_sum = Decimal::ZERO;
    let mut recent_sold_profit = Decimal::ZERO;
    let mut active_count = 0;
    let mut sold_count = 0;

    for asset in assets {
        if !asset.is_sold {
            active_count += 1;
            active_purchase_sum += asset.purchase_price;
            active_market_sum += asset.current_value;
            continue;
        }

        sold_count += 1;
        // Sold rows without a price contribute nothing to realized figures
        let Some(sold_price) = asset.sold_price else {
            continue;
        };
        let profit = sold_price - asset.purchase_price;
        sold_purchase_sum += asset.purchase_price;
        sold_profit_sum += profit;

        if asset
            .sold_date
            .is_some_and(|date| date >= window_start && date <= now)
        {
            recent_sold_profit += profit;
        }
    }

    let cash_reserves = baseline.capital - active_purchase_sum + sold_profit_sum;
    let total_portfolio_value =
        cash_reserves - active_purchase_sum + active_market_sum + sold_profit_sum;
    let realized_roi = percent_of(sold_profit_sum, sold_purchase_sum);

    let previous_month_value = active_purchase_sum + baseline.cash_parameter;
    let current_month_value = active_market_sum + recent_sold_profit + baseline.cash_parameter;
    let monthly_performance =
        percent_of(current_month_value - previous_month_value, previous_month_value);

    debug!(
        "Valued {} active / {} sold asset(s): cash reserves {}, total {}",
        active_count, sold_count, cash_reserves, total_portfolio_value
    );

    PortfolioValuation {
        active_purchase_sum,
        active_market_sum,
        sold_purchase_sum,
        sold_profit_sum,
        cash_reserves,
        total_portfolio_value,
        realized_roi,
        recent_sold_profit,
        previous_month_value,
        current_month_value,
        monthly_performance,
        active_count,
        sold_count,
        window_start,
        calculated_at: now,
    }
}

/// Start of the monthly performance window: one calendar month before `now`.
pub fn monthly_window_start(now: DateTime<Utc>) -> DateTime<Utc> {
    now.checked_sub_months(Months::new(MONTHLY_LOOKBACK_MONTHS))
        .unwrap_or_else(|| now - Duration::days(30))
}

/// `part / whole * 100`, or zero when `whole` is zero.
fn percent_of(part: Decimal, whole: Decimal) -> Decimal {
    if whole.is_zero() {
        return Decimal::ZERO;
    }
    part / whole * Decimal::ONE_HUNDRED
}
