//! Order totals. All amounts are integer minor units (bani).

use serde::Serialize;
use utoipa::ToSchema;

use super::order::CartLine;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricingPolicy {
    pub vat_percent: i64,
    /// Orders whose subtotal is strictly above this ship for free.
    pub free_shipping_threshold: i64,
    pub flat_shipping_fee: i64,
}

impl Default for PricingPolicy {
    fn default() -> Self {
        Self {
            vat_percent: 19,
            free_shipping_threshold: 50_000,
            flat_shipping_fee: 2_500,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct OrderTotals {
    pub subtotal: i64,
    pub tax_amount: i64,
    pub shipping_cost: i64,
    pub total_amount: i64,
}

impl PricingPolicy {
    pub fn totals(&self, lines: &[CartLine]) -> OrderTotals {
        let subtotal: i64 = lines.iter().map(CartLine::line_total).sum();
        self.totals_for_subtotal(subtotal)
    }

    pub fn totals_for_subtotal(&self, subtotal: i64) -> OrderTotals {
        let tax_amount = round_half_up_percent(subtotal, self.vat_percent);
        let shipping_cost = if subtotal > self.free_shipping_threshold {
            0
        } else {
            self.flat_shipping_fee
        };
        OrderTotals {
            subtotal,
            tax_amount,
            shipping_cost,
            total_amount: subtotal + tax_amount + shipping_cost,
        }
    }
}

fn round_half_up_percent(amount: i64, percent: i64) -> i64 {
    let scaled = amount * percent;
    if scaled >= 0 {
        (scaled + 50) / 100
    } else {
        (scaled - 50) / 100
    }
}
