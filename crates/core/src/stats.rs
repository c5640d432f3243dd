//! Dashboard aggregators.
//!
//! Pure folds over order and product snapshots. No I/O, no persistence.

use std::collections::BTreeMap;

use chrono::{DateTime, TimeZone};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::types::{Category, Order, OrderStatus, Product};

/// Products with fewer units than this count as low stock.
pub const LOW_STOCK_THRESHOLD: i32 = 10;

/// Order counts per status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusBreakdown {
    pub pending: usize,
    pub processing: usize,
    pub delivered: usize,
    pub cancelled: usize,
}

impl StatusBreakdown {
    /// Count for a single status.
    #[must_use]
    pub const fn get(&self, status: OrderStatus) -> usize {
        match status {
            OrderStatus::Pending => self.pending,
            OrderStatus::Processing => self.processing,
            OrderStatus::Delivered => self.delivered,
            OrderStatus::Cancelled => self.cancelled,
        }
    }

    const fn bump(&mut self, status: OrderStatus) {
        match status {
            OrderStatus::Pending => self.pending += 1,
            OrderStatus::Processing => self.processing += 1,
            OrderStatus::Delivered => self.delivered += 1,
            OrderStatus::Cancelled => self.cancelled += 1,
        }
    }
}

/// Sales figures for the admin dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SalesSummary {
    pub order_count: usize,
    /// Sum of every order's stored total.
    pub total_revenue: Decimal,
    pub by_status: StatusBreakdown,
    pub today_order_count: usize,
    pub today_revenue: Decimal,
    /// Zero when there are no orders.
    pub average_order_value: Decimal,
}

impl SalesSummary {
    /// Summarize orders. "Today" is the calendar date of `now` in `now`'s timezone.
    #[must_use]
    pub fn from_orders<Tz: TimeZone>(orders: &[Order], now: &DateTime<Tz>) -> Self {
        let tz = now.timezone();
        let today = now.date_naive();

        let mut summary = orders.iter().fold(Self::default(), |mut acc, order| {
            acc.order_count += 1;
            acc.total_revenue += order.total_price;
            acc.by_status.bump(order.status);
            if order.created_at.with_timezone(&tz).date_naive() == today {
                acc.today_order_count += 1;
                acc.today_revenue += order.total_price;
            }
            acc
        });

        if summary.order_count > 0 {
            summary.average_order_value =
                (summary.total_revenue / Decimal::from(summary.order_count)).round_dp(2);
        }
        summary
    }
}

/// Inventory figures for the admin dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InventorySummary {
    pub product_count: usize,
    /// Products with stock below [`LOW_STOCK_THRESHOLD`], out-of-stock included.
    pub low_stock: usize,
    /// Products with no stock left.
    pub out_of_stock: usize,
    /// Units across all products. Negative stock counts as zero.
    pub total_units: i64,
    /// Product count per category name. Uncategorized products are not counted.
    pub by_category: BTreeMap<String, usize>,
}

impl InventorySummary {
    /// Summarize a product snapshot.
    #[must_use]
    pub fn from_products(products: &[Product]) -> Self {
        products.iter().fold(Self::default(), |mut acc, product| {
            acc.product_count += 1;
            if product.stock < LOW_STOCK_THRESHOLD {
                acc.low_stock += 1;
            }
            if product.stock <= 0 {
                acc.out_of_stock += 1;
            }
            acc.total_units += i64::from(product.stock.max(0));
            if let Some(category) = product.category.as_deref().filter(|c| !c.is_empty()) {
                *acc.by_category.entry(category.to_owned()).or_insert(0) += 1;
            }
            acc
        })
    }
}

/// Product count for every declared category, including empty ones.
#[must_use]
pub fn category_product_counts(
    categories: &[Category],
    products: &[Product],
) -> Vec<(Category, usize)> {
    categories
        .iter()
        .map(|category| {
            let count = products
                .iter()
                .filter(|p| p.category.as_deref() == Some(category.name.as_str()))
                .count();
            (category.clone(), count)
        })
        .collect()
}
