use crate::analyzers::preprocess::{EnrichedTransaction, PosAnalyzer};
use crate::analyzers::types::{
    CategoryPerformance, DailyTrend, HourlyPattern, ItemPerformance, LocationPerformance,
    MenuPerformance, PaymentSummary, ServerPerformance,
};
use crate::analyzers::utility::round2;
use std::collections::{BTreeMap, HashSet};

/// Servers with fewer transactions than this are left out of
/// [`PosAnalyzer::server_performance`] by default.
pub const DEFAULT_MIN_TRANSACTIONS: usize = 10;

/// Groups rows by `key`, ordered by key. Rows for which `key` returns
/// `None` are dropped.
pub(crate) fn group_by<'a, K, F>(
    rows: &'a [EnrichedTransaction],
    key: F,
) -> BTreeMap<K, Vec<&'a EnrichedTransaction>>
where
    K: Ord,
    F: Fn(&'a EnrichedTransaction) -> Option<K>,
{
    let mut groups: BTreeMap<K, Vec<&EnrichedTransaction>> = BTreeMap::new();
    for row in rows {
        if let Some(k) = key(row) {
            groups.entry(k).or_default().push(row);
        }
    }
    groups
}

/// Count, sum and mean of price over one group.
struct PriceTotals {
    count: usize,
    sum: f64,
    mean: f64,
}

fn price_totals(group: &[&EnrichedTransaction]) -> PriceTotals {
    let sum: f64 = group.iter().map(|r| r.price()).sum();
    let count = group.len();
    PriceTotals {
        count,
        sum,
        mean: if count == 0 { 0.0 } else { sum / count as f64 },
    }
}

fn distinct<'a, F>(group: &[&'a EnrichedTransaction], field: F) -> usize
where
    F: Fn(&'a EnrichedTransaction) -> Option<&'a str>,
{
    group
        .iter()
        .filter_map(|r| field(*r))
        .collect::<HashSet<_>>()
        .len()
}

fn anomaly_count(group: &[&EnrichedTransaction]) -> usize {
    group.iter().filter(|r| r.price_anomaly).count()
}

impl PosAnalyzer {
    /// Sales per calendar date.
    pub fn daily_trends(&self) -> Vec<DailyTrend> {
        group_by(self.rows(), |r| Some(r.date))
            .into_iter()
            .map(|(date, group)| {
                let totals = price_totals(&group);
                DailyTrend {
                    date,
                    transaction_count: totals.count,
                    total_sales: round2(totals.sum),
                    avg_ticket: round2(totals.mean),
                    items_sold: group.len(),
                    active_servers: distinct(&group, |r| r.server_id()),
                }
            })
            .collect()
    }

    /// Sales per hour of day across all dates.
    pub fn hourly_patterns(&self) -> Vec<HourlyPattern> {
        group_by(self.rows(), |r| Some(r.hour))
            .into_iter()
            .map(|(hour, group)| {
                let totals = price_totals(&group);
                HourlyPattern {
                    hour,
                    transaction_count: totals.count,
                    total_sales: round2(totals.sum),
                    avg_ticket: round2(totals.mean),
                    items_sold: group.len(),
                }
            })
            .collect()
    }

    /// Per-server metrics for servers with at least `min_transactions`
    /// rows, highest total sales first. Rows without a server are ignored.
    pub fn server_performance(&self, min_transactions: usize) -> Vec<ServerPerformance> {
        let mut servers: Vec<ServerPerformance> = group_by(self.rows(), |r| r.server_id())
            .into_iter()
            .map(|(server_id, group)| {
                let totals = price_totals(&group);
                ServerPerformance {
                    server_id: server_id.to_string(),
                    transaction_count: totals.count,
                    total_sales: round2(totals.sum),
                    avg_ticket: round2(totals.mean),
                    items_sold: group.len(),
                    price_anomalies: anomaly_count(&group),
                    items_per_transaction: round2(group.len() as f64 / totals.count as f64),
                }
            })
            .filter(|s| s.transaction_count >= min_transactions)
            .collect();

        servers.sort_by(|a, b| b.total_sales.total_cmp(&a.total_sales));
        servers
    }

    /// Per-item and per-category menu tables.
    pub fn menu_performance(&self) -> MenuPerformance {
        let items = group_by(self.rows(), |r| Some(r.item_name()))
            .into_iter()
            .map(|(item_name, group)| {
                let totals = price_totals(&group);
                ItemPerformance {
                    item_name: item_name.to_string(),
                    quantity_sold: totals.count,
                    total_revenue: round2(totals.sum),
                    avg_price: round2(totals.mean),
                    price_anomalies: anomaly_count(&group),
                }
            })
            .collect();

        let categories = group_by(self.rows(), |r| Some(r.record.item_category.as_str()))
            .into_iter()
            .map(|(item_category, group)| {
                let totals = price_totals(&group);
                CategoryPerformance {
                    item_category: item_category.to_string(),
                    quantity_sold: totals.count,
                    total_revenue: round2(totals.sum),
                    avg_price: round2(totals.mean),
                    unique_items: distinct(&group, |r| Some(r.item_name())),
                }
            })
            .collect();

        MenuPerformance { items, categories }
    }

    pub fn location_performance(&self) -> Vec<LocationPerformance> {
        group_by(self.rows(), |r| Some(r.location()))
            .into_iter()
            .map(|(location, group)| {
                let totals = price_totals(&group);
                LocationPerformance {
                    location: location.to_string(),
                    transaction_count: totals.count,
                    total_sales: round2(totals.sum),
                    avg_ticket: round2(totals.mean),
                    items_sold: group.len(),
                    unique_servers: distinct(&group, |r| r.server_id()),
                }
            })
            .collect()
    }

    /// Payment-type mix. `sales_percentage` is each type's share of the
    /// summed (rounded) totals and adds up to 100 across all rows.
    pub fn payment_types(&self) -> Vec<PaymentSummary> {
        let mut payments: Vec<PaymentSummary> =
            group_by(self.rows(), |r| Some(r.payment_type.as_str()))
                .into_iter()
                .map(|(payment_type, group)| {
                    let totals = price_totals(&group);
                    PaymentSummary {
                        payment_type: payment_type.to_string(),
                        transaction_count: totals.count,
                        total_sales: round2(totals.sum),
                        avg_ticket: round2(totals.mean),
                        sales_percentage: 0.0,
                    }
                })
                .collect();

        let grand_total: f64 = payments.iter().map(|p| p.total_sales).sum();
        if grand_total != 0.0 {
            for p in &mut payments {
                p.sales_percentage = round2(p.total_sales / grand_total * 100.0);
            }
        }

        payments
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::preprocess::tests::txn;
    use crate::record::Transaction;

    fn sample() -> Vec<Transaction> {
        vec![
            txn("2024-01-01 11:10:00", "Downtown", Some("S001"), "Burger", "Main", 12.99, Some("CREDIT")),
            txn("2024-01-01 11:10:00", "Downtown", Some("S001"), "Soda", "Beverage", 2.99, Some("CREDIT")),
            txn("2024-01-01 18:00:00", "Mall", Some("S002"), "Burger", "Main", 12.99, Some("CASH")),
            txn("2024-01-02 12:30:00", "Mall", None, "Beer", "Alcohol", 5.99, None),
            txn("2024-01-02 12:45:00", "Downtown", Some("S002"), "Soda", "Beverage", 2.99, Some("DEBIT")),
        ]
    }

    #[test]
    fn test_identical_orders_daily_trend() {
        let rows: Vec<Transaction> = (0..25)
            .map(|i| {
                txn(
                    &format!("2024-02-01 12:{:02}:00", i),
                    "X",
                    Some("S1"),
                    "Plate",
                    "Main",
                    10.0,
                    Some("CASH"),
                )
            })
            .collect();
        let daily = PosAnalyzer::new(&rows).daily_trends();

        assert_eq!(daily.len(), 1);
        assert_eq!(daily[0].transaction_count, 25);
        assert_eq!(daily[0].avg_ticket, 10.0);
        assert_eq!(daily[0].total_sales, 250.0);
        assert_eq!(daily[0].active_servers, 1);
    }

    #[test]
    fn test_daily_trends_by_date() {
        let daily = PosAnalyzer::new(&sample()).daily_trends();

        assert_eq!(daily.len(), 2);
        assert_eq!(daily[0].transaction_count, 3);
        assert_eq!(daily[0].total_sales, 28.97);
        assert_eq!(daily[0].avg_ticket, 9.66);
        assert_eq!(daily[0].active_servers, 2);
        // the server-less row still counts as a sale but not as a server
        assert_eq!(daily[1].transaction_count, 2);
        assert_eq!(daily[1].active_servers, 1);
    }

    #[test]
    fn test_hourly_patterns_sorted_by_hour() {
        let hourly = PosAnalyzer::new(&sample()).hourly_patterns();
        let hours: Vec<u32> = hourly.iter().map(|h| h.hour).collect();

        assert_eq!(hours, vec![11, 12, 18]);
        assert_eq!(hourly[0].transaction_count, 2);
        assert_eq!(hourly[0].total_sales, 15.98);
    }

    #[test]
    fn test_server_threshold() {
        let analyzer = PosAnalyzer::new(&sample());

        assert!(analyzer.server_performance(DEFAULT_MIN_TRANSACTIONS).is_empty());

        let all = analyzer.server_performance(0);
        assert_eq!(all.len(), 2);
        // S002 sold 15.98, S001 sold 15.98 too; both present, sorted descending
        assert!(all[0].total_sales >= all[1].total_sales);

        let two_or_more = analyzer.server_performance(2);
        assert_eq!(two_or_more.len(), 2);
        assert!(two_or_more.iter().all(|s| s.transaction_count >= 2));
        assert!(two_or_more.iter().all(|s| s.items_per_transaction == 1.0));
    }

    #[test]
    fn test_server_sorted_by_sales() {
        let mut rows = sample();
        rows.push(txn("2024-01-03 13:00:00", "Mall", Some("S003"), "Wine", "Alcohol", 79.9, Some("CASH")));

        let servers = PosAnalyzer::new(&rows).server_performance(0);
        assert_eq!(servers[0].server_id, "S003");
    }

    #[test]
    fn test_menu_performance() {
        let menu = PosAnalyzer::new(&sample()).menu_performance();

        let burger = menu.items.iter().find(|i| i.item_name == "Burger").unwrap();
        assert_eq!(burger.quantity_sold, 2);
        assert_eq!(burger.total_revenue, 25.98);
        assert_eq!(burger.avg_price, 12.99);
        assert_eq!(burger.price_anomalies, 0);

        let categories: Vec<&str> = menu.categories.iter().map(|c| c.item_category.as_str()).collect();
        assert_eq!(categories, vec!["Alcohol", "Beverage", "Main"]);
        assert!(menu.categories.iter().all(|c| c.unique_items == 1));
    }

    #[test]
    fn test_location_performance() {
        let locations = PosAnalyzer::new(&sample()).location_performance();

        assert_eq!(locations.len(), 2);
        assert_eq!(locations[0].location, "Downtown");
        assert_eq!(locations[0].transaction_count, 3);
        assert_eq!(locations[0].unique_servers, 2);
        assert_eq!(locations[1].unique_servers, 1);
    }

    #[test]
    fn test_payment_percentages_sum_to_100() {
        let payments = PosAnalyzer::new(&sample()).payment_types();
        let total: f64 = payments.iter().map(|p| p.sales_percentage).sum();

        assert!((total - 100.0).abs() < 0.05);
        assert!(payments.iter().any(|p| p.payment_type == "UNKNOWN"));
    }

    #[test]
    fn test_empty_table() {
        let analyzer = PosAnalyzer::new(&[]);
        assert!(analyzer.daily_trends().is_empty());
        assert!(analyzer.payment_types().is_empty());
        assert!(analyzer.server_performance(0).is_empty());
    }
}
