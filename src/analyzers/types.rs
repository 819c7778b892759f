//! Summary tables produced by the aggregators.
//!
//! Each row pairs its grouping key with named metrics, so tables can be
//! exported as CSV or JSON without any column flattening.

use chrono::{NaiveDate, Weekday};
use serde::{Serialize, Serializer};

/// Monday-first ordering used for every weekday-keyed output.
pub const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Full English weekday name, e.g. `"Monday"`.
pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

fn serialize_weekday<S: Serializer>(day: &Weekday, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(weekday_name(*day))
}

/// Sales for one calendar date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyTrend {
    pub date: NaiveDate,
    pub transaction_count: usize,
    pub total_sales: f64,
    pub avg_ticket: f64,
    pub items_sold: usize,
    pub active_servers: usize,
}

/// Sales for one hour of the day, summed over all dates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlyPattern {
    pub hour: u32,
    pub transaction_count: usize,
    pub total_sales: f64,
    pub avg_ticket: f64,
    pub items_sold: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServerPerformance {
    pub server_id: String,
    pub transaction_count: usize,
    pub total_sales: f64,
    pub avg_ticket: f64,
    pub items_sold: usize,
    pub price_anomalies: usize,
    pub items_per_transaction: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemPerformance {
    pub item_name: String,
    pub quantity_sold: usize,
    pub total_revenue: f64,
    pub avg_price: f64,
    pub price_anomalies: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryPerformance {
    pub item_category: String,
    pub quantity_sold: usize,
    pub total_revenue: f64,
    pub avg_price: f64,
    pub unique_items: usize,
}

/// Item-level and category-level menu tables.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MenuPerformance {
    pub items: Vec<ItemPerformance>,
    pub categories: Vec<CategoryPerformance>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationPerformance {
    pub location: String,
    pub transaction_count: usize,
    pub total_sales: f64,
    pub avg_ticket: f64,
    pub items_sold: usize,
    pub unique_servers: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentSummary {
    pub payment_type: String,
    pub transaction_count: usize,
    pub total_sales: f64,
    pub avg_ticket: f64,
    pub sales_percentage: f64,
}

/// Average ticket for one weekday.
///
/// `avg_ticket` is `None` when the weekday never occurs in the data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekdayTicket {
    #[serde(serialize_with = "serialize_weekday")]
    pub day_of_week: Weekday,
    pub avg_ticket: Option<f64>,
    pub num_orders: usize,
    pub total_revenue: f64,
}

/// Orders in one weekday/hour bucket, averaged over the matching dates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlyVolume {
    #[serde(serialize_with = "serialize_weekday")]
    pub day_of_week: Weekday,
    pub hour: u32,
    pub order_count: usize,
    pub avg_orders: f64,
}

/// How many dates of a weekday the data covers, and the orders on them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekdayCoverage {
    #[serde(serialize_with = "serialize_weekday")]
    pub day_of_week: Weekday,
    pub total_orders: usize,
    pub dates: usize,
    pub avg_orders_per_date: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatmapCell {
    pub location: String,
    pub hour: u32,
    pub total_orders: usize,
    pub avg_orders: f64,
}

/// Average orders per location and operating hour.
///
/// Every location in the data has a cell for every hour in `hours`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationHourHeatmap {
    pub locations: Vec<String>,
    pub hours: Vec<u32>,
    pub cells: Vec<HeatmapCell>,
}

impl LocationHourHeatmap {
    pub fn get(&self, location: &str, hour: u32) -> Option<f64> {
        self.cells
            .iter()
            .find(|c| c.location == location && c.hour == hour)
            .map(|c| c.avg_orders)
    }

    /// Averages for `location` in `hours` order.
    pub fn row(&self, location: &str) -> Vec<f64> {
        self.hours
            .iter()
            .map(|h| self.get(location, *h).unwrap_or(0.0))
            .collect()
    }

    pub fn location_sum(&self, location: &str) -> f64 {
        self.row(location).iter().sum()
    }

    pub fn max_value(&self) -> f64 {
        self.cells.iter().map(|c| c.avg_orders).fold(0.0, f64::max)
    }
}

/// Headline numbers for the whole dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BasicStats {
    pub date_range: Option<(NaiveDate, NaiveDate)>,
    pub total_sales: f64,
    pub total_transactions: usize,
    pub unique_locations: usize,
    pub unique_servers: usize,
    pub price_anomalies: usize,
}

/// Every summary computed over one analyzer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub basic_stats: BasicStats,
    pub daily_trends: Vec<DailyTrend>,
    pub hourly_patterns: Vec<HourlyPattern>,
    pub server_performance: Vec<ServerPerformance>,
    pub menu_performance: MenuPerformance,
    pub location_performance: Vec<LocationPerformance>,
    pub payment_analysis: Vec<PaymentSummary>,
}
