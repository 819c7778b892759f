use crate::analyzers::preprocess::PosAnalyzer;
use crate::analyzers::types::{HeatmapCell, LocationHourHeatmap};
use crate::analyzers::utility::round1;
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::ops::RangeInclusive;

/// Restaurant operating hours, 11 AM to 10 PM.
pub const OPERATING_HOURS: RangeInclusive<u32> = 11..=22;

impl PosAnalyzer {
    /// Average orders per location and operating hour.
    ///
    /// A cell's total is divided by the number of distinct dates on which
    /// that location recorded any order. Hours without orders are present
    /// with 0.0; orders outside [`OPERATING_HOURS`] are not shown.
    pub fn location_hour_heatmap(&self) -> LocationHourHeatmap {
        let mut location_dates: BTreeMap<&str, HashSet<NaiveDate>> = BTreeMap::new();
        let mut totals: HashMap<(&str, u32), usize> = HashMap::new();

        for row in self.rows() {
            location_dates.entry(row.location()).or_default().insert(row.date);
            *totals.entry((row.location(), row.hour)).or_default() += 1;
        }

        let hours: Vec<u32> = OPERATING_HOURS.collect();
        let mut cells = Vec::with_capacity(location_dates.len() * hours.len());

        for (location, dates) in &location_dates {
            let days = dates.len().max(1) as f64;
            for hour in &hours {
                let total_orders = totals.get(&(*location, *hour)).copied().unwrap_or(0);
                cells.push(HeatmapCell {
                    location: location.to_string(),
                    hour: *hour,
                    total_orders,
                    avg_orders: round1(total_orders as f64 / days),
                });
            }
        }

        LocationHourHeatmap {
            locations: location_dates.keys().map(|l| l.to_string()).collect(),
            hours,
            cells,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::preprocess::tests::txn;

    #[test]
    fn test_every_operating_hour_present() {
        let rows = vec![
            txn("2024-01-01 12:00:00", "Airport", None, "Soda", "Beverage", 2.99, None),
            txn("2024-01-02 12:30:00", "Airport", None, "Soda", "Beverage", 2.99, None),
            txn("2024-01-02 12:40:00", "Airport", None, "Soda", "Beverage", 2.99, None),
            txn("2024-01-01 18:00:00", "Mall", None, "Soda", "Beverage", 2.99, None),
        ];
        let heatmap = PosAnalyzer::new(&rows).location_hour_heatmap();

        assert_eq!(heatmap.locations, vec!["Airport", "Mall"]);
        assert_eq!(heatmap.cells.len(), 2 * 12);
        for location in &heatmap.locations {
            for hour in 11..=22 {
                assert!(heatmap.get(location, hour).is_some());
            }
        }

        // Airport: 3 noon orders over 2 dates
        assert_eq!(heatmap.get("Airport", 12), Some(1.5));
        assert_eq!(heatmap.get("Airport", 13), Some(0.0));
        // Mall has a single date
        assert_eq!(heatmap.get("Mall", 18), Some(1.0));
        assert_eq!(heatmap.get("Mall", 12), Some(0.0));
    }

    #[test]
    fn test_hours_outside_operating_range_dropped() {
        let rows = vec![
            txn("2024-01-01 09:00:00", "Mall", None, "Soda", "Beverage", 2.99, None),
            txn("2024-01-01 11:00:00", "Mall", None, "Soda", "Beverage", 2.99, None),
        ];
        let heatmap = PosAnalyzer::new(&rows).location_hour_heatmap();

        assert_eq!(heatmap.get("Mall", 9), None);
        assert_eq!(heatmap.location_sum("Mall"), 1.0);
        assert_eq!(heatmap.max_value(), 1.0);
    }

    #[test]
    fn test_row_in_hour_order() {
        let rows = vec![txn("2024-01-01 22:15:00", "Mall", None, "Beer", "Alcohol", 5.99, None)];
        let row = PosAnalyzer::new(&rows).location_hour_heatmap().row("Mall");

        assert_eq!(row.len(), 12);
        assert_eq!(row[11], 1.0);
        assert_eq!(row[..11].iter().sum::<f64>(), 0.0);
    }
}
