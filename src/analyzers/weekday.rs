//! Weekday-cyclical views of the data.
//!
//! Averages over a weekday divide by the number of calendar dates with
//! that weekday actually present, not by seven, so uneven coverage (a
//! 90-day window has thirteen of some weekdays and twelve of others)
//! does not skew the comparison.

use crate::analyzers::aggregate::group_by;
use crate::analyzers::preprocess::PosAnalyzer;
use crate::analyzers::types::{HourlyVolume, WEEK, WeekdayCoverage, WeekdayTicket};
use crate::analyzers::utility::{round1, round2};
use chrono::{NaiveDate, Weekday};
use std::collections::{HashMap, HashSet};

impl PosAnalyzer {
    /// Distinct dates present per weekday.
    pub fn weekday_date_counts(&self) -> HashMap<Weekday, usize> {
        let mut dates: HashMap<Weekday, HashSet<NaiveDate>> = HashMap::new();
        for row in self.rows() {
            dates.entry(row.day_of_week).or_default().insert(row.date);
        }
        dates.into_iter().map(|(day, d)| (day, d.len())).collect()
    }

    /// Average ticket, order count and revenue per weekday, always seven
    /// rows in Monday..Sunday order.
    pub fn daily_average_by_weekday(&self) -> Vec<WeekdayTicket> {
        let groups = group_by(self.rows(), |r| Some(r.day_of_week.num_days_from_monday()));

        WEEK.iter()
            .map(|day| match groups.get(&day.num_days_from_monday()) {
                Some(group) => {
                    let total: f64 = group.iter().map(|r| r.price()).sum();
                    WeekdayTicket {
                        day_of_week: *day,
                        avg_ticket: Some(round2(total / group.len() as f64)),
                        num_orders: group.len(),
                        total_revenue: round2(total),
                    }
                }
                None => WeekdayTicket {
                    day_of_week: *day,
                    avg_ticket: None,
                    num_orders: 0,
                    total_revenue: 0.0,
                },
            })
            .collect()
    }

    /// Average orders per weekday/hour bucket, in weekday then hour order.
    ///
    /// Only buckets with at least one order appear.
    pub fn hourly_volume_by_weekday(&self) -> Vec<HourlyVolume> {
        let date_counts = self.weekday_date_counts();

        group_by(self.rows(), |r| {
            Some((r.day_of_week.num_days_from_monday(), r.hour))
        })
        .into_iter()
        .map(|((day_index, hour), group)| {
            let day = WEEK[day_index as usize];
            let dates = date_counts.get(&day).copied().unwrap_or(1).max(1);
            HourlyVolume {
                day_of_week: day,
                hour,
                order_count: group.len(),
                avg_orders: round1(group.len() as f64 / dates as f64),
            }
        })
        .collect()
    }

    /// Totals behind [`PosAnalyzer::hourly_volume_by_weekday`], for
    /// cross-checking the chart by hand.
    pub fn weekday_coverage(&self) -> Vec<WeekdayCoverage> {
        let date_counts = self.weekday_date_counts();

        WEEK.iter()
            .map(|day| {
                let total_orders = self.rows().iter().filter(|r| r.day_of_week == *day).count();
                let dates = date_counts.get(day).copied().unwrap_or(0);
                WeekdayCoverage {
                    day_of_week: *day,
                    total_orders,
                    dates,
                    avg_orders_per_date: (dates > 0)
                        .then(|| round1(total_orders as f64 / dates as f64)),
                }
            })
            .collect()
    }
}
