use super::{PlotError, Result, index_label};
use crate::analyzers::heatmap::OPERATING_HOURS;
use crate::analyzers::types::{HourlyVolume, WEEK, weekday_name};
use crate::analyzers::utility::mean;
use chrono::Weekday;
use plotters::prelude::*;
use std::path::Path;

fn weekday_colour(day: Weekday) -> RGBColor {
    match day {
        Weekday::Mon => RGBColor(0xFF, 0x99, 0x99),
        Weekday::Tue => RGBColor(0x66, 0xB2, 0xFF),
        Weekday::Wed => RGBColor(0x99, 0xFF, 0x99),
        Weekday::Thu => RGBColor(0xFF, 0xCC, 0x99),
        Weekday::Fri => RGBColor(0xFF, 0x99, 0xFF),
        Weekday::Sat => RGBColor(0xFF, 0xE6, 0x80),
        Weekday::Sun => RGBColor(0xB2, 0xB2, 0xB2),
    }
}

/// Draws one line per weekday of average orders across operating hours.
///
/// The legend shows each weekday's mean over the hours it has data for.
pub fn weekday_hourly_line_chart(volume: &[HourlyVolume], output_path: &Path) -> Result<()> {
    if volume.is_empty() {
        return Err(PlotError::InvalidData("No hourly volume to plot".to_string()));
    }

    let first_hour = *OPERATING_HOURS.start() as f64;
    let last_hour = *OPERATING_HOURS.end() as f64;
    let y_max = volume.iter().map(|v| v.avg_orders).fold(0.0, f64::max);
    let y_top = if y_max > 0.0 { y_max * 1.1 } else { 1.0 };

    let root = BitMapBackend::new(output_path, (1500, 800)).into_drawing_area();
    root.fill(&WHITE)
        .map_err(|e| PlotError::DrawingArea(e.to_string()))?;

    let mut chart = ChartBuilder::on(&root)
        .caption(
            "Average Hourly Order Volume by Day of Week",
            ("sans-serif", 32),
        )
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d((first_hour - 0.5)..(last_hour + 0.5), 0.0..y_top)
        .map_err(|e| PlotError::ChartConfig(e.to_string()))?;

    chart
        .configure_mesh()
        .x_labels(OPERATING_HOURS.count())
        .x_label_formatter(&|x| format!("{x:.0}"))
        .x_desc("Hour of Day")
        .y_desc("Average Number of Orders")
        .label_style(("sans-serif", 18))
        .draw()
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

    for day in WEEK {
        let points: Vec<(f64, f64)> = volume
            .iter()
            .filter(|v| v.day_of_week == day && OPERATING_HOURS.contains(&v.hour))
            .map(|v| (v.hour as f64, v.avg_orders))
            .collect();
        if points.is_empty() {
            continue;
        }

        let colour = weekday_colour(day);
        let day_mean = mean(&points.iter().map(|p| p.1).collect::<Vec<_>>());

        chart
            .draw_series(LineSeries::new(points.iter().copied(), colour.stroke_width(2)))
            .map_err(|e| PlotError::Drawing(e.to_string()))?
            .label(format!("{} (avg: {day_mean:.1})", weekday_name(day)))
            .legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 20, y)], colour.stroke_width(2))
            });

        chart
            .draw_series(points.iter().map(|p| Circle::new(*p, 5, colour.filled())))
            .map_err(|e| PlotError::Drawing(e.to_string()))?;
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(&WHITE.mix(0.85))
        .border_style(&BLACK)
        .label_font(("sans-serif", 16))
        .draw()
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

    root.present()
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

    Ok(())
}

/// Draws a single series of `(label, value)` points in order, e.g. total
/// sales per date or per hour.
pub fn trend_line_chart(
    points: &[(String, f64)],
    title: &str,
    x_label: &str,
    y_label: &str,
    output_path: &Path,
) -> Result<()> {
    if points.is_empty() {
        return Err(PlotError::InvalidData("Data cannot be empty".to_string()));
    }

    let labels: Vec<String> = points.iter().map(|(l, _)| l.clone()).collect();
    let y_max = points.iter().map(|(_, v)| *v).fold(0.0, f64::max);
    let y_top = if y_max > 0.0 { y_max * 1.1 } else { 1.0 };
    let x_end = (points.len() as f64 - 0.5).max(0.5);

    let root = BitMapBackend::new(output_path, (1500, 600)).into_drawing_area();
    root.fill(&WHITE)
        .map_err(|e| PlotError::DrawingArea(e.to_string()))?;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 32))
        .margin(20)
        .x_label_area_size(80)
        .y_label_area_size(90)
        .build_cartesian_2d(-0.5..x_end, 0.0..y_top)
        .map_err(|e| PlotError::ChartConfig(e.to_string()))?;

    chart
        .configure_mesh()
        .x_labels(points.len().min(24))
        .x_label_formatter(&|x| index_label(*x, &labels))
        .x_desc(x_label)
        .y_desc(y_label)
        .label_style(("sans-serif", 16))
        .draw()
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

    let series: Vec<(f64, f64)> = points
        .iter()
        .enumerate()
        .map(|(i, (_, v))| (i as f64, *v))
        .collect();

    chart
        .draw_series(LineSeries::new(series.iter().copied(), BLUE.stroke_width(2)))
        .map_err(|e| PlotError::Drawing(e.to_string()))?;
    chart
        .draw_series(series.iter().map(|p| Circle::new(*p, 3, BLUE.filled())))
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

    root.present()
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

    Ok(())
}
