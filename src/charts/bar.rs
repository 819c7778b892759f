use super::{PlotError, Result, index_label};
use crate::analyzers::types::{WeekdayTicket, weekday_name};
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::path::Path;

/// Draws one bar per weekday, Monday first, each annotated with its
/// average ticket. Weekdays without orders are left empty.
pub fn weekday_ticket_bar_chart(tickets: &[WeekdayTicket], output_path: &Path) -> Result<()> {
    if tickets.is_empty() {
        return Err(PlotError::InvalidData("No weekday data to plot".to_string()));
    }

    let labels: Vec<String> = tickets
        .iter()
        .map(|t| weekday_name(t.day_of_week).to_string())
        .collect();
    let y_max = tickets
        .iter()
        .filter_map(|t| t.avg_ticket)
        .fold(0.0, f64::max);
    let y_top = if y_max > 0.0 { y_max * 1.15 } else { 1.0 };

    let root = BitMapBackend::new(output_path, (1200, 600)).into_drawing_area();
    root.fill(&WHITE)
        .map_err(|e| PlotError::DrawingArea(e.to_string()))?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Average Ticket Price by Day of Week", ("sans-serif", 32))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(90)
        .build_cartesian_2d(-0.5..(tickets.len() as f64 - 0.5), 0.0..y_top)
        .map_err(|e| PlotError::ChartConfig(e.to_string()))?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(tickets.len())
        .x_label_formatter(&|x| index_label(*x, &labels))
        .y_label_formatter(&|y| format!("${y:.2}"))
        .x_desc("Day of Week")
        .y_desc("Average Ticket Price ($)")
        .label_style(("sans-serif", 18))
        .draw()
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

    let count = tickets.len() as f64;
    chart
        .draw_series(tickets.iter().enumerate().filter_map(|(i, t)| {
            let value = t.avg_ticket?;
            let x = i as f64;
            let colour = HSLColor(i as f64 / count, 0.65, 0.6);
            Some(Rectangle::new(
                [(x - 0.4, 0.0), (x + 0.4, value)],
                colour.filled(),
            ))
        }))
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

    let value_style =
        TextStyle::from(("sans-serif", 18).into_font()).pos(Pos::new(HPos::Center, VPos::Bottom));
    chart
        .draw_series(tickets.iter().enumerate().filter_map(|(i, t)| {
            let value = t.avg_ticket?;
            Some(Text::new(
                format!("${value:.2}"),
                (i as f64, value),
                value_style.clone(),
            ))
        }))
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

    root.present()
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

    Ok(())
}
