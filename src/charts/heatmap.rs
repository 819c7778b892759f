use super::{PlotError, Result, index_label, yl_or_rd};
use crate::analyzers::types::LocationHourHeatmap;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::path::Path;

const COLOUR_BAR_WIDTH: u32 = 160;
const COLOUR_BAR_STEPS: usize = 100;

/// Draws the location x hour grid, each cell coloured by its average
/// and annotated with it to one decimal, with a colour bar on the right.
pub fn location_hour_heatmap_chart(heatmap: &LocationHourHeatmap, output_path: &Path) -> Result<()> {
    if heatmap.locations.is_empty() || heatmap.hours.is_empty() {
        return Err(PlotError::InvalidData("Heatmap has no cells".to_string()));
    }

    let max = heatmap.max_value();
    let scale = |v: f64| if max > 0.0 { v / max } else { 0.0 };

    let hour_labels: Vec<String> = heatmap.hours.iter().map(|h| h.to_string()).collect();
    let rows = heatmap.locations.len();
    let height = 200 + 70 * rows as u32;

    let root = BitMapBackend::new(output_path, (1400, height)).into_drawing_area();
    root.fill(&WHITE)
        .map_err(|e| PlotError::DrawingArea(e.to_string()))?;
    let (grid_area, bar_area) = root.split_horizontally(1400 - COLOUR_BAR_WIDTH);

    let mut chart = ChartBuilder::on(&grid_area)
        .caption("Average Orders per Hour by Location", ("sans-serif", 32))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(140)
        .build_cartesian_2d(
            -0.5..(heatmap.hours.len() as f64 - 0.5),
            -0.5..(rows as f64 - 0.5),
        )
        .map_err(|e| PlotError::ChartConfig(e.to_string()))?;

    chart
        .configure_mesh()
        .disable_mesh()
        .x_labels(heatmap.hours.len())
        .y_labels(rows)
        .x_label_formatter(&|x| index_label(*x, &hour_labels))
        .y_label_formatter(&|y| index_label(*y, &heatmap.locations))
        .x_desc("Hour of Day")
        .y_desc("Location")
        .label_style(("sans-serif", 18))
        .draw()
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

    let mut cells = Vec::with_capacity(rows * heatmap.hours.len());
    for (j, location) in heatmap.locations.iter().enumerate() {
        for (i, value) in heatmap.row(location).into_iter().enumerate() {
            cells.push((i as f64, j as f64, value));
        }
    }

    chart
        .draw_series(cells.iter().map(|(x, y, v)| {
            Rectangle::new(
                [(x - 0.5, y - 0.5), (x + 0.5, y + 0.5)],
                yl_or_rd(scale(*v)).filled(),
            )
        }))
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

    let centred = Pos::new(HPos::Center, VPos::Center);
    chart
        .draw_series(cells.iter().map(|(x, y, v)| {
            let ink: &RGBColor = if scale(*v) > 0.6 { &WHITE } else { &BLACK };
            Text::new(
                format!("{v:.1}"),
                (*x, *y),
                ("sans-serif", 16).into_font().color(ink).pos(centred),
            )
        }))
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

    draw_colour_bar(&bar_area, max)?;

    root.present()
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

    Ok(())
}

fn draw_colour_bar(area: &DrawingArea<BitMapBackend<'_>, Shift>, max: f64) -> Result<()> {
    let top = if max > 0.0 { max } else { 1.0 };

    let mut bar = ChartBuilder::on(area)
        .margin_top(70)
        .margin_bottom(70)
        .margin_right(20)
        .y_label_area_size(70)
        .build_cartesian_2d(0.0..1.0, 0.0..top)
        .map_err(|e| PlotError::ChartConfig(e.to_string()))?;

    bar.configure_mesh()
        .disable_mesh()
        .x_labels(0)
        .y_desc("Average Orders per Hour")
        .label_style(("sans-serif", 14))
        .draw()
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

    let step = top / COLOUR_BAR_STEPS as f64;
    bar.draw_series((0..COLOUR_BAR_STEPS).map(|i| {
        let lo = i as f64 * step;
        Rectangle::new(
            [(0.0, lo), (1.0, lo + step)],
            yl_or_rd((lo + step / 2.0) / top).filled(),
        )
    }))
    .map_err(|e| PlotError::Drawing(e.to_string()))?;

    Ok(())
}
