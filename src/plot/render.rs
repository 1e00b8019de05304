use super::{ChartSpec, PanelSpec, PlottingError};
use plotters::{
    coord::{
        ranged1d::{AsRangedCoord, ValueFormatter},
        Shift,
    },
    prelude::*,
};
use std::path::Path;

const TITLE_HEIGHT: u32 = 40;

pub(super) fn draw(
    spec: &ChartSpec,
    path: &Path,
    panel_size: (u32, u32),
) -> Result<(), PlottingError> {
    let draw_err = |message: String| PlottingError::Draw {
        path: path.to_path_buf(),
        message,
    };
    let (width, height) = panel_size;
    let n_panel = spec.panels.len().max(1);
    let plot = SVGBackend::new(path, (width, TITLE_HEIGHT + height * n_panel as u32))
        .into_drawing_area();
    plot.fill(&WHITE).map_err(|e| draw_err(e.to_string()))?;
    let plot = plot
        .titled(&spec.title, ("sans-serif", 24))
        .map_err(|e| draw_err(e.to_string()))?;

    let areas = plot.split_evenly((n_panel, 1));
    for (k, (area, panel)) in areas.iter().zip(&spec.panels).enumerate() {
        let bottom = k + 1 == spec.panels.len();
        let (lo, hi) = panel.y_range;
        let drawn = if panel.log_scale {
            draw_panel(area, spec.x_range, panel, (lo..hi).log_scale(), bottom)
        } else {
            draw_panel(area, spec.x_range, panel, lo..hi, bottom)
        };
        drawn.map_err(draw_err)?;
    }
    plot.present().map_err(|e| draw_err(e.to_string()))?;
    Ok(())
}

fn draw_panel<DB, Y>(
    area: &DrawingArea<DB, Shift>,
    x_range: (f64, f64),
    panel: &PanelSpec,
    y_range: Y,
    bottom: bool,
) -> Result<(), String>
where
    DB: DrawingBackend,
    Y: AsRangedCoord<Value = f64>,
    Y::CoordDescType: ValueFormatter<f64>,
{
    let mut chart = ChartBuilder::on(area)
        .set_label_area_size(LabelAreaPosition::Left, 80)
        .set_label_area_size(LabelAreaPosition::Bottom, 40)
        .margin(10)
        .build_cartesian_2d(x_range.0..x_range.1, y_range)
        .map_err(|e| e.to_string())?;
    let mut mesh = chart.configure_mesh();
    mesh.y_desc(panel.quantity.to_string());
    if bottom {
        mesh.x_desc("Wavelength [micron]");
    }
    mesh.draw().map_err(|e| e.to_string())?;

    for series in &panel.series {
        let (r, g, b) = series.color;
        let rgb = RGBColor(r, g, b);
        chart
            .draw_series(LineSeries::new(series.points.iter().cloned(), &rgb))
            .map_err(|e| e.to_string())?
            .label(&series.label)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &rgb));
    }
    chart
        .configure_series_labels()
        .border_style(&BLACK)
        .background_style(&WHITE.mix(0.8))
        .position(SeriesLabelPosition::UpperRight)
        .draw()
        .map_err(|e| e.to_string())?;
    Ok(())
}
