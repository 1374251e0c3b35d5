use crate::Forecast::forecast_model::{ErrorHistogram, ForecastResult};
use crate::MassTransfer::mass_transfer_rates::MassTransferResult;
use eframe::egui;
use egui::Color32;
use egui_plot::{Bar, BarChart, HLine, Legend, Line, LineStyle, Plot, PlotPoints, Points};
use nalgebra::DVector;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SeriesKind {
    Line,
    Scatter,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlotSeries {
    pub name: String,
    pub kind: SeriesKind,
    pub color: Color32,
    pub points: Vec<[f64; 2]>,
}

impl PlotSeries {
    pub fn new(name: &str, kind: SeriesKind, color: Color32, points: Vec<[f64; 2]>) -> Self {
        Self {
            name: name.to_string(),
            kind,
            color,
            points,
        }
    }
}

/// One x-y plot with any number of line or scatter series
#[derive(Debug, Clone, PartialEq)]
pub struct PlotPanel {
    pub id: String,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub series: Vec<PlotSeries>,
    /// dashed horizontal line at y = 0
    pub zero_line: bool,
}

impl PlotPanel {
    pub fn new(id: &str, title: &str, x_label: &str, y_label: &str) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            x_label: x_label.to_string(),
            y_label: y_label.to_string(),
            series: Vec::new(),
            zero_line: false,
        }
    }

    pub fn with_series(mut self, series: PlotSeries) -> Self {
        self.series.push(series);
        self
    }

    pub fn with_zero_line(mut self) -> Self {
        self.zero_line = true;
        self
    }

    pub fn show(&self, ui: &mut egui::Ui, height: f32) {
        ui.label(egui::RichText::new(&self.title).strong());
        Plot::new(&self.id)
            .height(height)
            .x_axis_label(self.x_label.clone())
            .y_axis_label(self.y_label.clone())
            .legend(Legend::default())
            .show(ui, |plot_ui| {
                for series in &self.series {
                    let points = PlotPoints::from(series.points.clone());
                    match series.kind {
                        SeriesKind::Line => {
                            plot_ui.line(Line::new(series.name.clone(), points).color(series.color))
                        }
                        SeriesKind::Scatter => plot_ui.points(
                            Points::new(series.name.clone(), points)
                                .color(series.color)
                                .radius(3.0),
                        ),
                    }
                }
                if self.zero_line {
                    plot_ui.hline(
                        HLine::new("zero", 0.0)
                            .color(Color32::GRAY)
                            .style(LineStyle::dashed_loose()),
                    );
                }
            });
    }
}

/// Bar chart of an [`ErrorHistogram`]
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramPanel {
    pub id: String,
    pub title: String,
    /// (bin center, count)
    pub bars: Vec<(f64, f64)>,
    pub bar_width: f64,
}

impl HistogramPanel {
    pub fn new(id: &str, title: &str, histogram: &ErrorHistogram) -> Self {
        let bars = histogram
            .bin_centers()
            .into_iter()
            .zip(histogram.counts.iter())
            .map(|(center, &count)| (center, count as f64))
            .collect();
        Self {
            id: id.to_string(),
            title: title.to_string(),
            bars,
            bar_width: histogram.bin_width(),
        }
    }

    pub fn show(&self, ui: &mut egui::Ui, height: f32) {
        ui.label(egui::RichText::new(&self.title).strong());
        let bars: Vec<Bar> = self
            .bars
            .iter()
            .map(|&(center, count)| Bar::new(center, count).width(self.bar_width))
            .collect();
        Plot::new(&self.id)
            .height(height)
            .x_axis_label("Residual")
            .y_axis_label("Count")
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(BarChart::new("errors", bars).color(Color32::LIGHT_BLUE));
            });
    }
}

fn pairs(x: &DVector<f64>, y: &DVector<f64>) -> Vec<[f64; 2]> {
    x.iter().zip(y.iter()).map(|(&x, &y)| [x, y]).collect()
}

/// Held-out records: measured value on x, predicted value on y
pub fn actual_vs_predicted_panel(result: &ForecastResult) -> PlotPanel {
    PlotPanel::new("actual_vs_predicted", "Actual vs Predicted", "Actual", "Predicted").with_series(
        PlotSeries::new(
            "held-out records",
            SeriesKind::Scatter,
            Color32::from_rgb(255, 165, 0),
            pairs(&result.actual, &result.predicted),
        ),
    )
}

/// Held-out records: measured value on x, residual on y
pub fn residual_panel(result: &ForecastResult) -> PlotPanel {
    PlotPanel::new("residuals", "Residual Plot", "Actual", "Residual")
        .with_series(PlotSeries::new(
            "residuals",
            SeriesKind::Scatter,
            Color32::from_rgb(160, 32, 240),
            pairs(&result.actual, &result.residuals()),
        ))
        .with_zero_line()
}

pub fn error_histogram_panel(result: &ForecastResult, bins: usize) -> HistogramPanel {
    HistogramPanel::new(
        "error_histogram",
        "Prediction Error Distribution",
        &result.error_histogram(bins),
    )
}

pub fn absorption_stripping_panel(result: &MassTransferResult, time: &DVector<f64>) -> PlotPanel {
    let params = &result.params;
    PlotPanel::new(
        "absorption_stripping",
        &format!("Absorption & Stripping vs Time (pH={})", params.pH),
        "Time",
        "Rate",
    )
    .with_series(PlotSeries::new(
        &format!("Absorption (k_G={:.3})", params.k_G),
        SeriesKind::Line,
        Color32::BLUE,
        pairs(time, &result.absorption_rate),
    ))
    .with_series(PlotSeries::new(
        &format!("Stripping (k_L={:.3})", params.k_L),
        SeriesKind::Line,
        Color32::GREEN,
        pairs(time, &result.stripping_rate),
    ))
}

pub fn membrane_flux_panel(result: &MassTransferResult, time: &DVector<f64>) -> PlotPanel {
    let params = &result.params;
    PlotPanel::new(
        "membrane_flux",
        &format!("Membrane Flux vs Time (pH={})", params.pH),
        "Time",
        "Flux",
    )
    .with_series(PlotSeries::new(
        &format!("Membrane Flux (P_A={:.1e})", params.P_A),
        SeriesKind::Line,
        Color32::RED,
        pairs(time, &result.membrane_flux),
    ))
}
