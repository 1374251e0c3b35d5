use crate::Forecast::forecast_model::HISTOGRAM_BINS;
use crate::MassTransfer::mass_transfer_rates::MassTransferParameter;
use crate::gui::gui_plot::{
    absorption_stripping_panel, actual_vs_predicted_panel, error_histogram_panel,
    membrane_flux_panel, residual_panel,
};
use crate::session::AmmoniaSession;
use crate::settings::AppConfig;
use eframe::egui;
use egui::IconData;
use log::{error, info};
use std::path::Path;

pub fn gui_main(config: AppConfig) -> Result<(), eframe::Error> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 800.0])
            .with_title("Optimized Ammonia Recovery Process")
            .with_icon(create_programmatic_icon()),
        ..Default::default()
    };
    eframe::run_native(
        "Optimized Ammonia Recovery Process",
        options,
        Box::new(|cc: &eframe::CreationContext<'_>| Ok(Box::new(AmmoniaApp::new(cc, config)))),
    )
}

fn create_programmatic_icon() -> IconData {
    let size = 32;
    let mut rgba = vec![0u8; size * size * 4];
    for y in 0..size {
        for x in 0..size {
            let idx = (y * size + x) * 4;
            let center = size as f32 / 2.0;
            let dist = ((x as f32 - center).powi(2) + (y as f32 - center).powi(2)).sqrt();
            if dist < 12.0 {
                rgba[idx] = 0;
                rgba[idx + 1] = (120.0 + 100.0 * (1.0 - dist / 12.0)) as u8;
                rgba[idx + 2] = 255;
                rgba[idx + 3] = 255;
            }
        }
    }
    IconData {
        rgba,
        width: size as u32,
        height: size as u32,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    ModelEvaluation,
    MembraneFlux,
    AbsorptionStripping,
}

impl Tab {
    pub const ALL: [Tab; 3] = [Tab::ModelEvaluation, Tab::MembraneFlux, Tab::AbsorptionStripping];

    pub fn title(&self) -> &'static str {
        match self {
            Tab::ModelEvaluation => "Model Evaluation",
            Tab::MembraneFlux => "Membrane Flux",
            Tab::AbsorptionStripping => "Absorption & Stripping",
        }
    }
}

pub struct AmmoniaApp {
    session: AmmoniaSession,
    selected_tab: Tab,
    /// last error, shown in red under the status line
    error_message: Option<String>,
}

impl AmmoniaApp {
    pub fn new(cc: &eframe::CreationContext<'_>, config: AppConfig) -> Self {
        cc.egui_ctx.set_visuals(egui::Visuals::dark());
        Self::with_session(AmmoniaSession::new(config))
    }

    pub fn with_session(session: AmmoniaSession) -> Self {
        Self {
            session,
            selected_tab: Tab::ModelEvaluation,
            error_message: None,
        }
    }

    pub fn session(&self) -> &AmmoniaSession {
        &self.session
    }

    pub fn load_file(&mut self, path: &Path) {
        match self.session.load_dataset(path) {
            Ok(()) => {
                info!("{}", self.session.status());
                self.error_message = None;
            }
            Err(e) => {
                error!("Failed to load '{}': {}", path.display(), e);
                self.error_message = Some(e.to_string());
            }
        }
    }

    pub fn move_slider(&mut self, parameter: MassTransferParameter, raw: i32) {
        if let Err(e) = self.session.set_parameter(parameter, raw) {
            error!("{}", e);
            self.error_message = Some(e.to_string());
        }
    }

    fn top_panel(&mut self, ui: &mut egui::Ui) {
        ui.vertical_centered(|ui| {
            ui.heading("Optimized Ammonia Recovery Process");
        });
        ui.horizontal(|ui| {
            ui.label("Select a CSV Dataset for Analysis:");
            if ui.button("📂 Load Dataset").clicked() {
                if let Some(path) = rfd::FileDialog::new()
                    .add_filter("CSV files", &["csv"])
                    .pick_file()
                {
                    self.load_file(&path);
                }
            }
        });
        ui.label(self.session.status());
        if let Some(message) = &self.error_message {
            ui.colored_label(egui::Color32::RED, message);
        }
    }

    fn slider_panel(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            for parameter in MassTransferParameter::ALL {
                let spec = *self.session.config().sliders.get(parameter);
                let mut raw = self.session.raw_value(parameter);
                ui.label(format!("{}:", parameter));
                let response = ui.add(
                    egui::Slider::new(&mut raw, spec.min..=spec.max)
                        .show_value(false)
                        .step_by(1.0),
                );
                ui.label(format!("{}", spec.effective(raw)));
                if response.changed() {
                    self.move_slider(parameter, raw);
                }
                ui.add_space(10.0);
            }
        });
    }

    fn model_evaluation_tab(&self, ui: &mut egui::Ui) {
        let Some(forecast) = self.session.forecast() else {
            ui.label("Load a dataset to evaluate the forecast");
            return;
        };
        let height = 250.0;
        ui.columns(3, |columns| {
            actual_vs_predicted_panel(forecast).show(&mut columns[0], height);
            residual_panel(forecast).show(&mut columns[1], height);
            error_histogram_panel(forecast, HISTOGRAM_BINS).show(&mut columns[2], height);
        });
        ui.separator();
        ui.monospace(forecast.metrics_text());
    }

    fn mass_transfer_tab(&self, ui: &mut egui::Ui, tab: Tab) {
        let (Some(dataset), Some(result)) = (self.session.dataset(), self.session.mass_transfer())
        else {
            ui.label("Load a dataset to see the mass-transfer rates");
            return;
        };
        let panel = match tab {
            Tab::MembraneFlux => membrane_flux_panel(result, dataset.time_index()),
            _ => absorption_stripping_panel(result, dataset.time_index()),
        };
        panel.show(ui, 400.0);
        ui.label(format!("Free NH3 fraction: {:.6}", result.nh3_fraction));
    }
}

impl eframe::App for AmmoniaApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::TopBottomPanel::top("load_panel").show(ctx, |ui| {
            self.top_panel(ui);
        });
        egui::TopBottomPanel::bottom("slider_panel").show(ctx, |ui| {
            ui.add_space(5.0);
            self.slider_panel(ui);
            ui.add_space(5.0);
        });
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.horizontal(|ui| {
                for tab in Tab::ALL {
                    ui.selectable_value(&mut self.selected_tab, tab, tab.title());
                }
            });
            ui.separator();
            egui::ScrollArea::vertical().show(ui, |ui| match self.selected_tab {
                Tab::ModelEvaluation => self.model_evaluation_tab(ui),
                tab => self.mass_transfer_tab(ui, tab),
            });
        });
    }
}
