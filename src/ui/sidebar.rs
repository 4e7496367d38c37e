//! Right-hand control panel: asset pickers, parameters, run trigger

use eframe::egui;
use egui::{RichText, Vec2};

use crate::models::ParamField;
use crate::ui::app::AppUI;

const MODEL_EXTENSIONS: &[&str] = &["pt"];
const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "webp", "tif", "tiff"];

pub fn render_sidebar(ctx: &egui::Context, app: &mut AppUI, enabled: bool) {
    egui::SidePanel::right("control_panel")
        .resizable(false)
        .exact_width(360.0)
        .show(ctx, |ui| {
            ui.add_enabled_ui(enabled, |ui| {
                ui.add_space(8.0);
                ui.heading("ScanCAM");
                ui.label(RichText::new("Sliding Window Grad-CAM Analyzer").weak());
                ui.separator();

                render_assets(ui, app);
                ui.separator();

                render_parameters(ui, app);
                ui.separator();

                if ui.link("Open result folder").clicked() {
                    app.open_result_folder();
                }
                ui.add_space(12.0);

                render_run_button(ui, app);
            });
        });
}

fn render_assets(ui: &mut egui::Ui, app: &mut AppUI) {
    ui.strong("1. Model");
    ui.horizontal(|ui| {
        if ui.button("Select model...").clicked() {
            let path = rfd::FileDialog::new()
                .add_filter("PyTorch model", MODEL_EXTENSIONS)
                .pick_file();
            app.controller.select_model_path(path);
        }
        let name = app
            .controller
            .model()
            .file()
            .map(|f| f.name.clone())
            .unwrap_or_else(|| "No model selected".to_string());
        ui.label(name);
    });

    ui.add_space(6.0);
    ui.strong("2. Image");
    ui.horizontal(|ui| {
        if ui.button("Select image...").clicked() {
            let path = rfd::FileDialog::new()
                .add_filter("Images", IMAGE_EXTENSIONS)
                .pick_file();
            app.controller.select_image_path(path);
        }
        let name = app
            .controller
            .image()
            .file()
            .map(|f| f.name.clone())
            .unwrap_or_else(|| "No image selected".to_string());
        ui.label(name);
    });
}

fn render_parameters(ui: &mut egui::Ui, app: &mut AppUI) {
    ui.strong("3. Parameters");
    egui::Grid::new("parameter_grid")
        .num_columns(2)
        .spacing([12.0, 6.0])
        .show(ui, |ui| {
            for field in ParamField::ALL {
                ui.label(field.label());
                let text = app.param_inputs.entry(field).or_default();
                let response = ui.add(egui::TextEdit::singleline(text).desired_width(120.0));
                if response.changed() {
                    app.controller.set_parameter(field, text);
                }
                if response.lost_focus() {
                    // Show the value that will actually be sent
                    *text = app.controller.parameters().value(field).to_string();
                }
                ui.end_row();
            }
        });
}

fn render_run_button(ui: &mut egui::Ui, app: &mut AppUI) {
    let label = if app.controller.phase().is_submitting() {
        "ANALYZING..."
    } else {
        "RUN ANALYSIS"
    };
    let button = egui::Button::new(RichText::new(label).strong().size(16.0))
        .min_size(Vec2::new(ui.available_width(), 40.0));
    if ui.add_enabled(app.controller.can_run(), button).clicked() {
        app.start_run();
    }
}
