//! Central viewport: draws a `ResultView`

use eframe::egui;
use egui::load::SizedTexture;
use egui::{Color32, RichText};

use crate::session::ResultView;
use crate::ui::textures::{ArtifactCache, ArtifactState, TexturePreviewStore};

pub fn render_viewport(
    ui: &mut egui::Ui,
    view: &ResultView,
    previews: &TexturePreviewStore,
    artifacts: &ArtifactCache,
) {
    match view {
        ResultView::Progress { caption } => {
            ui.vertical_centered(|ui| {
                ui.add_space(ui.available_height() * 0.35);
                ui.add(egui::Spinner::new().size(48.0));
                ui.add_space(12.0);
                ui.label(RichText::new(*caption).size(18.0));
            });
        }
        ResultView::Result {
            result,
            confidence_label,
        } => {
            ui.vertical_centered(|ui| {
                ui.label(
                    RichText::new(format!("Confidence: {}", confidence_label))
                        .size(20.0)
                        .strong()
                        .color(Color32::from_rgb(90, 200, 120)),
                );
                ui.add_space(8.0);
                match artifacts.state(&result.url) {
                    Some(ArtifactState::Ready(texture)) => {
                        ui.add(
                            egui::Image::from_texture(SizedTexture::from_handle(texture))
                                .max_size(ui.available_size())
                                .maintain_aspect_ratio(true),
                        );
                    }
                    Some(ArtifactState::Failed(reason)) => {
                        ui.colored_label(
                            Color32::from_rgb(230, 80, 80),
                            format!("Could not load the result image: {}", reason),
                        );
                    }
                    Some(ArtifactState::Loading) | None => {
                        ui.spinner();
                    }
                }
            });
        }
        ResultView::Preview { preview, dimmed } => match previews.texture(*preview) {
            Some(texture) => {
                ui.centered_and_justified(|ui| {
                    let mut image = egui::Image::from_texture(SizedTexture::from_handle(&texture))
                        .max_size(ui.available_size())
                        .maintain_aspect_ratio(true);
                    if *dimmed {
                        image = image.tint(Color32::from_white_alpha(128));
                    }
                    ui.add(image);
                });
            }
            None => {
                log::debug!("[UI] Preview {} has no texture", preview);
            }
        },
        ResultView::NoPreview { title, file_name } => {
            ui.vertical_centered(|ui| {
                ui.add_space(ui.available_height() * 0.4);
                ui.label(RichText::new(*title).size(24.0).strong());
                ui.label(RichText::new(format!("Selected: {}", file_name)).weak());
            });
        }
        ResultView::Empty { title, hint } => {
            ui.vertical_centered(|ui| {
                ui.add_space(ui.available_height() * 0.4);
                ui.label(RichText::new(*title).size(24.0).strong());
                ui.label(RichText::new(*hint).weak());
            });
        }
    }
}
