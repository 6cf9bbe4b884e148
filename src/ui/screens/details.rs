//! Single meme view with a "Download Image" action

use crate::navigation::SelectedMeme;
use crate::ui::thumbnails::{fit_size, ImageLoader, ImageSlot};
use eframe::egui;

pub enum DetailsAction {
    Back,
    Download(String),
}

pub struct DetailsScreen;

impl DetailsScreen {
    const MAX_IMAGE_HEIGHT_FRACTION: f32 = 0.65;

    pub fn show(
        ctx: &egui::Context,
        selected: &SelectedMeme,
        images: &mut ImageLoader,
        downloads_in_flight: usize,
    ) -> Option<DetailsAction> {
        let mut action = None;

        egui::CentralPanel::default().show(ctx, |ui| {
            if ui.button("← Back").clicked() {
                action = Some(DetailsAction::Back);
            }
            ui.add_space(10.0);

            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    ui.vertical_centered(|ui| {
                        if let Some(ref url) = selected.url {
                            let max = egui::vec2(
                                ui.available_width(),
                                ctx.screen_rect().height() * Self::MAX_IMAGE_HEIGHT_FRACTION,
                            );
                            Self::show_image(ui, images, url, max);
                        }
                        ui.add_space(20.0);

                        if let Some(ref name) = selected.name {
                            ui.label(egui::RichText::new(name).size(25.0).strong());
                        }
                        ui.add_space(20.0);

                        let download = ui.add_enabled(
                            selected.url.is_some(),
                            egui::Button::new(egui::RichText::new("Download Image").size(16.0)),
                        );
                        if download.clicked() {
                            if let Some(ref url) = selected.url {
                                action = Some(DetailsAction::Download(url.clone()));
                            }
                        }

                        if downloads_in_flight > 0 {
                            ui.add_space(8.0);
                            ui.horizontal(|ui| {
                                ui.spinner();
                                ui.label(format!("Saving ({} in progress)", downloads_in_flight));
                            });
                        }
                    });
                });
        });

        action
    }

    fn show_image(ui: &mut egui::Ui, images: &mut ImageLoader, url: &str, max: egui::Vec2) {
        match images.get(ui.ctx(), url) {
            ImageSlot::Ready(texture) => {
                let size = fit_size(texture, max);
                ui.image((texture.id(), size));
            }
            ImageSlot::Loading => {
                ui.add_space(40.0);
                ui.spinner();
                ui.add_space(40.0);
            }
            ImageSlot::Failed => {
                ui.label(egui::RichText::new("⚠ Image unavailable").size(18.0).weak());
            }
        }
    }
}
