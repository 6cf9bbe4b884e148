//! Searchable two-column meme grid

use crate::catalog::{CatalogState, LoadStatus};
use crate::models::MemeRecord;
use crate::navigation::Route;
use crate::ui::thumbnails::{fit_size, ImageLoader, ImageSlot};
use eframe::egui;

pub enum CatalogAction {
    Open(Route),
    Refresh,
}

pub struct CatalogScreen;

impl CatalogScreen {
    const COLUMNS: usize = 2;
    const CELL_IMAGE_HEIGHT: f32 = 180.0;
    const CELL_NAME_HEIGHT: f32 = 24.0;

    pub fn show(
        ctx: &egui::Context,
        catalog: &mut CatalogState,
        images: &mut ImageLoader,
    ) -> Option<CatalogAction> {
        let mut action = None;

        egui::CentralPanel::default().show(ctx, |ui| {
            if Self::show_search_bar(ui, catalog) {
                action = Some(CatalogAction::Refresh);
            }
            ui.add_space(6.0);

            if catalog.is_loading() {
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.label("Loading memes...");
                });
            }

            let visible = catalog.visible();
            match catalog.status() {
                LoadStatus::Failed => {
                    ui.label(egui::RichText::new("Could not load memes. Try Refresh.").weak());
                    return;
                }
                LoadStatus::Loaded if visible.is_empty() => {
                    ui.label(
                        egui::RichText::new(format!("No memes match \"{}\"", catalog.query))
                            .weak(),
                    );
                    return;
                }
                _ => {}
            }
            ui.label(
                egui::RichText::new(format!(
                    "{} of {} memes",
                    visible.len(),
                    catalog.memes().len()
                ))
                .weak(),
            );
            ui.add_space(4.0);

            if let Some(meme) = Self::show_grid(ui, &visible, images) {
                action = Some(CatalogAction::Open(Route::details(&meme.name, &meme.url)));
            }
        });

        action
    }

    /// Returns true when a refresh was requested
    fn show_search_bar(ui: &mut egui::Ui, catalog: &mut CatalogState) -> bool {
        let mut refresh = false;
        ui.horizontal(|ui| {
            ui.add(
                egui::TextEdit::singleline(&mut catalog.query)
                    .desired_width((ui.available_width() - 160.0).max(120.0))
                    .hint_text("Search here ..."),
            );

            if ui.button("Clear").clicked() {
                catalog.query.clear();
            }

            refresh = ui
                .add_enabled(!catalog.is_loading(), egui::Button::new("Refresh"))
                .clicked();
        });
        refresh
    }

    /// Render the visible rows of the grid; returns the clicked meme, if any
    fn show_grid<'a>(
        ui: &mut egui::Ui,
        visible: &[&'a MemeRecord],
        images: &mut ImageLoader,
    ) -> Option<&'a MemeRecord> {
        let spacing = ui.spacing().item_spacing;
        let column_width = ((ui.available_width() - spacing.x) / Self::COLUMNS as f32).max(60.0);
        let row_height = Self::CELL_IMAGE_HEIGHT + Self::CELL_NAME_HEIGHT + spacing.y;
        let rows = visible.len().div_ceil(Self::COLUMNS);
        let mut clicked = None;

        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .show_rows(ui, row_height, rows, |ui, row_range| {
                for row in row_range {
                    ui.horizontal(|ui| {
                        let start = row * Self::COLUMNS;
                        for (offset, meme) in visible
                            .iter()
                            .skip(start)
                            .take(Self::COLUMNS)
                            .enumerate()
                        {
                            let index = start + offset;
                            if Self::show_cell(ui, images, meme, index, column_width) {
                                clicked = Some(*meme);
                            }
                        }
                    });
                }
            });

        clicked
    }

    fn show_cell(
        ui: &mut egui::Ui,
        images: &mut ImageLoader,
        meme: &MemeRecord,
        index: usize,
        width: f32,
    ) -> bool {
        let image_box = egui::vec2(width, Self::CELL_IMAGE_HEIGHT);
        let cell_size = egui::vec2(width, Self::CELL_IMAGE_HEIGHT + Self::CELL_NAME_HEIGHT);

        // the grid index keeps ids unique even if the API repeats a meme id
        ui.push_id((index, meme.id.as_str()), |ui| {
            ui.allocate_ui_with_layout(
                cell_size,
                egui::Layout::top_down(egui::Align::Center),
                |ui| {
                    ui.set_width(width);

                    let image_clicked = match images.get(ui.ctx(), &meme.url) {
                        ImageSlot::Ready(texture) => {
                            let size = fit_size(texture, image_box);
                            ui.add_sized(
                                image_box,
                                egui::Image::new((texture.id(), size))
                                    .sense(egui::Sense::click()),
                            )
                            .clicked()
                        }
                        ImageSlot::Loading => ui
                            .add_sized(
                                image_box,
                                egui::Label::new(egui::RichText::new("Loading...").weak())
                                    .sense(egui::Sense::click()),
                            )
                            .clicked(),
                        ImageSlot::Failed => ui
                            .add_sized(
                                image_box,
                                egui::Label::new(
                                    egui::RichText::new("⚠ Image unavailable").weak(),
                                )
                                .sense(egui::Sense::click()),
                            )
                            .clicked(),
                    };

                    let name_clicked = ui
                        .add(
                            egui::Label::new(egui::RichText::new(&meme.name).strong())
                                .truncate()
                                .sense(egui::Sense::click()),
                        )
                        .on_hover_text(&meme.name)
                        .clicked();

                    image_clicked || name_clicked
                },
            )
            .inner
        })
        .inner
    }
}
