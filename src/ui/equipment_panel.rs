//! Equipment list with live search and favorites.

use eframe::egui::{self, RichText, ScrollArea, Ui};
use egui_phosphor::regular::{MAGNIFYING_GLASS, STAR};

use super::app::App;
use super::components::{back_button, colors, panel_header};

/// Show the equipment panel.
///
/// Returns `true` if the back button was clicked.
pub fn show(app: &mut App, ui: &mut Ui) -> bool {
    let go_back = back_button(ui);

    panel_header(ui, "Спецтехника");

    ui.horizontal(|ui| {
        ui.label(MAGNIFYING_GLASS);
        let response = ui.add(
            egui::TextEdit::singleline(&mut app.equipment_search)
                .desired_width(300.0)
                .hint_text("Поиск по наименованию"),
        );
        if response.changed() {
            app.search_equipment();
        }
        if app.equipment_filter.is_pending() {
            ui.spinner();
        }

        ui.add_space(20.0);
        ui.checkbox(&mut app.only_favorites, "Только избранное");
    });

    ui.add_space(10.0);

    let rows: Vec<_> = app
        .equipment_filter
        .results()
        .iter()
        .filter(|e| !app.only_favorites || app.favorites.contains(&e.id))
        .cloned()
        .collect();

    ui.label(RichText::new(format!("Найдено: {} из {}", rows.len(), app.equipment.len())).weak());
    ui.add_space(8.0);

    let mut toggle = None;

    ScrollArea::both().show(ui, |ui| {
        egui::Grid::new("equipment_grid")
            .num_columns(4)
            .striped(true)
            .min_col_width(80.0)
            .spacing([12.0, 6.0])
            .show(ui, |ui| {
                ui.strong("");
                ui.strong("Наименование");
                ui.strong("Марка");
                ui.strong("Стоимость часа");
                ui.end_row();

                for item in &rows {
                    let is_favorite = app.favorites.contains(&item.id);
                    let star = if is_favorite {
                        RichText::new(STAR).color(colors::FAVORITE)
                    } else {
                        RichText::new(STAR).color(colors::NEUTRAL)
                    };
                    if ui
                        .add(egui::Button::new(star).frame(false))
                        .on_hover_text(if is_favorite { "Убрать из избранного" } else { "В избранное" })
                        .clicked()
                    {
                        toggle = Some(item.id);
                    }
                    ui.label(&item.name);
                    ui.label(item.brand.as_deref().unwrap_or("-"));
                    ui.label(format!("{:.2} ₽", item.hourly_cost));
                    ui.end_row();
                }

                if rows.is_empty() {
                    ui.label("");
                    ui.label("Ничего не найдено.");
                    ui.end_row();
                }
            });
    });

    if let Some(id) = toggle {
        app.toggle_favorite(id);
    }

    go_back
}
