//! Dashboard panel with counters and navigation cards.

use eframe::egui::{self, Color32, CornerRadius, Margin, RichText, Ui};
use egui_phosphor::regular::{CHART_BAR, TRUCK};

use super::app::{App, Panel};
use super::components::dashboard_card;

/// Show the dashboard panel.
///
/// Returns `Some(panel)` if navigation is requested.
pub fn show(app: &mut App, ui: &mut Ui) -> Option<Panel> {
    let mut next_panel = None;

    ui.vertical_centered(|ui| {
        ui.add_space(30.0);

        ui.label(RichText::new("Спецтехника").size(32.0).strong());
        ui.add_space(5.0);
        ui.label(RichText::new("Заявки на спецтехнику и транспортная программа").size(14.0).weak());

        ui.add_space(30.0);

        ui.horizontal(|ui| {
            let available = ui.available_width();
            let start_offset = ((available - 850.0) / 2.0).max(0.0);
            ui.add_space(start_offset);

            let counts = app.table_counts.as_ref();
            let show = |n: Option<u64>| n.map(|n| n.to_string()).unwrap_or_else(|| "-".to_string());

            stat_card(ui, "Подразделения", &show(counts.map(|c| c.departments)), "Действующих");
            stat_card(ui, "Склады", &show(counts.map(|c| c.warehouses)), "Действующих");
            stat_card(ui, "Спецтехника", &show(counts.map(|c| c.equipment)), "Единиц в работе");
            stat_card(ui, "Заявки", &show(counts.map(|c| c.shift_requests)), "Всего смен");
            stat_card(ui, "Не отработано", &show(counts.map(|c| c.open_shifts())), "Открытых смен");
        });

        ui.add_space(30.0);

        let available = ui.available_width();
        let num_cards = 2.0;
        let spacing = 30.0;
        let card_width = ((available - spacing) / num_cards).clamp(150.0, 260.0);
        let card_size = egui::vec2(card_width, card_width * 0.75);
        let total_width = card_width * num_cards + spacing;

        ui.horizontal(|ui| {
            ui.add_space(((available - total_width) / 2.0).max(0.0));

            if dashboard_card(ui, "Отчеты", "Исполнение заявок и программы", CHART_BAR, card_size).clicked() {
                next_panel = Some(Panel::Reports);
            }

            ui.add_space(spacing);

            if dashboard_card(ui, "Спецтехника", "Поиск и избранное", TRUCK, card_size).clicked() {
                next_panel = Some(Panel::Equipment);
            }
        });
    });

    next_panel
}

fn stat_card(ui: &mut Ui, title: &str, value: &str, subtitle: &str) {
    egui::Frame::new()
        .fill(ui.style().visuals.extreme_bg_color)
        .inner_margin(Margin::same(15))
        .corner_radius(CornerRadius::same(8))
        .show(ui, |ui| {
            ui.set_min_width(140.0);
            ui.vertical(|ui| {
                ui.label(RichText::new(title).weak());
                ui.label(RichText::new(value).size(28.0).strong().color(Color32::from_rgb(90, 160, 230)));
                ui.label(RichText::new(subtitle).small().weak());
            });
        });
}
