//! Report parameters form, preview and Excel export.

use chrono::{Datelike, Local};
use eframe::egui::{self, RichText, ScrollArea, Ui};
use egui_extras::DatePickerButton;
use egui_phosphor::regular::{FILE_XLS, MAGNIFYING_GLASS};

use crate::reports::{
    ExecutionReportItem, GeneratedReport, ReportKind, ReportRows, ReportSummary, TransportProgramReportItem,
    month_name,
};

use super::app::App;
use super::components::{back_button, panel_header, primary_button_with_icon, report_color, styled_button, styled_button_with_icon};

const ALL: &str = "Все";

fn money(value: f64) -> String {
    format!("{value:.2} ₽")
}

/// Show the reports panel.
///
/// Returns `true` if the back button was clicked.
pub fn show(app: &mut App, ui: &mut Ui) -> bool {
    let go_back = back_button(ui);

    panel_header(ui, "Отчеты");

    ui.horizontal(|ui| {
        ui.label("Отчет:");
        ui.add_space(10.0);
        for kind in [ReportKind::Execution, ReportKind::TransportProgram] {
            if ui
                .selectable_label(app.report_params.kind == kind, kind.title())
                .clicked()
            {
                app.report_params.kind = kind;
            }
        }
    });

    ui.add_space(10.0);

    match app.report_params.kind {
        ReportKind::Execution => show_period_range(app, ui),
        ReportKind::TransportProgram => show_program_period(app, ui),
    }

    ui.add_space(10.0);
    show_filters(app, ui);
    ui.add_space(10.0);

    ui.horizontal(|ui| {
        ui.add_enabled_ui(!app.is_generating, |ui| {
            if primary_button_with_icon(ui, MAGNIFYING_GLASS, "Сформировать").clicked() {
                app.generate_report();
            }
        });

        ui.add_space(10.0);

        let can_export = app.report.is_some() && !app.is_exporting;
        ui.add_enabled_ui(can_export, |ui| {
            if styled_button_with_icon(ui, FILE_XLS, "Экспорт в Excel").clicked() {
                app.export_report();
            }
        });

        if let Some((_, report)) = &app.report {
            ui.add_space(20.0);
            ui.label(format!("Записей: {}", report.rows.len()));
        }
    });

    ui.add_space(15.0);
    ui.separator();
    ui.add_space(10.0);

    match &app.report {
        Some((params, report)) => {
            ui.label(RichText::new(params.period_label()).italics());
            if !report.filter_labels.is_empty() {
                ui.label(RichText::new(report.filter_labels.join("; ")).small().weak());
            }
            ui.add_space(8.0);
            show_summary(ui, report);
            ui.add_space(8.0);
            match &report.rows {
                ReportRows::Execution(items) => show_execution_table(ui, items),
                ReportRows::TransportProgram(items) => show_program_table(ui, items),
            }
        }
        None => {
            ui.label("Нет данных. Нажмите «Сформировать», чтобы построить отчет.");
        }
    }

    go_back
}

fn show_period_range(app: &mut App, ui: &mut Ui) {
    ui.horizontal(|ui| {
        ui.label("С:");
        ui.add(
            DatePickerButton::new(&mut app.report_params.start_date)
                .id_salt("report_start_date")
                .format("%d.%m.%Y"),
        );
        ui.add_space(10.0);
        ui.label("По:");
        ui.add(
            DatePickerButton::new(&mut app.report_params.end_date)
                .id_salt("report_end_date")
                .format("%d.%m.%Y"),
        );

        ui.add_space(20.0);

        if styled_button(ui, "Текущий месяц").clicked() {
            let today = Local::now().date_naive();
            app.report_params.start_date = today.with_day(1).unwrap_or(today);
            app.report_params.end_date = today;
        }
        if styled_button(ui, "30 дней").clicked() {
            let today = Local::now().date_naive();
            app.report_params.start_date = today - chrono::Duration::days(30);
            app.report_params.end_date = today;
        }

        if app.report_params.start_date > app.report_params.end_date {
            ui.colored_label(super::components::colors::ERROR, "Начало периода позже окончания");
        }
    });
}

fn show_program_period(app: &mut App, ui: &mut Ui) {
    ui.horizontal(|ui| {
        ui.label("Год:");
        let mut year = app.report_params.year.unwrap_or_else(|| Local::now().year());
        ui.add(egui::DragValue::new(&mut year).range(2000..=2100));
        app.report_params.year = Some(year);

        ui.add_space(10.0);
        ui.label("Месяц:");
        egui::ComboBox::from_id_salt("report_month")
            .width(140.0)
            .selected_text(app.report_params.month.map(month_name).unwrap_or("Весь год"))
            .show_ui(ui, |ui| {
                ui.selectable_value(&mut app.report_params.month, None, "Весь год");
                for month in 1..=12 {
                    ui.selectable_value(&mut app.report_params.month, Some(month), month_name(month));
                }
            });

        ui.add_space(20.0);
        ui.checkbox(&mut app.report_params.monthly_breakdown, "По месяцам");
    });
}

fn show_filters(app: &mut App, ui: &mut Ui) {
    ui.horizontal(|ui| {
        ui.label("Подразделение:");
        let before = app.report_params.department_id;
        egui::ComboBox::from_id_salt("report_dept_filter")
            .width(200.0)
            .selected_text(
                app.report_params
                    .department_id
                    .and_then(|id| app.departments.iter().find(|d| d.id == id))
                    .map(|d| d.name.as_str())
                    .unwrap_or(ALL),
            )
            .show_ui(ui, |ui| {
                ui.selectable_value(&mut app.report_params.department_id, None, ALL);
                for dept in &app.departments {
                    ui.selectable_value(&mut app.report_params.department_id, Some(dept.id), &dept.name);
                }
            });
        // A warehouse of another department would match nothing
        if before != app.report_params.department_id {
            app.report_params.warehouse_id = None;
        }

        ui.add_space(10.0);
        ui.label("Склад:");
        let department_id = app.report_params.department_id;
        egui::ComboBox::from_id_salt("report_wh_filter")
            .width(180.0)
            .selected_text(
                app.report_params
                    .warehouse_id
                    .and_then(|id| app.warehouses.iter().find(|w| w.id == id))
                    .map(|w| w.name.as_str())
                    .unwrap_or(ALL),
            )
            .show_ui(ui, |ui| {
                ui.selectable_value(&mut app.report_params.warehouse_id, None, ALL);
                for wh in app
                    .warehouses
                    .iter()
                    .filter(|w| department_id.is_none_or(|d| w.department_id == d))
                {
                    ui.selectable_value(&mut app.report_params.warehouse_id, Some(wh.id), &wh.name);
                }
            });

        ui.add_space(10.0);
        ui.label("Техника:");
        egui::ComboBox::from_id_salt("report_equipment_filter")
            .width(200.0)
            .selected_text(
                app.report_params
                    .equipment_id
                    .and_then(|id| app.equipment.iter().find(|e| e.id == id))
                    .map(|e| e.name.as_str())
                    .unwrap_or(ALL),
            )
            .show_ui(ui, |ui| {
                ui.selectable_value(&mut app.report_params.equipment_id, None, ALL);
                for item in &app.equipment {
                    ui.selectable_value(&mut app.report_params.equipment_id, Some(item.id), &item.name);
                }
            });

        if app.report_params.kind == ReportKind::Execution {
            ui.add_space(10.0);
            ui.checkbox(&mut app.report_params.only_worked, "Только отработанные");
        }
    });
}

fn show_summary(ui: &mut Ui, report: &GeneratedReport) {
    let ReportSummary {
        total_records,
        total_hours,
        total_amount,
        completion_percentage,
        ..
    } = report.summary;
    let summary = &report.summary;

    egui::Frame::new()
        .fill(ui.style().visuals.extreme_bg_color)
        .inner_margin(egui::Margin::same(10))
        .corner_radius(egui::CornerRadius::same(6))
        .show(ui, |ui| {
            ui.horizontal_wrapped(|ui| {
                ui.strong("ИТОГО:");
                ui.label(format!("записей {total_records}"));
                ui.separator();
                ui.label(format!("часов {total_hours:.2}"));
                ui.separator();
                ui.label(format!("сумма {}", money(total_amount)));
                ui.separator();
                ui.label(format!("средняя ставка {}", money(summary.average_hourly_cost)));
                ui.separator();
                ui.colored_label(
                    report_color(summary.completion_color()),
                    format!("выполнение {completion_percentage:.2}%"),
                );
                if report.kind() == ReportKind::TransportProgram {
                    ui.separator();
                    ui.label(format!("план {:.2} ч / {}", summary.total_planned_hours, money(summary.total_planned_amount)));
                    ui.separator();
                    ui.colored_label(
                        report_color(summary.difference_color()),
                        format!("отклонение {}", money(summary.cost_difference)),
                    );
                } else {
                    ui.separator();
                    ui.label(format!("заявлено {}", summary.total_requested));
                }
            });
        });
}

fn show_execution_table(ui: &mut Ui, items: &[ExecutionReportItem]) {
    ScrollArea::both().show(ui, |ui| {
        egui::Grid::new("execution_report_grid")
            .num_columns(12)
            .striped(true)
            .min_col_width(60.0)
            .spacing([12.0, 6.0])
            .show(ui, |ui| {
                for header in [
                    "№", "Дата", "Смена", "Подразделение", "Склад", "Техника", "Гос. номер", "Заявлено", "Часы",
                    "Стоимость", "Статус", "Автор",
                ] {
                    ui.strong(header);
                }
                ui.end_row();

                for item in items {
                    ui.label(item.row_number.to_string());
                    ui.label(item.work_date.format("%d.%m.%Y").to_string());
                    ui.label(&item.shift_name);
                    ui.label(&item.department_name);
                    ui.label(&item.warehouse_name);
                    ui.label(&item.equipment_name);
                    ui.label(item.plate_number.as_deref().unwrap_or("-"));
                    ui.label(item.requested_count.to_string());
                    ui.label(format!("{:.2}", item.worked_hours));
                    ui.label(item.actual_cost.map(money).unwrap_or_else(|| "-".to_string()));
                    ui.colored_label(report_color(item.status_color()), item.status_text());
                    ui.label(&item.created_by);
                    ui.end_row();
                }

                if items.is_empty() {
                    ui.label("Нет заявок за выбранный период.");
                    ui.end_row();
                }
            });
    });
}

fn show_program_table(ui: &mut Ui, items: &[TransportProgramReportItem]) {
    ScrollArea::both().show(ui, |ui| {
        egui::Grid::new("program_report_grid")
            .num_columns(11)
            .striped(true)
            .min_col_width(60.0)
            .spacing([12.0, 6.0])
            .show(ui, |ui| {
                for header in [
                    "№", "Подразделение", "Техника", "Период", "Ставка", "План, ч", "Факт, ч", "Выполнение", "План",
                    "Факт", "Отклонение",
                ] {
                    ui.strong(header);
                }
                ui.end_row();

                for item in items {
                    ui.label(item.row_number.to_string());
                    ui.label(&item.department_name);
                    ui.label(&item.equipment_name);
                    ui.label(item.period_label());
                    ui.label(money(item.hourly_cost));
                    ui.label(format!("{:.2}", item.planned_hours));
                    ui.label(format!("{:.2}", item.actual_hours));
                    ui.colored_label(
                        report_color(item.completion_color()),
                        format!("{:.2}%", item.completion_percentage),
                    );
                    ui.label(money(item.planned_cost));
                    ui.label(money(item.actual_cost));
                    ui.colored_label(report_color(item.difference_color), money(item.cost_difference));
                    ui.end_row();
                }

                if items.is_empty() {
                    ui.label("Нет данных транспортной программы.");
                    ui.end_row();
                }
            });
    });
}
