//! Excel export of generated reports.
//!
//! Sheet layout (1-based rows as Excel shows them):
//!
//! ```text
//! 1  title, merged across all columns
//! 2  period and filters, merged across all columns
//! 3  (blank)
//! 4  column headers
//! 5… one row per item
//!    (blank)
//!    ИТОГО: summary row
//! ```

use chrono::{DateTime, Datelike, Local};
use rust_xlsxwriter::{
    Color, ExcelDateTime, Format, FormatAlign, FormatBorder, Workbook, Worksheet, XlsxError,
};
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{info, warn};

use crate::config::ExportConfig;
use crate::error::Result;

use super::items::{
    DisplayColor, ExecutionReportItem, GeneratedReport, ReportRows, ReportSummary, TransportProgramReportItem,
};
use super::params::ReportParameters;

/// 0-based row of the report title.
pub const TITLE_ROW: u32 = 0;
/// 0-based row of the period/filter description.
pub const DESCRIPTION_ROW: u32 = 1;
/// 0-based row of the column headers.
pub const HEADER_ROW: u32 = 3;
/// 0-based row of the first item.
pub const FIRST_DATA_ROW: u32 = 4;

/// Label of the summary row.
pub const TOTAL_LABEL: &str = "ИТОГО:";

const EXECUTION_HEADERS: [(&str, f64); 15] = [
    ("№", 5.0),
    ("Дата", 11.0),
    ("Смена", 10.0),
    ("Подразделение", 22.0),
    ("Склад", 18.0),
    ("Участок", 15.0),
    ("Техника", 24.0),
    ("Гос. номер", 12.0),
    ("Арендодатель", 22.0),
    ("Марка", 14.0),
    ("Заявлено, ед.", 10.0),
    ("Отработано, ч", 12.0),
    ("Стоимость", 15.0),
    ("Статус", 14.0),
    ("Комментарий", 30.0),
];

/// Columns merged under the summary label in the execution sheet.
const EXECUTION_LABEL_SPAN: u16 = 10;

const PROGRAM_HEADERS: [(&str, f64); 11] = [
    ("№", 5.0),
    ("Подразделение", 24.0),
    ("Техника", 24.0),
    ("Период", 14.0),
    ("Стоимость часа", 14.0),
    ("План, ч", 11.0),
    ("Факт, ч", 11.0),
    ("Выполнение", 12.0),
    ("План, стоимость", 16.0),
    ("Факт, стоимость", 16.0),
    ("Отклонение", 16.0),
];

/// Columns merged under the summary label in the program sheet.
const PROGRAM_LABEL_SPAN: u16 = 4;

/// 0-based row of the summary for `item_count` items.
pub fn summary_row(item_count: usize) -> u32 {
    FIRST_DATA_ROW + item_count as u32 + 1
}

/// Generate default filename for export.
pub fn generate_export_filename(prefix: &str, now: DateTime<Local>) -> String {
    format!("{prefix}_{ts}.xlsx", ts = now.format("%Y%m%d_%H%M%S"))
}

struct Styles {
    title: Format,
    description: Format,
    header: Format,
    text: Format,
    date: Format,
    integer: Format,
    hours: Format,
    money: Format,
    percent: Format,
    total_label: Format,
    total_text: Format,
    total_integer: Format,
    total_hours: Format,
    total_money: Format,
    total_percent: Format,
}

impl Styles {
    fn new() -> Self {
        let cell = Format::new().set_border(FormatBorder::Thin);
        let total = cell.clone().set_bold();

        Self {
            title: Format::new()
                .set_bold()
                .set_font_size(14)
                .set_align(FormatAlign::Center),
            description: Format::new().set_italic().set_align(FormatAlign::Center),
            header: Format::new()
                .set_bold()
                .set_background_color(Color::RGB(0x4472C4))
                .set_font_color(Color::White)
                .set_border(FormatBorder::Thin)
                .set_text_wrap()
                .set_align(FormatAlign::Center)
                .set_align(FormatAlign::VerticalCenter),
            text: cell.clone(),
            date: cell.clone().set_num_format("dd.mm.yyyy"),
            integer: cell.clone().set_num_format("0"),
            hours: cell.clone().set_num_format("0.00"),
            money: cell.clone().set_num_format("#,##0.00 \"₽\""),
            percent: cell.set_num_format("0.00%"),
            total_label: total.clone().set_align(FormatAlign::Right),
            total_text: total.clone(),
            total_integer: total.clone().set_num_format("0"),
            total_hours: total.clone().set_num_format("0.00"),
            total_money: total.clone().set_num_format("#,##0.00 \"₽\""),
            total_percent: total.set_num_format("0.00%"),
        }
    }
}

fn colored(format: &Format, color: DisplayColor) -> Format {
    format.clone().set_font_color(Color::RGB(color.rgb()))
}

fn excel_date(date: chrono::NaiveDate) -> std::result::Result<ExcelDateTime, XlsxError> {
    ExcelDateTime::from_ymd(date.year() as u16, date.month() as u8, date.day() as u8)
}

fn write_heading(
    ws: &mut Worksheet,
    title: &str,
    description: &str,
    headers: &[(&str, f64)],
    styles: &Styles,
) -> std::result::Result<(), XlsxError> {
    let last_col = headers.len() as u16 - 1;

    ws.merge_range(TITLE_ROW, 0, TITLE_ROW, last_col, title, &styles.title)?;
    ws.merge_range(DESCRIPTION_ROW, 0, DESCRIPTION_ROW, last_col, description, &styles.description)?;
    ws.set_row_height(HEADER_ROW, 32)?;

    for (col, (header, width)) in headers.iter().enumerate() {
        ws.write_string_with_format(HEADER_ROW, col as u16, *header, &styles.header)?;
        ws.set_column_width(col as u16, *width)?;
    }
    Ok(())
}

fn write_execution(
    ws: &mut Worksheet,
    items: &[ExecutionReportItem],
    summary: &ReportSummary,
    styles: &Styles,
) -> std::result::Result<(), XlsxError> {
    for (idx, item) in items.iter().enumerate() {
        let row = FIRST_DATA_ROW + idx as u32;

        ws.write_number_with_format(row, 0, item.row_number as f64, &styles.integer)?;
        ws.write_datetime_with_format(row, 1, &excel_date(item.work_date)?, &styles.date)?;
        ws.write_string_with_format(row, 2, &item.shift_name, &styles.text)?;
        ws.write_string_with_format(row, 3, &item.department_name, &styles.text)?;
        ws.write_string_with_format(row, 4, &item.warehouse_name, &styles.text)?;
        ws.write_string_with_format(row, 5, item.area_name.as_deref().unwrap_or(""), &styles.text)?;
        ws.write_string_with_format(row, 6, &item.equipment_name, &styles.text)?;
        ws.write_string_with_format(row, 7, item.plate_number.as_deref().unwrap_or(""), &styles.text)?;
        ws.write_string_with_format(row, 8, item.lessor_name.as_deref().unwrap_or(""), &styles.text)?;
        ws.write_string_with_format(row, 9, item.brand.as_deref().unwrap_or(""), &styles.text)?;
        ws.write_number_with_format(row, 10, item.requested_count, &styles.integer)?;
        ws.write_number_with_format(row, 11, item.worked_hours, &styles.hours)?;
        match item.actual_cost {
            Some(cost) => ws.write_number_with_format(row, 12, cost, &styles.money)?,
            None => ws.write_blank(row, 12, &styles.money)?,
        };
        ws.write_string_with_format(
            row,
            13,
            item.status_text(),
            &colored(&styles.text, item.status_color()),
        )?;
        ws.write_string_with_format(row, 14, item.comment.as_deref().unwrap_or(""), &styles.text)?;
    }

    let row = summary_row(items.len());
    ws.merge_range(row, 0, row, EXECUTION_LABEL_SPAN - 1, TOTAL_LABEL, &styles.total_label)?;
    ws.write_number_with_format(row, 10, summary.total_requested as f64, &styles.total_integer)?;
    ws.write_number_with_format(row, 11, summary.total_hours, &styles.total_hours)?;
    ws.write_number_with_format(row, 12, summary.total_amount, &styles.total_money)?;
    ws.write_number_with_format(
        row,
        13,
        summary.completion_percentage / 100.0,
        &colored(&styles.total_percent, summary.completion_color()),
    )?;
    ws.write_string_with_format(
        row,
        14,
        format!("Записей: {}", summary.total_records),
        &styles.total_text,
    )?;
    Ok(())
}

fn write_program(
    ws: &mut Worksheet,
    items: &[TransportProgramReportItem],
    summary: &ReportSummary,
    styles: &Styles,
) -> std::result::Result<(), XlsxError> {
    for (idx, item) in items.iter().enumerate() {
        let row = FIRST_DATA_ROW + idx as u32;

        ws.write_number_with_format(row, 0, item.row_number as f64, &styles.integer)?;
        ws.write_string_with_format(row, 1, &item.department_name, &styles.text)?;
        ws.write_string_with_format(row, 2, &item.equipment_name, &styles.text)?;
        ws.write_string_with_format(row, 3, item.period_label(), &styles.text)?;
        ws.write_number_with_format(row, 4, item.hourly_cost, &styles.money)?;
        ws.write_number_with_format(row, 5, item.planned_hours, &styles.hours)?;
        ws.write_number_with_format(row, 6, item.actual_hours, &styles.hours)?;
        ws.write_number_with_format(
            row,
            7,
            item.completion_percentage / 100.0,
            &colored(&styles.percent, item.completion_color()),
        )?;
        ws.write_number_with_format(row, 8, item.planned_cost, &styles.money)?;
        ws.write_number_with_format(row, 9, item.actual_cost, &styles.money)?;
        ws.write_number_with_format(
            row,
            10,
            item.cost_difference,
            &colored(&styles.money, item.difference_color),
        )?;
    }

    let row = summary_row(items.len());
    ws.merge_range(row, 0, row, PROGRAM_LABEL_SPAN - 1, TOTAL_LABEL, &styles.total_label)?;
    ws.write_number_with_format(row, 4, summary.average_hourly_cost, &styles.total_money)?;
    ws.write_number_with_format(row, 5, summary.total_planned_hours, &styles.total_hours)?;
    ws.write_number_with_format(row, 6, summary.total_hours, &styles.total_hours)?;
    ws.write_number_with_format(
        row,
        7,
        summary.completion_percentage / 100.0,
        &colored(&styles.total_percent, summary.completion_color()),
    )?;
    ws.write_number_with_format(row, 8, summary.total_planned_amount, &styles.total_money)?;
    ws.write_number_with_format(row, 9, summary.total_amount, &styles.total_money)?;
    ws.write_number_with_format(
        row,
        10,
        summary.cost_difference,
        &colored(&styles.total_money, summary.difference_color()),
    )?;
    Ok(())
}

/// Build the single-sheet workbook for a report.
pub fn render_workbook(
    report: &GeneratedReport,
    params: &ReportParameters,
) -> std::result::Result<Workbook, XlsxError> {
    let kind = report.kind();
    let styles = Styles::new();

    let description = params.description(&report.filter_labels);

    let mut workbook = Workbook::new();
    let ws = workbook.add_worksheet();
    ws.set_name(kind.sheet_name())?;

    let last_col = match &report.rows {
        ReportRows::Execution(items) => {
            write_heading(ws, kind.title(), &description, &EXECUTION_HEADERS, &styles)?;
            write_execution(ws, items, &report.summary, &styles)?;
            EXECUTION_HEADERS.len() as u16 - 1
        }
        ReportRows::TransportProgram(items) => {
            write_heading(ws, kind.title(), &description, &PROGRAM_HEADERS, &styles)?;
            write_program(ws, items, &report.summary, &styles)?;
            PROGRAM_HEADERS.len() as u16 - 1
        }
    };

    if !report.rows.is_empty() {
        let last_row = FIRST_DATA_ROW + report.rows.len() as u32 - 1;
        ws.autofilter(HEADER_ROW, 0, last_row, last_col)?;
    }
    ws.set_freeze_panes(FIRST_DATA_ROW, 0)?;

    Ok(workbook)
}

/// Writes reports into a folder and optionally opens them.
#[derive(Debug, Clone)]
pub struct ReportExporter {
    output_dir: PathBuf,
    open_after_export: bool,
}

impl ReportExporter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            open_after_export: false,
        }
    }

    pub fn from_config(config: &ExportConfig) -> Self {
        Self::new(config.output_dir()).open_after_export(config.open_after_export)
    }

    pub fn open_after_export(mut self, open: bool) -> Self {
        self.open_after_export = open;
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Workbook for the report without touching the disk.
    pub fn render(&self, report: &GeneratedReport, params: &ReportParameters) -> Result<Workbook> {
        Ok(render_workbook(report, params)?)
    }

    /// Export with a timestamp of now.
    pub fn export(&self, report: &GeneratedReport, params: &ReportParameters) -> Result<PathBuf> {
        self.export_at(report, params, Local::now())
    }

    /// Export as `<Title>_<yyyyMMdd_HHmmss>.xlsx` and return the path.
    pub fn export_at(
        &self,
        report: &GeneratedReport,
        params: &ReportParameters,
        now: DateTime<Local>,
    ) -> Result<PathBuf> {
        let mut workbook = self.render(report, params)?;

        std::fs::create_dir_all(&self.output_dir)?;
        let path = self
            .output_dir
            .join(generate_export_filename(&report.kind().file_title(), now));

        if let Err(e) = workbook.save(&path) {
            // Drop whatever part of the file made it to disk.
            let _ = std::fs::remove_file(&path);
            return Err(e.into());
        }
        info!("Report exported to {:?} ({} rows)", path, report.rows.len());

        if self.open_after_export
            && let Err(e) = open_in_default_app(&path)
        {
            warn!("Could not open {:?}: {}", path, e);
        }

        Ok(path)
    }
}

/// Hand the file to the platform's default handler.
fn open_in_default_app(path: &Path) -> std::io::Result<()> {
    #[cfg(target_os = "windows")]
    let mut command = {
        let mut c = Command::new("cmd");
        c.args(["/C", "start", ""]).arg(path);
        c
    };
    #[cfg(target_os = "macos")]
    let mut command = {
        let mut c = Command::new("open");
        c.arg(path);
        c
    };
    #[cfg(all(unix, not(target_os = "macos")))]
    let mut command = {
        let mut c = Command::new("xdg-open");
        c.arg(path);
        c
    };

    command.spawn().map(|_| ())
}
