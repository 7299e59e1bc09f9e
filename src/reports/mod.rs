//! Execution and transport program reports.

pub mod aggregate;
pub mod export;
pub mod items;
pub mod params;
pub mod service;

pub use export::{ReportExporter, generate_export_filename, render_workbook};
pub use items::{
    DisplayColor, ExecutionReportItem, GeneratedReport, ReportRows, ReportSummary, TransportProgramReportItem,
    completion_percentage,
};
pub use params::{ReportKind, ReportParameters, month_name, period_bounds};
pub use service::ReportDataService;
