//! Report data service: validate, query, filter by access, aggregate.

use sea_orm::DatabaseConnection;
use tracing::{debug, info};

use crate::access::AccessScope;
use crate::db;
use crate::error::{AppError, Result};
use crate::models::shift::ShiftQuery;

use super::aggregate::{self, Lookups};
use super::items::{
    ExecutionReportItem, GeneratedReport, ReportRows, ReportSummary, TransportProgramReportItem,
};
use super::params::{ReportKind, ReportParameters, period_bounds};

/// Generates reports for one user.
#[derive(Debug, Clone)]
pub struct ReportDataService {
    db: DatabaseConnection,
    scope: AccessScope,
}

impl ReportDataService {
    pub fn new(db: DatabaseConnection, scope: AccessScope) -> Self {
        Self { db, scope }
    }

    /// Service scoped to a user loaded from the database.
    pub async fn for_user(db: DatabaseConnection, user_id: i32) -> Result<Self> {
        let scope = db::user::load_scope(&db, user_id).await?;
        Ok(Self::new(db, scope))
    }

    pub fn scope(&self) -> &AccessScope {
        &self.scope
    }

    /// Generate the report selected by `params.kind`.
    pub async fn generate(&self, params: &ReportParameters) -> Result<GeneratedReport> {
        params.validate()?;
        let lookups = Lookups::load(&self.db).await?;

        let (rows, summary) = match params.kind {
            ReportKind::Execution => {
                let (items, summary) = self.execution(params, &lookups).await?;
                (ReportRows::Execution(items), summary)
            }
            ReportKind::TransportProgram => {
                let (items, summary) = self.transport_program(params, &lookups).await?;
                (ReportRows::TransportProgram(items), summary)
            }
        };

        Ok(GeneratedReport {
            rows,
            summary,
            filter_labels: lookups.filter_labels(params),
        })
    }

    pub async fn generate_execution_report(
        &self,
        params: &ReportParameters,
    ) -> Result<(Vec<ExecutionReportItem>, ReportSummary)> {
        params.validate_for(ReportKind::Execution)?;
        let lookups = Lookups::load(&self.db).await?;
        self.execution(params, &lookups).await
    }

    pub async fn generate_transport_program_report(
        &self,
        params: &ReportParameters,
    ) -> Result<(Vec<TransportProgramReportItem>, ReportSummary)> {
        params.validate_for(ReportKind::TransportProgram)?;
        let lookups = Lookups::load(&self.db).await?;
        self.transport_program(params, &lookups).await
    }

    async fn execution(
        &self,
        params: &ReportParameters,
        lookups: &Lookups,
    ) -> Result<(Vec<ExecutionReportItem>, ReportSummary)> {
        let query = ShiftQuery {
            start_date: params.start_date,
            end_date: params.end_date,
            department_id: params.department_id,
            warehouse_id: params.warehouse_id,
            equipment_id: params.equipment_id,
            only_worked: params.only_worked,
        };

        let mut records = db::shift_request::find(&self.db, &query).await?;
        let fetched = records.len();
        self.scope
            .retain(&mut records, |r| (r.department_id, Some(r.warehouse_id)));
        debug!("Execution report: {} of {fetched} shift requests visible", records.len());

        let items = aggregate::build_execution_items(&records, lookups);
        let summary = aggregate::summarize_execution(&items);

        info!(
            "Execution report {} – {}: {} rows, {:.2} h",
            params.start_date, params.end_date, summary.total_records, summary.total_hours
        );
        Ok((items, summary))
    }

    async fn transport_program(
        &self,
        params: &ReportParameters,
        lookups: &Lookups,
    ) -> Result<(Vec<TransportProgramReportItem>, ReportSummary)> {
        let year = params
            .year
            .ok_or_else(|| AppError::validation("transport program report requires a year"))?;
        let (start, end) = period_bounds(year, params.month)
            .ok_or_else(|| AppError::validation(format!("invalid period {year}/{:?}", params.month)))?;

        let mut plans =
            db::transport_program::find(&self.db, year, params.month, params.department_id, params.equipment_id)
                .await?;
        self.scope.retain(&mut plans, |p| (p.department_id, None));
        // Plans carry no warehouse; a warehouse filter narrows them to its department.
        if let Some(warehouse_id) = params.warehouse_id {
            let owner = lookups.warehouse_department(warehouse_id);
            plans.retain(|p| Some(p.department_id) == owner);
        }

        let query = ShiftQuery {
            start_date: start,
            end_date: end,
            department_id: params.department_id,
            warehouse_id: params.warehouse_id,
            equipment_id: params.equipment_id,
            only_worked: true,
        };
        let mut worked = db::shift_request::find(&self.db, &query).await?;
        self.scope
            .retain(&mut worked, |r| (r.department_id, Some(r.warehouse_id)));

        let items = aggregate::build_program_items(year, &plans, &worked, lookups, params.monthly_breakdown);
        let summary = aggregate::summarize_program(&items);

        info!(
            "Transport program report {year}: {} rows, completion {:.2}%",
            summary.total_records, summary.completion_percentage
        );
        Ok((items, summary))
    }
}
