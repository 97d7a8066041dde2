//! Report generation
//!
//! Each `ReportKind` maps to a fixed set of typed store queries; the
//! aggregated summary is stored with the report as JSON.

use crate::app::Stores;
use crate::core::StoreRef;
use crate::models::{
    Boarder, Event, Horse, Invoice, InvoiceStatus, MaintenanceTask, Payment, RecordMeta, Report, ReportKind, Stall,
    StallStatus, TaskStatus, ordered_window, wire_name,
};
use crate::params::date_range_filters;
use crate::server_fn::{ServerResponse, parse_input};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::BTreeMap;
use store_object::{QueryBuilder, QueryFilter, StoreError};
use validator::{Validate, ValidationError};

/// Input of `reports.generate`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_request_range"))]
pub struct ReportRequest {
    pub kind: ReportKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 200, message = "Title must be between 1 and 200 characters"))]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<NaiveDate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<NaiveDate>,
}

fn validate_request_range(request: &ReportRequest) -> Result<(), ValidationError> {
    match &request.from {
        Some(from) => ordered_window(from, request.to.as_ref(), "Date range is reversed"),
        None => Ok(()),
    }
}

impl ReportRequest {
    pub fn new(kind: ReportKind) -> Self {
        Self {
            kind,
            title: None,
            from: None,
            to: None,
        }
    }

    pub fn with_range(mut self, from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        self.from = from;
        self.to = to;
        self
    }

    pub fn with_title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }

    fn default_title(&self) -> String {
        let base = format!("{} report", self.kind.label());
        match (self.from, self.to) {
            (Some(from), Some(to)) => format!("{} from {} to {}", base, from, to),
            (Some(from), None) => format!("{} since {}", base, from),
            (None, Some(to)) => format!("{} until {}", base, to),
            (None, None) => base,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusTotal {
    pub count: i64,
    pub amount_cents: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialSummary {
    pub invoice_count: i64,
    pub invoiced_cents: i64,
    pub by_status: BTreeMap<String, StatusTotal>,
    pub payment_count: i64,
    pub payments_received_cents: i64,
    pub outstanding_cents: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OccupancySummary {
    pub total_stalls: i64,
    pub by_status: BTreeMap<String, i64>,
    pub horse_count: i64,
    /// Occupied stalls as a percentage of all stalls
    pub occupancy_rate: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceSummary {
    pub task_count: i64,
    pub by_status: BTreeMap<String, i64>,
    pub by_priority: BTreeMap<String, i64>,
    pub overdue: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoarderSummary {
    pub total: i64,
    pub by_status: BTreeMap<String, i64>,
    pub new_in_range: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSummary {
    pub event_count: i64,
    pub by_kind: BTreeMap<String, i64>,
    pub by_status: BTreeMap<String, i64>,
}

fn tally<'a, K: Serialize + 'a>(keys: impl IntoIterator<Item = &'a K>) -> BTreeMap<String, i64> {
    let mut counts = BTreeMap::new();
    for key in keys {
        *counts.entry(wire_name(key)).or_insert(0) += 1;
    }
    counts
}

fn in_range(field: &str, from: Option<NaiveDate>, to: Option<NaiveDate>) -> QueryBuilder {
    QueryBuilder::new().filters(date_range_filters(field, from, to))
}

fn status_in<E: Serialize>(field: &str, statuses: &[E]) -> QueryFilter {
    QueryFilter::in_values(
        field,
        statuses.iter().map(|s| Value::String(wire_name(s))).collect(),
    )
}

#[derive(Debug, Clone)]
pub struct ReportService {
    boarders: StoreRef<Boarder>,
    horses: StoreRef<Horse>,
    stalls: StoreRef<Stall>,
    invoices: StoreRef<Invoice>,
    payments: StoreRef<Payment>,
    events: StoreRef<Event>,
    tasks: StoreRef<MaintenanceTask>,
    reports: StoreRef<Report>,
}

impl ReportService {
    pub fn new(stores: &Stores) -> Self {
        Self {
            boarders: stores.boarders.clone(),
            horses: stores.horses.clone(),
            stalls: stores.stalls.clone(),
            invoices: stores.invoices.clone(),
            payments: stores.payments.clone(),
            events: stores.events.clone(),
            tasks: stores.maintenance_tasks.clone(),
            reports: stores.reports.clone(),
        }
    }

    /// Build the summary for the requested kind and store it as a report
    pub async fn generate(&self, request: ReportRequest) -> Result<Report, StoreError> {
        let (from, to) = (request.from, request.to);
        let summary = match request.kind {
            ReportKind::Financial => serde_json::to_value(self.financial(from, to).await?)?,
            ReportKind::Occupancy => serde_json::to_value(self.occupancy().await?)?,
            ReportKind::Maintenance => serde_json::to_value(self.maintenance(from, to).await?)?,
            ReportKind::Boarders => serde_json::to_value(self.boarders(from, to).await?)?,
            ReportKind::Events => serde_json::to_value(self.events(from, to).await?)?,
        };

        let meta = RecordMeta::fresh();
        let report = Report {
            id: meta.id,
            title: request
                .title
                .clone()
                .unwrap_or_else(|| request.default_title()),
            kind: request.kind,
            date_from: from,
            date_to: to,
            generated_at: meta.created_at,
            summary,
            created_at: meta.created_at,
            updated_at: meta.updated_at,
        };

        tracing::info!(kind = ?report.kind, id = %report.id, "generated report");
        self.reports.create(report).await
    }

    pub async fn financial(
        &self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<FinancialSummary, StoreError> {
        let (invoices, payments) = tokio::try_join!(
            self.invoices.find(in_range("issue_date", from, to)),
            self.payments.find(in_range("payment_date", from, to)),
        )?;

        let mut summary = FinancialSummary {
            invoice_count: invoices.len() as i64,
            payment_count: payments.len() as i64,
            payments_received_cents: payments.iter().map(|p| p.amount_cents).sum(),
            ..Default::default()
        };
        for invoice in &invoices {
            summary.invoiced_cents += invoice.amount_cents;
            let total = summary.by_status.entry(wire_name(&invoice.status)).or_default();
            total.count += 1;
            total.amount_cents += invoice.amount_cents;
            if InvoiceStatus::OUTSTANDING.contains(&invoice.status) {
                summary.outstanding_cents += invoice.amount_cents;
            }
        }
        Ok(summary)
    }

    pub async fn occupancy(&self) -> Result<OccupancySummary, StoreError> {
        let (stalls, horse_count) =
            tokio::try_join!(self.stalls.list_all(), self.horses.count())?;

        let total_stalls = stalls.len() as i64;
        let occupied = stalls
            .iter()
            .filter(|s| s.status == StallStatus::Occupied)
            .count() as f64;
        let occupancy_rate = if total_stalls == 0 {
            0.0
        } else {
            (occupied * 10_000.0 / total_stalls as f64).round() / 100.0
        };

        Ok(OccupancySummary {
            total_stalls,
            by_status: tally(stalls.iter().map(|s| &s.status)),
            horse_count,
            occupancy_rate,
        })
    }

    pub async fn maintenance(
        &self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<MaintenanceSummary, StoreError> {
        let today = Utc::now().date_naive();
        let overdue = QueryBuilder::new()
            .filter(QueryFilter::lt("due_date", json!(today.to_string())))
            .filter(status_in("status", &TaskStatus::OPEN));

        let (tasks, overdue) = tokio::try_join!(
            self.tasks.find(in_range("due_date", from, to)),
            self.tasks.count_where(overdue),
        )?;

        Ok(MaintenanceSummary {
            task_count: tasks.len() as i64,
            by_status: tally(tasks.iter().map(|t| &t.status)),
            by_priority: tally(tasks.iter().map(|t| &t.priority)),
            overdue,
        })
    }

    pub async fn boarders(
        &self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<BoarderSummary, StoreError> {
        let (boarders, new_in_range) = tokio::try_join!(
            self.boarders.list_all(),
            self.boarders.count_where(in_range("start_date", from, to)),
        )?;

        Ok(BoarderSummary {
            total: boarders.len() as i64,
            by_status: tally(boarders.iter().map(|b| &b.status)),
            new_in_range,
        })
    }

    pub async fn events(
        &self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<EventSummary, StoreError> {
        let events = self.events.find(in_range("starts_at", from, to)).await?;

        Ok(EventSummary {
            event_count: events.len() as i64,
            by_kind: tally(events.iter().map(|e| &e.kind)),
            by_status: tally(events.iter().map(|e| &e.status)),
        })
    }

    pub async fn handle_generate(&self, input: Value) -> ServerResponse<Report> {
        let request = match parse_input::<ReportRequest>(input) {
            Ok(request) => request,
            Err(errors) => return errors.into(),
        };
        let result = self.generate(request).await;
        if let Err(error) = &result {
            tracing::warn!(%error, "report generation failed");
        }
        ServerResponse::from_result(result)
    }
}
