//! Dashboard overview
//!
//! Independent counts across tables, fetched concurrently.

use crate::app::Stores;
use crate::core::StoreRef;
use crate::models::{
    Boarder, BoarderStatus, Event, EventStatus, Horse, Invoice, InvoiceStatus, MaintenanceTask, Stall, StallStatus,
    StaffShift, TaskStatus, now, wire_name,
};
use crate::server_fn::ServerResponse;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use store_object::{QueryBuilder, QueryFilter, StoreError};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardOverview {
    pub horses: i64,
    pub active_boarders: i64,
    pub available_stalls: i64,
    pub occupied_stalls: i64,
    pub open_invoices: i64,
    pub outstanding_cents: i64,
    pub upcoming_events: i64,
    pub open_maintenance_tasks: i64,
    pub staff_on_duty: i64,
}

fn status_is<E: Serialize>(status: &E) -> QueryBuilder {
    QueryBuilder::new().filter(QueryFilter::eq("status", json!(wire_name(status))))
}

fn status_in<E: Serialize>(statuses: &[E]) -> QueryBuilder {
    QueryBuilder::new().filter(QueryFilter::in_values(
        "status",
        statuses.iter().map(|s| Value::String(wire_name(s))).collect(),
    ))
}

#[derive(Debug, Clone)]
pub struct DashboardService {
    horses: StoreRef<Horse>,
    boarders: StoreRef<Boarder>,
    stalls: StoreRef<Stall>,
    invoices: StoreRef<Invoice>,
    events: StoreRef<Event>,
    tasks: StoreRef<MaintenanceTask>,
    shifts: StoreRef<StaffShift>,
}

impl DashboardService {
    pub fn new(stores: &Stores) -> Self {
        Self {
            horses: stores.horses.clone(),
            boarders: stores.boarders.clone(),
            stalls: stores.stalls.clone(),
            invoices: stores.invoices.clone(),
            events: stores.events.clone(),
            tasks: stores.maintenance_tasks.clone(),
            shifts: stores.staff_shifts.clone(),
        }
    }

    pub async fn overview(&self) -> Result<DashboardOverview, StoreError> {
        let now = json!(now().to_rfc3339());

        let upcoming = status_is(&EventStatus::Scheduled)
            .filter(QueryFilter::gte("starts_at", now.clone()));
        let on_duty = QueryBuilder::new()
            .filter(QueryFilter::lte("starts_at", now.clone()))
            .filter(QueryFilter::gt("ends_at", now));

        let (
            horses,
            active_boarders,
            available_stalls,
            occupied_stalls,
            open_invoices,
            upcoming_events,
            open_maintenance_tasks,
            staff_on_duty,
        ) = tokio::try_join!(
            self.horses.count(),
            self.boarders.count_where(status_is(&BoarderStatus::Active)),
            self.stalls.count_where(status_is(&StallStatus::Available)),
            self.stalls.count_where(status_is(&StallStatus::Occupied)),
            self.invoices.find(status_in(&InvoiceStatus::OUTSTANDING)),
            self.events.count_where(upcoming),
            self.tasks.count_where(status_in(&TaskStatus::OPEN)),
            self.shifts.count_where(on_duty),
        )?;

        Ok(DashboardOverview {
            horses,
            active_boarders,
            available_stalls,
            occupied_stalls,
            open_invoices: open_invoices.len() as i64,
            outstanding_cents: open_invoices.iter().map(|i| i.amount_cents).sum(),
            upcoming_events,
            open_maintenance_tasks,
            staff_on_duty,
        })
    }

    pub async fn handle_overview(&self, _input: Value) -> ServerResponse<DashboardOverview> {
        let result = self.overview().await;
        if let Err(error) = &result {
            tracing::warn!(%error, "dashboard overview failed");
        }
        ServerResponse::from_result(result)
    }
}
