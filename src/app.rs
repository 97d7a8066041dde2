//! Application wiring
//!
//! Creates one store per table on the coordinator and registers every server
//! function over them.

use crate::core::{StableHaus, StoreRef};
use crate::dashboard::DashboardService;
use crate::errors::StableHausError;
use crate::models::*;
use crate::queries::QueryClient;
use crate::reports::ReportService;
use crate::server_fn::{EntityService, ServerFunctions};
use cache_system::CacheParams;
use serde_json::Value;
use std::sync::Arc;
use store_object::{StoreError, TableMetadata};
use tokio::sync::Mutex;

/// The store of every table the application serves
#[derive(Debug, Clone)]
pub struct Stores {
    pub boarders: StoreRef<Boarder>,
    pub horses: StoreRef<Horse>,
    pub stalls: StoreRef<Stall>,
    pub pastures: StoreRef<Pasture>,
    pub pasture_rotations: StoreRef<PastureRotation>,
    pub invoices: StoreRef<Invoice>,
    pub payments: StoreRef<Payment>,
    pub budgets: StoreRef<Budget>,
    pub events: StoreRef<Event>,
    pub facilities: StoreRef<Facility>,
    pub maintenance_tasks: StoreRef<MaintenanceTask>,
    pub staff: StoreRef<Staff>,
    pub staff_shifts: StoreRef<StaffShift>,
    pub visitors: StoreRef<Visitor>,
    pub reports: StoreRef<Report>,
    pub users: StoreRef<User>,
}

impl Stores {
    pub fn from_haus(haus: &mut StableHaus) -> Result<Self, StableHausError> {
        Ok(Self {
            boarders: haus.store()?,
            horses: haus.store()?,
            stalls: haus.store()?,
            pastures: haus.store()?,
            pasture_rotations: haus.store()?,
            invoices: haus.store()?,
            payments: haus.store()?,
            budgets: haus.store()?,
            events: haus.store()?,
            facilities: haus.store()?,
            maintenance_tasks: haus.store()?,
            staff: haus.store()?,
            staff_shifts: haus.store()?,
            visitors: haus.store()?,
            reports: haus.store()?,
            users: haus.store()?,
        })
    }
}

/// Every server function of the application
pub fn server_functions(stores: &Stores) -> ServerFunctions {
    let mut functions = ServerFunctions::new();

    functions.register_entity(EntityService::<BoarderInput>::new(stores.boarders.clone()));
    functions.register_entity(EntityService::<HorseInput>::new(stores.horses.clone()));
    functions.register_entity(EntityService::<StallInput>::new(stores.stalls.clone()));
    functions.register_entity(EntityService::<PastureInput>::new(stores.pastures.clone()));
    functions.register_entity(EntityService::<PastureRotationInput>::new(
        stores.pasture_rotations.clone(),
    ));
    functions.register_entity(EntityService::<InvoiceInput>::new(stores.invoices.clone()));
    functions.register_entity(EntityService::<PaymentInput>::new(stores.payments.clone()));
    functions.register_entity(EntityService::<BudgetInput>::new(stores.budgets.clone()));
    functions.register_entity(EntityService::<EventInput>::new(stores.events.clone()));
    functions.register_entity(EntityService::<FacilityInput>::new(stores.facilities.clone()));
    functions.register_entity(EntityService::<MaintenanceTaskInput>::new(
        stores.maintenance_tasks.clone(),
    ));
    functions.register_entity(EntityService::<StaffInput>::new(stores.staff.clone()));
    functions.register_entity(EntityService::<StaffShiftInput>::new(stores.staff_shifts.clone()));
    functions.register_entity(EntityService::<VisitorInput>::new(stores.visitors.clone()));
    functions.register_entity(EntityService::<ReportInput>::new(stores.reports.clone()));

    let reports = ReportService::new(stores);
    functions.register("reports.generate", move |input| {
        let reports = reports.clone();
        async move { reports.handle_generate(input).await }
    });

    let dashboard = DashboardService::new(stores);
    functions.register("dashboard.overview", move |input| {
        let dashboard = dashboard.clone();
        async move { dashboard.handle_overview(input).await }
    });

    // Users get no CRUD functions; the data viewer sees them without password hashes
    let users = stores.users.clone();
    functions.register_table(User::table_name(), move || {
        let users = users.clone();
        async move {
            let records = users.list_all().await?;
            records
                .iter()
                .map(|user| -> Result<Value, StoreError> {
                    let mut record = user.to_record()?;
                    record.remove(User::SECRET_KEY);
                    Ok(Value::Object(record))
                })
                .collect::<Result<Vec<_>, StoreError>>()
        }
    });

    functions
}

/// Coordinator, stores and server functions of a running application
#[derive(Debug, Clone)]
pub struct App {
    pub haus: Arc<StableHaus>,
    pub stores: Stores,
    pub functions: Arc<ServerFunctions>,
    /// Held across the email lookup and insert of a registration
    pub registrations: Arc<Mutex<()>>,
}

impl App {
    pub fn new(mut haus: StableHaus) -> Result<Self, StableHausError> {
        let stores = Stores::from_haus(&mut haus)?;
        let functions = Arc::new(server_functions(&stores));
        tracing::debug!(
            functions = functions.names().len(),
            backend = ?haus.backend(),
            "application wired"
        );

        Ok(Self {
            haus: Arc::new(haus),
            stores,
            functions,
            registrations: Arc::new(Mutex::new(())),
        })
    }

    pub fn in_memory() -> Result<Self, StableHausError> {
        Self::new(StableHaus::in_memory())
    }

    /// Query client over `cache`, invalidated by this application's store signals
    pub fn query_client(&self, cache: CacheParams) -> QueryClient {
        let mut client = QueryClient::new(Arc::clone(&self.functions), cache);
        client.subscribe(self.haus.signals());
        client
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_table_is_served() {
        let app = App::in_memory().unwrap();
        let names = app.functions.names();

        for table in [
            "boarders",
            "horses",
            "stalls",
            "pastures",
            "pasture_rotations",
            "invoices",
            "payments",
            "budgets",
            "events",
            "facilities",
            "maintenance_tasks",
            "staff",
            "staff_shifts",
            "visitors",
            "reports",
        ] {
            for operation in ["list", "get", "create", "update", "delete"] {
                let name = format!("{}.{}", table, operation);
                assert!(names.contains(&name.as_str()), "missing {}", name);
            }
        }
        assert!(app.functions.contains("reports.generate"));
        assert!(app.functions.contains("dashboard.overview"));
        assert!(!app.functions.contains("users.create"));
        assert_eq!(app.functions.table_names().len(), 16);
        assert_eq!(app.haus.list_stores().len(), 16);
    }
}
