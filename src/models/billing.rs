use super::{EntityInput, RecordMeta, not_blank, ordered_window};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use table_derive::model;
use uuid::Uuid;
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    #[default]
    Draft,
    Sent,
    Paid,
    Overdue,
    Cancelled,
}

impl InvoiceStatus {
    /// Statuses whose amount is still owed
    pub const OUTSTANDING: [InvoiceStatus; 2] = [InvoiceStatus::Sent, InvoiceStatus::Overdue];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Check,
    Card,
    BankTransfer,
    Other,
}

#[model]
#[table(name = "invoices")]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    #[primary_key]
    pub id: Uuid,

    pub boarder_id: Uuid,

    #[field(searchable)]
    pub invoice_number: String,

    #[field(date_filter)]
    pub issue_date: NaiveDate,

    pub due_date: NaiveDate,
    pub amount_cents: i64,

    #[field(status)]
    pub status: InvoiceStatus,

    #[field(searchable)]
    pub description: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_invoice_dates"))]
pub struct InvoiceInput {
    pub boarder_id: Uuid,

    #[serde(default)]
    #[validate(custom(function = "not_blank", message = "Invoice number is required"))]
    pub invoice_number: String,

    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,

    #[validate(range(min = 0, message = "Amount cannot be negative"))]
    pub amount_cents: i64,

    #[serde(default)]
    pub status: InvoiceStatus,

    pub description: Option<String>,
}

fn validate_invoice_dates(input: &InvoiceInput) -> Result<(), ValidationError> {
    ordered_window(
        &input.issue_date,
        Some(&input.due_date),
        "Due date must not be before issue date",
    )
}

impl EntityInput for InvoiceInput {
    type Model = Invoice;

    fn into_model(self, meta: RecordMeta) -> Invoice {
        Invoice {
            id: meta.id,
            boarder_id: self.boarder_id,
            invoice_number: self.invoice_number,
            issue_date: self.issue_date,
            due_date: self.due_date,
            amount_cents: self.amount_cents,
            status: self.status,
            description: self.description,
            created_at: meta.created_at,
            updated_at: meta.updated_at,
        }
    }
}

#[model]
#[table(name = "payments")]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    #[primary_key]
    pub id: Uuid,

    pub invoice_id: Option<Uuid>,
    pub boarder_id: Uuid,
    pub amount_cents: i64,

    #[field(date_filter)]
    pub payment_date: NaiveDate,

    pub method: PaymentMethod,

    #[field(searchable)]
    pub reference: Option<String>,

    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PaymentInput {
    pub invoice_id: Option<Uuid>,
    pub boarder_id: Uuid,

    #[validate(range(min = 0, message = "Amount cannot be negative"))]
    pub amount_cents: i64,

    pub payment_date: NaiveDate,
    pub method: PaymentMethod,
    pub reference: Option<String>,
    pub notes: Option<String>,
}

impl EntityInput for PaymentInput {
    type Model = Payment;

    fn into_model(self, meta: RecordMeta) -> Payment {
        Payment {
            id: meta.id,
            invoice_id: self.invoice_id,
            boarder_id: self.boarder_id,
            amount_cents: self.amount_cents,
            payment_date: self.payment_date,
            method: self.method,
            reference: self.reference,
            notes: self.notes,
            created_at: meta.created_at,
            updated_at: meta.updated_at,
        }
    }
}

/// Planned against actual spend for one category and fiscal year
#[model]
#[table(name = "budgets")]
#[serde(rename_all = "camelCase")]
pub struct Budget {
    #[primary_key]
    pub id: Uuid,

    #[field(searchable)]
    pub name: String,

    #[field(searchable)]
    pub category: String,

    pub fiscal_year: i32,
    pub planned_cents: i64,
    pub actual_cents: i64,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BudgetInput {
    #[serde(default)]
    #[validate(custom(function = "not_blank", message = "Name is required"))]
    pub name: String,

    #[serde(default)]
    #[validate(custom(function = "not_blank", message = "Category is required"))]
    pub category: String,

    #[validate(range(min = 1900, max = 9999, message = "Fiscal year is out of range"))]
    pub fiscal_year: i32,

    #[validate(range(min = 0, message = "Planned amount cannot be negative"))]
    pub planned_cents: i64,

    #[serde(default)]
    #[validate(range(min = 0, message = "Actual amount cannot be negative"))]
    pub actual_cents: i64,

    pub notes: Option<String>,
}

impl EntityInput for BudgetInput {
    type Model = Budget;

    fn into_model(self, meta: RecordMeta) -> Budget {
        Budget {
            id: meta.id,
            name: self.name,
            category: self.category,
            fiscal_year: self.fiscal_year,
            planned_cents: self.planned_cents,
            actual_cents: self.actual_cents,
            notes: self.notes,
            created_at: meta.created_at,
            updated_at: meta.updated_at,
        }
    }
}
