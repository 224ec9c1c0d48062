use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle status of an invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    Draft,
    Sent,
    Pending,
    Overdue,
    Paid,
    Cancelled,
}

impl InvoiceStatus {
    /// Statuses the reminder sweep looks at.
    pub const OPEN: [InvoiceStatus; 2] = [InvoiceStatus::Pending, InvoiceStatus::Overdue];

    pub fn is_open(self) -> bool {
        Self::OPEN.contains(&self)
    }
}

impl std::fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            InvoiceStatus::Draft => "draft",
            InvoiceStatus::Sent => "sent",
            InvoiceStatus::Pending => "pending",
            InvoiceStatus::Overdue => "overdue",
            InvoiceStatus::Paid => "paid",
            InvoiceStatus::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

/// A single billable line on an invoice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceItem {
    pub id: String,
    pub description: String,
    pub quantity: f64,
    pub unit_price: f64,
    pub amount: f64,
}

/// An invoice issued by a user to one of their clients.
///
/// Field names serialize in camelCase so stored documents keep the shape the
/// web front end reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub id: String,
    pub user_id: String,
    pub client_id: String,
    pub invoice_number: String,
    pub amount: f64,
    pub currency: String,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub status: InvoiceStatus,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<InvoiceItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terms: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Number of reminders dispatched so far. Only ever incremented by one
    /// per successful send.
    #[serde(default)]
    pub reminders_sent: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_reminder_sent: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paid_date: Option<DateTime<Utc>>,
}

impl Invoice {
    /// Creates a pending invoice with a fresh id and no reminder history.
    pub fn new(
        user_id: impl Into<String>,
        client_id: impl Into<String>,
        invoice_number: impl Into<String>,
        amount: f64,
        issue_date: NaiveDate,
        due_date: NaiveDate,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            client_id: client_id.into(),
            invoice_number: invoice_number.into(),
            amount,
            currency: "USD".to_string(),
            issue_date,
            due_date,
            status: InvoiceStatus::Pending,
            description: String::new(),
            items: Vec::new(),
            notes: None,
            terms: None,
            created_at: now,
            updated_at: now,
            reminders_sent: 0,
            last_reminder_sent: None,
            paid_date: None,
        }
    }

    /// Sets the status; moving to paid also stamps `paid_date`.
    pub fn set_status(&mut self, status: InvoiceStatus, now: DateTime<Utc>) {
        self.status = status;
        self.updated_at = now;
        if status == InvoiceStatus::Paid {
            self.paid_date = Some(now);
        }
    }
}

/// Criteria for listing a user's invoices. Unset fields match everything;
/// the date bounds apply to `issue_date` and are inclusive.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InvoiceFilter {
    /// Empty means any status.
    pub statuses: Vec<InvoiceStatus>,
    pub client_id: Option<String>,
    pub from_date: Option<NaiveDate>,
    pub to_date: Option<NaiveDate>,
    pub min_amount: Option<f64>,
    pub max_amount: Option<f64>,
}

impl InvoiceFilter {
    /// Pending and overdue invoices, the ones the reminder sweep handles.
    pub fn open() -> Self {
        Self {
            statuses: InvoiceStatus::OPEN.to_vec(),
            ..Self::default()
        }
    }

    pub fn matches(&self, invoice: &Invoice) -> bool {
        (self.statuses.is_empty() || self.statuses.contains(&invoice.status))
            && self.client_id.as_ref().is_none_or(|c| *c == invoice.client_id)
            && self.from_date.is_none_or(|d| invoice.issue_date >= d)
            && self.to_date.is_none_or(|d| invoice.issue_date <= d)
            && self.min_amount.is_none_or(|a| invoice.amount >= a)
            && self.max_amount.is_none_or(|a| invoice.amount <= a)
    }
}
