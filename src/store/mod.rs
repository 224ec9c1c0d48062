//! Persistence for invoices, clients, templates and reminder history.
//!
//! The reminder service only talks to the four traits below. Two backends
//! implement them: [`MemoryStore`] for tests and one-off runs, and
//! [`JsonFileStore`] which keeps the same data in a JSON document on disk.

mod file;
mod memory;

use std::collections::BTreeMap;
use std::future::Future;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{NudgerError, Result};
use crate::model::{
    Client, ClientCategory, Invoice, InvoiceFilter, InvoiceStatus, ReminderHistory, ReminderLevel,
    ReminderTemplate, TemplateOwner, TemplateStyle,
};

pub use file::JsonFileStore;
pub use memory::MemoryStore;

pub trait InvoiceStore: Send + Sync {
    /// A user's invoices that pass `filter`, newest first.
    fn invoices(
        &self,
        user_id: &str,
        filter: &InvoiceFilter,
    ) -> impl Future<Output = Result<Vec<Invoice>>> + Send;

    fn invoice(&self, id: &str) -> impl Future<Output = Result<Option<Invoice>>> + Send;

    /// Inserts or replaces by id.
    fn put_invoice(&self, invoice: Invoice) -> impl Future<Output = Result<()>> + Send;

    /// Sets the status; marking an invoice paid also stamps `paid_date`.
    fn update_status(
        &self,
        id: &str,
        status: InvoiceStatus,
        now: DateTime<Utc>,
    ) -> impl Future<Output = Result<Invoice>> + Send;

    /// Bumps `reminders_sent` by one and sets `last_reminder_sent` to `at`.
    fn record_reminder_sent(
        &self,
        id: &str,
        at: DateTime<Utc>,
    ) -> impl Future<Output = Result<Invoice>> + Send;

    fn delete_invoice(&self, id: &str) -> impl Future<Output = Result<()>> + Send;
}

pub trait ClientStore: Send + Sync {
    fn client(&self, id: &str) -> impl Future<Output = Result<Option<Client>>> + Send;

    /// A user's clients sorted by name, optionally only one category.
    fn clients(
        &self,
        user_id: &str,
        category: Option<ClientCategory>,
    ) -> impl Future<Output = Result<Vec<Client>>> + Send;

    fn put_client(&self, client: Client) -> impl Future<Output = Result<()>> + Send;

    fn delete_client(&self, id: &str) -> impl Future<Output = Result<()>> + Send;
}

pub trait TemplateStore: Send + Sync {
    /// Templates visible to `user_id`, optionally narrowed to a level and a
    /// style. The user's own templates come before system ones.
    fn templates(
        &self,
        user_id: &str,
        level: Option<ReminderLevel>,
        style: Option<TemplateStyle>,
    ) -> impl Future<Output = Result<Vec<ReminderTemplate>>> + Send;

    fn template(&self, id: &str) -> impl Future<Output = Result<Option<ReminderTemplate>>> + Send;

    fn put_template(&self, template: ReminderTemplate) -> impl Future<Output = Result<()>> + Send;

    fn delete_template(&self, id: &str) -> impl Future<Output = Result<()>> + Send;
}

pub trait HistoryStore: Send + Sync {
    fn append_history(&self, entry: ReminderHistory) -> impl Future<Output = Result<()>> + Send;

    /// Dispatch attempts for one invoice, newest first.
    fn history_for_invoice(
        &self,
        invoice_id: &str,
    ) -> impl Future<Output = Result<Vec<ReminderHistory>>> + Send;
}

/// Everything the reminder service needs from persistence.
pub trait Store: InvoiceStore + ClientStore + TemplateStore + HistoryStore {}

impl<T> Store for T where T: InvoiceStore + ClientStore + TemplateStore + HistoryStore {}

/// The full data set held by a backend.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default)]
    pub invoices: BTreeMap<String, Invoice>,
    #[serde(default)]
    pub clients: BTreeMap<String, Client>,
    #[serde(default)]
    pub templates: BTreeMap<String, ReminderTemplate>,
    #[serde(default)]
    pub history: Vec<ReminderHistory>,
}

impl Snapshot {
    fn invoices(&self, user_id: &str, filter: &InvoiceFilter) -> Vec<Invoice> {
        let mut found: Vec<Invoice> = self
            .invoices
            .values()
            .filter(|inv| inv.user_id == user_id && filter.matches(inv))
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        found
    }

    fn delete_invoice(&mut self, id: &str) -> Result<()> {
        self.invoices
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| NudgerError::invoice_not_found(id))
    }

    fn clients(&self, user_id: &str, category: Option<ClientCategory>) -> Vec<Client> {
        let mut found: Vec<Client> = self
            .clients
            .values()
            .filter(|c| c.user_id == user_id)
            .filter(|c| category.is_none_or(|cat| c.category == cat))
            .cloned()
            .collect();
        found.sort_by(|a, b| a.name.cmp(&b.name));
        found
    }

    fn delete_client(&mut self, id: &str) -> Result<()> {
        self.clients
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| NudgerError::client_not_found(id))
    }

    fn delete_template(&mut self, id: &str) -> Result<()> {
        self.templates
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| NudgerError::template_not_found(id))
    }

    fn invoice_mut(&mut self, id: &str) -> Result<&mut Invoice> {
        self.invoices
            .get_mut(id)
            .ok_or_else(|| NudgerError::invoice_not_found(id))
    }

    fn update_status(&mut self, id: &str, status: InvoiceStatus, now: DateTime<Utc>) -> Result<Invoice> {
        let invoice = self.invoice_mut(id)?;
        invoice.set_status(status, now);
        Ok(invoice.clone())
    }

    fn record_reminder_sent(&mut self, id: &str, at: DateTime<Utc>) -> Result<Invoice> {
        let invoice = self.invoice_mut(id)?;
        invoice.reminders_sent = invoice.reminders_sent.saturating_add(1);
        invoice.last_reminder_sent = Some(at);
        invoice.updated_at = at;
        Ok(invoice.clone())
    }

    fn templates(
        &self,
        user_id: &str,
        level: Option<ReminderLevel>,
        style: Option<TemplateStyle>,
    ) -> Vec<ReminderTemplate> {
        let mut found: Vec<ReminderTemplate> = self
            .templates
            .values()
            .filter(|t| t.owner.visible_to(user_id))
            .filter(|t| level.is_none_or(|l| t.level == l))
            .filter(|t| style.is_none_or(|s| t.style == s))
            .cloned()
            .collect();
        found.sort_by_key(|t| (t.owner == TemplateOwner::System, t.level, t.created_at));
        found
    }

    fn history_for_invoice(&self, invoice_id: &str) -> Vec<ReminderHistory> {
        let mut found: Vec<ReminderHistory> = self
            .history
            .iter()
            .filter(|h| h.invoice_id == invoice_id)
            .cloned()
            .collect();
        found.sort_by(|a, b| b.sent_at.cmp(&a.sent_at));
        found
    }
}
