use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::{ClientStore, HistoryStore, InvoiceStore, Snapshot, TemplateStore};
use crate::error::Result;
use crate::model::{
    Client, ClientCategory, Invoice, InvoiceFilter, InvoiceStatus, ReminderHistory, ReminderLevel,
    ReminderTemplate, TemplateStyle,
};

/// Keeps everything in process memory. Data is lost on exit.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Snapshot>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        Self {
            inner: RwLock::new(snapshot),
        }
    }

    /// A copy of the current contents.
    pub async fn snapshot(&self) -> Snapshot {
        self.inner.read().await.clone()
    }
}

impl InvoiceStore for MemoryStore {
    async fn invoices(&self, user_id: &str, filter: &InvoiceFilter) -> Result<Vec<Invoice>> {
        Ok(self.inner.read().await.invoices(user_id, filter))
    }

    async fn invoice(&self, id: &str) -> Result<Option<Invoice>> {
        Ok(self.inner.read().await.invoices.get(id).cloned())
    }

    async fn put_invoice(&self, invoice: Invoice) -> Result<()> {
        self.inner.write().await.invoices.insert(invoice.id.clone(), invoice);
        Ok(())
    }

    async fn update_status(&self, id: &str, status: InvoiceStatus, now: DateTime<Utc>) -> Result<Invoice> {
        self.inner.write().await.update_status(id, status, now)
    }

    async fn record_reminder_sent(&self, id: &str, at: DateTime<Utc>) -> Result<Invoice> {
        self.inner.write().await.record_reminder_sent(id, at)
    }

    async fn delete_invoice(&self, id: &str) -> Result<()> {
        self.inner.write().await.delete_invoice(id)
    }
}

impl ClientStore for MemoryStore {
    async fn client(&self, id: &str) -> Result<Option<Client>> {
        Ok(self.inner.read().await.clients.get(id).cloned())
    }

    async fn clients(&self, user_id: &str, category: Option<ClientCategory>) -> Result<Vec<Client>> {
        Ok(self.inner.read().await.clients(user_id, category))
    }

    async fn put_client(&self, client: Client) -> Result<()> {
        self.inner.write().await.clients.insert(client.id.clone(), client);
        Ok(())
    }

    async fn delete_client(&self, id: &str) -> Result<()> {
        self.inner.write().await.delete_client(id)
    }
}

impl TemplateStore for MemoryStore {
    async fn templates(
        &self,
        user_id: &str,
        level: Option<ReminderLevel>,
        style: Option<TemplateStyle>,
    ) -> Result<Vec<ReminderTemplate>> {
        Ok(self.inner.read().await.templates(user_id, level, style))
    }

    async fn template(&self, id: &str) -> Result<Option<ReminderTemplate>> {
        Ok(self.inner.read().await.templates.get(id).cloned())
    }

    async fn put_template(&self, template: ReminderTemplate) -> Result<()> {
        self.inner.write().await.templates.insert(template.id.clone(), template);
        Ok(())
    }

    async fn delete_template(&self, id: &str) -> Result<()> {
        self.inner.write().await.delete_template(id)
    }
}

impl HistoryStore for MemoryStore {
    async fn append_history(&self, entry: ReminderHistory) -> Result<()> {
        self.inner.write().await.history.push(entry);
        Ok(())
    }

    async fn history_for_invoice(&self, invoice_id: &str) -> Result<Vec<ReminderHistory>> {
        Ok(self.inner.read().await.history_for_invoice(invoice_id))
    }
}
