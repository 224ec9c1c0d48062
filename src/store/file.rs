use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::{ClientStore, HistoryStore, InvoiceStore, Snapshot, TemplateStore};
use crate::error::Result;
use crate::model::{
    Client, ClientCategory, Invoice, InvoiceFilter, InvoiceStatus, ReminderHistory, ReminderLevel,
    ReminderTemplate, TemplateStyle,
};

/// Holds the data set in memory and rewrites a JSON file after every change.
///
/// Writes go to a sibling `.tmp` file first and are renamed into place, so a
/// crash mid-write leaves the previous contents intact. A change only becomes
/// visible to readers once it is on disk.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    inner: RwLock<Snapshot>,
}

impl JsonFileStore {
    /// Loads `path`, starting empty when the file does not exist yet.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let snapshot = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => serde_json::from_str(&contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "data file not found, starting empty");
                Snapshot::default()
            }
            Err(e) => return Err(e.into()),
        };
        Ok(Self {
            path,
            inner: RwLock::new(snapshot),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Applies `change` to a copy of the data, writes the copy, and only then
    /// replaces the in-memory state. Holds the write lock throughout.
    async fn mutate<T, F>(&self, change: F) -> Result<T>
    where
        F: FnOnce(&mut Snapshot) -> Result<T> + Send,
        T: Send,
    {
        let mut current = self.inner.write().await;
        let mut next = current.clone();
        let out = change(&mut next)?;
        if let Err(e) = self.persist(&next).await {
            tracing::error!(path = %self.path.display(), error = %e, "failed to write data file");
            return Err(e);
        }
        *current = next;
        Ok(out)
    }

    async fn persist(&self, snapshot: &Snapshot) -> Result<()> {
        let json = serde_json::to_string_pretty(snapshot)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

impl InvoiceStore for JsonFileStore {
    async fn invoices(&self, user_id: &str, filter: &InvoiceFilter) -> Result<Vec<Invoice>> {
        Ok(self.inner.read().await.invoices(user_id, filter))
    }

    async fn invoice(&self, id: &str) -> Result<Option<Invoice>> {
        Ok(self.inner.read().await.invoices.get(id).cloned())
    }

    async fn put_invoice(&self, invoice: Invoice) -> Result<()> {
        self.mutate(|snap| {
            snap.invoices.insert(invoice.id.clone(), invoice);
            Ok(())
        })
        .await
    }

    async fn update_status(&self, id: &str, status: InvoiceStatus, now: DateTime<Utc>) -> Result<Invoice> {
        self.mutate(|snap| snap.update_status(id, status, now)).await
    }

    async fn record_reminder_sent(&self, id: &str, at: DateTime<Utc>) -> Result<Invoice> {
        self.mutate(|snap| snap.record_reminder_sent(id, at)).await
    }

    async fn delete_invoice(&self, id: &str) -> Result<()> {
        self.mutate(|snap| snap.delete_invoice(id)).await
    }
}

impl ClientStore for JsonFileStore {
    async fn client(&self, id: &str) -> Result<Option<Client>> {
        Ok(self.inner.read().await.clients.get(id).cloned())
    }

    async fn clients(&self, user_id: &str, category: Option<ClientCategory>) -> Result<Vec<Client>> {
        Ok(self.inner.read().await.clients(user_id, category))
    }

    async fn put_client(&self, client: Client) -> Result<()> {
        self.mutate(|snap| {
            snap.clients.insert(client.id.clone(), client);
            Ok(())
        })
        .await
    }

    async fn delete_client(&self, id: &str) -> Result<()> {
        self.mutate(|snap| snap.delete_client(id)).await
    }
}

impl TemplateStore for JsonFileStore {
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
        self.mutate(|snap| {
            snap.templates.insert(template.id.clone(), template);
            Ok(())
        })
        .await
    }

    async fn delete_template(&self, id: &str) -> Result<()> {
        self.mutate(|snap| snap.delete_template(id)).await
    }
}

impl HistoryStore for JsonFileStore {
    async fn append_history(&self, entry: ReminderHistory) -> Result<()> {
        self.mutate(|snap| {
            snap.history.push(entry);
            Ok(())
        })
        .await
    }

    async fn history_for_invoice(&self, invoice_id: &str) -> Result<Vec<ReminderHistory>> {
        Ok(self.inner.read().await.history_for_invoice(invoice_id))
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use tempfile::TempDir;

    use super::*;

    #[tokio::test]
    async fn missing_file_opens_empty() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::open(dir.path().join("data.json")).await.unwrap();
        assert!(store.invoices("u1", &InvoiceFilter::default()).await.unwrap().is_empty());
        assert!(!store.path().exists());
    }

    #[tokio::test]
    async fn changes_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.json");
        let due = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
        let invoice = Invoice::new("u1", "c1", "1", 10.0, due, due);
        let id = invoice.id.clone();

        {
            let store = JsonFileStore::open(&path).await.unwrap();
            store.put_invoice(invoice).await.unwrap();
            store.record_reminder_sent(&id, Utc::now()).await.unwrap();
        }

        let reopened = JsonFileStore::open(&path).await.unwrap();
        let stored = reopened.invoice(&id).await.unwrap().unwrap();
        assert_eq!(stored.reminders_sent, 1);
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[tokio::test]
    async fn corrupt_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(JsonFileStore::open(&path).await.is_err());
    }

    #[tokio::test]
    async fn failed_write_is_not_visible() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::open(dir.path().join("no-such-dir").join("data.json"))
            .await
            .unwrap();
        let due = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
        let invoice = Invoice::new("u1", "c1", "1", 10.0, due, due);

        assert!(store.put_invoice(invoice.clone()).await.is_err());
        assert_eq!(store.invoice(&invoice.id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn failed_write_does_not_count_the_reminder() {
        let dir = TempDir::new().unwrap();
        let data_dir = dir.path().join("data");
        std::fs::create_dir(&data_dir).unwrap();
        let store = JsonFileStore::open(data_dir.join("data.json")).await.unwrap();
        let due = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
        let invoice = Invoice::new("u1", "c1", "1", 10.0, due, due);
        let id = invoice.id.clone();
        store.put_invoice(invoice).await.unwrap();

        std::fs::remove_dir_all(&data_dir).unwrap();
        assert!(store.record_reminder_sent(&id, Utc::now()).await.is_err());

        let stored = store.invoice(&id).await.unwrap().unwrap();
        assert_eq!(stored.reminders_sent, 0);
        assert!(stored.last_reminder_sent.is_none());
    }

    #[tokio::test]
    async fn delete_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.json");
        let client = Client::new("u1", "Ada", "ada@example.com");
        let id = client.id.clone();

        {
            let store = JsonFileStore::open(&path).await.unwrap();
            store.put_client(client).await.unwrap();
            store.delete_client(&id).await.unwrap();
        }

        let reopened = JsonFileStore::open(&path).await.unwrap();
        assert_eq!(reopened.client(&id).await.unwrap(), None);
        assert!(reopened.clients("u1", None).await.unwrap().is_empty());
    }
}
