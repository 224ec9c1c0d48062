use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::error::{NudgerError, Result};
use crate::model::{
    Client, DeliveryStatus, Invoice, InvoiceFilter, InvoiceStatus, ReminderHistory, ReminderLevel,
    ReminderSchedule, ReminderTemplate, TemplateOwner, TemplateStyle,
};
use crate::policy::ReminderPolicy;
use crate::resend::{EmailOptions, EmailSender};
use crate::store::Store;
use crate::template::{self, TemplateVars};

mod records;

pub use records::{ClientUpdate, InvoiceUpdate, NewClient, NewInvoice, NewTemplate, TemplateUpdate};

/// Sender identity applied to every outgoing reminder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SenderSettings {
    pub from: String,
    pub reply_to: Option<String>,
}

/// Counters returned by a reminder sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ProcessSummary {
    /// Open invoices examined.
    pub processed: usize,
    pub sent: usize,
    pub errors: usize,
}

/// An open invoice and when its next reminder is expected.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceSchedule {
    pub invoice: Invoice,
    pub due_now: bool,
    pub schedule: Option<ReminderSchedule>,
}

/// Runs reminder sweeps and manual sends against a store and an email sender.
pub struct ReminderService<S, E> {
    store: S,
    sender: E,
    settings: SenderSettings,
}

impl<S: Store, E: EmailSender> ReminderService<S, E> {
    pub fn new(store: S, sender: E, settings: SenderSettings) -> Self {
        Self {
            store,
            sender,
            settings,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Evaluates every pending or overdue invoice of `user_id` and sends the
    /// reminders that are due on `now`'s date.
    ///
    /// A failure on one invoice is logged and counted; the sweep moves on.
    /// Only failing to list the invoices aborts the run.
    #[tracing::instrument(skip(self, now))]
    pub async fn process_reminders(&self, user_id: &str, now: DateTime<Utc>) -> Result<ProcessSummary> {
        if user_id.is_empty() {
            return Err(NudgerError::InvalidInput("User ID is required".into()));
        }
        let invoices = self
            .store
            .invoices(user_id, &InvoiceFilter::open())
            .await?;

        let mut summary = ProcessSummary {
            processed: invoices.len(),
            ..ProcessSummary::default()
        };

        for invoice in &invoices {
            match self.process_invoice(user_id, invoice, now).await {
                Ok(Some(entry)) => {
                    summary.sent += 1;
                    tracing::info!(
                        invoice_id = %invoice.id,
                        level = %entry.level,
                        to = %entry.to,
                        "reminder sent"
                    );
                }
                Ok(None) => {
                    tracing::debug!(invoice_id = %invoice.id, "no reminder due");
                }
                Err(e) => {
                    summary.errors += 1;
                    tracing::error!(invoice_id = %invoice.id, error = %e, "failed to process reminder");
                }
            }
        }

        tracing::info!(
            processed = summary.processed,
            sent = summary.sent,
            errors = summary.errors,
            "reminder sweep finished"
        );
        Ok(summary)
    }

    async fn process_invoice(
        &self,
        user_id: &str,
        invoice: &Invoice,
        now: DateTime<Utc>,
    ) -> Result<Option<ReminderHistory>> {
        let client = self.load_client(&invoice.client_id).await?;
        let prefs = client.preferences();
        let today = now.date_naive();

        if !ReminderPolicy::should_send_reminder(invoice, &prefs, today) {
            return Ok(None);
        }

        let level = ReminderPolicy::reminder_level(invoice, today);
        let template = self
            .find_template(user_id, level, prefs.template_style)
            .await?
            .ok_or_else(|| NudgerError::template_not_found(format!("level {level}")))?;

        let entry = self.dispatch(invoice, &client, &template, now).await?;
        self.store.record_reminder_sent(&invoice.id, now).await?;

        if invoice.status == InvoiceStatus::Pending && level != ReminderLevel::PreDue {
            self.store
                .update_status(&invoice.id, InvoiceStatus::Overdue, now)
                .await?;
        }

        Ok(Some(entry))
    }

    /// Sends a reminder at an explicit level regardless of the schedule.
    ///
    /// With `template_id` that template is used and must be written for
    /// `level`; otherwise the client's preferred style for `level`, falling
    /// back to any style.
    #[tracing::instrument(skip(self, now))]
    pub async fn send_reminder(
        &self,
        invoice_id: &str,
        user_id: &str,
        level: ReminderLevel,
        template_id: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<ReminderHistory> {
        let invoice = self.load_owned_invoice(invoice_id, user_id).await?;
        let client = self.load_client(&invoice.client_id).await?;

        let template = match template_id {
            Some(id) => self
                .store
                .template(id)
                .await?
                .filter(|t| t.owner.visible_to(user_id))
                .ok_or_else(|| NudgerError::template_not_found(id))
                .and_then(|t| {
                    if t.level == level {
                        Ok(t)
                    } else {
                        Err(NudgerError::InvalidInput(format!(
                            "template {id} is for level {}, not {level}",
                            t.level
                        )))
                    }
                })?,
            None => self
                .find_template(user_id, level, client.preferences().template_style)
                .await?
                .ok_or_else(|| NudgerError::template_not_found(format!("level {level}")))?,
        };

        let entry = self.dispatch(&invoice, &client, &template, now).await?;
        self.store.record_reminder_sent(&invoice.id, now).await?;
        Ok(entry)
    }

    /// Reminder history of an invoice owned by `user_id`, newest first.
    pub async fn history(&self, invoice_id: &str, user_id: &str) -> Result<Vec<ReminderHistory>> {
        let invoice = self.load_owned_invoice(invoice_id, user_id).await?;
        self.store.history_for_invoice(&invoice.id).await
    }

    /// Inserts the built-in system templates that are not stored yet and
    /// returns how many were added.
    #[tracing::instrument(skip(self))]
    pub async fn seed_templates(&self) -> Result<usize> {
        let existing = self.store.templates("", None, None).await?;
        let mut created = 0;

        for template in template::default_templates() {
            let present = existing.iter().any(|t| {
                t.owner == TemplateOwner::System
                    && t.is_default
                    && t.level == template.level
                    && t.style == template.style
            });
            if present {
                continue;
            }
            self.store.put_template(template).await?;
            created += 1;
        }

        tracing::info!(created, "default templates seeded");
        Ok(created)
    }

    pub async fn mark_paid(&self, invoice_id: &str, now: DateTime<Utc>) -> Result<Invoice> {
        let invoice = self
            .store
            .update_status(invoice_id, InvoiceStatus::Paid, now)
            .await?;
        tracing::info!(invoice_id, "invoice marked paid");
        Ok(invoice)
    }

    /// Upcoming reminder dates for each of the user's open invoices.
    /// Invoices whose client is missing are skipped.
    pub async fn schedules(&self, user_id: &str, now: DateTime<Utc>) -> Result<Vec<InvoiceSchedule>> {
        let today = now.date_naive();
        let invoices = self
            .store
            .invoices(user_id, &InvoiceFilter::open())
            .await?;

        let mut out = Vec::with_capacity(invoices.len());
        for invoice in invoices {
            let Some(client) = self.store.client(&invoice.client_id).await? else {
                tracing::warn!(invoice_id = %invoice.id, client_id = %invoice.client_id, "client not found");
                continue;
            };
            let prefs = client.preferences();
            out.push(InvoiceSchedule {
                due_now: ReminderPolicy::should_send_reminder(&invoice, &prefs, today),
                schedule: ReminderPolicy::next_reminder(&invoice, &prefs, today),
                invoice,
            });
        }
        Ok(out)
    }

    async fn load_client(&self, client_id: &str) -> Result<Client> {
        self.store
            .client(client_id)
            .await?
            .ok_or_else(|| NudgerError::client_not_found(client_id))
    }

    async fn load_owned_invoice(&self, invoice_id: &str, user_id: &str) -> Result<Invoice> {
        let invoice = self
            .store
            .invoice(invoice_id)
            .await?
            .ok_or_else(|| NudgerError::invoice_not_found(invoice_id))?;
        if invoice.user_id != user_id {
            return Err(NudgerError::Unauthorized);
        }
        Ok(invoice)
    }

    /// Template for `level` in `style`, or any style when none matches.
    async fn find_template(
        &self,
        user_id: &str,
        level: ReminderLevel,
        style: TemplateStyle,
    ) -> Result<Option<ReminderTemplate>> {
        let styled = self.store.templates(user_id, Some(level), Some(style)).await?;
        if let Some(t) = styled.into_iter().next() {
            return Ok(Some(t));
        }
        let any = self.store.templates(user_id, Some(level), None).await?;
        Ok(any.into_iter().next())
    }

    /// Renders and sends one reminder, recording the attempt in history
    /// whether or not delivery succeeds.
    async fn dispatch(
        &self,
        invoice: &Invoice,
        client: &Client,
        template: &ReminderTemplate,
        now: DateTime<Utc>,
    ) -> Result<ReminderHistory> {
        let vars = TemplateVars::new(invoice, client, now.date_naive());
        let subject = template::render(&template.subject, &vars);
        let body = template::render(&template.body, &vars);

        let email = EmailOptions {
            to: client.email.clone(),
            subject: subject.clone(),
            html: body.clone(),
            from: Some(self.settings.from.clone()),
            reply_to: self.settings.reply_to.clone(),
            ..EmailOptions::default()
        };

        let mut entry = ReminderHistory {
            id: Uuid::new_v4().to_string(),
            invoice_id: invoice.id.clone(),
            template_id: template.id.clone(),
            sent_at: now,
            level: template.level,
            to: client.email.clone(),
            subject,
            body,
            status: DeliveryStatus::Sent,
            failure_reason: None,
        };

        match self.sender.send_email(&email).await {
            Ok(resp) => {
                tracing::debug!(email_id = %resp.id, invoice_id = %invoice.id, "email accepted");
                self.store.append_history(entry.clone()).await?;
                Ok(entry)
            }
            Err(e) => {
                entry.status = DeliveryStatus::Failed;
                entry.failure_reason = Some(e.to_string());
                if let Err(store_err) = self.store.append_history(entry).await {
                    tracing::warn!(error = %store_err, "could not record failed delivery");
                }
                Err(e.into())
            }
        }
    }
}
