//! Creating, editing and removing the records the reminder sweep reads:
//! clients, invoices and user templates.
//!
//! Every operation is scoped to a user. Records owned by someone else are
//! reported as [`NudgerError::Unauthorized`].

use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use uuid::Uuid;

use super::ReminderService;
use crate::error::{NudgerError, Result};
use crate::model::{
    Client, ClientCategory, Invoice, InvoiceFilter, InvoiceStatus, ReminderLevel,
    ReminderPreferences, ReminderTemplate, TemplateOwner, TemplateStyle,
};
use crate::resend::EmailSender;
use crate::store::Store;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewClient {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub category: Option<ClientCategory>,
    pub notes: Option<String>,
    /// Stored as given; the defaults are written when absent.
    pub reminder_preferences: Option<ReminderPreferences>,
}

/// Fields to change on a client. `None` leaves the field as it is.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub category: Option<ClientCategory>,
    pub notes: Option<String>,
    pub reminder_preferences: Option<ReminderPreferences>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewInvoice {
    pub client_id: String,
    pub invoice_number: String,
    pub amount: f64,
    pub currency: Option<String>,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    /// Defaults to draft.
    pub status: Option<InvoiceStatus>,
    #[serde(default)]
    pub description: String,
    pub notes: Option<String>,
    pub terms: Option<String>,
}

/// Fields to change on an invoice. The reminder counters are not editable.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceUpdate {
    pub invoice_number: Option<String>,
    pub amount: Option<f64>,
    pub currency: Option<String>,
    pub issue_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub status: Option<InvoiceStatus>,
    pub description: Option<String>,
    pub notes: Option<String>,
    pub terms: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTemplate {
    pub name: String,
    pub level: ReminderLevel,
    pub style: TemplateStyle,
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateUpdate {
    pub name: Option<String>,
    pub level: Option<ReminderLevel>,
    pub style: Option<TemplateStyle>,
    pub subject: Option<String>,
    pub body: Option<String>,
}

impl<S: Store, E: EmailSender> ReminderService<S, E> {
    #[tracing::instrument(skip(self, new, now), fields(name = %new.name))]
    pub async fn create_client(&self, user_id: &str, new: NewClient, now: DateTime<Utc>) -> Result<Client> {
        require_text("name", &new.name)?;
        require_email(&new.email)?;
        let prefs = new.reminder_preferences.unwrap_or_default();
        check_preferences(&prefs)?;

        let client = Client {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            name: new.name.trim().to_string(),
            email: new.email.trim().to_string(),
            phone: new.phone,
            company: new.company,
            address: None,
            category: new.category.unwrap_or_default(),
            notes: new.notes,
            reminder_preferences: Some(prefs),
            created_at: now,
            updated_at: now,
        };
        self.store.put_client(client.clone()).await?;
        tracing::info!(client_id = %client.id, "client created");
        Ok(client)
    }

    pub async fn update_client(
        &self,
        client_id: &str,
        user_id: &str,
        update: ClientUpdate,
        now: DateTime<Utc>,
    ) -> Result<Client> {
        let mut client = self.load_owned_client(client_id, user_id).await?;

        if let Some(name) = update.name {
            require_text("name", &name)?;
            client.name = name.trim().to_string();
        }
        if let Some(email) = update.email {
            require_email(&email)?;
            client.email = email.trim().to_string();
        }
        if let Some(prefs) = update.reminder_preferences {
            check_preferences(&prefs)?;
            client.reminder_preferences = Some(prefs);
        }
        if update.phone.is_some() {
            client.phone = update.phone;
        }
        if update.company.is_some() {
            client.company = update.company;
        }
        if update.notes.is_some() {
            client.notes = update.notes;
        }
        if let Some(category) = update.category {
            client.category = category;
        }
        client.updated_at = now;

        self.store.put_client(client.clone()).await?;
        Ok(client)
    }

    pub async fn set_client_category(
        &self,
        client_id: &str,
        user_id: &str,
        category: ClientCategory,
        now: DateTime<Utc>,
    ) -> Result<Client> {
        let update = ClientUpdate {
            category: Some(category),
            ..ClientUpdate::default()
        };
        self.update_client(client_id, user_id, update, now).await
    }

    /// Removes a client. Refused while any invoice still points at it, since
    /// the sweep would count those invoices as errors from then on.
    pub async fn delete_client(&self, client_id: &str, user_id: &str) -> Result<()> {
        let client = self.load_owned_client(client_id, user_id).await?;
        let filter = InvoiceFilter {
            client_id: Some(client.id.clone()),
            ..InvoiceFilter::default()
        };
        let remaining = self.store.invoices(user_id, &filter).await?.len();
        if remaining > 0 {
            return Err(NudgerError::InvalidInput(format!(
                "client {} still has {remaining} invoice(s)",
                client.id
            )));
        }
        self.store.delete_client(&client.id).await?;
        tracing::info!(client_id, "client deleted");
        Ok(())
    }

    pub async fn clients(&self, user_id: &str, category: Option<ClientCategory>) -> Result<Vec<Client>> {
        self.store.clients(user_id, category).await
    }

    #[tracing::instrument(skip(self, new, now), fields(number = %new.invoice_number))]
    pub async fn create_invoice(&self, user_id: &str, new: NewInvoice, now: DateTime<Utc>) -> Result<Invoice> {
        require_text("invoice number", &new.invoice_number)?;
        check_amount(new.amount)?;
        let client = self.load_owned_client(&new.client_id, user_id).await?;

        let mut invoice = Invoice::new(
            user_id,
            client.id,
            new.invoice_number.trim(),
            new.amount,
            new.issue_date,
            new.due_date,
        );
        invoice.status = new.status.unwrap_or(InvoiceStatus::Draft);
        if let Some(currency) = new.currency {
            invoice.currency = currency;
        }
        invoice.description = new.description;
        invoice.notes = new.notes;
        invoice.terms = new.terms;
        invoice.created_at = now;
        invoice.updated_at = now;
        if invoice.status == InvoiceStatus::Paid {
            invoice.paid_date = Some(now);
        }

        self.store.put_invoice(invoice.clone()).await?;
        tracing::info!(invoice_id = %invoice.id, status = %invoice.status, "invoice created");
        Ok(invoice)
    }

    pub async fn update_invoice(
        &self,
        invoice_id: &str,
        user_id: &str,
        update: InvoiceUpdate,
        now: DateTime<Utc>,
    ) -> Result<Invoice> {
        let mut invoice = self.load_owned_invoice(invoice_id, user_id).await?;

        if let Some(number) = update.invoice_number {
            require_text("invoice number", &number)?;
            invoice.invoice_number = number.trim().to_string();
        }
        if let Some(amount) = update.amount {
            check_amount(amount)?;
            invoice.amount = amount;
        }
        if let Some(currency) = update.currency {
            invoice.currency = currency;
        }
        if let Some(date) = update.issue_date {
            invoice.issue_date = date;
        }
        if let Some(date) = update.due_date {
            invoice.due_date = date;
        }
        if let Some(description) = update.description {
            invoice.description = description;
        }
        if update.notes.is_some() {
            invoice.notes = update.notes;
        }
        if update.terms.is_some() {
            invoice.terms = update.terms;
        }
        match update.status {
            Some(status) if status != invoice.status => invoice.set_status(status, now),
            _ => invoice.updated_at = now,
        }

        self.store.put_invoice(invoice.clone()).await?;
        Ok(invoice)
    }

    /// Removes an invoice. Its reminder history is kept.
    pub async fn delete_invoice(&self, invoice_id: &str, user_id: &str) -> Result<()> {
        let invoice = self.load_owned_invoice(invoice_id, user_id).await?;
        self.store.delete_invoice(&invoice.id).await?;
        tracing::info!(invoice_id, "invoice deleted");
        Ok(())
    }

    pub async fn invoices(&self, user_id: &str, filter: &InvoiceFilter) -> Result<Vec<Invoice>> {
        self.store.invoices(user_id, filter).await
    }

    pub async fn create_template(
        &self,
        user_id: &str,
        new: NewTemplate,
        now: DateTime<Utc>,
    ) -> Result<ReminderTemplate> {
        require_text("name", &new.name)?;
        require_text("subject", &new.subject)?;
        require_text("body", &new.body)?;

        let mut template = ReminderTemplate::new(
            TemplateOwner::User {
                user_id: user_id.to_string(),
            },
            new.name.trim(),
            new.level,
            new.style,
            new.subject,
            new.body,
        );
        template.created_at = now;
        template.updated_at = now;

        self.store.put_template(template.clone()).await?;
        tracing::info!(template_id = %template.id, level = %template.level, "template created");
        Ok(template)
    }

    pub async fn update_template(
        &self,
        template_id: &str,
        user_id: &str,
        update: TemplateUpdate,
        now: DateTime<Utc>,
    ) -> Result<ReminderTemplate> {
        let mut template = self.load_owned_template(template_id, user_id).await?;

        if let Some(name) = update.name {
            require_text("name", &name)?;
            template.name = name.trim().to_string();
        }
        if let Some(subject) = update.subject {
            require_text("subject", &subject)?;
            template.subject = subject;
        }
        if let Some(body) = update.body {
            require_text("body", &body)?;
            template.body = body;
        }
        if let Some(level) = update.level {
            template.level = level;
        }
        if let Some(style) = update.style {
            template.style = style;
        }
        template.updated_at = now;

        self.store.put_template(template.clone()).await?;
        Ok(template)
    }

    pub async fn delete_template(&self, template_id: &str, user_id: &str) -> Result<()> {
        let template = self.load_owned_template(template_id, user_id).await?;
        self.store.delete_template(&template.id).await?;
        tracing::info!(template_id, "template deleted");
        Ok(())
    }

    /// Templates usable by `user_id`, their own first.
    pub async fn templates(
        &self,
        user_id: &str,
        level: Option<ReminderLevel>,
        style: Option<TemplateStyle>,
    ) -> Result<Vec<ReminderTemplate>> {
        self.store.templates(user_id, level, style).await
    }

    async fn load_owned_client(&self, client_id: &str, user_id: &str) -> Result<Client> {
        let client = self.load_client(client_id).await?;
        if client.user_id != user_id {
            return Err(NudgerError::Unauthorized);
        }
        Ok(client)
    }

    // System templates are shared and read-only for users.
    async fn load_owned_template(&self, template_id: &str, user_id: &str) -> Result<ReminderTemplate> {
        let template = self
            .store
            .template(template_id)
            .await?
            .ok_or_else(|| NudgerError::template_not_found(template_id))?;
        match &template.owner {
            TemplateOwner::User { user_id: owner } if owner == user_id => Ok(template),
            _ => Err(NudgerError::Unauthorized),
        }
    }
}

fn require_text(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(NudgerError::InvalidInput(format!("{field} must not be empty")));
    }
    Ok(())
}

fn require_email(email: &str) -> Result<()> {
    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(NudgerError::InvalidInput(format!("invalid email address '{email}'"))),
    }
}

fn check_amount(amount: f64) -> Result<()> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(NudgerError::InvalidInput(format!("invalid amount {amount}")));
    }
    Ok(())
}

fn check_preferences(prefs: &ReminderPreferences) -> Result<()> {
    if prefs.reminder_interval == 0 {
        return Err(NudgerError::InvalidInput(
            "reminder interval must be at least one day".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::resend::{EmailOptions, ResendError, SendEmailResponse};
    use crate::service::SenderSettings;
    use crate::store::{ClientStore, MemoryStore};

    struct NoMail;

    impl EmailSender for NoMail {
        async fn send_email(&self, _email: &EmailOptions) -> std::result::Result<SendEmailResponse, ResendError> {
            Err(ResendError::MissingApiKey)
        }
    }

    fn service() -> ReminderService<MemoryStore, NoMail> {
        ReminderService::new(
            MemoryStore::new(),
            NoMail,
            SenderSettings {
                from: "invoices@studio.test".into(),
                reply_to: None,
            },
        )
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 2, 1, 10, 0, 0).unwrap()
    }

    fn new_client(name: &str) -> NewClient {
        NewClient {
            name: name.into(),
            email: format!("{}@example.com", name.to_lowercase()),
            ..NewClient::default()
        }
    }

    fn new_invoice(client_id: &str, number: &str, amount: f64) -> NewInvoice {
        NewInvoice {
            client_id: client_id.into(),
            invoice_number: number.into(),
            amount,
            currency: None,
            issue_date: date(2024, 1, 1),
            due_date: date(2024, 1, 31),
            status: None,
            description: String::new(),
            notes: None,
            terms: None,
        }
    }

    #[tokio::test]
    async fn created_client_gets_defaults() {
        let svc = service();
        let client = svc.create_client("u1", new_client("Ada"), now()).await.unwrap();

        assert_eq!(client.category, ClientCategory::Standard);
        assert_eq!(client.reminder_preferences, Some(ReminderPreferences::default()));
        assert_eq!(client.created_at, now());
        assert_eq!(svc.store().client(&client.id).await.unwrap(), Some(client));
    }

    #[tokio::test]
    async fn client_input_is_validated() {
        let svc = service();
        let blank = NewClient {
            name: "  ".into(),
            ..new_client("Ada")
        };
        assert!(matches!(
            svc.create_client("u1", blank, now()).await,
            Err(NudgerError::InvalidInput(_))
        ));

        let bad_email = NewClient {
            email: "not-an-address".into(),
            ..new_client("Ada")
        };
        assert!(matches!(
            svc.create_client("u1", bad_email, now()).await,
            Err(NudgerError::InvalidInput(_))
        ));

        let zero_interval = NewClient {
            reminder_preferences: Some(ReminderPreferences {
                reminder_interval: 0,
                ..ReminderPreferences::default()
            }),
            ..new_client("Ada")
        };
        assert!(matches!(
            svc.create_client("u1", zero_interval, now()).await,
            Err(NudgerError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn clients_list_by_category() {
        let svc = service();
        let ada = svc.create_client("u1", new_client("Ada"), now()).await.unwrap();
        svc.create_client("u1", new_client("Bob"), now()).await.unwrap();
        svc.create_client("u2", new_client("Cy"), now()).await.unwrap();

        svc.set_client_category(&ada.id, "u1", ClientCategory::Vip, now())
            .await
            .unwrap();

        let all: Vec<_> = svc.clients("u1", None).await.unwrap().into_iter().map(|c| c.name).collect();
        assert_eq!(all, vec!["Ada", "Bob"]);
        let vip = svc.clients("u1", Some(ClientCategory::Vip)).await.unwrap();
        assert_eq!(vip.len(), 1);
        assert_eq!(vip[0].id, ada.id);
    }

    #[tokio::test]
    async fn update_client_changes_only_given_fields() {
        let svc = service();
        let ada = svc.create_client("u1", new_client("Ada"), now()).await.unwrap();
        let later = now() + chrono::Duration::days(1);

        let updated = svc
            .update_client(
                &ada.id,
                "u1",
                ClientUpdate {
                    company: Some("Analytical Engines".into()),
                    ..ClientUpdate::default()
                },
                later,
            )
            .await
            .unwrap();
        assert_eq!(updated.company.as_deref(), Some("Analytical Engines"));
        assert_eq!(updated.name, "Ada");
        assert_eq!(updated.email, ada.email);
        assert_eq!(updated.updated_at, later);

        let err = svc
            .update_client(&ada.id, "u2", ClientUpdate::default(), later)
            .await
            .unwrap_err();
        assert!(matches!(err, NudgerError::Unauthorized));
    }

    #[tokio::test]
    async fn created_invoice_is_draft_with_no_reminders() {
        let svc = service();
        let ada = svc.create_client("u1", new_client("Ada"), now()).await.unwrap();
        let invoice = svc
            .create_invoice("u1", new_invoice(&ada.id, "INV-1", 300.0), now())
            .await
            .unwrap();

        assert_eq!(invoice.status, InvoiceStatus::Draft);
        assert_eq!(invoice.reminders_sent, 0);
        assert_eq!(invoice.client_id, ada.id);
        assert_eq!(invoice.currency, "USD");
    }

    #[tokio::test]
    async fn invoice_needs_own_client_and_sane_amount() {
        let svc = service();
        let theirs = svc.create_client("u2", new_client("Cy"), now()).await.unwrap();
        let err = svc
            .create_invoice("u1", new_invoice(&theirs.id, "INV-1", 10.0), now())
            .await
            .unwrap_err();
        assert!(matches!(err, NudgerError::Unauthorized));

        let err = svc
            .create_invoice("u1", new_invoice("ghost", "INV-1", 10.0), now())
            .await
            .unwrap_err();
        assert!(matches!(err, NudgerError::NotFound { kind: "Client", .. }));

        let ada = svc.create_client("u1", new_client("Ada"), now()).await.unwrap();
        for amount in [-1.0, f64::NAN, f64::INFINITY] {
            let err = svc
                .create_invoice("u1", new_invoice(&ada.id, "INV-1", amount), now())
                .await
                .unwrap_err();
            assert!(matches!(err, NudgerError::InvalidInput(_)), "{amount}");
        }
    }

    #[tokio::test]
    async fn update_invoice_to_paid_stamps_paid_date() {
        let svc = service();
        let ada = svc.create_client("u1", new_client("Ada"), now()).await.unwrap();
        let invoice = svc
            .create_invoice("u1", new_invoice(&ada.id, "INV-1", 300.0), now())
            .await
            .unwrap();

        let updated = svc
            .update_invoice(
                &invoice.id,
                "u1",
                InvoiceUpdate {
                    amount: Some(320.0),
                    status: Some(InvoiceStatus::Paid),
                    ..InvoiceUpdate::default()
                },
                now(),
            )
            .await
            .unwrap();
        assert_eq!(updated.amount, 320.0);
        assert_eq!(updated.status, InvoiceStatus::Paid);
        assert_eq!(updated.paid_date, Some(now()));
        assert_eq!(updated.reminders_sent, 0);
    }

    #[tokio::test]
    async fn invoices_filtered_by_client_date_and_amount() {
        let svc = service();
        let ada = svc.create_client("u1", new_client("Ada"), now()).await.unwrap();
        let bob = svc.create_client("u1", new_client("Bob"), now()).await.unwrap();
        svc.create_invoice("u1", new_invoice(&ada.id, "A-1", 100.0), now()).await.unwrap();
        svc.create_invoice("u1", new_invoice(&ada.id, "A-2", 900.0), now()).await.unwrap();
        let mut late = new_invoice(&bob.id, "B-1", 500.0);
        late.issue_date = date(2024, 3, 1);
        late.due_date = date(2024, 3, 31);
        svc.create_invoice("u1", late, now()).await.unwrap();

        let numbers = |list: Vec<Invoice>| {
            let mut n: Vec<_> = list.into_iter().map(|i| i.invoice_number).collect();
            n.sort();
            n
        };

        let by_client = InvoiceFilter {
            client_id: Some(ada.id.clone()),
            ..InvoiceFilter::default()
        };
        assert_eq!(numbers(svc.invoices("u1", &by_client).await.unwrap()), vec!["A-1", "A-2"]);

        let from_march = InvoiceFilter {
            from_date: Some(date(2024, 2, 1)),
            ..InvoiceFilter::default()
        };
        assert_eq!(numbers(svc.invoices("u1", &from_march).await.unwrap()), vec!["B-1"]);

        let mid_range = InvoiceFilter {
            min_amount: Some(200.0),
            max_amount: Some(600.0),
            ..InvoiceFilter::default()
        };
        assert_eq!(numbers(svc.invoices("u1", &mid_range).await.unwrap()), vec!["B-1"]);

        let drafts = InvoiceFilter {
            statuses: vec![InvoiceStatus::Draft],
            ..InvoiceFilter::default()
        };
        assert_eq!(svc.invoices("u1", &drafts).await.unwrap().len(), 3);
        assert!(svc.invoices("u1", &InvoiceFilter::open()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn client_with_invoices_cannot_be_deleted() {
        let svc = service();
        let ada = svc.create_client("u1", new_client("Ada"), now()).await.unwrap();
        let invoice = svc
            .create_invoice("u1", new_invoice(&ada.id, "INV-1", 300.0), now())
            .await
            .unwrap();

        let err = svc.delete_client(&ada.id, "u1").await.unwrap_err();
        assert!(matches!(err, NudgerError::InvalidInput(_)));

        let err = svc.delete_invoice(&invoice.id, "u2").await.unwrap_err();
        assert!(matches!(err, NudgerError::Unauthorized));

        svc.delete_invoice(&invoice.id, "u1").await.unwrap();
        svc.delete_client(&ada.id, "u1").await.unwrap();
        assert!(svc.clients("u1", None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn user_templates_are_editable_system_ones_are_not() {
        let svc = service();
        svc.seed_templates().await.unwrap();
        let mine = svc
            .create_template(
                "u1",
                NewTemplate {
                    name: "Short nudge".into(),
                    level: ReminderLevel::Gentle,
                    style: TemplateStyle::Neutral,
                    subject: "#{invoice_number}".into(),
                    body: "<p>Hi {client_name}</p>".into(),
                },
                now(),
            )
            .await
            .unwrap();
        assert_eq!(mine.owner, TemplateOwner::User { user_id: "u1".into() });

        let listed = svc.templates("u1", Some(ReminderLevel::Gentle), None).await.unwrap();
        assert_eq!(listed[0].id, mine.id);
        assert_eq!(listed.len(), 5);

        let edited = svc
            .update_template(
                &mine.id,
                "u1",
                TemplateUpdate {
                    level: Some(ReminderLevel::Firm),
                    ..TemplateUpdate::default()
                },
                now(),
            )
            .await
            .unwrap();
        assert_eq!(edited.level, ReminderLevel::Firm);

        let err = svc
            .update_template(&mine.id, "u2", TemplateUpdate::default(), now())
            .await
            .unwrap_err();
        assert!(matches!(err, NudgerError::Unauthorized));

        let system = svc.templates("u1", Some(ReminderLevel::Final), None).await.unwrap().remove(0);
        assert_eq!(system.owner, TemplateOwner::System);
        let err = svc.delete_template(&system.id, "u1").await.unwrap_err();
        assert!(matches!(err, NudgerError::Unauthorized));

        svc.delete_template(&mine.id, "u1").await.unwrap();
        assert!(matches!(
            svc.delete_template(&mine.id, "u1").await,
            Err(NudgerError::NotFound { kind: "Template", .. })
        ));
    }
}
