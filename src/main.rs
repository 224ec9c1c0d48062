mod cli;
mod ui;

use std::sync::Arc;

use anyhow::Context;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use clap::Parser;
use cli::{Cli, ClientCommand, Command, InvoiceCommand, TemplateCommand};
use invoice_nudger::config::NudgerConfig;
use invoice_nudger::model::{InvoiceFilter, ReminderPreferences};
use invoice_nudger::resend::ResendClient;
use invoice_nudger::server::{self, ApiKeys};
use invoice_nudger::service::{
    ClientUpdate, InvoiceUpdate, NewClient, NewInvoice, NewTemplate, ReminderService, TemplateUpdate,
};
use invoice_nudger::store::{ClientStore, JsonFileStore};
use invoice_nudger::observability;

type Service = ReminderService<JsonFileStore, ResendClient>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    observability::init(cli.verbose);

    let config = NudgerConfig::load(cli.config.as_deref())?;
    let store = JsonFileStore::open(&config.data_file)
        .await
        .with_context(|| format!("failed to open {}", config.data_file.display()))?;
    let sender = ResendClient::with_base_url(
        config.resend_api_key.clone(),
        config.from_email.clone(),
        config.resend_base_url.clone(),
    );
    let service = ReminderService::new(store, sender, config.sender_settings());

    match cli.command {
        Command::Serve => serve(service, &config).await?,
        Command::Process { user_id, today } => {
            let progress = ui::SweepProgress::start(&user_id);
            match service.process_reminders(&user_id, now_or(today)).await {
                Ok(summary) => progress.complete(&summary),
                Err(e) => {
                    progress.fail(&e.to_string());
                    return Err(e.into());
                }
            }
        }
        Command::Status { user_id, today } => {
            let schedules = service.schedules(&user_id, now_or(today)).await?;
            ui::print_schedules(&schedules);
        }
        Command::Send {
            invoice_id,
            user_id,
            level,
            template_id,
        } => {
            let entry = service
                .send_reminder(
                    &invoice_id,
                    &user_id,
                    level.into(),
                    template_id.as_deref(),
                    Utc::now(),
                )
                .await?;
            ui::print_sent(&entry);
        }
        Command::History {
            invoice_id,
            user_id,
        } => {
            let entries = service.history(&invoice_id, &user_id).await?;
            ui::print_history(&entries);
        }
        Command::SeedTemplates => {
            let count = service.seed_templates().await?;
            println!("Created {count} default templates");
        }
        Command::MarkPaid { invoice_id } => {
            let invoice = service.mark_paid(&invoice_id, Utc::now()).await?;
            ui::print_paid(&invoice);
        }
        Command::Client { action } => client(&service, action).await?,
        Command::Invoice { action } => invoice(&service, action).await?,
        Command::Template { action } => template(&service, action).await?,
    }

    Ok(())
}

async fn serve(service: Service, config: &NudgerConfig) -> anyhow::Result<()> {
    if config.cron_api_key.is_none() {
        tracing::warn!("CRON_API_KEY not set, cron endpoint will reject every request");
    }
    let keys = ApiKeys {
        cron: config.cron_api_key.clone(),
        admin: config.admin_api_key.clone(),
    };
    let app = server::build_app(Arc::new(service), keys);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    tracing::info!(addr = %config.bind_addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;
    Ok(())
}

async fn client(service: &Service, action: ClientCommand) -> anyhow::Result<()> {
    match action {
        ClientCommand::Add {
            user_id,
            name,
            email,
            company,
            phone,
            category,
            prefs,
        } => {
            let new = NewClient {
                name,
                email,
                phone,
                company,
                category: category.map(Into::into),
                notes: None,
                reminder_preferences: Some(prefs.apply(ReminderPreferences::default())),
            };
            let client = service.create_client(&user_id, new, Utc::now()).await?;
            ui::print_done("Client created", &client.id);
        }
        ClientCommand::List { user_id, category } => {
            let clients = service.clients(&user_id, category.map(Into::into)).await?;
            ui::print_clients(&clients);
        }
        ClientCommand::Update {
            client_id,
            user_id,
            name,
            email,
            company,
            phone,
            category,
            prefs,
        } => {
            // Preference flags patch the client's current preferences.
            let reminder_preferences = if prefs.is_empty() {
                None
            } else {
                let current = service
                    .store()
                    .client(&client_id)
                    .await?
                    .map(|c| c.preferences())
                    .unwrap_or_default();
                Some(prefs.apply(current))
            };
            let update = ClientUpdate {
                name,
                email,
                phone,
                company,
                category: category.map(Into::into),
                notes: None,
                reminder_preferences,
            };
            let client = service
                .update_client(&client_id, &user_id, update, Utc::now())
                .await?;
            ui::print_done("Client updated", &client.id);
        }
        ClientCommand::Remove { client_id, user_id } => {
            service.delete_client(&client_id, &user_id).await?;
            ui::print_done("Client removed", &client_id);
        }
    }
    Ok(())
}

async fn invoice(service: &Service, action: InvoiceCommand) -> anyhow::Result<()> {
    match action {
        InvoiceCommand::Add {
            user_id,
            client_id,
            number,
            amount,
            currency,
            issued,
            due,
            status,
            description,
        } => {
            let now = Utc::now();
            let new = NewInvoice {
                client_id,
                invoice_number: number,
                amount,
                currency,
                issue_date: issued.unwrap_or_else(|| now.date_naive()),
                due_date: due,
                status: status.map(Into::into),
                description,
                notes: None,
                terms: None,
            };
            let invoice = service.create_invoice(&user_id, new, now).await?;
            ui::print_done("Invoice created", &invoice.id);
        }
        InvoiceCommand::List {
            user_id,
            status,
            client_id,
            from,
            to,
            min_amount,
            max_amount,
        } => {
            let filter = InvoiceFilter {
                statuses: status.into_iter().map(Into::into).collect(),
                client_id,
                from_date: from,
                to_date: to,
                min_amount,
                max_amount,
            };
            let invoices = service.invoices(&user_id, &filter).await?;
            ui::print_invoices(&invoices);
        }
        InvoiceCommand::Update {
            invoice_id,
            user_id,
            number,
            amount,
            due,
            status,
            description,
        } => {
            let update = InvoiceUpdate {
                invoice_number: number,
                amount,
                due_date: due,
                status: status.map(Into::into),
                description,
                ..InvoiceUpdate::default()
            };
            let invoice = service
                .update_invoice(&invoice_id, &user_id, update, Utc::now())
                .await?;
            ui::print_done("Invoice updated", &invoice.id);
        }
        InvoiceCommand::Remove { invoice_id, user_id } => {
            service.delete_invoice(&invoice_id, &user_id).await?;
            ui::print_done("Invoice removed", &invoice_id);
        }
    }
    Ok(())
}

async fn template(service: &Service, action: TemplateCommand) -> anyhow::Result<()> {
    match action {
        TemplateCommand::Add {
            user_id,
            name,
            level,
            style,
            subject,
            body,
        } => {
            let new = NewTemplate {
                name,
                level: level.into(),
                style: style.into(),
                subject,
                body,
            };
            let template = service.create_template(&user_id, new, Utc::now()).await?;
            ui::print_done("Template created", &template.id);
        }
        TemplateCommand::List { user_id, level, style } => {
            let templates = service
                .templates(&user_id, level.map(Into::into), style.map(Into::into))
                .await?;
            ui::print_templates(&templates);
        }
        TemplateCommand::Update {
            template_id,
            user_id,
            name,
            level,
            style,
            subject,
            body,
        } => {
            let update = TemplateUpdate {
                name,
                level: level.map(Into::into),
                style: style.map(Into::into),
                subject,
                body,
            };
            let template = service
                .update_template(&template_id, &user_id, update, Utc::now())
                .await?;
            ui::print_done("Template updated", &template.id);
        }
        TemplateCommand::Remove { template_id, user_id } => {
            service.delete_template(&template_id, &user_id).await?;
            ui::print_done("Template removed", &template_id);
        }
    }
    Ok(())
}

// `--today` pins the sweep to the start of that day in UTC.
fn now_or(today: Option<NaiveDate>) -> DateTime<Utc> {
    match today {
        Some(d) => d.and_time(NaiveTime::MIN).and_utc(),
        None => Utc::now(),
    }
}
