//! Interface de terminal do Invoice Nudger: spinners e saída colorida.
//!
//! Usa `indicatif` para o spinner da varredura e `console` para
//! estilização com cores. O [`SweepProgress`] acompanha visualmente
//! uma execução de `process`.

use console::Style;
use indicatif::{ProgressBar, ProgressStyle};
use invoice_nudger::model::{Client, Invoice, ReminderHistory, ReminderTemplate, TemplateOwner};
use invoice_nudger::service::{InvoiceSchedule, ProcessSummary};

/// Indicador visual de progresso para uma varredura de lembretes.
///
/// Exibe um spinner durante o processamento e o resumo final em verde
/// (sem erros) ou amarelo (com erros).
pub struct SweepProgress {
    pb: ProgressBar,
    green: Style,
    red: Style,
    yellow: Style,
}

impl SweepProgress {
    /// Inicia o spinner para a varredura do usuário informado.
    pub fn start(user_id: &str) -> Self {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .expect("invalid template"),
        );
        pb.set_message(format!("Processing reminders for {user_id}"));
        pb.enable_steady_tick(std::time::Duration::from_millis(100));

        Self {
            pb,
            green: Style::new().green().bold(),
            red: Style::new().red().bold(),
            yellow: Style::new().yellow().bold(),
        }
    }

    /// Finaliza o spinner e exibe os contadores da varredura.
    pub fn complete(&self, summary: &ProcessSummary) {
        self.pb.finish_and_clear();
        let mark = if summary.errors == 0 {
            self.green.apply_to("✓")
        } else {
            self.yellow.apply_to("!")
        };
        println!(
            "  {mark} {} processed, {} sent, {} errors",
            summary.processed, summary.sent, summary.errors
        );
    }

    /// Finaliza o spinner quando a varredura inteira falha.
    pub fn fail(&self, reason: &str) {
        self.pb.finish_and_clear();
        println!("  {} Sweep failed: {reason}", self.red.apply_to("✗"));
    }
}

/// Imprime uma linha por fatura aberta com o próximo lembrete previsto.
pub fn print_schedules(schedules: &[InvoiceSchedule]) {
    let bold = Style::new().bold();
    let dim = Style::new().dim();
    let due = Style::new().green().bold();

    if schedules.is_empty() {
        println!("{}", dim.apply_to("No open invoices."));
        return;
    }

    println!(
        "{}",
        bold.apply_to(format!(
            "{:<14} {:<9} {:<11} {:>5}  {}",
            "INVOICE", "STATUS", "DUE", "SENT", "NEXT"
        ))
    );
    for s in schedules {
        let next = match &s.schedule {
            Some(sched) => format!("{} {}", sched.next_reminder_date, sched.next_reminder_level),
            None => "none".to_string(),
        };
        let marker = if s.due_now {
            due.apply_to("● due now").to_string()
        } else {
            String::new()
        };
        println!(
            "{:<14} {:<9} {:<11} {:>5}  {next} {marker}",
            s.invoice.invoice_number,
            s.invoice.status.to_string(),
            s.invoice.due_date.to_string(),
            s.invoice.reminders_sent,
        );
    }
}

/// Confirma um envio manual.
pub fn print_sent(entry: &ReminderHistory) {
    println!(
        "  {} {} reminder sent to {}",
        Style::new().green().bold().apply_to("✓"),
        entry.level,
        entry.to
    );
}

/// Confirma que a fatura foi marcada como paga.
pub fn print_paid(invoice: &Invoice) {
    println!(
        "  {} Invoice {} marked paid",
        Style::new().green().bold().apply_to("✓"),
        invoice.invoice_number
    );
}

/// Imprime o histórico em JSON com um cabeçalho colorido.
pub fn print_history(entries: &[ReminderHistory]) {
    println!("{}", Style::new().cyan().apply_to("─── Reminder History ───"));
    println!(
        "{}",
        serde_json::to_string_pretty(entries).unwrap_or_default()
    );
}

/// Confirma uma operação de cadastro ("Client created", "Invoice removed"...).
pub fn print_done(what: &str, id: &str) {
    println!(
        "  {} {what} {}",
        Style::new().green().bold().apply_to("✓"),
        Style::new().dim().apply_to(id)
    );
}

pub fn print_clients(clients: &[Client]) {
    let bold = Style::new().bold();
    if clients.is_empty() {
        println!("{}", Style::new().dim().apply_to("No clients."));
        return;
    }

    println!(
        "{}",
        bold.apply_to(format!(
            "{:<36} {:<20} {:<28} {:<11} {}",
            "ID", "NAME", "EMAIL", "CATEGORY", "REMINDERS"
        ))
    );
    for c in clients {
        let prefs = c.preferences();
        println!(
            "{:<36} {:<20} {:<28} {:<11} {} max, every {}d, {}",
            c.id,
            c.name,
            c.email,
            c.category.to_string(),
            prefs.max_reminders,
            prefs.reminder_interval,
            prefs.template_style,
        );
    }
}

pub fn print_invoices(invoices: &[Invoice]) {
    let bold = Style::new().bold();
    if invoices.is_empty() {
        println!("{}", Style::new().dim().apply_to("No invoices match."));
        return;
    }

    println!(
        "{}",
        bold.apply_to(format!(
            "{:<36} {:<14} {:<10} {:>12} {:<11} {:>5}",
            "ID", "NUMBER", "STATUS", "AMOUNT", "DUE", "SENT"
        ))
    );
    for i in invoices {
        println!(
            "{:<36} {:<14} {:<10} {:>12} {:<11} {:>5}",
            i.id,
            i.invoice_number,
            i.status.to_string(),
            format!("{:.2} {}", i.amount, i.currency),
            i.due_date.to_string(),
            i.reminders_sent,
        );
    }
}

/// Lista templates marcando os do sistema em cinza.
pub fn print_templates(templates: &[ReminderTemplate]) {
    let bold = Style::new().bold();
    let dim = Style::new().dim();
    if templates.is_empty() {
        println!("{}", dim.apply_to("No templates."));
        return;
    }

    println!(
        "{}",
        bold.apply_to(format!(
            "{:<36} {:<10} {:<9} {:<7} {}",
            "ID", "LEVEL", "STYLE", "OWNER", "NAME"
        ))
    );
    for t in templates {
        let line = format!(
            "{:<36} {:<10} {:<9} {:<7} {}",
            t.id,
            t.level.to_string(),
            t.style.to_string(),
            if t.owner == TemplateOwner::System { "system" } else { "user" },
            t.name,
        );
        if t.owner == TemplateOwner::System {
            println!("{}", dim.apply_to(line));
        } else {
            println!("{line}");
        }
    }
}
