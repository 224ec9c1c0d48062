//! Interface de linha de comando do Invoice Nudger baseada em clap.
//!
//! Define a struct [`Cli`] com subcomandos [`Command`] (serve, process,
//! status, send, history, seed-templates, mark-paid) e flags globais
//! (--config, --verbose). Os grupos `client`, `invoice` e `template`
//! cadastram, listam, alteram e removem registros.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use invoice_nudger::model::{ClientCategory, InvoiceStatus, ReminderLevel, ReminderPreferences, TemplateStyle};

/// Invoice Nudger: lembretes automáticos de faturas em atraso.
#[derive(Debug, Parser)]
#[command(name = "nudger", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Caminho do arquivo de configuração (padrão: ./nudger.toml).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Habilita saída detalhada (verbose).
    #[arg(long, short, global = true, default_value_t = false)]
    pub verbose: bool,
}

/// Nível de lembrete aceito pela CLI, mapeado para [`ReminderLevel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LevelArg {
    /// Aviso antes do vencimento.
    PreDue,
    /// No dia do vencimento.
    Due,
    Gentle,
    Firm,
    Assertive,
    /// Último aviso.
    Final,
}

impl From<LevelArg> for ReminderLevel {
    fn from(arg: LevelArg) -> Self {
        match arg {
            LevelArg::PreDue => ReminderLevel::PreDue,
            LevelArg::Due => ReminderLevel::Due,
            LevelArg::Gentle => ReminderLevel::Gentle,
            LevelArg::Firm => ReminderLevel::Firm,
            LevelArg::Assertive => ReminderLevel::Assertive,
            LevelArg::Final => ReminderLevel::Final,
        }
    }
}

/// Estilo de template aceito pela CLI, mapeado para [`TemplateStyle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StyleArg {
    Friendly,
    Neutral,
    Firm,
    Formal,
}

impl From<StyleArg> for TemplateStyle {
    fn from(arg: StyleArg) -> Self {
        match arg {
            StyleArg::Friendly => TemplateStyle::Friendly,
            StyleArg::Neutral => TemplateStyle::Neutral,
            StyleArg::Firm => TemplateStyle::Firm,
            StyleArg::Formal => TemplateStyle::Formal,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CategoryArg {
    Standard,
    Vip,
    /// Cliente com histórico de atrasos.
    Problematic,
}

impl From<CategoryArg> for ClientCategory {
    fn from(arg: CategoryArg) -> Self {
        match arg {
            CategoryArg::Standard => ClientCategory::Standard,
            CategoryArg::Vip => ClientCategory::Vip,
            CategoryArg::Problematic => ClientCategory::Problematic,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StatusArg {
    Draft,
    Sent,
    Pending,
    Overdue,
    Paid,
    Cancelled,
}

impl From<StatusArg> for InvoiceStatus {
    fn from(arg: StatusArg) -> Self {
        match arg {
            StatusArg::Draft => InvoiceStatus::Draft,
            StatusArg::Sent => InvoiceStatus::Sent,
            StatusArg::Pending => InvoiceStatus::Pending,
            StatusArg::Overdue => InvoiceStatus::Overdue,
            StatusArg::Paid => InvoiceStatus::Paid,
            StatusArg::Cancelled => InvoiceStatus::Cancelled,
        }
    }
}

/// Preferências de lembrete informadas na linha de comando.
///
/// Campos ausentes mantêm o valor de `base` em [`PreferenceArgs::apply`].
#[derive(Debug, Clone, Default, Args)]
pub struct PreferenceArgs {
    /// Envia um aviso antes do vencimento.
    #[arg(long)]
    pub pre_due: Option<bool>,

    #[arg(long)]
    pub pre_due_days: Option<u32>,

    /// Dias após o vencimento até o primeiro lembrete.
    #[arg(long)]
    pub first_reminder_days: Option<u32>,

    /// Dias entre lembretes consecutivos.
    #[arg(long)]
    pub interval: Option<u32>,

    /// Número máximo de lembretes (0 desliga os lembretes).
    #[arg(long)]
    pub max_reminders: Option<u32>,

    #[arg(long, value_enum)]
    pub style: Option<StyleArg>,
}

impl PreferenceArgs {
    pub fn is_empty(&self) -> bool {
        self.pre_due.is_none()
            && self.pre_due_days.is_none()
            && self.first_reminder_days.is_none()
            && self.interval.is_none()
            && self.max_reminders.is_none()
            && self.style.is_none()
    }

    pub fn apply(&self, base: ReminderPreferences) -> ReminderPreferences {
        ReminderPreferences {
            send_pre_due_reminder: self.pre_due.unwrap_or(base.send_pre_due_reminder),
            pre_due_days: self.pre_due_days.unwrap_or(base.pre_due_days),
            first_reminder_days: self.first_reminder_days.unwrap_or(base.first_reminder_days),
            reminder_interval: self.interval.unwrap_or(base.reminder_interval),
            max_reminders: self.max_reminders.unwrap_or(base.max_reminders),
            template_style: self.style.map(Into::into).unwrap_or(base.template_style),
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sobe o servidor HTTP (cron, envio manual, histórico, seed).
    Serve,

    /// Executa uma varredura de lembretes para um usuário.
    Process {
        #[arg(long)]
        user_id: String,

        /// Data usada como "hoje" (AAAA-MM-DD). Padrão: data atual em UTC.
        #[arg(long)]
        today: Option<NaiveDate>,
    },

    /// Lista as faturas abertas e o próximo lembrete de cada uma.
    Status {
        #[arg(long)]
        user_id: String,

        #[arg(long)]
        today: Option<NaiveDate>,
    },

    /// Envia manualmente um lembrete num nível específico.
    Send {
        #[arg(long)]
        invoice_id: String,

        #[arg(long)]
        user_id: String,

        #[arg(long, value_enum)]
        level: LevelArg,

        /// Template explícito; sem ele, usa o estilo preferido do cliente.
        #[arg(long)]
        template_id: Option<String>,
    },

    /// Mostra o histórico de lembretes de uma fatura em JSON.
    History {
        #[arg(long)]
        invoice_id: String,

        #[arg(long)]
        user_id: String,
    },

    /// Cria os templates padrão do sistema que ainda não existem.
    SeedTemplates,

    /// Marca uma fatura como paga, encerrando os lembretes.
    MarkPaid {
        #[arg(long)]
        invoice_id: String,
    },

    /// Cadastro de clientes.
    Client {
        #[command(subcommand)]
        action: ClientCommand,
    },

    /// Cadastro de faturas.
    Invoice {
        #[command(subcommand)]
        action: InvoiceCommand,
    },

    /// Templates de lembrete do usuário.
    Template {
        #[command(subcommand)]
        action: TemplateCommand,
    },
}

#[derive(Debug, Subcommand)]
pub enum ClientCommand {
    /// Cadastra um cliente.
    Add {
        #[arg(long)]
        user_id: String,

        #[arg(long)]
        name: String,

        #[arg(long)]
        email: String,

        #[arg(long)]
        company: Option<String>,

        #[arg(long)]
        phone: Option<String>,

        #[arg(long, value_enum)]
        category: Option<CategoryArg>,

        #[command(flatten)]
        prefs: PreferenceArgs,
    },

    /// Lista os clientes em ordem alfabética.
    List {
        #[arg(long)]
        user_id: String,

        #[arg(long, value_enum)]
        category: Option<CategoryArg>,
    },

    /// Altera os campos informados de um cliente.
    Update {
        #[arg(long)]
        client_id: String,

        #[arg(long)]
        user_id: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        email: Option<String>,

        #[arg(long)]
        company: Option<String>,

        #[arg(long)]
        phone: Option<String>,

        #[arg(long, value_enum)]
        category: Option<CategoryArg>,

        #[command(flatten)]
        prefs: PreferenceArgs,
    },

    /// Remove um cliente sem faturas.
    Remove {
        #[arg(long)]
        client_id: String,

        #[arg(long)]
        user_id: String,
    },
}

#[derive(Debug, Subcommand)]
pub enum InvoiceCommand {
    /// Cadastra uma fatura (status padrão: draft).
    Add {
        #[arg(long)]
        user_id: String,

        #[arg(long)]
        client_id: String,

        #[arg(long)]
        number: String,

        #[arg(long)]
        amount: f64,

        #[arg(long)]
        currency: Option<String>,

        /// Data de emissão (AAAA-MM-DD). Padrão: hoje.
        #[arg(long)]
        issued: Option<NaiveDate>,

        #[arg(long)]
        due: NaiveDate,

        #[arg(long, value_enum)]
        status: Option<StatusArg>,

        #[arg(long, default_value = "")]
        description: String,
    },

    /// Lista faturas, das mais novas para as mais antigas.
    List {
        #[arg(long)]
        user_id: String,

        /// Pode ser repetido; sem ele, todos os status.
        #[arg(long, value_enum)]
        status: Vec<StatusArg>,

        #[arg(long)]
        client_id: Option<String>,

        /// Emitidas a partir desta data.
        #[arg(long)]
        from: Option<NaiveDate>,

        /// Emitidas até esta data.
        #[arg(long)]
        to: Option<NaiveDate>,

        #[arg(long)]
        min_amount: Option<f64>,

        #[arg(long)]
        max_amount: Option<f64>,
    },

    /// Altera os campos informados de uma fatura.
    Update {
        #[arg(long)]
        invoice_id: String,

        #[arg(long)]
        user_id: String,

        #[arg(long)]
        number: Option<String>,

        #[arg(long)]
        amount: Option<f64>,

        #[arg(long)]
        due: Option<NaiveDate>,

        #[arg(long, value_enum)]
        status: Option<StatusArg>,

        #[arg(long)]
        description: Option<String>,
    },

    /// Remove uma fatura; o histórico de lembretes é mantido.
    Remove {
        #[arg(long)]
        invoice_id: String,

        #[arg(long)]
        user_id: String,
    },
}

#[derive(Debug, Subcommand)]
pub enum TemplateCommand {
    /// Cria um template próprio do usuário.
    Add {
        #[arg(long)]
        user_id: String,

        #[arg(long)]
        name: String,

        #[arg(long, value_enum)]
        level: LevelArg,

        #[arg(long, value_enum)]
        style: StyleArg,

        #[arg(long)]
        subject: String,

        /// Corpo HTML; aceita os mesmos `{placeholders}` do assunto.
        #[arg(long)]
        body: String,
    },

    /// Lista os templates visíveis ao usuário, os próprios primeiro.
    List {
        #[arg(long)]
        user_id: String,

        #[arg(long, value_enum)]
        level: Option<LevelArg>,

        #[arg(long, value_enum)]
        style: Option<StyleArg>,
    },

    /// Altera um template do usuário (templates do sistema são só leitura).
    Update {
        #[arg(long)]
        template_id: String,

        #[arg(long)]
        user_id: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long, value_enum)]
        level: Option<LevelArg>,

        #[arg(long, value_enum)]
        style: Option<StyleArg>,

        #[arg(long)]
        subject: Option<String>,

        #[arg(long)]
        body: Option<String>,
    },

    Remove {
        #[arg(long)]
        template_id: String,

        #[arg(long)]
        user_id: String,
    },
}
