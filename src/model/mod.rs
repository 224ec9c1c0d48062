mod client;
mod invoice;
mod reminder;

pub use client::{Address, Client, ClientCategory, ReminderPreferences};
pub use invoice::{Invoice, InvoiceFilter, InvoiceItem, InvoiceStatus};
pub use reminder::{
    DeliveryStatus, ReminderHistory, ReminderLevel, ReminderSchedule, ReminderTemplate,
    TemplateOwner, TemplateStyle, UnknownLevel,
};
