use crate::model::{ReminderLevel, ReminderTemplate, TemplateOwner, TemplateStyle};

use ReminderLevel::{Assertive, Due, Final, Firm, Gentle, PreDue};

struct Content {
    subject: &'static str,
    body: &'static str,
}

const fn c(subject: &'static str, body: &'static str) -> Content {
    Content { subject, body }
}

fn content(style: TemplateStyle, level: ReminderLevel) -> Content {
    match (style, level) {
        (TemplateStyle::Friendly, PreDue) => c(
            "Friendly Reminder: Invoice #{invoice_number} Due Soon",
            "<p>Hi {client_name},</p>\
             <p>Just a quick heads-up that invoice #{invoice_number} for {invoice_amount} is due on {due_date}.</p>\
             <p>If payment is already on its way, please ignore this note. Thanks for your business!</p>",
        ),
        (TemplateStyle::Friendly, Due) => c(
            "Invoice #{invoice_number} is Due Today",
            "<p>Hi {client_name},</p>\
             <p>A friendly reminder that invoice #{invoice_number} for {invoice_amount} is due today.</p>\
             <p>If you've already paid, thank you! Otherwise I'd appreciate payment when you get a moment.</p>",
        ),
        (TemplateStyle::Friendly, Gentle) => c(
            "Gentle Reminder: Invoice #{invoice_number} is Overdue",
            "<p>Hi {client_name},</p>\
             <p>I wanted to check in about invoice #{invoice_number} for {invoice_amount}, due on {due_date} ({days_overdue} days ago).</p>\
             <p>It may simply have slipped through the cracks. Let me know if anything needs sorting out.</p>",
        ),
        (TemplateStyle::Friendly, Firm) => c(
            "Important: Invoice #{invoice_number} is Now Overdue",
            "<p>Hi {client_name},</p>\
             <p>Following up on invoice #{invoice_number} for {invoice_amount}, now {days_overdue} days past {due_date}.</p>\
             <p>Could you let me know when I can expect payment? Happy to talk through any issues.</p>",
        ),
        (TemplateStyle::Friendly, Assertive) => c(
            "Action Required: Invoice #{invoice_number} Significantly Overdue",
            "<p>Hi {client_name},</p>\
             <p>Invoice #{invoice_number} for {invoice_amount} is now {days_overdue} days past its due date of {due_date}.</p>\
             <p>Please arrange payment as soon as possible, or get in touch right away if something is holding it up.</p>",
        ),
        (TemplateStyle::Friendly, Final) => c(
            "FINAL NOTICE: Payment Required for Invoice #{invoice_number}",
            "<p>Hi {client_name},</p>\
             <p>This is a final notice for invoice #{invoice_number} for {invoice_amount}, {days_overdue} days overdue.</p>\
             <p>Please settle the balance within 7 days so we can avoid any further steps.</p>",
        ),
        (TemplateStyle::Neutral, PreDue) => c(
            "Reminder: Invoice #{invoice_number} Due Soon",
            "<p>Dear {client_name},</p>\
             <p>Invoice #{invoice_number} for {invoice_amount} is due on {due_date}.</p>\
             <p>Please disregard this message if payment has been arranged.</p>",
        ),
        (TemplateStyle::Neutral, Due) => c(
            "Invoice #{invoice_number} Due Today",
            "<p>Dear {client_name},</p>\
             <p>Invoice #{invoice_number} for {invoice_amount} is due today, {due_date}.</p>",
        ),
        (TemplateStyle::Neutral, Gentle) => c(
            "Reminder: Invoice #{invoice_number} is Overdue",
            "<p>Dear {client_name},</p>\
             <p>Invoice #{invoice_number} for {invoice_amount} was due on {due_date} and is {days_overdue} days overdue.</p>\
             <p>Please process payment at your earliest convenience.</p>",
        ),
        (TemplateStyle::Neutral, Firm) => c(
            "Notice: Invoice #{invoice_number} Payment Overdue",
            "<p>Dear {client_name},</p>\
             <p>Payment for invoice #{invoice_number} ({invoice_amount}) remains outstanding, {days_overdue} days after {due_date}.</p>\
             <p>Please send payment or an expected payment date.</p>",
        ),
        (TemplateStyle::Neutral, Assertive) => c(
            "Urgent: Invoice #{invoice_number} Significantly Overdue",
            "<p>Dear {client_name},</p>\
             <p>Invoice #{invoice_number} for {invoice_amount} is {days_overdue} days overdue. Immediate payment is requested.</p>",
        ),
        (TemplateStyle::Neutral, Final) => c(
            "FINAL NOTICE: Invoice #{invoice_number}",
            "<p>Dear {client_name},</p>\
             <p>This is the final notice for invoice #{invoice_number} for {invoice_amount}, due {due_date}.</p>\
             <p>Payment is required within 7 days.</p>",
        ),
        (TemplateStyle::Firm, PreDue) => c(
            "Payment Due Notice: Invoice #{invoice_number}",
            "<p>{client_name},</p>\
             <p>Invoice #{invoice_number} for {invoice_amount} is due on {due_date}. Please ensure payment is made on time.</p>",
        ),
        (TemplateStyle::Firm, Due) => c(
            "Payment Due Today: Invoice #{invoice_number}",
            "<p>{client_name},</p>\
             <p>Payment of {invoice_amount} for invoice #{invoice_number} is due today.</p>",
        ),
        (TemplateStyle::Firm, Gentle) => c(
            "Overdue Payment Notice: Invoice #{invoice_number}",
            "<p>{client_name},</p>\
             <p>Invoice #{invoice_number} for {invoice_amount} is {days_overdue} days overdue. Please pay promptly.</p>",
        ),
        (TemplateStyle::Firm, Firm) => c(
            "OVERDUE: Invoice #{invoice_number} Requires Immediate Attention",
            "<p>{client_name},</p>\
             <p>Invoice #{invoice_number} for {invoice_amount} remains unpaid {days_overdue} days after {due_date}.</p>\
             <p>Payment is required immediately.</p>",
        ),
        (TemplateStyle::Firm, Assertive) => c(
            "URGENT: Seriously Overdue Invoice #{invoice_number}",
            "<p>{client_name},</p>\
             <p>Invoice #{invoice_number} for {invoice_amount} is seriously overdue. Pay now to avoid further action.</p>",
        ),
        (TemplateStyle::Firm, Final) => c(
            "FINAL NOTICE BEFORE ACTION: Invoice #{invoice_number}",
            "<p>{client_name},</p>\
             <p>Final notice: invoice #{invoice_number} for {invoice_amount} is {days_overdue} days overdue.</p>\
             <p>Without payment within 7 days this matter will be escalated.</p>",
        ),
        (TemplateStyle::Formal, PreDue) => c(
            "Upcoming Payment Notice: Invoice #{invoice_number}",
            "<p>Dear {client_name},</p>\
             <p>Please be advised that invoice #{invoice_number}, issued {invoice_date} for {invoice_amount}, falls due on {due_date}.</p>\
             <p>Yours sincerely,</p>",
        ),
        (TemplateStyle::Formal, Due) => c(
            "Payment Due Notice: Invoice #{invoice_number}",
            "<p>Dear {client_name},</p>\
             <p>Please be advised that payment of {invoice_amount} for invoice #{invoice_number} is due today.</p>\
             <p>Yours sincerely,</p>",
        ),
        (TemplateStyle::Formal, Gentle) => c(
            "Payment Overdue Notice: Invoice #{invoice_number}",
            "<p>Dear {client_name},</p>\
             <p>Our records indicate that invoice #{invoice_number} for {invoice_amount}, due {due_date}, remains unpaid.</p>\
             <p>Yours sincerely,</p>",
        ),
        (TemplateStyle::Formal, Firm) => c(
            "Formal Notice of Overdue Payment: Invoice #{invoice_number}",
            "<p>Dear {client_name},</p>\
             <p>Invoice #{invoice_number} for {invoice_amount} is now {days_overdue} days overdue. We request settlement without delay.</p>\
             <p>Yours sincerely,</p>",
        ),
        (TemplateStyle::Formal, Assertive) => c(
            "Formal Demand for Payment: Invoice #{invoice_number}",
            "<p>Dear {client_name},</p>\
             <p>We formally demand payment of {invoice_amount} for invoice #{invoice_number}, {days_overdue} days past due.</p>\
             <p>Yours faithfully,</p>",
        ),
        (TemplateStyle::Formal, Final) => c(
            "Final Demand for Payment: Invoice #{invoice_number}",
            "<p>Dear {client_name},</p>\
             <p>This constitutes final demand for payment of {invoice_amount} under invoice #{invoice_number}.</p>\
             <p>Absent payment within 7 days, further action will be taken without notice.</p>\
             <p>Yours faithfully,</p>",
        ),
    }
}

/// The built-in system templates, one for every style and level.
pub fn default_templates() -> Vec<ReminderTemplate> {
    let mut templates = Vec::with_capacity(TemplateStyle::ALL.len() * ReminderLevel::ALL.len());
    for style in TemplateStyle::ALL {
        for level in ReminderLevel::ALL {
            let Content { subject, body } = content(style, level);
            let mut template = ReminderTemplate::new(
                TemplateOwner::System,
                format!("Default {style} {level} template"),
                level,
                style,
                subject,
                body,
            );
            template.is_default = true;
            templates.push(template);
        }
    }
    templates
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn one_template_per_style_and_level() {
        let templates = default_templates();
        assert_eq!(templates.len(), 24);
        let pairs: HashSet<_> = templates.iter().map(|t| (t.style, t.level)).collect();
        assert_eq!(pairs.len(), 24);
        assert!(templates.iter().all(|t| t.is_default && t.owner == TemplateOwner::System));
    }

    #[test]
    fn names_follow_style_and_level() {
        let templates = default_templates();
        assert_eq!(templates[0].name, "Default friendly pre-due template");
        assert_eq!(templates[23].name, "Default formal final template");
    }

    #[test]
    fn every_template_mentions_the_invoice() {
        for t in default_templates() {
            assert!(t.subject.contains("{invoice_number}"), "{}", t.name);
            assert!(t.body.contains("{client_name}"), "{}", t.name);
        }
    }
}
