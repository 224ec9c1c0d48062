//! Placeholder substitution for reminder subjects and bodies.
//!
//! Templates carry tokens like `{client_name}` or `{days_overdue}`. Rendering
//! is plain find-and-replace over a fixed set of names, done in a single pass
//! so that values containing braces are never substituted a second time.

mod defaults;

use chrono::NaiveDate;

use crate::model::{Client, Invoice};
use crate::policy::days_overdue;

pub use defaults::default_templates;

/// Values for every placeholder a template may use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateVars {
    pub client_name: String,
    pub client_email: String,
    pub invoice_number: String,
    pub invoice_amount: String,
    pub invoice_date: String,
    pub due_date: String,
    pub days_overdue: String,
    pub client_company: String,
}

impl TemplateVars {
    pub fn new(invoice: &Invoice, client: &Client, today: NaiveDate) -> Self {
        Self {
            client_name: client.name.clone(),
            client_email: client.email.clone(),
            invoice_number: invoice.invoice_number.clone(),
            invoice_amount: format!("{:.2} {}", invoice.amount, invoice.currency),
            invoice_date: format_date(invoice.issue_date),
            due_date: format_date(invoice.due_date),
            days_overdue: days_overdue(invoice.due_date, today).to_string(),
            client_company: client.company.clone().unwrap_or_default(),
        }
    }

    fn lookup(&self, token: &str) -> Option<&str> {
        let value = match token {
            "client_name" => &self.client_name,
            "client_email" => &self.client_email,
            "invoice_number" => &self.invoice_number,
            "invoice_amount" => &self.invoice_amount,
            "invoice_date" => &self.invoice_date,
            "due_date" => &self.due_date,
            "days_overdue" => &self.days_overdue,
            "client_company" => &self.client_company,
            _ => return None,
        };
        Some(value)
    }
}

/// Replaces every known `{token}` in `text` with its value.
///
/// Unknown tokens and unmatched braces are copied through unchanged.
pub fn render(text: &str, vars: &TemplateVars) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find(['{', '}']) {
            Some(close) if after.as_bytes()[close] == b'}' => {
                let token = &after[..close];
                match vars.lookup(token) {
                    Some(value) => out.push_str(value),
                    None => {
                        out.push('{');
                        out.push_str(token);
                        out.push('}');
                    }
                }
                rest = &after[close + 1..];
            }
            _ => {
                // No closing brace before the next opening one.
                out.push('{');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}

/// Long US-style date, e.g. `January 10, 2024`.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%B %-d, %Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn fixtures() -> (Invoice, Client) {
        let mut invoice = Invoice::new("u1", "c1", "INV-042", 1234.5, date(2024, 1, 1), date(2024, 1, 10));
        invoice.currency = "EUR".into();
        let mut client = Client::new("u1", "Grace Hopper", "grace@navy.test");
        client.company = Some("Navy".into());
        (invoice, client)
    }

    const ALL_TOKENS: &str = "{client_name}|{client_email}|{invoice_number}|{invoice_amount}|\
                              {invoice_date}|{due_date}|{days_overdue}|{client_company}";

    #[test]
    fn renders_every_placeholder_once() {
        let (invoice, client) = fixtures();
        let vars = TemplateVars::new(&invoice, &client, date(2024, 1, 15));
        let out = render(ALL_TOKENS, &vars);
        assert_eq!(
            out,
            "Grace Hopper|grace@navy.test|INV-042|1234.50 EUR|January 1, 2024|January 10, 2024|5|Navy"
        );
        assert!(!out.contains('{'));
    }

    #[test]
    fn braces_in_values_are_not_rescanned() {
        let (invoice, mut client) = fixtures();
        client.name = "{invoice_number}".into();
        client.company = Some("{{client_name}}".into());
        let vars = TemplateVars::new(&invoice, &client, date(2024, 1, 15));
        assert_eq!(
            render("Hi {client_name} of {client_company}, re #{invoice_number}", &vars),
            "Hi {invoice_number} of {{client_name}}, re #INV-042"
        );
    }

    #[test]
    fn repeated_tokens_are_all_replaced() {
        let (invoice, client) = fixtures();
        let vars = TemplateVars::new(&invoice, &client, date(2024, 1, 15));
        assert_eq!(
            render("#{invoice_number} / #{invoice_number}", &vars),
            "#INV-042 / #INV-042"
        );
    }

    #[test]
    fn unknown_tokens_and_stray_braces_pass_through() {
        let (invoice, client) = fixtures();
        let vars = TemplateVars::new(&invoice, &client, date(2024, 1, 15));
        assert_eq!(render("{unknown} {", &vars), "{unknown} {");
        assert_eq!(render("a { {client_name} }", &vars), "a { Grace Hopper }");
        assert_eq!(render("{{client_name}}", &vars), "{Grace Hopper}");
    }

    #[test]
    fn missing_company_renders_empty() {
        let (invoice, mut client) = fixtures();
        client.company = None;
        let vars = TemplateVars::new(&invoice, &client, date(2024, 1, 15));
        assert_eq!(render("[{client_company}]", &vars), "[]");
    }

    #[test]
    fn days_overdue_is_zero_before_due() {
        let (invoice, client) = fixtures();
        let vars = TemplateVars::new(&invoice, &client, date(2024, 1, 8));
        assert_eq!(vars.days_overdue, "0");
    }

    #[test]
    fn format_date_long_form() {
        assert_eq!(format_date(date(2024, 3, 5)), "March 5, 2024");
    }
}
