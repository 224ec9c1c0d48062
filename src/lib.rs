//! Invoice Nudger: decides when unpaid invoices get a reminder, at what
//! tone, and delivers it through Resend.
//!
//! The policy in [`policy`] is pure date arithmetic. [`service`] combines it
//! with a [`store`] and an [`resend::EmailSender`]; [`server`] exposes the
//! service over HTTP for cron triggers and manual sends.

pub mod config;
pub mod error;
pub mod model;
pub mod observability;
pub mod policy;
pub mod resend;
pub mod server;
pub mod service;
pub mod store;
pub mod template;
