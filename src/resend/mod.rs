pub mod client;
pub mod error;
pub mod types;

pub use client::{EmailSender, ResendClient};
pub use error::ResendError;
pub use types::{EmailOptions, SendEmailResponse};
