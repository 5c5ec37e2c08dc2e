//! API endpoint handlers, one module per feature.

pub mod chat;
pub mod health;
pub mod metrics;
pub mod reminders;
pub mod symptoms;
