//! provider-service: picks the delivery providers for authentication
//! challenges (SMS, email, push and voice OTPs) from policies, falling back to
//! the configured default provider of each channel.

pub mod config;
pub mod handlers;
pub mod models;
pub mod services;
pub mod startup;
