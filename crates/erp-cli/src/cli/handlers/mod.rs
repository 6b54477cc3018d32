//! Command handlers for the ERP CLI

pub mod auth;
pub mod config;
pub mod request;
