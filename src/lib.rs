//! Personal expense tracking API: username/password accounts, bearer-token
//! sessions, per-user expense records with shared categories, and a summed
//! report per category.

pub mod app;
pub mod auth;
pub mod categories;
pub mod config;
pub mod error;
pub mod expenses;
pub mod ownership;
pub mod reports;
pub mod state;
