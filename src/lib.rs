//! mealday library
//!
//! Session lifecycle and per-day result caching for a meal-planning client,
//! plus the remote clients and text screens built on top of them. The binary
//! and the integration tests use this crate directly.

pub mod api;
pub mod app;
pub mod cache;
pub mod cli;
pub mod config;
pub mod data;
pub mod session;
pub mod store;
pub mod ui;
