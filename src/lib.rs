//! novelmind - web fiction catalog and similarity recommender.
//!
//! Resolves free-text titles against the upstream catalog site, extracts
//! entry pages into typed records, stores them in SQLite and ranks stored
//! entries by weighted similarity.

pub mod cli;
pub mod config;
pub mod models;
pub mod repository;
pub mod scrapers;
pub mod server;
pub mod services;
