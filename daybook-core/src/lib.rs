//! # daybook-core
//!
//! Core library for daybook - a personal life-events tracker.
//!
//! This library provides:
//! - Domain types for tracked events and their daily values
//! - The analytics engine: streaks, comparisons, pattern discovery,
//!   milestones
//! - A thin SQLite storage layer behind the [`db::ValueStore`] trait
//! - Configuration management and logging infrastructure
//!
//! ## Architecture
//!
//! Raw values are stored one per event per day. Each analytics pass reads
//! a fresh snapshot through [`db::ValueStore`], normalizes it into typed
//! per-day data points, and derives everything else from those; derived
//! results are never persisted.
//!
//! ## Example
//!
//! ```rust,no_run
//! use daybook_core::{AnalyticsEngine, Config, Database};
//!
//! let config = Config::load().expect("failed to load config");
//! let db = Database::open(&Config::database_path()).expect("failed to open database");
//! db.migrate().expect("failed to run migrations");
//!
//! let engine = AnalyticsEngine::new(config.analytics.clone());
//! let today = chrono::Utc::now().date_naive();
//! let snapshot = engine.run_pass(&db, today).expect("analytics pass failed");
//! println!("{} patterns discovered", snapshot.patterns.len());
//! ```

// Re-export commonly used items at the crate root
pub use analytics::{AnalyticsEngine, DashboardSnapshot};
pub use config::Config;
pub use db::{Database, ValueStore};
pub use error::{Error, Result};
pub use types::*;

// Public modules
pub mod analytics;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod types;
