#![forbid(unsafe_code)]

//! Core domain model and business logic for the EcoLog tracker.
//!
//! This crate provides:
//! - Domain types (activity records, users, log entries)
//! - The footprint estimator
//! - The engagement ledger (points, streaks, duplicate-day guard)
//! - Persistence (journal, roster, CSV archive) behind a store trait
//! - Eco-tip fallback generation

pub mod types;
pub mod error;
pub mod footprint;
pub mod config;
pub mod logging;
pub mod journal;
pub mod roster;
pub mod archive;
pub mod history;
pub mod store;
pub mod ledger;
pub mod tips;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use config::Config;
pub use footprint::{estimate, points_gain};
pub use journal::{EntrySink, JsonlJournal};
pub use roster::UserRoster;
pub use history::{recent_for_user, RECENT_LOG_CAP};
pub use store::{FileStore, Store};
pub use ledger::{fetch_stats, register, submit};
pub use tips::{fallback_tip, tip_for, FocusArea, TipRequest, TipSource};
