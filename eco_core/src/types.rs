//! Core domain types for the eco tracker.
//!
//! This module defines the fundamental types used throughout the system:
//! - Activity records (one day of self-reported activity)
//! - Users and their gamification state (points, streak)
//! - Persisted log entries and reporting views

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

// ============================================================================
// Activity Input Types
// ============================================================================

/// Mode of travel for the day's reported trips
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TravelMode {
    #[default]
    Car,
    Bus,
    Bike,
    Walk,
}

impl TravelMode {
    /// Parse a user-supplied mode string, case-insensitively.
    ///
    /// Unrecognized modes read as `Car`, which carries the highest
    /// per-kilometre coefficient.
    pub fn from_input(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "car" => TravelMode::Car,
            "bus" => TravelMode::Bus,
            "bike" => TravelMode::Bike,
            "walk" => TravelMode::Walk,
            other => {
                tracing::debug!("Unknown travel mode {:?}, treating as car", other);
                TravelMode::Car
            }
        }
    }
}

/// Diet type for the day's main meal
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum DietType {
    #[default]
    Veg,
    NonVeg,
}

impl DietType {
    /// Parse a user-supplied diet string, case-insensitively.
    ///
    /// Only `veg` reads as vegetarian; everything else is non-veg.
    pub fn from_input(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "veg" => DietType::Veg,
            _ => DietType::NonVeg,
        }
    }
}

/// One day of self-reported activity, as submitted by the user
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ActivityRecord {
    #[serde(default)]
    pub travel_km: f64,
    #[serde(default)]
    pub travel_mode: TravelMode,
    #[serde(default)]
    pub electricity_kwh: f64,
    #[serde(default)]
    pub diet: DietType,
    #[serde(default)]
    pub water_liters: f64,
    /// Calendar date the activity belongs to; defaults to today when absent
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

impl Default for ActivityRecord {
    fn default() -> Self {
        Self {
            travel_km: 0.0,
            travel_mode: TravelMode::default(),
            electricity_kwh: 0.0,
            diet: DietType::default(),
            water_liters: 0.0,
            date: None,
        }
    }
}

impl ActivityRecord {
    /// Validate numeric fields before they reach the estimator or ledger.
    ///
    /// Negative or non-finite amounts are rejected; the estimator itself is
    /// total over well-formed records.
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("travel_km", self.travel_km),
            ("electricity_kwh", self.electricity_kwh),
            ("water_liters", self.water_liters),
        ] {
            if !value.is_finite() {
                return Err(Error::InvalidInput(format!(
                    "{} must be a finite number",
                    field
                )));
            }
            if value < 0.0 {
                return Err(Error::InvalidInput(format!(
                    "{} must not be negative (got {})",
                    field, value
                )));
            }
        }
        Ok(())
    }

    /// The calendar date this record applies to, defaulting to today (UTC)
    pub fn effective_date(&self) -> NaiveDate {
        self.date.unwrap_or_else(|| Utc::now().date_naive())
    }
}

// ============================================================================
// Persisted Types
// ============================================================================

/// A tracked user with gamification state
///
/// Invariants: at most one user per distinct name; `points` never decreases;
/// `streak` counts consecutive calendar days with an accepted log.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub points: i64,
    pub streak: u32,
    pub last_log_date: Option<NaiveDate>,
}

impl User {
    /// Create a fresh user with zero points and no streak
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            points: 0,
            streak: 0,
            last_log_date: None,
        }
    }
}

/// One accepted daily submission, immutable once written
///
/// At most one entry exists per `(user, date)` pair; the ledger enforces
/// this, not the storage layer.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct LogEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub date: NaiveDate,
    pub travel_km: f64,
    pub travel_mode: TravelMode,
    pub electricity_kwh: f64,
    pub diet: DietType,
    pub water_liters: f64,
    pub footprint_kg: f64,
    pub logged_at: DateTime<Utc>,
}

impl LogEntry {
    /// Build an entry from an accepted submission
    pub fn from_record(
        user_id: Uuid,
        date: NaiveDate,
        record: &ActivityRecord,
        footprint_kg: f64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            date,
            travel_km: record.travel_km,
            travel_mode: record.travel_mode,
            electricity_kwh: record.electricity_kwh,
            diet: record.diet,
            water_liters: record.water_liters,
            footprint_kg,
            logged_at: Utc::now(),
        }
    }
}

// ============================================================================
// Reporting Types
// ============================================================================

/// Date and footprint of one past log, for stats views
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct LogSummary {
    pub date: NaiveDate,
    pub footprint_kg: f64,
}

impl From<&LogEntry> for LogSummary {
    fn from(entry: &LogEntry) -> Self {
        Self {
            date: entry.date,
            footprint_kg: entry.footprint_kg,
        }
    }
}

/// What a user earned from one accepted submission
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct LedgerReceipt {
    pub points_gain: i64,
    pub streak: u32,
    pub points: i64,
}

/// Outcome of a submission attempt
///
/// `AlreadyLogged` is a normal outcome, not an error; no points or streak
/// change occurred.
#[derive(Clone, Debug, PartialEq)]
pub enum SubmitOutcome {
    Logged(LedgerReceipt),
    AlreadyLogged,
}

/// Aggregated view of a user for the stats operation
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct UserStatsReport {
    pub name: String,
    pub points: i64,
    pub streak: u32,
    pub logs: Vec<LogSummary>,
}
