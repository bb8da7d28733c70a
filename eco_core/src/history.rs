//! Log history loading across the journal and the CSV archive.
//!
//! Readers merge both sources so rollups never change what the ledger or
//! the stats view can see. Entries are deduplicated by id and sorted
//! newest first.

use crate::{DietType, LogEntry, LogSummary, Result, TravelMode};
use chrono::{DateTime, NaiveDate, Utc};
use csv::ReaderBuilder;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use uuid::Uuid;

/// Most log summaries a stats view will ever return
pub const RECENT_LOG_CAP: usize = 30;

/// CSV row format for reading archived entries
#[derive(Debug, Deserialize)]
struct CsvRow {
    id: String,
    user_id: String,
    date: String,
    travel_km: f64,
    travel_mode: String,
    electricity_kwh: f64,
    diet: String,
    water_liters: f64,
    footprint_kg: f64,
    logged_at: String,
}

impl TryFrom<CsvRow> for LogEntry {
    type Error = crate::Error;

    fn try_from(row: CsvRow) -> Result<Self> {
        let id = Uuid::parse_str(&row.id)
            .map_err(|e| crate::Error::Other(format!("Invalid UUID: {}", e)))?;
        let user_id = Uuid::parse_str(&row.user_id)
            .map_err(|e| crate::Error::Other(format!("Invalid UUID: {}", e)))?;

        let date = row
            .date
            .parse::<NaiveDate>()
            .map_err(|e| crate::Error::Other(format!("Invalid date: {}", e)))?;

        let logged_at = DateTime::parse_from_rfc3339(&row.logged_at)
            .map_err(|e| crate::Error::Other(format!("Invalid timestamp: {}", e)))?
            .with_timezone(&Utc);

        Ok(LogEntry {
            id,
            user_id,
            date,
            travel_km: row.travel_km,
            travel_mode: TravelMode::from_input(&row.travel_mode),
            electricity_kwh: row.electricity_kwh,
            diet: DietType::from_input(&row.diet),
            water_liters: row.water_liters,
            footprint_kg: row.footprint_kg,
            logged_at,
        })
    }
}

/// Load every entry belonging to a user from journal and archive
///
/// Returns entries sorted by date (newest first). Entries appearing in
/// both files are deduplicated by id.
pub fn load_user_entries(
    journal_path: &Path,
    csv_path: &Path,
    user_id: Uuid,
) -> Result<Vec<LogEntry>> {
    let mut entries = Vec::new();
    let mut seen_ids = HashSet::new();

    // Journal first (most recent)
    if journal_path.exists() {
        for entry in crate::journal::read_entries(journal_path)? {
            if entry.user_id == user_id {
                seen_ids.insert(entry.id);
                entries.push(entry);
            }
        }
        tracing::debug!("Loaded {} entries from journal", entries.len());
    }

    // Archived entries
    if csv_path.exists() {
        let mut csv_count = 0;
        for entry in load_entries_from_csv(csv_path)? {
            if entry.user_id == user_id && !seen_ids.contains(&entry.id) {
                seen_ids.insert(entry.id);
                entries.push(entry);
                csv_count += 1;
            }
        }
        tracing::debug!("Loaded {} entries from archive", csv_count);
    }

    // Newest date first; same-date entries tie-break on write time
    entries.sort_by(|a, b| b.date.cmp(&a.date).then(b.logged_at.cmp(&a.logged_at)));

    Ok(entries)
}

/// The most recent log summaries for a user, capped at `limit`
pub fn recent_for_user(
    journal_path: &Path,
    csv_path: &Path,
    user_id: Uuid,
    limit: usize,
) -> Result<Vec<LogSummary>> {
    let entries = load_user_entries(journal_path, csv_path, user_id)?;
    Ok(entries.iter().take(limit).map(LogSummary::from).collect())
}

/// Whether a user already has an entry for the given date
///
/// This is the duplicate-day guard: it checks for an existing row rather
/// than comparing against the user's last log date, so out-of-order
/// backfills are detected correctly.
pub fn has_entry_for_date(
    journal_path: &Path,
    csv_path: &Path,
    user_id: Uuid,
    date: NaiveDate,
) -> Result<bool> {
    let entries = load_user_entries(journal_path, csv_path, user_id)?;
    Ok(entries.iter().any(|e| e.date == date))
}

/// Load all entries from a CSV archive file
fn load_entries_from_csv(path: &Path) -> Result<Vec<LogEntry>> {
    let mut reader = ReaderBuilder::new().has_headers(true).from_path(path)?;

    let mut entries = Vec::new();
    for result in reader.deserialize::<CsvRow>() {
        match result {
            Ok(row) => match LogEntry::try_from(row) {
                Ok(entry) => entries.push(entry),
                Err(e) => {
                    tracing::warn!("Failed to parse archived row: {}", e);
                }
            },
            Err(e) => {
                tracing::warn!("Failed to deserialize archived row: {}", e);
            }
        }
    }

    Ok(entries)
}
