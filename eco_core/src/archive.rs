//! CSV archive for rolled-up journal entries.
//!
//! Long-running trackers accumulate one journal line per day per user; the
//! rollup moves those lines into a CSV archive so the hot journal stays
//! small. Duplicate-day checks and history keep working across the rollup
//! boundary because readers consult both files.

use crate::{DietType, LogEntry, Result, TravelMode};
use std::fs::OpenOptions;
use std::path::Path;

/// A row in the CSV archive
#[derive(Debug, serde::Serialize)]
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

impl From<&LogEntry> for CsvRow {
    fn from(entry: &LogEntry) -> Self {
        CsvRow {
            id: entry.id.to_string(),
            user_id: entry.user_id.to_string(),
            date: entry.date.to_string(),
            travel_km: entry.travel_km,
            travel_mode: match entry.travel_mode {
                TravelMode::Car => "car".into(),
                TravelMode::Bus => "bus".into(),
                TravelMode::Bike => "bike".into(),
                TravelMode::Walk => "walk".into(),
            },
            electricity_kwh: entry.electricity_kwh,
            diet: match entry.diet {
                DietType::Veg => "veg".into(),
                DietType::NonVeg => "non-veg".into(),
            },
            water_liters: entry.water_liters,
            footprint_kg: entry.footprint_kg,
            logged_at: entry.logged_at.to_rfc3339(),
        }
    }
}

/// Roll up journal entries into CSV and archive the journal atomically
///
/// This function:
/// 1. Reads all entries from the journal
/// 2. Appends them to the CSV file (creates with headers if needed)
/// 3. Syncs the CSV to disk
/// 4. Renames the journal to .processed
/// 5. Returns the number of entries processed
///
/// # Safety
/// - CSV is fsynced before the journal is renamed
/// - The journal is renamed (not deleted) to allow manual recovery
pub fn journal_to_csv_and_archive(journal_path: &Path, csv_path: &Path) -> Result<usize> {
    let entries = crate::journal::read_entries(journal_path)?;

    if entries.is_empty() {
        tracing::info!("No entries in journal to roll up");
        return Ok(0);
    }

    if let Some(parent) = csv_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(csv_path)?;

    // Headers only when the file is still empty
    let needs_headers = file.metadata()?.len() == 0;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(needs_headers)
        .from_writer(file);

    for entry in &entries {
        let row = CsvRow::from(entry);
        writer.serialize(row)?;
    }

    writer.flush()?;
    let file = writer
        .into_inner()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
    file.sync_all()?;

    tracing::info!("Wrote {} entries to CSV archive", entries.len());

    let processed_path = journal_path.with_extension("jsonl.processed");
    std::fs::rename(journal_path, &processed_path)?;

    tracing::info!("Archived journal to {:?}", processed_path);

    Ok(entries.len())
}

/// Clean up old processed journal files
///
/// Removes all .jsonl.processed files in the given directory.
pub fn cleanup_processed_journals(dir: &Path) -> Result<usize> {
    if !dir.exists() {
        return Ok(0);
    }

    let mut count = 0;
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();

        if let Some(extension) = path.extension() {
            if extension == "processed" {
                std::fs::remove_file(&path)?;
                tracing::debug!("Removed processed journal: {:?}", path);
                count += 1;
            }
        }
    }

    if count > 0 {
        tracing::info!("Cleaned up {} processed journal files", count);
    }

    Ok(count)
}
