//! User roster persistence with file locking.
//!
//! The roster holds every user's gamification state (points, streak, last
//! log date), keyed by name. Saves go through a temp file and an atomic
//! rename; reads take a shared lock.
//!
//! Unlike the journal, a roster that exists but cannot be parsed is a hard
//! error: silently resetting it would erase earned points.

use crate::{Error, Result, User};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// All known users, keyed by their unique name
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct UserRoster {
    pub users: HashMap<String, User>,
}

impl UserRoster {
    /// Load the roster from a file with shared locking
    ///
    /// A missing file is an empty roster; a present-but-unreadable one is a
    /// persistence error.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No roster file at {:?}, starting empty", path);
            return Ok(Self::default());
        }

        let file = File::open(path)?;
        file.lock_shared()?;

        let mut contents = String::new();
        let mut reader = std::io::BufReader::new(&file);
        let read_result = reader.read_to_string(&mut contents);
        file.unlock()?;
        read_result?;

        match serde_json::from_str::<UserRoster>(&contents) {
            Ok(roster) => {
                tracing::debug!("Loaded {} users from {:?}", roster.users.len(), path);
                Ok(roster)
            }
            Err(e) => Err(Error::Persistence(format!(
                "roster file {:?} is unreadable: {}",
                path, e
            ))),
        }
    }

    /// Save the roster to a file with exclusive locking
    ///
    /// Atomically writes by:
    /// 1. Writing to a temp file in the same directory
    /// 2. Syncing to disk
    /// 3. Renaming over the original
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let temp = NamedTempFile::new_in(path.parent().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::Other, "roster path missing parent")
        })?)?;

        // Exclusive lock on the temp file serializes concurrent writers
        temp.as_file().lock_exclusive()?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            let contents = serde_json::to_string(self)?;
            writer.write_all(contents.as_bytes())?;
            writer.flush()?;
        }

        temp.as_file().sync_all()?;
        temp.as_file().unlock()?;

        temp.persist(path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!("Saved {} users to {:?}", self.users.len(), path);
        Ok(())
    }

    /// Look up a user by name
    pub fn find(&self, name: &str) -> Option<&User> {
        self.users.get(name)
    }

    /// Insert a new user; the name must not be taken
    pub fn insert(&mut self, user: User) -> Result<()> {
        if self.users.contains_key(&user.name) {
            return Err(Error::Persistence(format!(
                "user {:?} already exists",
                user.name
            )));
        }
        self.users.insert(user.name.clone(), user);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_save_and_load_roundtrip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let roster_path = temp_dir.path().join("users.json");

        let mut roster = UserRoster::default();
        let mut user = User::new("asha");
        user.points = 97;
        user.streak = 1;
        user.last_log_date = NaiveDate::from_ymd_opt(2025, 6, 1);
        roster.insert(user).unwrap();

        roster.save(&roster_path).unwrap();

        let loaded = UserRoster::load(&roster_path).unwrap();
        assert_eq!(loaded.users.len(), 1);
        let asha = loaded.find("asha").unwrap();
        assert_eq!(asha.points, 97);
        assert_eq!(asha.streak, 1);
        assert_eq!(asha.last_log_date, NaiveDate::from_ymd_opt(2025, 6, 1));
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let temp_dir = tempfile::tempdir().unwrap();
        let roster_path = temp_dir.path().join("nonexistent.json");

        let roster = UserRoster::load(&roster_path).unwrap();
        assert!(roster.users.is_empty());
    }

    #[test]
    fn test_corrupted_roster_is_an_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        let roster_path = temp_dir.path().join("users.json");

        std::fs::write(&roster_path, "{ invalid json }").unwrap();

        let result = UserRoster::load(&roster_path);
        assert!(matches!(result, Err(Error::Persistence(_))));
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let mut roster = UserRoster::default();
        roster.insert(User::new("asha")).unwrap();

        let result = roster.insert(User::new("asha"));
        assert!(result.is_err());
        assert_eq!(roster.users.len(), 1);
    }

    #[test]
    fn test_atomic_save_leaves_no_temp_files() {
        let temp_dir = tempfile::tempdir().unwrap();
        let roster_path = temp_dir.path().join("users.json");

        UserRoster::default().save(&roster_path).unwrap();

        assert!(roster_path.exists());
        let extras: Vec<_> = std::fs::read_dir(temp_dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name() != "users.json")
            .collect();
        assert!(
            extras.is_empty(),
            "Expected only users.json, found extras: {:?}",
            extras
        );
    }
}
