//! Data-access interface for the engagement ledger, and its file-backed
//! implementation.
//!
//! The ledger only ever talks to a [`Store`]; the concrete persistence
//! mechanism stays behind this seam. [`FileStore`] keeps the user roster in
//! a JSON file and log entries in a JSONL journal plus a CSV archive, with
//! fs2 locks for cross-process safety.

use crate::{history, Error, LogEntry, LogSummary, Result, User, UserRoster};
use chrono::NaiveDate;
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use uuid::Uuid;

/// How long a submission may wait on the lock before it is treated as
/// failed; callers must not retry, since the earlier holder may have
/// committed the same date.
const SUBMIT_LOCK_TIMEOUT: Duration = Duration::from_secs(5);

/// Abstract data access required by the ledger
///
/// `lock_submissions` must serialize the whole duplicate-check/insert/update
/// sequence across concurrent submitters: two submissions for the same
/// `(user, date)` may otherwise both pass the duplicate check and double
/// the streak and points.
pub trait Store {
    type Guard;

    /// Acquire the store-wide submission lock; hold the guard for the whole
    /// read-modify-write sequence.
    fn lock_submissions(&self) -> Result<Self::Guard>;

    fn find_user(&self, name: &str) -> Result<Option<User>>;

    /// Insert a new user; fails if the name is taken.
    fn create_user(&self, user: &User) -> Result<()>;

    fn has_log_for_date(&self, user_id: Uuid, date: NaiveDate) -> Result<bool>;

    fn insert_log(&self, entry: &LogEntry) -> Result<()>;

    fn update_user_stats(
        &self,
        user_id: Uuid,
        points: i64,
        streak: u32,
        last_log_date: NaiveDate,
    ) -> Result<()>;

    /// Most recent logs first, at most `limit` of them.
    fn recent_logs(&self, user_id: Uuid, limit: usize) -> Result<Vec<LogSummary>>;
}

/// File-backed store rooted at a data directory
///
/// Layout:
/// - `journal/entries.jsonl` — append-only accepted submissions
/// - `journal/submit.lock` — cross-process submission lock
/// - `users.json` — the user roster
/// - `entries.csv` — archived entries from rollups
#[derive(Clone, Debug)]
pub struct FileStore {
    data_dir: PathBuf,
}

/// Holds the submission lock file; the lock releases on drop
pub struct SubmissionGuard {
    file: File,
}

impl Drop for SubmissionGuard {
    fn drop(&mut self) {
        if let Err(e) = self.file.unlock() {
            tracing::warn!("Failed to release submission lock: {}", e);
        }
    }
}

impl FileStore {
    /// Open a store rooted at `data_dir`, creating the layout if needed
    pub fn open(data_dir: impl Into<PathBuf>) -> Result<Self> {
        let data_dir = data_dir.into();
        std::fs::create_dir_all(data_dir.join("journal"))?;
        Ok(Self { data_dir })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn journal_path(&self) -> PathBuf {
        self.data_dir.join("journal").join("entries.jsonl")
    }

    pub fn journal_dir(&self) -> PathBuf {
        self.data_dir.join("journal")
    }

    pub fn roster_path(&self) -> PathBuf {
        self.data_dir.join("users.json")
    }

    pub fn archive_path(&self) -> PathBuf {
        self.data_dir.join("entries.csv")
    }

    fn lock_path(&self) -> PathBuf {
        self.data_dir.join("journal").join("submit.lock")
    }

    fn load_roster(&self) -> Result<UserRoster> {
        UserRoster::load(&self.roster_path())
    }

    fn user_by_id(&self, roster: &UserRoster, user_id: Uuid) -> Result<User> {
        roster
            .users
            .values()
            .find(|u| u.id == user_id)
            .cloned()
            .ok_or_else(|| Error::Persistence(format!("no user with id {}", user_id)))
    }
}

impl Store for FileStore {
    type Guard = SubmissionGuard;

    fn lock_submissions(&self) -> Result<SubmissionGuard> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .open(self.lock_path())?;

        let deadline = Instant::now() + SUBMIT_LOCK_TIMEOUT;
        loop {
            match file.try_lock_exclusive() {
                Ok(()) => break,
                Err(_) if Instant::now() < deadline => {
                    std::thread::sleep(Duration::from_millis(10));
                }
                Err(e) => {
                    return Err(Error::Persistence(format!(
                        "timed out waiting for submission lock: {}",
                        e
                    )));
                }
            }
        }

        tracing::debug!("Acquired submission lock");
        Ok(SubmissionGuard { file })
    }

    fn find_user(&self, name: &str) -> Result<Option<User>> {
        Ok(self.load_roster()?.find(name).cloned())
    }

    fn create_user(&self, user: &User) -> Result<()> {
        let mut roster = self.load_roster()?;
        roster.insert(user.clone())?;
        roster.save(&self.roster_path())?;
        tracing::info!("Created user {:?}", user.name);
        Ok(())
    }

    fn has_log_for_date(&self, user_id: Uuid, date: NaiveDate) -> Result<bool> {
        history::has_entry_for_date(&self.journal_path(), &self.archive_path(), user_id, date)
    }

    fn insert_log(&self, entry: &LogEntry) -> Result<()> {
        use crate::journal::{EntrySink, JsonlJournal};
        JsonlJournal::new(self.journal_path()).append(entry)
    }

    fn update_user_stats(
        &self,
        user_id: Uuid,
        points: i64,
        streak: u32,
        last_log_date: NaiveDate,
    ) -> Result<()> {
        let mut roster = self.load_roster()?;
        let mut user = self.user_by_id(&roster, user_id)?;
        user.points = points;
        user.streak = streak;
        user.last_log_date = Some(last_log_date);
        let name = user.name.clone();
        roster.users.insert(name, user);
        roster.save(&self.roster_path())
    }

    fn recent_logs(&self, user_id: Uuid, limit: usize) -> Result<Vec<LogSummary>> {
        history::recent_for_user(
            &self.journal_path(),
            &self.archive_path(),
            user_id,
            limit,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ActivityRecord;

    fn store() -> (tempfile::TempDir, FileStore) {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(temp_dir.path()).unwrap();
        (temp_dir, store)
    }

    #[test]
    fn test_create_and_find_user() {
        let (_dir, store) = store();

        let user = User::new("asha");
        store.create_user(&user).unwrap();

        let found = store.find_user("asha").unwrap().unwrap();
        assert_eq!(found.id, user.id);
        assert_eq!(found.points, 0);

        assert!(store.find_user("nobody").unwrap().is_none());
    }

    #[test]
    fn test_create_duplicate_name_fails() {
        let (_dir, store) = store();

        store.create_user(&User::new("asha")).unwrap();
        assert!(store.create_user(&User::new("asha")).is_err());
    }

    #[test]
    fn test_insert_log_and_duplicate_check() {
        let (_dir, store) = store();

        let user = User::new("asha");
        store.create_user(&user).unwrap();

        let date = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let record = ActivityRecord::default();
        let entry =
            LogEntry::from_record(user.id, date, &record, crate::footprint::estimate(&record));

        assert!(!store.has_log_for_date(user.id, date).unwrap());
        store.insert_log(&entry).unwrap();
        assert!(store.has_log_for_date(user.id, date).unwrap());
    }

    #[test]
    fn test_update_user_stats() {
        let (_dir, store) = store();

        let user = User::new("asha");
        store.create_user(&user).unwrap();

        let date = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        store.update_user_stats(user.id, 97, 1, date).unwrap();

        let updated = store.find_user("asha").unwrap().unwrap();
        assert_eq!(updated.points, 97);
        assert_eq!(updated.streak, 1);
        assert_eq!(updated.last_log_date, Some(date));
    }

    #[test]
    fn test_update_unknown_user_fails() {
        let (_dir, store) = store();

        let date = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let result = store.update_user_stats(Uuid::new_v4(), 10, 1, date);
        assert!(matches!(result, Err(Error::Persistence(_))));
    }

    #[test]
    fn test_submission_lock_is_reacquirable() {
        let (_dir, store) = store();

        {
            let _guard = store.lock_submissions().unwrap();
        }
        // Dropped guard releases the lock
        let _guard = store.lock_submissions().unwrap();
    }

    #[test]
    fn test_recent_logs_ordering() {
        let (_dir, store) = store();

        let user = User::new("asha");
        store.create_user(&user).unwrap();

        for day in [3u32, 1, 2] {
            let date = NaiveDate::from_ymd_opt(2025, 6, day).unwrap();
            let record = ActivityRecord::default();
            let entry =
                LogEntry::from_record(user.id, date, &record, crate::footprint::estimate(&record));
            store.insert_log(&entry).unwrap();
        }

        let logs = store.recent_logs(user.id, 2).unwrap();
        assert_eq!(logs.len(), 2);
        assert_eq!(logs[0].date, NaiveDate::from_ymd_opt(2025, 6, 3).unwrap());
        assert_eq!(logs[1].date, NaiveDate::from_ymd_opt(2025, 6, 2).unwrap());
    }
}
