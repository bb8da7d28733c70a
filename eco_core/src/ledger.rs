//! Engagement ledger: one accepted log per user per day, points and
//! streak updates.
//!
//! This module implements the submission rules:
//! - Duplicate days are detected by row existence, not by comparing the
//!   last log date, so out-of-order backfills cannot double-count a day
//! - Streaks count consecutive calendar days; a missed day resets to 1
//! - Points grow by `max(1, round(100 - footprint_kg))` per accepted log

use crate::footprint::points_gain;
use crate::history::RECENT_LOG_CAP;
use crate::{
    ActivityRecord, Error, LedgerReceipt, LogEntry, Result, Store, SubmitOutcome, User,
    UserStatsReport,
};
use chrono::NaiveDate;

/// Submit one day of activity for a user.
///
/// Users are created on first log with zero points and no streak; explicit
/// registration via [`register`] remains available. The whole
/// check-then-insert sequence runs under the store's submission lock so
/// concurrent submissions for the same `(user, date)` serialize and at
/// most one succeeds.
///
/// `AlreadyLogged` is a normal outcome: nothing is mutated. Store errors
/// abort the submission and are never retried here, since a retry after an
/// ambiguous failure risks a duplicate insert.
pub fn submit<S: Store>(
    store: &S,
    name: &str,
    record: &ActivityRecord,
    footprint_kg: f64,
) -> Result<SubmitOutcome> {
    record.validate()?;

    let _guard = store.lock_submissions()?;

    let effective_date = record.effective_date();

    let user = match store.find_user(name)? {
        Some(user) => user,
        None => {
            let user = User::new(name);
            store.create_user(&user)?;
            tracing::info!("First log for {:?}, created user", name);
            user
        }
    };

    if store.has_log_for_date(user.id, effective_date)? {
        tracing::info!(
            "Rejecting duplicate log for {:?} on {}",
            name,
            effective_date
        );
        return Ok(SubmitOutcome::AlreadyLogged);
    }

    let streak = next_streak(user.streak, user.last_log_date, effective_date);
    let gain = points_gain(footprint_kg);
    let points = user.points + gain;
    let last_log_date = match user.last_log_date {
        Some(last) if last > effective_date => last,
        _ => effective_date,
    };

    let entry = LogEntry::from_record(user.id, effective_date, record, footprint_kg);
    store.insert_log(&entry)?;
    store.update_user_stats(user.id, points, streak, last_log_date)?;

    tracing::info!(
        "Logged {} kg for {:?} on {}: +{} points, streak {}",
        footprint_kg,
        name,
        effective_date,
        gain,
        streak
    );

    Ok(SubmitOutcome::Logged(LedgerReceipt {
        points_gain: gain,
        streak,
        points,
    }))
}

/// Explicitly create a user before any log is submitted
pub fn register<S: Store>(store: &S, name: &str) -> Result<User> {
    let user = User::new(name);
    store.create_user(&user)?;
    Ok(user)
}

/// Assemble the stats view for a user: points, streak, recent logs
pub fn fetch_stats<S: Store>(store: &S, name: &str) -> Result<UserStatsReport> {
    let user = store
        .find_user(name)?
        .ok_or_else(|| Error::UserNotFound(name.to_string()))?;

    let logs = store.recent_logs(user.id, RECENT_LOG_CAP)?;

    Ok(UserStatsReport {
        name: user.name,
        points: user.points,
        streak: user.streak,
        logs,
    })
}

/// Streak value after an accepted log on `effective_date`.
///
/// - first ever log → 1
/// - the day after the last log → streak + 1
/// - a later day with a gap → reset to 1
/// - a backfill at or before the last log date → unchanged
fn next_streak(current: u32, last_log_date: Option<NaiveDate>, effective_date: NaiveDate) -> u32 {
    let Some(last) = last_log_date else {
        return 1;
    };

    match (effective_date - last).num_days() {
        1 => current + 1,
        d if d > 1 => 1,
        _ => current,
    }
}
