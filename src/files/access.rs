//! Access decision engine for stash.
//!
//! Decides the outcome of a single retrieval attempt. The decision and the
//! visit-count increment happen on the same record inside the metadata
//! store's critical section, so a file can never be served more times than
//! its limit allows.

use crate::store::FileRecord;

/// Outcome of a retrieval attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    /// Serve the file bytes. Covers both the counted path (a visit limit is
    /// set and the count was just incremented) and the uncounted one.
    Serve,
    /// No backing blob exists for this name.
    NotFound,
    /// The visit limit has been reached; refused even with the correct
    /// password.
    Locked,
    /// A password is required and none (or the wrong one) was supplied.
    PasswordRequired,
}

/// Decide a retrieval attempt against its record.
///
/// Order matters: the lock check comes before the password check so a
/// locked file never reveals whether it also wants a password. Returns the
/// decision and whether the record was mutated (visit counted).
pub(crate) fn decide(record: &mut FileRecord, credential: Option<&str>) -> (AccessDecision, bool) {
    if record.is_locked() {
        return (AccessDecision::Locked, false);
    }

    if let Some(expected) = record.password.as_deref() {
        if credential != Some(expected) {
            return (AccessDecision::PasswordRequired, false);
        }
    }

    if record.visit_limit.is_some() {
        record.visit_count += 1;
        (AccessDecision::Serve, true)
    } else {
        (AccessDecision::Serve, false)
    }
}
