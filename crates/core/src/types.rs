use std::fmt;

use async_trait::async_trait;
use url::Url;

use crate::error::PortalError;

/// One authenticated HTTP session against the portal. The engine only
/// ever talks through this trait, so rounds can run against a scripted
/// transport in tests.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &Url) -> Result<String, PortalError>;
    async fn post_form(&self, url: &Url, body: &str) -> Result<String, PortalError>;
}

/// Login credentials, immutable for the run.
#[derive(Clone)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"********")
            .finish()
    }
}

/// The working set of course codes not yet confirmed registered.
///
/// Order is the user's priority order and is preserved across every
/// mutation. A code leaves the set in exactly two ways: the registered
/// listing already contains it, or a selection response carried the
/// success marker. Codes are never re-added.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesiredCourses {
    codes: Vec<String>,
}

impl DesiredCourses {
    pub fn new(codes: impl IntoIterator<Item = String>) -> Self {
        let mut seen = Vec::new();
        for code in codes {
            let code = code.trim().to_string();
            if !code.is_empty() && !seen.contains(&code) {
                seen.push(code);
            }
        }
        Self { codes: seen }
    }

    pub fn codes(&self) -> &[String] {
        &self.codes
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    /// Drop every code that appears (as a substring) in the registered
    /// listing, returning the dropped codes in order.
    pub fn drop_registered(&mut self, listing: &str) -> Vec<String> {
        let (registered, pending): (Vec<_>, Vec<_>) = self
            .codes
            .drain(..)
            .partition(|code| listing.contains(code.as_str()));
        self.codes = pending;
        registered
    }

    /// Remove a single confirmed code. Returns false if it was not in
    /// the set.
    pub fn confirm(&mut self, code: &str) -> bool {
        let before = self.codes.len();
        self.codes.retain(|c| c != code);
        self.codes.len() != before
    }
}

/// The pair of identifiers needed to act on a specific course offering,
/// pulled out of a catalog snapshot. Absence means the course is not
/// offered or not selectable this round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseDescriptor {
    pub code: String,
    pub crdid: String,
    pub rowindex: String,
}

/// What happened to a single course within one round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// Selection response carried the success marker.
    Registered,
    /// No selectable row in this round's catalog snapshot.
    Unavailable,
    /// Selectable, but the selection response lacked the success marker
    /// (seat full, conflict). Retried next round with fresh data.
    Rejected,
}

/// Where a round currently is, or where it died.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoundPhase {
    Authenticating,
    Filtering,
    Priming,
    Fetching,
    Attempting(String),
    Submitting,
    LoggingOut,
}

impl fmt::Display for RoundPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Authenticating => write!(f, "authenticating"),
            Self::Filtering => write!(f, "filtering registered courses"),
            Self::Priming => write!(f, "priming session"),
            Self::Fetching => write!(f, "fetching catalog"),
            Self::Attempting(code) => write!(f, "attempting {code}"),
            Self::Submitting => write!(f, "submitting selections"),
            Self::LoggingOut => write!(f, "logging out"),
        }
    }
}

/// Outcome of one full login→filter→attempt→submit→logout cycle.
#[derive(Debug, Clone)]
pub struct RoundReport {
    pub started_at: chrono::DateTime<chrono::Utc>,
    /// Codes confirmed registered during this round.
    pub confirmed: Vec<String>,
    /// Codes still pending after this round.
    pub deferred: Vec<String>,
    /// True when the desired set is now empty.
    pub complete: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_drops_only_listed_codes_and_keeps_order() {
        let mut desired = DesiredCourses::new(
            ["INT101", "MAT104", "INT202", "PHY105"]
                .map(String::from),
        );
        let listing = "<tr><td>INT101</td></tr><tr><td>PHY105</td></tr>";

        let dropped = desired.drop_registered(listing);

        assert_eq!(dropped, vec!["INT101", "PHY105"]);
        assert_eq!(desired.codes(), ["MAT104", "INT202"]);
    }

    #[test]
    fn filter_scenario_from_registered_listing() {
        let mut desired = DesiredCourses::new(["INT101", "INT202"].map(String::from));
        desired.drop_registered("registered: INT101");
        assert_eq!(desired.codes(), ["INT202"]);
    }

    #[test]
    fn confirm_removes_exactly_one_code() {
        let mut desired = DesiredCourses::new(["INT101", "INT202"].map(String::from));
        assert!(desired.confirm("INT202"));
        assert!(!desired.confirm("INT202"));
        assert_eq!(desired.codes(), ["INT101"]);
    }

    #[test]
    fn construction_trims_and_dedups_preserving_first_occurrence() {
        let desired = DesiredCourses::new(
            [" INT101 ", "", "INT202", "INT101"].map(String::from),
        );
        assert_eq!(desired.codes(), ["INT101", "INT202"]);
    }

    #[test]
    fn credentials_debug_masks_password() {
        let creds = Credentials::new("student", "hunter2");
        let rendered = format!("{creds:?}");
        assert!(rendered.contains("student"));
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("********"));
    }
}
