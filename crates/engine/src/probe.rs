use std::fmt;

use tracing::info;

use coursegrab_core::{DesiredCourses, RoundPhase, Transport};
use coursegrab_parser::find_course;

use crate::auth;
use crate::round::{RegistrationEngine, RoundError};

/// Where a desired course stands, as seen by one read-only pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CourseStatus {
    AlreadyRegistered,
    Selectable { crdid: String, rowindex: String },
    Unavailable,
}

impl fmt::Display for CourseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyRegistered => write!(f, "already registered"),
            Self::Selectable { rowindex, .. } => write!(f, "selectable (row {rowindex})"),
            Self::Unavailable => write!(f, "not offered / not selectable"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CourseProbe {
    pub code: String,
    pub status: CourseStatus,
}

impl RegistrationEngine {
    /// Read-only pass over the portal: logs in, reads the registered
    /// listing and the catalog, and reports per-course status without a
    /// single select or submit. The session-priming major listing is
    /// skipped on purpose — nothing mutating follows.
    pub async fn probe_round<T: Transport + ?Sized>(
        &self,
        transport: &T,
        desired: &DesiredCourses,
    ) -> Result<Vec<CourseProbe>, RoundError> {
        auth::login(transport, &self.endpoints, &self.classifier, &self.credentials)
            .await
            .map_err(RoundError::at(RoundPhase::Authenticating))?;

        let listing = transport
            .post_form(&self.endpoints.registered(), "")
            .await
            .map_err(RoundError::at(RoundPhase::Filtering))?;
        let catalog = transport
            .post_form(&self.endpoints.full_catalog(), "")
            .await
            .map_err(RoundError::at(RoundPhase::Fetching))?;

        let mut probes = Vec::with_capacity(desired.len());
        for code in desired.codes() {
            let status = if listing.contains(code.as_str()) {
                CourseStatus::AlreadyRegistered
            } else {
                match find_course(&catalog, code) {
                    Some(descriptor) => CourseStatus::Selectable {
                        crdid: descriptor.crdid,
                        rowindex: descriptor.rowindex,
                    },
                    None => CourseStatus::Unavailable,
                }
            };
            info!(course = %code, status = %status, "probe");
            probes.push(CourseProbe {
                code: code.clone(),
                status,
            });
        }

        auth::logout(transport, &self.endpoints).await;
        Ok(probes)
    }
}
