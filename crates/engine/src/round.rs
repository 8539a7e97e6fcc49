use chrono::Utc;
use thiserror::Error;
use tracing::{debug, info};

use coursegrab_core::{
    AttemptOutcome, Credentials, DesiredCourses, Endpoints, PortalError, RoundPhase, RoundReport,
    Transport,
};
use coursegrab_parser::{find_course, ResponseClassifier};

use crate::auth;

/// A failed round, tagged with the phase that died so the scheduler can
/// narrate where it happened before retrying.
#[derive(Debug, Error)]
#[error("round failed while {phase}: {source}")]
pub struct RoundError {
    pub phase: RoundPhase,
    #[source]
    pub source: PortalError,
}

impl RoundError {
    pub(crate) fn at(phase: RoundPhase) -> impl FnOnce(PortalError) -> Self {
        move |source| Self { phase, source }
    }
}

/// Drives one registration round over a transport. Holds no session
/// state of its own; the transport owns the cookies and is rebuilt by
/// the scheduler for every round.
pub struct RegistrationEngine {
    pub(crate) endpoints: Endpoints,
    pub(crate) classifier: ResponseClassifier,
    pub(crate) credentials: Credentials,
}

impl RegistrationEngine {
    pub fn new(
        endpoints: Endpoints,
        classifier: ResponseClassifier,
        credentials: Credentials,
    ) -> Self {
        Self {
            endpoints,
            classifier,
            credentials,
        }
    }

    /// One full login→filter→attempt→submit→logout cycle.
    ///
    /// Codes are removed from `desired` as they are confirmed, so the
    /// set survives a failed round with everything still pending intact.
    /// Each pending course gets exactly one attempt per round; courses
    /// without a selectable row are deferred, not failed.
    pub async fn run_round<T: Transport + ?Sized>(
        &self,
        transport: &T,
        desired: &mut DesiredCourses,
    ) -> Result<RoundReport, RoundError> {
        let started_at = Utc::now();
        info!(attempt_at = %started_at, pending = desired.len(), "starting registration round");

        auth::login(transport, &self.endpoints, &self.classifier, &self.credentials)
            .await
            .map_err(RoundError::at(RoundPhase::Authenticating))?;

        info!("filtering desired courses against registered listing");
        let listing = transport
            .post_form(&self.endpoints.registered(), "")
            .await
            .map_err(RoundError::at(RoundPhase::Filtering))?;
        let already = desired.drop_registered(&listing);
        if !already.is_empty() {
            info!(courses = ?already, "already registered, dropped from working set");
        }
        info!(remaining = ?desired.codes(), "working set after filter");

        if desired.is_empty() {
            info!("every desired course is already registered");
            auth::logout(transport, &self.endpoints).await;
            return Ok(RoundReport {
                started_at,
                confirmed: Vec::new(),
                deferred: Vec::new(),
                complete: true,
            });
        }

        // The portal refuses select/submit unless the major listing was
        // requested earlier in the same session. Body is discarded.
        transport
            .post_form(&self.endpoints.major_catalog(), "")
            .await
            .map_err(RoundError::at(RoundPhase::Priming))?;

        info!("fetching full catalog snapshot");
        let catalog = transport
            .post_form(&self.endpoints.full_catalog(), "")
            .await
            .map_err(RoundError::at(RoundPhase::Fetching))?;

        let mut confirmed = Vec::new();
        for code in desired.codes().to_vec() {
            let outcome = self
                .attempt_course(transport, &code, &catalog)
                .await
                .map_err(|e| RoundError::at(RoundPhase::Attempting(code.clone()))(e))?;
            match outcome {
                AttemptOutcome::Registered => {
                    desired.confirm(&code);
                    confirmed.push(code);
                }
                AttemptOutcome::Unavailable => {
                    info!(course = %code, "no selectable row this round, deferring");
                }
                AttemptOutcome::Rejected => {
                    info!(course = %code, "selection rejected, deferring");
                }
            }
        }

        info!("submitting selections");
        let response = transport
            .post_form(&self.endpoints.submit(), "")
            .await
            .map_err(RoundError::at(RoundPhase::Submitting))?;
        debug!(response = %response, "submit response");

        auth::logout(transport, &self.endpoints).await;

        let report = RoundReport {
            started_at,
            confirmed,
            deferred: desired.codes().to_vec(),
            complete: desired.is_empty(),
        };
        info!(
            confirmed = report.confirmed.len(),
            deferred = report.deferred.len(),
            complete = report.complete,
            "round finished"
        );
        Ok(report)
    }

    /// Single attempt for a single course: descriptor lookup,
    /// prerequisite check by `crdid`, selection by `rowindex`, then the
    /// classifier decides. Only the classifier's verdict may remove the
    /// code from the desired set.
    async fn attempt_course<T: Transport + ?Sized>(
        &self,
        transport: &T,
        code: &str,
        catalog: &str,
    ) -> Result<AttemptOutcome, PortalError> {
        info!(course = %code, "looking up course in catalog");
        let Some(descriptor) = find_course(catalog, code) else {
            return Ok(AttemptOutcome::Unavailable);
        };
        debug!(
            course = %code,
            crdid = %descriptor.crdid,
            rowindex = %descriptor.rowindex,
            "course row is selectable"
        );

        let response = transport
            .post_form(&self.endpoints.prerequisite_check(&descriptor.crdid), "")
            .await?;
        debug!(course = %code, response = %response, "prerequisite check response");

        info!(course = %code, "selecting course");
        let response = transport
            .post_form(&self.endpoints.select_course(&descriptor.rowindex), "")
            .await?;
        debug!(course = %code, response = %response, "selection response");

        if self.classifier.selection_succeeded(&response) {
            info!(course = %code, "✓ registered");
            Ok(AttemptOutcome::Registered)
        } else {
            Ok(AttemptOutcome::Rejected)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::ScriptedTransport;

    const LANDING: &str = "<html><head><title>Trang chủ</title></head></html>";
    const LOGIN_PAGE: &str = r#"
        <form>
            <input name="__RequestVerificationToken" value="tok" />
            <input name="LoginName" value="" />
            <input name="Password" value="" />
        </form>
    "#;
    const CATALOG: &str = r#"
        <tr><td><input data-crdid="55" data-rowindex="7" /></td><td>INT202</td></tr>
        <tr><td><input /></td><td>PHY105</td></tr>
    "#;

    fn engine() -> RegistrationEngine {
        RegistrationEngine::new(
            Endpoints::new("http://portal.test").unwrap(),
            ResponseClassifier::new("thành công", "<title>Trang chủ"),
            Credentials::new("student", "secret"),
        )
    }

    fn logged_in(transport: ScriptedTransport) -> ScriptedTransport {
        transport
            .on("/dang-nhap", LOGIN_PAGE)
            .on("/dang-nhap", LANDING)
    }

    #[tokio::test]
    async fn full_round_confirms_course_on_success_marker() {
        let transport = logged_in(ScriptedTransport::new())
            .on("/danh-sach-mon-hoc-da-dang-ky/1", "already: INT101")
            .on("/danh-sach-mon-hoc/1/1", "")
            .on("/danh-sach-mon-hoc/1/2", CATALOG)
            .on("/kiem-tra-tien-quyet/55/1", "ok")
            .on("/chon-mon-hoc/7/1/1", "Đăng ký thành công")
            .on("/xac-nhan-dang-ky/1", "ghi nhận")
            .on("/Account/Logout", "bye");

        let mut desired = DesiredCourses::new(["INT101", "INT202"].map(String::from));
        let report = engine().run_round(&transport, &mut desired).await.unwrap();

        assert!(report.complete);
        assert_eq!(report.confirmed, vec!["INT202"]);
        assert!(desired.is_empty());
        assert!(transport.saw("POST /chon-mon-hoc/7/1/1"));
    }

    #[tokio::test]
    async fn rejected_selection_keeps_course_pending() {
        let transport = logged_in(ScriptedTransport::new())
            .on("/danh-sach-mon-hoc-da-dang-ky/1", "nothing yet")
            .on("/danh-sach-mon-hoc/1/1", "")
            .on("/danh-sach-mon-hoc/1/2", CATALOG)
            .on("/kiem-tra-tien-quyet/55/1", "ok")
            .on("/chon-mon-hoc/7/1/1", "Lớp đã đầy")
            .on("/xac-nhan-dang-ky/1", "ghi nhận")
            .on("/Account/Logout", "bye");

        let mut desired = DesiredCourses::new(["INT202"].map(String::from));
        let report = engine().run_round(&transport, &mut desired).await.unwrap();

        assert!(!report.complete);
        assert!(report.confirmed.is_empty());
        assert_eq!(desired.codes(), ["INT202"]);
    }

    #[tokio::test]
    async fn unavailable_course_is_deferred_without_any_posts() {
        let transport = logged_in(ScriptedTransport::new())
            .on("/danh-sach-mon-hoc-da-dang-ky/1", "nothing yet")
            .on("/danh-sach-mon-hoc/1/1", "")
            .on("/danh-sach-mon-hoc/1/2", CATALOG)
            .on("/xac-nhan-dang-ky/1", "ghi nhận")
            .on("/Account/Logout", "bye");

        let mut desired = DesiredCourses::new(["PHY105"].map(String::from));
        let report = engine().run_round(&transport, &mut desired).await.unwrap();

        assert_eq!(report.deferred, vec!["PHY105"]);
        assert!(!transport.requests().iter().any(|r| r.contains("kiem-tra-tien-quyet")));
        assert!(!transport.requests().iter().any(|r| r.contains("chon-mon-hoc")));
    }

    #[tokio::test]
    async fn rejected_login_aborts_round_with_auth_phase() {
        let transport = ScriptedTransport::new()
            .on("/dang-nhap", LOGIN_PAGE)
            .on("/dang-nhap", "<title>Đăng nhập</title>");

        let mut desired = DesiredCourses::new(["INT202"].map(String::from));
        let err = engine()
            .run_round(&transport, &mut desired)
            .await
            .unwrap_err();

        assert_eq!(err.phase, RoundPhase::Authenticating);
        assert!(err.source.is_auth_rejected());
        assert_eq!(desired.codes(), ["INT202"]);
    }

    #[tokio::test]
    async fn all_courses_already_registered_short_circuits() {
        let transport = logged_in(ScriptedTransport::new())
            .on("/danh-sach-mon-hoc-da-dang-ky/1", "INT101 INT202")
            .on("/Account/Logout", "bye");

        let mut desired = DesiredCourses::new(["INT101", "INT202"].map(String::from));
        let report = engine().run_round(&transport, &mut desired).await.unwrap();

        assert!(report.complete);
        assert!(!transport.saw("POST /danh-sach-mon-hoc/1/2"));
    }

    #[tokio::test]
    async fn failed_logout_does_not_fail_the_round() {
        let transport = logged_in(ScriptedTransport::new())
            .on("/danh-sach-mon-hoc-da-dang-ky/1", "nothing")
            .on("/danh-sach-mon-hoc/1/1", "")
            .on("/danh-sach-mon-hoc/1/2", CATALOG)
            .on("/kiem-tra-tien-quyet/55/1", "ok")
            .on("/chon-mon-hoc/7/1/1", "Đăng ký thành công")
            .on("/xac-nhan-dang-ky/1", "ghi nhận")
            .on_err("/Account/Logout", PortalError::Network("reset".into()));

        let mut desired = DesiredCourses::new(["INT202"].map(String::from));
        let report = engine().run_round(&transport, &mut desired).await.unwrap();
        assert!(report.complete);
    }

    #[tokio::test]
    async fn network_failure_mid_round_reports_the_phase() {
        let transport = logged_in(ScriptedTransport::new())
            .on_err(
                "/danh-sach-mon-hoc-da-dang-ky/1",
                PortalError::Network("timeout".into()),
            );

        let mut desired = DesiredCourses::new(["INT202"].map(String::from));
        let err = engine()
            .run_round(&transport, &mut desired)
            .await
            .unwrap_err();

        assert_eq!(err.phase, RoundPhase::Filtering);
        assert_eq!(desired.codes(), ["INT202"]);
    }
}
