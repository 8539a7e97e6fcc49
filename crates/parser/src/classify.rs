use coursegrab_core::config::PortalConfig;

/// The portal reports outcomes as localized prose inside HTML, not as
/// status codes. All marker matching is concentrated here so the engine
/// never scans response text itself and the strategy can be swapped
/// without touching it.
#[derive(Debug, Clone)]
pub struct ResponseClassifier {
    success_marker: String,
    landing_marker: String,
}

impl ResponseClassifier {
    pub fn new(success_marker: impl Into<String>, landing_marker: impl Into<String>) -> Self {
        Self {
            success_marker: success_marker.into(),
            landing_marker: landing_marker.into(),
        }
    }

    pub fn from_portal(portal: &PortalConfig) -> Self {
        Self::new(&portal.success_marker, &portal.landing_marker)
    }

    /// Did a selection POST actually register the course?
    pub fn selection_succeeded(&self, body: &str) -> bool {
        body.contains(&self.success_marker)
    }

    /// Does this page look like the authenticated landing page?
    pub fn authenticated(&self, body: &str) -> bool {
        body.contains(&self.landing_marker)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> ResponseClassifier {
        ResponseClassifier::from_portal(&PortalConfig::default())
    }

    #[test]
    fn success_marker_in_selection_response() {
        assert!(classifier().selection_succeeded("Đăng ký thành công"));
    }

    #[test]
    fn full_class_response_is_not_success() {
        assert!(!classifier().selection_succeeded("Lớp đã đầy"));
    }

    #[test]
    fn landing_page_title_marks_authentication() {
        assert!(classifier().authenticated("<html><head><title>Trang chủ</title></head></html>"));
        assert!(!classifier().authenticated("<html><head><title>Đăng nhập</title></head></html>"));
    }

    #[test]
    fn markers_are_configurable() {
        let classifier = ResponseClassifier::new("OK", "<title>Home");
        assert!(classifier.selection_succeeded("status: OK"));
        assert!(!classifier.selection_succeeded("thành công"));
    }
}
