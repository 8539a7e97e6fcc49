use url::Url;

use crate::error::PortalError;

/// The portal's endpoint table, rooted at a configurable base URL (the
/// school runs a fallback host for peak registration).
#[derive(Debug, Clone)]
pub struct Endpoints {
    base: Url,
}

impl Endpoints {
    pub fn new(base_url: &str) -> Result<Self, PortalError> {
        let mut raw = base_url.trim().to_string();
        if !raw.ends_with('/') {
            raw.push('/');
        }
        let base = Url::parse(&raw)
            .map_err(|e| PortalError::Config(format!("invalid portal base_url {base_url:?}: {e}")))?;
        Ok(Self { base })
    }

    // Base is validated at construction and every path here is
    // program-built, so a failed join cannot happen in practice.
    fn join(&self, path: &str) -> Url {
        self.base.join(path).unwrap_or_else(|_| self.base.clone())
    }

    pub fn login(&self) -> Url {
        self.join("dang-nhap")
    }

    pub fn logout(&self) -> Url {
        self.join("Account/Logout")
    }

    /// Major-specific listing. Requesting it is a session-priming side
    /// effect the portal requires before select/submit; the body is
    /// discarded.
    pub fn major_catalog(&self) -> Url {
        self.join("danh-sach-mon-hoc/1/1")
    }

    /// Full-school listing, the catalog snapshot courses are looked up in.
    pub fn full_catalog(&self) -> Url {
        self.join("danh-sach-mon-hoc/1/2")
    }

    pub fn registered(&self) -> Url {
        self.join("danh-sach-mon-hoc-da-dang-ky/1")
    }

    pub fn prerequisite_check(&self, crdid: &str) -> Url {
        self.join(&format!("kiem-tra-tien-quyet/{crdid}/1"))
    }

    pub fn select_course(&self, rowindex: &str) -> Url {
        self.join(&format!("chon-mon-hoc/{rowindex}/1/1"))
    }

    pub fn submit(&self) -> Url {
        self.join("xac-nhan-dang-ky/1")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_paths_with_and_without_trailing_slash() {
        let a = Endpoints::new("http://dangkyhoc.vnu.edu.vn").unwrap();
        let b = Endpoints::new("http://dangkyhoc.vnu.edu.vn/").unwrap();
        assert_eq!(a.login().as_str(), "http://dangkyhoc.vnu.edu.vn/dang-nhap");
        assert_eq!(a.login(), b.login());
    }

    #[test]
    fn parameterized_endpoints_interpolate_identifiers() {
        let endpoints = Endpoints::new("http://dangkyhoc.vnu.edu.vn").unwrap();
        assert_eq!(
            endpoints.prerequisite_check("55").as_str(),
            "http://dangkyhoc.vnu.edu.vn/kiem-tra-tien-quyet/55/1"
        );
        assert_eq!(
            endpoints.select_course("7").as_str(),
            "http://dangkyhoc.vnu.edu.vn/chon-mon-hoc/7/1/1"
        );
    }

    #[test]
    fn rejects_unparseable_base_url() {
        assert!(Endpoints::new("not a url").is_err());
    }
}
