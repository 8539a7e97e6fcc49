use tracing::{info, warn};

use coursegrab_core::{Credentials, Endpoints, PortalError, Transport};
use coursegrab_parser::{login_form_body, ResponseClassifier};

/// Two-step login: GET the login page (cookies + anti-forgery token),
/// then POST the harvested form back with credentials filled in. The
/// response is judged by the classifier; a missing landing marker is
/// `AuthRejected`, reported to the caller — never a process exit.
pub async fn login<T: Transport + ?Sized>(
    transport: &T,
    endpoints: &Endpoints,
    classifier: &ResponseClassifier,
    credentials: &Credentials,
) -> Result<(), PortalError> {
    info!("fetching login page for cookies and token");
    let login_page = transport.get(&endpoints.login()).await?;
    let body = login_form_body(&login_page, credentials.username(), credentials.password())?;

    info!(user = %credentials.username(), "logging in");
    let response = transport.post_form(&endpoints.login(), &body).await?;
    if !classifier.authenticated(&response) {
        return Err(PortalError::AuthRejected);
    }

    info!("✓ authenticated");
    Ok(())
}

/// Best-effort logout. The session dies with the client either way, so a
/// failure here is logged and swallowed.
pub async fn logout<T: Transport + ?Sized>(transport: &T, endpoints: &Endpoints) {
    match transport.get(&endpoints.logout()).await {
        Ok(_) => info!("logged out"),
        Err(e) => warn!(error = %e, "logout failed, dropping session anyway"),
    }
}
