use thiserror::Error;

#[derive(Error, Debug)]
pub enum PortalError {
    #[error("network error: {0}")]
    Network(String),

    #[error("unexpected status {status} from {url}")]
    Status { status: u16, url: String },

    #[error("login rejected by portal")]
    AuthRejected,

    #[error("parse error: {0}")]
    Parse(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl PortalError {
    /// Credential rejections are the one failure class the retry loop
    /// must not hammer the server with.
    pub fn is_auth_rejected(&self) -> bool {
        matches!(self, Self::AuthRejected)
    }
}
