use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use url::Url;

use coursegrab_core::{PortalError, Transport};

/// Replays canned responses keyed by URL path, in scripted order, and
/// records every request so tests can assert what a round actually sent.
pub struct ScriptedTransport {
    script: Mutex<HashMap<String, VecDeque<Result<String, PortalError>>>>,
    requests: Mutex<Vec<String>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self {
            script: Mutex::new(HashMap::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn on(self, path: &str, body: &str) -> Self {
        self.push(path, Ok(body.to_string()));
        self
    }

    pub fn on_err(self, path: &str, err: PortalError) -> Self {
        self.push(path, Err(err));
        self
    }

    fn push(&self, path: &str, response: Result<String, PortalError>) {
        self.script
            .lock()
            .unwrap()
            .entry(path.to_string())
            .or_default()
            .push_back(response);
    }

    fn take(&self, method: &str, url: &Url) -> Result<String, PortalError> {
        let path = url.path().to_string();
        self.requests.lock().unwrap().push(format!("{method} {path}"));
        self.script
            .lock()
            .unwrap()
            .get_mut(&path)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| panic!("unscripted request: {method} {path}"))
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn saw(&self, line: &str) -> bool {
        self.requests().iter().any(|r| r == line)
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn get(&self, url: &Url) -> Result<String, PortalError> {
        self.take("GET", url)
    }

    async fn post_form(&self, url: &Url, _body: &str) -> Result<String, PortalError> {
        self.take("POST", url)
    }
}
