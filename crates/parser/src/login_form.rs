use scraper::{Html, Selector};
use url::form_urlencoded::byte_serialize;

use coursegrab_core::PortalError;

/// Field names the portal's login form expects the client to fill in.
const LOGIN_NAME_FIELD: &str = "LoginName";
const PASSWORD_FIELD: &str = "Password";

/// Build the urlencoded login POST body from the login page HTML.
///
/// Inputs are harvested from the first form (or the whole document when
/// no form element survives parsing) in document order and joined with
/// `&`. The portal validates the anti-forgery token together with field
/// adjacency, so ordering matters and every non-credential field passes
/// through byte-identical. Only the two substituted credential values
/// are percent-encoded; they are the only values we originate.
pub fn login_form_body(html: &str, username: &str, password: &str) -> Result<String, PortalError> {
    let document = Html::parse_document(html);
    let form_sel = Selector::parse("form").unwrap();
    let input_sel = Selector::parse("input").unwrap();

    let inputs: Vec<_> = match document.select(&form_sel).next() {
        Some(form) => form.select(&input_sel).collect(),
        None => document.select(&input_sel).collect(),
    };

    if inputs.is_empty() {
        return Err(PortalError::Parse(
            "login page contains no input fields".into(),
        ));
    }

    let mut pairs = Vec::with_capacity(inputs.len());
    for input in inputs {
        let name = input.value().attr("name").unwrap_or("");
        let value = input.value().attr("value").unwrap_or("");
        let pair = match name {
            LOGIN_NAME_FIELD => format!("{name}={}", encode(username)),
            PASSWORD_FIELD => format!("{name}={}", encode(password)),
            _ => format!("{name}={value}"),
        };
        pairs.push(pair);
    }

    Ok(pairs.join("&"))
}

fn encode(value: &str) -> String {
    byte_serialize(value.as_bytes()).collect()
}
