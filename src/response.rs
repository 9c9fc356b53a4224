//! Maps transport outcomes to typed payloads or [`Error`] records.

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;

use crate::error::Error;

/// Fallback when the server gave us nothing usable to display.
const GENERIC_MESSAGE: &str = "An error occurred";

/// Decodes a response into `T`, or normalizes the failure.
///
/// Non-success statuses become the corresponding [`Error`] kind: the six
/// statuses with fixed user-facing copy ignore the body, all others carry the
/// server's `message`/`error` body field when present, the status reason
/// otherwise. A success status whose body does not decode as `T` is a
/// contract violation by the backend and yields
/// [`Error::InvalidResponseFormat`].
///
/// # Errors
///
/// Returns an [`Error`] for any non-success status or undecodable body.
pub async fn normalize<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, Error> {
    let status = response.status();
    if !status.is_success() {
        let message = error_message(status, response.text().await.ok());
        return Err(Error::from_status(status, message));
    }
    let body = response
        .text()
        .await
        .map_err(|_| Error::InvalidResponseFormat)?;
    serde_json::from_str(&body).map_err(|_| Error::InvalidResponseFormat)
}

/// Picks the display message for a non-success response.
///
/// A JSON body is searched for `message` then `error`; a body that is not
/// JSON falls back to the canonical status reason.
fn error_message(status: StatusCode, body: Option<String>) -> String {
    let status_reason = || status.canonical_reason().unwrap_or(GENERIC_MESSAGE).to_owned();
    match body {
        Some(text) => match serde_json::from_str::<JsonValue>(&text) {
            Ok(value) => server_message(&value).unwrap_or_else(|| GENERIC_MESSAGE.to_owned()),
            Err(_) => status_reason(),
        },
        None => status_reason(),
    }
}

/// First non-empty string under the `message` or `error` key.
fn server_message(value: &JsonValue) -> Option<String> {
    ["message", "error"]
        .iter()
        .filter_map(|key| value.get(key).and_then(JsonValue::as_str))
        .find(|text| !text.is_empty())
        .map(str::to_owned)
}
