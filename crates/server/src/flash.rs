//! One-shot flash messages carried in a cookie between requests.
//!
//! The cookie value is percent-encoded JSON:
//! `{"type":"error","message":"..."}`.

use axum::http::header::SET_COOKIE;
use axum::http::{HeaderMap, HeaderValue};
use axum::response::Response;
use cookie::time::Duration;
use cookie::{Cookie, SameSite};
use percent_encoding::{NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};
use tracing::warn;

use guides_editor::FlashMessage;

use crate::cookies::read_cookie;
use crate::error::ServerError;

/// Name of the flash cookie.
pub const FLASH_COOKIE: &str = "flash";

const FLASH_MAX_AGE_SECONDS: i64 = 120;

/// `Set-Cookie` value that expires the flash cookie.
const CLEAR_FLASH_COOKIE: &str = "flash=; Path=/; Max-Age=0; SameSite=Lax; HttpOnly";

/// `Set-Cookie` value storing `message` in the flash cookie.
pub fn flash_cookie(message: &FlashMessage) -> Result<HeaderValue, ServerError> {
    let json = serde_json::to_string(message)
        .map_err(|e| ServerError::Internal(format!("flash encoding failed: {e}")))?;
    let value = utf8_percent_encode(&json, NON_ALPHANUMERIC).to_string();

    let cookie = Cookie::build((FLASH_COOKIE, value))
        .path("/")
        .max_age(Duration::seconds(FLASH_MAX_AGE_SECONDS))
        .same_site(SameSite::Lax)
        .http_only(true)
        .build();

    HeaderValue::from_str(&cookie.to_string())
        .map_err(|e| ServerError::Internal(format!("invalid flash cookie: {e}")))
}

/// Pending flash message sent with the request, if any. Malformed cookies
/// are ignored.
pub fn read_flash(headers: &HeaderMap) -> Option<FlashMessage> {
    let raw = read_cookie(headers, FLASH_COOKIE)?;
    let json = percent_decode_str(&raw).decode_utf8().ok()?;
    serde_json::from_str(&json).ok()
}

/// Attach the last of `messages` to the response as the flash cookie.
pub fn set_flash(response: &mut Response, messages: Vec<FlashMessage>) {
    let Some(message) = messages.into_iter().last() else {
        return;
    };
    match flash_cookie(&message) {
        Ok(value) => {
            response.headers_mut().append(SET_COOKIE, value);
        }
        Err(e) => warn!(error = %e, "dropping flash message"),
    }
}

/// Expire the flash cookie on the response.
pub fn clear_flash(response: &mut Response) {
    response
        .headers_mut()
        .append(SET_COOKIE, HeaderValue::from_static(CLEAR_FLASH_COOKIE));
}

#[cfg(test)]
mod tests {
    use axum::http::header::COOKIE;

    use super::*;

    #[test]
    fn cookie_attributes() {
        let value = flash_cookie(&FlashMessage::error("Error fetching guide")).unwrap();
        let value = value.to_str().unwrap();

        assert!(value.starts_with("flash=%7B%22type%22%3A%22error%22"));
        assert!(value.contains("Path=/"));
        assert!(value.contains("Max-Age=120"));
        assert!(value.contains("SameSite=Lax"));
    }

    #[test]
    fn written_flash_reads_back() {
        let message = FlashMessage::error("Error fetching guide, please try again later.");
        let set_cookie = flash_cookie(&message).unwrap();
        let pair = set_cookie.to_str().unwrap().split(';').next().unwrap().to_owned();

        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_str(&pair).unwrap());
        assert_eq!(read_flash(&headers), Some(message));
    }

    #[test]
    fn garbage_cookie_is_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("flash=%7Bnot-json"));
        assert_eq!(read_flash(&headers), None);
    }
}
