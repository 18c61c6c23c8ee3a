//! Stateless HTTP request builder and response parser for the campus mail API.
//!
//! # Design
//! `ApiClient` holds only a `base_url` and carries no mutable state between
//! calls. Each resource (mail, contacts, attachments, mail accounts, auth)
//! gets a borrowed request-builder type whose `build_*` methods produce an
//! `HttpRequest` and whose `parse_*` methods consume an `HttpResponse`. The
//! caller, usually `MailClient`, executes the round-trip in between.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::api::{AccountRequests, AttachmentRequests, AuthRequests, ContactRequests, MailRequests};
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// Synchronous, stateless client for the campus mail API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn mail(&self) -> MailRequests<'_> {
        MailRequests::new(self)
    }

    pub fn contacts(&self) -> ContactRequests<'_> {
        ContactRequests::new(self)
    }

    pub fn attachments(&self) -> AttachmentRequests<'_> {
        AttachmentRequests::new(self)
    }

    pub fn accounts(&self) -> AccountRequests<'_> {
        AccountRequests::new(self)
    }

    pub fn auth(&self) -> AuthRequests<'_> {
        AuthRequests::new(self)
    }

    pub(crate) fn request(&self, method: HttpMethod, path: &str) -> HttpRequest {
        HttpRequest::new(method, format!("{}{path}", self.base_url))
    }

    pub(crate) fn json_request<B: Serialize + ?Sized>(
        &self,
        method: HttpMethod,
        path: &str,
        body: &B,
    ) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(body).map_err(|e| ApiError::SerializationError(e.to_string()))?;
        Ok(self.request(method, path).json_body(body))
    }
}

/// Map non-success status codes to the appropriate `ApiError` variant.
///
/// The server answers 200 for most calls and 204 for some deletes, so any
/// 2xx status counts as success.
pub(crate) fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    if response.status == 404 {
        return Err(ApiError::NotFound);
    }
    Err(ApiError::HttpError {
        status: response.status,
        body: response.text(),
    })
}

pub(crate) fn parse_json<T: DeserializeOwned>(response: HttpResponse) -> Result<T, ApiError> {
    check_status(&response)?;
    serde_json::from_slice(&response.body).map_err(|e| ApiError::DeserializationError(e.to_string()))
}

/// Accept any success status and discard the body.
pub(crate) fn parse_ack(response: HttpResponse) -> Result<(), ApiError> {
    check_status(&response)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_stripped() {
        let client = ApiClient::new("http://localhost:8080/api/");
        let req = client.mail().build_get(1);
        assert_eq!(req.path, "http://localhost:8080/api/mails/1");
    }

    #[test]
    fn not_found_maps_to_dedicated_variant() {
        let err = parse_ack(HttpResponse::new(404, Vec::new())).unwrap_err();
        assert!(matches!(err, ApiError::NotFound));
    }

    #[test]
    fn other_failures_keep_status_and_body() {
        let err = parse_ack(HttpResponse::new(403, "forbidden")).unwrap_err();
        match err {
            ApiError::HttpError { status, body } => {
                assert_eq!(status, 403);
                assert_eq!(body, "forbidden");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn no_content_is_success() {
        assert!(parse_ack(HttpResponse::new(204, Vec::new())).is_ok());
    }

    #[test]
    fn bad_json_is_a_deserialization_error() {
        let err = parse_json::<Vec<i64>>(HttpResponse::new(200, "not json")).unwrap_err();
        assert!(matches!(err, ApiError::DeserializationError(_)));
    }
}
