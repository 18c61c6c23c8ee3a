//! Error types for the campus mail API client.
//!
//! # Design
//! `NotFound` gets a dedicated variant because callers frequently tell
//! "the resource does not exist" apart from "the server returned an
//! unexpected status." All other non-2xx responses land in `HttpError` with
//! the raw status code and body. Transport failures are reported as-is;
//! nothing here retries or reinterprets them.

use thiserror::Error;

use crate::session::SessionError;

/// Errors returned by façade parse methods, transports and the async client.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server returned 404.
    #[error("resource not found")]
    NotFound,

    /// The server returned a non-2xx status other than 404.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),

    /// The request never produced an HTTP response.
    #[error("transport failed: {0}")]
    Transport(String),

    #[error(transparent)]
    Session(#[from] SessionError),
}

pub type Result<T> = std::result::Result<T, ApiError>;
