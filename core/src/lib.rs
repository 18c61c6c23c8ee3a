//! Client core for the campus mail service.
//!
//! # Overview
//! Maps each mail, contact, attachment, mail-account and auth operation onto
//! exactly one HTTP request (host-does-IO pattern) and runs those requests
//! asynchronously through a pluggable transport.
//!
//! # Design
//! - `ApiClient` is stateless: it holds only `base_url` and hands out
//!   per-resource builders whose `build_*` / `parse_*` methods keep the I/O
//!   boundary explicit and testable.
//! - `MailClient` adds a `Transport` and a `SessionStore`. It attaches the
//!   bearer credential, runs the blocking transport on tokio's blocking pool
//!   and passes results through unchanged. No retries, no caching.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod progress;
pub mod service;
pub mod session;
pub mod transport;
pub mod types;

pub use client::ApiClient;
pub use config::ClientConfig;
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse, MultipartForm};
pub use progress::UploadProgress;
pub use service::MailClient;
pub use session::{FileSessionStore, MemorySessionStore, SessionError, SessionStore};
pub use transport::{Transport, UreqTransport};
pub use types::{
    Attachment, Contact, Download, LoginRequest, LoginResponse, Mail, MailAccount, MailDetail, MailDraft, MailStats,
    RegisterRequest, RegisterResponse, SearchQuery, UploadFile,
};
