//! Resource façades.
//!
//! Every resource comes in two halves: a `*Requests` type that maps a
//! domain operation onto exactly one `HttpRequest` (and parses its
//! response), and a `*Api` type that runs that request through
//! `MailClient`. The async half is one line per operation; all path and
//! parameter shaping lives in the builders so it can be tested without I/O.

mod account;
mod attachment;
mod auth;
mod contact;
mod mail;

pub use account::{AccountApi, AccountRequests};
pub use attachment::{AttachmentApi, AttachmentRequests};
pub use auth::{AuthApi, AuthRequests};
pub use contact::{ContactApi, ContactRequests};
pub use mail::{MailApi, MailRequests};
