//! Route table and navigation gate for the campus mail client.
//!
//! # Overview
//! `table` maps URL paths to chains of views with folder/title metadata,
//! `gate` decides whether a navigation may proceed, and `navigator` ties
//! both to a `SessionStore` from the client core. Views are identified by
//! `ViewId` and constructed through an explicit `ViewLoader`.

pub mod gate;
pub mod navigator;
pub mod table;
pub mod view;

use thiserror::Error;

pub use gate::{decide, Decision, LOGIN_PATH, REGISTER_PATH};
pub use navigator::{Navigation, NavigationRequest, Navigator, Outcome, RouteContext};
pub use table::{campus_routes, Resolution, RouteEntry, RouteMatch, RouteTable};
pub use view::{ViewId, ViewLoader, ViewRegistry};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RouterError {
    #[error("navigation to {target} exceeded {hops} redirects")]
    TooManyRedirects { target: String, hops: usize },

    #[error("invalid route table: {0}")]
    InvalidTable(String),

    #[error("no view registered for {0}")]
    MissingView(ViewId),
}
