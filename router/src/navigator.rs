//! Host-side navigation: gate, then table, following redirects.

use std::collections::BTreeMap;
use std::sync::Arc;

use campusmail_core::SessionStore;
use tracing::{debug, warn};

use crate::gate::{self, Decision};
use crate::table::{campus_routes, Resolution, RouteMatch, RouteTable};
use crate::view::{ViewId, ViewLoader};
use crate::RouterError;

pub const MAX_REDIRECTS: usize = 8;

/// Where a navigation starts before anything has been mounted.
pub const START_PATH: &str = "/";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NavigationRequest {
    pub target_path: String,
    pub source_path: String,
}

/// Read-only view of a resolved route handed to the mounted view.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RouteContext {
    route: RouteMatch,
}

impl RouteContext {
    pub fn name(&self) -> &str {
        self.route.name()
    }

    pub fn chain(&self) -> &[String] {
        &self.route.chain
    }

    pub fn views(&self) -> &[ViewId] {
        &self.route.views
    }

    pub fn param(&self, key: &str) -> Option<&str> {
        self.route.param(key)
    }

    pub fn params(&self) -> &BTreeMap<String, String> {
        &self.route.params
    }

    pub fn meta(&self) -> &BTreeMap<String, String> {
        &self.route.meta
    }

    pub fn folder(&self) -> Option<&str> {
        self.route.folder()
    }

    pub fn title(&self) -> Option<&str> {
        self.route.title()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Mounted(RouteContext),
    NotFound,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Navigation {
    pub request: NavigationRequest,
    /// Path actually shown once redirects settle.
    pub path: String,
    pub outcome: Outcome,
}

impl Navigation {
    pub fn redirected(&self) -> bool {
        self.path != self.request.target_path
    }

    pub fn context(&self) -> Option<&RouteContext> {
        match &self.outcome {
            Outcome::Mounted(context) => Some(context),
            Outcome::NotFound => None,
        }
    }

    /// Views to mount, outermost first.
    pub fn views(&self) -> Vec<ViewId> {
        match &self.outcome {
            Outcome::Mounted(context) => context.views().to_vec(),
            Outcome::NotFound => vec![ViewId::NotFound],
        }
    }

    pub fn load_views<V>(&self, loader: &impl ViewLoader<V>) -> Result<Vec<V>, RouterError> {
        self.views()
            .into_iter()
            .map(|id| loader.load(id).ok_or(RouterError::MissingView(id)))
            .collect()
    }
}

/// Drops `?query` and `#fragment`.
fn path_only(target: &str) -> &str {
    target.split(['?', '#']).next().unwrap_or_default()
}

pub struct Navigator {
    table: RouteTable,
    session: Arc<dyn SessionStore>,
    current: String,
    max_redirects: usize,
}

impl Navigator {
    pub fn new(table: RouteTable, session: Arc<dyn SessionStore>) -> Self {
        Self {
            table,
            session,
            current: START_PATH.to_string(),
            max_redirects: MAX_REDIRECTS,
        }
    }

    pub fn campus(session: Arc<dyn SessionStore>) -> Self {
        Self::new(campus_routes(), session)
    }

    pub fn with_max_redirects(mut self, max_redirects: usize) -> Self {
        self.max_redirects = max_redirects;
        self
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    pub fn current_path(&self) -> &str {
        &self.current
    }

    /// Runs the gate on every hop, so a table redirect into a protected
    /// path still lands on the login page without a credential. Unmatched
    /// paths settle on the not-found outcome and are never redirected.
    pub fn navigate(&mut self, target: &str) -> Result<Navigation, RouterError> {
        let request = NavigationRequest {
            target_path: path_only(target).to_string(),
            source_path: self.current.clone(),
        };
        let mut path = request.target_path.clone();
        let mut hops = 0;

        let outcome = loop {
            let next = match gate::decide(&path, self.session.has_credential()) {
                Decision::Redirect(to) => {
                    debug!(from = %path, %to, "navigation gated");
                    to
                }
                Decision::Allow => match self.table.resolve(&path) {
                    Resolution::Resolved(route) => break Outcome::Mounted(RouteContext { route }),
                    Resolution::NotFound => {
                        debug!(%path, "no route matched");
                        break Outcome::NotFound;
                    }
                    Resolution::Redirect(to) => to,
                },
            };
            hops += 1;
            if hops > self.max_redirects {
                warn!(path = %request.target_path, hops, "redirect loop");
                return Err(RouterError::TooManyRedirects {
                    target: request.target_path,
                    hops,
                });
            }
            path = next;
        };

        debug!(from = %request.source_path, to = %path, "navigated");
        self.current = path.clone();
        Ok(Navigation { request, path, outcome })
    }
}
