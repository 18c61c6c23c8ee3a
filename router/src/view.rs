//! View identifiers and on-demand view construction.

use std::collections::HashMap;
use std::fmt;

/// Every view a route can mount.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ViewId {
    Login,
    Register,
    MainLayout,
    MailList,
    MailDetail,
    Compose,
    MailAccountManage,
    ContactManage,
    Statistics,
    NotFound,
}

impl ViewId {
    pub const ALL: [ViewId; 10] = [
        ViewId::Login,
        ViewId::Register,
        ViewId::MainLayout,
        ViewId::MailList,
        ViewId::MailDetail,
        ViewId::Compose,
        ViewId::MailAccountManage,
        ViewId::ContactManage,
        ViewId::Statistics,
        ViewId::NotFound,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ViewId::Login => "Login",
            ViewId::Register => "Register",
            ViewId::MainLayout => "MainLayout",
            ViewId::MailList => "MailList",
            ViewId::MailDetail => "MailDetail",
            ViewId::Compose => "Compose",
            ViewId::MailAccountManage => "MailAccountManage",
            ViewId::ContactManage => "ContactManage",
            ViewId::Statistics => "Statistics",
            ViewId::NotFound => "NotFound",
        }
    }
}

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Produces a host view for an id, or `None` if the host has none.
pub trait ViewLoader<V> {
    fn load(&self, id: ViewId) -> Option<V>;
}

type Constructor<V> = Box<dyn Fn() -> V + Send + Sync>;

/// Explicit id → constructor table. Nothing is built until `load` asks.
pub struct ViewRegistry<V> {
    constructors: HashMap<ViewId, Constructor<V>>,
}

impl<V> Default for ViewRegistry<V> {
    fn default() -> Self {
        Self {
            constructors: HashMap::new(),
        }
    }
}

impl<V> ViewRegistry<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a constructor, replacing any earlier one for `id`.
    pub fn register(mut self, id: ViewId, constructor: impl Fn() -> V + Send + Sync + 'static) -> Self {
        self.constructors.insert(id, Box::new(constructor));
        self
    }

    pub fn contains(&self, id: ViewId) -> bool {
        self.constructors.contains_key(&id)
    }

    /// Ids without a constructor.
    pub fn missing(&self) -> Vec<ViewId> {
        ViewId::ALL.into_iter().filter(|id| !self.contains(*id)).collect()
    }
}

impl<V> ViewLoader<V> for ViewRegistry<V> {
    fn load(&self, id: ViewId) -> Option<V> {
        self.constructors.get(&id).map(|construct| construct())
    }
}

impl<V> fmt::Debug for ViewRegistry<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut ids: Vec<_> = self.constructors.keys().collect();
        ids.sort();
        f.debug_struct("ViewRegistry").field("views", &ids).finish()
    }
}
