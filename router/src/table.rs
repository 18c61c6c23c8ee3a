//! Static route table and path resolution.
//!
//! Root entries carry absolute paths (`/login`), children carry paths
//! relative to their parent (`inbox`, `mail/:id`). A `:name` segment binds
//! one non-empty path segment to `name`. Matching is exact and
//! case-sensitive; nothing is normalized.

use std::collections::{BTreeMap, HashSet};

use crate::view::ViewId;
use crate::RouterError;

pub const META_FOLDER: &str = "folder";
pub const META_TITLE: &str = "title";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RouteEntry {
    pub path: String,
    pub name: String,
    pub view: ViewId,
    pub meta: BTreeMap<String, String>,
    pub redirect: Option<String>,
    pub children: Vec<RouteEntry>,
}

impl RouteEntry {
    pub fn new(path: &str, name: &str, view: ViewId) -> Self {
        Self {
            path: path.to_string(),
            name: name.to_string(),
            view,
            meta: BTreeMap::new(),
            redirect: None,
            children: Vec::new(),
        }
    }

    pub fn meta(mut self, key: &str, value: &str) -> Self {
        self.meta.insert(key.to_string(), value.to_string());
        self
    }

    pub fn folder(self, folder: &str) -> Self {
        self.meta(META_FOLDER, folder)
    }

    pub fn title(self, title: &str) -> Self {
        self.meta(META_TITLE, title)
    }

    pub fn redirect(mut self, target: &str) -> Self {
        self.redirect = Some(target.to_string());
        self
    }

    pub fn child(mut self, child: RouteEntry) -> Self {
        self.children.push(child);
        self
    }

    fn pattern(&self) -> Vec<&str> {
        split(&self.path)
    }
}

/// Path segments with one leading `/` removed. The bare root has none.
fn split(path: &str) -> Vec<&str> {
    let relative = path.strip_prefix('/').unwrap_or(path);
    if relative.is_empty() {
        Vec::new()
    } else {
        relative.split('/').collect()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RouteMatch {
    /// Entry names from root to leaf.
    pub chain: Vec<String>,
    /// Views to mount from the outermost layout inward.
    pub views: Vec<ViewId>,
    pub params: BTreeMap<String, String>,
    /// Metadata merged root to leaf; a child overrides its parent.
    pub meta: BTreeMap<String, String>,
}

impl RouteMatch {
    pub fn name(&self) -> &str {
        self.chain.last().map(String::as_str).unwrap_or_default()
    }

    /// The innermost view.
    pub fn view(&self) -> ViewId {
        self.views.last().copied().unwrap_or(ViewId::NotFound)
    }

    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    pub fn folder(&self) -> Option<&str> {
        self.meta.get(META_FOLDER).map(String::as_str)
    }

    pub fn title(&self) -> Option<&str> {
        self.meta.get(META_TITLE).map(String::as_str)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolution {
    Resolved(RouteMatch),
    Redirect(String),
    NotFound,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RouteTable {
    routes: Vec<RouteEntry>,
}

impl RouteTable {
    pub fn new(routes: Vec<RouteEntry>) -> Self {
        Self { routes }
    }

    pub fn routes(&self) -> &[RouteEntry] {
        &self.routes
    }

    /// Rejects duplicate names anywhere in the tree and duplicate paths
    /// among siblings.
    pub fn validate(&self) -> Result<(), RouterError> {
        fn walk<'a>(entries: &'a [RouteEntry], names: &mut HashSet<&'a str>) -> Result<(), RouterError> {
            let mut paths = HashSet::new();
            for entry in entries {
                if !names.insert(entry.name.as_str()) {
                    return Err(RouterError::InvalidTable(format!("duplicate route name {}", entry.name)));
                }
                if !paths.insert(entry.path.as_str()) {
                    return Err(RouterError::InvalidTable(format!("duplicate path {}", entry.path)));
                }
                walk(&entry.children, names)?;
            }
            Ok(())
        }
        walk(&self.routes, &mut HashSet::new())
    }

    /// First match in declaration order wins. A table redirect applies only
    /// when its own entry is the leaf.
    pub fn resolve(&self, path: &str) -> Resolution {
        if !path.starts_with('/') {
            return Resolution::NotFound;
        }
        let segments = split(path);
        let mut params = BTreeMap::new();
        let Some(chain) = match_entries(&self.routes, &segments, &mut params) else {
            return Resolution::NotFound;
        };
        if let Some(target) = chain.last().and_then(|leaf| leaf.redirect.clone()) {
            return Resolution::Redirect(target);
        }
        let mut meta = BTreeMap::new();
        for entry in &chain {
            meta.extend(entry.meta.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        Resolution::Resolved(RouteMatch {
            chain: chain.iter().map(|e| e.name.clone()).collect(),
            views: chain.iter().map(|e| e.view).collect(),
            params,
            meta,
        })
    }

    /// Builds the absolute path of a named route, filling `:name`
    /// segments from `params`.
    pub fn path_for(&self, name: &str, params: &[(&str, &str)]) -> Option<String> {
        fn find<'a>(entries: &'a [RouteEntry], name: &str, trail: &mut Vec<&'a RouteEntry>) -> bool {
            for entry in entries {
                trail.push(entry);
                if entry.name == name || find(&entry.children, name, trail) {
                    return true;
                }
                trail.pop();
            }
            false
        }

        let mut trail = Vec::new();
        if !find(&self.routes, name, &mut trail) {
            return None;
        }
        let mut segments = Vec::new();
        for segment in trail.iter().flat_map(|e| e.pattern()) {
            match segment.strip_prefix(':') {
                Some(key) => {
                    let (_, value) = params.iter().find(|(k, _)| *k == key)?;
                    segments.push(*value);
                }
                None => segments.push(segment),
            }
        }
        Some(format!("/{}", segments.join("/")))
    }
}

fn match_entries<'a>(
    entries: &'a [RouteEntry],
    segments: &[&str],
    params: &mut BTreeMap<String, String>,
) -> Option<Vec<&'a RouteEntry>> {
    for entry in entries {
        let pattern = entry.pattern();
        if pattern.len() > segments.len() {
            continue;
        }
        let mut bound = BTreeMap::new();
        let fits = pattern.iter().zip(segments).all(|(want, got)| match want.strip_prefix(':') {
            Some(key) if !got.is_empty() => {
                bound.insert(key.to_string(), got.to_string());
                true
            }
            Some(_) => false,
            None => want == got,
        });
        if !fits {
            continue;
        }
        let rest = &segments[pattern.len()..];
        if rest.is_empty() {
            params.extend(bound);
            return Some(vec![entry]);
        }
        let mut child_params = BTreeMap::new();
        if let Some(mut tail) = match_entries(&entry.children, rest, &mut child_params) {
            params.extend(bound);
            params.extend(child_params);
            tail.insert(0, entry);
            return Some(tail);
        }
    }
    None
}

/// The campus mail application's routes.
pub fn campus_routes() -> RouteTable {
    let mailbox = |path: &str, name: &str, title: &str| {
        RouteEntry::new(path, name, ViewId::MailList).folder(path).title(title)
    };
    RouteTable::new(vec![
        RouteEntry::new("/login", "Login", ViewId::Login),
        RouteEntry::new("/register", "Register", ViewId::Register),
        RouteEntry::new("/", "Layout", ViewId::MainLayout)
            .redirect("/inbox")
            .child(mailbox("inbox", "Inbox", "收件箱"))
            .child(mailbox("sent", "Sent", "发件箱"))
            .child(mailbox("starred", "Starred", "星标邮件"))
            .child(mailbox("drafts", "Drafts", "草稿箱"))
            .child(mailbox("scheduled", "Scheduled", "定时发送"))
            .child(mailbox("trash", "Trash", "垃圾箱"))
            .child(RouteEntry::new("mail/:id", "MailDetail", ViewId::MailDetail))
            .child(RouteEntry::new("compose", "Compose", ViewId::Compose))
            .child(RouteEntry::new("accounts", "MailAccountManage", ViewId::MailAccountManage).title("邮箱账号管理"))
            .child(
                RouteEntry::new("contacts", "ContactManage", ViewId::ContactManage)
                    .title("联系人簿")
                    .folder("contacts"),
            )
            .child(RouteEntry::new("statistics", "Statistics", ViewId::Statistics).title("邮件统计")),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolved(path: &str) -> RouteMatch {
        match campus_routes().resolve(path) {
            Resolution::Resolved(m) => m,
            other => panic!("{path} did not resolve: {other:?}"),
        }
    }

    #[test]
    fn campus_table_is_valid() {
        campus_routes().validate().unwrap();
    }

    #[test]
    fn mailbox_carries_folder_and_title() {
        let m = resolved("/inbox");
        assert_eq!(m.chain, vec!["Layout", "Inbox"]);
        assert_eq!(m.views, vec![ViewId::MainLayout, ViewId::MailList]);
        assert_eq!(m.folder(), Some("inbox"));
        assert_eq!(m.title(), Some("收件箱"));

        let m = resolved("/scheduled");
        assert_eq!(m.folder(), Some("scheduled"));
        assert_eq!(m.title(), Some("定时发送"));
    }

    #[test]
    fn detail_binds_id() {
        let m = resolved("/mail/42");
        assert_eq!(m.name(), "MailDetail");
        assert_eq!(m.view(), ViewId::MailDetail);
        assert_eq!(m.param("id"), Some("42"));
        assert!(m.meta.is_empty());
    }

    #[test]
    fn root_redirects_to_inbox() {
        assert_eq!(campus_routes().resolve("/"), Resolution::Redirect("/inbox".into()));
    }

    #[test]
    fn public_routes_have_no_layout() {
        let m = resolved("/login");
        assert_eq!(m.chain, vec!["Login"]);
        assert_eq!(m.view(), ViewId::Login);
    }

    #[test]
    fn unmatched_paths_are_not_found() {
        let table = campus_routes();
        for path in ["/nope", "/inbox/", "/Inbox", "/mail", "/mail/", "/mail/1/2", "inbox", "", "//"] {
            assert_eq!(table.resolve(path), Resolution::NotFound, "{path}");
        }
    }

    #[test]
    fn resolution_is_deterministic() {
        let table = campus_routes();
        assert_eq!(table.resolve("/contacts"), table.resolve("/contacts"));
    }

    #[test]
    fn child_meta_overrides_parent() {
        let table = RouteTable::new(vec![RouteEntry::new("/", "Root", ViewId::MainLayout)
            .title("outer")
            .folder("all")
            .child(RouteEntry::new("x", "X", ViewId::Compose).title("inner"))]);
        let Resolution::Resolved(m) = table.resolve("/x") else {
            panic!("expected match");
        };
        assert_eq!(m.title(), Some("inner"));
        assert_eq!(m.folder(), Some("all"));
    }

    #[test]
    fn validate_catches_duplicates() {
        let table = RouteTable::new(vec![
            RouteEntry::new("/a", "A", ViewId::Login),
            RouteEntry::new("/b", "A", ViewId::Register),
        ]);
        assert!(matches!(table.validate(), Err(RouterError::InvalidTable(_))));

        let table = RouteTable::new(vec![
            RouteEntry::new("/a", "A", ViewId::Login),
            RouteEntry::new("/a", "B", ViewId::Register),
        ]);
        assert!(matches!(table.validate(), Err(RouterError::InvalidTable(_))));
    }

    #[test]
    fn path_for_named_routes() {
        let table = campus_routes();
        assert_eq!(table.path_for("Inbox", &[]).as_deref(), Some("/inbox"));
        assert_eq!(table.path_for("MailDetail", &[("id", "7")]).as_deref(), Some("/mail/7"));
        assert_eq!(table.path_for("MailDetail", &[]), None);
        assert_eq!(table.path_for("Layout", &[]).as_deref(), Some("/"));
        assert_eq!(table.path_for("Missing", &[]), None);
    }
}
