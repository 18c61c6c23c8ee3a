//! Navigation gate: the one decision taken before every route change.

pub const LOGIN_PATH: &str = "/login";
pub const REGISTER_PATH: &str = "/register";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Redirect(String),
}

/// Login and registration are always reachable; everything else needs a
/// credential to be present. Validity is never checked here.
///
/// Paths are compared literally: `/login/` or `/Login` are ordinary
/// protected paths.
pub fn decide(target_path: &str, has_credential: bool) -> Decision {
    if target_path == LOGIN_PATH || target_path == REGISTER_PATH {
        return Decision::Allow;
    }
    if has_credential {
        Decision::Allow
    } else {
        Decision::Redirect(LOGIN_PATH.to_string())
    }
}
