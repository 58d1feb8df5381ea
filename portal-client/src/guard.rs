use common_auth::Identity;

use crate::session::SessionState;

pub const LOGIN_PATH: &str = "/login";
pub const PROFILE_PATH: &str = "/profile";
pub const HOME_PATH: &str = "/index/novedades";

/// Routes reachable without a session. A trailing `/*` matches any sub-path.
pub const PUBLIC_PATHS: &[&str] = &[
    "/login",
    "/register",
    "/verify",
    "/forgot-password",
    "/reset-password/*",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    Deny { to: String },
    ForceRedirect { to: String },
    Allow,
}

/// Per-navigation gate over the current session.
#[derive(Debug, Clone)]
pub struct RouteGuard {
    login_path: String,
    profile_path: String,
    public_paths: Vec<String>,
}

impl Default for RouteGuard {
    fn default() -> Self {
        Self {
            login_path: LOGIN_PATH.to_string(),
            profile_path: PROFILE_PATH.to_string(),
            public_paths: PUBLIC_PATHS.iter().map(|path| path.to_string()).collect(),
        }
    }
}

impl RouteGuard {
    pub fn new(login_path: impl Into<String>, profile_path: impl Into<String>) -> Self {
        let login_path: String = login_path.into();
        let profile_path: String = profile_path.into();
        Self {
            login_path: normalize(&login_path).to_string(),
            profile_path: normalize(&profile_path).to_string(),
            public_paths: Vec::new(),
        }
    }

    pub fn with_public_path(mut self, path: impl Into<String>) -> Self {
        self.public_paths.push(path.into());
        self
    }

    /// Decide a protected route: no session denies, an incomplete profile is
    /// pinned to the profile page, everything else passes.
    pub fn check(&self, identity: Option<&Identity>, path: &str) -> RouteDecision {
        let Some(identity) = identity else {
            return RouteDecision::Deny {
                to: self.login_path.clone(),
            };
        };
        if identity.profile_incomplete && normalize(path) != self.profile_path {
            return RouteDecision::ForceRedirect {
                to: self.profile_path.clone(),
            };
        }
        RouteDecision::Allow
    }

    pub fn check_state(&self, state: &SessionState, path: &str) -> RouteDecision {
        self.check(state.identity(), path)
    }

    /// Like [`check`](Self::check), but public routes always pass.
    pub fn navigate(&self, identity: Option<&Identity>, path: &str) -> RouteDecision {
        if self.is_public(path) {
            return RouteDecision::Allow;
        }
        self.check(identity, path)
    }

    pub fn is_public(&self, path: &str) -> bool {
        let path = normalize(path);
        self.public_paths.iter().any(|pattern| match pattern.strip_suffix("/*") {
            Some(prefix) => path
                .strip_prefix(prefix)
                .is_some_and(|rest| rest.len() > 1 && rest.starts_with('/')),
            None => normalize(pattern) == path,
        })
    }

    /// Where the root path sends the caller.
    pub fn landing_path(&self, identity: Option<&Identity>) -> &str {
        if identity.is_some() {
            HOME_PATH
        } else {
            self.login_path.as_str()
        }
    }
}

fn normalize(path: &str) -> &str {
    let path = path.split(['?', '#']).next().unwrap_or(path);
    if path.len() > 1 {
        path.trim_end_matches('/')
    } else {
        path
    }
}
